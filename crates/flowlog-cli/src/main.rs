use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "flowlog", version, about = "Inspect and prune a process engine event log")]
#[command(group(ArgGroup::new("source").required(true).args(["config", "dir"])))]
struct Cli {
    /// Path to flowlog.yaml; the log location is taken from `event_log.storage`.
    #[arg(long, short = 'c', env = "FLOWLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding event-log.jsonl.
    #[arg(long, env = "FLOWLOG_DIR")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List entries in log-number order.
    Entries {
        /// Only entries with a log number greater than this.
        #[arg(long)]
        after: Option<u64>,

        /// Maximum number of entries to print.
        #[arg(long)]
        limit: Option<usize>,

        /// Print each entry's decoded data under its line.
        #[arg(long, default_value_t = false)]
        decode: bool,
    },

    /// Show one entry with its decoded data.
    Show { log_number: u64 },

    /// Delete one entry.
    Delete { log_number: u64 },

    /// Delete every entry. Log numbers are not reused afterwards.
    Purge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = match (cli.config, cli.dir) {
        (_, Some(dir)) => commands::LogSource::Dir(dir),
        (Some(config), None) => commands::LogSource::Config(config),
        (None, None) => anyhow::bail!("either --config or --dir is required"),
    };
    let logger = commands::open_logger(&source)?;
    let mut out = std::io::stdout().lock();

    match cli.cmd {
        Command::Entries {
            after,
            limit,
            decode,
        } => commands::entries::list(&logger, after, limit, decode, &mut out).await,
        Command::Show { log_number } => commands::entries::show(&logger, log_number, &mut out).await,
        Command::Delete { log_number } => {
            commands::delete::delete(&logger, log_number, &mut out).await
        }
        Command::Purge => commands::delete::purge(&logger, &mut out).await,
    }
}
