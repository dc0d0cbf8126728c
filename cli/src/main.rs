use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use tracing_subscriber::EnvFilter;

use scanpost::{load_config, load_mailer_config, run_mailer, run_upload};

/// Uploads scanned PDFs to the document API and reports files left behind.
#[derive(Debug, Parser)]
#[command(name = "scanpost", author, version, about, long_about = None)]
struct Cli {
    /// Console log format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload every pending PDF in the working directory.
    Upload {
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
    },
    /// Email PDFs that have been left in a folder for too long.
    MailStale {
        #[arg(long, default_value = "email_config.json")]
        config: PathBuf,
    },
}

fn init_tracing(format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    // Route the library's `log` records into tracing
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

async fn run(command: Command) -> scanpost::Result<()> {
    match command {
        Command::Upload { config } => {
            let config = load_config(&config)?;
            let summary = run_upload(&config).await?;
            info!("Upload run complete: {}", summary);
        }
        Command::MailStale { config } => {
            let config = load_mailer_config(&config)?;
            let sent = run_mailer(&config).await?;
            info!("Stale file check complete, {} file(s) sent", sent);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting scanpost v{}", env!("CARGO_PKG_VERSION"));

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
