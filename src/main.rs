//! rental-telemetry CLI entry point

use clap::{Parser, Subcommand};
use rental_telemetry::cli::commands::check::run_check;
use rental_telemetry::cli::commands::exec::{run_exec, ExecOptions};
use rental_telemetry::config::Surface;
use rental_telemetry::telemetry::{init_logging, LoggingConfig};

#[derive(Parser)]
#[command(name = "rental-telemetry")]
#[command(author, version, about = "Telemetry bootstrap for rental platform processes", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command as a batch job with telemetry and job metrics
    Exec {
        /// Job name recorded in metrics and the push gateway grouping key
        #[arg(long)]
        job: String,
        /// Process surface used for the service resource
        #[arg(long, value_enum, default_value_t = Surface::Worker)]
        surface: Surface,
        /// Total records the job saw
        #[arg(long)]
        records_total: Option<u64>,
        /// Records processed successfully
        #[arg(long)]
        records_processed: Option<u64>,
        /// Records that failed
        #[arg(long)]
        records_failed: Option<u64>,
        /// Command to run, after `--`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Show the telemetry configuration resolved from the environment
    Check {
        /// Process surface used for the service resource
        #[arg(long, value_enum, default_value_t = Surface::Api)]
        surface: Surface,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default()
    };
    let _guard = init_logging(&logging)?;

    match cli.command {
        Commands::Exec {
            job,
            surface,
            records_total,
            records_processed,
            records_failed,
            command,
        } => {
            let code = run_exec(ExecOptions {
                job,
                surface,
                records_total,
                records_processed,
                records_failed,
                command,
            })
            .await?;
            std::process::exit(code);
        }
        Commands::Check { surface, json } => {
            run_check(surface, json)?;
        }
    }

    Ok(())
}
