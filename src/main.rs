use std::process;

use argsheet::{cli::Args, run::run};
use clap::Parser;
use colored::Colorize;

fn main() {
    let args = Args::parse();

    #[cfg(feature = "tracing")]
    init_tracing();

    match run(&args) {
        Ok(summary) => {
            // Standard output may be carrying the table itself
            if args.quiet || args.writes_to_stdout() {
                return;
            }
            if let Some(collected) = summary.collected {
                println!(
                    "{}: {} sheets, {} rows",
                    "compiled".bold(),
                    collected.sheets.to_string().blue().bold(),
                    collected.rows.to_string().blue().bold()
                );
            }
            if let Some(consolidated) = summary.consolidated {
                println!(
                    "{}: {} gene records from {} sheets",
                    "consolidated".bold(),
                    consolidated.rows.to_string().blue().bold(),
                    consolidated.sheets.to_string().blue().bold()
                );
            }
        }
        Err(e) => {
            eprintln!(
                "{}\n {}",
                "Application error:".blue().bold(),
                e.to_string().blue()
            );
            process::exit(1);
        }
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default `warn`).
#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
