mod cli;
mod config;
mod error;
mod logging;
mod output;
mod pipeline;
mod readers;
mod schema;
mod types;
mod values;

use clap::Parser;
use cli::{Cli, Commands};
use config::CleaningConfig;
use tracing::error;
use types::Result;

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Clean {
            input,
            out,
            report,
            config,
            on_date_error,
            quarantine,
            hash_input,
        } => {
            let config = CleaningConfig::load(config.as_deref())?;
            let options = types::PipelineOptions {
                on_date_error,
                hash_input,
            };

            let pipeline_report =
                pipeline::clean_file(&input, &out, quarantine.as_deref(), &config, &options)?;

            if let Some(report_path) = report {
                output::write_json_file(&pipeline_report, &report_path)?;
                tracing::info!(path = %report_path.display(), "report written");
            } else {
                output::write_json_stdout(&pipeline_report)?;
            }
        }
        Commands::CheckConfig { config } => {
            let config = CleaningConfig::load(config.as_deref())?;
            output::write_json_stdout(&config)?;
        }
    }

    Ok(())
}
