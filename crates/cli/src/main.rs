//! Multiverse Analyzer CLI
//!
//! A command-line tool for checking the analyzer service and submitting
//! logs for analysis.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analyze, status};

/// Multiverse Analyzer CLI
#[derive(Parser)]
#[command(name = "mva")]
#[command(author, version, about = "CLI for the Multiverse Analyzer", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via MVA_API_URL env var)
    #[arg(long, env = "MVA_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check service health
    Health,

    /// Show service information
    Info,

    /// Submit logs for analysis
    Analyze {
        /// File with a JSON array of log entries, a full request object,
        /// or one JSON entry per line (`-` reads stdin)
        file: String,

        /// Analysis type sent with the request (defaults to the file's or "anomaly")
        #[arg(long, short = 't')]
        analysis_type: Option<String>,
    },

    /// Show aggregate metrics
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Health => status::show_health(&client, cli.format).await?,
        Commands::Info => status::show_info(&client, cli.format).await?,
        Commands::Analyze {
            file,
            analysis_type,
        } => analyze::run_analysis(&client, &file, analysis_type, cli.format).await?,
        Commands::Metrics => status::show_metrics(&client, cli.format).await?,
    }

    Ok(())
}
