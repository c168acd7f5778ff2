//! Health, service info and metrics commands

use anyhow::Result;
use colored::Colorize;

use crate::client::ApiClient;
use crate::output::{
    color_status, format_timestamp, print_heading, print_json, print_success, OutputFormat,
};

/// Show service health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            print_heading("Service Health", 40);
            println!("Status:     {}", color_status(&health.status));
            println!("Version:    {}", health.version);
            println!("Checked at: {}", format_timestamp(&health.timestamp));
        }
    }

    Ok(())
}

/// Show service information
pub async fn show_info(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info = client.info().await?;

    match format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => {
            print_heading(&info.service, 40);
            println!("Version: {}", info.version.cyan());
            println!("Docs:    {}", info.docs);
            println!("Health:  {}", info.health);
        }
    }

    Ok(())
}

/// Show aggregate metrics
pub async fn show_metrics(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let metrics = client.metrics().await?;

    match format {
        OutputFormat::Json => print_json(&metrics)?,
        OutputFormat::Table => {
            print_heading("Analyzer Metrics", 40);
            println!("Logs analyzed:  {}", metrics.total_logs_analyzed);
            println!("Active agents:  {}", metrics.active_agents);
            println!("Uptime:         {}s", metrics.uptime_seconds);
            if metrics == Default::default() {
                println!();
                print_success("Service reachable (no activity recorded)");
            }
        }
    }

    Ok(())
}
