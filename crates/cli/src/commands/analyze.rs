//! Log analysis command

use analyzer_lib::{AnalysisRequest, AnalysisResponse, LogEntry};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::io::Read;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_severity, color_status, format_timestamp, print_heading, print_info, print_json,
    print_warning, OutputFormat,
};

/// Row for anomalies table
#[derive(Tabled)]
struct AnomalyRow {
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Read the raw input, `-` meaning stdin
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read logs from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}

/// Build an analysis request from file content.
///
/// Accepts a full request object, a JSON array of log entries, or one log
/// entry per line. An explicit `analysis_type` overrides the one in the file.
pub fn parse_request(content: &str, analysis_type: Option<String>) -> Result<AnalysisRequest> {
    let trimmed = content.trim();

    let mut request = if trimmed.is_empty() {
        AnalysisRequest::new(Vec::new())
    } else if trimmed.starts_with('[') {
        let logs: Vec<LogEntry> =
            serde_json::from_str(trimmed).context("Invalid log entry array")?;
        AnalysisRequest::new(logs)
    } else {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(obj)) if obj.contains_key("logs") => {
                serde_json::from_value(Value::Object(obj)).context("Invalid analysis request")?
            }
            _ => AnalysisRequest::new(parse_ndjson(trimmed)?),
        }
    };

    if let Some(kind) = analysis_type {
        request.analysis_type = kind;
    }

    Ok(request)
}

fn parse_ndjson(content: &str) -> Result<Vec<LogEntry>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid log entry on line {}", idx + 1))
        })
        .collect()
}

/// Submit logs for analysis and print the findings
pub async fn run_analysis(
    client: &ApiClient,
    input: &str,
    analysis_type: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let request = parse_request(&read_input(input)?, analysis_type)?;
    let response = client.analyze(&request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => print_report(&request, &response),
    }

    Ok(())
}

fn print_report(request: &AnalysisRequest, response: &AnalysisResponse) {
    print_heading("Log Analysis", 60);
    println!("Status:   {}", color_status(&response.status));
    println!("Type:     {}", request.analysis_type.cyan());
    println!("Entries:  {}", request.logs.len());
    println!();

    println!("{}", "Insights".bold());
    for insight in &response.insights {
        println!("  • {}", insight);
    }
    println!();

    if response.anomalies.is_empty() {
        print_warning("No anomalies reported");
    } else {
        let rows: Vec<AnomalyRow> = response
            .anomalies
            .iter()
            .map(|a| AnomalyRow {
                timestamp: a
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .map(format_timestamp)
                    .unwrap_or_default(),
                severity: a
                    .get("severity")
                    .and_then(Value::as_str)
                    .map(color_severity)
                    .unwrap_or_default(),
                description: a
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();

        let table = tabled::Table::new(rows)
            .with(tabled::settings::Style::rounded())
            .to_string();
        println!("{}", table);
    }
    println!();

    println!("{}", "Recommendations".bold());
    for (i, rec) in response.recommendations.iter().enumerate() {
        println!("  {}. {}", i + 1, rec);
    }

    if request.logs.is_empty() {
        println!();
        print_info("No log entries were submitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ENTRY: &str =
        r#"{"timestamp":"2024-05-01T10:00:00Z","level":"INFO","message":"agent joined","agent_id":"a1"}"#;

    #[test]
    fn test_parse_array_of_entries() {
        let content = format!("[{}, {}]", ENTRY, ENTRY);
        let request = parse_request(&content, None).unwrap();

        assert_eq!(request.logs.len(), 2);
        assert_eq!(request.analysis_type, "anomaly");
        assert_eq!(request.logs[0].agent_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_parse_full_request_object() {
        let content = format!(r#"{{"logs":[{}],"analysis_type":"performance"}}"#, ENTRY);
        let request = parse_request(&content, None).unwrap();

        assert_eq!(request.logs.len(), 1);
        assert_eq!(request.analysis_type, "performance");
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let content = format!("{}\n\n{}\n", ENTRY, ENTRY);
        let request = parse_request(&content, Some("security".to_string())).unwrap();

        assert_eq!(request.logs.len(), 2);
        assert_eq!(request.analysis_type, "security");
    }

    #[test]
    fn test_parse_ndjson_reports_bad_line() {
        let content = format!("{}\n{{\"level\":\"INFO\"}}\n", ENTRY);
        let err = parse_request(&content, None).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_empty_input() {
        let request = parse_request("   \n", None).unwrap();
        assert!(request.logs.is_empty());
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", ENTRY).unwrap();

        let content = read_input(file.path().to_str().unwrap()).unwrap();
        let request = parse_request(&content, None).unwrap();
        assert_eq!(request.logs.len(), 1);
    }

    #[test]
    fn test_read_input_missing_file() {
        assert!(read_input("/nonexistent/logs.json").is_err());
    }
}
