//! Log analysis engines
//!
//! The HTTP layer talks to analysis through the [`LogAnalyzer`] trait so the
//! engine can be swapped without touching the handlers. The only engine
//! shipped today is [`PlaceholderAnalyzer`], which answers every request with
//! the same canned findings.

use crate::models::{iso_now, AnalysisRequest, AnalysisResponse};
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Status reported for a finished analysis
pub const STATUS_COMPLETED: &str = "completed";

const INSIGHTS: [&str; 3] = [
    "Log volume increased by 25% in the last hour",
    "Agent coordination latency detected",
    "Memory usage trending upward",
];

const RECOMMENDATIONS: [&str; 2] = [
    "Scale agent pool to handle increased load",
    "Review error handling in agent coordination",
];

/// Errors raised while analyzing a batch of logs
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis engine unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

/// An engine that turns a batch of log entries into findings
#[async_trait]
pub trait LogAnalyzer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError>;
}

/// Returns fixed findings regardless of the submitted logs
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAnalyzer;

impl PlaceholderAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn anomaly() -> Map<String, Value> {
        let mut anomaly = Map::new();
        anomaly.insert("timestamp".to_string(), Value::String(iso_now()));
        anomaly.insert("severity".to_string(), Value::from("medium"));
        anomaly.insert(
            "description".to_string(),
            Value::from("Unusual error rate detected"),
        );
        anomaly
    }
}

#[async_trait]
impl LogAnalyzer for PlaceholderAnalyzer {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        Ok(AnalysisResponse {
            status: STATUS_COMPLETED.to_string(),
            insights: INSIGHTS.iter().map(|s| s.to_string()).collect(),
            anomalies: vec![Self::anomaly()],
            recommendations: RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogEntry;
    use chrono::Utc;

    fn entry(level: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: level.to_string(),
            message: message.to_string(),
            agent_id: Some("agent-1".to_string()),
            metadata: None,
        }
    }

    #[test]
    fn test_placeholder_empty_batch() {
        let analyzer = PlaceholderAnalyzer::new();
        let response = tokio_test::block_on(analyzer.analyze(&AnalysisRequest::new(vec![]))).unwrap();

        assert_eq!(response.status, "completed");
        assert_eq!(response.insights.len(), 3);
        assert_eq!(response.anomalies.len(), 1);
        assert_eq!(response.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn test_placeholder_ignores_log_content() {
        let analyzer = PlaceholderAnalyzer::new();
        let quiet = analyzer.analyze(&AnalysisRequest::new(vec![])).await.unwrap();
        let noisy = analyzer
            .analyze(&AnalysisRequest {
                logs: vec![entry("ERROR", "boom"), entry("INFO", "ok")],
                analysis_type: "performance".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(quiet.insights, noisy.insights);
        assert_eq!(quiet.recommendations, noisy.recommendations);
        assert_eq!(noisy.insights[1], "Agent coordination latency detected");
    }

    #[tokio::test]
    async fn test_placeholder_anomaly_shape() {
        let response = PlaceholderAnalyzer
            .analyze(&AnalysisRequest::new(vec![entry("WARN", "slow")]))
            .await
            .unwrap();
        let anomaly = &response.anomalies[0];

        assert_eq!(anomaly.len(), 3);
        assert_eq!(anomaly["severity"], "medium");
        assert_eq!(anomaly["description"], "Unusual error rate detected");
        let ts = anomaly["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }
}
