//! Request and response shapes exchanged with the analysis API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default analysis mode when the request leaves it out
pub const DEFAULT_ANALYSIS_TYPE: &str = "anomaly";

/// A single log record submitted for analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub logs: Vec<LogEntry>,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
}

fn default_analysis_type() -> String {
    DEFAULT_ANALYSIS_TYPE.to_string()
}

impl AnalysisRequest {
    pub fn new(logs: Vec<LogEntry>) -> Self {
        Self {
            logs,
            analysis_type: default_analysis_type(),
        }
    }
}

/// Result of an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub insights: Vec<String>,
    pub anomalies: Vec<Map<String, Value>>,
    pub recommendations: Vec<String>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

/// Body of `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub docs: String,
    pub health: String,
}

/// Body of `GET /metrics`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_logs_analyzed: u64,
    pub active_agents: u64,
    pub uptime_seconds: u64,
}

/// Current UTC time as ISO-8601 with microsecond precision and a `Z` suffix
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Lenient timestamp (de)serialization for log entries.
///
/// Accepts RFC 3339, ISO-8601 with a basic (`+0200`) or `Z` offset, seconds
/// optional, ISO-8601 without an offset (read as UTC), a bare date (midnight
/// UTC) or a Unix epoch number. Epoch values above [`EPOCH_MILLIS_THRESHOLD`]
/// are milliseconds, anything smaller is seconds. Always writes RFC 3339.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const OFFSET_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%d %H:%M%z",
    ];

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    /// Epoch numbers with a larger magnitude are read as milliseconds
    pub const EPOCH_MILLIS_THRESHOLD: f64 = 2e10;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Epoch(f64),
        }

        match Raw::deserialize(deserializer).map_err(|_| {
            D::Error::custom("timestamp must be an ISO-8601 string or epoch number")
        })? {
            Raw::Text(s) => parse(&s).ok_or_else(|| {
                D::Error::custom(format!("invalid datetime `{}`", s))
            }),
            Raw::Epoch(value) => from_epoch(value)
                .ok_or_else(|| D::Error::custom(format!("epoch timestamp out of range: {}", value))),
        }
    }

    /// Parse a timestamp string in any accepted form
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        let zulu = s
            .strip_suffix(['Z', 'z'])
            .map(|rest| format!("{}+00:00", rest));
        let with_offset = zulu.as_deref().unwrap_or(s);
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(with_offset, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Convert an epoch number, seconds or milliseconds by magnitude
    pub fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        let secs = if value.abs() > EPOCH_MILLIS_THRESHOLD {
            value / 1000.0
        } else {
            value
        };
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
        DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_analysis_type_defaults_to_anomaly() {
        let request: AnalysisRequest = serde_json::from_value(json!({ "logs": [] })).unwrap();
        assert_eq!(request.analysis_type, "anomaly");
        assert!(request.logs.is_empty());
    }

    #[test]
    fn test_log_entry_optional_fields() {
        let entry: LogEntry = serde_json::from_value(json!({
            "timestamp": "2024-03-01T12:00:00Z",
            "level": "INFO",
            "message": "agent started",
            "agent_id": null
        }))
        .unwrap();

        assert_eq!(entry.agent_id, None);
        assert_eq!(entry.metadata, None);
        assert_eq!(entry.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_log_entry_metadata_keeps_arbitrary_values() {
        let entry: LogEntry = serde_json::from_value(json!({
            "timestamp": "2024-03-01T12:00:00+02:00",
            "level": "ERROR",
            "message": "coordination timeout",
            "agent_id": "agent-7",
            "metadata": { "retries": 3, "tags": ["a", "b"], "nested": { "ok": false } }
        }))
        .unwrap();

        let metadata = entry.metadata.unwrap();
        assert_eq!(metadata["retries"], 3);
        assert_eq!(metadata["nested"]["ok"], false);
        assert_eq!(entry.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_log_entry_missing_timestamp_is_rejected() {
        let result: Result<LogEntry, _> = serde_json::from_value(json!({
            "level": "INFO",
            "message": "no time"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_metadata_must_be_an_object() {
        let result: Result<LogEntry, _> = serde_json::from_value(json!({
            "timestamp": "2024-03-01T12:00:00Z",
            "level": "INFO",
            "message": "bad metadata",
            "metadata": [1, 2, 3]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp_accepts_naive_and_date_forms() {
        assert_eq!(
            timestamp::parse("2024-03-01T12:30:00.250"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap() + chrono::Duration::milliseconds(250))
        );
        assert_eq!(
            timestamp::parse("2024-03-01 08:00:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(
            timestamp::parse("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn test_timestamp_accepts_minute_precision() {
        let expected = Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        assert_eq!(timestamp::parse("2024-05-01T10:00Z"), expected);
        assert_eq!(timestamp::parse("2024-05-01T10:00"), expected);
        assert_eq!(timestamp::parse("2024-05-01T12:00+02:00"), expected);
    }

    #[test]
    fn test_timestamp_accepts_basic_offset() {
        assert_eq!(
            timestamp::parse("2024-05-01T10:00:00+0200"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(
            timestamp::parse("2024-05-01T10:00:00.5-0130"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 30, 0).unwrap() + chrono::Duration::milliseconds(500))
        );
    }

    #[test]
    fn test_timestamp_accepts_epoch_milliseconds() {
        let entry: LogEntry = serde_json::from_value(json!({
            "timestamp": 1_714_557_600_000u64,
            "level": "INFO",
            "message": "millis"
        }))
        .unwrap();
        assert_eq!(entry.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());

        assert_eq!(
            timestamp::from_epoch(1_714_557_600_250.0),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + chrono::Duration::milliseconds(250))
        );
        // Just under the cutoff stays in seconds
        assert_eq!(
            timestamp::from_epoch(19_999_999_999.0).map(|dt| dt.timestamp()),
            Some(19_999_999_999)
        );
    }

    #[test]
    fn test_timestamp_accepts_epoch_seconds() {
        let entry: LogEntry = serde_json::from_value(json!({
            "timestamp": 1_700_000_000,
            "level": "WARN",
            "message": "epoch"
        }))
        .unwrap();
        assert_eq!(entry.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        let result: Result<LogEntry, _> = serde_json::from_value(json!({
            "timestamp": "not a date",
            "level": "INFO",
            "message": "x"
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid datetime"));
    }

    #[test]
    fn test_iso_now_is_rfc3339_utc() {
        let now = iso_now();
        assert!(now.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
