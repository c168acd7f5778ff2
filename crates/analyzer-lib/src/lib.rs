//! Library for the multiverse log analyzer service
//!
//! This crate provides:
//! - Request/response models for log analysis
//! - The analysis engine seam and its placeholder engine
//! - The HTTP router and error mapping
//! - Health, readiness and observability

pub mod analysis;
pub mod api;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;

pub use analysis::{AnalysisError, LogAnalyzer, PlaceholderAnalyzer};
pub use api::{create_router, AppState};
pub use error::{ApiError, ValidatedJson, ValidationIssue};
pub use health::{ReadinessResponse, ReadinessState};
pub use models::*;
pub use observability::{AnalyzerMetrics, StructuredLogger};
