//! CLI subcommand implementations

pub mod analyze;
pub mod status;
