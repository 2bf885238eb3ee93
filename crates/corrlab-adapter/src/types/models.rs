/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry in the stock catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub ticker: String,
    pub name: String,
    pub code: String,
    pub market: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

/// One section of a finished report, keyed by data kind.
///
/// The engine treats the report as opaque; presentation layers dispatch on
/// this union to pick a renderer per section.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSection {
    BasicStats(Value),
    PerformanceSummary(Value),
    CorrelationMatrix(Value),
}

impl ReportSection {
    /// Stable kind label, useful for logging and routing
    pub fn kind(&self) -> &'static str {
        match self {
            ReportSection::BasicStats(_) => "basic_stats",
            ReportSection::PerformanceSummary(_) => "performance_summary",
            ReportSection::CorrelationMatrix(_) => "correlation_matrix",
        }
    }
}
