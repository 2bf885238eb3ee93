/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::JobStatus;
use super::models::ReportSection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartAnalysisResponse {
    pub task_id: String,
}

/// One status poll observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub message: Option<String>,
    /// Symbol the server is currently processing
    #[serde(default)]
    pub current_stock: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub active_tasks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub stocks: Vec<super::models::Stock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockListResponse {
    pub total_count: u64,
}

/// Finished analysis report.
///
/// Sections the server did not produce are absent; unknown extra sections
/// are preserved rather than rejected so a newer server stays readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_stats: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_summary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_matrix: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisResult {
    /// Sections present in this report, in presentation order
    pub fn sections(&self) -> Vec<ReportSection> {
        let mut sections = Vec::new();
        if let Some(stats) = &self.basic_stats {
            sections.push(ReportSection::BasicStats(stats.clone()));
        }
        if let Some(perf) = &self.performance_summary {
            sections.push(ReportSection::PerformanceSummary(perf.clone()));
        }
        if let Some(corr) = &self.correlation_matrix {
            sections.push(ReportSection::CorrelationMatrix(corr.clone()));
        }
        sections
    }
}

/// Outcome of one result-endpoint fetch
#[derive(Debug, Clone, PartialEq)]
pub enum ResultFetch {
    /// Report is ready
    Ready(AnalysisResult),
    /// HTTP 202: job still running, keep polling
    Pending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_preserves_unknown_sections() {
        let report: AnalysisResult = serde_json::from_value(serde_json::json!({
            "basic_stats": { "mean_return": 0.01 },
            "regime_breaks": [1, 2, 3]
        }))
        .expect("parse report");

        assert!(report.basic_stats.is_some());
        assert!(report.extra.contains_key("regime_breaks"));
    }

    #[test]
    fn test_result_sections_order_and_kinds() {
        let report: AnalysisResult = serde_json::from_value(serde_json::json!({
            "correlation_matrix": {},
            "basic_stats": {}
        }))
        .expect("parse report");

        let kinds: Vec<&str> = report.sections().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec!["basic_stats", "correlation_matrix"]);
    }
}
