/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parameters for submitting a new analysis job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rolling correlation window in trading days
    pub window: u32,
    /// Tickers to include in the analysis
    pub tickers: Vec<String>,
}
