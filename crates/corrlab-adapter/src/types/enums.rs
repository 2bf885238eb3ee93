/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Server-reported lifecycle status of an analysis job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal statuses end polling; no further ticks are issued.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Market scope filter for stock search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    #[default]
    All,
    Kospi,
    Kosdaq,
}

impl Market {
    /// Query-string value; `All` is expressed by omitting the parameter.
    pub fn as_query_param(&self) -> Option<&'static str> {
        match self {
            Market::All => None,
            Market::Kospi => Some("kospi"),
            Market::Kosdaq => Some("kosdaq"),
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Market::All),
            "kospi" => Ok(Market::Kospi),
            "kosdaq" => Ok(Market::Kosdaq),
            other => Err(format!("unknown market: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pending", JobStatus::Pending, false)]
    #[case("running", JobStatus::Running, false)]
    #[case("completed", JobStatus::Completed, true)]
    #[case("failed", JobStatus::Failed, true)]
    fn test_job_status_wire_format(
        #[case] wire: &str,
        #[case] expected: JobStatus,
        #[case] terminal: bool,
    ) {
        let parsed: JobStatus =
            serde_json::from_value(serde_json::json!(wire)).expect("parse status");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.is_terminal(), terminal);
    }

    #[test]
    fn test_market_from_str() {
        assert_eq!("KOSPI".parse::<Market>(), Ok(Market::Kospi));
        assert_eq!("all".parse::<Market>(), Ok(Market::All));
        assert!("nyse".parse::<Market>().is_err());
    }

    #[test]
    fn test_market_query_param() {
        assert_eq!(Market::All.as_query_param(), None);
        assert_eq!(Market::Kosdaq.as_query_param(), Some("kosdaq"));
    }
}
