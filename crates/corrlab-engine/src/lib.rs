/*
[INPUT]:  Public API exports for the corrlab engine crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod engine;
pub mod fetch;
pub mod health;
pub mod link;
pub mod reducer;
pub mod request;
pub mod search;

mod poll;

// Re-export main types for convenience
pub use config::{EngineConfig, ResultProtocol};
pub use engine::{AnalysisEngine, UiIntent};
pub use fetch::ResultGate;
pub use health::ServiceHealth;
pub use reducer::{FailureKind, TaskError, TaskEvent, TaskPhase, TaskState, reduce};
pub use request::{Outcome, issue};
pub use search::{SearchBatch, SearchResolver};
