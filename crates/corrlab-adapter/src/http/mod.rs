/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod analysis;
pub mod client;
pub mod error;
pub mod public;

pub use error::{ApiError, Result};

pub use client::{ApiClient, ClientConfig};
