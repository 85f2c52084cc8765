//! Analysis Service Integration
//!
//! This module provides access to the remote analysis service through a
//! common trait interface, so the Conductor can be driven by the real HTTP
//! client or by a scripted backend in tests.
//!
//! # Usage
//!
//! ```ignore
//! use datachat_conductor::backend::{AnalysisBackend, HttpBackend};
//!
//! let backend = HttpBackend::from_config(&config)?;
//! let result = backend.submit_query("project-1", "How many orders per region?").await?;
//! ```

mod error;
mod http;
mod traits;

pub use error::{BackendError, GENERIC_FAILURE_MESSAGE};
pub use http::HttpBackend;
pub use traits::AnalysisBackend;
