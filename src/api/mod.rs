//! API module
//!
//! HTTP client for communicating with the RFantibody pipeline service.

mod base;
mod client;
mod response;

pub use base::{ApiBase, DEFAULT_BASE_PATH};
pub use client::{ApiError, ArchiveScope, PipelineClient};
pub use response::PipelineResult;
