//! Job module
//!
//! Field state, placeholder resolution, readiness checks and payload assembly
//! for one RFantibody pipeline job.

pub mod form;
pub mod payload;
pub mod placeholder;
pub mod validate;

pub use form::{Attachment, FoldModel, FormField, JobConfiguration, JobForm, Mode};
pub use payload::{build_payload, JobPayload, PayloadError};
pub use validate::MissingField;
