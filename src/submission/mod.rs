//! Submission module
//!
//! Dispatches a job snapshot to the pipeline and turns the outcome into
//! something a surface can render.

mod controller;
mod present;

pub use controller::{Rejection, SubmissionController, SubmissionState, SubmitOutcome};
pub use present::{present, Presentation};
