//! Multipart request body for the pipeline endpoint.

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use super::form::{Attachment, JobForm};
use super::validate::parse_int;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("{field} must be an integer (got '{raw}')")]
    InvalidInteger { field: &'static str, raw: String },

    #[error("{0} is not attached")]
    MissingAttachment(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(Attachment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub name: &'static str,
    pub value: PartValue,
}

/// Ordered form parts, ready to become a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPayload {
    parts: Vec<PayloadPart>,
}

impl JobPayload {
    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&'static str> {
        self.parts.iter().map(|part| part.name).collect()
    }

    /// Value of a text part, if present.
    #[cfg(test)]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.value {
            PartValue::Text(value) if part.name == name => Some(value.as_str()),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn file(&self, name: &str) -> Option<&Attachment> {
        self.parts.iter().find_map(|part| match &part.value {
            PartValue::File(file) if part.name == name => Some(file),
            _ => None,
        })
    }

    pub fn into_multipart(self) -> Form {
        self.parts
            .into_iter()
            .fold(Form::new(), |form, part| match part.value {
                PartValue::Text(value) => form.text(part.name, value),
                PartValue::File(file) => {
                    let body = Part::bytes(file.bytes().to_vec())
                        .file_name(file.file_name().to_string());
                    form.part(part.name, body)
                }
            })
    }
}

fn integer_part(field: &'static str, raw: &str) -> Result<PayloadPart, PayloadError> {
    let value = parse_int(raw).ok_or_else(|| PayloadError::InvalidInteger {
        field,
        raw: raw.trim().to_string(),
    })?;
    Ok(text_part(field, value.to_string()))
}

fn text_part(name: &'static str, value: impl Into<String>) -> PayloadPart {
    PayloadPart {
        name,
        value: PartValue::Text(value.into()),
    }
}

fn file_part(name: &'static str, file: Option<&Attachment>) -> Result<PayloadPart, PayloadError> {
    let file = file.ok_or(PayloadError::MissingAttachment(name))?;
    Ok(PayloadPart {
        name,
        value: PartValue::File(file.clone()),
    })
}

/// Map resolved field values onto the pipeline's form parts.
///
/// `job_name` is passed in rather than derived so the caller controls when the
/// default name is generated.
pub fn build_payload(form: &JobForm, job_name: &str) -> Result<JobPayload, PayloadError> {
    let parts = vec![
        text_part("jobName", job_name),
        text_part("mode", form.mode().as_api_value()),
        text_part("fold", form.fold().as_api_value()),
        // Always sent; empty means no hotspots.
        text_part("hotspots", form.hotspots().effective_value()),
        integer_part("rfDiffusionDesigns", form.rf_diffusion_designs())?,
        text_part("designLoops", form.design_loops().effective_value()),
        integer_part("rfDiffusionFinalStep", form.rf_diffusion_final_step())?,
        text_part(
            "rfDiffusionDeterministic",
            form.rf_diffusion_deterministic().to_string(),
        ),
        integer_part("rfDiffusionDiffuserT", form.rf_diffusion_diffuser_t())?,
        integer_part("proteinMPNNDesigns", form.protein_mpnn_designs())?,
        file_part("frameworkFile", form.framework_file())?,
        file_part("targetFile", form.target_file())?,
    ];

    Ok(JobPayload { parts })
}
