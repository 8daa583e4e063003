//! Submit-readiness checks.

use std::fmt;

use super::form::JobForm;

/// A required input that is missing or unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    FrameworkStructure,
    TargetStructure,
    BackboneDesigns,
}

impl MissingField {
    pub fn label(&self) -> &'static str {
        match self {
            MissingField::FrameworkStructure => "Framework Structure",
            MissingField::TargetStructure => "Target Structure",
            MissingField::BackboneDesigns => "Backbone Designs (positive integer)",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse the way an HTML number input's value is read: leading whitespace and
/// sign allowed, digits up to the first non-digit, base 10.
pub(crate) fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    // Only digits remain, so a parse error is overflow.
    let value = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

fn is_positive(raw: &str) -> bool {
    parse_int(raw).map(|v| v > 0).unwrap_or(false)
}

impl JobForm {
    /// Every required input that blocks submission, in display order.
    pub fn missing_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if self.framework_file().is_none() {
            missing.push(MissingField::FrameworkStructure);
        }
        if self.target_file().is_none() {
            missing.push(MissingField::TargetStructure);
        }
        if !is_positive(self.rf_diffusion_designs()) {
            missing.push(MissingField::BackboneDesigns);
        }
        missing
    }

    pub fn is_submittable(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Non-blocking warnings for numeric fields the server validates itself.
    pub fn advisories(&self) -> Vec<String> {
        let checks = [
            ("RFdiffusion final step", self.rf_diffusion_final_step()),
            ("RFdiffusion diffuser T", self.rf_diffusion_diffuser_t()),
            ("MPNN sequences", self.protein_mpnn_designs()),
        ];

        checks
            .iter()
            .filter_map(|(label, raw)| match parse_int(raw) {
                None => Some(format!(
                    "{label} '{}' is not a number; submission will fail",
                    raw.trim()
                )),
                Some(value) if value <= 0 => Some(format!(
                    "{label} is {value}; the pipeline expects at least 1"
                )),
                Some(_) => None,
            })
            .collect()
    }
}
