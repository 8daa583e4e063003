//! Field state for one job.
//!
//! `JobForm` is the mutable store an interactive surface edits; `snapshot()`
//! freezes it into a `JobConfiguration` for submission.

use std::fmt;
use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::placeholder::OptionalField;

/// Hotspots default to none.
pub const DEFAULT_HOTSPOTS: &str = "";
pub const DEFAULT_DESIGN_LOOPS: &str = "H1:7,H2:6,H3:5-13";

const DEFAULT_RF_DIFFUSION_DESIGNS: &str = "1";
const DEFAULT_RF_DIFFUSION_FINAL_STEP: &str = "48";
const DEFAULT_RF_DIFFUSION_DIFFUSER_T: &str = "50";
const DEFAULT_PROTEIN_MPNN_DESIGNS: &str = "1";

const JOB_NAME_PREFIX: &str = "RFantibody_";

/// Design mode; decides which framework type the pipeline expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Antibody,
    Nanobody,
}

impl Mode {
    pub fn as_api_value(&self) -> &'static str {
        match self {
            Mode::Antibody => "Antibody",
            Mode::Nanobody => "Nanobody",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Mode::Antibody => Mode::Nanobody,
            Mode::Nanobody => Mode::Antibody,
        }
    }
}

/// Structure prediction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldModel {
    #[default]
    Af3,
    Rf2,
}

impl FoldModel {
    pub fn as_api_value(&self) -> &'static str {
        match self {
            FoldModel::Af3 => "AF3",
            FoldModel::Rf2 => "RF2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FoldModel::Af3 => "Alphafold3",
            FoldModel::Rf2 => "RoseTTAFold2",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FoldModel::Af3 => FoldModel::Rf2,
            FoldModel::Rf2 => FoldModel::Af3,
        }
    }
}

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a file")]
    NotAFile(String),
}

/// A selected structure file: the original file name plus its contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let display = path.display().to_string();
        if path.is_dir() {
            return Err(AttachmentError::NotAFile(display));
        }
        let bytes = fs::read(path).map_err(|source| AttachmentError::Read {
            path: display.clone(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or(display);
        Ok(Self::new(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Every field of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    JobName,
    Fold,
    Mode,
    FrameworkFile,
    TargetFile,
    Hotspots,
    DesignLoops,
    RfDiffusionDesigns,
    RfDiffusionFinalStep,
    RfDiffusionDeterministic,
    RfDiffusionDiffuserT,
    ProteinMpnnDesigns,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::JobName,
        FormField::Fold,
        FormField::Mode,
        FormField::FrameworkFile,
        FormField::TargetFile,
        FormField::Hotspots,
        FormField::DesignLoops,
        FormField::RfDiffusionDesigns,
        FormField::RfDiffusionFinalStep,
        FormField::RfDiffusionDeterministic,
        FormField::RfDiffusionDiffuserT,
        FormField::ProteinMpnnDesigns,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::JobName => "Job name",
            FormField::Fold => "Structure model",
            FormField::Mode => "Mode",
            FormField::FrameworkFile => "Input framework",
            FormField::TargetFile => "Input target",
            FormField::Hotspots => "Hotspots (opt)",
            FormField::DesignLoops => "Design loops",
            FormField::RfDiffusionDesigns => "Backbone designs",
            FormField::RfDiffusionFinalStep => "Final step",
            FormField::RfDiffusionDeterministic => "Deterministic",
            FormField::RfDiffusionDiffuserT => "Diffuser T",
            FormField::ProteinMpnnDesigns => "MPNN sequences",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::JobName
                | FormField::Hotspots
                | FormField::DesignLoops
                | FormField::RfDiffusionDesigns
                | FormField::RfDiffusionFinalStep
                | FormField::RfDiffusionDiffuserT
                | FormField::ProteinMpnnDesigns
        )
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FormField::FrameworkFile | FormField::TargetFile)
    }
}

/// Raw values of every configurable field.
///
/// Setters replace one field and touch nothing else; no validation happens here.
#[derive(Debug, Clone)]
pub struct JobForm {
    job_name: String,
    mode: Mode,
    fold: FoldModel,
    hotspots: OptionalField,
    design_loops: OptionalField,
    rf_diffusion_designs: String,
    rf_diffusion_final_step: String,
    rf_diffusion_deterministic: bool,
    rf_diffusion_diffuser_t: String,
    protein_mpnn_designs: String,
    framework_file: Option<Attachment>,
    target_file: Option<Attachment>,
}

impl Default for JobForm {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            mode: Mode::default(),
            fold: FoldModel::default(),
            hotspots: OptionalField::new(DEFAULT_HOTSPOTS),
            design_loops: OptionalField::new(DEFAULT_DESIGN_LOOPS),
            rf_diffusion_designs: DEFAULT_RF_DIFFUSION_DESIGNS.to_string(),
            rf_diffusion_final_step: DEFAULT_RF_DIFFUSION_FINAL_STEP.to_string(),
            rf_diffusion_deterministic: false,
            rf_diffusion_diffuser_t: DEFAULT_RF_DIFFUSION_DIFFUSER_T.to_string(),
            protein_mpnn_designs: DEFAULT_PROTEIN_MPNN_DESIGNS.to_string(),
            framework_file: None,
            target_file: None,
        }
    }
}

impl JobForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn set_job_name(&mut self, value: impl Into<String>) {
        self.job_name = value.into();
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn fold(&self) -> FoldModel {
        self.fold
    }

    pub fn set_fold(&mut self, fold: FoldModel) {
        self.fold = fold;
    }

    pub fn hotspots(&self) -> &OptionalField {
        &self.hotspots
    }

    pub fn hotspots_mut(&mut self) -> &mut OptionalField {
        &mut self.hotspots
    }

    pub fn design_loops(&self) -> &OptionalField {
        &self.design_loops
    }

    pub fn design_loops_mut(&mut self) -> &mut OptionalField {
        &mut self.design_loops
    }

    pub fn rf_diffusion_designs(&self) -> &str {
        &self.rf_diffusion_designs
    }

    pub fn set_rf_diffusion_designs(&mut self, value: impl Into<String>) {
        self.rf_diffusion_designs = value.into();
    }

    pub fn rf_diffusion_final_step(&self) -> &str {
        &self.rf_diffusion_final_step
    }

    pub fn set_rf_diffusion_final_step(&mut self, value: impl Into<String>) {
        self.rf_diffusion_final_step = value.into();
    }

    pub fn rf_diffusion_deterministic(&self) -> bool {
        self.rf_diffusion_deterministic
    }

    pub fn set_rf_diffusion_deterministic(&mut self, value: bool) {
        self.rf_diffusion_deterministic = value;
    }

    pub fn rf_diffusion_diffuser_t(&self) -> &str {
        &self.rf_diffusion_diffuser_t
    }

    pub fn set_rf_diffusion_diffuser_t(&mut self, value: impl Into<String>) {
        self.rf_diffusion_diffuser_t = value.into();
    }

    pub fn protein_mpnn_designs(&self) -> &str {
        &self.protein_mpnn_designs
    }

    pub fn set_protein_mpnn_designs(&mut self, value: impl Into<String>) {
        self.protein_mpnn_designs = value.into();
    }

    pub fn framework_file(&self) -> Option<&Attachment> {
        self.framework_file.as_ref()
    }

    /// File-selection callback for the framework slot; `None` clears it.
    pub fn select_framework_file(&mut self, file: Option<Attachment>) {
        self.framework_file = file;
    }

    pub fn target_file(&self) -> Option<&Attachment> {
        self.target_file.as_ref()
    }

    /// File-selection callback for the target slot; `None` clears it.
    pub fn select_target_file(&mut self, file: Option<Attachment>) {
        self.target_file = file;
    }

    /// Mutable access to the raw text behind a plain text field.
    ///
    /// Returns `None` for fields that are not free text or that go through
    /// placeholder handling (`Hotspots`, `DesignLoops`).
    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::JobName => Some(&mut self.job_name),
            FormField::RfDiffusionDesigns => Some(&mut self.rf_diffusion_designs),
            FormField::RfDiffusionFinalStep => Some(&mut self.rf_diffusion_final_step),
            FormField::RfDiffusionDiffuserT => Some(&mut self.rf_diffusion_diffuser_t),
            FormField::ProteinMpnnDesigns => Some(&mut self.protein_mpnn_designs),
            _ => None,
        }
    }

    pub fn optional_mut(&mut self, field: FormField) -> Option<&mut OptionalField> {
        match field {
            FormField::Hotspots => Some(&mut self.hotspots),
            FormField::DesignLoops => Some(&mut self.design_loops),
            _ => None,
        }
    }

    /// Trimmed job name, or a fresh timestamped name when blank.
    ///
    /// Not memoized: two calls a second apart can differ, so capture the result once.
    pub fn effective_job_name(&self) -> String {
        self.effective_job_name_at(Utc::now())
    }

    pub fn effective_job_name_at(&self, now: DateTime<Utc>) -> String {
        let trimmed = self.job_name.trim();
        if trimmed.is_empty() {
            default_job_name(now)
        } else {
            trimmed.to_string()
        }
    }

    pub fn snapshot(&self) -> JobConfiguration {
        JobConfiguration {
            form: Arc::new(self.clone()),
        }
    }
}

/// `RFantibody_<UTC timestamp to the second>` with `:` and `.` replaced by `-`.
pub fn default_job_name(now: DateTime<Utc>) -> String {
    let timestamp = now
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
        .replace([':', '.'], "-");
    format!("{JOB_NAME_PREFIX}{timestamp}")
}

/// Point-in-time, read-only copy of a `JobForm`.
#[derive(Debug, Clone)]
pub struct JobConfiguration {
    form: Arc<JobForm>,
}

impl Deref for JobConfiguration {
    type Target = JobForm;

    fn deref(&self) -> &JobForm {
        &self.form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_documented_values() {
        let form = JobForm::new();
        assert_eq!(form.mode(), Mode::Antibody);
        assert_eq!(form.fold(), FoldModel::Af3);
        assert_eq!(form.rf_diffusion_designs(), "1");
        assert_eq!(form.rf_diffusion_final_step(), "48");
        assert_eq!(form.rf_diffusion_diffuser_t(), "50");
        assert_eq!(form.protein_mpnn_designs(), "1");
        assert!(!form.rf_diffusion_deterministic());
        assert_eq!(form.hotspots().effective_value(), "");
        assert_eq!(form.design_loops().effective_value(), DEFAULT_DESIGN_LOOPS);
        assert!(form.framework_file().is_none());
        assert!(form.target_file().is_none());
    }

    #[test]
    fn blank_job_name_uses_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let mut form = JobForm::new();
        form.set_job_name("   ");
        assert_eq!(
            form.effective_job_name_at(now),
            "RFantibody_2025-03-04T05-06-07"
        );
    }

    #[test]
    fn explicit_job_name_is_trimmed() {
        let mut form = JobForm::new();
        form.set_job_name("  pd-l1 round 2 ");
        assert_eq!(form.effective_job_name(), "pd-l1 round 2");
    }

    #[test]
    fn default_job_name_is_not_memoized() {
        let form = JobForm::new();
        let a = form.effective_job_name_at(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let b = form.effective_job_name_at(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn setters_do_not_touch_other_fields() {
        let mut form = JobForm::new();
        form.set_rf_diffusion_final_step("12");
        form.hotspots_mut().set("A21");
        assert_eq!(form.rf_diffusion_final_step(), "12");
        assert_eq!(form.rf_diffusion_designs(), "1");
        assert!(form.design_loops().is_placeholder());
    }

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let mut form = JobForm::new();
        form.set_job_name("first");
        let snapshot = form.snapshot();
        form.set_job_name("second");
        form.select_framework_file(Some(Attachment::new("fw.pdb", b"ATOM".to_vec())));
        assert_eq!(snapshot.job_name(), "first");
        assert!(snapshot.framework_file().is_none());
    }

    #[test]
    fn attachment_keeps_original_file_name() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"HEADER    TEST\n").unwrap();
        let attachment = Attachment::from_path(file.path()).unwrap();
        let expected = file.path().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(attachment.file_name(), expected);
        assert_eq!(attachment.bytes(), b"HEADER    TEST\n");
    }

    #[test]
    fn attachment_rejects_missing_file() {
        let err = Attachment::from_path(Path::new("/definitely/not/here.pdb")).unwrap_err();
        assert!(matches!(err, AttachmentError::Read { .. }));
    }

    #[test]
    fn attachment_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = Attachment::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, AttachmentError::NotAFile(_)));
    }

    #[test]
    fn text_mut_skips_placeholder_fields() {
        let mut form = JobForm::new();
        assert!(form.text_mut(FormField::Hotspots).is_none());
        assert!(form.optional_mut(FormField::Hotspots).is_some());
        form.text_mut(FormField::RfDiffusionDesigns)
            .unwrap()
            .push('0');
        assert_eq!(form.rf_diffusion_designs(), "10");
    }
}
