//! Optional text fields with a documented default.
//!
//! A field is either `Unset`, in which case its effective value is the fixed
//! default, or `UserSet` with whatever the user typed. Focus and blur move the
//! field between the two states; reading the effective value is pure.

/// Current state of an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Showing the documented default.
    Unset,
    /// Live user input (possibly empty while the field is being edited).
    UserSet(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalField {
    default: &'static str,
    value: FieldValue,
}

impl OptionalField {
    pub const fn new(default: &'static str) -> Self {
        Self {
            default,
            value: FieldValue::Unset,
        }
    }

    #[cfg(test)]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.value, FieldValue::Unset)
    }

    /// Text to show in an input box: the default while unset, raw input otherwise.
    pub fn display_value(&self) -> &str {
        match &self.value {
            FieldValue::Unset => self.default,
            FieldValue::UserSet(raw) => raw,
        }
    }

    /// Enter edit mode. An unset field starts editing from an empty buffer.
    pub fn focus(&mut self) {
        if self.is_placeholder() {
            self.value = FieldValue::UserSet(String::new());
        }
    }

    /// Replace the raw input (the input box `change` event).
    pub fn input(&mut self, raw: impl Into<String>) {
        self.value = FieldValue::UserSet(raw.into());
    }

    /// Edit buffer for character-at-a-time input. Focuses the field first.
    pub fn buffer_mut(&mut self) -> &mut String {
        self.focus();
        match &mut self.value {
            FieldValue::UserSet(raw) => raw,
            FieldValue::Unset => unreachable!("focus always leaves the field user-set"),
        }
    }

    /// Leave edit mode. Blank input falls back to the default.
    pub fn blur(&mut self) {
        if let FieldValue::UserSet(raw) = &self.value {
            if raw.trim().is_empty() {
                self.value = FieldValue::Unset;
            }
        }
    }

    /// Focus, type `raw`, blur: one complete edit as a non-interactive caller sees it.
    pub fn set(&mut self, raw: impl Into<String>) {
        self.focus();
        self.input(raw);
        self.blur();
    }

    /// Drop any user input and go back to the default.
    pub fn reset(&mut self) {
        self.value = FieldValue::Unset;
    }

    /// The value that gets submitted.
    pub fn effective_value(&self) -> &str {
        match &self.value {
            FieldValue::Unset => self.default,
            FieldValue::UserSet(raw) => raw.trim(),
        }
    }
}
