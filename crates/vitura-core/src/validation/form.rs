//! Stateful form helper driving the validator on change, blur and submit.

use std::collections::BTreeSet;

use super::{validate, FieldValues, FormErrors, RuleSet};

/// Values, errors and touched flags of one form.
///
/// Typing into a field only clears its error; length and pattern errors are
/// recomputed on blur or on [`FormState::validate_form`].
#[derive(Debug, Clone)]
pub struct FormState {
    initial: FieldValues,
    values: FieldValues,
    errors: FormErrors,
    touched: BTreeSet<String>,
    rules: RuleSet,
}

impl FormState {
    pub fn new(initial: FieldValues, rules: RuleSet) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: FormErrors::new(),
            touched: BTreeSet::new(),
            rules,
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Store a new value and drop any error shown for the field.
    pub fn handle_change(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
        self.errors.remove(field);
    }

    /// Mark the field touched and re-check just that field.
    pub fn handle_blur(&mut self, field: &str) {
        self.touched.insert(field.to_string());
        let error = self
            .rules
            .check_field(field, self.values.get(field).map(String::as_str));
        self.errors.set(field, error);
    }

    /// Re-check every field. Returns true when the form is clean.
    pub fn validate_form(&mut self) -> bool {
        self.errors = validate(&self.values, &self.rules);
        self.errors.is_empty()
    }

    /// Attach an error that no rule produces (e.g. a failed submission).
    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field, message);
    }

    pub fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    /// Back to the initial values with no errors and nothing touched.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
    }
}
