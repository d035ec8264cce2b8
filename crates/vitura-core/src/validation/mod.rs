//! Declarative form validation.
//!
//! [`validate`] is pure: values and rules in, per-field messages out. Only
//! failing fields appear in the result.
//!
//! Per field the checks run in order: required, min length, max length,
//! pattern, custom. A failed required check skips the rest for that field.

mod form;

pub use form::*;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format";

/// Field name to current value.
pub type FieldValues = BTreeMap<String, String>;

type CustomCheck = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Rules for a single field.
#[derive(Clone, Default)]
pub struct FieldRule {
    pub required: bool,
    /// Overrides [`REQUIRED_MESSAGE`]
    pub required_message: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    custom: Option<CustomCheck>,
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Required, with a field-specific message.
    pub fn required_with(message: impl Into<String>) -> Self {
        Self {
            required: true,
            required_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Arbitrary check returning an error message on failure.
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    /// Evaluate this rule against one value.
    pub fn check(&self, value: &str) -> Option<String> {
        if self.required && value.trim().is_empty() {
            return Some(
                self.required_message
                    .clone()
                    .unwrap_or_else(|| REQUIRED_MESSAGE.to_string()),
            );
        }

        let len = value.chars().count();
        if let Some(min) = self.min_length.filter(|&min| len < min) {
            return Some(format!("Minimum length is {min} characters"));
        }
        if let Some(max) = self.max_length.filter(|&max| len > max) {
            return Some(format!("Maximum length is {max} characters"));
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Some(INVALID_FORMAT_MESSAGE.to_string());
            }
        }

        self.custom.as_ref().and_then(|check| check(value))
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("required", &self.required)
            .field("required_message", &self.required_message)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Rules keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, FieldRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }

    /// Validate one field. Fields without rules always pass.
    ///
    /// A missing value is treated as the empty string.
    pub fn check_field(&self, name: &str, value: Option<&str>) -> Option<String> {
        self.get(name)
            .and_then(|rule| rule.check(value.unwrap_or("")))
    }
}

/// Field name to error message, failing fields only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    /// Store `message` for `field`, or drop the entry when the field passed.
    pub fn set(&mut self, field: &str, message: Option<String>) {
        match message {
            Some(message) => self.insert(field, message),
            None => {
                self.remove(field);
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Check every ruled field in `values`.
pub fn validate(values: &FieldValues, rules: &RuleSet) -> FormErrors {
    rules
        .rules
        .iter()
        .filter_map(|(name, rule)| {
            let value = values.get(name).map(String::as_str).unwrap_or("");
            rule.check(value).map(|message| (name.clone(), message))
        })
        .collect()
}
