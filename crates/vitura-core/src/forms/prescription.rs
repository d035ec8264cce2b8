//! New-prescription form.
//!
//! A prescription is only sent once a patient from the loaded snapshot is
//! selected and both drug name and dosage are non-blank. The prescription
//! date is always the submission day.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;

use crate::client::NetworkError;
use crate::models::{EntityId, NewPrescription, Patient, Prescription};
use crate::store::PrescriptionStore;
use crate::validation::{FieldRule, FieldValues, FormErrors, FormState, RuleSet};

pub const PATIENT_FIELD: &str = "patientId";
pub const DRUG_NAME_FIELD: &str = "drugName";
pub const DOSAGE_FIELD: &str = "dosage";
/// Error key for a failed create.
pub const SUBMIT_FIELD: &str = "submit";

pub const SELECT_PATIENT_MESSAGE: &str = "Please select a patient";
pub const DRUG_NAME_REQUIRED_MESSAGE: &str = "Drug name is required";
pub const DOSAGE_REQUIRED_MESSAGE: &str = "Dosage is required";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to create prescription. Please try again.";
pub const SUCCESS_MESSAGE: &str = "Prescription created successfully!";

/// How long the success banner stays up after a create.
pub const SUCCESS_BANNER_DURATION: Duration = Duration::from_secs(3);

/// Result of [`PrescriptionForm::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Invalid(FormErrors),
    /// Stored remotely and appended to the store
    Created(Prescription),
    /// The create request failed; the form keeps its values
    Failed(NetworkError),
}

/// Rules applied on submit and blur.
pub fn prescription_rules() -> RuleSet {
    RuleSet::new()
        .field(PATIENT_FIELD, FieldRule::required_with(SELECT_PATIENT_MESSAGE))
        .field(DRUG_NAME_FIELD, FieldRule::required_with(DRUG_NAME_REQUIRED_MESSAGE))
        .field(DOSAGE_FIELD, FieldRule::required_with(DOSAGE_REQUIRED_MESSAGE))
}

fn empty_values() -> FieldValues {
    [PATIENT_FIELD, DRUG_NAME_FIELD, DOSAGE_FIELD]
        .into_iter()
        .map(|field| (field.to_string(), String::new()))
        .collect()
}

/// Ephemeral state of the new-prescription form.
#[derive(Debug, Clone)]
pub struct PrescriptionForm {
    fields: FormState,
    selected_patient: Option<Patient>,
    success_at: Option<Instant>,
}

impl Default for PrescriptionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PrescriptionForm {
    pub fn new() -> Self {
        Self {
            fields: FormState::new(empty_values(), prescription_rules()),
            selected_patient: None,
            success_at: None,
        }
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.selected_patient.as_ref()
    }

    pub fn drug_name(&self) -> &str {
        self.fields.value(DRUG_NAME_FIELD)
    }

    pub fn dosage(&self) -> &str {
        self.fields.value(DOSAGE_FIELD)
    }

    /// Field errors plus the `submit` error, if any.
    pub fn errors(&self) -> &FormErrors {
        self.fields.errors()
    }

    /// Pick (or clear) the patient. Clears the patient error.
    pub fn select_patient(&mut self, patient: Option<Patient>) {
        let value = patient
            .as_ref()
            .map(|p| p.id.to_string())
            .unwrap_or_default();
        self.fields.handle_change(PATIENT_FIELD, value);
        self.selected_patient = patient;
    }

    pub fn set_drug_name(&mut self, value: impl Into<String>) {
        self.fields.handle_change(DRUG_NAME_FIELD, value);
    }

    pub fn set_dosage(&mut self, value: impl Into<String>) {
        self.fields.handle_change(DOSAGE_FIELD, value);
    }

    /// Re-check one field when it loses focus.
    pub fn blur(&mut self, field: &str) {
        self.fields.handle_blur(field);
    }

    /// Check every field; the selection must also be in `patients`.
    pub fn validate(&mut self, patients: &[Patient]) -> bool {
        let mut clean = self.fields.validate_form();

        if let Some(selected) = &self.selected_patient {
            if !patients.iter().any(|p| p.id == selected.id) {
                self.fields.set_error(PATIENT_FIELD, SELECT_PATIENT_MESSAGE);
                clean = false;
            }
        }
        clean
    }

    /// Create payload from the current fields, dated `today`.
    pub fn draft(&self, today: NaiveDate) -> Option<NewPrescription> {
        let patient_id: EntityId = self.selected_patient.as_ref()?.id;
        Some(NewPrescription {
            patient_id,
            drug_name: self.drug_name().trim().to_string(),
            dosage: self.dosage().trim().to_string(),
            date_prescribed: today,
        })
    }

    /// Validate and create, dated with the current UTC calendar day.
    pub async fn submit(&mut self, store: &PrescriptionStore, patients: &[Patient]) -> SubmitOutcome {
        let today = chrono::Utc::now().date_naive();
        self.submit_on(store, patients, today).await
    }

    /// [`PrescriptionForm::submit`] with an explicit prescription date.
    pub async fn submit_on(
        &mut self,
        store: &PrescriptionStore,
        patients: &[Patient],
        today: NaiveDate,
    ) -> SubmitOutcome {
        if !self.validate(patients) {
            tracing::debug!("Prescription form invalid: {:?}", self.errors());
            return SubmitOutcome::Invalid(self.errors().clone());
        }
        let Some(draft) = self.draft(today) else {
            return SubmitOutcome::Invalid(self.errors().clone());
        };

        match store.create(&draft).await {
            Ok(created) => {
                self.fields.reset();
                self.selected_patient = None;
                self.success_at = Some(Instant::now());
                SubmitOutcome::Created(created)
            }
            Err(e) => {
                self.fields.set_error(SUBMIT_FIELD, SUBMIT_FAILED_MESSAGE);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Hide the failed-submission message.
    pub fn dismiss_submit_error(&mut self) {
        self.fields.clear_error(SUBMIT_FIELD);
    }

    /// True during the banner window after a successful create.
    pub fn success_visible(&self) -> bool {
        self.success_at
            .is_some_and(|shown| shown.elapsed() < SUCCESS_BANNER_DURATION)
    }

    /// Banner text while it is visible.
    pub fn success_message(&self) -> Option<&'static str> {
        self.success_visible().then_some(SUCCESS_MESSAGE)
    }
}
