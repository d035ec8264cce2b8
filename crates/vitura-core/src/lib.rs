//! Vitura Core Library
//!
//! Client-side data sync for the clinic UI: patients, prescriptions and the
//! new-prescription form.
//!
//! # Architecture
//!
//! ```text
//!   View Layer (native UI via FFI, or Rust)
//!        │  reads snapshots / status        ▲ watch notifications
//!        │  fetch_all() / create()          │
//!        ▼                                  │
//!   ┌──────────────────────────────────────────────┐
//!   │ ClinicContext                                │
//!   │   PatientStore        PrescriptionStore      │
//!   │   Empty → Loading → Ready | Failed           │
//!   └──────────────────────┬───────────────────────┘
//!                          │ CollectionClient
//!                          ▼
//!                  HttpResourceClient ──► GET/POST /patients
//!                                         GET/POST /prescriptions
//!
//!   PrescriptionForm ── validation::validate ── FormErrors
//! ```
//!
//! # Core Principle
//!
//! **Stores are the only writers of their snapshot.** A fetch replaces it
//! wholesale, a create appends, a failure changes nothing.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Prescription, Entity)
//! - [`client`]: Resource client trait and reqwest implementation
//! - [`store`]: Entity stores and the application context
//! - [`validation`]: Declarative field validation and form state
//! - [`forms`]: New-prescription flow
//! - [`views`]: History filter/sort and patient labels
//! - [`config`]: Endpoint configuration
//! - [`logging`]: Tracing subscriber setup

pub mod client;
pub mod config;
pub mod forms;
pub mod logging;
pub mod models;
pub mod store;
pub mod validation;
pub mod views;

// Re-export commonly used types
pub use client::{CollectionClient, HttpResourceClient, NetworkError, NetworkResult};
pub use config::{ApiConfig, ConfigError};
pub use forms::{PrescriptionForm, SubmitOutcome};
pub use models::{Entity, EntityId, NewPatient, NewPrescription, Patient, Prescription, Resource};
pub use store::{
    ClinicContext, EntityStore, PatientStore, PrescriptionStore, StoreState, StoreStatus,
};
pub use validation::{validate, FieldRule, FieldValues, FormErrors, FormState, RuleSet};
pub use views::{patient_label, prescription_history, HistoryQuery, HistoryRow, HistorySort};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VituraError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<NetworkError> for VituraError {
    fn from(e: NetworkError) -> Self {
        VituraError::NetworkError(e.to_string())
    }
}

impl From<ConfigError> for VituraError {
    fn from(e: ConfigError) -> Self {
        VituraError::ConfigError(e.to_string())
    }
}

impl From<std::io::Error> for VituraError {
    fn from(e: std::io::Error) -> Self {
        VituraError::RuntimeError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VituraError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VituraError::RuntimeError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Connect to the backend. `base_url` overrides configuration and environment.
#[uniffi::export]
pub fn connect(base_url: Option<String>) -> Result<Arc<ClinicCore>, VituraError> {
    let mut config = ApiConfig::load(None)?;
    if let Some(url) = base_url {
        config.base_url = url;
        config.validate()?;
    }
    let context = ClinicContext::connect(config)?;
    Ok(Arc::new(ClinicCore::with_context(context)?))
}

/// Install the tracing subscriber. Returns false if one already exists.
#[uniffi::export]
pub fn init_logging(default_filter: String, json: bool) -> bool {
    logging::init_logging(&default_filter, json)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Stores and form state for one UI session.
///
/// Owns a tokio runtime and blocks on it from every exported method, so it
/// must be called (and dropped) from a thread that is not already inside a
/// tokio runtime. Rust async code should use [`ClinicContext`] directly.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    runtime: tokio::runtime::Runtime,
    context: ClinicContext,
    form: Mutex<PrescriptionForm>,
}

impl ClinicCore {
    /// Wrap an existing context with its own runtime.
    ///
    /// Only reachable through [`connect`] outside this crate; see the
    /// type-level note on runtime nesting.
    pub(crate) fn with_context(context: ClinicContext) -> Result<Self, VituraError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            context,
            form: Mutex::new(PrescriptionForm::new()),
        })
    }

    pub fn context(&self) -> &ClinicContext {
        &self.context
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Fetch all patients, replacing the snapshot.
    pub fn refresh_patients(&self) -> Result<Vec<FfiPatient>, VituraError> {
        let items = self.runtime.block_on(self.context.patients().fetch_all())?;
        Ok(items.iter().cloned().map(Into::into).collect())
    }

    /// Fetch all prescriptions, replacing the snapshot.
    pub fn refresh_prescriptions(&self) -> Result<Vec<FfiPrescription>, VituraError> {
        let items = self
            .runtime
            .block_on(self.context.prescriptions().fetch_all())?;
        Ok(items.iter().cloned().map(Into::into).collect())
    }

    /// Current patients snapshot.
    pub fn patients(&self) -> Vec<FfiPatient> {
        self.context
            .patients()
            .snapshot()
            .iter()
            .cloned()
            .map(Into::into)
            .collect()
    }

    /// Current prescriptions snapshot.
    pub fn prescriptions(&self) -> Vec<FfiPrescription> {
        self.context
            .prescriptions()
            .snapshot()
            .iter()
            .cloned()
            .map(Into::into)
            .collect()
    }

    pub fn patients_status(&self) -> FfiStoreStatus {
        self.context.patients().status().into()
    }

    pub fn prescriptions_status(&self) -> FfiStoreStatus {
        self.context.prescriptions().status().into()
    }

    /// Message of the last failed fetch, per collection.
    pub fn patients_error(&self) -> Option<String> {
        self.context.patients().last_error()
    }

    pub fn prescriptions_error(&self) -> Option<String> {
        self.context.prescriptions().last_error()
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Filtered, sorted, labelled prescription history.
    pub fn prescription_history(&self, filter: String, sort_by_drug: bool) -> Vec<FfiHistoryRow> {
        let query = HistoryQuery {
            filter,
            sort_by: if sort_by_drug {
                HistorySort::Drug
            } else {
                HistorySort::Date
            },
        };
        let prescriptions = self.context.prescriptions().snapshot();
        let patients = self.context.patients().snapshot();
        views::prescription_history(&prescriptions, &patients, &query)
            .into_iter()
            .map(Into::into)
            .collect()
    }

    // =========================================================================
    // New Prescription Form
    // =========================================================================

    /// Select a loaded patient, or clear the selection with `None`.
    pub fn select_patient(&self, patient_id: Option<i64>) -> Result<(), VituraError> {
        let patient = match patient_id {
            Some(id) => Some(
                self.context
                    .patients()
                    .find(id)
                    .ok_or_else(|| VituraError::NotFound(format!("patient {}", id)))?,
            ),
            None => None,
        };
        self.form.lock()?.select_patient(patient);
        Ok(())
    }

    pub fn set_drug_name(&self, value: String) -> Result<(), VituraError> {
        self.form.lock()?.set_drug_name(value);
        Ok(())
    }

    pub fn set_dosage(&self, value: String) -> Result<(), VituraError> {
        self.form.lock()?.set_dosage(value);
        Ok(())
    }

    /// Re-validate one field on focus loss.
    pub fn blur_field(&self, field: String) -> Result<(), VituraError> {
        self.form.lock()?.blur(&field);
        Ok(())
    }

    /// Field name to message for everything currently failing.
    pub fn form_errors(&self) -> Result<HashMap<String, String>, VituraError> {
        Ok(self.form.lock()?.errors().clone().into_map().into_iter().collect())
    }

    /// Validate and create. Validation and network failures come back as
    /// errors in the outcome, never as `Err`.
    pub fn submit_prescription(&self) -> Result<FfiSubmitOutcome, VituraError> {
        let mut form = self.form.lock()?;
        let patients = self.context.patients().snapshot();
        let outcome = self
            .runtime
            .block_on(form.submit(self.context.prescriptions(), &patients));

        let created = match outcome {
            SubmitOutcome::Created(prescription) => Some(prescription.into()),
            SubmitOutcome::Invalid(_) => None,
            SubmitOutcome::Failed(e) => {
                tracing::warn!("Prescription submit failed: {}", e);
                None
            }
        };
        Ok(FfiSubmitOutcome {
            created,
            errors: form.errors().clone().into_map().into_iter().collect(),
        })
    }

    pub fn dismiss_submit_error(&self) -> Result<(), VituraError> {
        self.form.lock()?.dismiss_submit_error();
        Ok(())
    }

    /// Whether the "created" banner should still be shown.
    pub fn success_visible(&self) -> Result<bool, VituraError> {
        Ok(self.form.lock()?.success_visible())
    }

    /// Banner text, or `None` once the banner has expired.
    pub fn success_message(&self) -> Result<Option<String>, VituraError> {
        Ok(self.form.lock()?.success_message().map(str::to_string))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub full_name: String,
    pub initials: String,
    /// ISO 8601 date
    pub date_of_birth: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            initials: patient.initials(),
            id: patient.id,
            date_of_birth: patient.date_of_birth.to_string(),
            full_name: patient.full_name,
        }
    }
}

/// FFI-safe prescription.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPrescription {
    pub id: i64,
    pub patient_id: i64,
    pub drug_name: String,
    pub dosage: String,
    /// ISO 8601 date
    pub date_prescribed: String,
}

impl From<Prescription> for FfiPrescription {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            patient_id: p.patient_id,
            drug_name: p.drug_name,
            dosage: p.dosage,
            date_prescribed: p.date_prescribed.to_string(),
        }
    }
}

/// FFI-safe history row.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiHistoryRow {
    pub prescription: FfiPrescription,
    pub patient_name: String,
}

impl From<HistoryRow> for FfiHistoryRow {
    fn from(row: HistoryRow) -> Self {
        Self {
            prescription: row.prescription.into(),
            patient_name: row.patient_name,
        }
    }
}

/// FFI-safe store status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiStoreStatus {
    Empty,
    Loading,
    Ready,
    Failed,
}

impl From<StoreStatus> for FfiStoreStatus {
    fn from(status: StoreStatus) -> Self {
        match status {
            StoreStatus::Empty => FfiStoreStatus::Empty,
            StoreStatus::Loading => FfiStoreStatus::Loading,
            StoreStatus::Ready => FfiStoreStatus::Ready,
            StoreStatus::Failed => FfiStoreStatus::Failed,
        }
    }
}

/// FFI-safe submit result.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSubmitOutcome {
    /// The stored prescription, on success
    pub created: Option<FfiPrescription>,
    /// Remaining field / submit errors
    pub errors: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    /// Backend double holding both collections in memory.
    #[derive(Default)]
    struct MemoryBackend {
        patients: Mutex<Vec<Patient>>,
        prescriptions: Mutex<Vec<Prescription>>,
    }

    #[async_trait]
    impl CollectionClient<Patient> for MemoryBackend {
        async fn fetch_all(&self) -> NetworkResult<Vec<Patient>> {
            Ok(self.patients.lock().unwrap().clone())
        }

        async fn create(&self, draft: &NewPatient) -> NetworkResult<Patient> {
            let mut patients = self.patients.lock().unwrap();
            let patient = Patient::new(
                patients.len() as i64 + 1,
                draft.full_name.clone(),
                draft.date_of_birth,
            );
            patients.push(patient.clone());
            Ok(patient)
        }
    }

    #[async_trait]
    impl CollectionClient<Prescription> for MemoryBackend {
        async fn fetch_all(&self) -> NetworkResult<Vec<Prescription>> {
            Ok(self.prescriptions.lock().unwrap().clone())
        }

        async fn create(&self, draft: &NewPrescription) -> NetworkResult<Prescription> {
            let mut prescriptions = self.prescriptions.lock().unwrap();
            let created = draft.clone().with_id(1001 + prescriptions.len() as i64);
            prescriptions.push(created.clone());
            Ok(created)
        }
    }

    fn core() -> ClinicCore {
        let backend = MemoryBackend::default();
        backend.patients.lock().unwrap().push(Patient::new(
            1,
            "Alice Smith",
            NaiveDate::from_ymd_opt(1985, 4, 10).unwrap(),
        ));
        ClinicCore::with_context(ClinicContext::new(Arc::new(backend))).unwrap()
    }

    #[test]
    fn test_ffi_patient_conversion() {
        let ffi: FfiPatient =
            Patient::new(1, "Alice Smith", NaiveDate::from_ymd_opt(1985, 4, 10).unwrap()).into();
        assert_eq!(ffi.date_of_birth, "1985-04-10");
        assert_eq!(ffi.initials, "AS");
    }

    #[test]
    fn test_submit_through_facade() {
        let core = core();
        assert_eq!(core.patients_status(), FfiStoreStatus::Empty);

        let patients = core.refresh_patients().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(core.patients_status(), FfiStoreStatus::Ready);

        let outcome = core.submit_prescription().unwrap();
        assert!(outcome.created.is_none());
        assert_eq!(outcome.errors.len(), 3);

        core.select_patient(Some(1)).unwrap();
        core.set_drug_name("Amoxicillin".into()).unwrap();
        core.set_dosage("500mg".into()).unwrap();
        let outcome = core.submit_prescription().unwrap();

        let created = outcome.created.unwrap();
        assert_eq!(created.id, 1001);
        assert!(outcome.errors.is_empty());
        assert!(core.success_visible().unwrap());
        assert_eq!(
            core.success_message().unwrap().as_deref(),
            Some(forms::SUCCESS_MESSAGE)
        );

        let history = core.prescription_history(String::new(), false);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].patient_name, "Alice Smith");
    }

    #[test]
    fn test_core_lives_on_plain_thread() {
        let handle = std::thread::spawn(|| {
            let core = core();
            let patients = core.refresh_patients().unwrap();
            drop(core);
            patients.len()
        });
        assert_eq!(handle.join().unwrap(), 1);
    }

    #[test]
    fn test_select_unknown_patient() {
        let core = core();
        let err = core.select_patient(Some(42)).unwrap_err();
        assert!(matches!(err, VituraError::NotFound(_)));
        core.select_patient(None).unwrap();
    }
}
