//! Application-wide store container.

use std::sync::Arc;

use crate::client::{CollectionClient, HttpResourceClient, NetworkResult};
use crate::config::ApiConfig;
use crate::models::{Patient, Prescription};

use super::{PatientStore, PrescriptionStore};

/// Owns both entity stores for the lifetime of the application.
///
/// Created once at start-up and handed to views by reference or `Arc`.
pub struct ClinicContext {
    patients: PatientStore,
    prescriptions: PrescriptionStore,
}

impl ClinicContext {
    /// Build both stores on one client.
    pub fn new<C>(client: Arc<C>) -> Self
    where
        C: CollectionClient<Patient> + CollectionClient<Prescription> + 'static,
    {
        let patients: Arc<dyn CollectionClient<Patient>> = client.clone();
        let prescriptions: Arc<dyn CollectionClient<Prescription>> = client;
        Self {
            patients: PatientStore::new(patients),
            prescriptions: PrescriptionStore::new(prescriptions),
        }
    }

    /// Context backed by the HTTP client for `config`.
    pub fn connect(config: ApiConfig) -> NetworkResult<Self> {
        tracing::info!("Connecting to {}", config.base_url);
        let client = HttpResourceClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn patients(&self) -> &PatientStore {
        &self.patients
    }

    pub fn prescriptions(&self) -> &PrescriptionStore {
        &self.prescriptions
    }

    /// Fetch both collections concurrently.
    ///
    /// Each store records its own outcome; the first error is returned.
    pub async fn refresh_all(&self) -> NetworkResult<()> {
        let (patients, prescriptions) =
            futures::join!(self.patients.fetch_all(), self.prescriptions.fetch_all());
        patients?;
        prescriptions?;
        Ok(())
    }
}
