//! Shared test doubles.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::oneshot;
use vitura_core::{
    CollectionClient, NetworkError, NetworkResult, NewPatient, NewPrescription, Patient,
    Prescription,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn alice() -> Patient {
    Patient::new(1, "Alice Smith", date(1985, 4, 10))
}

pub fn bob() -> Patient {
    Patient::new(2, "Bob Jones", date(1978, 9, 22))
}

pub fn carlos() -> Patient {
    Patient::new(3, "Carlos Mendes", date(1990, 1, 15))
}

pub fn amoxicillin() -> Prescription {
    Prescription {
        id: 1001,
        patient_id: 1,
        drug_name: "Amoxicillin".into(),
        dosage: "500mg".into(),
        date_prescribed: date(2024, 12, 1),
    }
}

pub fn ibuprofen() -> Prescription {
    Prescription {
        id: 1002,
        patient_id: 2,
        drug_name: "Ibuprofen".into(),
        dosage: "200mg".into(),
        date_prescribed: date(2024, 12, 3),
    }
}

pub fn unreachable() -> NetworkError {
    NetworkError::Transport {
        url: "http://localhost:5120/api".into(),
        reason: "connection refused".into(),
    }
}

/// In-memory REST backend with a kill switch.
#[derive(Default)]
pub struct MemoryBackend {
    pub patients: Mutex<Vec<Patient>>,
    pub prescriptions: Mutex<Vec<Prescription>>,
    pub offline: Mutex<bool>,
    next_id: Mutex<i64>,
}

impl MemoryBackend {
    pub fn seeded(patients: Vec<Patient>, prescriptions: Vec<Prescription>) -> Arc<Self> {
        let next = prescriptions.iter().map(|p| p.id).max().unwrap_or(1000) + 1;
        Arc::new(Self {
            patients: Mutex::new(patients),
            prescriptions: Mutex::new(prescriptions),
            offline: Mutex::new(false),
            next_id: Mutex::new(next),
        })
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    fn check_online(&self) -> NetworkResult<()> {
        if *self.offline.lock().unwrap() {
            Err(unreachable())
        } else {
            Ok(())
        }
    }

    fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    }
}

#[async_trait]
impl CollectionClient<Patient> for MemoryBackend {
    async fn fetch_all(&self) -> NetworkResult<Vec<Patient>> {
        self.check_online()?;
        Ok(self.patients.lock().unwrap().clone())
    }

    async fn create(&self, draft: &NewPatient) -> NetworkResult<Patient> {
        self.check_online()?;
        let patient = Patient::new(self.allocate_id(), draft.full_name.clone(), draft.date_of_birth);
        self.patients.lock().unwrap().push(patient.clone());
        Ok(patient)
    }
}

#[async_trait]
impl CollectionClient<Prescription> for MemoryBackend {
    async fn fetch_all(&self) -> NetworkResult<Vec<Prescription>> {
        self.check_online()?;
        Ok(self.prescriptions.lock().unwrap().clone())
    }

    async fn create(&self, draft: &NewPrescription) -> NetworkResult<Prescription> {
        self.check_online()?;
        let created = draft.clone().with_id(self.allocate_id());
        self.prescriptions.lock().unwrap().push(created.clone());
        Ok(created)
    }
}

/// Patients client whose fetches block until the test releases them.
///
/// Each fetch takes the next gate in call order and resolves with whatever
/// is sent through it.
pub struct GatedClient {
    gates: Mutex<VecDeque<oneshot::Receiver<NetworkResult<Vec<Patient>>>>>,
    creates: Mutex<VecDeque<NetworkResult<Patient>>>,
}

impl GatedClient {
    pub fn new(
        gates: Vec<oneshot::Receiver<NetworkResult<Vec<Patient>>>>,
        creates: Vec<NetworkResult<Patient>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gates: Mutex::new(gates.into()),
            creates: Mutex::new(creates.into()),
        })
    }

    /// Gates not yet claimed by a fetch.
    pub fn unclaimed(&self) -> usize {
        self.gates.lock().unwrap().len()
    }
}

#[async_trait]
impl CollectionClient<Patient> for GatedClient {
    async fn fetch_all(&self) -> NetworkResult<Vec<Patient>> {
        let gate = self.gates.lock().unwrap().pop_front().expect("no gate left");
        gate.await.expect("gate dropped")
    }

    async fn create(&self, _draft: &NewPatient) -> NetworkResult<Patient> {
        self.creates.lock().unwrap().pop_front().expect("no create result left")
    }
}
