//! Read-only derivations over store snapshots for the view layer.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{EntityId, Patient, Prescription};

/// Label shown when a prescription points at a patient we don't have.
pub const UNKNOWN_PATIENT: &str = "Unknown Patient";

/// Full name of `patient_id`, or [`UNKNOWN_PATIENT`] when the patient is
/// missing or has an empty name.
pub fn patient_label(patients: &[Patient], patient_id: EntityId) -> &str {
    patients
        .iter()
        .find(|p| p.id == patient_id)
        .filter(|p| !p.full_name.is_empty())
        .map(|p| p.full_name.as_str())
        .unwrap_or(UNKNOWN_PATIENT)
}

/// Ordering of the prescription history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistorySort {
    /// Newest first
    #[default]
    Date,
    /// Drug name A-Z, case-insensitive
    Drug,
}

/// Filter and sort applied to the prescription history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Case-insensitive substring of the drug name; empty matches all
    pub filter: String,
    pub sort_by: HistorySort,
}

/// One rendered history line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub patient_name: String,
}

/// Filter, sort and label prescriptions. Ties keep snapshot order.
pub fn prescription_history(
    prescriptions: &[Prescription],
    patients: &[Patient],
    query: &HistoryQuery,
) -> Vec<HistoryRow> {
    let needle = query.filter.to_lowercase();
    let mut matching: Vec<&Prescription> = prescriptions
        .iter()
        .filter(|p| p.drug_name.to_lowercase().contains(&needle))
        .collect();

    matching.sort_by(|a, b| compare(a, b, query.sort_by));

    matching
        .into_iter()
        .map(|p| HistoryRow {
            prescription: p.clone(),
            patient_name: patient_label(patients, p.patient_id).to_string(),
        })
        .collect()
}

fn compare(a: &Prescription, b: &Prescription, sort_by: HistorySort) -> Ordering {
    match sort_by {
        HistorySort::Date => b.date_prescribed.cmp(&a.date_prescribed),
        HistorySort::Drug => a
            .drug_name
            .to_lowercase()
            .cmp(&b.drug_name.to_lowercase()),
    }
}
