//! Prescription models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Resource};

/// A prescription issued to a patient.
///
/// `patient_id` is not checked against the patients collection; a dangling
/// reference is rendered with a placeholder label instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    /// Server-assigned ID
    pub id: EntityId,
    /// Patient this prescription belongs to
    pub patient_id: EntityId,
    /// Drug name as entered
    pub drug_name: String,
    /// Free-form dosage instruction (e.g. "500mg twice daily")
    pub dosage: String,
    /// Date the prescription was written
    pub date_prescribed: NaiveDate,
}

/// Create payload for a prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub patient_id: EntityId,
    pub drug_name: String,
    pub dosage: String,
    pub date_prescribed: NaiveDate,
}

impl NewPrescription {
    /// Attach the server-assigned ID.
    pub fn with_id(self, id: EntityId) -> Prescription {
        Prescription {
            id,
            patient_id: self.patient_id,
            drug_name: self.drug_name,
            dosage: self.dosage,
            date_prescribed: self.date_prescribed,
        }
    }
}

/// Partial update for a prescription.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_prescribed: Option<NaiveDate>,
}

impl Entity for Prescription {
    type Draft = NewPrescription;
    type Patch = PrescriptionPatch;

    const RESOURCE: Resource = Resource::Prescriptions;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_record() {
        let raw = r#"{
            "id": 1001,
            "patientId": 1,
            "drugName": "Amoxicillin",
            "dosage": "500mg",
            "datePrescribed": "2024-12-01"
        }"#;
        let p: Prescription = serde_json::from_str(raw).unwrap();
        assert_eq!(p.id, 1001);
        assert_eq!(p.patient_id, 1);
        assert_eq!(p.drug_name, "Amoxicillin");
        assert_eq!(p.date_prescribed, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    }

    #[test]
    fn test_draft_has_no_id() {
        let draft = NewPrescription {
            patient_id: 2,
            drug_name: "Ibuprofen".into(),
            dosage: "200mg".into(),
            date_prescribed: NaiveDate::from_ymd_opt(2024, 12, 3).unwrap(),
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["patientId"], 2);

        let created = draft.with_id(1002);
        assert_eq!(created.id, 1002);
        assert_eq!(created.drug_name, "Ibuprofen");
    }

    #[test]
    fn test_rejects_malformed_date() {
        let raw = r#"{"id":1,"patientId":1,"drugName":"X","dosage":"1","datePrescribed":"12/01/2024"}"#;
        assert!(serde_json::from_str::<Prescription>(raw).is_err());
    }
}
