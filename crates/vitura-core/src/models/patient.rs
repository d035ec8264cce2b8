//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Resource};

/// A registered patient as returned by the patients collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Server-assigned ID
    pub id: EntityId,
    /// Display name
    pub full_name: String,
    /// Date of birth (ISO 8601 on the wire)
    pub date_of_birth: NaiveDate,
}

impl Patient {
    pub fn new(id: EntityId, full_name: impl Into<String>, date_of_birth: NaiveDate) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            date_of_birth,
        }
    }

    /// Upper-cased first letter of every name part ("Alice Smith" -> "AS").
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Create payload for a patient (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
}

/// Partial update for a patient. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl Entity for Patient {
    type Draft = NewPatient;
    type Patch = PatientPatch;

    const RESOURCE: Resource = Resource::Patients;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Patient {
        Patient::new(1, "Alice Smith", NaiveDate::from_ymd_opt(1985, 4, 10).unwrap())
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(alice()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "fullName": "Alice Smith", "dateOfBirth": "1985-04-10"})
        );

        let parsed: Patient = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, alice());
    }

    #[test]
    fn test_initials() {
        assert_eq!(alice().initials(), "AS");

        let p = Patient::new(3, "carlos  de mendes", NaiveDate::from_ymd_opt(1990, 1, 15).unwrap());
        assert_eq!(p.initials(), "CDM");
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = PatientPatch {
            full_name: Some("Alice Jones".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"fullName":"Alice Jones"}"#);
    }
}
