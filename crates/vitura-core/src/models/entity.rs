//! Shared traits for records that live in a remote collection.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Server-assigned numeric identity.
pub type EntityId = i64;

/// REST collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Patients,
    Prescriptions,
}

impl Resource {
    /// Lowercase collection name, also used as the default URL segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Patients => "patients",
            Resource::Prescriptions => "prescriptions",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record stored in one of the remote collections.
///
/// `Draft` is the create payload (the record without its id) and `Patch`
/// the partial payload sent on update.
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Draft: Serialize + fmt::Debug + Send + Sync;
    type Patch: Serialize + fmt::Debug + Send + Sync;

    const RESOURCE: Resource;

    fn id(&self) -> EntityId;
}
