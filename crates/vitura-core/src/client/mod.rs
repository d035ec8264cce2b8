//! Resource client: the network seam between stores and the REST backend.
//!
//! Stores only see [`CollectionClient`]. [`HttpResourceClient`] is the
//! reqwest implementation; tests inject in-memory clients.

mod http;

pub use http::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Entity;

/// Transport-level failure of a single request.
///
/// No partial data accompanies an error: a failed call returned nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response body from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl NetworkError {
    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type NetworkResult<T> = Result<T, NetworkError>;

/// List and create against one remote collection.
///
/// Every call is exactly one round trip: no retries, no caching.
#[async_trait]
pub trait CollectionClient<E: Entity>: Send + Sync {
    /// Fetch the whole collection in server order.
    async fn fetch_all(&self) -> NetworkResult<Vec<E>>;

    /// Create a record and return it as stored by the server.
    async fn create(&self, draft: &E::Draft) -> NetworkResult<E>;
}
