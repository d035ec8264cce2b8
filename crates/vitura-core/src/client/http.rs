//! reqwest-backed resource client.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::Instrument;

use super::{CollectionClient, NetworkError, NetworkResult};
use crate::config::ApiConfig;
use crate::models::{Entity, EntityId, Prescription, Resource};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the patients and prescriptions collections.
///
/// Stateless apart from the connection pool; clone freely.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpResourceClient {
    /// Build a client for the configured backend.
    pub fn new(config: ApiConfig) -> NetworkResult<Self> {
        config
            .validate()
            .map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| NetworkError::Transport {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET /{collection}`
    pub async fn list<E: Entity>(&self) -> NetworkResult<Vec<E>> {
        let url = self.config.collection_url(E::RESOURCE);
        let response = self.send(Method::GET, &url, |req| req).await?;
        read_json(response, &url).await
    }

    /// `GET /{collection}/{id}`
    pub async fn get<E: Entity>(&self, id: EntityId) -> NetworkResult<E> {
        let url = self.member_url(E::RESOURCE, id);
        let response = self.send(Method::GET, &url, |req| req).await?;
        read_json(response, &url).await
    }

    /// `POST /{collection}` with the draft as JSON body.
    pub async fn create<E: Entity>(&self, draft: &E::Draft) -> NetworkResult<E> {
        let url = self.config.collection_url(E::RESOURCE);
        let response = self.send(Method::POST, &url, |req| req.json(draft)).await?;
        read_json(response, &url).await
    }

    /// `PUT /{collection}/{id}` with only the changed fields.
    pub async fn update<E: Entity>(&self, id: EntityId, patch: &E::Patch) -> NetworkResult<E> {
        let url = self.member_url(E::RESOURCE, id);
        let response = self.send(Method::PUT, &url, |req| req.json(patch)).await?;
        read_json(response, &url).await
    }

    /// `DELETE /{collection}/{id}`. The response body is ignored.
    pub async fn delete<E: Entity>(&self, id: EntityId) -> NetworkResult<()> {
        let url = self.member_url(E::RESOURCE, id);
        self.send(Method::DELETE, &url, |req| req).await?;
        Ok(())
    }

    /// `GET /prescriptions?patientId={id}`
    pub async fn prescriptions_for_patient(
        &self,
        patient_id: EntityId,
    ) -> NetworkResult<Vec<Prescription>> {
        let url = self.config.collection_url(Resource::Prescriptions);
        let response = self
            .send(Method::GET, &url, |req| req.query(&[("patientId", patient_id)]))
            .await?;
        read_json(response, &url).await
    }

    /// Number of prescriptions on the server (lists the full collection).
    pub async fn prescription_count(&self) -> NetworkResult<usize> {
        Ok(self.list::<Prescription>().await?.len())
    }

    fn member_url(&self, resource: Resource, id: EntityId) -> String {
        format!("{}/{}", self.config.collection_url(resource), id)
    }

    /// Issue one request and reject non-2xx responses.
    async fn send<F>(&self, method: Method, url: &str, build: F) -> NetworkResult<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::debug_span!(
            "http_request",
            method = %method,
            url = %url,
            request_id = %request_id,
        );

        let request = build(
            self.client
                .request(method, parsed)
                .header(REQUEST_ID_HEADER, request_id.as_str()),
        );

        async move {
            let response = request.send().await.map_err(|e| {
                tracing::warn!("Request failed: {}", e);
                NetworkError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!("Unexpected status {}", status);
                return Err(NetworkError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            tracing::debug!("Response {}", status);
            Ok(response)
        }
        .instrument(span)
        .await
    }
}

/// Read the whole body and decode it as JSON.
async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> NetworkResult<T> {
    let body = response.bytes().await.map_err(|e| NetworkError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_slice(&body).map_err(|e| NetworkError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl<E: Entity> CollectionClient<E> for HttpResourceClient {
    async fn fetch_all(&self) -> NetworkResult<Vec<E>> {
        self.list::<E>().await
    }

    async fn create(&self, draft: &E::Draft) -> NetworkResult<E> {
        HttpResourceClient::create::<E>(self, draft).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;

    #[test]
    fn test_member_url() {
        let client = HttpResourceClient::new(ApiConfig::default()).unwrap();
        assert_eq!(
            client.member_url(Resource::Patients, 7),
            "http://localhost:5120/api/patients/7"
        );
        assert_eq!(
            client.member_url(Resource::Prescriptions, 1001),
            "http://localhost:5120/api/prescriptions/1001"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = HttpResourceClient::new(ApiConfig::with_base_url("localhost")).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let client = HttpResourceClient::new(ApiConfig::with_base_url("http://127.0.0.1:9")).unwrap();
        let err = client.list::<Patient>().await.unwrap_err();
        assert!(matches!(err, NetworkError::Transport { .. }));
        assert_eq!(err.status(), None);
    }
}
