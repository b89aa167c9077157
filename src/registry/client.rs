//! HTTP client for the Endpoint Registry Service

use reqwest::{Client, Method, Url};
use serde::Serialize;

use crate::error::RegistryError;
use crate::models::{CollectionRegistry, EndpointDescriptor, EndpointIdentity, NetworkId};

#[derive(Serialize)]
struct CollectionBody<'a> {
    endpoints: &'a [EndpointDescriptor],
}

/// Thin wrapper over the registry's CRUD routes
#[derive(Clone, Debug)]
pub struct RegistryClient {
    http: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        RegistryClient { http, base_url }
    }

    /// `GET /endpoints/{network}`
    pub async fn fetch(&self, network: NetworkId) -> Result<CollectionRegistry, RegistryError> {
        let url = self.url(&["endpoints", network.as_str()])?;
        tracing::info!(%network, %url, "Fetching registry");

        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        let registry = resp.json::<Option<CollectionRegistry>>().await?;
        Ok(registry.unwrap_or_default())
    }

    /// `POST /endpoints/{network}/collections/{name}` replacing the endpoint list
    pub async fn put_collection(
        &self,
        network: NetworkId,
        name: &str,
        endpoints: &[EndpointDescriptor],
    ) -> Result<(), RegistryError> {
        let url = self.url(&["endpoints", network.as_str(), "collections", name])?;
        self.send(Method::POST, url, Some(&CollectionBody { endpoints })).await
    }

    /// `DELETE /endpoints/{network}/collections/{name}`
    pub async fn remove_collection(&self, network: NetworkId, name: &str) -> Result<(), RegistryError> {
        let url = self.url(&["endpoints", network.as_str(), "collections", name])?;
        self.send::<()>(Method::DELETE, url, None).await
    }

    /// `POST /endpoints/{network}/collections/{name}/endpoints`
    pub async fn upsert_endpoint(
        &self,
        network: NetworkId,
        collection: &str,
        endpoint: &EndpointDescriptor,
    ) -> Result<(), RegistryError> {
        let url = self.url(&["endpoints", network.as_str(), "collections", collection, "endpoints"])?;
        self.send(Method::POST, url, Some(endpoint)).await
    }

    /// `DELETE /endpoints/{network}/collections/{name}/endpoints` with `{method, path}`
    pub async fn remove_endpoint(
        &self,
        network: NetworkId,
        collection: &str,
        identity: &EndpointIdentity,
    ) -> Result<(), RegistryError> {
        let url = self.url(&["endpoints", network.as_str(), "collections", collection, "endpoints"])?;
        self.send(Method::DELETE, url, Some(identity)).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(), RegistryError> {
        tracing::info!(%method, %url, "Registry call");
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Segments are percent-encoded, so collection names can't escape their slot
    fn url(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RegistryError::Validation(format!("invalid registry URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| RegistryError::Validation(format!("registry URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RegistryError::Status {
        status: status.as_u16(),
        body,
    })
}
