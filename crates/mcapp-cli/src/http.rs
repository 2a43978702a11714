//! REST implementation of [`ResourceClient`].
//!
//! Talks to the management API under `<server>/v3`. Collections live at
//! `/v3/<collection>`, records at `/v3/<collection>/<id>`, and actions are
//! `POST`ed to the record URL with an `action` query parameter.

use std::time::Duration;

use mcapp_core::client::ResourceClient;
use mcapp_core::error::{Error, Result};
use mcapp_core::types::{Collection, ListOpts, Resource, ResourceType};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::CliError;

/// API version path appended to the server URL.
const API_VERSION_PATH: &str = "/v3";

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP client for the management API.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> std::result::Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mcapp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: api_root(&config.server_url),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Root URL of the API, ending in `/v3`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: ResourceType) -> String {
        format!("{}/{}", self.base_url, kind.collection())
    }

    fn record_url(&self, kind: ResourceType, id: &str) -> String {
        format!("{}/{}/{id}", self.base_url, kind.collection())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and checks the status.
    ///
    /// `missing` names the record a 404 refers to; without it a 404 is a
    /// transport failure.
    async fn send(
        &self,
        builder: RequestBuilder,
        missing: Option<(ResourceType, &str)>,
    ) -> Result<Response> {
        let response = builder.send().await.map_err(Error::transport)?;
        let status = response.status();
        trace!(url = %response.url(), status = %status, "API response");

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some((kind, name)) = missing {
                return Err(Error::NotFound {
                    kind,
                    name: name.to_string(),
                });
            }
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(body);
        Err(Error::transport(format!("{status} from {url}: {detail}")))
    }

    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
        let body = response.text().await.map_err(Error::transport)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Normalizes a server URL to the API root.
#[must_use]
pub fn api_root(server_url: &str) -> String {
    let trimmed = server_url.trim_end_matches('/');
    if trimmed.ends_with(API_VERSION_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_VERSION_PATH}")
    }
}

impl ResourceClient for RestClient {
    async fn list<T: Resource>(&self, opts: &ListOpts) -> Result<Collection<T>> {
        let url = self.collection_url(T::KIND);
        debug!(kind = %T::KIND, filters = ?opts.filters, "listing");
        let builder = self.request(Method::GET, &url).query(&opts.filters);
        Self::decode(self.send(builder, None).await?).await
    }

    async fn next<T: Resource>(&self, page: &Collection<T>) -> Result<Option<Collection<T>>> {
        let Some(url) = page.next_url() else {
            return Ok(None);
        };
        trace!(kind = %T::KIND, url = %url, "fetching next page");
        let builder = self.request(Method::GET, url);
        Self::decode(self.send(builder, None).await?).await.map(Some)
    }

    async fn by_id<T: Resource>(&self, id: &str) -> Result<T> {
        let builder = self.request(Method::GET, &self.record_url(T::KIND, id));
        Self::decode(self.send(builder, Some((T::KIND, id))).await?).await
    }

    async fn create<T: Resource>(&self, record: &T) -> Result<T> {
        let builder = self
            .request(Method::POST, &self.collection_url(T::KIND))
            .json(record);
        Self::decode(self.send(builder, None).await?).await
    }

    async fn update<T: Resource>(&self, record: &T) -> Result<T> {
        let builder = self
            .request(Method::PUT, &self.record_url(T::KIND, record.id()))
            .json(record);
        Self::decode(self.send(builder, Some((T::KIND, record.id()))).await?).await
    }

    async fn delete<T: Resource>(&self, record: &T) -> Result<()> {
        let builder = self.request(Method::DELETE, &self.record_url(T::KIND, record.id()));
        self.send(builder, Some((T::KIND, record.id()))).await?;
        Ok(())
    }

    async fn action<T: Resource, I: Serialize>(
        &self,
        record: &T,
        action: &str,
        input: &I,
    ) -> Result<()> {
        let builder = self
            .request(Method::POST, &self.record_url(T::KIND, record.id()))
            .query(&[("action", action)])
            .json(input);
        self.send(builder, Some((T::KIND, record.id()))).await?;
        Ok(())
    }

    async fn get_link<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let builder = self.request(Method::GET, url);
        Self::decode(self.send(builder, None).await?).await
    }
}
