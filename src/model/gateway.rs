//! Remote catalog service: the gateway trait and its HTTP implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::auth::AuthContext;
use crate::error::{ClientError, Result};
use super::types::{ListeningStats, Profile, Track, TrackId};

/// Authenticated request/response contract of the remote music service.
///
/// Every call takes the caller's `AuthContext` and must fail with
/// `AuthenticationRequired` before touching the network when it is signed out.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn list_songs(&self, auth: &AuthContext) -> Result<Vec<Track>>;

    async fn list_favorites(&self, auth: &AuthContext) -> Result<Vec<TrackId>>;

    async fn add_favorite(&self, auth: &AuthContext, track_id: &TrackId) -> Result<()>;

    async fn get_stats(&self, auth: &AuthContext) -> Result<ListeningStats>;

    async fn get_profile(&self, auth: &AuthContext) -> Result<Profile>;
}

/// Favorites come back as full song objects; only the id matters here
#[derive(Deserialize)]
struct FavoriteEntry {
    #[serde(rename = "_id")]
    id: TrackId,
}

/// HTTP client for the music service REST API
#[derive(Clone)]
pub struct HttpCatalogGateway {
    client: Client,
    base_url: String,
}

impl HttpCatalogGateway {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("tunestream/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, auth: &AuthContext) -> Result<RequestBuilder> {
        let token = auth.require()?;
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "API request started");
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, token.bearer()))
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let text = Self::check_status(operation, response).await?;
        tracing::debug!(operation, bytes = text.len(), "API request successful");
        Ok(text)
    }

    /// Body text of a successful response, or the server's error message
    async fn check_status(operation: &str, response: Response) -> Result<String> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| format!("{} failed ({})", operation, status.as_u16()));
        tracing::warn!(operation, status = status.as_u16(), %message, "API request failed");
        Err(ClientError::from_status(status.as_u16(), message))
    }

    fn decode<T: DeserializeOwned>(operation: &str, text: &str) -> Result<T> {
        serde_json::from_str(text).map_err(|e| {
            tracing::warn!(operation, error = %e, "Failed to parse response");
            ClientError::MalformedResponse(format!("{operation}: {e}"))
        })
    }
}

/// The songs endpoint answers either a bare array or `{ "songs": [...] }`
fn decode_songs(body: Value) -> Result<Vec<Track>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("songs") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ClientError::from))
        .collect()
}

#[async_trait]
impl CatalogGateway for HttpCatalogGateway {
    async fn list_songs(&self, auth: &AuthContext) -> Result<Vec<Track>> {
        let request = self.request(Method::GET, "/api/songs", auth)?;
        let text = self.send("list_songs", request).await?;
        let tracks = decode_songs(Self::decode("list_songs", &text)?)?;
        tracing::info!(count = tracks.len(), "Catalog loaded");
        Ok(tracks)
    }

    async fn list_favorites(&self, auth: &AuthContext) -> Result<Vec<TrackId>> {
        let request = self.request(Method::GET, "/api/favorites", auth)?;
        let text = self.send("list_favorites", request).await?;
        let body: Value = Self::decode("list_favorites", &text)?;
        let ids = match body {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<FavoriteEntry>(item).ok())
                .map(|entry| entry.id)
                .collect(),
            _ => Vec::new(),
        };
        Ok(ids)
    }

    async fn add_favorite(&self, auth: &AuthContext, track_id: &TrackId) -> Result<()> {
        let request = self
            .request(Method::POST, "/api/favorites/add", auth)?
            .json(&json!({ "songId": track_id }));
        self.send("add_favorite", request).await?;
        tracing::info!(%track_id, "Added track to favorites");
        Ok(())
    }

    async fn get_stats(&self, auth: &AuthContext) -> Result<ListeningStats> {
        let request = self.request(Method::GET, "/api/stats", auth)?;
        let text = self.send("get_stats", request).await?;
        Self::decode("get_stats", &text)
    }

    async fn get_profile(&self, auth: &AuthContext) -> Result<Profile> {
        let request = self.request(Method::GET, "/api/profile/profile", auth)?;
        let text = self.send("get_profile", request).await?;
        Self::decode("get_profile", &text)
    }
}
