//! HTTP client for the engine's record store API.

use std::time::Duration;

use async_trait::async_trait;
use charsheet_domain::StorageKey;
use charsheet_shared::{
    routes, CharacterListResponse, ErrorResponse, ExistsResponse, RecordBody, SaveQuery,
    SaveResponse,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::ports::outbound::{ApiError, RecordStorePort};

/// Default base URL of the record store API.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Record store client over the engine's JSON API.
#[derive(Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create client from environment variables.
    ///
    /// Uses `CHARSHEET_API_URL`, falling back to [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("CHARSHEET_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for HttpRecordStore {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn key(raw: &str) -> String {
    StorageKey::from_name(raw).into_string()
}

fn request_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Request(e.to_string())
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_for(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

async fn error_for(response: Response) -> ApiError {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::CONFLICT => ApiError::Conflict,
        _ => {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            ApiError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl RecordStorePort for HttpRecordStore {
    async fn list(&self) -> Result<CharacterListResponse, ApiError> {
        let response = self
            .client
            .get(self.url(routes::CHARACTERS))
            .send()
            .await
            .map_err(request_error)?;
        parse_json(response).await
    }

    async fn get(&self, key_name: &str) -> Result<RecordBody, ApiError> {
        let response = self
            .client
            .get(self.url(&routes::character_path(&key(key_name))))
            .send()
            .await
            .map_err(request_error)?;
        parse_json(response).await
    }

    async fn put(
        &self,
        key_name: &str,
        body: RecordBody,
        current: Option<String>,
    ) -> Result<String, ApiError> {
        let query = SaveQuery {
            current: current.map(|current| key(&current)),
        };
        let response = self
            .client
            .post(self.url(&routes::character_path(&key(key_name))))
            .query(&query)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        let saved: SaveResponse = parse_json(response).await?;
        Ok(saved.storage_key)
    }

    async fn rename(
        &self,
        old_key: &str,
        new_key: &str,
        body: RecordBody,
    ) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url(&routes::rename_path(&key(old_key), &key(new_key))))
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        let saved: SaveResponse = parse_json(response).await?;
        Ok(saved.storage_key)
    }

    async fn exists(&self, key_name: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(self.url(&routes::exists_path(&key(key_name))))
            .send()
            .await
            .map_err(request_error)?;
        let exists: ExistsResponse = parse_json(response).await?;
        Ok(exists.exists)
    }

    async fn delete(&self, key_name: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&routes::character_path(&key(key_name))))
            .send()
            .await
            .map_err(request_error)?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(())
    }
}
