use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    Author, DateRange, DayPatch, DayRecord, GlobalNote, MergeDayRequest, UpdateGlobalNoteRequest,
};
use tracing::{debug, warn};

use super::date_utils::parse_date_str;
use super::store::{DocumentStore, StoreError};

/// API client for the availability backend's document store
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Create a new API client with the default base URL
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:3000".to_string())
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn day_url(&self, date: &str) -> String {
        format!("{}/api/days/{}", self.base_url, date)
    }

    fn global_note_url(&self) -> String {
        format!("{}/api/notes/global", self.base_url)
    }

    /// Decode a JSON body, mapping 404 to `None`
    async fn read_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>, StoreError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn check_status(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!("🌐 API: request failed with {}: {}", status, message);
        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DocumentStore for ApiClient {
    async fn get_day(&self, date: &str) -> Result<Option<DayRecord>, StoreError> {
        parse_date_str(date)?;
        let response = self.client.get(self.day_url(date)).send().await?;
        Self::read_optional(response).await
    }

    async fn merge_day(&self, date: &str, patch: &DayPatch, author: Author) -> Result<(), StoreError> {
        parse_date_str(date)?;
        let request = MergeDayRequest {
            author,
            patch: patch.clone(),
        };
        debug!("🌐 API: PUT day {} as {}", date, author);
        let response = self.client.put(self.day_url(date)).json(&request).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn query_days(&self, range: &DateRange) -> Result<Vec<DayRecord>, StoreError> {
        let url = format!("{}/api/days", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("start", range.start.as_str()), ("end", range.end.as_str())])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        response
            .json::<Vec<DayRecord>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn get_global_note(&self) -> Result<Option<GlobalNote>, StoreError> {
        let response = self.client.get(self.global_note_url()).send().await?;
        Self::read_optional(response).await
    }

    async fn merge_global_note(&self, note: &str) -> Result<(), StoreError> {
        let request = UpdateGlobalNoteRequest {
            note: note.to_string(),
        };
        let response = self
            .client
            .put(self.global_note_url())
            .json(&request)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
