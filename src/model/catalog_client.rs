//! HTTP client for the remote song catalog

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::AppConfig;
use crate::error::CatalogError;
use crate::{log_request, log_request_result};
use super::song::Song;

/// Catalog API client bound to one service base address.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("catalog-player/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(http, config.server_url.clone()))
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /songs`
    pub async fn fetch_all(&self) -> Result<Vec<Song>, CatalogError> {
        log_request!("fetch_all", url = %self.endpoint(&["songs"]));
        let result = self.get_json(self.endpoint(&["songs"]), &[]).await;
        log_request_result!("fetch_all", result);
        result
    }

    /// `GET /search?q=<query>`. The query goes out verbatim; an empty query is the server's call.
    pub async fn search(&self, query: &str) -> Result<Vec<Song>, CatalogError> {
        log_request!("search", query);
        let result = self.get_json(self.endpoint(&["search"]), &[("q", query)]).await;
        log_request_result!("search", result);
        result
    }

    /// `GET /songs/{id}`
    pub async fn fetch_song(&self, song_id: i64) -> Result<Song, CatalogError> {
        let id = valid_id(song_id)?;
        log_request!("fetch_song", song_id);
        let result = self.get_json(self.endpoint(&["songs", &id]), &[]).await;
        log_request_result!("fetch_song", result);
        result
    }

    /// `POST /play/{id}`. Returns the server's updated record.
    pub async fn report_play(&self, song_id: i64) -> Result<Song, CatalogError> {
        let id = valid_id(song_id)?;
        log_request!("report_play", song_id);
        let result: Result<Song, CatalogError> = async {
            let response = self.http.post(self.endpoint(&["play", &id])).send().await?;
            decode(response).await
        }
        .await;
        log_request_result!("report_play", result);
        result
    }

    /// Address of `GET /songs/{id}/stream`. Pure; no request is made.
    pub fn resolve_stream_location(&self, song_id: i64) -> Result<Url, CatalogError> {
        let id = valid_id(song_id)?;
        Ok(self.endpoint(&["songs", &id, "stream"]))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) base URLs always accept path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let response = self.http.get(url).query(query).send().await?;
        decode(response).await
    }
}

fn valid_id(song_id: i64) -> Result<String, CatalogError> {
    if song_id < 0 {
        return Err(CatalogError::InvalidId(song_id));
    }
    Ok(song_id.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CatalogError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
