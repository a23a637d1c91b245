// SPDX-License-Identifier: Apache-2.0
use crate::payload::QueryResponse;
use crate::{NoticeBatch, NoticeSource, SyncConfig, SyncError};
use async_trait::async_trait;
use serde_json::json;

/// Pinned source API revision, sent on every query.
pub const NOTICE_SOURCE_VERSION: &str = "2022-06-28";

/// The real notice source: a bearer-authenticated POST query endpoint
/// with `results[]`, `has_more`, and `next_cursor` pagination.
pub struct HttpNoticeSource {
    client: reqwest::Client,
    endpoint: String,
    bearer: String,
    page_size: u32,
    sort_property: String,
}

impl HttpNoticeSource {
    pub fn new(api_key: &str, database_id: &str, cfg: &SyncConfig) -> Result<Self, SyncError> {
        let endpoint = format!("https://api.notion.com/v1/databases/{database_id}/query");
        Self::with_endpoint(api_key, &endpoint, cfg)
    }

    pub fn with_endpoint(
        api_key: &str,
        endpoint: &str,
        cfg: &SyncConfig,
    ) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.fetch_timeout)
            .build()
            .map_err(|e| SyncError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            bearer: api_key.to_string(),
            page_size: cfg.page_size,
            sort_property: cfg.properties.date.clone(),
        })
    }
}

#[async_trait]
impl NoticeSource for HttpNoticeSource {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<NoticeBatch, SyncError> {
        let mut body = json!({
            "page_size": self.page_size,
            "sorts": [{"property": self.sort_property, "direction": "descending"}],
        });
        if let Some(start_cursor) = cursor {
            body["start_cursor"] = json!(start_cursor);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.bearer)
            .header("Notion-Version", NOTICE_SOURCE_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::Timeout
                } else {
                    SyncError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let decoded: QueryResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        Ok(NoticeBatch {
            records: decoded.results,
            has_more: decoded.has_more,
            next_cursor: decoded.next_cursor,
        })
    }
}
