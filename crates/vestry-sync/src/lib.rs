// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]

mod fake_source;
mod http_source;
mod payload;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};
use vestry_store::LedgerStore;

pub const CRATE_NAME: &str = "vestry-sync";

pub use fake_source::FakeSource;
pub use http_source::{HttpNoticeSource, NOTICE_SOURCE_VERSION};
pub use payload::{
    PropertyNames, QueryResponse, SourceRecord, DEFAULT_ATTACHMENT_NAME, DEFAULT_TITLE,
};

/// A sync failure. Callers branch on the variant; none of these are fatal
/// to a dashboard request — every one degrades to "zero notices".
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    Http(String),
    Status(u16),
    Decode(String),
    Timeout,
    Storage(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "source request failed: {msg}"),
            Self::Status(code) => write!(f, "source responded with status {code}"),
            Self::Decode(msg) => write!(f, "source payload decode failed: {msg}"),
            Self::Timeout => write!(f, "source page fetch timed out"),
            Self::Storage(msg) => write!(f, "notice import failed: {msg}"),
        }
    }
}

impl std::error::Error for SyncError {}

/// One page of source records plus the pagination cursor.
#[derive(Debug, Clone, Default)]
pub struct NoticeBatch {
    pub records: Vec<SourceRecord>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait NoticeSource: Send + Sync + 'static {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<NoticeBatch, SyncError>;
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub page_size: u32,
    pub fetch_timeout: Duration,
    /// Upper bound on pages followed in one sync, in case the source
    /// keeps reporting `has_more`.
    pub max_pages: u32,
    pub properties: PropertyNames,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            fetch_timeout: Duration::from_secs(5),
            max_pages: 64,
            properties: PropertyNames::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    AlreadyPopulated,
    SourceDisabled,
    Imported {
        fetched: u64,
        inserted: u64,
        skipped: u64,
    },
    /// The sync failed and was swallowed; the table stays empty and the
    /// next request retries the full pull.
    Degraded,
}

/// Read-through mirror of the external notice source. Two states: EMPTY
/// (no local notice rows; any access performs the full paginated pull)
/// and POPULATED (serve locally, never contact the source).
pub struct NoticeSyncEngine {
    source: Option<Arc<dyn NoticeSource>>,
    cfg: SyncConfig,
    // Single-flight guard: concurrent first-sync attempts serialize here
    // instead of each pulling the source independently.
    flight: Mutex<()>,
}

impl NoticeSyncEngine {
    #[must_use]
    pub fn new(source: Option<Arc<dyn NoticeSource>>, cfg: SyncConfig) -> Self {
        Self {
            source,
            cfg,
            flight: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, SyncConfig::default())
    }

    /// Ensures the local notice table is populated, syncing from the
    /// source if it is empty. Never fails: any error is logged and the
    /// request proceeds with whatever is stored locally.
    pub async fn ensure_populated(
        &self,
        store: &LedgerStore,
        as_of: NaiveDate,
        now: DateTime<Utc>,
    ) -> SyncOutcome {
        match store.notice_count() {
            Ok(0) => {}
            Ok(_) => return SyncOutcome::AlreadyPopulated,
            Err(e) => {
                warn!("notice count query failed: {e}");
                return SyncOutcome::Degraded;
            }
        }
        let Some(source) = self.source.as_ref() else {
            return SyncOutcome::SourceDisabled;
        };

        let _guard = self.flight.lock().await;
        match store.notice_count() {
            Ok(0) => {}
            Ok(_) => return SyncOutcome::AlreadyPopulated,
            Err(e) => {
                warn!("notice count query failed: {e}");
                return SyncOutcome::Degraded;
            }
        }

        match self.pull_all(source.as_ref(), store, as_of, now).await {
            Ok((fetched, inserted, skipped)) => {
                info!(fetched, inserted, skipped, "notice sync complete");
                SyncOutcome::Imported {
                    fetched,
                    inserted,
                    skipped,
                }
            }
            Err(e) => {
                warn!("notice sync failed, serving empty: {e}");
                SyncOutcome::Degraded
            }
        }
    }

    async fn pull_all(
        &self,
        source: &dyn NoticeSource,
        store: &LedgerStore,
        as_of: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(u64, u64, u64), SyncError> {
        let mut fetched = 0u64;
        let mut inserted = 0u64;
        let mut skipped = 0u64;
        let mut cursor: Option<String> = None;

        for _ in 0..self.cfg.max_pages {
            let batch = timeout(self.cfg.fetch_timeout, source.fetch_page(cursor.as_deref()))
                .await
                .map_err(|_| SyncError::Timeout)??;

            for record in &batch.records {
                let draft = record.extract(&self.cfg.properties, as_of);
                fetched += 1;
                if store
                    .import_notice(&draft, now)
                    .map_err(|e| SyncError::Storage(e.to_string()))?
                {
                    inserted += 1;
                } else {
                    skipped += 1;
                }
            }

            if !batch.has_more {
                return Ok((fetched, inserted, skipped));
            }
            match batch.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok((fetched, inserted, skipped)),
            }
        }

        warn!(
            max_pages = self.cfg.max_pages,
            "notice sync stopped at page bound with more pages reported"
        );
        Ok((fetched, inserted, skipped))
    }
}
