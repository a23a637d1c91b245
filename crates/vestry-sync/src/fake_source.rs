// SPDX-License-Identifier: Apache-2.0
use crate::payload::SourceRecord;
use crate::{NoticeBatch, NoticeSource, SyncError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory notice source for tests: serves a fixed record list in
/// cursor-paginated slices and counts every fetch.
pub struct FakeSource {
    records: Vec<SourceRecord>,
    page_size: usize,
    fail_with: Option<SyncError>,
    pub fetch_calls: AtomicU64,
}

impl FakeSource {
    #[must_use]
    pub fn new(records: Vec<SourceRecord>, page_size: usize) -> Self {
        Self {
            records,
            page_size: page_size.max(1),
            fail_with: None,
            fetch_calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn failing(error: SyncError) -> Self {
        Self {
            records: Vec::new(),
            page_size: 1,
            fail_with: Some(error),
            fetch_calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NoticeSource for FakeSource {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<NoticeBatch, SyncError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        let offset = cursor
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0)
            .min(self.records.len());
        let end = (offset + self.page_size).min(self.records.len());
        let has_more = end < self.records.len();
        Ok(NoticeBatch {
            records: self.records[offset..end].to_vec(),
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }
}
