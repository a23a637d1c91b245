// SPDX-License-Identifier: Apache-2.0
use serde::Serialize;
use vestry_sync::SyncConfig;

/// Dashboard composition settings. Page sizes match the sections the
/// dashboard always shipped with: 10 ledger rows, 6 reviews, 6 notices,
/// a 4-week chart window.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub tx_page_size: u64,
    pub review_page_size: u64,
    pub notice_page_size: u64,
    pub chart_weeks: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tx_page_size: 10,
            review_page_size: 6,
            notice_page_size: 6,
            chart_weeks: 4,
        }
    }
}

pub fn validate_startup_config(cfg: &ServerConfig, sync: &SyncConfig) -> Result<(), String> {
    if cfg.tx_page_size == 0 || cfg.review_page_size == 0 || cfg.notice_page_size == 0 {
        return Err("dashboard page sizes must be > 0".to_string());
    }
    if cfg.chart_weeks == 0 {
        return Err("chart window must be > 0 weeks".to_string());
    }
    if sync.page_size == 0 || sync.max_pages == 0 {
        return Err("sync paging limits must be > 0".to_string());
    }
    if sync.fetch_timeout.is_zero() {
        return Err("sync fetch timeout must be > 0".to_string());
    }
    Ok(())
}
