// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use vestry_server::{build_router, validate_startup_config, AppState, ServerConfig};
use vestry_store::LedgerStore;
use vestry_sync::{HttpNoticeSource, NoticeSource, NoticeSyncEngine, PropertyNames, SyncConfig};

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(key, default_ms))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if env_bool("VESTRY_LOG_JSON", true) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn property_names_from_env() -> PropertyNames {
    let defaults = PropertyNames::default();
    PropertyNames {
        title: env_string("VESTRY_NOTICE_PROP_TITLE", &defaults.title),
        date: env_string("VESTRY_NOTICE_PROP_DATE", &defaults.date),
        text: env_string("VESTRY_NOTICE_PROP_TEXT", &defaults.text),
        files: env_string("VESTRY_NOTICE_PROP_FILES", &defaults.files),
    }
}

fn notice_source_from_env(cfg: &SyncConfig) -> Option<Arc<dyn NoticeSource>> {
    let api_key = std::env::var("VESTRY_NOTICE_API_KEY").ok()?;
    let database_id = std::env::var("VESTRY_NOTICE_DATABASE_ID").ok()?;
    match HttpNoticeSource::new(&api_key, &database_id, cfg) {
        Ok(source) => Some(Arc::new(source)),
        Err(e) => {
            tracing::warn!("notice source init failed, sync disabled: {e}");
            None
        }
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let cfg = ServerConfig {
        tx_page_size: env_u64("VESTRY_TX_PAGE_SIZE", 10),
        review_page_size: env_u64("VESTRY_REVIEW_PAGE_SIZE", 6),
        notice_page_size: env_u64("VESTRY_NOTICE_PAGE_SIZE", 6),
        chart_weeks: env_u64("VESTRY_CHART_WEEKS", 4),
    };
    let sync_cfg = SyncConfig {
        page_size: env_u32("VESTRY_SYNC_PAGE_SIZE", 100),
        fetch_timeout: env_duration_ms("VESTRY_SYNC_FETCH_TIMEOUT_MS", 5_000),
        max_pages: env_u32("VESTRY_SYNC_MAX_PAGES", 64),
        properties: property_names_from_env(),
    };
    validate_startup_config(&cfg, &sync_cfg)?;

    let db_path = PathBuf::from(env_string("VESTRY_DB_PATH", "artifacts/vestry.sqlite"));
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("create {}: {e}", parent.display()))?;
    }
    let store = Arc::new(LedgerStore::open(&db_path).map_err(|e| e.to_string())?);

    let source = notice_source_from_env(&sync_cfg);
    if source.is_none() {
        info!("notice sync disabled: no source credentials configured");
    }
    let sync = Arc::new(NoticeSyncEngine::new(source, sync_cfg));

    let bind = env_string("VESTRY_BIND", "0.0.0.0:8080");
    let addr: SocketAddr = bind.parse().map_err(|e| format!("parse bind {bind}: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("bind {addr}: {e}"))?;
    info!(%addr, db = %db_path.display(), "vestry server listening");

    let app = build_router(AppState::new(store, sync, cfg));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown_signal())
    .await
    .map_err(|e| format!("serve: {e}"))
}
