// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]

mod compose;
mod config;
mod handlers;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use vestry_store::LedgerStore;
use vestry_sync::NoticeSyncEngine;

pub const CRATE_NAME: &str = "vestry-server";

pub use compose::{
    chart_series, compose_dashboard, fragment_target, ChartPoint, DashboardView, SectionKind,
    FRAGMENT_HEADER, NOTICE_PAGE_PARAM, REVIEW_PAGE_PARAM, TX_PAGE_PARAM,
};
pub use config::{validate_startup_config, ServerConfig};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LedgerStore>,
    pub sync: Arc<NoticeSyncEngine>,
    pub cfg: ServerConfig,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<LedgerStore>, sync: Arc<NoticeSyncEngine>, cfg: ServerConfig) -> Self {
        Self { store, sync, cfg }
    }
}

/// One page route for viewing (GET, full page or fragment) and review
/// submission (POST), plus a liveness probe. Serve with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the gate can
/// see the peer address.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::dashboard_handler).post(handlers::submit_review_handler),
        )
        .route("/healthz", get(handlers::healthz_handler))
        .with_state(state)
}
