// SPDX-License-Identifier: Apache-2.0
use crate::compose::{
    compose_dashboard, fragment_target, notices_section, reviews_section, transactions_section,
    SectionKind, FRAGMENT_HEADER,
};
use crate::AppState;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use tracing::error;
use vestry_model::ReviewDraft;
use vestry_store::{ReviewOutcome, StoreError};

const DEFAULT_RATING: i64 = 5;

/// Submitter identity: first entry of the forwarded-address header when
/// present, else the socket peer.
pub(crate) fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let trimmed = first.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    peer.ip().to_string()
}

fn store_error_response(e: StoreError) -> Response {
    error!("ledger query failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "ledger unavailable"})),
    )
        .into_response()
}

pub(crate) async fn healthz_handler() -> &'static str {
    "ok"
}

pub(crate) async fn dashboard_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    // One instant per request; snapshot and chart must not skew.
    let now = Utc::now();
    let today = now.date_naive();
    let fragment_request = headers.contains_key(FRAGMENT_HEADER);

    match fragment_target(fragment_request, &params) {
        Some(SectionKind::Transactions) => {
            match transactions_section(&state.store, &state.cfg, &params) {
                Ok(page) => {
                    Json(json!({"fragment": "transactions", "transactions": page})).into_response()
                }
                Err(e) => store_error_response(e),
            }
        }
        Some(SectionKind::Reviews) => match reviews_section(&state.store, &state.cfg, &params) {
            Ok(page) => Json(json!({"fragment": "reviews", "reviews": page})).into_response(),
            Err(e) => store_error_response(e),
        },
        Some(SectionKind::Notices) => {
            state.sync.ensure_populated(&state.store, today, now).await;
            match notices_section(&state.store, &state.cfg, &params) {
                Ok(page) => Json(json!({"fragment": "notices", "notices": page})).into_response(),
                Err(e) => store_error_response(e),
            }
        }
        None => {
            state.sync.ensure_populated(&state.store, today, now).await;
            let submitter = client_ip(&headers, peer);
            let has_reviewed_today = match state.store.has_reviewed_on(&submitter, today) {
                Ok(v) => v,
                Err(e) => return store_error_response(e),
            };
            match compose_dashboard(&state.store, &state.cfg, today, &params, has_reviewed_today)
            {
                Ok(view) => Json(view).into_response(),
                Err(e) => store_error_response(e),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewForm {
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    content: String,
    rating: Option<i64>,
}

pub(crate) async fn submit_review_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(form): Form<ReviewForm>,
) -> Response {
    let now = Utc::now();
    let rating = form.rating.unwrap_or(DEFAULT_RATING);

    // Missing author or content: ignored without feedback, back to the
    // dashboard.
    let Ok(draft) = ReviewDraft::new(&form.author_name, &form.content, rating) else {
        return Redirect::to("/").into_response();
    };

    let submitter = client_ip(&headers, peer);
    match state.store.submit_review(&draft, &submitter, now) {
        Ok(ReviewOutcome::Created(_)) => Redirect::to("/#review-section").into_response(),
        Ok(ReviewOutcome::DuplicateSameDay) => Redirect::to("/?review=duplicate").into_response(),
        Err(e) => store_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "192.0.2.9:40000".parse().expect("socket addr")
    }

    #[test]
    fn forwarded_header_takes_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, peer()), "203.0.113.5");
    }

    #[test]
    fn missing_or_blank_forwarded_header_uses_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "192.0.2.9");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_ip(&headers, peer()), "192.0.2.9");
    }
}
