// SPDX-License-Identifier: Apache-2.0
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use vestry_model::{Direction, ReportDraft, SlideDraft, TransactionDraft};
use vestry_server::{build_router, AppState, ServerConfig};
use vestry_store::LedgerStore;
use vestry_sync::{FakeSource, NoticeSyncEngine, SourceRecord, SyncConfig};

fn date(s: &str) -> NaiveDate {
    s.parse().expect("date literal")
}

fn notice_record(title: &str, date: &str) -> SourceRecord {
    serde_json::from_value(json!({
        "properties": {
            "Name": {"title": [{"plain_text": title}]},
            "Date": {"date": {"start": date}},
            "Text": {"rich_text": [{"plain_text": "body"}]}
        }
    }))
    .expect("record fixture")
}

fn seeded_store() -> Arc<LedgerStore> {
    let store = LedgerStore::open_in_memory().expect("open store");
    store
        .insert_report(&ReportDraft::new(date("2024-05-05"), 110, 2, 500_000))
        .expect("insert report");
    store
        .insert_report(&ReportDraft::new(date("2024-05-12"), 125, 4, 530_000))
        .expect("insert report");
    let now = Utc::now();
    for i in 0..25 {
        store
            .insert_transaction(
                &TransactionDraft::new(
                    date("2024-05-01"),
                    if i % 2 == 0 { Direction::In } else { Direction::Out },
                    "general",
                    &format!("entry {i}"),
                    1_000 + i,
                ),
                now,
            )
            .expect("insert transaction");
    }
    store
        .insert_slide(&SlideDraft::new(
            "welcome",
            "https://img.example/welcome.jpg",
            1,
            true,
        ))
        .expect("insert slide");
    Arc::new(store)
}

async fn spawn_app(store: Arc<LedgerStore>, sync: Arc<NoticeSyncEngine>) -> SocketAddr {
    let state = AppState::new(store, sync, ServerConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("serve");
    });
    addr
}

async fn raw_request(addr: SocketAddr, request: String) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");
    String::from_utf8(response).expect("utf8 response")
}

async fn get(addr: SocketAddr, target: &str, extra_headers: &str) -> String {
    raw_request(
        addr,
        format!(
            "GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n{extra_headers}\r\n"
        ),
    )
    .await
}

async fn post_form(addr: SocketAddr, body: &str, extra_headers: &str) -> String {
    raw_request(
        addr,
        format!(
            "POST / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: {}\r\n{extra_headers}\r\n{body}",
            body.len()
        ),
    )
    .await
}

fn body_json(response: &str) -> Value {
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b)
        .expect("response body");
    serde_json::from_str(body).expect("json body")
}

fn location_of(response: &str) -> &str {
    response
        .lines()
        .find_map(|line| line.strip_prefix("location: "))
        .expect("location header")
        .trim()
}

#[tokio::test]
async fn full_page_carries_every_section_and_syncs_once() {
    let store = seeded_store();
    let source = Arc::new(FakeSource::new(
        (0..8)
            .map(|i| notice_record(&format!("notice {i}"), "2024-05-01"))
            .collect(),
        100,
    ));
    let sync = Arc::new(NoticeSyncEngine::new(
        Some(source.clone()),
        SyncConfig::default(),
    ));
    let addr = spawn_app(store, sync).await;

    let response = get(addr, "/", "").await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    let page = body_json(&response);

    assert_eq!(page["stat"]["attendance"], 125);
    assert_eq!(page["chart"][0]["label"], "05/05");
    assert_eq!(page["slides"][0]["title"], "welcome");
    assert_eq!(page["transactions"]["total_items"], 25);
    assert_eq!(page["transactions"]["items"].as_array().map(Vec::len), Some(10));
    assert_eq!(page["notices"]["total_items"], 8);
    assert_eq!(page["has_reviewed_today"], false);

    // Second visit serves notices locally.
    get(addr, "/", "").await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn fragment_request_returns_only_the_targeted_section() {
    let addr = spawn_app(seeded_store(), Arc::new(NoticeSyncEngine::disabled())).await;

    let response = get(addr, "/?tx_page=2", "HX-Request: true\r\n").await;
    let fragment = body_json(&response);
    assert_eq!(fragment["fragment"], "transactions");
    assert_eq!(fragment["transactions"]["number"], 2);
    assert_eq!(
        fragment["transactions"]["items"].as_array().map(Vec::len),
        Some(10)
    );
    assert!(fragment.get("reviews").is_none());
    assert!(fragment.get("stat").is_none());

    // With several page parameters the transactions section wins.
    let response = get(addr, "/?review_page=1&tx_page=3", "HX-Request: true\r\n").await;
    assert_eq!(body_json(&response)["fragment"], "transactions");
}

#[tokio::test]
async fn fragment_parameter_without_header_renders_the_full_page() {
    let addr = spawn_app(seeded_store(), Arc::new(NoticeSyncEngine::disabled())).await;

    let page = body_json(&get(addr, "/?tx_page=2", "").await);
    assert!(page.get("fragment").is_none());
    assert_eq!(page["transactions"]["number"], 2);
    // Other sections keep their own page position.
    assert_eq!(page["reviews"]["number"], 1);
    assert_eq!(page["notices"]["number"], 1);
}

#[tokio::test]
async fn out_of_range_and_garbage_pages_still_render() {
    let addr = spawn_app(seeded_store(), Arc::new(NoticeSyncEngine::disabled())).await;

    let page = body_json(&get(addr, "/?tx_page=99", "").await);
    assert_eq!(page["transactions"]["number"], 3);
    assert_eq!(
        page["transactions"]["items"].as_array().map(Vec::len),
        Some(5)
    );

    let page = body_json(&get(addr, "/?tx_page=bogus", "").await);
    assert_eq!(page["transactions"]["number"], 1);
}

#[tokio::test]
async fn review_submission_is_gated_per_day_and_submitter() {
    let addr = spawn_app(seeded_store(), Arc::new(NoticeSyncEngine::disabled())).await;

    let response = post_form(addr, "author_name=Hana&content=lovely+service&rating=4", "").await;
    assert!(response.starts_with("HTTP/1.1 303"), "got: {response}");
    assert_eq!(location_of(&response), "/#review-section");

    // Same submitter, same day: rejected without storing.
    let response = post_form(addr, "author_name=Hana&content=again&rating=5", "").await;
    assert_eq!(location_of(&response), "/?review=duplicate");

    // A different forwarded address passes the gate.
    let response = post_form(
        addr,
        "author_name=Min&content=warm+welcome",
        "X-Forwarded-For: 203.0.113.50\r\n",
    )
    .await;
    assert_eq!(location_of(&response), "/#review-section");

    let page = body_json(&get(addr, "/", "").await);
    assert_eq!(page["reviews"]["total_items"], 2);
    // Omitted rating defaults to 5.
    assert_eq!(page["reviews"]["items"][0]["rating"], 5);
    assert_eq!(page["has_reviewed_today"], true);
}

#[tokio::test]
async fn review_responses_never_expose_submitter_addresses() {
    let addr = spawn_app(seeded_store(), Arc::new(NoticeSyncEngine::disabled())).await;

    post_form(
        addr,
        "author_name=Hana&content=lovely+service&rating=4",
        "X-Forwarded-For: 203.0.113.5\r\n",
    )
    .await;

    let full_page = get(addr, "/", "").await;
    assert!(!full_page.contains("submitter_ip"), "got: {full_page}");
    assert!(!full_page.contains("203.0.113.5"), "got: {full_page}");

    let fragment = get(addr, "/?review_page=1", "HX-Request: true\r\n").await;
    assert_eq!(body_json(&fragment)["reviews"]["total_items"], 1);
    assert!(!fragment.contains("submitter_ip"), "got: {fragment}");
    assert!(!fragment.contains("203.0.113.5"), "got: {fragment}");
}

#[tokio::test]
async fn blank_review_fields_are_dropped_silently() {
    let addr = spawn_app(seeded_store(), Arc::new(NoticeSyncEngine::disabled())).await;

    let response = post_form(addr, "author_name=Hana&content=++&rating=3", "").await;
    assert!(response.starts_with("HTTP/1.1 303"), "got: {response}");
    assert_eq!(location_of(&response), "/");

    let page = body_json(&get(addr, "/", "").await);
    assert_eq!(page["reviews"]["total_items"], 0);
    assert_eq!(page["has_reviewed_today"], false);
}

#[tokio::test]
async fn healthz_answers_ok() {
    let addr = spawn_app(seeded_store(), Arc::new(NoticeSyncEngine::disabled())).await;
    let response = get(addr, "/healthz", "").await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert!(response.ends_with("ok"), "got: {response}");
}
