// SPDX-License-Identifier: Apache-2.0
use crate::config::ServerConfig;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use vestry_model::{requested_page, Notice, Page, Review, Slide, Transaction, WeeklyReport};
use vestry_store::{LedgerStore, StoreError};

/// Request header that marks an in-place pagination fetch.
pub const FRAGMENT_HEADER: &str = "hx-request";

pub const TX_PAGE_PARAM: &str = "tx_page";
pub const REVIEW_PAGE_PARAM: &str = "review_page";
pub const NOTICE_PAGE_PARAM: &str = "notice_page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Transactions,
    Reviews,
    Notices,
}

impl SectionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Reviews => "reviews",
            Self::Notices => "notices",
        }
    }
}

/// Picks the fragment a request targets, if any: the fragment header must
/// be present along with a section page parameter. Checked in fixed
/// order (transactions, reviews, notices); the first match wins even
/// when several page parameters are present.
#[must_use]
pub fn fragment_target(
    fragment_request: bool,
    params: &HashMap<String, String>,
) -> Option<SectionKind> {
    if !fragment_request {
        return None;
    }
    if params.contains_key(TX_PAGE_PARAM) {
        return Some(SectionKind::Transactions);
    }
    if params.contains_key(REVIEW_PAGE_PARAM) {
        return Some(SectionKind::Reviews);
    }
    if params.contains_key(NOTICE_PAGE_PARAM) {
        return Some(SectionKind::Notices);
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub attendance: i64,
}

/// Builds the attendance series from reports queried newest-first. The
/// chart draws past to present, so the order is reversed here.
#[must_use]
pub fn chart_series(reports_newest_first: &[WeeklyReport]) -> Vec<ChartPoint> {
    reports_newest_first
        .iter()
        .rev()
        .map(|r| ChartPoint {
            label: r.date.format("%m/%d").to_string(),
            attendance: r.attendance,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub stat: Option<WeeklyReport>,
    pub chart: Vec<ChartPoint>,
    pub slides: Vec<Slide>,
    pub transactions: Page<Transaction>,
    pub reviews: Page<Review>,
    pub notices: Page<Notice>,
    pub has_reviewed_today: bool,
}

pub fn transactions_section(
    store: &LedgerStore,
    cfg: &ServerConfig,
    params: &HashMap<String, String>,
) -> Result<Page<Transaction>, StoreError> {
    let page = requested_page(params.get(TX_PAGE_PARAM).map(String::as_str));
    store.transactions_page(page, cfg.tx_page_size)
}

pub fn reviews_section(
    store: &LedgerStore,
    cfg: &ServerConfig,
    params: &HashMap<String, String>,
) -> Result<Page<Review>, StoreError> {
    let page = requested_page(params.get(REVIEW_PAGE_PARAM).map(String::as_str));
    store.reviews_page(page, cfg.review_page_size)
}

pub fn notices_section(
    store: &LedgerStore,
    cfg: &ServerConfig,
    params: &HashMap<String, String>,
) -> Result<Page<Notice>, StoreError> {
    let page = requested_page(params.get(NOTICE_PAGE_PARAM).map(String::as_str));
    store.notices_page(page, cfg.notice_page_size)
}

/// Assembles the full dashboard for one request. `as_of` is computed
/// once by the caller so the snapshot and chart share the same instant.
pub fn compose_dashboard(
    store: &LedgerStore,
    cfg: &ServerConfig,
    as_of: NaiveDate,
    params: &HashMap<String, String>,
    has_reviewed_today: bool,
) -> Result<DashboardView, StoreError> {
    let stat = store.latest_report(as_of)?;
    let chart = chart_series(&store.recent_reports(as_of, cfg.chart_weeks)?);
    let slides = store.active_slides()?;
    let transactions = transactions_section(store, cfg, params)?;
    let reviews = reviews_section(store, cfg, params)?;
    let notices = notices_section(store, cfg, params)?;
    Ok(DashboardView {
        stat,
        chart,
        slides,
        transactions,
        reviews,
        notices,
        has_reviewed_today,
    })
}
