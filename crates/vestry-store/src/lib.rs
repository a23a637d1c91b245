// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]

mod schema;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Mutex;
use vestry_model::{
    attachments_from_json, attachments_to_json, page_count, Direction, Notice, NoticeDraft, Page,
    ReportDraft, Review, ReviewDraft, Slide, SlideDraft, Transaction, TransactionDraft,
    WeeklyReport,
};

pub const CRATE_NAME: &str = "vestry-store";

pub use schema::SCHEMA_VERSION;

#[derive(Debug)]
pub struct StoreError(pub String);

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for StoreError {}

/// Outcome of a gated review submission. A same-day duplicate is a normal
/// outcome, not an error; the caller informs the user and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Created(i64),
    DuplicateSameDay,
}

/// The ledger store owns all persisted records. Records are written once
/// and never updated; everything the dashboard renders is read from here.
pub struct LedgerStore {
    conn: Mutex<Connection>,
}

impl LedgerStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "opened ledger database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(schema::BOOTSTRAP_SQL)
            .map_err(|e| StoreError(e.to_string()))?;
        conn.execute_batch(&format!("PRAGMA user_version={};", schema::SCHEMA_VERSION))
            .map_err(|e| StoreError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError("store mutex poisoned".to_string()))?;
        f(&conn)
    }

    pub fn insert_report(&self, draft: &ReportDraft) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO weekly_reports (date, attendance, newcomers, offering_total)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    draft.date,
                    draft.attendance,
                    draft.newcomers,
                    draft.offering_total
                ],
            )
            .map_err(|e| StoreError(e.to_string()))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn insert_transaction(
        &self,
        draft: &TransactionDraft,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO transactions (date, direction, category, description, amount, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    draft.date,
                    draft.direction.as_str(),
                    draft.category,
                    draft.description,
                    draft.amount,
                    created_at
                ],
            )
            .map_err(|e| StoreError(e.to_string()))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn insert_slide(&self, draft: &SlideDraft) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO slides (title, image_url, position, active) VALUES (?1, ?2, ?3, ?4)",
                params![draft.title, draft.image_url, draft.position, draft.active],
            )
            .map_err(|e| StoreError(e.to_string()))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// The stat snapshot: latest report dated on or before `as_of`.
    pub fn latest_report(&self, as_of: NaiveDate) -> Result<Option<WeeklyReport>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, date, attendance, newcomers, offering_total
                 FROM weekly_reports WHERE date <= ?1
                 ORDER BY date DESC, id DESC LIMIT 1",
                params![as_of],
                map_report,
            )
            .optional()
            .map_err(|e| StoreError(e.to_string()))
        })
    }

    /// Most recent reports on or before `as_of`, newest first. The chart
    /// builder reverses these into oldest-first order.
    pub fn recent_reports(
        &self,
        as_of: NaiveDate,
        limit: u64,
    ) -> Result<Vec<WeeklyReport>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, date, attendance, newcomers, offering_total
                     FROM weekly_reports WHERE date <= ?1
                     ORDER BY date DESC, id DESC LIMIT ?2",
                )
                .map_err(|e| StoreError(e.to_string()))?;
            let rows = stmt
                .query_map(params![as_of, limit as i64], map_report)
                .map_err(|e| StoreError(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError(e.to_string()))
        })
    }

    pub fn transactions_page(
        &self,
        requested: u64,
        size: u64,
    ) -> Result<Page<Transaction>, StoreError> {
        self.with_conn(|conn| {
            paged(
                conn,
                "SELECT COUNT(*) FROM transactions",
                "SELECT id, date, direction, category, description, amount, created_at
                 FROM transactions ORDER BY date DESC, id DESC LIMIT ?1 OFFSET ?2",
                requested,
                size,
                map_transaction,
            )
        })
    }

    pub fn reviews_page(&self, requested: u64, size: u64) -> Result<Page<Review>, StoreError> {
        self.with_conn(|conn| {
            paged(
                conn,
                "SELECT COUNT(*) FROM reviews",
                "SELECT id, author, content, rating, submitter_ip, created_at
                 FROM reviews ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                requested,
                size,
                map_review,
            )
        })
    }

    pub fn notices_page(&self, requested: u64, size: u64) -> Result<Page<Notice>, StoreError> {
        self.with_conn(|conn| {
            paged(
                conn,
                "SELECT COUNT(*) FROM notices",
                "SELECT id, title, body, attachments, date, created_at
                 FROM notices ORDER BY date DESC, id DESC LIMIT ?1 OFFSET ?2",
                requested,
                size,
                map_notice,
            )
        })
    }

    pub fn notice_count(&self) -> Result<u64, StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM notices", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(|e| StoreError(e.to_string()))
        })
    }

    /// Imports one synced notice. Returns `false` when a row with the same
    /// `(title, date)` already exists; the existing row is never touched.
    pub fn import_notice(
        &self,
        draft: &NoticeDraft,
        created_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "INSERT OR IGNORE INTO notices (title, body, attachments, date, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        draft.title,
                        draft.body,
                        attachments_to_json(&draft.attachments),
                        draft.date,
                        created_at
                    ],
                )
                .map_err(|e| StoreError(e.to_string()))?;
            Ok(changed > 0)
        })
    }

    pub fn has_reviewed_on(&self, submitter_ip: &str, date: NaiveDate) -> Result<bool, StoreError> {
        self.with_conn(|conn| review_exists(conn, submitter_ip, date))
    }

    /// The review gate: at most one review per (submitter IP, calendar
    /// day). Check and insert run under the same connection lock.
    pub fn submit_review(
        &self,
        draft: &ReviewDraft,
        submitter_ip: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, StoreError> {
        self.with_conn(|conn| {
            if review_exists(conn, submitter_ip, now.date_naive())? {
                return Ok(ReviewOutcome::DuplicateSameDay);
            }
            conn.execute(
                "INSERT INTO reviews (author, content, rating, submitter_ip, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![draft.author, draft.content, draft.rating, submitter_ip, now],
            )
            .map_err(|e| StoreError(e.to_string()))?;
            Ok(ReviewOutcome::Created(conn.last_insert_rowid()))
        })
    }

    pub fn active_slides(&self) -> Result<Vec<Slide>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, image_url, position, active
                     FROM slides WHERE active = 1 ORDER BY position, id",
                )
                .map_err(|e| StoreError(e.to_string()))?;
            let rows = stmt
                .query_map([], map_slide)
                .map_err(|e| StoreError(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError(e.to_string()))
        })
    }
}

fn review_exists(
    conn: &Connection,
    submitter_ip: &str,
    date: NaiveDate,
) -> Result<bool, StoreError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM reviews WHERE submitter_ip = ?1 AND date(created_at) = ?2)",
        params![submitter_ip, date],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n != 0)
    .map_err(|e| StoreError(e.to_string()))
}

fn paged<T>(
    conn: &Connection,
    count_sql: &str,
    select_sql: &str,
    requested: u64,
    size: u64,
    map: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Page<T>, StoreError> {
    let total_items = conn
        .query_row(count_sql, [], |row| row.get::<_, i64>(0))
        .map(|n| n as u64)
        .map_err(|e| StoreError(e.to_string()))?;
    let total_pages = page_count(total_items, size);
    let number = requested.clamp(1, total_pages);
    let offset = (number - 1) * size;
    let mut stmt = conn
        .prepare(select_sql)
        .map_err(|e| StoreError(e.to_string()))?;
    let rows = stmt
        .query_map(params![size as i64, offset as i64], map)
        .map_err(|e| StoreError(e.to_string()))?;
    let items = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError(e.to_string()))?;
    Ok(Page {
        items,
        number,
        size,
        total_items,
        total_pages,
    })
}

fn map_report(row: &Row<'_>) -> rusqlite::Result<WeeklyReport> {
    Ok(WeeklyReport {
        id: row.get(0)?,
        date: row.get(1)?,
        attendance: row.get(2)?,
        newcomers: row.get(3)?,
        offering_total: row.get(4)?,
    })
}

fn map_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let raw_direction: String = row.get(2)?;
    let direction = Direction::parse(&raw_direction).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        direction,
        category: row.get(3)?,
        description: row.get(4)?,
        amount: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_review(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        author: row.get(1)?,
        content: row.get(2)?,
        rating: row.get(3)?,
        submitter_ip: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_notice(row: &Row<'_>) -> rusqlite::Result<Notice> {
    let raw_attachments: String = row.get(3)?;
    Ok(Notice {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        attachments: attachments_from_json(&raw_attachments),
        date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_slide(row: &Row<'_>) -> rusqlite::Result<Slide> {
    Ok(Slide {
        id: row.get(0)?,
        title: row.get(1)?,
        image_url: row.get(2)?,
        position: row.get(3)?,
        active: row.get(4)?,
    })
}
