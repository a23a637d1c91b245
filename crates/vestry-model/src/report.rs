// SPDX-License-Identifier: Apache-2.0
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One weekly report row. Created by staff entry, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub id: i64,
    pub date: NaiveDate,
    pub attendance: i64,
    pub newcomers: i64,
    pub offering_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub date: NaiveDate,
    pub attendance: i64,
    pub newcomers: i64,
    pub offering_total: i64,
}

impl ReportDraft {
    #[must_use]
    pub fn new(date: NaiveDate, attendance: i64, newcomers: i64, offering_total: i64) -> Self {
        Self {
            date,
            attendance,
            newcomers,
            offering_total,
        }
    }
}
