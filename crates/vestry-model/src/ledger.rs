// SPDX-License-Identifier: Apache-2.0
use crate::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Direction of a ledger entry. The stored amount is an unsigned magnitude;
/// the sign is implied by the direction, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            other => Err(ValidationError(format!(
                "direction must be IN or OUT, got {other:?}"
            ))),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub direction: Direction,
    pub category: String,
    pub description: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub direction: Direction,
    pub category: String,
    pub description: String,
    pub amount: i64,
}

impl TransactionDraft {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        direction: Direction,
        category: &str,
        description: &str,
        amount: i64,
    ) -> Self {
        Self {
            date,
            direction,
            category: category.to_string(),
            description: description.to_string(),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trips_through_storage_form() {
        assert_eq!(Direction::parse("IN").expect("parse IN"), Direction::In);
        assert_eq!(Direction::parse("OUT").expect("parse OUT"), Direction::Out);
        assert_eq!(Direction::In.as_str(), "IN");
    }

    #[test]
    fn direction_rejects_unknown_values() {
        let err = Direction::parse("TRANSFER").expect_err("unknown direction");
        assert!(err.0.contains("TRANSFER"));
    }
}
