// SPDX-License-Identifier: Apache-2.0
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single file reference attached to a notice, already resolved to a
/// direct URL by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// An externally authored announcement mirrored into local storage.
/// `(title, date)` is the natural key; rows are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeDraft {
    pub title: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
    pub date: NaiveDate,
}

/// Deserializes a stored attachment list. A malformed column yields an
/// empty list rather than an error.
#[must_use]
pub fn attachments_from_json(raw: &str) -> Vec<Attachment> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[must_use]
pub fn attachments_to_json(attachments: &[Attachment]) -> String {
    serde_json::to_string(attachments).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_list_round_trips() {
        let list = vec![Attachment {
            name: "bulletin".to_string(),
            url: "https://files.example/bulletin.pdf".to_string(),
        }];
        let raw = attachments_to_json(&list);
        assert_eq!(attachments_from_json(&raw), list);
    }

    #[test]
    fn malformed_attachment_column_degrades_to_empty_list() {
        assert!(attachments_from_json("not json").is_empty());
        assert!(attachments_from_json("{\"name\":1}").is_empty());
        assert!(attachments_from_json("").is_empty());
    }
}
