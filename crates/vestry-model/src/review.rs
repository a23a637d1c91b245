// SPDX-License-Identifier: Apache-2.0
use crate::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub rating: i64,
    // Stored for the submission gate only; never rendered.
    #[serde(skip_serializing, default)]
    pub submitter_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A review as submitted, before the gate stamps it with an IP and
/// timestamp. Author and content must be non-empty; the rating is carried
/// as-is (the declared 1-5 bounds are not enforced on submission).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub author: String,
    pub content: String,
    pub rating: i64,
}

impl ReviewDraft {
    pub fn new(author: &str, content: &str, rating: i64) -> Result<Self, ValidationError> {
        let author = author.trim();
        let content = content.trim();
        if author.is_empty() {
            return Err(ValidationError("review author must not be empty".to_string()));
        }
        if content.is_empty() {
            return Err(ValidationError(
                "review content must not be empty".to_string(),
            ));
        }
        Ok(Self {
            author: author.to_string(),
            content: content.to_string(),
            rating,
        })
    }
}
