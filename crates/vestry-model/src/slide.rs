// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

/// A dashboard slide. Managed by staff; the dashboard only reads active
/// rows ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub position: i64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDraft {
    pub title: String,
    pub image_url: String,
    pub position: i64,
    pub active: bool,
}

impl SlideDraft {
    #[must_use]
    pub fn new(title: &str, image_url: &str, position: i64, active: bool) -> Self {
        Self {
            title: title.to_string(),
            image_url: image_url.to_string(),
            position,
            active,
        }
    }
}
