// SPDX-License-Identifier: Apache-2.0
//! Typed view of the external notice source's query payload. Every field
//! is optional with a default so a sparse or oddly shaped record degrades
//! to empty values instead of failing the whole page.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use vestry_model::{Attachment, NoticeDraft};

pub const DEFAULT_TITLE: &str = "untitled";
pub const DEFAULT_ATTACHMENT_NAME: &str = "attachment";

/// Names of the source database properties the extractor reads. The
/// source schema is operator-defined, so these are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub title: String,
    pub date: String,
    pub text: String,
    pub files: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: "Name".to_string(),
            date: "Date".to_string(),
            text: "Text".to_string(),
            files: "Files".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<SourceRecord>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub properties: BTreeMap<String, SourceProperty>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceProperty {
    #[serde(default)]
    pub title: Vec<RichTextFragment>,
    #[serde(default)]
    pub rich_text: Vec<RichTextFragment>,
    #[serde(default)]
    pub date: Option<DateProperty>,
    #[serde(default)]
    pub files: Vec<FileReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichTextFragment {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateProperty {
    #[serde(default)]
    pub start: String,
}

/// A file entry carries either an uploaded-file reference or an
/// external-link reference; both resolve to a direct URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileReference {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file: Option<UrlReference>,
    #[serde(default)]
    pub external: Option<UrlReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlReference {
    #[serde(default)]
    pub url: String,
}

impl SourceRecord {
    /// Extracts a local notice draft. Missing title falls back to
    /// "untitled", a missing or unparseable date to `fallback_date`, and
    /// file entries without a resolvable URL are dropped.
    #[must_use]
    pub fn extract(&self, names: &PropertyNames, fallback_date: NaiveDate) -> NoticeDraft {
        let title = self
            .properties
            .get(&names.title)
            .and_then(|p| p.title.first())
            .map(|t| t.plain_text.clone())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let date = self
            .properties
            .get(&names.date)
            .and_then(|p| p.date.as_ref())
            .and_then(|d| d.start.get(..10))
            .and_then(|s| s.parse::<NaiveDate>().ok())
            .unwrap_or(fallback_date);

        let body = self
            .properties
            .get(&names.text)
            .map(|p| {
                p.rich_text
                    .iter()
                    .map(|f| f.plain_text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        let attachments = self
            .properties
            .get(&names.files)
            .map(|p| p.files.iter().filter_map(resolve_attachment).collect())
            .unwrap_or_default();

        NoticeDraft {
            title,
            body,
            attachments,
            date,
        }
    }
}

fn resolve_attachment(entry: &FileReference) -> Option<Attachment> {
    let url = entry
        .file
        .as_ref()
        .or(entry.external.as_ref())
        .map(|r| r.url.clone())
        .filter(|u| !u.is_empty())?;
    let name = entry
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_ATTACHMENT_NAME.to_string());
    Some(Attachment { name, url })
}
