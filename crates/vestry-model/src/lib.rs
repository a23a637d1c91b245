// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]

mod ledger;
mod notice;
mod page;
mod report;
mod review;
mod slide;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "vestry-model";

pub use ledger::{Direction, Transaction, TransactionDraft};
pub use notice::{attachments_from_json, attachments_to_json, Attachment, Notice, NoticeDraft};
pub use page::{page_count, requested_page, Page};
pub use report::{ReportDraft, WeeklyReport};
pub use review::{Review, ReviewDraft};
pub use slide::{Slide, SlideDraft};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}
