// SPDX-License-Identifier: Apache-2.0
use serde::Serialize;

/// One page of a section. `number` is 1-based and already clamped to the
/// valid range; an empty section still has exactly one (empty) page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

#[must_use]
pub fn page_count(total_items: u64, page_size: u64) -> u64 {
    if page_size == 0 || total_items == 0 {
        return 1;
    }
    total_items.div_ceil(page_size)
}

/// Parses a raw page-number query value. Absent, non-numeric, or
/// sub-one values fall back to the first page; the store clamps to the
/// last page, so together the paginator is lenient end to end.
#[must_use]
pub fn requested_page(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_has_floor_of_one() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 6), 5);
    }

    #[test]
    fn page_param_falls_back_to_first_page() {
        assert_eq!(requested_page(None), 1);
        assert_eq!(requested_page(Some("abc")), 1);
        assert_eq!(requested_page(Some("0")), 1);
        assert_eq!(requested_page(Some("-3")), 1);
        assert_eq!(requested_page(Some(" 3 ")), 3);
    }

    #[test]
    fn page_navigation_flags() {
        let page = Page::<u32> {
            items: Vec::new(),
            number: 2,
            size: 10,
            total_items: 25,
            total_pages: 3,
        };
        assert!(page.has_previous());
        assert!(page.has_next());
    }
}
