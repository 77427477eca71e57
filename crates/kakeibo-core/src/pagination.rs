//! Page slicing for detail lists
//!
//! Detail lists are ordered by date descending, then id descending. Pages
//! are 1-indexed; a requested page of 0 or below reads as page 1, and a page
//! past the end yields no items while still echoing the requested number.

use kakeibo_store::{DatedAmount, ExpenseDetail, IncomeDetail};
use serde::{Deserialize, Serialize};

/// Normalized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: i64, size: usize) -> Self {
        Self {
            page: if page < 1 { 1 } else { page as usize },
            size,
        }
    }

    /// Build from the raw `page` query value; unparseable input is page 1
    pub fn from_query(value: Option<&str>, size: usize) -> Self {
        let page = value.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(1);
        Self::new(page, size)
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> usize {
        self.size
    }
}

/// One page of a detail list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    /// 0 when there are no records
    pub total_pages: usize,
    pub total_count: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Assemble a page from an already-sliced query result
    pub fn from_parts(items: Vec<T>, request: PageRequest, total_count: usize) -> Self {
        Self {
            items,
            current_page: request.page,
            total_pages: total_pages(total_count, request.size),
            total_count,
            page_size: request.size,
        }
    }

    /// Page count as shown to users; an empty list reads "1 / 1"
    pub fn display_total_pages(&self) -> usize {
        self.total_pages.max(1)
    }

    /// Previous page for navigation, clamped into the displayable range
    pub fn prev_page(&self) -> usize {
        self.current_page.saturating_sub(1).clamp(1, self.display_total_pages())
    }

    /// Next page for navigation, clamped into the displayable range
    pub fn next_page(&self) -> usize {
        (self.current_page + 1).clamp(1, self.display_total_pages())
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// ceil(count / size)
pub fn total_pages(count: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    count.div_ceil(size)
}

/// Slice a fully materialized, already ordered list
pub fn paginate<T>(list: Vec<T>, request: PageRequest) -> Page<T> {
    let total_count = list.len();
    let items = list
        .into_iter()
        .skip(request.offset())
        .take(request.limit())
        .collect();
    Page::from_parts(items, request, total_count)
}

/// Records that can be listed newest first
pub trait DisplayOrder {
    fn date(&self) -> &str;
    fn id(&self) -> &str;
}

impl DisplayOrder for ExpenseDetail {
    fn date(&self) -> &str {
        &self.paid_at
    }
    fn id(&self) -> &str {
        &self.id
    }
}

impl DisplayOrder for IncomeDetail {
    fn date(&self) -> &str {
        &self.received_at
    }
    fn id(&self) -> &str {
        &self.id
    }
}

impl DisplayOrder for DatedAmount {
    fn date(&self) -> &str {
        &self.date
    }
    fn id(&self) -> &str {
        &self.id
    }
}

/// Sort by date descending, then id descending
pub fn sort_for_display<T: DisplayOrder>(items: &mut [T]) {
    items.sort_by(|a, b| b.date().cmp(a.date()).then_with(|| b.id().cmp(a.id())));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, date: &str) -> DatedAmount {
        DatedAmount {
            id: id.to_string(),
            amount: 1,
            member_id: "m".to_string(),
            date: date.to_string(),
            category_id: "c".to_string(),
        }
    }

    #[test]
    fn test_forty_five_records() {
        let list: Vec<usize> = (0..45).collect();

        let first = paginate(list.clone(), PageRequest::new(1, 20));
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items, (0..20).collect::<Vec<_>>());

        let last = paginate(list, PageRequest::new(3, 20));
        assert_eq!(last.items, (40..45).collect::<Vec<_>>());
        assert_eq!(last.total_count, 45);
    }

    #[test]
    fn test_page_floor() {
        assert_eq!(PageRequest::new(0, 20).page, 1);
        assert_eq!(PageRequest::new(-3, 20).page, 1);
        assert_eq!(PageRequest::from_query(Some("abc"), 20).page, 1);
        assert_eq!(PageRequest::from_query(Some("2"), 20).offset(), 20);
        assert_eq!(PageRequest::from_query(None, 20).offset(), 0);
    }

    #[test]
    fn test_out_of_range_page_echoes_request() {
        let page = paginate((0..5).collect::<Vec<_>>(), PageRequest::new(9, 20));
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 9);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.next_page(), 1);
        assert_eq!(page.prev_page(), 1);
    }

    #[test]
    fn test_empty_list() {
        let page = paginate(Vec::<u8>::new(), PageRequest::new(1, 20));
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.display_total_pages(), 1);
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn test_navigation_clamps() {
        let page = paginate((0..45).collect::<Vec<_>>(), PageRequest::new(2, 20));
        assert_eq!(page.prev_page(), 1);
        assert_eq!(page.next_page(), 3);
        assert!(page.has_prev());
        assert!(page.has_next());
    }

    #[test]
    fn test_sort_is_stable_on_same_date() {
        let mut items = vec![
            record("a", "2024-03-01"),
            record("c", "2024-03-05"),
            record("b", "2024-03-05"),
            record("d", "2024-02-28"),
        ];
        sort_for_display(&mut items);
        let ids: Vec<_> = items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a", "d"]);

        let mut again = items.clone();
        again.reverse();
        sort_for_display(&mut again);
        assert_eq!(again, items);
    }
}
