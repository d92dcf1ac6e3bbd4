//! Page-number helpers for listing templates.

use serde::Serialize;

/// Number of rows shown on paginated back-office and storefront listings.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }
    let current_page = current_page.min(last_page);

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current + 1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[derive(Debug, Serialize)]
/// One page of items plus the page links to render (`None` marks a gap).
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            items,
            pages,
            page: current_page,
        }
    }

    /// Builds a page from the total row count of the underlying query.
    pub fn from_total(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        Self::new(items, current_page, total.div_ceil(per_page.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pages_for_empty_result() {
        assert!(get_pages(0, 1, 2, 2, 4, 2).is_empty());
    }

    #[test]
    fn small_page_counts_are_listed_fully() {
        assert_eq!(
            get_pages(3, 2, 2, 2, 4, 2),
            vec![Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn gaps_are_marked_with_none() {
        let pages = get_pages(30, 15, 2, 2, 4, 2);
        assert_eq!(
            pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(13),
                Some(14),
                Some(15),
                Some(16),
                Some(17),
                Some(18),
                Some(19),
                None,
                Some(29),
                Some(30)
            ]
        );
    }

    #[test]
    fn page_beyond_the_end_does_not_overflow() {
        let paginated = Paginated::from_total(Vec::<i32>::new(), usize::MAX, 45, 20);
        assert_eq!(paginated.page, usize::MAX);
        assert_eq!(paginated.pages, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        let paginated = Paginated::from_total(vec![1, 2, 3], 0, 45, 20);
        assert_eq!(paginated.page, 1);
        assert_eq!(paginated.pages, vec![Some(1), Some(2), Some(3)]);
    }
}
