//! Page arithmetic shared by every list screen.
//!
//! Pages are zero-based in query strings (`?page=0` is the first page), the
//! same convention the remote API uses for `getAdmins`.

/// Rows per page on every list screen.
pub const PAGE_SIZE: usize = 10;

/// Number of pages needed to show `total` rows, `per_page` at a time.
///
/// A `per_page` of zero is treated as one so the result is always defined.
///
/// ```
/// use dvs_core::page_count;
///
/// assert_eq!(page_count(0, 10), 0);
/// assert_eq!(page_count(10, 10), 1);
/// assert_eq!(page_count(11, 10), 2);
/// ```
#[must_use]
pub const fn page_count(total: usize, per_page: usize) -> usize {
    let per_page = if per_page == 0 { 1 } else { per_page };
    total.div_ceil(per_page)
}

/// A resolved page position: which page is shown out of how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Zero-based index of the page being shown.
    pub index: usize,
    /// Total number of pages (zero when there are no rows).
    pub count: usize,
}

impl PageWindow {
    /// Resolve a requested page against a page count, clamping past-the-end
    /// requests onto the last page.
    #[must_use]
    pub const fn clamped(requested: usize, count: usize) -> Self {
        let index = if count == 0 {
            0
        } else if requested >= count {
            count - 1
        } else {
            requested
        };
        Self { index, count }
    }

    /// Whether a "previous" link should be shown.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Whether a "next" link should be shown.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.index.saturating_add(1) < self.count
    }

    /// One-based page number for display.
    #[must_use]
    pub const fn display_number(&self) -> usize {
        self.index.saturating_add(1)
    }

    /// Half-open row range `[start, end)` this page covers in a list of `len` rows.
    #[must_use]
    pub fn row_range(&self, len: usize, per_page: usize) -> std::ops::Range<usize> {
        let start = self.index.saturating_mul(per_page).min(len);
        let end = start.saturating_add(per_page).min(len);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_is_ceiling_of_total_over_page_size() {
        for n in 0..=95 {
            let expected = (n + PAGE_SIZE - 1) / PAGE_SIZE;
            assert_eq!(page_count(n, PAGE_SIZE), expected, "n = {n}");
        }
    }

    #[test]
    fn test_zero_page_size_does_not_divide_by_zero() {
        assert_eq!(page_count(3, 0), 3);
    }

    #[test]
    fn test_clamped_window() {
        assert_eq!(PageWindow::clamped(7, 3).index, 2);
        assert_eq!(PageWindow::clamped(1, 3).index, 1);
        assert_eq!(PageWindow::clamped(4, 0), PageWindow { index: 0, count: 0 });
    }

    #[test]
    fn test_navigation_flags() {
        let first = PageWindow::clamped(0, 3);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = PageWindow::clamped(2, 3);
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.display_number(), 3);
    }

    #[test]
    fn test_row_range_covers_last_partial_page() {
        let window = PageWindow::clamped(2, 3);
        assert_eq!(window.row_range(23, PAGE_SIZE), 20..23);
        assert_eq!(PageWindow::clamped(0, 0).row_range(0, PAGE_SIZE), 0..0);
    }

    #[test]
    fn test_huge_index_saturates() {
        let window = PageWindow {
            index: usize::MAX,
            count: usize::MAX,
        };
        assert_eq!(window.display_number(), usize::MAX);
        assert!(!window.has_next());
        assert_eq!(window.row_range(5, PAGE_SIZE), 5..5);
    }
}
