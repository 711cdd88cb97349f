//! Pagination utilities for list endpoints
//!
//! Lists take optional `size` and `page` query values (1-indexed pages,
//! default size 24). Pages past the end are empty rather than clamped.

use songrate_common::api::Page;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: i64 = 24;

/// Validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Items per page (>= 1)
    pub size: i64,
    /// Page number (1-indexed)
    pub page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl PageRequest {
    /// Parse raw query values
    ///
    /// Absent values take their defaults; present values must be positive
    /// integers.
    ///
    /// # Examples
    /// ```
    /// use songrate_api::pagination::PageRequest;
    ///
    /// let p = PageRequest::parse(Some("10"), Some("3")).unwrap();
    /// assert_eq!(p.limit(), 10);
    /// assert_eq!(p.offset(), 20);
    ///
    /// let p = PageRequest::parse(None, None).unwrap();
    /// assert_eq!(p.limit(), 24);
    /// assert_eq!(p.offset(), 0);
    ///
    /// assert!(PageRequest::parse(Some("ten"), None).is_err());
    /// ```
    pub fn parse(size: Option<&str>, page: Option<&str>) -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            size: parse_positive("size", size)?.unwrap_or(defaults.size),
            page: parse_positive("page", page)?.unwrap_or(defaults.page),
        })
    }

    /// SQL LIMIT
    pub fn limit(&self) -> i64 {
        self.size
    }

    /// SQL OFFSET
    pub fn offset(&self) -> i64 {
        self.size.saturating_mul(self.page - 1)
    }

    /// Totals for a result set of `total_items` rows
    pub fn totals(&self, total_items: i64) -> Page {
        Page {
            total_items,
            total_pages: total_pages(total_items, self.size),
        }
    }
}

/// `ceil(total_items / size)`
pub fn total_pages(total_items: i64, size: i64) -> i64 {
    if size <= 0 || total_items <= 0 {
        return 0;
    }
    total_items / size + i64::from(total_items % size != 0)
}

fn parse_positive(name: &str, raw: Option<&str>) -> Result<Option<i64>, String> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<i64>() {
        Ok(value) if value >= 1 => Ok(Some(value)),
        _ => Err(format!("Invalid query parameter {}: {:?}", name, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = PageRequest::parse(None, None).unwrap();
        assert_eq!(p.size, 24);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_normal() {
        let p = PageRequest::parse(Some("100"), Some("2")).unwrap();
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 100);
        assert_eq!(p.totals(250).total_pages, 3);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = PageRequest::parse(Some("100"), Some("2")).unwrap();
        let totals = p.totals(200);
        assert_eq!(totals.total_items, 200);
        assert_eq!(totals.total_pages, 2);
    }

    #[test]
    fn test_pagination_empty() {
        let p = PageRequest::default();
        assert_eq!(p.totals(0).total_pages, 0);
    }

    #[test]
    fn test_pagination_past_end_not_clamped() {
        let p = PageRequest::parse(Some("10"), Some("99")).unwrap();
        assert_eq!(p.offset(), 980);
        assert_eq!(p.totals(15).total_pages, 2);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let p = PageRequest::parse(Some(""), Some("  ")).unwrap();
        assert_eq!(p, PageRequest::default());
    }

    #[test]
    fn test_rejects_non_positive_and_non_numeric() {
        assert!(PageRequest::parse(Some("0"), None).is_err());
        assert!(PageRequest::parse(Some("-3"), None).is_err());
        assert!(PageRequest::parse(None, Some("0")).is_err());
        assert!(PageRequest::parse(None, Some("two")).is_err());
        assert!(PageRequest::parse(Some("2.5"), None).is_err());
    }

    #[test]
    fn test_huge_size_does_not_overflow() {
        let p = PageRequest::parse(Some(&i64::MAX.to_string()), None).unwrap();
        assert_eq!(p.offset(), 0);
        assert_eq!(p.totals(1).total_pages, 1);
        assert_eq!(p.totals(0).total_pages, 0);
        assert_eq!(total_pages(i64::MAX, i64::MAX), 1);
        assert_eq!(total_pages(i64::MAX, 2), i64::MAX / 2 + 1);

        let last = PageRequest::parse(Some(&i64::MAX.to_string()), Some("3")).unwrap();
        assert_eq!(last.offset(), i64::MAX);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        for size in 1..=12 {
            for total in 0..=50 {
                let expected = (total as f64 / size as f64).ceil() as i64;
                assert_eq!(total_pages(total, size), expected, "total={total} size={size}");
            }
        }
    }
}
