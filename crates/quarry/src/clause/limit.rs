//! LIMIT/OFFSET clause with paging arithmetic.

const DEFAULT_PER_PAGE: u64 = 10;

/// Accumulates limit/offset state, directly or derived from page/per-page.
///
/// Setting a limit or offset directly clears any page; setting a page derives
/// `limit = per_page` and `offset = per_page * (page - 1)`; changing the
/// per-page size re-derives both while a page is set.
#[derive(Clone, Debug, Default)]
pub struct Limit {
    limit: u64,
    offset: u64,
    page: u64,
    per_page: u64,
}

impl Limit {
    /// Set the row limit directly.
    pub fn limit(&mut self, limit: u64) {
        self.limit = limit;
        self.page = 0;
    }

    /// Set the row offset directly.
    pub fn offset(&mut self, offset: u64) {
        self.offset = offset;
        self.page = 0;
    }

    /// Set the 1-based page; 0 clears paging.
    pub fn page(&mut self, page: u64) {
        self.page = page;
        self.derive_paging();
    }

    /// Set the page size used by [`Limit::page`].
    pub fn per_page(&mut self, per_page: u64) {
        self.per_page = per_page;
        if self.page > 0 {
            self.derive_paging();
        }
    }

    fn derive_paging(&mut self) {
        if self.page > 0 {
            let per_page = if self.per_page > 0 {
                self.per_page
            } else {
                DEFAULT_PER_PAGE
            };
            self.limit = per_page;
            self.offset = per_page * (self.page - 1);
        } else {
            self.limit = 0;
            self.offset = 0;
        }
    }

    /// Whether neither a limit nor an offset is in effect.
    pub fn is_empty(&self) -> bool {
        self.limit == 0 && self.offset == 0
    }

    /// The post-keyword dialect hook position. The standard rendering emits
    /// nothing here; it observes the same state as [`Limit::build`].
    pub fn build_early(&self) -> String {
        String::new()
    }

    /// Render the trailing LIMIT/OFFSET fragment.
    pub fn build(&self) -> String {
        let mut out = String::new();
        if self.limit > 0 {
            out.push_str(&format!(" LIMIT {}", self.limit));
        }
        if self.offset > 0 {
            out.push_str(&format!(" OFFSET {}", self.offset));
        }
        out
    }

    /// Clear all limit/offset/paging state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_and_offset() {
        let mut limit = Limit::default();
        limit.limit(10);
        limit.offset(20);
        assert_eq!(limit.build(), " LIMIT 10 OFFSET 20");
        assert_eq!(limit.build_early(), "");
    }

    #[test]
    fn test_page_derives_window() {
        let mut limit = Limit::default();
        limit.per_page(25);
        limit.page(3);
        assert_eq!(limit.build(), " LIMIT 25 OFFSET 50");
    }

    #[test]
    fn test_page_defaults_per_page() {
        let mut limit = Limit::default();
        limit.page(2);
        assert_eq!(limit.build(), " LIMIT 10 OFFSET 10");
    }

    #[test]
    fn test_per_page_rederives_while_paged() {
        let mut limit = Limit::default();
        limit.page(2);
        limit.per_page(50);
        assert_eq!(limit.build(), " LIMIT 50 OFFSET 50");
    }

    #[test]
    fn test_direct_limit_clears_page() {
        let mut limit = Limit::default();
        limit.page(4);
        limit.limit(7);
        assert_eq!(limit.build(), " LIMIT 7 OFFSET 30");
        limit.page(0);
        assert_eq!(limit.build(), "");
    }

    #[test]
    fn test_empty() {
        assert_eq!(Limit::default().build(), "");
    }
}
