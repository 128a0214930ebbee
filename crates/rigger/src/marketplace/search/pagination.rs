use serde::Serialize;

/// Bounds applied to incoming page requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// One-based page request. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn clamped(page: Option<i64>, limit: Option<i64>, limits: PageLimits) -> Self {
        let max_limit = limits.max_limit.max(1);
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let limit = limit
            .unwrap_or(limits.default_limit as i64)
            .clamp(1, max_limit as i64) as u32;
        Self { page, limit }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::clamped(None, None, PageLimits::default())
    }
}

/// A slice of an ordered result set plus the metadata needed to page through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page,
            limit: request.limit,
            has_more: false,
        }
    }

    /// Cut the requested page out of an already ordered collection.
    pub fn slice(ordered: Vec<T>, request: PageRequest) -> Self {
        let total = ordered.len();
        let offset = request.offset();
        let items: Vec<T> = ordered
            .into_iter()
            .skip(offset)
            .take(request.limit as usize)
            .collect();
        let has_more = offset.saturating_add(items.len()) < total;

        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            has_more,
        }
    }

    /// Convert every item, keeping the page metadata; stops at the first error.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            total: self.total,
            page: self.page,
            limit: self.limit,
            has_more: self.has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit_and_page() {
        let limits = PageLimits::default();
        assert_eq!(
            PageRequest::clamped(Some(0), Some(0), limits),
            PageRequest { page: 1, limit: 1 }
        );
        assert_eq!(
            PageRequest::clamped(Some(-4), Some(5000), limits),
            PageRequest {
                page: 1,
                limit: 100
            }
        );
        assert_eq!(
            PageRequest::clamped(None, None, limits),
            PageRequest { page: 1, limit: 20 }
        );
    }

    #[test]
    fn slice_reports_has_more() {
        let values: Vec<u32> = (0..5).collect();
        let first = Page::slice(values.clone(), PageRequest { page: 1, limit: 2 });
        assert_eq!(first.items, vec![0, 1]);
        assert!(first.has_more);
        assert_eq!(first.total, 5);

        let last = Page::slice(values.clone(), PageRequest { page: 3, limit: 2 });
        assert_eq!(last.items, vec![4]);
        assert!(!last.has_more);

        let beyond = Page::slice(values, PageRequest { page: 9, limit: 2 });
        assert!(beyond.items.is_empty());
        assert!(!beyond.has_more);
    }
}
