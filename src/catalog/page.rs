use serde::Serialize;

/// Used when the caller asks for fewer than one item per page.
pub const DEFAULT_PER_PAGE: i64 = 100;

/// One page of a catalog plus the metadata needed to navigate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T: Clone> Page<T> {
    /// Cut page `page` (1-based) out of `items`.
    ///
    /// `page` below 1 becomes 1, `per_page` below 1 becomes
    /// [`DEFAULT_PER_PAGE`], and a page past the end is clamped to the last
    /// page. An empty catalog yields page 0 with no data.
    pub fn of(items: &[T], page: i64, per_page: i64) -> Self {
        let total = items.len() as i64;
        let per_page = if per_page < 1 { DEFAULT_PER_PAGE } else { per_page };
        let total_pages = if total == 0 { 0 } else { (total - 1) / per_page + 1 };
        let page = page.max(1).min(total_pages);

        let start = (page - 1) * per_page;
        let end = start.saturating_add(per_page);
        let start = start.clamp(0, total) as usize;
        let end = end.clamp(0, total) as usize;

        Page {
            data: items[start..end].to_vec(),
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
