//! Page window selection

use tracing::debug;

use crate::core::Query;

/// A paged query together with the page actually served
#[derive(Debug, Clone)]
pub struct PageWindow {
    pub query: Query,
    pub page: i64,
    pub page_size: i64,
}

/// Restrict `query` to one page
///
/// The page size falls back to `default_page_size` and is clamped to
/// `1..=max_page_size`; the page is at least 1. With a known total, a page
/// past the end is pulled back to the last page (page 1 when there is
/// nothing to show). Without a total the requested page is served as is
/// and may be empty.
pub fn apply_page(
    query: Query,
    page: Option<i64>,
    page_size: Option<i64>,
    total_count: Option<u64>,
    max_page_size: i64,
    default_page_size: i64,
) -> PageWindow {
    let page_size = page_size
        .unwrap_or(default_page_size)
        .clamp(1, max_page_size.max(1));
    let mut page = page.unwrap_or(1).max(1);

    if let Some(total) = total_count {
        let total = i64::try_from(total).unwrap_or(i64::MAX);
        if (page - 1).saturating_mul(page_size) > total {
            let last = if total == 0 { 1 } else { (total - 1) / page_size + 1 };
            debug!(requested = page, served = last, "page past the end, serving last page");
            page = last;
        }
    }

    let mut query = query;
    if page > 1 {
        let skip = (page - 1).saturating_mul(page_size);
        query = query.skip(usize::try_from(skip).unwrap_or(usize::MAX));
    }
    let take = usize::try_from(page_size).unwrap_or(usize::MAX);

    PageWindow {
        query: query.take(take),
        page,
        page_size,
    }
}
