pub use pushkind_common::services::errors::{ServiceError, ServiceResult};

pub mod promo_codes;

/// Slices one page out of an already filtered list.
///
/// Returns the page items and the total number of pages. Pages are 1-based;
/// page `0` is treated as the first page.
pub fn paginate_in_memory<T>(items: Vec<T>, page: usize, per_page: usize) -> (Vec<T>, usize) {
    if per_page == 0 {
        return (Vec::new(), 0);
    }

    let total_pages = items.len().div_ceil(per_page);
    let offset = (page.max(1) - 1).saturating_mul(per_page);
    let page_items = items.into_iter().skip(offset).take(per_page).collect();

    (page_items, total_pages)
}
