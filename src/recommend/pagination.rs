use serde::{Deserialize, Serialize};

/// One page of a result list. Pages are 1-based; an empty list still has a
/// single (empty) page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Missing or zero page numbers resolve to the first page, numbers past the
/// end to the last one.
pub fn paginate<T: Clone>(items: &[T], page: Option<usize>, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.filter(|p| *p >= 1).unwrap_or(1).min(total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    Page {
        items: items[start.min(total_items)..end].to_vec(),
        page,
        total_pages,
        total_items,
    }
}
