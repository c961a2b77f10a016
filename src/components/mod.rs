//! Pure layout helpers for form-adjacent controls.

mod pagination;

pub use pagination::{PaginationItem, pagination_items};
