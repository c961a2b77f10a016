use std::collections::BTreeSet;

use serde::Serialize;

/// One button (or gap) in a pagination bar.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(tag = "type", content = "page", rename_all = "camelCase")]
pub enum PaginationItem {
    /// Goes to the given page.
    Previous(usize),
    Page { number: usize, active: bool },
    /// Pages are skipped here.
    Separator,
    Next(usize),
}

impl PaginationItem {
    /// The page this item navigates to, if any.
    pub fn target(self) -> Option<usize> {
        match self {
            Self::Previous(page) | Self::Next(page) | Self::Page { number: page, .. } => Some(page),
            Self::Separator => None,
        }
    }
}

/// Lays out a pagination bar.
///
/// Page 1 and the last page are always shown, plus `surround_current` pages
/// on each side of `current`. A separator marks every gap between shown
/// pages. Previous is left out on the first page and Next on the last.
/// Out-of-range input yields no items.
pub fn pagination_items(
    current: usize,
    page_count: usize,
    surround_current: usize,
) -> Vec<PaginationItem> {
    if current == 0 || page_count == 0 || current > page_count {
        return Vec::new();
    }

    let mut pages = BTreeSet::from([1, page_count]);
    let start = current.saturating_sub(surround_current).max(1);
    let end = current.saturating_add(surround_current).min(page_count);
    pages.extend(start..=end);

    let mut items = Vec::with_capacity(pages.len() * 2 + 2);
    if current > 1 {
        items.push(PaginationItem::Previous(current - 1));
    }
    let mut previous: Option<usize> = None;
    for page in pages {
        if previous.is_some_and(|prev| page > prev + 1) {
            items.push(PaginationItem::Separator);
        }
        items.push(PaginationItem::Page {
            number: page,
            active: page == current,
        });
        previous = Some(page);
    }
    if current < page_count {
        items.push(PaginationItem::Next(current + 1));
    }
    items
}
