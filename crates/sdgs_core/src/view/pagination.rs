//! Pagination controller helpers.
//!
//! # Invariants
//! - `page` never returns more than `page_size` items and never indexes past
//!   the end of its input.
//! - "next" is enabled only when `(page_index + 1) * page_size < len`.
//! - `clamp_page_index` maps any index back onto an existing page (or 0 for
//!   an empty set).

/// Slice `[page_index * page_size, page_index * page_size + page_size)`
/// clamped to the bounds of `items`.
pub fn page<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page_index.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages for `len` items; 0 for an empty set.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

pub fn has_previous(page_index: usize) -> bool {
    page_index > 0
}

pub fn has_next(page_index: usize, page_size: usize, len: usize) -> bool {
    page_index
        .saturating_add(1)
        .saturating_mul(page_size)
        < len
}

/// Pulls `page_index` back into `[0, page_count)` after the set shrank.
pub fn clamp_page_index(page_index: usize, page_size: usize, len: usize) -> usize {
    match page_count(len, page_size) {
        0 => 0,
        pages => page_index.min(pages - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_page_index, has_next, has_previous, page, page_count};

    #[test]
    fn page_is_bounded_by_size_and_input() {
        let items: Vec<u32> = (0..40).collect();
        for page_size in 1..=17 {
            for page_index in 0..50 {
                let slice = page(&items, page_index, page_size);
                assert!(slice.len() <= page_size);
                if let Some(first) = slice.first() {
                    assert_eq!(*first as usize, page_index * page_size);
                }
            }
        }
    }

    #[test]
    fn page_past_end_is_empty_not_a_panic() {
        let items = [1, 2, 3];
        assert!(page(&items, 9, 2).is_empty());
        assert!(page(&items, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn exact_multiple_does_not_enable_next_onto_empty_page() {
        assert!(has_next(0, 15, 16));
        assert!(!has_next(0, 15, 15));
        assert!(!has_next(1, 15, 30));
        assert!(!has_previous(0));
        assert!(has_previous(1));
    }

    #[test]
    fn clamp_handles_shrink_and_empty() {
        assert_eq!(page_count(0, 15), 0);
        assert_eq!(page_count(31, 15), 3);
        assert_eq!(clamp_page_index(5, 15, 31), 2);
        assert_eq!(clamp_page_index(1, 15, 31), 1);
        assert_eq!(clamp_page_index(3, 15, 0), 0);
    }
}
