//! Page window over a long option list.

/// Cut the page of `page_size` items that keeps `selected` roughly centred.
///
/// Returns the page and the index of the selected item within it. A
/// `page_size` of zero, or one covering the whole list, returns `items`
/// unchanged.
pub fn paginate<T>(items: &[T], selected: usize, page_size: usize) -> (&[T], usize) {
    if page_size == 0 || page_size >= items.len() {
        return (items, selected);
    }

    let selected = selected.min(items.len() - 1);
    let start = selected
        .saturating_sub(page_size / 2)
        .min(items.len() - page_size);
    (&items[start..start + page_size], selected - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_small_lists_are_untouched() {
        let items = numbers(3);
        assert_eq!(paginate(&items, 2, 7), (&items[..], 2));
        assert_eq!(paginate(&items, 1, 0), (&items[..], 1));
        assert_eq!(paginate(&items, 1, 3), (&items[..], 1));
    }

    #[test]
    fn test_window_is_centred_and_clamped() {
        let items = numbers(10);
        assert_eq!(paginate(&items, 0, 4), (&items[0..4], 0));
        assert_eq!(paginate(&items, 5, 4), (&items[3..7], 2));
        assert_eq!(paginate(&items, 9, 4), (&items[6..10], 3));
        assert_eq!(paginate(&items, 4, 5), (&items[2..7], 2));
    }

    #[test]
    fn test_selected_item_always_visible() {
        for len in 0..12 {
            let items = numbers(len);
            for page_size in 0..14 {
                for selected in 0..len {
                    let (page, idx) = paginate(&items, selected, page_size);
                    let expected_len = if page_size == 0 { len } else { page_size.min(len) };
                    assert_eq!(page.len(), expected_len);
                    assert_eq!(page[idx], items[selected]);
                }
            }
        }
    }
}
