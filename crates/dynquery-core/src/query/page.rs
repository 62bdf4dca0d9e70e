//! Paging.

use crate::proto::PageRequest;

/// Slice one page out of `items`.
///
/// Returns the page and the number of items before slicing. A page past
/// the end is empty but still reports the full count.
pub fn paginate<T>(items: Vec<T>, page: &PageRequest) -> (Vec<T>, usize) {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(page.skip())
        .take(page.take())
        .collect();
    (items, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_first_and_middle_pages() {
        assert_eq!(paginate(numbers(25), &PageRequest::new(1, 10)), (numbers(10), 25));
        assert_eq!(
            paginate(numbers(25), &PageRequest::new(2, 10)),
            ((11..=20).collect::<Vec<_>>(), 25)
        );
    }

    #[test]
    fn test_last_page_arithmetic() {
        // 25 items, page size 10: last page holds 25 mod 10
        let (items, total) = paginate(numbers(25), &PageRequest::new(3, 10));
        assert_eq!(items, vec![21, 22, 23, 24, 25]);
        assert_eq!(total, 25);

        // Exact multiple: last page is full
        let (items, _) = paginate(numbers(20), &PageRequest::new(2, 10));
        assert_eq!(items.len(), 10);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let (items, total) = paginate(numbers(25), &PageRequest::new(4, 10));
        assert!(items.is_empty());
        assert_eq!(total, 25);
    }

    #[test]
    fn test_out_of_range_input_does_not_panic() {
        let (items, total) = paginate(numbers(5), &PageRequest::new(u32::MAX, u32::MAX));
        assert!(items.is_empty());
        assert_eq!(total, 5);

        // Index 0 is not clamped here; it reads as the first page
        let (items, _) = paginate(numbers(5), &PageRequest::new(0, 2));
        assert_eq!(items, vec![1, 2]);

        let (items, _) = paginate(numbers(5), &PageRequest::new(1, 0));
        assert!(items.is_empty());
    }
}
