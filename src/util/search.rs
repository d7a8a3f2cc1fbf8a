use std::cmp::Ordering;

/// Binary search over a sorted slice.
///
/// `search(elem)` compares the value being looked for against `elem`:
/// [`Ordering::Less`] if it belongs to the left of `elem`,
/// [`Ordering::Greater`] if to the right, [`Ordering::Equal`] on a match.
///
/// Returns the index of a match. On a miss, returns the index where the
/// value could be inserted if `for_insertion` is set, otherwise `None`.
pub fn binary_search<T>(
    items: &[T],
    mut search: impl FnMut(&T) -> Ordering,
    for_insertion: bool,
) -> Option<usize> {
    let mut left = 0;
    let mut right = items.len();
    while left < right {
        let mid = left + (right - left) / 2;
        match search(&items[mid]) {
            Ordering::Less => right = mid,
            Ordering::Greater => left = mid + 1,
            Ordering::Equal => return Some(mid),
        }
    }
    for_insertion.then_some(right)
}
