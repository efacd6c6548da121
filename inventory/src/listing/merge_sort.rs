//! Top-down stable merge sort.

use std::cmp::Ordering;

/// Sort `items` in place with a stable top-down merge sort.
///
/// The slice is split at its midpoint, both halves are sorted, and the
/// halves are merged through a single auxiliary buffer the size of the
/// whole input. When `compare` returns `Equal` the element from the left
/// half is taken first, so ties keep their input order.
///
/// # Examples
///
/// ```
/// use inventory::listing::merge_sort_by;
///
/// let mut words = vec!["pear", "fig", "apple", "kiwi"];
/// merge_sort_by(&mut words, |a, b| a.len().cmp(&b.len()));
/// assert_eq!(words, vec!["fig", "pear", "kiwi", "apple"]);
/// ```
pub fn merge_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut aux = items.to_vec();
    sort_range(items, &mut aux, 0, len, &mut compare);
}

/// Sort `items[lo..hi]`. Recursion depth is `log2(n)`.
fn sort_range<T, F>(items: &mut [T], aux: &mut [T], lo: usize, hi: usize, compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if hi - lo < 2 {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    sort_range(items, aux, lo, mid, compare);
    sort_range(items, aux, mid, hi, compare);

    // Already in order.
    if compare(&items[mid - 1], &items[mid]) != Ordering::Greater {
        return;
    }
    merge(items, aux, lo, mid, hi, compare);
}

fn merge<T, F>(items: &mut [T], aux: &mut [T], lo: usize, mid: usize, hi: usize, compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    aux[lo..hi].clone_from_slice(&items[lo..hi]);

    let (mut left, mut right) = (lo, mid);
    for slot in &mut items[lo..hi] {
        let take_left = right >= hi
            || (left < mid && compare(&aux[left], &aux[right]) != Ordering::Greater);
        if take_left {
            slot.clone_from(&aux[left]);
            left += 1;
        } else {
            slot.clone_from(&aux[right]);
            right += 1;
        }
    }
}
