//! Frequency counting over categorical values.

use std::collections::BTreeMap;

/// Counts occurrences of each distinct value.
///
/// The returned map is ordered by value, so iteration order does not depend
/// on the order of the input.
///
/// # Examples
///
/// ```
/// use lifeboat_stats::frequency::value_counts;
///
/// let counts = value_counts(["S", "C", "S", "Q", "S"]);
/// assert_eq!(counts["S"], 3);
/// assert_eq!(counts.keys().copied().collect::<Vec<_>>(), ["C", "Q", "S"]);
/// ```
pub fn value_counts<I, T>(values: I) -> BTreeMap<T, usize>
where
    I: IntoIterator<Item = T>,
    T: Ord,
{
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Returns the most frequent value.
///
/// When several values share the highest count, the smallest of them wins.
/// Returns `None` for an empty input.
///
/// # Examples
///
/// ```
/// use lifeboat_stats::frequency::most_frequent;
///
/// assert_eq!(most_frequent(["male", "female", "male"]), Some("male"));
/// assert_eq!(most_frequent(["b", "a", "b", "a"]), Some("a"));
/// assert_eq!(most_frequent(Vec::<u8>::new()), None);
/// ```
pub fn most_frequent<I, T>(values: I) -> Option<T>
where
    I: IntoIterator<Item = T>,
    T: Ord,
{
    let mut best: Option<(T, usize)> = None;
    // BTreeMap iterates in ascending order, so keeping the first maximum keeps the smallest value
    for (value, count) in value_counts(values) {
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_counts_empty() {
        assert!(value_counts(Vec::<i32>::new()).is_empty());
    }

    #[test]
    fn test_most_frequent_prefers_smallest_on_tie() {
        assert_eq!(most_frequent([3, 1, 3, 1, 2]), Some(1));
    }

    #[test]
    fn test_most_frequent_owned_strings() {
        let values = ["Q", "S", "S"].map(String::from);
        assert_eq!(most_frequent(values), Some("S".to_owned()));
    }
}
