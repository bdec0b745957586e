//! Seeded train/test partitioning of row indices.

use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits `0..len` into shuffled train and test indices.
///
/// The test partition receives the first `ceil(len * test_ratio)` shuffled
/// indices and the train partition receives the rest. The same `len`,
/// `test_ratio` and `seed` always produce the same partition.
///
/// # Example
///
/// ```
/// use lifeboat_model::split::train_test_split;
///
/// let split = train_test_split(10, 0.2, 42);
/// assert_eq!(split.test.len(), 2);
/// assert_eq!(split.train.len(), 8);
/// ```
#[must_use]
pub fn train_test_split(len: usize, test_ratio: f64, seed: u64) -> TrainTestSplit {
    let mut indices = (0..len).collect::<Vec<_>>();
    indices.shuffle(&mut Pcg32::seed_from_u64(seed));

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let test_len = ((len as f64 * test_ratio.clamp(0.0, 1.0)).ceil() as usize).min(len);
    let train = indices.split_off(test_len);
    TrainTestSplit {
        train,
        test: indices,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_partition_covers_all_indices_once() {
        let split = train_test_split(891, 0.2, 42);
        assert_eq!(split.test.len(), 179);
        assert_eq!(split.train.len(), 712);

        let all = split
            .train
            .iter()
            .chain(&split.test)
            .copied()
            .collect::<BTreeSet<_>>();
        assert_eq!(all, (0..891).collect());
    }

    #[test]
    fn test_same_seed_same_partition() {
        assert_eq!(train_test_split(100, 0.2, 7), train_test_split(100, 0.2, 7));
        assert_ne!(train_test_split(100, 0.2, 7), train_test_split(100, 0.2, 8));
    }

    #[test]
    fn test_degenerate_ratios() {
        let split = train_test_split(5, 0.0, 1);
        assert!(split.test.is_empty());
        assert_eq!(split.train.len(), 5);

        let split = train_test_split(5, 1.0, 1);
        assert!(split.train.is_empty());

        let split = train_test_split(0, 0.2, 1);
        assert!(split.train.is_empty() && split.test.is_empty());
    }
}
