//! Random forest of CART decision trees.
//!
//! Each tree is grown on a bootstrap sample of the training rows. A node is
//! split on the feature and threshold that minimize the weighted Gini
//! impurity of its children, considering a random subset of the features at
//! every node. Trees are grown until their leaves are pure, too small to
//! split, or the optional depth limit is reached.
//!
//! The forest probability is the mean of the leaf probabilities the trees
//! return for a feature vector.
//!
//! Training is deterministic for a given [`ForestParams::seed`]: per-tree
//! seeds are drawn sequentially from one generator before the trees are grown
//! in parallel.

use std::{num::NonZeroUsize, thread};

use rand::{Rng, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{FitError, pipeline::FeatureVector};

/// Number of features examined when searching a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(width))`, at least one
    Sqrt,
    /// Every feature
    All,
    /// A fixed number of features, capped at the width
    Count(usize),
}

impl MaxFeatures {
    #[must_use]
    pub fn resolve(self, width: usize) -> usize {
        let count = match self {
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            Self::Sqrt => (width as f64).sqrt().floor() as usize,
            Self::All => width,
            Self::Count(count) => count.min(width),
        };
        count.max(1)
    }
}

/// Growth parameters of a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth of the tree, unlimited when `None`
    pub max_depth: Option<usize>,
    /// Minimum number of samples a node needs to be split
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

/// Training parameters of the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub tree_count: usize,
    pub seed: u64,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            tree_count: 100,
            seed: 42,
            tree: TreeParams::default(),
        }
    }
}

/// Tree node; children are stored after their parent in [`DecisionTree::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Samples with `features[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Fraction of survivors among the training samples reaching this node
    Leaf { probability: f64, samples: usize },
}

/// A fitted CART classification tree. The root is the first node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct TrainingData<'a> {
    features: &'a [FeatureVector],
    labels: &'a [bool],
    width: usize,
    params: &'a TreeParams,
}

impl TrainingData<'_> {
    fn value(&self, sample: usize, feature: usize) -> f64 {
        self.features[sample].as_slice()[feature]
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    fn grow(data: &TrainingData<'_>, samples: &mut [usize], rng: &mut Pcg32) -> Self {
        let mut tree = Self { nodes: vec![] };
        tree.grow_node(data, samples, 0, rng);
        tree
    }

    fn grow_node(
        &mut self,
        data: &TrainingData<'_>,
        samples: &mut [usize],
        depth: usize,
        rng: &mut Pcg32,
    ) -> usize {
        let index = self.nodes.len();
        let positives = samples.iter().filter(|&&i| data.labels[i]).count();
        #[expect(clippy::cast_precision_loss)]
        let leaf = Node::Leaf {
            probability: positives as f64 / samples.len() as f64,
            samples: samples.len(),
        };
        self.nodes.push(leaf);

        let pure = positives == 0 || positives == samples.len();
        let too_small = samples.len() < data.params.min_samples_split;
        let too_deep = data.params.max_depth.is_some_and(|max| depth >= max);
        if pure || too_small || too_deep {
            return index;
        }
        let Some(split) = best_split(data, samples, rng) else {
            return index;
        };

        let mut mid = 0;
        for k in 0..samples.len() {
            if data.value(samples[k], split.feature) <= split.threshold {
                samples.swap(mid, k);
                mid += 1;
            }
        }
        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.grow_node(data, left_samples, depth + 1, rng);
        let right = self.grow_node(data, right_samples, depth + 1, rng);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    /// Survival probability of the leaf reached by `features`.
    #[must_use]
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => index = if features[feature] <= threshold { left } else { right },
                Node::Leaf { probability, .. } => return probability,
            }
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_owned());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= width {
                        return Err(format!(
                            "node {index} splits on feature {feature}, but the width is {width}"
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {index} has a NaN threshold"));
                    }
                    for child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
                Node::Leaf { probability, .. } => {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(format!(
                            "node {index} has probability {probability} outside [0, 1]"
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Finds the lowest-impurity split over a random subset of the features.
///
/// Features are visited in random order. At least `max_features` features are
/// examined; when none of them admits a split, the search continues with the
/// remaining features until one does.
fn best_split(
    data: &TrainingData<'_>,
    samples: &[usize],
    rng: &mut Pcg32,
) -> Option<SplitCandidate> {
    let max_features = data.params.max_features.resolve(data.width);
    let mut order = (0..data.width).collect::<Vec<_>>();
    order.shuffle(rng);

    let mut best: Option<SplitCandidate> = None;
    let mut column = Vec::with_capacity(samples.len());
    for (visited, &feature) in order.iter().enumerate() {
        if visited >= max_features && best.is_some() {
            break;
        }
        column.clear();
        column.extend(
            samples
                .iter()
                .map(|&i| (data.value(i, feature), data.labels[i])),
        );
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        if let Some(candidate) = best_threshold(feature, &column)
            && best.is_none_or(|b| candidate.impurity < b.impurity)
        {
            best = Some(candidate);
        }
    }
    best
}

/// Sweeps the sorted `(value, label)` pairs of one feature for its best threshold.
fn best_threshold(feature: usize, column: &[(f64, bool)]) -> Option<SplitCandidate> {
    let total = column.len();
    let total_positives = column.iter().filter(|(_, label)| *label).count();

    let mut best: Option<SplitCandidate> = None;
    let mut left_positives = 0;
    for (k, pair) in column.windows(2).enumerate() {
        let [(value, label), (next_value, _)] = [pair[0], pair[1]];
        if label {
            left_positives += 1;
        }
        if value >= next_value {
            continue;
        }
        let left_total = k + 1;
        let impurity = weighted_gini(left_positives, left_total)
            + weighted_gini(total_positives - left_positives, total - left_total);
        if best.is_none_or(|b| impurity < b.impurity) {
            let mut threshold = f64::midpoint(value, next_value);
            if threshold >= next_value {
                threshold = value;
            }
            best = Some(SplitCandidate {
                feature,
                threshold,
                impurity,
            });
        }
    }
    best
}

/// Gini impurity of a node multiplied by its sample count.
#[expect(clippy::cast_precision_loss)]
fn weighted_gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let positives = positives as f64;
    let negatives = total as f64 - positives;
    2.0 * positives * negatives / total as f64
}

/// An ensemble of decision trees voting by averaged probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Width of the feature vectors the forest was trained on
    width: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits a forest on feature vectors and their survival labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the training set is empty, the label count does not
    /// match, the feature vectors differ in width, or `tree_count` is zero.
    pub fn fit(
        features: &[FeatureVector],
        labels: &[bool],
        params: &ForestParams,
    ) -> Result<Self, FitError> {
        if features.is_empty() {
            return Err(FitError::EmptyTrainingSet);
        }
        if features.len() != labels.len() {
            return Err(FitError::LabelCountMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }
        if params.tree_count == 0 {
            return Err(FitError::NoTrees);
        }
        let width = features[0].len();
        if let Some(row) = features.iter().find(|row| row.len() != width) {
            return Err(FitError::InconsistentFeatureWidth {
                expected: width,
                found: row.len(),
            });
        }

        let mut master = Pcg32::seed_from_u64(params.seed);
        let seeds = (0..params.tree_count)
            .map(|_| master.random::<u64>())
            .collect::<Vec<_>>();

        let data = TrainingData {
            features,
            labels,
            width,
            params: &params.tree,
        };
        let threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let chunk_size = seeds.len().div_ceil(threads);
        let trees = thread::scope(|s| {
            let handles = seeds
                .chunks(chunk_size)
                .map(|seeds| {
                    let data = &data;
                    s.spawn(move || {
                        seeds
                            .iter()
                            .map(|&seed| fit_bootstrap_tree(data, seed))
                            .collect::<Vec<_>>()
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("tree fitting thread panicked"))
                .collect::<Vec<_>>()
        });

        Ok(Self { width, trees })
    }

    /// Mean survival probability over all trees.
    #[must_use]
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.width);
        let sum = self
            .trees
            .iter()
            .map(|tree| tree.predict_proba(features))
            .sum::<f64>();
        #[expect(clippy::cast_precision_loss)]
        let count = self.trees.len() as f64;
        sum / count
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Checks the structure of a deserialized forest.
    ///
    /// # Errors
    ///
    /// Returns a description of the first structural problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_owned());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.width)
                .map_err(|reason| format!("tree {i}: {reason}"))?;
        }
        Ok(())
    }
}

fn fit_bootstrap_tree(data: &TrainingData<'_>, seed: u64) -> DecisionTree {
    let mut rng = Pcg32::seed_from_u64(seed);
    let n = data.features.len();
    let mut samples = (0..n).map(|_| rng.random_range(0..n)).collect::<Vec<_>>();
    DecisionTree::grow(data, &mut samples, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors(rows: &[&[f64]]) -> Vec<FeatureVector> {
        rows.iter().map(|row| FeatureVector::from(row.to_vec())).collect()
    }

    fn single_tree(
        features: &[FeatureVector],
        labels: &[bool],
        params: &TreeParams,
    ) -> DecisionTree {
        let data = TrainingData {
            features,
            labels,
            width: features[0].len(),
            params,
        };
        let mut samples = (0..features.len()).collect::<Vec<_>>();
        DecisionTree::grow(&data, &mut samples, &mut Pcg32::seed_from_u64(0))
    }

    #[test]
    fn test_tree_separates_threshold() {
        let features = vectors(&[&[1.0], &[2.0], &[3.0], &[4.0]]);
        let labels = [false, false, true, true];
        let tree = single_tree(&features, &labels, &TreeParams::default());

        assert_eq!(
            tree.nodes()[0],
            Node::Split {
                feature: 0,
                threshold: 2.5,
                left: 1,
                right: 2,
            }
        );
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.predict_proba(&[0.0]), 0.0);
        assert_eq!(tree.predict_proba(&[2.5]), 0.0);
        assert_eq!(tree.predict_proba(&[3.5]), 1.0);
    }

    #[test]
    fn test_constant_features_are_skipped() {
        // with max_features = 1 the search must move past the constant feature
        let features = vectors(&[&[5.0, 1.0], &[5.0, 2.0], &[5.0, 3.0], &[5.0, 4.0]]);
        let labels = [false, false, true, true];
        let params = TreeParams {
            max_features: MaxFeatures::Count(1),
            ..TreeParams::default()
        };
        let tree = single_tree(&features, &labels, &params);
        assert!(matches!(tree.nodes()[0], Node::Split { feature: 1, .. }));
        assert_eq!(tree.predict_proba(&[5.0, 4.0]), 1.0);
    }

    #[test]
    fn test_unsplittable_node_becomes_mixed_leaf() {
        let features = vectors(&[&[1.0], &[1.0], &[1.0], &[1.0]]);
        let labels = [false, true, true, true];
        let tree = single_tree(&features, &labels, &TreeParams::default());
        assert_eq!(
            tree.nodes(),
            [Node::Leaf {
                probability: 0.75,
                samples: 4,
            }]
        );
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let features = vectors(&[&[1.0], &[2.0], &[3.0], &[4.0]]);
        let labels = [false, true, false, true];
        let params = TreeParams {
            max_depth: Some(0),
            ..TreeParams::default()
        };
        let tree = single_tree(&features, &labels, &params);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict_proba(&[1.0]), 0.5);
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(12), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::All.resolve(12), 12);
        assert_eq!(MaxFeatures::Count(20).resolve(12), 12);
        assert_eq!(MaxFeatures::Count(0).resolve(12), 1);
    }

    #[test]
    fn test_forest_is_deterministic_for_seed() {
        let features = vectors(&[
            &[1.0, 0.0],
            &[2.0, 1.0],
            &[3.0, 0.0],
            &[4.0, 1.0],
            &[5.0, 0.0],
            &[6.0, 1.0],
        ]);
        let labels = [false, false, true, false, true, true];
        let params = ForestParams {
            tree_count: 10,
            ..ForestParams::default()
        };
        let a = RandomForest::fit(&features, &labels, &params).unwrap();
        let b = RandomForest::fit(&features, &labels, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trees().len(), 10);
        assert_eq!(a.width(), 2);
        a.validate().unwrap();

        for row in &features {
            let p = a.predict_proba(row.as_slice());
            assert!((0.0..=1.0).contains(&p));
            assert_eq!(p.to_bits(), b.predict_proba(row.as_slice()).to_bits());
        }
    }

    #[test]
    fn test_forest_fit_errors() {
        let features = vectors(&[&[1.0], &[2.0]]);
        assert!(matches!(
            RandomForest::fit(&[], &[], &ForestParams::default()),
            Err(FitError::EmptyTrainingSet)
        ));
        assert!(matches!(
            RandomForest::fit(&features, &[true], &ForestParams::default()),
            Err(FitError::LabelCountMismatch {
                features: 2,
                labels: 1
            })
        ));
        let params = ForestParams {
            tree_count: 0,
            ..ForestParams::default()
        };
        assert!(matches!(
            RandomForest::fit(&features, &[true, false], &params),
            Err(FitError::NoTrees)
        ));
        let ragged = vectors(&[&[1.0], &[2.0, 3.0]]);
        assert!(matches!(
            RandomForest::fit(&ragged, &[true, false], &ForestParams::default()),
            Err(FitError::InconsistentFeatureWidth {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_validate_rejects_broken_structure() {
        let forest = RandomForest {
            width: 1,
            trees: vec![DecisionTree {
                nodes: vec![Node::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 0,
                    right: 5,
                }],
            }],
        };
        assert!(forest.validate().is_err());

        let forest = RandomForest {
            width: 1,
            trees: vec![],
        };
        assert!(forest.validate().is_err());
    }
}
