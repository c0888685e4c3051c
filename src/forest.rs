//! Multi-class random forest classifier.
//!
//! One [`RandomForestClassifier`] is a single prediction head: a fitted
//! decision function from a feature vector to a label code plus a full
//! probability distribution over the label vocabulary. Training uses
//! bootstrap sampling and per-split feature subsampling; every source of
//! randomness is derived from a fixed seed, so training is reproducible and
//! inference is fully deterministic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PaideiaError, Result};

/// Fixed-length ordered sequence of numeric features describing one input.
pub type FeatureVector = Vec<f64>;

/// Hyperparameters for one forest head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Seed for bootstrap and feature subsampling.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// A node in a classification tree. Leaf nodes carry a class distribution;
/// internal nodes carry a split.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeNode {
    /// Feature index for the split (-1 for leaf).
    feature_idx: i32,
    /// Threshold value for the split.
    threshold: f64,
    /// Class probability distribution (leaf nodes only).
    distribution: Vec<f64>,
    /// Left child (feature value <= threshold).
    left: Option<Box<TreeNode>>,
    /// Right child (feature value > threshold).
    right: Option<Box<TreeNode>>,
}

/// A single CART classification tree fitted with gini impurity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<Box<TreeNode>>,
    n_classes: usize,
}

impl DecisionTree {
    /// Fit a tree on the rows of `x` selected by `indices`.
    fn fit(
        x: &[FeatureVector],
        y: &[usize],
        indices: &[usize],
        n_classes: usize,
        config: &ForestConfig,
        rng: &mut StdRng,
    ) -> Self {
        let root = Self::build_node(x, y, indices, n_classes, 0, config, rng);
        Self { root, n_classes }
    }

    /// Class probability distribution for one feature vector.
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        match &self.root {
            Some(root) => {
                let mut node = root;
                loop {
                    if node.feature_idx < 0 {
                        return node.distribution.clone();
                    }
                    let value = features[node.feature_idx as usize];
                    let child = if value <= node.threshold {
                        &node.left
                    } else {
                        &node.right
                    };
                    match child {
                        Some(next) => node = next,
                        None => return node.distribution.clone(),
                    }
                }
            }
            None => vec![0.0; self.n_classes],
        }
    }

    fn build_node(
        x: &[FeatureVector],
        y: &[usize],
        indices: &[usize],
        n_classes: usize,
        depth: usize,
        config: &ForestConfig,
        rng: &mut StdRng,
    ) -> Option<Box<TreeNode>> {
        if indices.is_empty() {
            return None;
        }

        let counts = class_counts(y, indices, n_classes);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if is_pure || depth >= config.max_depth || indices.len() < config.min_samples_split {
            return Some(Box::new(Self::leaf(counts)));
        }

        match Self::find_best_split(x, y, indices, n_classes, rng) {
            Some((feature_idx, threshold, left_indices, right_indices)) => {
                let left =
                    Self::build_node(x, y, &left_indices, n_classes, depth + 1, config, rng);
                let right =
                    Self::build_node(x, y, &right_indices, n_classes, depth + 1, config, rng);

                Some(Box::new(TreeNode {
                    feature_idx: feature_idx as i32,
                    threshold,
                    distribution: Vec::new(),
                    left,
                    right,
                }))
            }
            None => Some(Box::new(Self::leaf(counts))),
        }
    }

    fn leaf(counts: Vec<usize>) -> TreeNode {
        let total: usize = counts.iter().sum();
        let distribution = if total == 0 {
            vec![0.0; counts.len()]
        } else {
            counts
                .iter()
                .map(|&c| c as f64 / total as f64)
                .collect()
        };

        TreeNode {
            feature_idx: -1,
            threshold: 0.0,
            distribution,
            left: None,
            right: None,
        }
    }

    /// Find the split minimizing weighted gini impurity over a random
    /// subset of sqrt(n_features) features.
    fn find_best_split(
        x: &[FeatureVector],
        y: &[usize],
        indices: &[usize],
        n_classes: usize,
        rng: &mut StdRng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let n_features = x[indices[0]].len();
        let n_candidates = (n_features as f64).sqrt().ceil().max(1.0) as usize;
        let candidates = sample_features(n_features, n_candidates, rng);

        let parent_impurity = gini(&class_counts(y, indices, n_classes), indices.len());

        let mut best_gain = 0.0;
        let mut best: Option<(usize, f64, usize)> = None;
        let mut sorted: Vec<usize> = Vec::with_capacity(indices.len());

        for &feature_idx in &candidates {
            sorted.clear();
            sorted.extend_from_slice(indices);
            sorted.sort_by(|&a, &b| x[a][feature_idx].total_cmp(&x[b][feature_idx]));

            // Sweep split positions left to right, keeping incremental
            // class counts on each side.
            let mut left_counts = vec![0usize; n_classes];
            let mut right_counts = class_counts(y, &sorted, n_classes);

            for pos in 1..sorted.len() {
                let moved = sorted[pos - 1];
                left_counts[y[moved]] += 1;
                right_counts[y[moved]] -= 1;

                let prev = x[sorted[pos - 1]][feature_idx];
                let curr = x[sorted[pos]][feature_idx];
                if prev == curr {
                    continue;
                }

                let left_impurity = gini(&left_counts, pos);
                let right_impurity = gini(&right_counts, sorted.len() - pos);
                let weighted = (pos as f64 * left_impurity
                    + (sorted.len() - pos) as f64 * right_impurity)
                    / sorted.len() as f64;
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, (prev + curr) / 2.0, pos));
                }
            }
        }

        best.map(|(feature_idx, threshold, _)| {
            let mut left_indices = Vec::new();
            let mut right_indices = Vec::new();
            for &i in indices {
                if x[i][feature_idx] <= threshold {
                    left_indices.push(i);
                } else {
                    right_indices.push(i);
                }
            }
            (feature_idx, threshold, left_indices, right_indices)
        })
    }
}

/// Random forest classifier for one output attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTree>,
    n_classes: usize,
    n_features: usize,
    config: ForestConfig,
}

impl RandomForestClassifier {
    /// Create an unfit classifier with the given hyperparameters.
    pub fn new(config: ForestConfig) -> Self {
        Self {
            trees: Vec::new(),
            n_classes: 0,
            n_features: 0,
            config,
        }
    }

    /// Train the forest on feature vectors `x` with label codes `y` drawn
    /// from a vocabulary of `n_classes` labels.
    pub fn fit(&mut self, x: &[FeatureVector], y: &[usize], n_classes: usize) -> Result<()> {
        if x.is_empty() {
            return Err(PaideiaError::invalid_input("training set is empty"));
        }
        if x.len() != y.len() {
            return Err(PaideiaError::invalid_input(format!(
                "feature rows ({}) do not match label rows ({})",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(PaideiaError::invalid_input("feature vectors are empty"));
        }
        if x.iter().any(|row| row.len() != n_features) {
            return Err(PaideiaError::invalid_input(
                "feature vectors have inconsistent lengths",
            ));
        }
        if let Some(&code) = y.iter().find(|&&code| code >= n_classes) {
            return Err(PaideiaError::internal(format!(
                "label code {code} exceeds vocabulary size {n_classes}"
            )));
        }

        let seed = self.config.seed;
        let config = self.config.clone();

        // Each tree derives its own rng from the base seed, so the result
        // does not depend on thread scheduling.
        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let bootstrap: Vec<usize> =
                    (0..x.len()).map(|_| rng.random_range(0..x.len())).collect();
                DecisionTree::fit(x, y, &bootstrap, n_classes, &config, &mut rng)
            })
            .collect();

        self.trees = trees;
        self.n_classes = n_classes;
        self.n_features = n_features;
        Ok(())
    }

    /// Mean class probability distribution across all trees.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        if !self.is_trained() {
            return Err(PaideiaError::not_trained(
                "classifier has not been fitted".to_string(),
            ));
        }
        if features.len() != self.n_features {
            return Err(PaideiaError::invalid_input(format!(
                "feature vector length {} does not match trained length {}",
                features.len(),
                self.n_features
            )));
        }

        let mut distribution = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (slot, p) in distribution.iter_mut().zip(tree.predict_proba(features)) {
                *slot += p;
            }
        }
        for p in &mut distribution {
            *p /= self.trees.len() as f64;
        }
        Ok(distribution)
    }

    /// Predicted label code plus the full class distribution. Ties break
    /// toward the lower code.
    pub fn predict(&self, features: &[f64]) -> Result<(usize, Vec<f64>)> {
        let distribution = self.predict_proba(features)?;
        let mut best = 0;
        for (code, &p) in distribution.iter().enumerate() {
            if p > distribution[best] {
                best = code;
            }
        }
        Ok((best, distribution))
    }

    /// Whether the forest has been fitted.
    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Number of classes this forest predicts over.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Feature vector length the forest was trained on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Pick `k` distinct feature indices via a partial Fisher-Yates shuffle.
fn sample_features(n_features: usize, k: usize, rng: &mut StdRng) -> Vec<usize> {
    let k = k.min(n_features);
    let mut features: Vec<usize> = (0..n_features).collect();
    for i in 0..k {
        let j = rng.random_range(i..n_features);
        features.swap(i, j);
    }
    features.truncate(k);
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 12,
            max_depth: 8,
            min_samples_split: 2,
            seed: 42,
        }
    }

    /// Two well-separated clusters in two dimensions.
    fn separable_data() -> (Vec<FeatureVector>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let offset = i as f64 / 100.0;
            x.push(vec![0.1 + offset, 0.2]);
            y.push(0);
            x.push(vec![0.9 - offset, 0.8]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_fit_and_predict_separable_classes() {
        let (x, y) = separable_data();
        let mut forest = RandomForestClassifier::new(small_config());
        forest.fit(&x, &y, 2).unwrap();

        let (code, distribution) = forest.predict(&[0.1, 0.2]).unwrap();
        assert_eq!(code, 0);
        assert!(distribution[0] > 0.8);

        let (code, _) = forest.predict(&[0.9, 0.8]).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let (x, y) = separable_data();
        let mut forest = RandomForestClassifier::new(small_config());
        forest.fit(&x, &y, 2).unwrap();

        let distribution = forest.predict_proba(&[0.5, 0.5]).unwrap();
        let sum: f64 = distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_untrained_prediction_fails() {
        let forest = RandomForestClassifier::new(small_config());
        let err = forest.predict_proba(&[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, PaideiaError::ModelNotTrained(_)));
    }

    #[test]
    fn test_feature_length_mismatch_rejected() {
        let (x, y) = separable_data();
        let mut forest = RandomForestClassifier::new(small_config());
        forest.fit(&x, &y, 2).unwrap();

        let err = forest.predict_proba(&[0.5]).unwrap_err();
        assert!(matches!(err, PaideiaError::InvalidInput(_)));
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let (x, _) = separable_data();
        let mut forest = RandomForestClassifier::new(small_config());
        let err = forest.fit(&x, &[0, 1], 2).unwrap_err();
        assert!(matches!(err, PaideiaError::InvalidInput(_)));
    }

    #[test]
    fn test_training_is_reproducible() {
        let (x, y) = separable_data();

        let mut a = RandomForestClassifier::new(small_config());
        a.fit(&x, &y, 2).unwrap();
        let mut b = RandomForestClassifier::new(small_config());
        b.fit(&x, &y, 2).unwrap();

        let probe = [0.4, 0.6];
        assert_eq!(
            a.predict_proba(&probe).unwrap(),
            b.predict_proba(&probe).unwrap()
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (x, y) = separable_data();
        let mut forest = RandomForestClassifier::new(small_config());
        forest.fit(&x, &y, 2).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForestClassifier = serde_json::from_str(&json).unwrap();

        let probe = [0.3, 0.4];
        assert_eq!(
            forest.predict(&probe).unwrap(),
            restored.predict(&probe).unwrap()
        );
    }
}
