//! Random forest regression.
//!
//! Bagged [`DecisionTreeRegressor`]s: every tree is fitted on a bootstrap
//! sample drawn with its own seeded ChaCha generator, and the forest predicts
//! the mean of the tree predictions. Training is sequential, so a given seed
//! always produces the same forest.

mod tree;

pub use tree::{DecisionTreeRegressor, TreeNode};

use ndarray::{Array1, Array2, Axis};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from fitting or predicting with a tree model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForestError {
    #[error("shape mismatch: {rows} feature row(s) but {targets} target value(s)")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("training data contains non-finite values")]
    NonFinite,

    #[error("expected {expected} feature(s), got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("model has not been fitted")]
    NotFitted,
}

/// Random forest regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    /// Individual trees
    trees: Vec<DecisionTreeRegressor>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `random_state + i`
    pub random_state: u64,
    n_features: usize,
    feature_importances: Option<Vec<f64>>,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            random_state: 42,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self, ForestError> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(ForestError::ShapeMismatch {
                rows: n_samples,
                targets: y.len(),
            });
        }
        if n_samples == 0 || self.n_estimators == 0 {
            return Err(ForestError::EmptyTrainingSet);
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ForestError::NonFinite);
        }

        self.n_features = x.ncols();

        let mut trees = Vec::with_capacity(self.n_estimators);
        for tree_idx in 0..self.n_estimators {
            let mut tree = self.new_tree();

            if self.bootstrap {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let x_sample = x.select(Axis(0), &indices);
                let y_sample = y.select(Axis(0), &indices);
                tree.fit(&x_sample, &y_sample)?;
            } else {
                tree.fit(x, y)?;
            }

            trees.push(tree);
        }

        // Average the per-tree (already normalized) importances
        let mut importances = vec![0.0; self.n_features];
        for tree in &trees {
            if let Some(tree_importances) = tree.feature_importances() {
                for (total, imp) in importances.iter_mut().zip(tree_importances) {
                    *total += imp;
                }
            }
        }
        let n_trees = trees.len() as f64;
        for imp in &mut importances {
            *imp /= n_trees;
        }

        debug!(
            "Fitted {} trees on {} samples x {} features",
            trees.len(),
            n_samples,
            self.n_features
        );

        self.trees = trees;
        self.feature_importances = Some(importances);
        Ok(self)
    }

    fn new_tree(&self) -> DecisionTreeRegressor {
        let tree = DecisionTreeRegressor::new()
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);
        match self.max_depth {
            Some(depth) => tree.with_max_depth(depth),
            None => tree,
        }
    }

    /// Predict the mean of the tree predictions for each row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(ForestError::FeatureMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let mut sum = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            sum += &tree.predict(x)?;
        }
        Ok(sum / self.trees.len() as f64)
    }

    /// Feature importances averaged over the trees.
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }

    /// Fitted trees.
    pub fn trees(&self) -> &[DecisionTreeRegressor] {
        &self.trees
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
