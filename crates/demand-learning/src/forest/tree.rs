//! Regression tree.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::ForestError;

/// Splits must reduce the squared error by more than this.
const MIN_GAIN: f64 = 1e-12;

/// Decision tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Running sums for the squared-error criterion.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    count: usize,
    sum: f64,
    sq_sum: f64,
}

impl Moments {
    fn push(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.sq_sum += v * v;
    }

    fn minus(&self, other: &Moments) -> Moments {
        Moments {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sq_sum: self.sq_sum - other.sq_sum,
        }
    }

    /// Variance, i.e. the mean squared error around the mean.
    fn impurity(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        (self.sq_sum / n - (self.sum / n).powi(2)).max(0.0)
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Regression tree with the squared-error criterion.
///
/// Every feature is considered at every split; thresholds are midpoints
/// between consecutive distinct feature values. Leaves predict the mean
/// target of their samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    root: Option<TreeNode>,
    /// Maximum depth (root is depth 0)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    n_features: usize,
    feature_importances: Option<Vec<f64>>,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
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
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self, ForestError> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(ForestError::ShapeMismatch {
                rows: n_samples,
                targets: y.len(),
            });
        }
        if n_samples == 0 {
            return Err(ForestError::EmptyTrainingSet);
        }

        self.n_features = n_features;

        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut importances));

        // Normalize feature importances
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(importances);

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let mut moments = Moments::default();
        for &i in indices {
            moments.push(y[i]);
        }

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_pure(y, indices);

        if should_stop {
            return TreeNode::Leaf {
                value: moments.mean(),
                n_samples,
            };
        }

        let Some((feature_idx, threshold, gain)) = self.find_best_split(x, y, indices, &moments)
        else {
            return TreeNode::Leaf {
                value: moments.mean(),
                n_samples,
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        importances[feature_idx] += n_samples as f64 * gain;

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity: moments.impurity(),
        }
    }

    /// Best `(feature, threshold, gain)` over all features, scanning each
    /// feature in sorted order with running sums. Ties keep the first
    /// feature and the lowest threshold.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent: &Moments,
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len() as f64;
        let parent_impurity = parent.impurity();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature_idx in 0..x.ncols() {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| x[[a, feature_idx]].total_cmp(&x[[b, feature_idx]]));

            let mut left = Moments::default();
            for pos in 0..order.len() - 1 {
                left.push(y[order[pos]]);

                let current = x[[order[pos], feature_idx]];
                let next = x[[order[pos + 1], feature_idx]];
                if current == next {
                    continue;
                }

                let right = parent.minus(&left);
                if left.count < self.min_samples_leaf || right.count < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left.count as f64 * left.impurity()
                    + right.count as f64 * right.impurity())
                    / n;
                let gain = parent_impurity - weighted;

                if gain > MIN_GAIN && best.is_none_or(|(_, _, best_gain)| gain > best_gain) {
                    let mid = (current + next) / 2.0;
                    // adjacent floats: the midpoint may round up to `next`
                    let threshold = if mid < next { mid } else { current };
                    best = Some((feature_idx, threshold, gain));
                }
            }
        }

        best
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ForestError> {
        let root = self.root.as_ref().ok_or(ForestError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(ForestError::FeatureMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| predict_sample(root, row))
            .collect())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }

    /// Get tree depth (a single leaf has depth 0)
    pub fn get_depth(&self) -> usize {
        self.root.as_ref().map_or(0, node_depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, count_leaves)
    }
}

fn is_pure(y: &Array1<f64>, indices: &[usize]) -> bool {
    let Some(&first) = indices.first() else {
        return true;
    };
    indices.iter().all(|&i| (y[i] - y[first]).abs() < 1e-10)
}

fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
    let mut node = node;
    loop {
        match node {
            TreeNode::Leaf { value, .. } => return *value,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                node = if sample[*feature_idx] <= *threshold {
                    left
                } else {
                    right
                };
            }
        }
    }
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 0,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

fn count_leaves(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => count_leaves(left) + count_leaves(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regressor_fits_step_function_exactly() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![10.0, 10.0, 10.0, 20.0, 20.0, 20.0];

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.get_depth(), 1);
        assert_eq!(tree.get_n_leaves(), 2);
        // midpoint between 3 and 4
        assert!(matches!(
            tree.root,
            Some(TreeNode::Split { threshold, .. }) if threshold == 3.5
        ));
    }

    #[test]
    fn test_regressor_simple() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        let mse: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;

        assert!(mse < 1e-12, "MSE too high: {}", mse);
    }

    #[test]
    fn test_max_depth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 5.0, 2.0, 8.0, 3.0, 9.0, 4.0, 7.0];

        let mut tree = DecisionTreeRegressor::new().with_max_depth(2);
        tree.fit(&x, &y).unwrap();

        assert!(tree.get_depth() <= 2);
        assert!(tree.get_n_leaves() <= 4);
    }

    #[test]
    fn test_min_samples_leaf() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 0.0, 0.0, 100.0];

        let mut tree = DecisionTreeRegressor::new().with_min_samples_leaf(2);
        tree.fit(&x, &y).unwrap();

        // the outlier cannot sit in a leaf of its own
        let predictions = tree.predict(&array![[4.0]]).unwrap();
        assert_eq!(predictions[0], 50.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let y = array![7.0, 7.0, 7.0];

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.get_n_leaves(), 1);
        assert_eq!(tree.predict(&array![[100.0, 100.0]]).unwrap()[0], 7.0);
    }

    #[test]
    fn test_feature_importances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert_eq!(importances, &[1.0, 0.0]);
    }

    #[test]
    fn test_errors() {
        let tree = DecisionTreeRegressor::new();
        assert_eq!(tree.predict(&array![[1.0]]), Err(ForestError::NotFitted));

        let mut tree = DecisionTreeRegressor::new();
        let err = tree.fit(&array![[1.0], [2.0]], &array![1.0]).unwrap_err();
        assert_eq!(
            err,
            ForestError::ShapeMismatch {
                rows: 2,
                targets: 1
            }
        );

        tree.fit(&array![[1.0], [2.0]], &array![1.0, 2.0]).unwrap();
        assert!(matches!(
            tree.predict(&array![[1.0, 2.0]]),
            Err(ForestError::FeatureMismatch { .. })
        ));
    }
}
