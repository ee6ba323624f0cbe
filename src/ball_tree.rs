//! Ball tree spatial index for exact k-nearest-neighbor queries.
//!
//! The tree recursively partitions the point set into nested bounding balls
//! along an approximate diameter axis. Queries walk the hierarchy with a
//! bounded candidate heap, pruning every ball whose triangle-inequality
//! lower bound cannot beat the current k-th best distance.

use std::iter::Sum;

use num_traits::{AsPrimitive, Float};
use rand::Rng;

use crate::error::{BallTreeError, Result};
use crate::heap_utils::TopK;

/// Euclidean distance between two equal-length coordinate slices.
fn euclidean_distance<F>(a: &[F], b: &[F]) -> f64
where
    F: Float + AsPrimitive<f64> + Sum,
{
    let sum_sq: F = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x - y;
            diff * diff
        })
        .sum();
    sum_sq.as_().sqrt()
}

/// The point of `points` farthest from `origin`.
fn farthest_from<'a, F>(points: &'a [Vec<F>], origin: &[F]) -> &'a Vec<F>
where
    F: Float + AsPrimitive<f64> + Sum,
{
    let mut farthest = &points[0];
    let mut max_distance = euclidean_distance(farthest, origin);
    for point in points {
        let distance = euclidean_distance(point, origin);
        if distance > max_distance {
            max_distance = distance;
            farthest = point;
        }
    }
    farthest
}

/// Signed ordering value of `point` along the split axis anchored at
/// `origin`. The scalar projection onto the unit axis, rescaled by the axis
/// length, reduces to the raw dot product `(point - origin) . axis`.
fn axis_position<F>(point: &[F], origin: &[F], axis: &[F]) -> f64
where
    F: Float + AsPrimitive<f64> + Sum,
{
    let dot: F = point
        .iter()
        .zip(origin.iter())
        .zip(axis.iter())
        .map(|((&p, &o), &x)| (p - o) * x)
        .sum();
    dot.as_()
}

/// Median of a non-empty value list; the mean of the two middle values for
/// even-length input.
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// A bounding ball over a subset of the indexed points.
///
/// Internal nodes carry both children; leaves carry neither. Nodes are
/// immutable once construction finishes and expose read-only accessors only.
#[derive(Debug, Clone)]
pub struct BallTreeNode<F> {
    points: Vec<Vec<F>>,
    centroid: Vec<F>,
    radius: f64,
    left: Option<Box<BallTreeNode<F>>>,
    right: Option<Box<BallTreeNode<F>>>,
}

impl<F> BallTreeNode<F>
where
    F: Float + AsPrimitive<f64> + Sum,
{
    /// Builds a leaf ball over a non-empty subset: centroid is the
    /// coordinate-wise mean, radius the maximum centroid-to-point distance.
    fn new(points: Vec<Vec<F>>) -> Self {
        debug_assert!(
            !points.is_empty(),
            "node construction requires a non-empty subset"
        );
        let dimensions = points[0].len();
        let count = F::from(points.len()).unwrap_or_else(F::one);

        let mut centroid = vec![F::zero(); dimensions];
        for point in &points {
            for (acc, &coord) in centroid.iter_mut().zip(point.iter()) {
                *acc = *acc + coord;
            }
        }
        for acc in centroid.iter_mut() {
            *acc = *acc / count;
        }

        let radius = points
            .iter()
            .map(|point| euclidean_distance(&centroid, point))
            .fold(0.0_f64, f64::max);

        BallTreeNode {
            points,
            centroid,
            radius,
            left: None,
            right: None,
        }
    }

    /// The subset of indexed points this ball covers.
    pub fn points(&self) -> &[Vec<F>] {
        &self.points
    }

    /// Coordinate-wise mean of the covered points.
    pub fn centroid(&self) -> &[F] {
        &self.centroid
    }

    /// Maximum Euclidean distance from the centroid to any covered point.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn left(&self) -> Option<&BallTreeNode<F>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&BallTreeNode<F>> {
        self.right.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

/// Ball tree over a static point set.
///
/// Built once via [`BallTree::build`] and read-only thereafter; queries take
/// `&self`, so a built tree can be shared across threads freely.
#[derive(Debug)]
pub struct BallTree<F> {
    leaf_size: usize,
    root: Option<Box<BallTreeNode<F>>>,
}

impl<F> BallTree<F>
where
    F: Float + AsPrimitive<f64> + Sum,
{
    /// Creates an empty tree. Subsets of at most `leaf_size` points become
    /// leaves during construction.
    pub fn new(leaf_size: usize) -> Result<Self> {
        if leaf_size == 0 {
            return Err(BallTreeError::InvalidConfiguration {
                reason: "leaf_size must be at least 1",
            });
        }
        Ok(BallTree {
            leaf_size,
            root: None,
        })
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&BallTreeNode<F>> {
        self.root.as_deref()
    }

    /// Indexes `points`, replacing any previously built hierarchy.
    ///
    /// All points must share the same non-zero dimensionality. On error no
    /// tree state is retained: the tree is left unbuilt.
    pub fn build(&mut self, points: Vec<Vec<F>>) -> Result<()> {
        self.root = None;

        let dimensions = match points.first() {
            Some(point) => point.len(),
            None => return Err(BallTreeError::EmptyInput),
        };
        if dimensions == 0 {
            return Err(BallTreeError::EmptyInput);
        }
        for point in &points {
            if point.len() != dimensions {
                return Err(BallTreeError::DimensionMismatch {
                    expected: dimensions,
                    found: point.len(),
                });
            }
        }

        self.root = Some(Self::build_node(points, self.leaf_size));
        Ok(())
    }

    fn build_node(points: Vec<Vec<F>>, leaf_size: usize) -> Box<BallTreeNode<F>> {
        if points.len() <= leaf_size {
            return Box::new(BallTreeNode::new(points));
        }

        let mut rng = rand::thread_rng();
        let pivot = points[rng.gen_range(0..points.len())].clone();
        let a = farthest_from(&points, &pivot).clone();
        let b = farthest_from(&points, &a).clone();

        // All points coincide: there is no axis to split along.
        if euclidean_distance(&a, &b) == 0.0 {
            return Box::new(BallTreeNode::new(points));
        }

        let axis: Vec<F> = b.iter().zip(a.iter()).map(|(&bi, &ai)| bi - ai).collect();
        let positions: Vec<f64> = points
            .iter()
            .map(|point| axis_position(point, &a, &axis))
            .collect();
        let split = median(positions.clone());

        let mut left_points = Vec::new();
        let mut right_points = Vec::new();
        for (point, position) in points.iter().zip(positions.iter()) {
            if *position <= split {
                left_points.push(point.clone());
            } else {
                right_points.push(point.clone());
            }
        }

        // A median split still leaves one side empty when the upper half of
        // the projections sits exactly on the median. Promote the subset to a
        // leaf instead of recursing into an empty partition.
        if left_points.is_empty() || right_points.is_empty() {
            return Box::new(BallTreeNode::new(points));
        }

        let mut node = BallTreeNode::new(points);
        node.left = Some(Self::build_node(left_points, leaf_size));
        node.right = Some(Self::build_node(right_points, leaf_size));
        Box::new(node)
    }

    /// Returns the `k` indexed points nearest to `point`, sorted ascending by
    /// Euclidean distance (fewer than `k` if the indexed set is smaller).
    pub fn query(&self, point: &[F], k: usize) -> Result<Vec<Vec<F>>> {
        let root = self.root.as_ref().ok_or(BallTreeError::NotBuilt)?;
        if k == 0 {
            return Err(BallTreeError::InvalidConfiguration {
                reason: "k must be at least 1",
            });
        }
        let dimensions = root.centroid.len();
        if point.len() != dimensions {
            return Err(BallTreeError::DimensionMismatch {
                expected: dimensions,
                found: point.len(),
            });
        }

        let mut best = TopK::new(k);
        Self::knn_search(root, point, &mut best);
        Ok(best.into_sorted())
    }

    fn knn_search(node: &BallTreeNode<F>, point: &[F], best: &mut TopK<Vec<F>>) {
        let to_centroid = euclidean_distance(point, &node.centroid);

        // Triangle inequality: no point in this ball is closer than
        // d(query, centroid) - radius. Once the candidate set is full and
        // that lower bound exceeds the k-th best distance, the subtree is
        // dead.
        if let Some(worst) = best.worst_distance() {
            if to_centroid - node.radius > worst {
                return;
            }
        }

        match (&node.left, &node.right) {
            (Some(left), Some(right)) => {
                let to_left = euclidean_distance(point, &left.centroid);
                let to_right = euclidean_distance(point, &right.centroid);
                // Nearer child first, so the bound is already tightened when
                // the farther child hits the entry check above.
                if to_left <= to_right {
                    Self::knn_search(left, point, best);
                    Self::knn_search(right, point, best);
                } else {
                    Self::knn_search(right, point, best);
                    Self::knn_search(left, point, best);
                }
            }
            _ => {
                for candidate in &node.points {
                    let distance = euclidean_distance(point, candidate);
                    best.insert_or_replace_worst(distance, candidate.clone());
                }
            }
        }
    }

    /// Returns every indexed point within `radius` of `point`, in no
    /// particular order.
    pub fn query_radius(&self, point: &[F], radius: f64) -> Result<Vec<Vec<F>>> {
        let root = self.root.as_ref().ok_or(BallTreeError::NotBuilt)?;
        if radius < 0.0 {
            return Err(BallTreeError::InvalidConfiguration {
                reason: "radius must be non-negative",
            });
        }
        let dimensions = root.centroid.len();
        if point.len() != dimensions {
            return Err(BallTreeError::DimensionMismatch {
                expected: dimensions,
                found: point.len(),
            });
        }

        let mut found = Vec::new();
        Self::radius_search(root, point, radius, &mut found);
        Ok(found)
    }

    fn radius_search(
        node: &BallTreeNode<F>,
        point: &[F],
        radius: f64,
        found: &mut Vec<Vec<F>>,
    ) {
        let to_centroid = euclidean_distance(point, &node.centroid);
        if to_centroid - node.radius > radius {
            return;
        }

        match (&node.left, &node.right) {
            (Some(left), Some(right)) => {
                Self::radius_search(left, point, radius, found);
                Self::radius_search(right, point, radius, found);
            }
            _ => {
                for candidate in &node.points {
                    if euclidean_distance(point, candidate) <= radius {
                        found.push(candidate.clone());
                    }
                }
            }
        }
    }
}
