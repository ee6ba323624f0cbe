//! Ball tree index for exact k-nearest-neighbor search in Euclidean space.
//!
//! The tree is built once from a static point set and is read-only
//! afterwards. Construction recursively splits each subset along an
//! approximate diameter axis at the median projection; queries prune whole
//! subtrees with a triangle-inequality lower bound against a bounded
//! candidate heap.
//!
//! ```
//! use ball_tree::BallTree;
//!
//! let mut tree = BallTree::new(2)?;
//! tree.build(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]])?;
//!
//! let nearest = tree.query(&[0.2, 0.1], 2)?;
//! assert_eq!(nearest[0], vec![0.0, 0.0]);
//! # Ok::<(), ball_tree::BallTreeError>(())
//! ```

pub mod ball_tree;
pub mod error;
pub mod heap_utils;

pub use ball_tree::{BallTree, BallTreeNode};
pub use error::{BallTreeError, Result};
pub use heap_utils::TopK;
