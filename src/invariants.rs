//! Structural invariant checking for [`FibonacciHeap`]
//!
//! [`FibonacciHeap::check_invariants`] walks every tree and verifies:
//!
//! - ring links are mutually consistent and every node is reached exactly once
//! - `min` is a root and no root has a smaller priority
//! - heap order: no child has a smaller priority than its parent
//! - every child points back to its parent, and `degree` matches the child count
//! - roots are never marked
//! - a node of degree `k` roots at least `F(k+2)` nodes
//! - the number of reachable nodes equals `len()`
//!
//! It runs in O(n) and is meant for tests and debugging.

use crate::degree;
use crate::fibonacci::{FibonacciHeap, Node};
use crate::storage::NodeRef;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// A broken structural invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// `min` is absent on a non-empty heap, or present on an empty one
    #[error("min pointer disagrees with len {len}")]
    MinMismatch {
        /// Number of stored nodes
        len: usize,
    },
    /// `min` refers to a node with a parent
    #[error("min does not refer to a root")]
    MinNotRoot,
    /// Some root has a smaller priority than `min`
    #[error("a root has a smaller priority than min")]
    MinNotMinimal,
    /// A child has a smaller priority than its parent
    #[error("heap order violated below a node of degree {parent_degree}")]
    HeapOrder {
        /// Degree of the offending parent
        parent_degree: usize,
    },
    /// `left`/`right` links do not form a consistent ring
    #[error("sibling ring links are inconsistent")]
    BrokenRing,
    /// A node's parent link disagrees with the ring it is found in
    #[error("parent link does not match tree position")]
    ParentMismatch,
    /// Recorded degree differs from the number of children found
    #[error("recorded degree {recorded} but found {actual} children")]
    DegreeMismatch {
        /// Stored degree
        recorded: usize,
        /// Length of the child ring
        actual: usize,
    },
    /// A root carries a mark
    #[error("a root is marked")]
    MarkedRoot,
    /// A subtree is too small for its root's degree
    #[error("node of degree {degree} roots only {size} nodes")]
    DegreeBound {
        /// Degree of the subtree root
        degree: usize,
        /// Number of nodes in the subtree
        size: usize,
    },
    /// The trees do not cover exactly the stored nodes
    #[error("{reachable} nodes reachable from the root list but len is {len}")]
    CountMismatch {
        /// Nodes found by traversal
        reachable: usize,
        /// Nodes held by the arena
        len: usize,
    },
    /// A link points at a node that is not stored
    #[error("dangling node link")]
    Dangling,
}

/// Shape summary returned by a successful check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Number of elements
    pub len: usize,
    /// Number of trees in the root list
    pub roots: usize,
    /// Largest degree of any node
    pub max_degree: usize,
    /// Number of marked nodes
    pub marked: usize,
}

impl<T, P: Ord> FibonacciHeap<T, P> {
    /// Verifies every structural invariant of the heap
    ///
    /// # Errors
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// ```rust
    /// use rust_fibonacci_heap::fibonacci::FibonacciHeap;
    ///
    /// let mut heap: FibonacciHeap<(), u32> = (0..100).map(|k| (k, ())).collect();
    /// heap.extract_min();
    /// let stats = heap.check_invariants().unwrap();
    /// assert_eq!(stats.len, 99);
    /// assert!(stats.roots <= 7);
    /// ```
    pub fn check_invariants(&self) -> Result<HeapStats, InvariantViolation> {
        let len = self.nodes.len();
        let Some(min) = self.min else {
            return if len == 0 {
                Ok(HeapStats::default())
            } else {
                Err(InvariantViolation::MinMismatch { len })
            };
        };
        let min_node = self.checked(min)?;
        if min_node.parent.is_some() {
            return Err(InvariantViolation::MinNotRoot);
        }

        let roots = self.checked_ring(min, len)?;
        let mut stats = HeapStats {
            len,
            roots: roots.len(),
            ..HeapStats::default()
        };
        for &root in &roots {
            let node = self.checked(root)?;
            if node.parent.is_some() {
                return Err(InvariantViolation::ParentMismatch);
            }
            if node.marked {
                return Err(InvariantViolation::MarkedRoot);
            }
            if node.priority < min_node.priority {
                return Err(InvariantViolation::MinNotMinimal);
            }
        }

        // Breadth-first over all trees: every node comes after its ancestors
        let mut order = roots;
        let mut next = 0;
        while next < order.len() {
            let x = order[next];
            next += 1;
            let node = self.checked(x)?;
            let degree = usize::from(node.degree);
            stats.max_degree = stats.max_degree.max(degree);
            if node.marked {
                stats.marked += 1;
            }

            let children = match node.child {
                Some(child) => self.checked_ring(child, len)?,
                None => Vec::new(),
            };
            if children.len() != degree {
                return Err(InvariantViolation::DegreeMismatch {
                    recorded: degree,
                    actual: children.len(),
                });
            }
            for child in children {
                let child_node = self.checked(child)?;
                if child_node.parent != Some(x) {
                    return Err(InvariantViolation::ParentMismatch);
                }
                if child_node.priority < node.priority {
                    return Err(InvariantViolation::HeapOrder {
                        parent_degree: degree,
                    });
                }
                order.push(child);
            }
            if order.len() > len {
                return Err(InvariantViolation::CountMismatch {
                    reachable: order.len(),
                    len,
                });
            }
        }
        if order.len() != len {
            return Err(InvariantViolation::CountMismatch {
                reachable: order.len(),
                len,
            });
        }

        let mut sizes: FxHashMap<NodeRef, usize> = FxHashMap::default();
        for &x in order.iter().rev() {
            let node = self.checked(x)?;
            let size = sizes.get(&x).copied().unwrap_or(0) + 1;
            let degree = usize::from(node.degree);
            if degree::max_degree(size) < degree {
                return Err(InvariantViolation::DegreeBound { degree, size });
            }
            if let Some(parent) = node.parent {
                *sizes.entry(parent).or_insert(0) += size;
            }
        }

        Ok(stats)
    }

    fn checked(&self, x: NodeRef) -> Result<&Node<T, P>, InvariantViolation> {
        self.nodes.get(x).ok_or(InvariantViolation::Dangling)
    }

    /// Walks a ring, giving up after `limit` members
    fn checked_ring(&self, start: NodeRef, limit: usize) -> Result<Vec<NodeRef>, InvariantViolation> {
        let mut members = Vec::new();
        let mut current = start;
        loop {
            members.push(current);
            let right = self.checked(current)?.right;
            if self.checked(right)?.left != current {
                return Err(InvariantViolation::BrokenRing);
            }
            current = right;
            if current == start {
                return Ok(members);
            }
            if members.len() >= limit {
                return Err(InvariantViolation::BrokenRing);
            }
        }
    }
}
