//! Dijkstra's shortest path algorithm on top of [`DecreaseKeyHeap`]
//!
//! This module is a consumer of the heap contract: it only needs `push_with_handle`,
//! `pop` and `decrease_key`, so any [`DecreaseKeyHeap`] can drive it. Two entry
//! points are provided:
//!
//! - [`dijkstra`]: implicit graphs described by a [`SearchNode`] type, searched
//!   until a goal node is settled
//! - [`shortest_distances`]: explicit adjacency lists, returning the distance from
//!   a source to every vertex
//!
//! Edge costs must be non-negative.
//!
//! # Design
//!
//! Only lightweight indices are stored in the heap rather than full node data.
//! A fast hash map (using FxHash) maps node states to their index, and a vector
//! holds the per-node metadata including costs and heap handles.
//!
//! # Example
//!
//! ```rust
//! use rust_fibonacci_heap::pathfinding::{SearchNode, dijkstra};
//! use rust_fibonacci_heap::fibonacci::FibonacciHeap;
//!
//! // Node carries its goal coordinates
//! #[derive(Clone, PartialEq, Eq, Hash)]
//! struct GridPos { x: i32, y: i32, goal_x: i32, goal_y: i32 }
//!
//! impl SearchNode for GridPos {
//!     type Cost = u32;
//!
//!     fn successors(&self) -> Vec<(Self, Self::Cost)> {
//!         vec![
//!             (GridPos { x: self.x + 1, y: self.y, ..self.clone() }, 1),
//!             (GridPos { x: self.x - 1, y: self.y, ..self.clone() }, 1),
//!             (GridPos { x: self.x, y: self.y + 1, ..self.clone() }, 1),
//!             (GridPos { x: self.x, y: self.y - 1, ..self.clone() }, 1),
//!         ]
//!     }
//!
//!     fn is_goal(&self) -> bool {
//!         self.x == self.goal_x && self.y == self.goal_y
//!     }
//! }
//!
//! let start = GridPos { x: 0, y: 0, goal_x: 2, goal_y: 2 };
//!
//! let (path, cost) = dijkstra::<_, FibonacciHeap<_, _>>(&start).unwrap();
//! assert_eq!(cost, 4); // Manhattan distance
//! assert_eq!(path.len(), 5);
//! ```

use crate::fibonacci::{FibonacciHandle, FibonacciHeap};
use crate::traits::{DecreaseKeyHeap, HeapError};
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::ops::Add;
use thiserror::Error;
use tracing::{trace, warn};

/// Trait for types that can be used as costs in pathfinding algorithms.
///
/// This requires the type to be orderable, copyable, and support addition.
/// `Default` supplies the zero cost of the start node.
pub trait Cost: Ord + Copy + Add<Output = Self> + Default {}

impl<T> Cost for T where T: Ord + Copy + Add<Output = Self> + Default {}

/// Trait for nodes in a search graph.
///
/// The node carries all context needed to generate successors and to check
/// whether it is a goal.
pub trait SearchNode: Clone + Eq + Hash {
    /// The cost type for edge weights
    type Cost: Cost;

    /// Returns all successor nodes along with the cost to reach them.
    fn successors(&self) -> Vec<(Self, Self::Cost)>;

    /// Returns true if this node is a goal state.
    fn is_goal(&self) -> bool;
}

/// Index of a discovered node; this is the item stored in the heap.
pub type NodeIndex = usize;

/// Errors reported by [`shortest_distances`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The source vertex does not exist
    #[error("source vertex {vertex} is outside a graph of {len} vertices")]
    SourceOutOfRange {
        /// Requested source
        vertex: usize,
        /// Number of vertices
        len: usize,
    },
    /// An edge points at a vertex that does not exist
    #[error("edge {from} -> {to} points outside a graph of {len} vertices")]
    EdgeOutOfRange {
        /// Tail of the edge
        from: usize,
        /// Head of the edge
        to: usize,
        /// Number of vertices
        len: usize,
    },
    /// The priority queue rejected an update
    #[error(transparent)]
    Heap(#[from] HeapError),
}

/// Metadata stored for each discovered node during search.
struct NodeEntry<N: SearchNode, H> {
    node: N,
    /// Best known cost from start
    g_score: N::Cost,
    /// Handle into the heap while the node is in the open set
    handle: Option<H>,
    came_from: Option<NodeIndex>,
    closed: bool,
}

/// Open/closed bookkeeping for one search.
struct PathFinder<N: SearchNode, H> {
    entries: Vec<NodeEntry<N, H>>,
    state_to_index: FxHashMap<N, NodeIndex>,
}

impl<N: SearchNode, H> PathFinder<N, H> {
    fn new() -> Self {
        PathFinder {
            entries: Vec::new(),
            state_to_index: FxHashMap::default(),
        }
    }

    /// Gets or creates an index for a node state.
    fn get_or_create_index(&mut self, node: N, g_score: N::Cost) -> (NodeIndex, bool) {
        if let Some(&index) = self.state_to_index.get(&node) {
            return (index, false);
        }
        let index = self.entries.len();
        self.state_to_index.insert(node.clone(), index);
        self.entries.push(NodeEntry {
            node,
            g_score,
            handle: None,
            came_from: None,
            closed: false,
        });
        (index, true)
    }

    /// Reconstructs the path from start to the given node index.
    fn reconstruct_path(&self, mut current: NodeIndex) -> Vec<N> {
        let mut path = vec![self.entries[current].node.clone()];
        while let Some(prev) = self.entries[current].came_from {
            path.push(self.entries[prev].node.clone());
            current = prev;
        }
        path.reverse();
        path
    }
}

/// Runs Dijkstra's algorithm from the start node until `is_goal()` returns true.
///
/// # Type Parameters
/// - `N`: The node type implementing [`SearchNode`]
/// - `H`: The heap type implementing [`DecreaseKeyHeap`]
///
/// # Returns
/// - `Some((path, cost))` with the path from start to goal (inclusive)
/// - `None` if no goal is reachable
pub fn dijkstra<N, H>(start: &N) -> Option<(Vec<N>, N::Cost)>
where
    N: SearchNode,
    H: DecreaseKeyHeap<NodeIndex, N::Cost>,
{
    let mut heap = H::new();
    let mut finder: PathFinder<N, H::Handle> = PathFinder::new();

    let zero = N::Cost::default();
    let (start_index, _) = finder.get_or_create_index(start.clone(), zero);
    finder.entries[start_index].handle = Some(heap.push_with_handle(zero, start_index));

    let mut settled = 0usize;
    while let Some((g, current)) = heap.pop() {
        let entry = &mut finder.entries[current];
        if entry.closed {
            continue;
        }
        entry.closed = true;
        entry.handle = None;
        settled += 1;

        let node = entry.node.clone();
        if node.is_goal() {
            trace!(settled, discovered = finder.entries.len(), "goal reached");
            return Some((finder.reconstruct_path(current), g));
        }

        for (neighbor, edge_cost) in node.successors() {
            let tentative = g + edge_cost;
            let (index, is_new) = finder.get_or_create_index(neighbor, tentative);
            let entry = &mut finder.entries[index];
            if entry.closed {
                continue;
            }

            if is_new {
                entry.came_from = Some(current);
                entry.handle = Some(heap.push_with_handle(tentative, index));
            } else if tentative < entry.g_score {
                entry.g_score = tentative;
                entry.came_from = Some(current);
                if let Some(handle) = entry.handle {
                    if let Err(err) = heap.decrease_key(&handle, tentative) {
                        warn!(%err, index, "decrease_key rejected, re-queueing node");
                        entry.handle = Some(heap.push_with_handle(tentative, index));
                    }
                }
            }
        }
    }

    trace!(settled, "search exhausted without reaching a goal");
    None
}

/// Computes the shortest distance from `source` to every vertex.
///
/// `graph[u]` lists the outgoing edges of `u` as `(v, weight)` pairs. The result
/// holds `None` for vertices that cannot be reached.
///
/// # Errors
/// - [`GraphError::SourceOutOfRange`] if `source >= graph.len()`
/// - [`GraphError::EdgeOutOfRange`] if a reachable edge points past the last vertex
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_heap::pathfinding::shortest_distances;
///
/// let graph = vec![
///     vec![(1, 4u32), (2, 1)],
///     vec![(3, 1)],
///     vec![(1, 2), (3, 5)],
///     vec![],
///     vec![],
/// ];
/// let dist = shortest_distances(&graph, 0).unwrap();
/// assert_eq!(dist, vec![Some(0), Some(3), Some(1), Some(4), None]);
/// ```
pub fn shortest_distances<C: Cost>(
    graph: &[Vec<(usize, C)>],
    source: usize,
) -> Result<Vec<Option<C>>, GraphError> {
    let len = graph.len();
    if source >= len {
        return Err(GraphError::SourceOutOfRange { vertex: source, len });
    }

    let mut dist: Vec<Option<C>> = vec![None; len];
    let mut handles: Vec<Option<FibonacciHandle>> = vec![None; len];
    let mut settled = vec![false; len];
    let mut heap: FibonacciHeap<usize, C> = FibonacciHeap::with_capacity(len);

    let zero = C::default();
    dist[source] = Some(zero);
    handles[source] = Some(heap.insert(zero, source));

    while let Some((d, u)) = heap.extract_min() {
        settled[u] = true;
        handles[u] = None;
        for &(v, weight) in &graph[u] {
            if v >= len {
                return Err(GraphError::EdgeOutOfRange { from: u, to: v, len });
            }
            if settled[v] {
                continue;
            }
            let candidate = d + weight;
            match (dist[v], handles[v]) {
                (None, _) => {
                    dist[v] = Some(candidate);
                    handles[v] = Some(heap.insert(candidate, v));
                }
                (Some(current), Some(handle)) if candidate < current => {
                    heap.decrease_key(&handle, candidate)?;
                    dist[v] = Some(candidate);
                }
                _ => {}
            }
        }
    }

    Ok(dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    struct Line {
        value: i32,
        goal: i32,
    }

    impl SearchNode for Line {
        type Cost = u32;

        fn successors(&self) -> Vec<(Self, u32)> {
            if self.value < 100 {
                vec![
                    (Line { value: self.value + 1, goal: self.goal }, 1),
                    (Line { value: self.value + 3, goal: self.goal }, 2),
                ]
            } else {
                vec![]
            }
        }

        fn is_goal(&self) -> bool {
            self.value == self.goal
        }
    }

    #[test]
    fn test_dijkstra_prefers_cheaper_jumps() {
        let start = Line { value: 0, goal: 9 };
        let (path, cost) = dijkstra::<_, FibonacciHeap<_, _>>(&start).unwrap();
        assert_eq!(cost, 6);
        let values: Vec<i32> = path.iter().map(|n| n.value).collect();
        assert_eq!(values, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_dijkstra_unreachable_goal() {
        let start = Line { value: 0, goal: -1 };
        assert!(dijkstra::<_, FibonacciHeap<_, _>>(&start).is_none());
    }

    #[test]
    fn test_dijkstra_start_is_goal() {
        let start = Line { value: 4, goal: 4 };
        let (path, cost) = dijkstra::<_, FibonacciHeap<_, _>>(&start).unwrap();
        assert_eq!(cost, 0);
        assert_eq!(path, vec![start]);
    }

    #[test]
    fn test_shortest_distances_uses_decrease_key() {
        // 0 -> 1 costs 10 directly but 3 through 2
        let graph = vec![vec![(1, 10u64), (2, 1)], vec![], vec![(1, 2)]];
        let dist = shortest_distances(&graph, 0).unwrap();
        assert_eq!(dist, vec![Some(0), Some(3), Some(1)]);
    }

    #[test]
    fn test_shortest_distances_errors() {
        let graph: Vec<Vec<(usize, u32)>> = vec![vec![(5, 1)]];
        assert_eq!(
            shortest_distances(&graph, 3),
            Err(GraphError::SourceOutOfRange { vertex: 3, len: 1 })
        );
        assert_eq!(
            shortest_distances(&graph, 0),
            Err(GraphError::EdgeOutOfRange { from: 0, to: 5, len: 1 })
        );
    }
}
