//! Arena-backed Fibonacci Heap for Rust
//!
//! This crate provides a mergeable min-priority queue implemented as a Fibonacci
//! heap, with handle-based `decrease_key` and `delete`.
//!
//! # Features
//!
//! - **O(1) amortized** insert, find_min, and decrease_key
//! - **O(log n) amortized** extract_min and delete
//! - **Union** splices root lists in O(1) and moves O(min(s, t)) arena segments,
//!   which is O(1) for heaps never merged before and O(log k) amortized over
//!   merges of k heaps
//! - **Safe node management**: nodes live in a generational `slotmap` arena, so
//!   there is no `unsafe` and stale handles are detected instead of aliasing
//! - **Stable handles across union**: merging two heaps moves arena segments, not
//!   nodes, so handles from both inputs keep working
//! - **Invariant checker**: [`FibonacciHeap::check_invariants`](fibonacci::FibonacciHeap::check_invariants)
//!   verifies heap order, ring links, degrees, marks, and the Fibonacci size bound
//!
//! # Cargo features
//!
//! - `pathfinding` (default): Dijkstra's algorithm built on [`DecreaseKeyHeap`]
//!
//! # Example
//!
//! ```rust
//! use rust_fibonacci_heap::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.insert(5, "item1");
//! let _handle2 = heap.insert(3, "item2");
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.find_min(), Some((&1, &"item1")));
//! ```

pub mod degree;
pub mod fibonacci;
pub mod invariants;
#[cfg(feature = "pathfinding")]
pub mod pathfinding;
pub mod stdlib_compat;
pub mod storage;
pub mod traits;

// Re-export the main traits for convenience
pub use fibonacci::{FibonacciHandle, FibonacciHeap};
pub use invariants::{HeapStats, InvariantViolation};
pub use traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
