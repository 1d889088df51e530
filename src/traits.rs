//! Common traits for heap data structures
//!
//! This module provides a two-tier trait hierarchy for mergeable priority queues:
//!
//! - [`Heap`]: Base trait with push/peek/pop/merge, shaped like `BinaryHeap`
//! - [`DecreaseKeyHeap`]: Extended trait adding handle-based `decrease_key` and `delete`
//!
//! Consumers such as [`dijkstra`](crate::pathfinding::dijkstra) are written against
//! these traits rather than against [`FibonacciHeap`](crate::fibonacci::FibonacciHeap)
//! directly.

use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Error type for handle-based heap operations
///
/// Both variants describe caller misuse. They are reported before the heap is
/// touched, so an `Err` never leaves the heap in a partially updated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// `decrease_key` was asked to raise a priority
    #[error("new priority is greater than the current priority")]
    PriorityIncreased,
    /// The handle refers to an element that was removed, or to another heap
    #[error("handle is no longer valid (element was removed or belongs to another heap)")]
    InvalidHandle,
}

/// A handle to an element in the heap, used for decrease_key and delete
///
/// This is an opaque type that identifies a specific element in the heap.
/// Handles are small `Copy` values; holding one does not keep the element alive.
pub trait Handle: Clone + Copy + PartialEq + Eq + Hash + fmt::Debug {}

/// Base trait for heap/priority queue data structures
///
/// This trait provides a simple API similar to Rust's `BinaryHeap`:
/// - `push` inserts an element (returns `()`)
/// - `pop` removes and returns the minimum
/// - `peek` returns the minimum without removing it
///
/// Unlike `BinaryHeap` which stores values directly (using `Ord`), these heaps
/// store (priority, item) pairs to separate the ordering key from the data.
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_heap::Heap;
/// use rust_fibonacci_heap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given priority
    fn push(&mut self, priority: P, item: T);

    /// Returns the minimum priority and associated item without removing it
    ///
    /// Note that `BinaryHeap` is a max-heap, while these heaps are min-heaps.
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the minimum priority and associated item
    fn pop(&mut self) -> Option<(P, T)>;

    /// Merges another heap into this one, consuming the other heap
    fn merge(&mut self, other: Self);
}

/// Extended heap trait with `decrease_key` and `delete` support
///
/// These operations are essential for algorithms like Dijkstra's shortest path
/// that need to update priorities of elements already in the heap.
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_heap::{DecreaseKeyHeap, Heap};
/// use rust_fibonacci_heap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap, used to reference elements for decrease_key
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Lowers the priority of the element identified by `handle`
    ///
    /// Setting the priority to its current value is a no-op.
    ///
    /// # Errors
    /// - [`HeapError::PriorityIncreased`] if `new_priority` is greater than the
    ///   current priority
    /// - [`HeapError::InvalidHandle`] if the element is no longer in the heap
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;

    /// Removes the element identified by `handle` and returns it
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidHandle`] if the element is no longer in the heap.
    fn delete(&mut self, handle: &Self::Handle) -> Result<(P, T), HeapError>;
}
