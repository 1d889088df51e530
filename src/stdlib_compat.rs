//! Standard library compatibility layer
//!
//! Provides a `BinaryHeap`-shaped wrapper where each element is its own priority.
//!
//! # Differences from BinaryHeap
//!
//! - **Min-heap vs Max-heap**: This is a min-heap, while `BinaryHeap` is a max-heap.
//!   Use `std::cmp::Reverse<T>` to get max-heap behavior.
//! - **Cheap append**: with the default [`FibonacciHeap`] backend, `append` splices
//!   the two heaps instead of moving elements one by one.
//!
//! # Example
//!
//! ```rust
//! use rust_fibonacci_heap::stdlib_compat::StdHeap;
//!
//! let mut heap: StdHeap<i32> = StdHeap::new();
//! heap.push(5);
//! heap.push(3);
//! heap.push(7);
//! assert_eq!(heap.peek(), Some(&3)); // min-heap, unlike BinaryHeap's max-heap
//! assert_eq!(heap.pop(), Some(3));
//! ```

use crate::fibonacci::FibonacciHeap;
use crate::traits::Heap;

/// A `BinaryHeap`-style min-heap of keys
///
/// # Type Parameters
/// - `T`: The key type, must implement `Ord`
/// - `H`: The underlying heap implementation, a [`FibonacciHeap`] by default
pub struct StdHeap<T: Ord, H: Heap<(), T> = FibonacciHeap<(), T>> {
    heap: H,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Ord, H: Heap<(), T>> StdHeap<T, H> {
    /// Creates a new empty heap
    pub fn new() -> Self {
        Self {
            heap: H::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Returns true if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Pushes a key onto the heap
    pub fn push(&mut self, key: T) {
        self.heap.push(key, ())
    }

    /// Returns a reference to the smallest key without removing it
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|(key, _)| key)
    }

    /// Removes and returns the smallest key
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|(key, _)| key)
    }

    /// Moves all keys of `other` into `self`, leaving `other` empty
    pub fn append(&mut self, other: &mut Self) {
        let taken = std::mem::replace(&mut other.heap, H::new());
        self.heap.merge(taken);
    }

    /// Consumes the heap, returning its keys in ascending order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Some(key) = self.pop() {
            sorted.push(key);
        }
        sorted
    }
}

impl<T: Ord, H: Heap<(), T>> Default for StdHeap<T, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord, H: Heap<(), T>> Extend<T> for StdHeap<T, H> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.push(key);
        }
    }
}

impl<T: Ord, H: Heap<(), T>> FromIterator<T> for StdHeap<T, H> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;

    #[test]
    fn test_sorts_with_duplicates_and_negatives() {
        let heap: StdHeap<i32> = [3, -1, 4, 1, -5, 9, 2, 6, 5, 3, 5].into_iter().collect();
        assert_eq!(heap.len(), 11);
        assert_eq!(
            heap.into_sorted_vec(),
            vec![-5, -1, 1, 2, 3, 3, 4, 5, 5, 6, 9]
        );
    }

    #[test]
    fn test_reverse_gives_max_heap() {
        let mut heap: StdHeap<Reverse<u8>> = StdHeap::new();
        heap.extend([Reverse(1), Reverse(7), Reverse(3)]);
        assert_eq!(heap.pop(), Some(Reverse(7)));
        assert_eq!(heap.peek(), Some(&Reverse(3)));
    }

    #[test]
    fn test_append() {
        let mut a: StdHeap<i32> = [4, 2].into_iter().collect();
        let mut b: StdHeap<i32> = [3, 1].into_iter().collect();
        a.append(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.into_sorted_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty() {
        let mut heap: StdHeap<String> = StdHeap::default();
        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.pop(), None);
    }
}
