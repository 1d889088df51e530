//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert, find_min, and decrease_key
//! - O(log n) amortized extract_min and delete
//! - union in O(1) for heaps that were never merged before, see
//!   [`FibonacciHeap::merge`] for the general bound
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list, and so are the children of every node. The
//! heap keeps a reference to the minimum root.
//!
//! # Node storage
//!
//! Nodes live in a [`NodeStorage`] arena and link to each other through
//! [`NodeRef`] indices, so there are no raw pointers and no `unsafe`. A
//! [`FibonacciHandle`] wraps the node's generational arena key: it stays valid
//! while the element is in the heap (including across consolidation and union),
//! and is rejected with [`HeapError::InvalidHandle`] once the element is gone.
//!
//! # Example
//!
//! ```rust
//! use rust_fibonacci_heap::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handles: Vec<_> = [5, 3, 8, 1, 9, 2]
//!     .into_iter()
//!     .map(|key| heap.insert(key, ()))
//!     .collect();
//!
//! assert_eq!(heap.extract_min(), Some((1, ())));
//! heap.decrease_key(&handles[2], 0).unwrap();
//! assert_eq!(heap.find_min(), Some((&0, &())));
//! ```

use crate::degree::{self, Degree};
use crate::storage::{NodeRef, NodeStorage};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// Handle to an element in a Fibonacci heap
///
/// Handles are plain `Copy` values. After [`FibonacciHeap::union`] or
/// [`FibonacciHeap::merge`] a handle from either input refers to the same
/// element in the combined heap. Handles of removed elements, and handles
/// from unrelated heaps, are reported as [`HeapError::InvalidHandle`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    node: NodeRef,
}

impl Handle for FibonacciHandle {}

pub(crate) struct Node<T, P> {
    pub(crate) item: T,
    pub(crate) priority: P,
    pub(crate) parent: Option<NodeRef>,
    /// Any one child; the rest are reachable through its sibling ring
    pub(crate) child: Option<NodeRef>,
    pub(crate) left: NodeRef,
    pub(crate) right: NodeRef,
    pub(crate) degree: Degree,
    pub(crate) marked: bool,
}

/// Fibonacci Heap
///
/// A min-heap of `(priority, item)` pairs. Use `FibonacciHeap<(), P>` when the
/// priority is all you need, or [`StdHeap`](crate::stdlib_compat::StdHeap).
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_heap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5, "item");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.find_min(), Some((&1, &"item")));
/// ```
pub struct FibonacciHeap<T, P: Ord> {
    pub(crate) nodes: NodeStorage<Node<T, P>>,
    pub(crate) min: Option<NodeRef>,
}

impl<T, P: Ord> FibonacciHeap<T, P> {
    /// Creates an empty heap
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty heap that can hold `capacity` elements before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeStorage::with_capacity(capacity),
            min: None,
        }
    }

    /// Returns true if the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Alias of [`len`](Self::len)
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Inserts an element and returns a handle to it
    ///
    /// # Time Complexity
    /// O(1)
    pub fn insert(&mut self, priority: P, item: T) -> FibonacciHandle {
        let node = self.nodes.insert_with(|this| Node {
            item,
            priority,
            parent: None,
            child: None,
            left: this,
            right: this,
            degree: 0,
            marked: false,
        });
        self.add_root(node);
        FibonacciHandle { node }
    }

    /// Returns the minimum priority and its item without removing them
    ///
    /// # Time Complexity
    /// O(1)
    pub fn find_min(&self) -> Option<(&P, &T)> {
        self.min.map(|min| {
            let node = &self.nodes[min];
            (&node.priority, &node.item)
        })
    }

    /// Removes and returns the element with the minimum priority
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn extract_min(&mut self) -> Option<(P, T)> {
        let z = self.min?;

        // Promote every child of z to the root ring
        if let Some(first_child) = self.nodes[z].child.take() {
            let mut current = first_child;
            loop {
                let node = &mut self.nodes[current];
                node.parent = None;
                node.marked = false;
                current = node.right;
                if current == first_child {
                    break;
                }
            }
            self.splice(z, first_child);
            self.nodes[z].degree = 0;
        }

        let next = self.nodes[z].right;
        self.unlink(z);
        let removed = self.nodes.remove(z)?;

        if next == z {
            self.min = None;
        } else {
            self.min = Some(next);
            self.consolidate();
        }

        Some((removed.priority, removed.item))
    }

    /// Lowers the priority of the element behind `handle`
    ///
    /// Passing the current priority is a no-op. The heap is left untouched when
    /// an error is returned.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is no longer in this heap
    /// - [`HeapError::PriorityIncreased`] if `new_priority` is greater than the
    ///   current priority
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_key(
        &mut self,
        handle: &FibonacciHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        let x = handle.node;
        let node = self.nodes.get_mut(x).ok_or(HeapError::InvalidHandle)?;
        match new_priority.cmp(&node.priority) {
            Ordering::Greater => return Err(HeapError::PriorityIncreased),
            Ordering::Equal => return Ok(()),
            Ordering::Less => node.priority = new_priority,
        }
        let parent = node.parent;

        if let Some(parent) = parent {
            if self.nodes[x].priority < self.nodes[parent].priority {
                self.cut(x, parent);
                self.cascading_cut(parent);
            }
        }

        // x is either a root now, or still under a parent that is no greater
        if let Some(min) = self.min {
            if self.nodes[x].priority < self.nodes[min].priority {
                self.min = Some(x);
            }
        }
        Ok(())
    }

    /// Removes the element behind `handle` and returns it
    ///
    /// The node is moved to the root list and treated as the minimum before
    /// running extract-min, so no "negative infinity" priority is required.
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidHandle`] if the element is no longer in this heap.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn delete(&mut self, handle: &FibonacciHandle) -> Result<(P, T), HeapError> {
        let x = handle.node;
        let parent = self.nodes.get(x).ok_or(HeapError::InvalidHandle)?.parent;
        if let Some(parent) = parent {
            self.cut(x, parent);
            self.cascading_cut(parent);
        }
        self.min = Some(x);
        self.extract_min().ok_or(HeapError::InvalidHandle)
    }

    /// Moves every element of `other` into this heap
    ///
    /// Handles obtained from either heap remain valid for the merged heap.
    ///
    /// # Time Complexity
    /// The root rings are spliced in O(1). Moving arena segments costs
    /// O(min(s, t)) for heaps holding `s` and `t` segments. A heap that was
    /// never merged holds one segment, so merging such heaps is O(1); across
    /// any sequence of merges of `k` heaps the segment moves total
    /// O(k log k).
    pub fn merge(&mut self, other: Self) {
        let FibonacciHeap { nodes, min } = other;
        self.nodes.absorb(nodes);
        let Some(other_min) = min else {
            return;
        };
        match self.min {
            None => self.min = Some(other_min),
            Some(self_min) => {
                self.splice(self_min, other_min);
                if self.nodes[other_min].priority < self.nodes[self_min].priority {
                    self.min = Some(other_min);
                }
            }
        }
    }

    /// Combines two heaps into one, consuming both
    ///
    /// ```rust
    /// use rust_fibonacci_heap::fibonacci::FibonacciHeap;
    ///
    /// let a: FibonacciHeap<(), i32> = [(4, ()), (1, ())].into_iter().collect();
    /// let b: FibonacciHeap<(), i32> = [(3, ()), (2, ())].into_iter().collect();
    /// let merged = a.union(b);
    /// let keys: Vec<i32> = merged.into_sorted_vec().into_iter().map(|(p, _)| p).collect();
    /// assert_eq!(keys, vec![1, 2, 3, 4]);
    /// ```
    pub fn union(mut self, other: Self) -> Self {
        self.merge(other);
        self
    }

    /// Returns true if `handle` refers to an element still in this heap
    pub fn contains(&self, handle: &FibonacciHandle) -> bool {
        self.nodes.contains(handle.node)
    }

    /// Returns the priority and item behind `handle`
    pub fn get(&self, handle: &FibonacciHandle) -> Option<(&P, &T)> {
        self.nodes
            .get(handle.node)
            .map(|node| (&node.priority, &node.item))
    }

    /// Returns the current priority of the element behind `handle`
    pub fn priority(&self, handle: &FibonacciHandle) -> Option<&P> {
        self.nodes.get(handle.node).map(|node| &node.priority)
    }

    /// Mutable access to the item behind `handle`; the priority stays fixed
    pub fn item_mut(&mut self, handle: &FibonacciHandle) -> Option<&mut T> {
        self.nodes.get_mut(handle.node).map(|node| &mut node.item)
    }

    /// Removes every element; all outstanding handles become invalid
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.min = None;
    }

    /// Iterates over all `(priority, item)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&P, &T)> + '_ {
        self.nodes.values().map(|node| (&node.priority, &node.item))
    }

    /// Drains the heap into a vector sorted by ascending priority
    pub fn into_sorted_vec(mut self) -> Vec<(P, T)> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Some(entry) = self.extract_min() {
            sorted.push(entry);
        }
        sorted
    }

    // ------------------------------------------------------------------
    // Ring primitives
    // ------------------------------------------------------------------

    /// Adds a detached singleton node to the root ring and updates `min`
    fn add_root(&mut self, x: NodeRef) {
        match self.min {
            None => {
                let node = &mut self.nodes[x];
                node.left = x;
                node.right = x;
                self.min = Some(x);
            }
            Some(min) => {
                self.insert_before(min, x);
                if self.nodes[x].priority < self.nodes[min].priority {
                    self.min = Some(x);
                }
            }
        }
    }

    /// Links singleton `x` into the ring of `anchor`, just left of it
    fn insert_before(&mut self, anchor: NodeRef, x: NodeRef) {
        let left = self.nodes[anchor].left;
        {
            let node = &mut self.nodes[x];
            node.left = left;
            node.right = anchor;
        }
        self.nodes[left].right = x;
        self.nodes[anchor].left = x;
    }

    /// Removes `x` from its ring and turns it into a singleton
    fn unlink(&mut self, x: NodeRef) {
        let (left, right) = {
            let node = &self.nodes[x];
            (node.left, node.right)
        };
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        let node = &mut self.nodes[x];
        node.left = x;
        node.right = x;
    }

    /// Joins the ring containing `a` with the ring containing `b`
    fn splice(&mut self, a: NodeRef, b: NodeRef) {
        let a_right = self.nodes[a].right;
        let b_left = self.nodes[b].left;
        self.nodes[a].right = b;
        self.nodes[b].left = a;
        self.nodes[b_left].right = a_right;
        self.nodes[a_right].left = b_left;
    }

    /// Collects the ring starting at `start`
    fn ring(&self, start: NodeRef) -> SmallVec<[NodeRef; 16]> {
        let mut members = SmallVec::new();
        let mut current = start;
        loop {
            members.push(current);
            current = self.nodes[current].right;
            if current == start {
                break;
            }
        }
        members
    }

    // ------------------------------------------------------------------
    // Consolidation
    // ------------------------------------------------------------------

    /// Links root trees of equal degree until every degree appears at most once
    fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };
        let roots = self.ring(start);
        let mut table: SmallVec<[Option<NodeRef>; 32]> =
            SmallVec::from_elem(None, degree::consolidation_slots(self.len()));
        let mut links = 0usize;

        for root in roots.iter().copied() {
            let mut x = root;
            let mut d = usize::from(self.nodes[x].degree);
            loop {
                if d >= table.len() {
                    table.resize(d + 1, None);
                }
                let Some(mut y) = table[d].take() else {
                    break;
                };
                // On equal priorities the root being processed stays on top
                if self.nodes[y].priority < self.nodes[x].priority {
                    std::mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                links += 1;
                d += 1;
            }
            table[d] = Some(x);
        }

        self.min = None;
        for root in table.into_iter().flatten() {
            self.add_root(root);
        }
        trace!(
            roots_before = roots.len(),
            links,
            len = self.len(),
            "consolidated root list"
        );
    }

    /// Makes root `y` a child of root `x`
    fn link(&mut self, y: NodeRef, x: NodeRef) {
        self.unlink(y);
        {
            let node = &mut self.nodes[y];
            node.parent = Some(x);
            node.marked = false;
        }
        match self.nodes[x].child {
            Some(child) => self.insert_before(child, y),
            None => self.nodes[x].child = Some(y),
        }
        let node = &mut self.nodes[x];
        node.degree = degree::checked_increment(node.degree);
    }

    // ------------------------------------------------------------------
    // Cuts
    // ------------------------------------------------------------------

    /// Detaches `x` from `parent` and makes it an unmarked root
    fn cut(&mut self, x: NodeRef, parent: NodeRef) {
        let right = self.nodes[x].right;
        {
            let p = &mut self.nodes[parent];
            if p.child == Some(x) {
                p.child = if right == x { None } else { Some(right) };
            }
            debug_assert!(p.degree > 0, "cut below a parent of degree 0");
            p.degree -= 1;
        }
        self.unlink(x);
        {
            let node = &mut self.nodes[x];
            node.parent = None;
            node.marked = false;
        }
        self.add_root(x);
    }

    /// Walks up from `node`, cutting marked ancestors until an unmarked one
    /// (which gets marked) or a root is reached
    fn cascading_cut(&mut self, node: NodeRef) {
        let mut current = node;
        let mut cuts = 0usize;
        while let Some(parent) = self.nodes[current].parent {
            if !self.nodes[current].marked {
                self.nodes[current].marked = true;
                break;
            }
            self.cut(current, parent);
            cuts += 1;
            current = parent;
        }
        if cuts > 0 {
            trace!(cuts, "cascading cut");
        }
    }
}

impl<T, P: Ord> Default for FibonacciHeap<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, P: Ord + fmt::Debug> fmt::Debug for FibonacciHeap<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FibonacciHeap")
            .field("len", &self.len())
            .field("min", &self.find_min())
            .finish()
    }
}

impl<T, P: Ord> Extend<(P, T)> for FibonacciHeap<T, P> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.insert(priority, item);
        }
    }
}

impl<T, P: Ord> FromIterator<(P, T)> for FibonacciHeap<T, P> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<T, P: Ord> Heap<T, P> for FibonacciHeap<T, P> {
    fn new() -> Self {
        FibonacciHeap::new()
    }

    fn is_empty(&self) -> bool {
        FibonacciHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        FibonacciHeap::len(self)
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        self.find_min()
    }

    fn pop(&mut self) -> Option<(P, T)> {
        self.extract_min()
    }

    fn merge(&mut self, other: Self) {
        FibonacciHeap::merge(self, other)
    }
}

impl<T, P: Ord> DecreaseKeyHeap<T, P> for FibonacciHeap<T, P> {
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, handle, new_priority)
    }

    fn delete(&mut self, handle: &Self::Handle) -> Result<(P, T), HeapError> {
        FibonacciHeap::delete(self, handle)
    }
}
