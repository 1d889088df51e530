//! Arena storage for heap nodes
//!
//! Nodes live in `slotmap` arenas and refer to each other through [`NodeRef`]s
//! instead of raw pointers. Slotmap keys are generational: once a node is
//! removed its key never resolves again, even after the slot is reused, so a
//! stale handle is detected instead of aliasing a newer element.
//!
//! # Segments
//!
//! A [`NodeStorage`] is a set of arena *segments*, each tagged with a
//! process-unique [`ArenaId`]. New nodes always go into the *home* segment.
//! [`NodeStorage::absorb`] moves whole segments from one storage into another
//! without touching any node, so every outstanding reference into either
//! storage stays valid. The cost is one map insertion per segment of the side
//! holding fewer segments: O(1) for storages that were never merged, and
//! O(log k) amortized over any sequence of merges of k storages, since a
//! segment only moves when the storage holding it at least doubles.
//!
//! ```rust
//! use rust_fibonacci_heap::storage::NodeStorage;
//!
//! let mut a: NodeStorage<&str> = NodeStorage::new();
//! let mut b: NodeStorage<&str> = NodeStorage::new();
//! let x = a.insert("x");
//! let y = b.insert("y");
//!
//! a.absorb(b);
//! assert_eq!(a.get(x), Some(&"x"));
//! assert_eq!(a.get(y), Some(&"y"));
//! assert_eq!(a.len(), 2);
//! ```

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

new_key_type! {
    /// Generational key of a node inside one arena segment
    pub struct NodeKey;
}

/// Default number of slots per segment before a new home segment is opened.
///
/// Slotmap indices are `u32`; staying well below that keeps every segment
/// addressable.
pub const ARENA_CAPACITY: usize = 1 << 30;

/// Process-unique identifier of an arena segment
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ArenaId(u64);

impl ArenaId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ArenaId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Reference to a node: the segment it lives in plus its key there
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeRef {
    arena: ArenaId,
    key: NodeKey,
}

/// Segmented, generational arena of nodes
#[derive(Debug)]
pub struct NodeStorage<N> {
    home: ArenaId,
    segments: FxHashMap<ArenaId, SlotMap<NodeKey, N>>,
    segment_capacity: usize,
    len: usize,
}

impl<N> Default for NodeStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> NodeStorage<N> {
    /// Creates an empty storage with one (empty) home segment
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty storage whose home segment can hold `capacity` nodes
    /// without reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        let home = ArenaId::fresh();
        let mut segments = FxHashMap::default();
        segments.insert(
            home,
            SlotMap::with_capacity_and_key(capacity.min(ARENA_CAPACITY)),
        );
        Self {
            home,
            segments,
            segment_capacity: ARENA_CAPACITY,
            len: 0,
        }
    }

    /// Creates an empty storage whose segments hold at most `segment_capacity`
    /// nodes each
    ///
    /// # Panics
    /// Panics if `segment_capacity` is zero or above [`ARENA_CAPACITY`].
    pub fn with_segment_capacity(segment_capacity: usize) -> Self {
        assert!(
            (1..=ARENA_CAPACITY).contains(&segment_capacity),
            "segment capacity must be in 1..={ARENA_CAPACITY}, got {segment_capacity}"
        );
        Self {
            segment_capacity,
            ..Self::with_capacity(0)
        }
    }

    /// Number of live nodes across all segments
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no node is stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of segments currently held, including the home segment
    #[cfg(test)]
    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Stores a node, returning its reference
    pub fn insert(&mut self, node: N) -> NodeRef {
        self.insert_with(|_| node)
    }

    /// Stores the node built by `f`, which receives the node's own reference
    ///
    /// Used to build nodes whose links initially point at themselves.
    pub fn insert_with(&mut self, f: impl FnOnce(NodeRef) -> N) -> NodeRef {
        if self.home_segment_len() >= self.segment_capacity {
            self.open_home_segment();
        }
        let arena = self.home;
        let segment = self.segments.entry(arena).or_default();
        let key = segment.insert_with_key(|key| f(NodeRef { arena, key }));
        self.len += 1;
        NodeRef { arena, key }
    }

    /// Removes a node, returning it if the reference was live
    pub fn remove(&mut self, node: NodeRef) -> Option<N> {
        let segment = self.segments.get_mut(&node.arena)?;
        let removed = segment.remove(node.key)?;
        self.len -= 1;
        if segment.is_empty() && node.arena != self.home {
            self.segments.remove(&node.arena);
        }
        Some(removed)
    }

    /// Returns true if `node` refers to a live node of this storage
    pub fn contains(&self, node: NodeRef) -> bool {
        self.get(node).is_some()
    }

    /// Shared access to a node
    pub fn get(&self, node: NodeRef) -> Option<&N> {
        self.segments.get(&node.arena)?.get(node.key)
    }

    /// Exclusive access to a node
    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut N> {
        self.segments.get_mut(&node.arena)?.get_mut(node.key)
    }

    /// Moves every node of `other` into `self`, returning how many segments
    /// changed owner
    ///
    /// No node is copied and no reference changes: segments are moved as a
    /// whole. The storage with fewer segments is folded into the other one, so
    /// the cost is O(min(segments of `self`, segments of `other`)). `self`
    /// keeps its segment capacity.
    pub fn absorb(&mut self, mut other: NodeStorage<N>) -> usize {
        let segment_capacity = self.segment_capacity;
        if other.segments.len() > self.segments.len() {
            std::mem::swap(self, &mut other);
        }
        self.segment_capacity = segment_capacity;
        let other_home = other.home;
        let mut moved = 0;
        for (id, segment) in other.segments {
            if segment.is_empty() && id == other_home {
                continue;
            }
            self.segments.insert(id, segment);
            moved += 1;
        }
        self.len += other.len;
        debug!(
            moved_segments = moved,
            segments = self.segments.len(),
            len = self.len,
            "absorbed node storage"
        );
        moved
    }

    /// Drops every node but keeps the home segment's allocation
    pub fn clear(&mut self) {
        let home = self.home;
        self.segments.retain(|id, _| *id == home);
        if let Some(segment) = self.segments.get_mut(&home) {
            segment.clear();
        }
        self.len = 0;
    }

    /// Iterates over all live nodes with their references, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &N)> + '_ {
        self.segments.iter().flat_map(|(&arena, segment)| {
            segment
                .iter()
                .map(move |(key, node)| (NodeRef { arena, key }, node))
        })
    }

    /// Iterates over all live nodes, in no particular order
    pub fn values(&self) -> impl Iterator<Item = &N> + '_ {
        self.segments.values().flat_map(|segment| segment.values())
    }

    fn home_segment_len(&self) -> usize {
        self.segments.get(&self.home).map_or(0, |segment| segment.len())
    }

    fn open_home_segment(&mut self) {
        self.home = ArenaId::fresh();
        self.segments.insert(self.home, SlotMap::with_key());
        debug!(segments = self.segments.len(), "opened new home arena segment");
    }
}

impl<N> Index<NodeRef> for NodeStorage<N> {
    type Output = N;

    /// # Panics
    ///
    /// Panics if `node` is dangling. Links between live nodes always resolve,
    /// so this only fires on a bug in the structure built on top.
    fn index(&self, node: NodeRef) -> &N {
        match self.get(node) {
            Some(n) => n,
            None => panic!("dangling node reference {:?}", node),
        }
    }
}

impl<N> IndexMut<NodeRef> for NodeStorage<N> {
    fn index_mut(&mut self, node: NodeRef) -> &mut N {
        match self.get_mut(node) {
            Some(n) => n,
            None => panic!("dangling node reference {:?}", node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_basic() {
        let mut storage: NodeStorage<i32> = NodeStorage::new();
        assert!(storage.is_empty());

        let key = storage.insert(42);
        assert_eq!(storage.get(key), Some(&42));
        assert_eq!(storage.len(), 1);

        storage[key] = 100;
        assert_eq!(storage[key], 100);

        assert_eq!(storage.remove(key), Some(100));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_stale_reference_is_detected_after_reuse() {
        let mut storage: NodeStorage<i32> = NodeStorage::new();

        let old = storage.insert(1);
        storage.remove(old);
        let new = storage.insert(2);

        // The slot is reused but the generation differs
        assert_ne!(old, new);
        assert!(!storage.contains(old));
        assert_eq!(storage.get(old), None);
        assert_eq!(storage.remove(old), None);
        assert_eq!(storage.get(new), Some(&2));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_insert_with_sees_own_reference() {
        let mut storage: NodeStorage<Option<NodeRef>> = NodeStorage::new();
        let node = storage.insert_with(Some);
        assert_eq!(storage[node], Some(node));
    }

    #[test]
    fn test_foreign_reference_is_rejected() {
        let mut a: NodeStorage<i32> = NodeStorage::new();
        let b_ref = NodeStorage::<i32>::new().insert(7);
        a.insert(1);
        assert!(!a.contains(b_ref));
    }

    #[test]
    fn test_absorb_keeps_references_valid() {
        let mut a: NodeStorage<i32> = NodeStorage::new();
        let mut b: NodeStorage<i32> = NodeStorage::new();
        let xs: Vec<_> = (0..5).map(|i| a.insert(i)).collect();
        let ys: Vec<_> = (10..15).map(|i| b.insert(i)).collect();

        a.absorb(b);
        assert_eq!(a.len(), 10);
        for (i, x) in xs.iter().enumerate() {
            assert_eq!(a[*x], i as i32);
        }
        for (i, y) in ys.iter().enumerate() {
            assert_eq!(a[*y], 10 + i as i32);
        }

        // New inserts keep working after the merge
        let z = a.insert(99);
        assert_eq!(a[z], 99);
        assert_eq!(a.len(), 11);
    }

    #[test]
    fn test_absorb_drops_empty_foreign_home() {
        let mut a: NodeStorage<i32> = NodeStorage::new();
        a.insert(1);
        a.absorb(NodeStorage::new());
        assert_eq!(a.segment_count(), 1);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_drained_segment_is_released() {
        let mut a: NodeStorage<i32> = NodeStorage::new();
        let mut b: NodeStorage<i32> = NodeStorage::new();
        a.insert(1);
        let y = b.insert(2);
        a.absorb(b);
        assert_eq!(a.segment_count(), 2);

        a.remove(y);
        assert_eq!(a.segment_count(), 1);
        assert!(!a.contains(y));
    }

    #[test]
    fn test_clear() {
        let mut a: NodeStorage<i32> = NodeStorage::new();
        let mut b: NodeStorage<i32> = NodeStorage::new();
        let x = a.insert(1);
        b.insert(2);
        a.absorb(b);

        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.segment_count(), 1);
        assert!(!a.contains(x));
        assert_eq!(a.iter().count(), 0);
    }

    #[test]
    fn test_iteration_covers_all_segments() {
        let mut a: NodeStorage<i32> = NodeStorage::new();
        let mut b: NodeStorage<i32> = NodeStorage::new();
        a.insert(1);
        a.insert(2);
        b.insert(3);
        a.absorb(b);

        let mut values: Vec<_> = a.values().copied().collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3]);

        let mut refs: Vec<_> = a.iter().map(|(r, v)| (*v, a[r])).collect();
        refs.sort();
        assert_eq!(refs, vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_full_home_segment_rolls_over() {
        let mut storage: NodeStorage<i32> = NodeStorage::with_segment_capacity(2);
        let refs: Vec<_> = (0..5).map(|i| storage.insert(i)).collect();

        // [0, 1] [2, 3] [4]
        assert_eq!(storage.segment_count(), 3);
        assert_eq!(storage.len(), 5);
        for (i, r) in refs.iter().enumerate() {
            assert_eq!(storage[*r], i as i32);
        }

        // Draining a full, no longer home, segment releases it
        assert_eq!(storage.remove(refs[0]), Some(0));
        assert_eq!(storage.segment_count(), 3);
        assert_eq!(storage.remove(refs[1]), Some(1));
        assert_eq!(storage.segment_count(), 2);
        assert!(!storage.contains(refs[0]));
        assert_eq!(storage[refs[3]], 3);

        // The home segment is never released, even when it empties
        assert_eq!(storage.remove(refs[4]), Some(4));
        assert_eq!(storage.segment_count(), 2);
        let fresh = storage.insert(9);
        assert_eq!(storage.segment_count(), 2);
        assert_eq!(storage[fresh], 9);
    }

    #[test]
    #[should_panic(expected = "segment capacity must be in")]
    fn test_zero_segment_capacity_is_rejected() {
        let _storage: NodeStorage<i32> = NodeStorage::with_segment_capacity(0);
    }

    #[test]
    fn test_absorb_moves_the_side_with_fewer_segments() {
        // 64 single-node storages merged pairwise into one storage of 64 segments
        let mut pool: Vec<NodeStorage<usize>> = (0..64)
            .map(|i| {
                let mut s = NodeStorage::new();
                s.insert(i);
                s
            })
            .collect();
        while pool.len() > 1 {
            let right = pool.pop().unwrap();
            let left = pool.pop().unwrap();
            let mut merged = left;
            merged.absorb(right);
            pool.insert(0, merged);
        }
        let mut big = pool.pop().unwrap();
        assert_eq!(big.segment_count(), 64);

        // Whichever side receives, only the single small segment changes owner
        let mut small = NodeStorage::new();
        small.insert(100);
        assert_eq!(big.absorb(small), 1);
        assert_eq!(big.segment_count(), 65);

        let mut small = NodeStorage::new();
        let r = small.insert(200);
        assert_eq!(small.absorb(big), 1);
        assert_eq!(small.segment_count(), 66);
        assert_eq!(small.len(), 66);
        assert_eq!(small[r], 200);
    }

    #[test]
    fn test_absorb_keeps_receiver_segment_capacity() {
        let mut small: NodeStorage<i32> = NodeStorage::with_segment_capacity(1);
        let mut big: NodeStorage<i32> = NodeStorage::new();
        let mut other = NodeStorage::new();
        big.insert(1);
        other.insert(2);
        big.absorb(other);

        small.absorb(big);
        small.insert(3);
        small.insert(4);
        // Capacity 1: the two fresh nodes land in two new home segments
        assert_eq!(small.segment_count(), 4);
    }

    #[test]
    #[should_panic(expected = "dangling node reference")]
    fn test_index_dangling_panics() {
        let mut a: NodeStorage<i32> = NodeStorage::new();
        let x = a.insert(1);
        a.remove(x);
        let _value: i32 = a[x];
    }
}
