//! Degree type and the Fibonacci degree bound.
//!
//! # Why u8?
//!
//! The degree of a Fibonacci heap node is the number of its children. A node
//! of degree `k` roots a subtree of at least `F(k+2)` nodes, where `F` is the
//! Fibonacci sequence, so the degree never exceeds `log_φ(n)`:
//!
//! - 2³² elements → max degree 45
//! - 2⁶⁴ elements → max degree 91
//!
//! `u8` covers every heap that fits in memory and saves 7 bytes per node
//! compared to `usize` on 64-bit systems.
//!
//! # Consolidation table
//!
//! [`consolidation_slots`] sizes the degree table used by extract-min from the
//! live element count instead of a fixed constant. The table is still grown on
//! demand, so a wrong estimate costs a reallocation, never an overflow.

/// Type alias for node degree.
pub type Degree = u8;

/// Maximum representable degree.
pub const MAX_DEGREE: Degree = u8::MAX;

/// Safely increment a degree value, panicking on overflow.
///
/// # Panics
///
/// Panics if `degree == MAX_DEGREE`. A valid heap would need more than
/// `F(257)` elements to get there.
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_heap::degree::{checked_increment, Degree};
///
/// let degree: Degree = 5;
/// assert_eq!(checked_increment(degree), 6);
/// ```
#[inline]
pub fn checked_increment(degree: Degree) -> Degree {
    degree.checked_add(1).expect(
        "degree overflow: this should be impossible since max degree is log_φ(n) \
         and u8::MAX (255) supports heaps with up to F(257) elements",
    )
}

/// Largest degree any node can have in a consolidated heap of `len` elements.
///
/// This is the largest `k` with `F(k+2) <= len`, which equals `⌊log_φ(len)⌋`
/// without going through floating point.
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_heap::degree::max_degree;
///
/// assert_eq!(max_degree(0), 0);
/// assert_eq!(max_degree(1), 0);
/// assert_eq!(max_degree(2), 1);
/// assert_eq!(max_degree(3), 2);
/// assert_eq!(max_degree(5), 3);
/// ```
pub fn max_degree(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    // (F(k+2), F(k+3)) starting at k = 0
    let (mut current, mut next) = (1usize, 2usize);
    let mut k = 0;
    while next <= len {
        k += 1;
        match current.checked_add(next) {
            Some(sum) => {
                current = next;
                next = sum;
            }
            None => break,
        }
    }
    k
}

/// Initial number of slots for the consolidation degree table.
#[inline]
pub fn consolidation_slots(len: usize) -> usize {
    max_degree(len) + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_increment() {
        assert_eq!(checked_increment(0), 1);
        assert_eq!(checked_increment(127), 128);
        assert_eq!(checked_increment(254), 255);
    }

    #[test]
    #[should_panic(expected = "degree overflow")]
    fn test_checked_increment_overflow() {
        checked_increment(255);
    }

    #[test]
    fn test_max_degree_matches_fibonacci_thresholds() {
        // F(2..) = 1, 2, 3, 5, 8, 13, 21
        let thresholds = [1usize, 2, 3, 5, 8, 13, 21];
        for (k, &size) in thresholds.iter().enumerate() {
            assert_eq!(max_degree(size), k, "size {}", size);
            if size > 1 {
                assert_eq!(max_degree(size - 1), k - 1, "size {}", size - 1);
            }
        }
    }

    #[test]
    fn test_max_degree_huge() {
        // F(93) is the largest Fibonacci number below 2^64
        assert_eq!(max_degree(usize::MAX), if usize::BITS == 64 { 91 } else { 45 });
        assert!(usize::from(MAX_DEGREE) > max_degree(usize::MAX));
    }

    #[test]
    fn test_max_degree_close_to_log_phi() {
        let phi = (1.0 + 5f64.sqrt()) / 2.0;
        for len in [10usize, 100, 1_000, 10_000, 1_000_000] {
            let bound = ((len as f64).ln() / phi.ln()).floor() as usize;
            assert!(max_degree(len) <= bound, "len {}", len);
        }
    }

    #[test]
    fn test_consolidation_slots() {
        assert_eq!(consolidation_slots(0), 2);
        assert_eq!(consolidation_slots(8), 6);
    }
}
