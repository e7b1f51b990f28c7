//! Size-class index: maps a block size to one of 20 free-list buckets
//! (`SPEC_FULL.md` §3/§4.2).
//!
//! Classes 0–13 are 8-byte steps up to 128 bytes (minimizing internal
//! fragmentation on small-object-churn workloads); classes 14–19 are
//! geometric (power-of-two-ish) above that.

/// Number of size-class buckets.
pub const NUM_CLASSES: usize = 20;

/// Inclusive upper bound of each class, in ascending order. The last class
/// has no finite upper bound.
const CLASS_BOUNDS: [usize; NUM_CLASSES] = [
    16, 24, 32, 40, 48, 56, 64, 72, 80, 88, 96, 104, 112, 128, 256, 512, 1024, 2048, 4096,
    usize::MAX,
];

/// Returns the index of the size class that `size` belongs to.
///
/// A simple ascending linear scan over 20 entries is the "simple decision
/// tree" the spec calls sufficient — there is no hot path here that would
/// benefit from a branchless or binary-search lookup.
pub fn class_of(size: usize) -> usize {
    CLASS_BOUNDS
        .iter()
        .position(|&bound| size <= bound)
        .unwrap_or(NUM_CLASSES - 1)
}
