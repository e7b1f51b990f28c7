//! Error taxonomy for the allocator's setup path.
//!
//! `malloc`/`free`/`realloc` keep the classical POSIX, null-on-failure shape
//! (see `SPEC_FULL.md` §7) — that's the allocator contract itself, not an
//! omission. Only `init`, which can fail exactly once before any allocation
//! has happened, gets a typed error.

use thiserror::Error;

/// Failure surfaced when the heap provider refuses to extend the heap.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum AllocError {
    /// The heap provider could not grow the heap by the requested amount.
    #[error("heap provider refused to extend the heap by {requested} bytes")]
    OutOfMemory {
        /// Number of bytes that were requested and refused.
        requested: usize,
    },
}
