//! Tunable knobs for heap-growth behaviour (`SPEC_FULL.md` §4.11).
//!
//! The spec's `init`/`malloc` literals (prime the heap with a 4096-byte
//! extension, never extend by less than 4096 bytes even for a small request)
//! are exposed here rather than hard-coded, so tests and benchmarks can use a
//! much smaller heap without giving up the policy under test.

/// Tunable sizes governing how aggressively the allocator grows the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Bytes requested from the heap provider by `init` to prime the heap.
    pub initial_extension: usize,
    /// Minimum bytes requested per `extend_heap` call triggered by `malloc`.
    pub min_extension: usize,
}

impl AllocatorConfig {
    /// The spec's literal default: prime with 4096 bytes, never extend by less.
    pub const fn new(initial_extension: usize, min_extension: usize) -> Self {
        Self { initial_extension, min_extension }
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self { initial_extension: 4096, min_extension: 4096 }
    }
}
