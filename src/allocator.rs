//! The public API: `init`/`malloc`/`free`/`realloc` (`SPEC_FULL.md` §4.6/§4.7).
//!
//! `Allocator<P>` is the explicit value the teacher's implicit global state
//! becomes (`SPEC_FULL.md` §9, "Global allocator state"): it owns its
//! [`HeapProvider`] outright, so independent tests can run independent
//! allocators over independent heaps.

use std::ptr;

use tracing::{debug, instrument, warn};

use crate::align::align_dword;
use crate::block::{self, BlockRef, MIN_BLOCK_SIZE, PROLOGUE_SIZE};
use crate::check;
use crate::coalesce::coalesce;
use crate::config::AllocatorConfig;
use crate::error::AllocError;
use crate::freelist::{self, TABLE_SIZE};
use crate::heap::{HeapProvider, HeapView, Offset};
use crate::placement::{find_fit, place};

/// Size of the four-word pad/prologue/initial-epilogue preamble written by `init`.
const PREAMBLE_SIZE: usize = 16;

/// Total bytes `init` requests from the heap provider before priming the heap.
const INIT_REQUEST: usize = TABLE_SIZE + PREAMBLE_SIZE;

/// Payload offset of the synthetic prologue block. Fixed once `init` has run.
const PROLOGUE_BP: Offset = (TABLE_SIZE as Offset) + 8;

/// A segregated free-list allocator over a heap obtained from `P`.
pub struct Allocator<P: HeapProvider> {
    provider: P,
    config: AllocatorConfig,
    initialized: bool,
}

impl<P: HeapProvider> Allocator<P> {
    /// Builds an allocator with the default [`AllocatorConfig`]. Call [`Allocator::init`]
    /// before any other operation.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, AllocatorConfig::default())
    }

    /// Builds an allocator with a custom [`AllocatorConfig`].
    pub fn with_config(provider: P, config: AllocatorConfig) -> Self {
        Self { provider, config, initialized: false }
    }

    /// Initializes the segregated-list table, prologue/epilogue preamble, and
    /// primes the heap with `config.initial_extension` bytes.
    ///
    /// Must be called once before any other operation; calling it again on a
    /// fresh provider (one that has not yet had `init` run against it) is
    /// permitted.
    #[instrument(level = "info", skip(self))]
    pub fn init(&mut self) -> Result<(), AllocError> {
        {
            let mut view = HeapView::new(&mut self.provider);
            let base = view.extend(INIT_REQUEST)?;
            debug_assert_eq!(base, 0, "init must be the first extension of a fresh heap");

            freelist::clear_all(&mut view);

            let prologue = BlockRef(PROLOGUE_BP);
            block::write_tags(&mut view, prologue, PROLOGUE_SIZE, true);
            let epilogue = block::next_block(prologue, PROLOGUE_SIZE);
            block::write_epilogue(&mut view, epilogue);
        }

        self.initialized = true;
        debug!(initial_extension = self.config.initial_extension, "priming heap");
        self.extend_heap(self.config.initial_extension)?;
        Ok(())
    }

    /// Allocates at least `size` bytes, returning an 8-byte-aligned pointer,
    /// or null on `size == 0` or allocator failure.
    #[instrument(level = "debug", skip(self))]
    pub fn malloc(&mut self, size: usize) -> *mut u8 {
        if size == 0 {
            return ptr::null_mut();
        }
        let asize = Self::block_size_for(size);

        let fit = {
            let view = HeapView::new(&mut self.provider);
            find_fit(&view, asize)
        };

        let bp = match fit {
            Some(bp) => bp,
            None => {
                let extend_amount = asize.max(self.config.min_extension);
                match self.extend_heap(extend_amount) {
                    Ok(bp) => bp,
                    Err(err) => {
                        warn!(?err, size, "malloc failed: heap provider refused to extend");
                        return ptr::null_mut();
                    }
                }
            }
        };

        let mut view = HeapView::new(&mut self.provider);
        place(&mut view, bp, asize);
        self.payload_ptr(bp)
    }

    /// Frees a block previously returned by [`Allocator::malloc`]/[`Allocator::realloc`].
    /// `ptr == null` is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn free(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let bp = self.block_of(ptr);
        let mut view = HeapView::new(&mut self.provider);
        let (size, _) = block::header(&view, bp);
        block::write_tags(&mut view, bp, size, false);
        coalesce(&mut view, bp);
    }

    /// Resizes a block in place where possible, falling back to
    /// allocate-copy-free. See `SPEC_FULL.md` §4.7 for the three in-place
    /// policies, tried in order.
    #[instrument(level = "debug", skip(self))]
    pub fn realloc(&mut self, ptr: *mut u8, size: usize) -> *mut u8 {
        if ptr.is_null() {
            return self.malloc(size);
        }
        if size == 0 {
            self.free(ptr);
            return ptr::null_mut();
        }

        let bp = self.block_of(ptr);
        let new_size = Self::block_size_for(size);

        let mut view = HeapView::new(&mut self.provider);
        let (old_size, _) = block::header(&view, bp);

        // Policy 1: shrink or equal — keep the buffer, never split.
        if new_size <= old_size {
            debug!(offset = bp.0, old_size, new_size, "realloc: shrink/equal in place");
            return ptr;
        }

        let next = block::next_block(bp, old_size);
        let (next_size, next_allocated) = block::header(&view, next);

        // Policy 2: absorb a following free block, no split of the surplus.
        if !next_allocated && next_size > 0 && old_size + next_size >= new_size {
            debug!(offset = bp.0, old_size, next_size, new_size, "realloc: absorbing next free block");
            freelist::delete(&mut view, next, next_size);
            block::write_tags(&mut view, bp, old_size + next_size, true);
            return ptr;
        }

        // Policy 3: `next` is the epilogue — grow the heap at the tail.
        if next_allocated && next_size == 0 {
            let grow_by = new_size - old_size;
            debug!(offset = bp.0, old_size, new_size, grow_by, "realloc: extending heap at tail");
            match view.extend(grow_by) {
                Ok(returned) => {
                    debug_assert_eq!(returned, next.0, "tail growth must start exactly at the epilogue");
                    block::write_tags(&mut view, bp, new_size, true);
                    let epilogue = block::next_block(bp, new_size);
                    block::write_epilogue(&mut view, epilogue);
                    return ptr;
                }
                Err(err) => {
                    warn!(?err, "realloc: tail extension failed");
                    return ptr::null_mut();
                }
            }
        }

        drop(view);

        // Fallback: allocate, copy, free.
        debug!(offset = bp.0, old_size, new_size, "realloc: falling back to malloc+copy+free");
        let new_ptr = self.malloc(size);
        if new_ptr.is_null() {
            return ptr::null_mut();
        }
        let new_bp = self.block_of(new_ptr);
        {
            let mut view = HeapView::new(&mut self.provider);
            view.copy_bytes(bp.0, new_bp.0, old_size - 2 * 4);
        }
        self.free(ptr);
        new_ptr
    }

    /// Runs the consistency checker over the whole heap. Panics with a
    /// diagnostic on the first invariant violation found.
    pub fn check(&mut self) -> bool {
        let view = HeapView::new(&mut self.provider);
        check::audit(&view, BlockRef(PROLOGUE_BP))
    }

    /// Rounds a requested payload size up to a legal block size:
    /// `max(16, round_up_to_8(size + 8))` — 8 bytes of header+footer overhead.
    fn block_size_for(size: usize) -> usize {
        align_dword(size + 2 * 4).max(MIN_BLOCK_SIZE)
    }

    /// Extends the heap by at least `min_bytes`, rounded up to a double-word
    /// multiple, writing the new free block's tags and epilogue, then
    /// coalescing with any free block already at the tail.
    fn extend_heap(&mut self, min_bytes: usize) -> Result<BlockRef, AllocError> {
        let size = align_dword(min_bytes).max(MIN_BLOCK_SIZE);
        let mut view = HeapView::new(&mut self.provider);
        let bp = BlockRef(view.extend(size)?);

        block::write_tags(&mut view, bp, size, false);
        let epilogue = block::next_block(bp, size);
        block::write_epilogue(&mut view, epilogue);

        Ok(coalesce(&mut view, bp))
    }

    fn payload_ptr(&self, bp: BlockRef) -> *mut u8 {
        unsafe { self.provider.lo().add(bp.0 as usize) }
    }

    fn block_of(&self, ptr: *mut u8) -> BlockRef {
        let offset = (ptr as usize) - (self.provider.lo() as usize);
        BlockRef(offset as Offset)
    }

    /// Test-only hook simulating heap corruption: flips the allocated bit of
    /// the free block at `ptr`'s former payload offset without going through
    /// `free`/`malloc`, so the checker can be exercised against corruption it
    /// did not itself cause.
    #[cfg(test)]
    pub(crate) fn corrupt_flip_allocated_bit_for_test(&mut self, ptr: *mut u8) {
        let bp = self.block_of(ptr);
        let mut view = HeapView::new(&mut self.provider);
        let (size, allocated) = block::header(&view, bp);
        block::write_tags(&mut view, bp, size, !allocated);
    }
}
