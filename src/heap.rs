//! The heap provider contract and the narrow unsafe boundary ([`HeapView`])
//! through which every other module touches heap bytes.
//!
//! `HeapProvider` is the external collaborator from `SPEC_FULL.md` §6: it owns
//! a contiguous, monotonically extendable byte range and exposes `extend`,
//! `lo`, `hi`. Two implementations are provided: [`SbrkHeap`], grounded on the
//! teacher crate's `libc::sbrk` usage, for production; and [`FixedHeap`], a
//! test double over a single address-stable backing allocation, so tests can
//! run independent allocators without contending over the one process-wide
//! `sbrk` break (`SPEC_FULL.md` §9).

use std::fmt;

use tracing::{debug, error, instrument};

use crate::error::AllocError;

/// A byte offset from a heap's `lo()`, used for every free-list link and
/// table head (`SPEC_FULL.md` §3's resolution of the pointer-size tension).
///
/// `0` is reserved as the null sentinel: it always falls inside the
/// segregated-list table or the prologue, never inside a real block.
pub type Offset = u32;

/// Null sentinel for [`Offset`].
pub const NULL: Offset = 0;

/// The external heap-provider contract (`SPEC_FULL.md` §6).
///
/// Implementors guarantee byte-addressable contiguity between `lo()` and
/// `hi()`, and that `extend` preserves existing bytes.
pub trait HeapProvider {
    /// Grows the heap by exactly `n` bytes at the tail, returning the address
    /// of the first newly added byte, or [`AllocError::OutOfMemory`] if the
    /// provider cannot grow.
    fn extend(&mut self, n: usize) -> Result<*mut u8, AllocError>;

    /// The heap's low address. Fixed for the provider's lifetime.
    fn lo(&self) -> *mut u8;

    /// The heap's current exclusive high address. Advances as `extend` is called.
    fn hi(&self) -> *mut u8;
}

/// Production heap provider, backed by `sbrk(2)` — the teacher crate's
/// strategy for extending the process break.
///
/// `sbrk` is a single process-wide resource; consistent with the allocator's
/// single-client, non-reentrant contract (`SPEC_FULL.md` §5), only one
/// `SbrkHeap` should be actively extending the break at a time.
pub struct SbrkHeap {
    lo: *mut u8,
    hi: *mut u8,
}

impl SbrkHeap {
    /// Creates a provider anchored at the current program break.
    pub fn new() -> Self {
        let probe = unsafe { libc::sbrk(0) } as *mut u8;
        Self { lo: probe, hi: probe }
    }
}

impl Default for SbrkHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapProvider for SbrkHeap {
    #[instrument(level = "debug", skip(self), fields(lo = ?self.lo, hi = ?self.hi))]
    fn extend(&mut self, n: usize) -> Result<*mut u8, AllocError> {
        let old_break = unsafe { libc::sbrk(n as libc::intptr_t) };
        if old_break == usize::MAX as *mut libc::c_void {
            error!(requested = n, "sbrk refused to extend the heap");
            return Err(AllocError::OutOfMemory { requested: n });
        }
        let old_break = old_break as *mut u8;
        self.hi = unsafe { old_break.add(n) };
        debug!(requested = n, new_hi = ?self.hi, "sbrk extended the heap");
        Ok(old_break)
    }

    fn lo(&self) -> *mut u8 {
        self.lo
    }

    fn hi(&self) -> *mut u8 {
        self.hi
    }
}

/// Test/benchmark heap provider over one fixed, address-stable allocation.
///
/// `extend` hands out prefixes of the reservation and fails once it is
/// exhausted; the backing `Box<[u8]>` is never reallocated, so addresses
/// handed to the allocator stay valid for the provider's whole lifetime.
pub struct FixedHeap {
    backing: Box<[u8]>,
    base: *mut u8,
    used: usize,
}

impl FixedHeap {
    /// Reserves `capacity` bytes up front. `extend` calls fail once their
    /// cumulative total would exceed `capacity`.
    pub fn new(capacity: usize) -> Self {
        let mut backing = vec![0u8; capacity].into_boxed_slice();
        let base = backing.as_mut_ptr();
        Self { backing, base, used: 0 }
    }

    /// Total reserved capacity.
    pub fn capacity(&self) -> usize {
        self.backing.len()
    }
}

impl HeapProvider for FixedHeap {
    #[instrument(level = "debug", skip(self))]
    fn extend(&mut self, n: usize) -> Result<*mut u8, AllocError> {
        if self.used.saturating_add(n) > self.backing.len() {
            error!(requested = n, used = self.used, capacity = self.backing.len(), "fixed heap exhausted");
            return Err(AllocError::OutOfMemory { requested: n });
        }
        let addr = unsafe { self.base.add(self.used) };
        self.used += n;
        debug!(requested = n, used = self.used, "fixed heap extended");
        Ok(addr)
    }

    fn lo(&self) -> *mut u8 {
        self.base
    }

    fn hi(&self) -> *mut u8 {
        unsafe { self.base.add(self.used) }
    }
}

/// Narrow unsafe boundary translating [`Offset`]s to raw byte reads/writes
/// over a provider's region (`SPEC_FULL.md` §9's "Raw byte tagging" note).
///
/// Every other module operates on `Offset`-addressed block handles and never
/// touches raw pointers directly; this is the only place in the crate that does.
pub(crate) struct HeapView<'a, P: HeapProvider> {
    provider: &'a mut P,
}

impl<'a, P: HeapProvider> HeapView<'a, P> {
    pub(crate) fn new(provider: &'a mut P) -> Self {
        Self { provider }
    }

    pub(crate) fn base(&self) -> *mut u8 {
        self.provider.lo()
    }

    pub(crate) fn len(&self) -> usize {
        (self.provider.hi() as usize) - (self.provider.lo() as usize)
    }

    /// Reads the word at byte offset `off`.
    ///
    /// # Safety-adjacent invariant
    /// `off + 4` must lie within `[0, len())`; violating this is a logic bug
    /// in a caller, not a recoverable condition, so it is a debug assertion.
    pub(crate) fn read_u32(&self, off: Offset) -> u32 {
        debug_assert!((off as usize) + 4 <= self.len(), "read out of heap bounds at {off}");
        unsafe { (self.base().add(off as usize) as *const u32).read_unaligned() }
    }

    pub(crate) fn write_u32(&mut self, off: Offset, value: u32) {
        debug_assert!((off as usize) + 4 <= self.len(), "write out of heap bounds at {off}");
        unsafe { (self.base().add(off as usize) as *mut u32).write_unaligned(value) }
    }

    /// Copies `len` bytes from payload offset `src` to payload offset `dst`.
    /// Ranges may overlap only in the way `realloc`'s fallback path needs
    /// (disjoint old/new blocks), so a non-overlapping copy is used.
    pub(crate) fn copy_bytes(&mut self, src: Offset, dst: Offset, len: usize) {
        debug_assert!((src as usize) + len <= self.len());
        debug_assert!((dst as usize) + len <= self.len());
        unsafe {
            let src_ptr = self.base().add(src as usize);
            let dst_ptr = self.base().add(dst as usize);
            std::ptr::copy_nonoverlapping(src_ptr, dst_ptr, len);
        }
    }

    /// Extends the underlying provider, returning the offset of the first new byte.
    pub(crate) fn extend(&mut self, n: usize) -> Result<Offset, AllocError> {
        let base = self.base();
        let addr = self.provider.extend(n)?;
        Ok(((addr as usize) - (base as usize)) as Offset)
    }
}

impl fmt::Debug for SbrkHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SbrkHeap").field("lo", &self.lo).field("hi", &self.hi).finish()
    }
}

impl fmt::Debug for FixedHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedHeap")
            .field("base", &self.base)
            .field("used", &self.used)
            .field("capacity", &self.backing.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_heap_extends_monotonically() {
        let mut heap = FixedHeap::new(256);
        let p1 = heap.extend(64).unwrap();
        let p2 = heap.extend(64).unwrap();
        assert_eq!(unsafe { p2.offset_from(p1) }, 64);
        assert_eq!(heap.hi() as usize - heap.lo() as usize, 128);
    }

    #[test]
    fn fixed_heap_rejects_over_capacity() {
        let mut heap = FixedHeap::new(64);
        assert!(heap.extend(32).is_ok());
        assert_eq!(heap.extend(64), Err(AllocError::OutOfMemory { requested: 64 }));
    }

    #[test]
    fn heap_view_round_trips_words() {
        let mut heap = FixedHeap::new(64);
        heap.extend(64).unwrap();
        let mut view = HeapView::new(&mut heap);
        view.write_u32(0, 0xDEAD_BEEF);
        view.write_u32(4, 42);
        assert_eq!(view.read_u32(0), 0xDEAD_BEEF);
        assert_eq!(view.read_u32(4), 42);
    }
}
