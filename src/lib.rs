//! # segalloc - A Segregated Free-List Memory Allocator
//!
//! This crate provides a **segregated free-list allocator**: a dynamic
//! allocator that keeps one free list per size class and coalesces adjacent
//! free blocks immediately on every `free`, in the tradition of the classic
//! boundary-tag allocator design.
//!
//! ## Overview
//!
//! Unlike a bump allocator, which never reuses freed memory, a segregated
//! free-list allocator buckets free blocks by size so that `malloc` can go
//! straight to a list of likely-sized candidates instead of scanning the
//! whole heap:
//!
//! ```text
//!   Segregated Free Lists:
//!
//!   class 0  (16B)   ─▶ [free] ─▶ [free] ─▶ null
//!   class 1  (24B)   ─▶ null
//!   class 2  (32B)   ─▶ [free] ─▶ null
//!   ...
//!   class 19 (4096+) ─▶ [free] ─▶ null
//!
//!   Each block carries a boundary tag (header + footer) recording its own
//!   size and allocated bit, so a freed block's neighbours can be located
//!   and merged in O(1) without walking the whole heap.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   segalloc
//!   ├── align      - alignment helpers
//!   ├── error      - AllocError, the typed failure for heap setup
//!   ├── heap       - HeapProvider trait, SbrkHeap, FixedHeap, HeapView
//!   ├── sizeclass  - the 20-bucket size-class index
//!   ├── block      - boundary-tag block layout and accessors
//!   ├── freelist   - the segregated-list table and LIFO list maintenance
//!   ├── placement  - find_fit / place
//!   ├── coalesce   - immediate four-case coalescing
//!   ├── check      - whole-heap consistency auditing
//!   ├── config     - AllocatorConfig, the heap-growth tuning knobs
//!   └── allocator  - Allocator<P>: init / malloc / free / realloc
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segalloc::{Allocator, SbrkHeap};
//!
//! fn main() {
//!     let mut allocator = Allocator::new(SbrkHeap::new());
//!     allocator.init().expect("failed to prime the heap");
//!
//!     unsafe {
//!         let ptr = allocator.malloc(64) as *mut u64;
//!         *ptr = 42;
//!         println!("value: {}", *ptr);
//!         allocator.free(ptr as *mut u8);
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! The heap is obtained from a [`HeapProvider`] — [`SbrkHeap`] extends the
//! process break via `sbrk(2)`; [`FixedHeap`] is a test double over one
//! address-stable reservation. Every block carries a four-byte header and
//! footer recording `(size, allocated)`; free blocks additionally carry a
//! predecessor/successor offset pair used to thread them onto one of 20
//! segregated free lists. See each module's docs for the algorithms.
//!
//! ## Features
//!
//! - **Segregated fits**: `malloc` searches the smallest size class that can
//!   satisfy a request first, falling back to larger classes.
//! - **Immediate coalescing**: `free` merges with free neighbours in O(1)
//!   using boundary tags, never deferring to a sweep pass.
//! - **In-place realloc**: shrinks, absorbs a following free block, or grows
//!   at the heap tail before falling back to allocate-copy-free.
//! - **Pluggable heap source**: production code drives a real `sbrk` heap;
//!   tests drive independent `FixedHeap` reservations.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives.
//! - **32-bit offsets**: every free-list link is a `u32` offset from the
//!   heap's base, bounding any one heap to 4 GiB (see [`heap::Offset`]).
//! - **Never returns memory to the OS**: a fully-freed heap stays mapped.
//!
//! ## Safety
//!
//! Raw pointer arithmetic is confined to one narrow internal boundary type;
//! every other module operates on typed block handles. `malloc`/`free`/
//! `realloc` themselves are safe to call, but like any manual allocator,
//! passing a pointer not obtained from this allocator (or already freed) to
//! `free`/`realloc` is undefined behaviour.

pub mod align;
pub mod allocator;
pub mod config;
pub mod error;
pub mod heap;
mod block;
mod check;
mod coalesce;
mod freelist;
mod placement;
mod sizeclass;

pub use allocator::Allocator;
pub use config::AllocatorConfig;
pub use error::AllocError;
pub use heap::{FixedHeap, HeapProvider, SbrkHeap};
pub use sizeclass::{class_of, NUM_CLASSES};
