//! Consistency checker: a whole-heap and whole-free-list invariant audit
//! (`SPEC_FULL.md` §4.8).
//!
//! This is a debug-time tool, not a recoverable-error path (§7): any
//! violation panics with a diagnostic naming the offending offset. A
//! successful audit returns `true`.

use tracing::error;

use crate::block::{self, BlockRef, MIN_BLOCK_SIZE, PROLOGUE_SIZE};
use crate::freelist::iter_class;
use crate::heap::{HeapProvider, HeapView, NULL};
use crate::sizeclass::{class_of, NUM_CLASSES};

/// Audits the heap rooted at `prologue_bp`, panicking on the first invariant
/// violation found. Returns `true` if every invariant holds.
pub(crate) fn audit<P: HeapProvider>(view: &HeapView<P>, prologue_bp: BlockRef) -> bool {
    let (prologue_size, prologue_allocated) = block::header(view, prologue_bp);
    if prologue_size != PROLOGUE_SIZE || !prologue_allocated {
        error!(offset = prologue_bp.0, size = prologue_size, "malformed prologue");
        panic!("heap corruption: malformed prologue at offset {}", prologue_bp.0);
    }

    let free_in_heap = walk_heap(view, prologue_bp);
    let free_in_lists = walk_lists(view);

    if free_in_heap != free_in_lists {
        error!(free_in_heap, free_in_lists, "free block count mismatch");
        panic!(
            "heap corruption: heap walk found {free_in_heap} free blocks but free lists found {free_in_lists}"
        );
    }

    true
}

/// Walks blocks from the first real block to the epilogue, checking
/// per-block invariants and counting free blocks along the way.
fn walk_heap<P: HeapProvider>(view: &HeapView<P>, prologue_bp: BlockRef) -> usize {
    let mut bp = block::next_block(prologue_bp, PROLOGUE_SIZE);
    let mut free_count = 0usize;
    let mut prev_was_free = false;

    loop {
        let (size, allocated) = block::header(view, bp);
        if size == 0 {
            // epilogue: zero-size, must be allocated.
            if !allocated {
                panic!("heap corruption: epilogue at offset {} is not marked allocated", bp.0);
            }
            break;
        }

        if bp.0 % 8 != 0 {
            panic!("heap corruption: block at offset {} is not 8-byte aligned", bp.0);
        }
        if size % 8 != 0 || size < MIN_BLOCK_SIZE {
            panic!("heap corruption: block at offset {} has invalid size {}", bp.0, size);
        }

        let (footer_size, footer_allocated) = block::footer(view, bp, size);
        if footer_size != size || footer_allocated != allocated {
            panic!("heap corruption: header/footer mismatch at offset {}", bp.0);
        }

        if !allocated {
            if prev_was_free {
                panic!("heap corruption: two adjacent free blocks ending at offset {}", bp.0);
            }
            free_count += 1;
        }
        prev_was_free = !allocated;

        bp = block::next_block(bp, size);
    }

    free_count
}

/// Walks all 20 free lists, checking membership and symmetry invariants and
/// counting free blocks.
fn walk_lists<P: HeapProvider>(view: &HeapView<P>) -> usize {
    let mut free_count = 0usize;

    for class in 0..NUM_CLASSES {
        for bp in iter_class(view, class) {
            if (bp.0 as usize) >= view.len() {
                panic!("heap corruption: free-list pointer {} lies outside the heap", bp.0);
            }

            let (size, allocated) = block::header(view, bp);
            if allocated {
                panic!("heap corruption: allocated block in free list at offset {}", bp.0);
            }
            if class_of(size) != class {
                panic!(
                    "heap corruption: block of size {} at offset {} is in class {} but belongs in class {}",
                    size,
                    bp.0,
                    class,
                    class_of(size)
                );
            }

            let pred = block::read_pred(view, bp);
            if pred != NULL && block::read_succ(view, BlockRef(pred)) != bp.0 {
                panic!("heap corruption: free-list symmetry violated at offset {}", bp.0);
            }

            free_count += 1;
        }
    }

    free_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Allocator;
    use crate::block::write_tags;
    use crate::heap::FixedHeap;

    #[test]
    fn fresh_heap_passes_audit() {
        let mut alloc = Allocator::new(FixedHeap::new(1 << 16));
        alloc.init().unwrap();
        assert!(alloc.check());
    }

    #[test]
    fn busy_heap_passes_audit() {
        let mut alloc = Allocator::new(FixedHeap::new(1 << 16));
        alloc.init().unwrap();
        let a = alloc.malloc(32);
        let b = alloc.malloc(64);
        alloc.free(a);
        let _ = b;
        assert!(alloc.check());
    }

    #[test]
    #[should_panic(expected = "allocated block in free list")]
    fn corrupted_free_list_entry_is_rejected() {
        let mut alloc = Allocator::new(FixedHeap::new(1 << 16));
        alloc.init().unwrap();
        let p = alloc.malloc(32);
        alloc.free(p);

        // Manually flip the allocated bit of the free block we just created,
        // simulating corruption, without going through the public API.
        alloc.corrupt_flip_allocated_bit_for_test(p);
        alloc.check();
    }
}
