//! Immediate coalescing: the four prev/next allocated-or-free cases
//! (`SPEC_FULL.md` §4.5).
//!
//! Callers (`free`, `extend_heap`) are expected to have already written
//! `bp`'s own header/footer as free before calling [`coalesce`]; this
//! function is responsible for merging with live neighbours and performing
//! the single free-list insertion of whatever block results.
//!
//! The epilogue always reads as `(0, allocated)` and the prologue always
//! reads as `(8, allocated)`, so the "allocated" arm of each case already
//! terminates coalescing at the heap's edges with no special-casing.

use tracing::trace;

use crate::block::{self, BlockRef};
use crate::freelist;
use crate::heap::{HeapProvider, HeapView};

/// Merges `bp` with any free neighbours and reinserts the resulting block
/// into its size class's free list, returning the (possibly moved) block.
pub(crate) fn coalesce<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef) -> BlockRef {
    let (size, _) = block::header(view, bp);

    let next = block::next_block(bp, size);
    let (next_size, next_allocated) = block::header(view, next);

    let prev = block::prev_block(view, bp);
    let (prev_size, prev_allocated) = block::header(view, prev);

    let (merged_bp, merged_size) = match (prev_allocated, next_allocated) {
        (true, true) => {
            trace!(offset = bp.0, size, "coalesce: no free neighbours");
            (bp, size)
        }
        (true, false) => {
            trace!(offset = bp.0, next = next.0, next_size, "coalesce: merging with next");
            freelist::delete(view, next, next_size);
            (bp, size + next_size)
        }
        (false, true) => {
            trace!(offset = bp.0, prev = prev.0, prev_size, "coalesce: merging with prev");
            freelist::delete(view, prev, prev_size);
            (prev, size + prev_size)
        }
        (false, false) => {
            trace!(offset = bp.0, prev = prev.0, next = next.0, "coalesce: merging with both neighbours");
            freelist::delete(view, prev, prev_size);
            freelist::delete(view, next, next_size);
            (prev, prev_size + size + next_size)
        }
    };

    block::write_tags(view, merged_bp, merged_size, false);
    freelist::insert(view, merged_bp, merged_size);
    merged_bp
}
