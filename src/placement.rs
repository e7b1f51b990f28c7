//! Placement: `find_fit` and `place` (`SPEC_FULL.md` §4.4).
//!
//! `find_fit` is best-fit *within* the first size class that contains any
//! candidate at all — it does not keep searching larger classes for a
//! strictly tighter fit once a class has yielded one (`SPEC_FULL.md` §9 Open
//! Questions: this is the spec's chosen policy, not an oversight).

use tracing::debug;

use crate::block::{self, BlockRef, MIN_BLOCK_SIZE};
use crate::freelist::{self, iter_class};
use crate::heap::{HeapProvider, HeapView};
use crate::sizeclass::{class_of, NUM_CLASSES};

/// Finds a free block of at least `asize` bytes, preferring the tightest fit
/// within the smallest non-empty class that can satisfy the request.
pub(crate) fn find_fit<P: HeapProvider>(view: &HeapView<P>, asize: usize) -> Option<BlockRef> {
    for class in class_of(asize)..NUM_CLASSES {
        let mut best: Option<(BlockRef, usize)> = None;

        for bp in iter_class(view, class) {
            let (size, _) = block::header(view, bp);
            if size < asize {
                continue;
            }
            let diff = size - asize;
            if diff == 0 {
                debug!(class, offset = bp.0, size, "exact fit");
                return Some(bp);
            }
            let improves = match best {
                Some((_, best_diff)) => diff < best_diff,
                None => true,
            };
            if improves {
                best = Some((bp, diff));
            }
        }

        if let Some((bp, diff)) = best {
            debug!(class, offset = bp.0, diff, "best fit within class");
            return Some(bp);
        }
    }

    debug!(asize, "no fit in any class, caller must extend the heap");
    None
}

/// Places an allocation of `asize` bytes into the free block `bp`, splitting
/// off a remainder free block when the leftover is large enough to be a
/// block on its own.
pub(crate) fn place<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef, asize: usize) {
    let (size, _) = block::header(view, bp);
    freelist::delete(view, bp, size);

    let remainder = size - asize;
    if remainder >= MIN_BLOCK_SIZE {
        debug!(offset = bp.0, asize, remainder, "splitting block");
        block::write_tags(view, bp, asize, true);
        let rest = block::next_block(bp, asize);
        block::write_tags(view, rest, remainder, false);
        freelist::insert(view, rest, remainder);
    } else {
        debug!(offset = bp.0, asize, size, "consuming whole block, no split");
        block::write_tags(view, bp, size, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freelist::clear_all;
    use crate::heap::FixedHeap;

    fn setup(capacity: usize) -> FixedHeap {
        let mut heap = FixedHeap::new(capacity);
        heap.extend(capacity).unwrap();
        heap
    }

    #[test]
    fn find_fit_prefers_exact_match() {
        let mut heap = setup(512);
        let mut view = HeapView::new(&mut heap);
        clear_all(&mut view);

        let a = BlockRef(128);
        block::write_tags(&mut view, a, 48, false);
        freelist::insert(&mut view, a, 48);
        let b = BlockRef(192);
        block::write_tags(&mut view, b, 64, false);
        freelist::insert(&mut view, b, 64);

        assert_eq!(find_fit(&view, 40), Some(a));
    }

    #[test]
    fn find_fit_picks_minimum_diff_within_class() {
        let mut heap = setup(512);
        let mut view = HeapView::new(&mut heap);
        clear_all(&mut view);

        // All three land in the same (48-byte) class; 48 is the tightest >= 40.
        let a = BlockRef(128);
        block::write_tags(&mut view, a, 56, false);
        freelist::insert(&mut view, a, 56);
        let b = BlockRef(192);
        block::write_tags(&mut view, b, 48, false);
        freelist::insert(&mut view, b, 48);

        assert_eq!(find_fit(&view, 40), Some(b));
    }

    #[test]
    fn place_splits_when_remainder_is_large_enough() {
        let mut heap = setup(512);
        let mut view = HeapView::new(&mut heap);
        clear_all(&mut view);

        let bp = BlockRef(128);
        block::write_tags(&mut view, bp, 64, false);
        freelist::insert(&mut view, bp, 64);

        place(&mut view, bp, 32);
        assert_eq!(block::header(&view, bp), (32, true));
        let rest = block::next_block(bp, 32);
        assert_eq!(block::header(&view, rest), (32, false));
    }

    #[test]
    fn place_consumes_whole_block_when_remainder_too_small() {
        let mut heap = setup(512);
        let mut view = HeapView::new(&mut heap);
        clear_all(&mut view);

        let bp = BlockRef(128);
        block::write_tags(&mut view, bp, 40, false);
        freelist::insert(&mut view, bp, 40);

        // remainder would be 8 bytes, below MIN_BLOCK_SIZE: consume whole.
        place(&mut view, bp, 32);
        assert_eq!(block::header(&view, bp), (40, true));
    }
}
