//! Block layout and tag accessors (`SPEC_FULL.md` §4.1).
//!
//! A block is identified by its **payload offset** `bp` (the offset a
//! `malloc` caller would receive). Given `bp`: the header lies at `bp - 4`,
//! the footer at `bp + size - 8`, the next block at `bp + size`, and the
//! previous block's footer at `bp - 8`. The predecessor free-list slot lives
//! at `bp`, the successor slot at `bp + 4`.
//!
//! The prologue and epilogue are ordinary blocks under this scheme — the
//! prologue is `(8, allocated)`, the epilogue is `(0, allocated)` — so
//! `is_allocated`/`size` checks already treat them correctly as boundaries
//! without a separate sentinel type; iteration code recognizes the epilogue
//! specifically by `size() == 0`.

use crate::heap::{HeapProvider, HeapView, Offset};

/// Size of a header or footer slot, in bytes.
pub const TAG_SIZE: Offset = 4;

/// Smallest legal block size: header + 8 bytes of link space + footer.
pub const MIN_BLOCK_SIZE: usize = 16;

/// Total size of the synthetic prologue block (header + footer, no payload).
pub const PROLOGUE_SIZE: usize = 8;

/// A block, identified by its payload offset.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockRef(pub Offset);

impl BlockRef {
    pub fn header_offset(self) -> Offset {
        self.0 - TAG_SIZE
    }

    pub fn footer_offset(self, size: usize) -> Offset {
        self.0 + size as Offset - 2 * TAG_SIZE
    }

    pub fn pred_offset(self) -> Offset {
        self.0
    }

    pub fn succ_offset(self) -> Offset {
        self.0 + TAG_SIZE
    }
}

fn pack(size: usize, allocated: bool) -> u32 {
    debug_assert_eq!(size % 8, 0, "block size {size} is not a multiple of 8");
    (size as u32) | (allocated as u32)
}

fn unpack_size(word: u32) -> usize {
    (word & !0x7) as usize
}

fn unpack_allocated(word: u32) -> bool {
    word & 1 == 1
}

/// Reads `(size, allocated)` from `bp`'s header.
pub(crate) fn header<P: HeapProvider>(view: &HeapView<P>, bp: BlockRef) -> (usize, bool) {
    let word = view.read_u32(bp.header_offset());
    (unpack_size(word), unpack_allocated(word))
}

/// Reads `(size, allocated)` from `bp`'s footer, given its already-known size.
pub(crate) fn footer<P: HeapProvider>(view: &HeapView<P>, bp: BlockRef, size: usize) -> (usize, bool) {
    let word = view.read_u32(bp.footer_offset(size));
    (unpack_size(word), unpack_allocated(word))
}

/// Writes matching header and footer tags for `bp`.
pub(crate) fn write_tags<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef, size: usize, allocated: bool) {
    let word = pack(size, allocated);
    view.write_u32(bp.header_offset(), word);
    view.write_u32(bp.footer_offset(size), word);
}

/// Writes only the header — used solely for the zero-size epilogue, which has no footer.
pub(crate) fn write_epilogue<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef) {
    view.write_u32(bp.header_offset(), pack(0, true));
}

/// The block immediately after `bp`, given `bp`'s size.
pub(crate) fn next_block(bp: BlockRef, size: usize) -> BlockRef {
    BlockRef(bp.0 + size as Offset)
}

/// The block immediately before `bp`, read via its boundary-tag footer at `bp - 8`.
///
/// Must never be called on the first real block's predecessor boundary
/// without the prologue in place — the prologue's own footer at that
/// position is what makes this well-defined there.
pub(crate) fn prev_block<P: HeapProvider>(view: &HeapView<P>, bp: BlockRef) -> BlockRef {
    let prev_footer_word = view.read_u32(bp.0 - 2 * TAG_SIZE);
    let prev_size = unpack_size(prev_footer_word);
    BlockRef(bp.0 - prev_size as Offset)
}

pub(crate) fn read_pred<P: HeapProvider>(view: &HeapView<P>, bp: BlockRef) -> Offset {
    view.read_u32(bp.pred_offset())
}

pub(crate) fn read_succ<P: HeapProvider>(view: &HeapView<P>, bp: BlockRef) -> Offset {
    view.read_u32(bp.succ_offset())
}

pub(crate) fn write_pred<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef, pred: Offset) {
    view.write_u32(bp.pred_offset(), pred);
}

pub(crate) fn write_succ<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef, succ: Offset) {
    view.write_u32(bp.succ_offset(), succ);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::FixedHeap;

    #[test]
    fn header_footer_round_trip() {
        let mut heap = FixedHeap::new(256);
        heap.extend(256).unwrap();
        let mut view = HeapView::new(&mut heap);

        let bp = BlockRef(64);
        write_tags(&mut view, bp, 32, true);
        assert_eq!(header(&view, bp), (32, true));
        assert_eq!(footer(&view, bp, 32), (32, true));
    }

    #[test]
    fn next_and_prev_agree() {
        let mut heap = FixedHeap::new(256);
        heap.extend(256).unwrap();
        let mut view = HeapView::new(&mut heap);

        let a = BlockRef(64);
        write_tags(&mut view, a, 32, false);
        let b = next_block(a, 32);
        write_tags(&mut view, b, 24, true);

        assert_eq!(b, BlockRef(96));
        assert_eq!(prev_block(&view, b), a);
    }

    #[test]
    fn pred_succ_slots_are_one_word_apart() {
        let mut heap = FixedHeap::new(256);
        heap.extend(256).unwrap();
        let mut view = HeapView::new(&mut heap);

        let bp = BlockRef(64);
        write_pred(&mut view, bp, 0);
        write_succ(&mut view, bp, 200);
        assert_eq!(read_pred(&view, bp), 0);
        assert_eq!(read_succ(&view, bp), 200);
        assert_eq!(bp.succ_offset() - bp.pred_offset(), TAG_SIZE);
    }
}
