//! The segregated-list table and LIFO free-list maintenance
//! (`SPEC_FULL.md` §3's table, §4.3).
//!
//! The table is the first `NUM_CLASSES * 4` bytes of the heap: one `Offset`
//! head per size class. `insert` always makes the new block the head of its
//! class (LIFO — recently freed blocks are likely cache-hot); `delete`
//! stitches around a block wherever it sits in its class's list. Both are O(1).

use crate::block::{self, BlockRef};
use crate::heap::{HeapProvider, HeapView, Offset, NULL};
use crate::sizeclass::{class_of, NUM_CLASSES};

/// Byte offset, from heap base, of the table head for `class`.
fn head_offset(class: usize) -> Offset {
    (class as Offset) * 4
}

/// Total size in bytes of the segregated-list table at the heap base.
pub const TABLE_SIZE: usize = NUM_CLASSES * 4;

/// Reads the head offset of `class`'s free list.
pub(crate) fn head<P: HeapProvider>(view: &HeapView<P>, class: usize) -> Offset {
    view.read_u32(head_offset(class))
}

fn set_head<P: HeapProvider>(view: &mut HeapView<P>, class: usize, value: Offset) {
    view.write_u32(head_offset(class), value);
}

/// Resets every class head to null. Called once by `init`.
pub(crate) fn clear_all<P: HeapProvider>(view: &mut HeapView<P>) {
    for class in 0..NUM_CLASSES {
        set_head(view, class, NULL);
    }
}

/// Inserts `bp` (of `size` bytes) at the head of its size class's free list.
pub(crate) fn insert<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef, size: usize) {
    let class = class_of(size);
    let old_head = head(view, class);

    block::write_succ(view, bp, old_head);
    block::write_pred(view, bp, NULL);
    if old_head != NULL {
        block::write_pred(view, BlockRef(old_head), bp.0);
    }
    set_head(view, class, bp.0);
}

/// Removes `bp` (of `size` bytes) from its size class's free list.
///
/// `size` must be the size `bp` was inserted under — the size a free block
/// carries never changes without first being deleted and reinserted.
pub(crate) fn delete<P: HeapProvider>(view: &mut HeapView<P>, bp: BlockRef, size: usize) {
    let class = class_of(size);
    let pred = block::read_pred(view, bp);
    let succ = block::read_succ(view, bp);

    if pred != NULL {
        block::write_succ(view, BlockRef(pred), succ);
    } else {
        set_head(view, class, succ);
    }
    if succ != NULL {
        block::write_pred(view, BlockRef(succ), pred);
    }
}

/// Iterator over one size class's free list, head to tail.
pub(crate) struct ClassIter<'a, 'h, P: HeapProvider> {
    view: &'a HeapView<'h, P>,
    current: Offset,
}

impl<'a, 'h, P: HeapProvider> Iterator for ClassIter<'a, 'h, P> {
    type Item = BlockRef;

    fn next(&mut self) -> Option<BlockRef> {
        if self.current == NULL {
            return None;
        }
        let bp = BlockRef(self.current);
        self.current = block::read_succ(self.view, bp);
        Some(bp)
    }
}

pub(crate) fn iter_class<'a, 'h, P: HeapProvider>(view: &'a HeapView<'h, P>, class: usize) -> ClassIter<'a, 'h, P> {
    ClassIter { view, current: head(view, class) }
}
