//! Black-box end-to-end scenarios driven entirely through the public API,
//! each built over its own independent `FixedHeap` reservation.

use segalloc::{Allocator, FixedHeap};

fn allocator(capacity: usize) -> Allocator<FixedHeap> {
    let mut alloc = Allocator::new(FixedHeap::new(capacity));
    alloc.init().expect("fixed heap should accommodate init's request");
    alloc
}

#[test]
fn coalesce_forward_reclaims_both_neighbours() {
    let mut alloc = allocator(1 << 16);

    let a = alloc.malloc(24);
    let b = alloc.malloc(24);
    assert!(!a.is_null() && !b.is_null());
    assert!((b as usize) > (a as usize));

    alloc.free(a);
    alloc.free(b);
    assert!(alloc.check());

    // The merged a+b region should satisfy a request too big for either alone.
    let merged = alloc.malloc(40);
    assert_eq!(merged, a);
    assert!(alloc.check());
}

#[test]
fn best_fit_picks_the_tightest_class_member() {
    let mut alloc = allocator(1 << 16);

    // Spacers keep the three candidate blocks from coalescing with each other.
    let a = alloc.malloc(48 - 8);
    let _spacer1 = alloc.malloc(16);
    let b = alloc.malloc(64 - 8);
    let _spacer2 = alloc.malloc(16);
    let c = alloc.malloc(56 - 8);
    let _spacer3 = alloc.malloc(16);

    alloc.free(a);
    alloc.free(b);
    alloc.free(c);
    assert!(alloc.check());

    let fit = alloc.malloc(40);
    assert_eq!(fit, a, "the 48-byte block is the tightest fit for a 40-byte request");
}

#[test]
fn realloc_absorbs_a_following_free_block_without_moving() {
    let mut alloc = allocator(1 << 16);

    let p = alloc.malloc(32);
    let q = alloc.malloc(32);
    alloc.free(q);

    let grown = alloc.realloc(p, 56);
    assert_eq!(grown, p, "absorbing the following free block must not move the allocation");
    assert!(alloc.check());
}

#[test]
fn realloc_extends_the_last_block_at_the_heap_tail() {
    let mut alloc = allocator(1 << 20);

    // `malloc(4088)` rounds to `asize = 4096`, the exact size of the
    // post-init free block, so it is consumed whole with no split: `p` is
    // left as the heap's only block, with the epilogue immediately after it
    // and no free block anywhere for realloc to absorb instead. With that
    // precondition, growing past the original size and getting the same
    // pointer back can only mean the heap was extended in place at the tail.
    let p = alloc.malloc(4088);
    let grown = alloc.realloc(p, 8192);
    assert_eq!(
        grown, p,
        "with no free block to absorb, growing in place must extend the heap's tail, not relocate"
    );
    assert!(alloc.check());

    unsafe {
        for i in 0..8192u32 {
            grown.add(i as usize).write((i % 256) as u8);
        }
        for i in 0..8192u32 {
            assert_eq!(grown.add(i as usize).read(), (i % 256) as u8);
        }
    }
}

#[test]
fn realloc_falls_back_to_copy_when_neighbours_are_unavailable() {
    let mut alloc = allocator(1 << 16);

    let p = alloc.malloc(32);
    unsafe {
        for i in 0..32u8 {
            p.add(i as usize).write(i);
        }
    }
    // Pin the following block allocated so realloc cannot absorb or extend in place.
    let _pin = alloc.malloc(32);

    let moved = alloc.realloc(p, 4096);
    assert_ne!(moved, p, "with no absorbable neighbour and no tail room, realloc must relocate");
    unsafe {
        for i in 0..24u8 {
            assert_eq!(moved.add(i as usize).read(), i, "bytes must survive the copy");
        }
    }
    assert!(alloc.check());
}

#[test]
fn heap_stays_consistent_across_a_mixed_workload() {
    let mut alloc = allocator(1 << 18);
    let mut live = Vec::new();

    for round in 0..64 {
        let size = 8 + (round % 13) * 16;
        let ptr = alloc.malloc(size);
        assert!(!ptr.is_null());
        live.push(ptr);

        if round % 3 == 0 {
            if let Some(victim) = live.pop() {
                alloc.free(victim);
            }
        }
    }

    for ptr in live {
        alloc.free(ptr);
    }

    assert!(alloc.check());
}
