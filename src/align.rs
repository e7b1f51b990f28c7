//! Alignment helpers shared by the block layout and the public API.
//!
//! The allocator's unit of accounting is the four-byte [`WORD`]; payloads are
//! rounded up to the eight-byte [`DWORD`] so every returned pointer satisfies
//! the allocator contract's 8-byte alignment requirement.

/// Size of a header/footer/free-list-link slot, in bytes.
pub const WORD: usize = 4;

/// Payload alignment unit, in bytes.
pub const DWORD: usize = 8;

/// Rounds `value` up to the next multiple of `align` (`align` must be a power of two).
#[inline]
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Rounds `value` up to the next multiple of [`DWORD`].
#[inline]
pub const fn align_dword(value: usize) -> usize {
    align_up(value, DWORD)
}
