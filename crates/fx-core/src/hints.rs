//! Compiler hints
//!
//! Branch prediction, alignment and hot/cold hints are all inert in this
//! build. They exist so call sites keep their annotations and can be wired
//! to real intrinsics later without touching the callers.

/// Hint that `b` is usually true. Returns `b` unchanged.
#[inline(always)]
pub fn likely(b: bool) -> bool {
    b
}

/// Hint that `b` is usually false. Returns `b` unchanged.
#[inline(always)]
pub fn unlikely(b: bool) -> bool {
    b
}

/// Hint that `ptr` is aligned to `align` bytes. Returns `ptr` unchanged.
#[inline(always)]
pub fn assume_aligned<T>(ptr: *mut T, _align: usize) -> *mut T {
    ptr
}

/// Marks the calling branch as rarely taken.
#[cold]
#[inline(never)]
pub fn cold_path() {}

/// Write `value` to every element of `dst`.
#[inline]
pub fn fast_array_set<T: Copy>(dst: &mut [T], value: T) {
    dst.fill(value);
}
