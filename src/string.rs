//! String entry points for generated code.
//!
//! Kestrel strings cross the FFI as NUL-terminated C strings. Both
//! operations accept null pointers: a null operand reads as the empty
//! string, and only null compares equal to null.

use std::ffi::{c_char, c_int};

use crate::memory;

/// Concatenate two strings into a fresh caller-owned heap string.
///
/// Neither input is mutated. Allocation failure aborts the process (host
/// allocator semantics).
///
/// # Safety
///
/// `a` and `b` must each be null or point to a NUL-terminated string.
#[unsafe(export_name = "__concat")]
pub unsafe extern "C" fn concat(a: *const c_char, b: *const c_char) -> *mut c_char {
    let a = unsafe { memory::cstr_bytes(a) };
    let b = unsafe { memory::cstr_bytes(b) };
    let mut joined = Vec::with_capacity(a.len() + b.len());
    joined.extend_from_slice(a);
    joined.extend_from_slice(b);
    memory::heap_c_string(joined)
}

/// Byte-wise string equality: 1 iff identical content and length.
///
/// Pure; no side effects.
///
/// # Safety
///
/// `a` and `b` must each be null or point to a NUL-terminated string.
#[unsafe(export_name = "__strEq")]
pub unsafe extern "C" fn str_eq(a: *const c_char, b: *const c_char) -> c_int {
    if a.is_null() || b.is_null() {
        return c_int::from(a.is_null() && b.is_null());
    }
    let eq = unsafe { memory::cstr_bytes(a) } == unsafe { memory::cstr_bytes(b) };
    c_int::from(eq)
}
