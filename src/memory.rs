//! Heap C strings handed across the FFI, and their release path.
//!
//! Every string this runtime returns to generated code is allocated here,
//! and a string produced by this crate's allocator can only be released by
//! coming back through `__freeString`, never by the host C library's `free`.

use std::ffi::{CStr, CString, c_char};
use std::ptr;

use crate::lsan;

/// The one process-wide empty string, returned by `readString` on input
/// exhaustion. Immutable, never freed.
static EMPTY_STRING: &CStr = c"";

/// Pointer to the static empty sentinel.
pub(crate) fn empty_string() -> *mut c_char {
    EMPTY_STRING.as_ptr().cast_mut()
}

/// Whether `ptr` is the sentinel. Identity is by address, not content: an
/// empty string built by `__concat` is an ordinary caller-owned allocation.
pub(crate) fn is_sentinel(ptr: *const c_char) -> bool {
    ptr::eq(ptr, EMPTY_STRING.as_ptr())
}

/// Move `bytes` into a fresh NUL-terminated heap allocation and hand the
/// pointer to the caller.
///
/// Interior NULs truncate the string at the first NUL: bytes past it would
/// be unreachable through the C representation.
pub(crate) fn heap_c_string(mut bytes: Vec<u8>) -> *mut c_char {
    if let Some(nul) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(nul);
    }
    // No interior NULs remain after the truncation above.
    let string = unsafe { CString::from_vec_unchecked(bytes) };
    let len = string.as_bytes().len();
    let ptr = string.into_raw();
    lsan::record(ptr, len);
    ptr
}

/// View a borrowed C string as bytes; null reads as empty.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned slice.
pub(crate) unsafe fn cstr_bytes<'a>(ptr: *const c_char) -> &'a [u8] {
    if ptr.is_null() {
        return &[];
    }
    unsafe { CStr::from_ptr(ptr) }.to_bytes()
}

/// Release a string previously returned by `readString` or `__concat`.
///
/// Null and the static sentinel are ignored. With leak tracking active,
/// releasing a pointer the runtime never handed out is reported and aborts.
///
/// # Safety
///
/// `s` must be null, the sentinel, or a pointer obtained from this runtime
/// that has not been released before.
#[unsafe(export_name = "__freeString")]
pub unsafe extern "C" fn free_string(s: *mut c_char) {
    if s.is_null() || is_sentinel(s) {
        return;
    }
    lsan::forget(s);
    drop(unsafe { CString::from_raw(s) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn sentinel_is_empty_and_stable() {
        let a = empty_string();
        let b = empty_string();
        assert_eq!(a, b);
        assert!(is_sentinel(a));
        assert_eq!(unsafe { cstr_bytes(a) }, b"");
    }

    #[test]
    #[serial]
    fn heap_string_roundtrip() {
        let ptr = heap_c_string(b"hello".to_vec());
        assert!(!ptr.is_null());
        assert!(!is_sentinel(ptr));
        assert_eq!(unsafe { cstr_bytes(ptr) }, b"hello");
        unsafe { free_string(ptr) };
    }

    #[test]
    #[serial]
    fn heap_string_truncates_at_interior_nul() {
        let ptr = heap_c_string(b"ab\0cd".to_vec());
        assert_eq!(unsafe { cstr_bytes(ptr) }, b"ab");
        unsafe { free_string(ptr) };
    }

    #[test]
    fn free_ignores_null_and_sentinel() {
        unsafe {
            free_string(ptr::null_mut());
            free_string(empty_string());
            // The sentinel is still usable afterwards.
            assert_eq!(cstr_bytes(empty_string()), b"");
        }
    }

    #[test]
    #[serial]
    fn heap_strings_enter_and_leave_the_ledger() {
        let _guard = lsan::tests_enable();
        let before = lsan::outstanding();
        let ptr = heap_c_string(b"tracked".to_vec());
        assert_eq!(lsan::outstanding(), before + 1);
        unsafe { free_string(ptr) };
        assert_eq!(lsan::outstanding(), before);
    }
}
