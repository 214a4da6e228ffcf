//! Low-level LibreOfficeKit access
//!
//! Raw vtable mirrors of the LibreOfficeKit C API and the loader that binds
//! to an installed engine. Nothing here is thread-aware; the `office` module
//! serializes every call through the engine guard.
//!
//! # Vtable versioning
//!
//! LOK vtables grow over releases. Each class starts with `size`, the byte
//! size of the vtable the running engine actually provides, and a slot may
//! only be read when its offset is below that size. [`lok_method!`] applies
//! that rule so an older engine yields `None` instead of garbage.

pub(crate) mod ffi;
pub(crate) mod loader;

pub(crate) use loader::Library;

/// Read a vtable slot, honouring the `size` the engine reported.
///
/// Takes a `*const` class pointer, the class type and the slot name, and
/// evaluates to `Option<fn>`. The pointer must be a live class pointer
/// obtained from the engine.
macro_rules! lok_method {
    ($class:expr, $ty:ty, $field:ident) => {{
        let class: *const $ty = $class;
        // SAFETY: the class pointer comes from the engine and stays valid for
        // its lifetime; slots at or beyond `size` are never read.
        unsafe {
            if ::std::mem::offset_of!($ty, $field) < (*class).size {
                ::std::ptr::addr_of!((*class).$field).read()
            } else {
                None
            }
        }
    }};
}

pub(crate) use lok_method;

use std::ffi::{c_char, CStr};

/// Copy an engine-allocated C string and release it.
///
/// `release` is the engine's own deallocator when it exports one
/// (`freeError`); otherwise the string came from `malloc`/`strdup` and goes
/// back through `free(3)`.
///
/// # Safety
///
/// `ptr` must be null or a NUL-terminated string allocated by the engine that
/// the caller owns.
pub(crate) unsafe fn take_string(
    ptr: *mut c_char,
    release: Option<unsafe extern "C" fn(*mut c_char)>,
) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let value = CStr::from_ptr(ptr).to_string_lossy().into_owned();
    match release {
        Some(free_fn) => free_fn(ptr),
        None => libc::free(ptr.cast()),
    }
    Some(value)
}
