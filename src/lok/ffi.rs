//! `#[repr(C)]` mirrors of `LibreOfficeKit.h` and `LibreOfficeKitEnums.h`
//!
//! Only the prefix of each vtable that this crate can use is declared. The
//! slot order must match the C header exactly; unused slots stay declared so
//! later offsets line up.

#![allow(dead_code)]

use std::ffi::{c_char, c_int, c_long, c_uchar, c_ulonglong, c_void};

/// `LibreOfficeKitCallback`
pub type LokCallback =
    Option<unsafe extern "C" fn(n_type: c_int, payload: *const c_char, data: *mut c_void)>;

#[repr(C)]
pub struct LibreOfficeKit {
    pub class: *mut LibreOfficeKitClass,
}

#[repr(C)]
pub struct LibreOfficeKitClass {
    pub size: usize,

    pub destroy: Option<unsafe extern "C" fn(this: *mut LibreOfficeKit)>,
    pub document_load: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKit,
            url: *const c_char,
        ) -> *mut LibreOfficeKitDocument,
    >,
    pub get_error: Option<unsafe extern "C" fn(this: *mut LibreOfficeKit) -> *mut c_char>,
    pub document_load_with_options: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKit,
            url: *const c_char,
            options: *const c_char,
        ) -> *mut LibreOfficeKitDocument,
    >,
    pub free_error: Option<unsafe extern "C" fn(free: *mut c_char)>,
    pub register_callback: Option<
        unsafe extern "C" fn(this: *mut LibreOfficeKit, callback: LokCallback, data: *mut c_void),
    >,
    pub get_filter_types: Option<unsafe extern "C" fn(this: *mut LibreOfficeKit) -> *mut c_char>,
    pub set_optional_features:
        Option<unsafe extern "C" fn(this: *mut LibreOfficeKit, features: c_ulonglong)>,
    pub set_document_password: Option<
        unsafe extern "C" fn(this: *mut LibreOfficeKit, url: *const c_char, password: *const c_char),
    >,
    pub get_version_info: Option<unsafe extern "C" fn(this: *mut LibreOfficeKit) -> *mut c_char>,
}

#[repr(C)]
pub struct LibreOfficeKitDocument {
    pub class: *mut LibreOfficeKitDocumentClass,
}

#[repr(C)]
pub struct LibreOfficeKitDocumentClass {
    pub size: usize,

    pub destroy: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument)>,
    pub save_as: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            url: *const c_char,
            format: *const c_char,
            filter_options: *const c_char,
        ) -> c_int,
    >,

    pub get_document_type: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument) -> c_int>,
    pub get_parts: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument) -> c_int>,
    pub get_part_page_rectangles:
        Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument) -> *mut c_char>,
    pub get_part: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument) -> c_int>,
    pub set_part: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument, part: c_int)>,
    pub get_part_name:
        Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument, part: c_int) -> *mut c_char>,
    pub set_part_mode: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument, mode: c_int)>,
    pub paint_tile: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            buffer: *mut c_uchar,
            canvas_width: c_int,
            canvas_height: c_int,
            tile_pos_x: c_int,
            tile_pos_y: c_int,
            tile_width: c_int,
            tile_height: c_int,
        ),
    >,
    pub get_tile_mode: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument) -> c_int>,
    pub get_document_size: Option<
        unsafe extern "C" fn(this: *mut LibreOfficeKitDocument, width: *mut c_long, height: *mut c_long),
    >,
    pub initialize_for_rendering:
        Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument, arguments: *const c_char)>,
    pub register_callback: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            callback: LokCallback,
            data: *mut c_void,
        ),
    >,
    pub post_key_event: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            kind: c_int,
            char_code: c_int,
            key_code: c_int,
        ),
    >,
    pub post_mouse_event: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            kind: c_int,
            x: c_int,
            y: c_int,
            count: c_int,
            buttons: c_int,
            modifier: c_int,
        ),
    >,
    pub post_uno_command: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            command: *const c_char,
            arguments: *const c_char,
            notify_when_finished: bool,
        ),
    >,
    pub set_text_selection: Option<
        unsafe extern "C" fn(this: *mut LibreOfficeKitDocument, kind: c_int, x: c_int, y: c_int),
    >,
    pub get_text_selection: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            mime_type: *const c_char,
            used_mime_type: *mut *mut c_char,
        ) -> *mut c_char,
    >,
    pub paste: Option<
        unsafe extern "C" fn(
            this: *mut LibreOfficeKitDocument,
            mime_type: *const c_char,
            data: *const c_char,
            size: usize,
        ) -> bool,
    >,
    pub set_graphic_selection: Option<
        unsafe extern "C" fn(this: *mut LibreOfficeKitDocument, kind: c_int, x: c_int, y: c_int),
    >,
    pub reset_selection: Option<unsafe extern "C" fn(this: *mut LibreOfficeKitDocument)>,
}

// LibreOfficeKitDocumentType
pub const LOK_DOCTYPE_TEXT: c_int = 0;
pub const LOK_DOCTYPE_SPREADSHEET: c_int = 1;
pub const LOK_DOCTYPE_PRESENTATION: c_int = 2;
pub const LOK_DOCTYPE_DRAWING: c_int = 3;
pub const LOK_DOCTYPE_OTHER: c_int = 4;

// LibreOfficeKitTileMode
pub const LOK_TILEMODE_RGBA: c_int = 0;
pub const LOK_TILEMODE_BGRA: c_int = 1;

// LibreOfficeKitSetTextSelectionType
pub const LOK_SETTEXTSELECTION_START: c_int = 0;
pub const LOK_SETTEXTSELECTION_END: c_int = 1;
pub const LOK_SETTEXTSELECTION_RESET: c_int = 2;

/// Entry point exported by newer engines: `(install_path, user_profile_url)`.
pub type HookFn2 =
    unsafe extern "C" fn(install_path: *const c_char, user_profile_url: *const c_char) -> *mut LibreOfficeKit;

/// Entry point exported by every engine: `(install_path)`.
pub type HookFn = unsafe extern "C" fn(install_path: *const c_char) -> *mut LibreOfficeKit;

pub const HOOK_2_SYMBOL: &[u8] = b"libreofficekit_hook_2\0";
pub const HOOK_SYMBOL: &[u8] = b"libreofficekit_hook\0";
