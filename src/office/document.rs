//! Loaded document handle
//!
//! Every method enters the engine through its guard; a `Document` keeps the
//! engine alive, so it can never outlive the instance that loaded it.
//! Failures are recorded on the `Office` handle that loaded the document.

use std::ffi::{c_int, c_long};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use super::engine::Engine;
use super::error::{OfficeError, Result};
use super::handle::{c_string, file_url, Diagnostics};
use super::types::{
    parse_rectangles, DocumentSize, DocumentSummary, DocumentType, Rectangle, SelectionAnchor,
    TileMode, TileRequest,
};
use crate::lok::ffi::{LibreOfficeKitDocument, LibreOfficeKitDocumentClass};
use crate::lok::{self, lok_method};

/// Read a document vtable slot or fail with `Unsupported`
macro_rules! doc_method {
    ($doc:expr, $field:ident, $name:literal) => {
        lok_method!($doc.class(), LibreOfficeKitDocumentClass, $field)
            .ok_or(OfficeError::Unsupported($name))
    };
}

/// A document loaded into the engine
pub struct Document {
    raw: *mut LibreOfficeKitDocument,
    engine: Arc<Engine>,
    diagnostics: Diagnostics,
    path: PathBuf,
}

// SAFETY: Document is Send + Sync because:
//
// 1. `raw` is only dereferenced while holding the engine guard (every method
//    and Drop call `self.engine.lock()` first), so calls never overlap.
//
// 2. `engine` is an Arc<Engine>, which is Send + Sync; holding it keeps the
//    engine instance (and therefore `raw`) alive.
//
// 3. Diagnostics and PathBuf are Send + Sync.
unsafe impl Send for Document {}
unsafe impl Sync for Document {}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("path", &self.path).finish()
    }
}

impl Document {
    pub(crate) fn new(
        raw: *mut LibreOfficeKitDocument,
        engine: Arc<Engine>,
        diagnostics: Diagnostics,
        path: PathBuf,
    ) -> Self {
        Self {
            raw,
            engine,
            diagnostics,
            path,
        }
    }

    fn class(&self) -> *const LibreOfficeKitDocumentClass {
        // SAFETY: raw is a live document; callers hold the engine guard.
        unsafe { (*self.raw).class }
    }

    /// Run `op`, recording its failure on the owning handle
    fn recorded<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        self.diagnostics.track(op())
    }

    /// Path the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Document classification
    pub fn document_type(&self) -> Result<DocumentType> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let get_type = doc_method!(self, get_document_type, "getDocumentType")?;
            DocumentType::from_raw(unsafe { get_type(self.raw) })
        })
    }

    /// Number of parts (pages, sheets, slides)
    pub fn parts(&self) -> Result<usize> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let get_parts = doc_method!(self, get_parts, "getParts")?;
            let parts = unsafe { get_parts(self.raw) };
            usize::try_from(parts).map_err(|_| OfficeError::UnknownValue {
                kind: "part count",
                value: parts,
            })
        })
    }

    /// Index of the current part
    pub fn part(&self) -> Result<usize> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let get_part = doc_method!(self, get_part, "getPart")?;
            let part = unsafe { get_part(self.raw) };
            usize::try_from(part).map_err(|_| OfficeError::UnknownValue {
                kind: "part index",
                value: part,
            })
        })
    }

    /// Make `part` the current part
    pub fn set_part(&self, part: usize) -> Result<()> {
        self.recorded(|| {
            let part = to_c_int(part, "part index")?;
            let _session = self.engine.lock();
            let set_part = doc_method!(self, set_part, "setPart")?;
            unsafe { set_part(self.raw, part) };
            Ok(())
        })
    }

    /// Name of a part (sheet or slide name), if it has one
    pub fn part_name(&self, part: usize) -> Result<Option<String>> {
        self.recorded(|| {
            let part = to_c_int(part, "part index")?;
            let _session = self.engine.lock();
            let get_name = doc_method!(self, get_part_name, "getPartName")?;
            let name = unsafe { lok::take_string(get_name(self.raw, part), None) };
            Ok(name.filter(|n| !n.is_empty()))
        })
    }

    /// Bounding rectangle of every page, in twips
    pub fn part_page_rectangles(&self) -> Result<Vec<Rectangle>> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let get_rects = doc_method!(self, get_part_page_rectangles, "getPartPageRectangles")?;
            let rects = unsafe { lok::take_string(get_rects(self.raw), None) };
            parse_rectangles(rects.as_deref().unwrap_or(""))
        })
    }

    /// Channel order of painted tiles
    pub fn tile_mode(&self) -> Result<TileMode> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let get_mode = doc_method!(self, get_tile_mode, "getTileMode")?;
            TileMode::from_raw(unsafe { get_mode(self.raw) })
        })
    }

    /// Extent of the whole document, in twips
    pub fn document_size(&self) -> Result<DocumentSize> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let get_size = doc_method!(self, get_document_size, "getDocumentSize")?;
            let (mut width, mut height): (c_long, c_long) = (0, 0);
            unsafe { get_size(self.raw, &mut width, &mut height) };
            Ok(DocumentSize {
                width: i64::from(width),
                height: i64::from(height),
            })
        })
    }

    /// Prepare the document for painting; `arguments` is the engine's JSON
    /// argument string and may be empty.
    pub fn initialize_for_rendering(&self, arguments: &str) -> Result<()> {
        self.recorded(|| {
            let arguments = c_string(arguments.as_bytes(), "rendering arguments")?;
            let _session = self.engine.lock();
            let initialize = doc_method!(self, initialize_for_rendering, "initializeForRendering")?;
            unsafe { initialize(self.raw, arguments.as_ptr()) };
            Ok(())
        })
    }

    /// Paint a document area onto a new RGBA image
    pub fn paint_tile(&self, request: &TileRequest) -> Result<RgbaImage> {
        self.recorded(|| self.paint(request))
    }

    fn paint(&self, request: &TileRequest) -> Result<RgbaImage> {
        let canvas_width = to_c_int(request.canvas_width as usize, "canvas width")?;
        let canvas_height = to_c_int(request.canvas_height as usize, "canvas height")?;
        let len = (request.canvas_width as usize)
            .checked_mul(request.canvas_height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| OfficeError::InvalidArgument("canvas too large".to_string()))?;
        let mut buffer = vec![0u8; len];

        let mode = {
            let _session = self.engine.lock();
            let paint = doc_method!(self, paint_tile, "paintTile")?;
            let get_mode = doc_method!(self, get_tile_mode, "getTileMode")?;
            unsafe {
                paint(
                    self.raw,
                    buffer.as_mut_ptr(),
                    canvas_width,
                    canvas_height,
                    request.area.x,
                    request.area.y,
                    request.area.width,
                    request.area.height,
                );
            }
            TileMode::from_raw(unsafe { get_mode(self.raw) })?
        };

        if mode == TileMode::Bgra {
            for pixel in buffer.chunks_exact_mut(4) {
                pixel.swap(0, 2);
            }
        }

        RgbaImage::from_raw(request.canvas_width, request.canvas_height, buffer)
            .ok_or_else(|| OfficeError::MalformedResponse("tile buffer size mismatch".to_string()))
    }

    /// Move one end of the text selection to a point in twips
    pub fn set_text_selection(&self, anchor: SelectionAnchor, x: i32, y: i32) -> Result<()> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let set_selection = doc_method!(self, set_text_selection, "setTextSelection")?;
            unsafe { set_selection(self.raw, anchor.to_raw(), x, y) };
            Ok(())
        })
    }

    /// Select everything between a rectangle's top-left and bottom-right
    pub fn select_rectangle(&self, area: &Rectangle) -> Result<()> {
        self.set_text_selection(SelectionAnchor::Start, area.x, area.y)?;
        self.set_text_selection(SelectionAnchor::End, area.right(), area.bottom())
    }

    /// Current selection serialized as `mime_type`
    /// (e.g. `text/plain;charset=utf-8`); empty when nothing is selected.
    pub fn text_selection(&self, mime_type: &str) -> Result<String> {
        self.recorded(|| {
            let mime = c_string(mime_type.as_bytes(), "MIME type")?;
            let _session = self.engine.lock();
            let get_selection = doc_method!(self, get_text_selection, "getTextSelection")?;

            let mut used_mime: *mut std::ffi::c_char = std::ptr::null_mut();
            let text = unsafe { lok::take_string(get_selection(self.raw, mime.as_ptr(), &mut used_mime), None) };
            let used_mime = unsafe { lok::take_string(used_mime, None) };

            if let Some(used) = used_mime.filter(|used| used != mime_type) {
                tracing::debug!(requested = mime_type, %used, "Engine serialized selection with a different MIME type");
            }
            Ok(text.unwrap_or_default())
        })
    }

    /// Clear the selection. Clearing an empty selection is a no-op.
    pub fn reset_text_selection(&self) -> Result<()> {
        self.recorded(|| {
            let _session = self.engine.lock();
            let reset = doc_method!(self, reset_selection, "resetSelection")?;
            unsafe { reset(self.raw) };
            Ok(())
        })
    }

    /// Write the document to `output` in `format` (a filter extension such
    /// as `"docx"` or `"pdf"`). `filter_options` is passed to the engine
    /// untouched.
    pub fn save_as<P: AsRef<Path>>(
        &self,
        output: P,
        format: &str,
        filter_options: Option<&str>,
    ) -> Result<()> {
        self.recorded(|| self.save(output.as_ref(), format, filter_options))
    }

    fn save(&self, output: &Path, format: &str, filter_options: Option<&str>) -> Result<()> {
        let save_failed = |reason: String| OfficeError::SaveFailed {
            path: output.to_path_buf(),
            format: format.to_string(),
            reason,
        };

        let url = file_url(output)?;
        let c_format = c_string(format.as_bytes(), "format")?;
        let c_options = filter_options
            .map(|o| c_string(o.as_bytes(), "filter options"))
            .transpose()?;

        tracing::debug!(path = %self.path.display(), output = %output.display(), format, "Saving document");
        let session = self.engine.lock();
        let save = doc_method!(self, save_as, "saveAs")?;
        let ok = unsafe {
            save(
                self.raw,
                url.as_ptr(),
                c_format.as_ptr(),
                c_options.as_ref().map(|o| o.as_ptr()).unwrap_or(std::ptr::null()),
            )
        };

        if ok == 0 {
            let reason = session
                .error_message()
                .unwrap_or_else(|| "engine reported failure".to_string());
            return Err(save_failed(reason));
        }
        drop(session);

        if !output.exists() {
            return Err(save_failed("engine reported success but wrote no file".to_string()));
        }
        Ok(())
    }

    /// Type, part count, tile mode, size and page rectangles in one call
    pub fn summary(&self) -> Result<DocumentSummary> {
        Ok(DocumentSummary {
            document_type: self.document_type()?,
            parts: self.parts()?,
            tile_mode: self.tile_mode()?,
            size: self.document_size()?,
            pages: self.part_page_rectangles()?,
        })
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        let _session = self.engine.lock();
        if let Some(destroy) = lok_method!(self.class(), LibreOfficeKitDocumentClass, destroy) {
            tracing::debug!(path = %self.path.display(), "Destroying document");
            unsafe { destroy(self.raw) };
        }
    }
}

fn to_c_int(value: usize, what: &str) -> Result<c_int> {
    c_int::try_from(value).map_err(|_| OfficeError::InvalidArgument(format!("{} {} out of range", what, value)))
}
