//! Process-wide engine instance and its guard
//!
//! LibreOfficeKit can be started once per process; later hook calls return
//! the same instance and `destroy` cannot be undone. The engine is therefore
//! kept in a process-wide slot and shared by every `Office` handle created
//! for the same installation.
//!
//! The engine is not reentrant. Every call into it goes through
//! [`Engine::lock`], which hands out an [`EngineSession`] holding the guard;
//! raw engine-level calls exist only on the session.

use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::error::{OfficeError, Result};
use super::supervisor::LoadCounters;
use crate::lok::ffi::{LibreOfficeKit, LibreOfficeKitClass, LibreOfficeKitDocument};
use crate::lok::{self, lok_method, Library};

static ENGINE: Mutex<Option<Arc<Engine>>> = Mutex::new(None);

pub(crate) struct Engine {
    raw: *mut LibreOfficeKit,
    library: Library,
    install_path: PathBuf,
    guard: Mutex<()>,
    counters: Arc<LoadCounters>,
}

// SAFETY: Engine is Send + Sync because:
//
// 1. `raw` and the library handle are only dereferenced through an
//    EngineSession (or by a Document holding the same guard), so at most one
//    thread is inside the engine at any time.
//
// 2. LibreOfficeKit itself may be called from any thread as long as calls do
//    not overlap; it takes its own SolarMutex internally.
//
// 3. The remaining fields (PathBuf, parking_lot::Mutex, Arc of atomics) are
//    Send + Sync on their own.
//
// 4. The engine is never destroyed or unloaded, so the pointers stay valid
//    for the life of the process.
unsafe impl Send for Engine {}
unsafe impl Sync for Engine {}

impl Engine {
    /// Get the process engine, starting it on first use.
    ///
    /// `install_path` must already be canonical.
    pub(crate) fn acquire(install_path: &Path, user_profile: Option<&str>) -> Result<Arc<Self>> {
        let mut slot = ENGINE.lock();

        if let Some(engine) = slot.as_ref() {
            if engine.install_path != install_path {
                return Err(OfficeError::InvalidInstallation {
                    path: install_path.to_path_buf(),
                    reason: format!(
                        "engine already running from {}; only one installation per process",
                        engine.install_path.display()
                    ),
                });
            }
            return Ok(Arc::clone(engine));
        }

        let invalid = |reason: String| OfficeError::InvalidInstallation {
            path: install_path.to_path_buf(),
            reason,
        };

        let library_path = Library::locate(install_path)
            .ok_or_else(|| invalid("no LibreOfficeKit library found".to_string()))?;
        let library = Library::open(&library_path).map_err(invalid)?;

        tracing::info!(install_path = %install_path.display(), "Starting LibreOfficeKit");
        let raw = library.start(install_path, user_profile).map_err(invalid)?;

        let engine = Arc::new(Self {
            raw,
            library,
            install_path: install_path.to_path_buf(),
            guard: Mutex::new(()),
            counters: Arc::new(LoadCounters::default()),
        });
        tracing::info!(library = %engine.library.path().display(), "LibreOfficeKit ready");

        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    pub(crate) fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub(crate) fn counters(&self) -> &Arc<LoadCounters> {
        &self.counters
    }

    /// Whether some thread is currently inside the engine
    pub(crate) fn is_locked(&self) -> bool {
        self.guard.is_locked()
    }

    /// Enter the engine. Blocks while another operation is in progress.
    pub(crate) fn lock(&self) -> EngineSession<'_> {
        EngineSession {
            engine: self,
            _guard: self.guard.lock(),
        }
    }

    fn class(&self) -> *const LibreOfficeKitClass {
        // SAFETY: raw is the live instance returned by the hook.
        unsafe { (*self.raw).class }
    }
}

/// Exclusive access to the engine for one logical operation
pub(crate) struct EngineSession<'a> {
    engine: &'a Engine,
    _guard: MutexGuard<'a, ()>,
}

impl EngineSession<'_> {
    /// `documentLoad` / `documentLoadWithOptions`; null on failure
    pub(crate) fn load(
        &self,
        url: &CStr,
        options: Option<&CStr>,
    ) -> Result<*mut LibreOfficeKitDocument> {
        let class = self.engine.class();
        let raw = self.engine.raw;

        let document = match options {
            Some(options) => {
                let load = lok_method!(class, LibreOfficeKitClass, document_load_with_options)
                    .ok_or(OfficeError::Unsupported("documentLoadWithOptions"))?;
                // SAFETY: engine pointer is live; both strings are NUL-terminated.
                unsafe { load(raw, url.as_ptr(), options.as_ptr()) }
            }
            None => {
                let load = lok_method!(class, LibreOfficeKitClass, document_load)
                    .ok_or(OfficeError::Unsupported("documentLoad"))?;
                // SAFETY: engine pointer is live; url is NUL-terminated.
                unsafe { load(raw, url.as_ptr()) }
            }
        };
        Ok(document)
    }

    /// `getError`, if the engine has a message
    pub(crate) fn error_message(&self) -> Option<String> {
        let class = self.engine.class();
        let get_error = lok_method!(class, LibreOfficeKitClass, get_error)?;
        let free_error = lok_method!(class, LibreOfficeKitClass, free_error);

        // SAFETY: engine pointer is live; the returned string is ours to free.
        let message = unsafe { lok::take_string(get_error(self.engine.raw), free_error) };
        message.filter(|m| !m.is_empty())
    }

    /// `getVersionInfo` as raw JSON
    pub(crate) fn version_info(&self) -> Result<String> {
        let class = self.engine.class();
        let get_version = lok_method!(class, LibreOfficeKitClass, get_version_info)
            .ok_or(OfficeError::Unsupported("getVersionInfo"))?;

        // SAFETY: engine pointer is live; the returned string is malloc'ed.
        let raw: *mut c_char = unsafe { get_version(self.engine.raw) };
        unsafe { lok::take_string(raw, None) }
            .ok_or_else(|| OfficeError::MalformedResponse("empty version info".to_string()))
    }
}
