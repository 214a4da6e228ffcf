//! Office handle: one session on an installed engine

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::document::Document;
use super::engine::Engine;
use super::error::{OfficeError, Result};
use super::supervisor::{self, LoadStats};
use super::types::VersionInfo;

/// Last diagnostic message of a handle, shared with its documents
#[derive(Clone, Default)]
pub(crate) struct Diagnostics(Arc<Mutex<Option<String>>>);

impl Diagnostics {
    pub(crate) fn record(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "Recorded engine diagnostic");
        *self.0.lock() = Some(message);
    }

    /// Record the message of a failed result and pass the result on
    pub(crate) fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.record(e.to_string());
        }
        result
    }

    fn get(&self) -> String {
        self.0.lock().clone().unwrap_or_default()
    }
}

/// Handle to a running LibreOfficeKit engine
///
/// Cheap to clone; clones share the engine and the diagnostic message.
/// Handles created separately for the same installation share the engine
/// but keep their own diagnostics.
///
/// Operations on the engine are serialized. A bounded load that timed out
/// keeps the engine busy until it finishes, and every other operation waits
/// for it.
#[derive(Clone)]
pub struct Office {
    engine: Arc<Engine>,
    diagnostics: Diagnostics,
}

impl std::fmt::Debug for Office {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Office")
            .field("install_path", &self.engine.install_path())
            .finish()
    }
}

impl Office {
    /// Bind to the engine installed at `install_path`
    /// (e.g. `/usr/lib/libreoffice/program/`).
    pub fn new<P: AsRef<Path>>(install_path: P) -> Result<Self> {
        Self::start(install_path.as_ref(), None)
    }

    /// Bind to the engine with a dedicated user profile
    /// (a `file://` URL, passed through to the engine).
    pub fn with_user_profile<P: AsRef<Path>>(install_path: P, profile_url: &str) -> Result<Self> {
        Self::start(install_path.as_ref(), Some(profile_url))
    }

    fn start(install_path: &Path, user_profile: Option<&str>) -> Result<Self> {
        let install_path = validate_install_path(install_path)?;
        let engine = Engine::acquire(&install_path, user_profile)?;
        Ok(Self {
            engine,
            diagnostics: Diagnostics::default(),
        })
    }

    /// Canonical installation directory of the engine
    pub fn install_path(&self) -> &Path {
        self.engine.install_path()
    }

    /// Diagnostic message of the last failed operation on this handle,
    /// empty if nothing has failed yet.
    pub fn last_error(&self) -> String {
        self.diagnostics.get()
    }

    /// Load a document, blocking for as long as the engine takes
    pub fn load_document<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        self.load(path.as_ref(), None)
    }

    /// Load a document with engine load options (e.g. `"Language=en-US"`)
    pub fn load_document_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        options: &str,
    ) -> Result<Document> {
        self.load(path.as_ref(), Some(options))
    }

    /// Load a document, giving up after `limit`.
    ///
    /// On `Timeout` the load keeps running in the background and whatever it
    /// produces is discarded. The engine stays busy until it finishes, so the
    /// caller should treat this handle as unavailable meanwhile (see
    /// [`Office::is_busy`]).
    pub async fn load_document_safe<P: AsRef<Path>>(
        &self,
        path: P,
        limit: Duration,
    ) -> Result<Document> {
        let office = self.clone();
        let path = path.as_ref().to_path_buf();
        tracing::debug!(path = %path.display(), ?limit, "Bounded document load");

        supervisor::run_bounded(self.engine.counters(), limit, move || {
            office.load_document(&path)
        })
        .await
        .inspect_err(|e| self.diagnostics.record(e.to_string()))
    }

    /// Whether the engine is executing an operation, including abandoned loads
    pub fn is_busy(&self) -> bool {
        self.engine.is_locked() || self.engine.counters().snapshot().in_flight > 0
    }

    /// Bounded load statistics for the engine
    pub fn load_stats(&self) -> LoadStats {
        self.engine.counters().snapshot()
    }

    /// Engine product and build information
    pub fn version_info(&self) -> Result<VersionInfo> {
        let info = self.engine.lock().version_info().and_then(|json| {
            serde_json::from_str(&json)
                .map_err(|e| OfficeError::MalformedResponse(format!("version info: {}", e)))
        });
        self.diagnostics.track(info)
    }

    fn load(&self, path: &Path, options: Option<&str>) -> Result<Document> {
        self.diagnostics.track(self.load_untracked(path, options))
    }

    fn load_untracked(&self, path: &Path, options: Option<&str>) -> Result<Document> {
        if !path.exists() {
            return Err(OfficeError::DocumentNotFound(path.to_path_buf()));
        }

        let path = path.canonicalize()?;
        let url = file_url(&path)?;
        let options = options.map(|o| c_string(o.as_bytes(), "load options")).transpose()?;

        tracing::debug!(path = %path.display(), "Loading document");
        let session = self.engine.lock();
        let raw = session.load(&url, options.as_deref())?;

        if raw.is_null() {
            let reason = session
                .error_message()
                .unwrap_or_else(|| "engine could not load the document".to_string());
            drop(session);

            tracing::debug!(path = %path.display(), %reason, "Document load failed");
            return Err(OfficeError::DocumentLoadFailed { path, reason });
        }
        drop(session);

        Ok(Document::new(
            raw,
            Arc::clone(&self.engine),
            self.diagnostics.clone(),
            path,
        ))
    }
}

/// Check that a path can be an installation directory and canonicalize it
fn validate_install_path(path: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| OfficeError::InvalidInstallation {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let metadata = std::fs::metadata(path).map_err(|e| invalid(&e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory"));
    }
    path.canonicalize().map_err(|e| invalid(&e.to_string()))
}

pub(crate) fn c_string(bytes: &[u8], what: &str) -> Result<CString> {
    CString::new(bytes).map_err(|_| OfficeError::InvalidArgument(format!("{} contains a NUL byte", what)))
}

/// `file://` URL of a path, percent-encoded so `#`, `%` and spaces survive
/// the engine's URL parsing. Relative paths resolve against the working
/// directory.
pub(crate) fn file_url(path: &Path) -> Result<CString> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut url = String::from("file://");
    for segment in absolute.as_os_str().as_bytes().split(|b| *b == b'/') {
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(&urlencoding::encode_binary(segment));
    }
    if url.len() == "file://".len() {
        url.push('/');
    }
    c_string(url.as_bytes(), "document URL")
}
