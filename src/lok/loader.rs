//! Binding to an installed engine
//!
//! Mirrors what `LibreOfficeKitInit.h` does in C: find the engine library in
//! the installation's `program/` directory, load it, and call the
//! exported hook to obtain the `LibreOfficeKit` instance.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use libloading::os::unix::{RTLD_GLOBAL, RTLD_LAZY};

use super::ffi::{self, HookFn, HookFn2, LibreOfficeKit};

/// Engine libraries in lookup order. The merged library exists on
/// `--enable-mergelibs` builds (most distributions); otherwise the app
/// library carries the hook.
#[cfg(target_os = "macos")]
pub(crate) const ENGINE_LIBRARIES: &[&str] = &["libmergedlo.dylib", "libsofficeapp.dylib"];
#[cfg(not(target_os = "macos"))]
pub(crate) const ENGINE_LIBRARIES: &[&str] = &["libmergedlo.so", "libsofficeapp.so"];

/// An opened engine library
///
/// Owned by the process-wide engine, which is never dropped: unloading the
/// engine while any of its threads are alive crashes the process.
pub(crate) struct Library {
    inner: libloading::Library,
    path: PathBuf,
}

impl Library {
    /// Find the engine library inside an installation directory
    pub(crate) fn locate(install_path: &Path) -> Option<PathBuf> {
        ENGINE_LIBRARIES
            .iter()
            .map(|name| install_path.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Open the library with `RTLD_LAZY | RTLD_GLOBAL`; the engine resolves
    /// its own UNO components against the global namespace.
    pub(crate) fn open(path: &Path) -> Result<Self, String> {
        // SAFETY: the engine library has no initialisers that depend on the
        // loading thread; the hook itself is only called from `start`.
        let inner = unsafe { libloading::os::unix::Library::open(Some(path), RTLD_LAZY | RTLD_GLOBAL) }
            .map_err(|e| format!("cannot load {}: {}", path.display(), e))?;

        tracing::debug!(library = %path.display(), "Opened engine library");
        Ok(Self {
            inner: inner.into(),
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Start the engine through `libreofficekit_hook_2`, or
    /// `libreofficekit_hook` when the engine is too old to take a profile.
    pub(crate) fn start(
        &self,
        install_path: &Path,
        user_profile_url: Option<&str>,
    ) -> Result<*mut LibreOfficeKit, String> {
        let c_install = CString::new(install_path.as_os_str().as_bytes())
            .map_err(|_| "install path contains a NUL byte".to_string())?;
        let c_profile = user_profile_url
            .map(CString::new)
            .transpose()
            .map_err(|_| "user profile URL contains a NUL byte".to_string())?;

        // SAFETY: both symbols have the signatures declared in `ffi`.
        let instance = match unsafe { self.inner.get::<HookFn2>(ffi::HOOK_2_SYMBOL) } {
            Ok(hook) => {
                let profile_ptr = c_profile
                    .as_ref()
                    .map(|p| p.as_ptr())
                    .unwrap_or(std::ptr::null());
                unsafe { hook(c_install.as_ptr(), profile_ptr) }
            }
            Err(_) => {
                let hook = unsafe { self.inner.get::<HookFn>(ffi::HOOK_SYMBOL) }.map_err(|e| {
                    format!("{} does not export libreofficekit_hook: {}", self.path.display(), e)
                })?;
                if c_profile.is_some() {
                    tracing::warn!("Engine predates libreofficekit_hook_2; ignoring user profile");
                }
                unsafe { hook(c_install.as_ptr()) }
            }
        };

        if instance.is_null() {
            return Err("engine hook returned no instance".to_string());
        }
        Ok(instance)
    }
}
