//! LibreOfficeKit binding
//!
//! Safe handles over the raw engine in [`crate::lok`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  clone   ┌──────────────┐
//! │    Office    │ ───────► │    Office    │   per-handle diagnostics
//! └──────┬───────┘          └──────┬───────┘
//!        └───────────┬─────────────┘
//!                    ▼
//!        ┌───────────────────────┐
//!        │  Engine (one/process) │  guard: Mutex<()>
//!        └───────────┬───────────┘
//!                    ▼
//!        ┌───────────────────────┐
//!        │ Document (Arc<Engine>)│  every call takes the guard
//!        └───────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use officekit_server::office::{Office, SelectionAnchor};
//!
//! # async fn run() -> officekit_server::office::Result<()> {
//! let office = Office::new("/usr/lib/libreoffice/program/")?;
//! let doc = office
//!     .load_document_safe("report.docx", Duration::from_secs(5))
//!     .await?;
//!
//! let page = doc.part_page_rectangles()?[0];
//! doc.set_text_selection(SelectionAnchor::Start, page.x, page.y)?;
//! doc.set_text_selection(SelectionAnchor::End, page.right(), page.bottom())?;
//! let text = doc.text_selection("text/plain;charset=utf-8")?;
//!
//! doc.save_as("/tmp/report.pdf", "pdf", None)?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

mod document;
mod engine;
mod error;
mod handle;
mod supervisor;
mod types;

pub use document::Document;
pub use error::{OfficeError, Result};
pub use handle::Office;
pub use supervisor::LoadStats;
pub use types::{
    parse_rectangles, DocumentSize, DocumentSummary, DocumentType, Rectangle, SelectionAnchor,
    TileMode, TileRequest, VersionInfo,
};
