//! Document endpoints
//!
//! Each request carries one document as its raw body. The upload is staged
//! in a private temporary directory, loaded with the configured deadline,
//! and processed on the blocking pool:
//!
//! - `POST /inspect?ext=docx`: type, parts, tile mode, size and page rectangles
//! - `POST /convert?ext=docx&format=pdf`: the document saved in another format
//! - `POST /text?ext=docx&part=0`: plain text of one page
//! - `POST /thumbnail?ext=docx&part=0&size=256`: PNG rendering of one page

use std::io::Cursor;
use std::path::{Path, PathBuf};

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::error::{AppError, Result};
use crate::office::{Document, DocumentSummary, OfficeError, Rectangle, TileRequest};
use crate::state::AppState;

/// Default MIME type for extracted text
const PLAIN_TEXT: &str = "text/plain;charset=utf-8";
/// Default thumbnail width in pixels
const DEFAULT_THUMBNAIL_SIZE: u32 = 256;
/// Maximum thumbnail width in pixels
const MAX_THUMBNAIL_SIZE: u32 = 2048;

#[derive(Debug, Deserialize)]
pub struct InspectQuery {
    pub ext: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub ext: String,
    pub format: String,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    pub ext: String,
    #[serde(default)]
    pub part: usize,
    #[serde(default)]
    pub mime: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailQuery {
    pub ext: String,
    #[serde(default)]
    pub part: usize,
    #[serde(default = "default_thumbnail_size")]
    pub size: u32,
}

fn default_thumbnail_size() -> u32 {
    DEFAULT_THUMBNAIL_SIZE
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    pub part: usize,
    pub area: Rectangle,
    pub mime_type: String,
    pub text: String,
}

/// Create the documents router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/inspect", post(inspect_document))
        .route("/convert", post(convert_document))
        .route("/text", post(extract_text))
        .route("/thumbnail", post(render_thumbnail))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn inspect_document(
    State(state): State<AppState>,
    Query(query): Query<InspectQuery>,
    body: Bytes,
) -> Result<Json<DocumentSummary>> {
    let summary = with_upload(&state, &query.ext, body, |doc, _| Ok(doc.summary()?)).await?;
    Ok(Json(summary))
}

async fn convert_document(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
    body: Bytes,
) -> Result<Response> {
    let format = validate_extension(&query.format, "format")?;
    let content_type = mime_guess::from_ext(&format).first_or_octet_stream();

    let target = format.clone();
    let data = with_upload(&state, &query.ext, body, move |doc, staging| {
        let output = staging.join(format!("converted.{}", target));
        doc.save_as(&output, &target, query.filter.as_deref())?;
        Ok(std::fs::read(&output)?)
    })
    .await?;

    tracing::info!(format = %format, bytes = data.len(), "Converted document");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"converted.{}\"", format),
        )
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(response)
}

async fn extract_text(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
    body: Bytes,
) -> Result<Json<TextResponse>> {
    let mime_type = query.mime.unwrap_or_else(|| PLAIN_TEXT.to_string());
    let part = query.part;

    let response = with_upload(&state, &query.ext, body, move |doc, _| {
        let area = page_area(doc, part)?;
        doc.select_rectangle(&area)?;
        let text = doc.text_selection(&mime_type);
        doc.reset_text_selection()?;

        Ok(TextResponse {
            part,
            area,
            mime_type,
            text: text?,
        })
    })
    .await?;

    Ok(Json(response))
}

async fn render_thumbnail(
    State(state): State<AppState>,
    Query(query): Query<ThumbnailQuery>,
    body: Bytes,
) -> Result<Response> {
    let size = query.size.clamp(1, MAX_THUMBNAIL_SIZE);
    let part = query.part;

    let png = with_upload(&state, &query.ext, body, move |doc, _| {
        let area = page_area(doc, part)?;
        doc.initialize_for_rendering("")?;
        let tile = doc.paint_tile(&TileRequest::fit_width(area, size)?)?;

        let mut png = Vec::new();
        tile.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| AppError::Internal(format!("PNG encoding failed: {}", e)))?;
        Ok(png)
    })
    .await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(png))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(response)
}

/// Stage `body`, load it with the configured deadline and run `work` on the
/// blocking pool. The document is destroyed before its staging directory.
async fn with_upload<F, T>(state: &AppState, ext: &str, body: Bytes, work: F) -> Result<T>
where
    F: FnOnce(&Document, &Path) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let ext = validate_extension(ext, "ext")?;
    if body.is_empty() {
        return Err(AppError::BadRequest("Request body is empty".to_string()));
    }

    let staging = tempfile::Builder::new().prefix("officekit-").tempdir()?;
    let input = stage(&staging, &ext, &body).await?;
    tracing::debug!(path = %input.display(), bytes = body.len(), "Staged upload");

    let doc = state
        .office()
        .load_document_safe(&input, state.load_timeout())
        .await?;

    tokio::task::spawn_blocking(move || {
        let result = work(&doc, staging.path());
        drop(doc);
        drop(staging);
        result
    })
    .await
    .map_err(|e| AppError::Internal(format!("Document task failed: {}", e)))?
}

async fn stage(staging: &TempDir, ext: &str, body: &[u8]) -> Result<PathBuf> {
    let input = staging.path().join(format!("upload.{}", ext));
    tokio::fs::write(&input, body).await?;
    Ok(input)
}

/// Rectangle of page `part`, or a bad request if the document has no such page
fn page_area(doc: &Document, part: usize) -> Result<Rectangle> {
    let pages = doc.part_page_rectangles()?;
    pages.get(part).copied().ok_or_else(|| {
        OfficeError::InvalidArgument(format!(
            "Page {} not found. Document has {} pages",
            part,
            pages.len()
        ))
        .into()
    })
}

/// File extensions end up in paths and engine filter names
fn validate_extension(value: &str, name: &str) -> Result<String> {
    let value = value.trim().trim_start_matches('.').to_ascii_lowercase();
    let valid = !value.is_empty()
        && value.len() <= 10
        && value.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(value)
    } else {
        Err(AppError::BadRequest(format!(
            "Query parameter '{}' must be a short alphanumeric file extension",
            name
        )))
    }
}
