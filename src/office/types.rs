//! Binding types
//!
//! Engine enumerations are decoded explicitly: an unknown raw value is an
//! error rather than silently becoming the zero variant.

use std::ffi::c_int;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{OfficeError, Result};
use crate::lok::ffi;

/// Document classification reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Text,
    Spreadsheet,
    Presentation,
    Drawing,
    Other,
}

impl DocumentType {
    pub fn from_raw(value: c_int) -> Result<Self> {
        match value {
            ffi::LOK_DOCTYPE_TEXT => Ok(Self::Text),
            ffi::LOK_DOCTYPE_SPREADSHEET => Ok(Self::Spreadsheet),
            ffi::LOK_DOCTYPE_PRESENTATION => Ok(Self::Presentation),
            ffi::LOK_DOCTYPE_DRAWING => Ok(Self::Drawing),
            ffi::LOK_DOCTYPE_OTHER => Ok(Self::Other),
            other => Err(OfficeError::UnknownValue {
                kind: "document type",
                value: other,
            }),
        }
    }
}

/// Pixel channel order of painted tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileMode {
    Rgba,
    Bgra,
}

impl TileMode {
    pub fn from_raw(value: c_int) -> Result<Self> {
        match value {
            ffi::LOK_TILEMODE_RGBA => Ok(Self::Rgba),
            ffi::LOK_TILEMODE_BGRA => Ok(Self::Bgra),
            other => Err(OfficeError::UnknownValue {
                kind: "tile mode",
                value: other,
            }),
        }
    }
}

/// Which end of a text selection a point moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAnchor {
    Start,
    End,
}

impl SelectionAnchor {
    pub(crate) fn to_raw(self) -> c_int {
        match self {
            Self::Start => ffi::LOK_SETTEXTSELECTION_START,
            Self::End => ffi::LOK_SETTEXTSELECTION_END,
        }
    }
}

/// Rectangle in document coordinates (twips, 1/1440 inch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl FromStr for Rectangle {
    type Err = OfficeError;

    /// Parse `"x, y, width, height"`
    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(OfficeError::MalformedResponse(format!(
                "expected 4 rectangle fields, got {} in {:?}",
                fields.len(),
                s
            )));
        }

        let mut values = [0i32; 4];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| {
                OfficeError::MalformedResponse(format!("invalid rectangle field {:?} in {:?}", field, s))
            })?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}

/// Parse the engine's rectangle list: `"x, y, w, h; x, y, w, h"`.
///
/// An empty string is an empty list. A trailing separator is tolerated.
pub fn parse_rectangles(s: &str) -> Result<Vec<Rectangle>> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Rectangle::from_str)
        .collect()
}

/// Document extent in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSize {
    pub width: i64,
    pub height: i64,
}

/// Paint request: which document area lands on a canvas of which pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRequest {
    /// Canvas width in pixels
    pub canvas_width: u32,
    /// Canvas height in pixels
    pub canvas_height: u32,
    /// Document area to paint, in twips
    pub area: Rectangle,
}

impl TileRequest {
    /// Paint `area` onto a canvas `width` pixels wide, keeping aspect ratio
    pub fn fit_width(area: Rectangle, width: u32) -> Result<Self> {
        if area.is_empty() || width == 0 {
            return Err(OfficeError::InvalidArgument(format!(
                "cannot paint {:?} at width {}",
                area, width
            )));
        }
        let height = (u64::from(width) * area.height as u64 / area.width as u64).max(1);
        let canvas_height = u32::try_from(height).map_err(|_| {
            OfficeError::InvalidArgument(format!("canvas height {} out of range", height))
        })?;
        Ok(Self {
            canvas_width: width,
            canvas_height,
            area,
        })
    }
}

/// Engine build information from `getVersionInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub struct VersionInfo {
    pub product_name: String,
    pub product_version: String,
    #[serde(default)]
    pub product_extension: String,
    #[serde(default)]
    pub build_id: String,
}

/// Everything the engine reports about a loaded document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub document_type: DocumentType,
    pub parts: usize,
    pub tile_mode: TileMode,
    pub size: DocumentSize,
    pub pages: Vec<Rectangle>,
}
