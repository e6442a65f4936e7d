//! Shared primitive ids, extents, and media enums.

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Zero-based position of an operation inside its log.
pub type OpIndex = usize;

/// Which kind of document a command or backend belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Pixel images.
    Raster,
    /// Path drawings.
    Vector,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raster => f.write_str("raster"),
            Self::Vector => f.write_str("vector"),
        }
    }
}

/// Largest raster a record or render may produce, in pixels.
///
/// At four bytes per pixel this caps a single buffer at 1 GiB.
pub const MAX_PIXELS: u64 = 1 << 28;

/// Width and height of a document, in pixels (raster) or user units (vector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extent {
    /// Horizontal size.
    pub width: u32,
    /// Vertical size.
    pub height: u32,
}

impl Extent {
    /// Builds an extent from its two sides.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub const fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when a buffer of this size stays within [`MAX_PIXELS`].
    pub const fn within_budget(&self) -> bool {
        self.pixels() <= MAX_PIXELS
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Read-only document metadata; fetching it never records an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaInfo {
    /// Live backend width.
    pub width: u32,
    /// Live backend height.
    pub height: u32,
    /// Encoded format name, when known.
    pub format: Option<String>,
    /// Source path, when the document was opened from a file.
    pub path: Option<PathBuf>,
    /// Distinct colours in the live pixels; rasters only.
    pub colors: Option<u64>,
}
