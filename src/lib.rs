//! Deferred, serializable edit logs for raster images and vector drawings.
//!
//! Edits are recorded as typed operations, validated up front, and applied to
//! a backend only when the document is rendered. The log can be serialized to
//! JSON at any time and replayed onto another document.
//!
//! # Examples
//!
//! Recording and rendering against an in-memory image:
//! ```
//! use medialog::{
//!     backend::raster::RasterImage,
//!     color::Rgba8,
//!     document::Document,
//!     types::Extent,
//! };
//!
//! let mut doc = Document::new(RasterImage::blank(200, 100, Rgba8::BLACK));
//! doc.crop(0, 0, 100, 100).expect("crop");
//! doc.rotate(90.0).expect("rotate");
//! assert!(doc.brightness(150.0).is_err());
//! assert_eq!(doc.log().len(), 2);
//!
//! let report = doc.render().expect("render");
//! assert_eq!(report.total(), 2);
//! assert_eq!(doc.info().width, 100);
//! assert_eq!(doc.extent(), Extent::new(100, 100));
//! ```
//!
//! Round-tripping a log through JSON and journaling it:
//! ```no_run
//! use medialog::{
//!     document::RasterDocument,
//!     persist::sqlite::SqliteJournal,
//!     wire,
//! };
//!
//! let mut doc = RasterDocument::open_raster("photo.png").expect("open");
//! doc.negate().expect("negate");
//! let json = doc.serialize().expect("serialize");
//! assert_eq!(json, r#"[{"name":"negate","args":[]}]"#);
//!
//! let log = wire::from_json(&json, 1024).expect("parse");
//! let mut journal = SqliteJournal::open("edits.db").expect("open journal");
//! doc.flush_to(&mut journal, "photo").expect("flush");
//! assert_eq!(journal.load_log("photo", 1024).expect("load"), log);
//! ```
#![deny(missing_docs)]

/// Media backends and the renderer.
pub mod backend;
/// Colour string parsing.
pub mod color;
/// Command catalog.
pub mod command;
/// Per-document configuration.
pub mod config;
/// Bounded operation log.
pub mod core;
/// Documents and the record phase.
pub mod document;
/// Argument values and operations.
pub mod op;
/// Journal abstraction and SQLite implementation.
pub mod persist;
/// Shared primitive types and enums.
pub mod types;
/// JSON encoding of operation logs.
pub mod wire;
