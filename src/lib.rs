//! # esm360
//!
//! A Rust library for converting console (big-endian) ESM plugin files
//! into the little-endian layout expected by PC tooling.
//!
//! ## Overview
//!
//! Console builds store plugin data big-endian with reversed signatures,
//! zlib-compressed record bodies, and an out-of-band streaming-cache
//! region. This library provides:
//!
//! - Schema-driven subrecord conversion over a tiered catalog of several
//!   hundred layouts, with hand-written overrides for the shapes a field
//!   list cannot express
//! - Record and group re-serialization with recomputed sizes
//! - Decompression of compressed record bodies (with a raw-deflate
//!   fallback and diagnostic errors)
//! - Cross-record merging of dialogue responses captured in the
//!   streaming-cache region
//! - An interval index answering "which group contains this offset" for
//!   downstream semantic reconstruction
//! - A read-only typed field view over the same schemas for analysis
//!   tools
//!
//! ## Example
//!
//! ```rust,no_run
//! use esm360::{build_catalog, convert_plugin, ConvertOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("console.esm")?;
//!     let catalog = build_catalog();
//!     let conversion = convert_plugin(&data, &catalog, &ConvertOptions::default())?;
//!     std::fs::write("pc.esm", &conversion.output)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod esm;
pub mod utils;

pub use error::{Error, Result};
pub use esm::catalog::{ResolutionTier, SchemaCatalog};
pub use esm::codec::Endian;
pub use esm::convert::{
    convert_plugin, convert_plugin_into, Conversion, ConversionStats, ConvertOptions,
};
pub use esm::fields::{read_fields, FieldMap, FieldValue};
pub use esm::groups::{scan_groups, GroupIndex, GroupSpan};
pub use esm::header::{GroupType, GrupHeader, RecordHeader, Signature};
pub use esm::info_merge::{CapturedWins, InfoMerger, MergeAction, MergePolicy};
pub use esm::registry::build_catalog;
pub use utils::{collect_plugins, create_glob_matcher, format_size, matches_filter};
