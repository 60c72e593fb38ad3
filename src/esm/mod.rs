//! Console ESM plugin parsing and conversion
//!
//! Console builds of the engine ship their master files big-endian with a
//! handful of structural changes: reversed signatures, zlib-compressed
//! record bodies, a streaming-cache region of captured dialogue responses
//! and a console-only flag on the file header. This module converts such
//! a file into the byte-for-byte layout PC tooling expects.
//!
//! ## Format Overview
//!
//! A plugin is a flat stream of 24-byte-headed records and GRUP
//! containers. Record bodies are streams of tagged subrecords (4-byte
//! signature + 16-bit length), with an `XXXX` escape carrying a 32-bit
//! length for oversized bodies. Subrecord layouts are resolved through a
//! declarative schema catalog keyed by signature, owning record type and
//! byte length; a fixed set of hand-written overrides covers the shapes a
//! field list cannot express.
//!
//! ## Example
//!
//! ```rust,no_run
//! use esm360::esm::convert::{convert_plugin, ConvertOptions};
//! use esm360::esm::registry::build_catalog;
//!
//! let data = std::fs::read("console.esm")?;
//! let catalog = build_catalog();
//! let conversion = convert_plugin(&data, &catalog, &ConvertOptions::default())?;
//! std::fs::write("pc.esm", &conversion.output)?;
//! println!("{} records converted", conversion.stats.records_converted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod codec;
pub mod compress;
pub mod convert;
pub mod fields;
pub mod groups;
pub mod header;
pub mod info_merge;
pub mod overrides;
mod record;
pub mod registry;
pub mod schema;
pub mod subrecord;
