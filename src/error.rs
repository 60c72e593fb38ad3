//! Error types for esm360

use thiserror::Error;

use crate::esm::header::Signature;

/// Decoded zlib stream header fields, kept on decompression errors so a
/// failing record can be diagnosed without re-deriving them from raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibDiagnostic {
    /// Compression method (CM, low nibble of the first byte; 8 = deflate)
    pub cm: u8,
    /// Window size exponent (CINFO, high nibble of the first byte)
    pub cinfo: u8,
    /// Preset dictionary flag (FDICT)
    pub fdict: bool,
    /// Whether the two header bytes pass the FCHECK mod-31 test
    pub checksum_ok: bool,
}

impl std::fmt::Display for ZlibDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CM={} CINFO={} FDICT={} checksum_ok={}",
            self.cm, self.cinfo, self.fdict, self.checksum_ok
        )
    }
}

/// Main error type for esm360 operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid plugin file: {0}")]
    InvalidPlugin(String),

    #[error("Truncated input while reading {context} at offset {offset}")]
    Truncated { context: &'static str, offset: usize },

    #[error("Invalid group type {0} in GRUP header")]
    InvalidGroupType(u32),

    #[error("No schema for subrecord {signature} under {owner} ({length} bytes)")]
    UnknownSchema {
        signature: Signature,
        owner: Signature,
        length: usize,
    },

    #[error("Subrecord {signature} under {owner}: schema expects {expected} bytes, body has {found}")]
    SchemaSizeMismatch {
        signature: Signature,
        owner: Signature,
        expected: usize,
        found: usize,
    },

    #[error("Malformed subrecord {signature} under {owner}: {detail}")]
    MalformedSubrecord {
        signature: Signature,
        owner: Signature,
        detail: String,
    },

    #[error("Decompression failed for record {signature} {form_id:08X}: {detail} [{diagnostic}]")]
    Decompression {
        signature: Signature,
        form_id: u32,
        detail: String,
        diagnostic: ZlibDiagnostic,
    },

    #[error("Decompressed size mismatch for record {signature} {form_id:08X}: declared {declared}, got {actual} [{diagnostic}]")]
    DecompressedSizeMismatch {
        signature: Signature,
        form_id: u32,
        declared: usize,
        actual: usize,
        diagnostic: ZlibDiagnostic,
    },

    #[error("Subrecord {signature} in record {form_id:08X} is {length} bytes, which exceeds the 16-bit length field and has no extended-size marker")]
    SubrecordTooLarge {
        signature: Signature,
        form_id: u32,
        length: usize,
    },
}

/// Result type alias for esm360 operations
pub type Result<T> = std::result::Result<T, Error>;
