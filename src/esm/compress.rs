//! Compressed record body handling
//!
//! Compressed bodies are zlib-wrapped deflate. A few records in console
//! builds carry raw deflate data behind an invalid zlib header; those are
//! retried headerless with the two header bytes and the four checksum
//! bytes excluded. The decompressed length must equal the declared size
//! exactly — a mismatch is an error, never silently truncated or padded
//! output.

use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};
use log::trace;

use crate::error::{Error, Result, ZlibDiagnostic};
use crate::esm::header::Signature;

/// Decode the two zlib header bytes for diagnostics. Also computed for
/// invalid headers, which is the point: the error message carries what was
/// actually there.
pub fn read_diagnostic(payload: &[u8]) -> ZlibDiagnostic {
    let cmf = payload.first().copied().unwrap_or(0);
    let flg = payload.get(1).copied().unwrap_or(0);
    ZlibDiagnostic {
        cm: cmf & 0x0F,
        cinfo: cmf >> 4,
        fdict: flg & 0x20 != 0,
        checksum_ok: (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0,
    }
}

fn header_is_valid(diag: &ZlibDiagnostic) -> bool {
    diag.cm == 8 && diag.cinfo <= 7 && diag.checksum_ok
}

/// Decompress one record body. `signature` and `form_id` identify the
/// owning record in error messages.
pub fn decompress(
    payload: &[u8],
    declared_size: usize,
    signature: Signature,
    form_id: u32,
) -> Result<Vec<u8>> {
    let diagnostic = read_diagnostic(payload);
    let mut out = Vec::with_capacity(declared_size);

    if header_is_valid(&diagnostic) {
        let mut decoder = ZlibDecoder::new(payload);
        decoder
            .read_to_end(&mut out)
            .map_err(|e| Error::Decompression {
                signature,
                form_id,
                detail: format!("zlib: {e}"),
                diagnostic,
            })?;
    } else {
        // Headerless retry: strip the 2-byte header and 4-byte checksum
        // the invalid wrapper occupies.
        trace!(
            "record {signature} {form_id:08X}: invalid zlib header ({diagnostic}), retrying as raw deflate"
        );
        if payload.len() < 6 {
            return Err(Error::Decompression {
                signature,
                form_id,
                detail: format!("payload of {} bytes is too short", payload.len()),
                diagnostic,
            });
        }
        let inner = &payload[2..payload.len() - 4];
        let mut decoder = DeflateDecoder::new(inner);
        decoder
            .read_to_end(&mut out)
            .map_err(|e| Error::Decompression {
                signature,
                form_id,
                detail: format!("raw deflate: {e}"),
                diagnostic,
            })?;
    }

    if out.len() != declared_size {
        return Err(Error::DecompressedSizeMismatch {
            signature,
            form_id,
            declared: declared_size,
            actual: out.len(),
            diagnostic,
        });
    }
    trace!(
        "record {signature} {form_id:08X}: decompressed {} -> {} bytes",
        payload.len(),
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    const SIG: Signature = Signature(*b"NPC_");

    fn zlib_compress(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_zlib_round_trip() {
        let original = b"subrecord soup subrecord soup subrecord soup".to_vec();
        let compressed = zlib_compress(&original);
        let out = decompress(&compressed, original.len(), SIG, 0x1234).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_declared_size_mismatch_is_error() {
        let original = vec![7u8; 64];
        let compressed = zlib_compress(&original);
        let err = decompress(&compressed, 63, SIG, 0x1234).unwrap_err();
        match err {
            Error::DecompressedSizeMismatch {
                declared,
                actual,
                diagnostic,
                ..
            } => {
                assert_eq!(declared, 63);
                assert_eq!(actual, 64);
                assert_eq!(diagnostic.cm, 8);
                assert!(diagnostic.checksum_ok);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_raw_deflate_fallback() {
        let original = b"raw deflate body without a wrapper".to_vec();
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&original).unwrap();
        let raw = enc.finish().unwrap();
        // Fake the layout the fallback expects: 2 junk header bytes that do
        // not form a valid zlib header, the stream, 4 junk checksum bytes.
        let mut payload = vec![0x00, 0x00];
        payload.extend_from_slice(&raw);
        payload.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let out = decompress(&payload, original.len(), SIG, 0x1).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_garbage_reports_header_fields() {
        let payload = [0x3F, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let err = decompress(&payload, 16, SIG, 0x2).unwrap_err();
        match err {
            Error::Decompression { diagnostic, .. } => {
                assert_eq!(diagnostic.cm, 0x0F);
                assert_eq!(diagnostic.cinfo, 0x03);
                assert!(!diagnostic.fdict);
            }
            Error::DecompressedSizeMismatch { .. } => {}
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_payload() {
        let err = decompress(&[], 4, SIG, 0x3).unwrap_err();
        assert!(matches!(err, Error::Decompression { .. }));
    }
}
