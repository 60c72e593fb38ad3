//! Main-record conversion state machine
//!
//! One record converts in isolation: parse the 24-byte header, apply the
//! special cases (streaming-cache drop, file-header flag clear, dialogue
//! merge), decompress when flagged, then walk the subrecord stream and
//! re-serialize little-endian. The output header's size field is always
//! recomputed from the converted body; several transforms change body
//! length, so the source value is never reused.
//!
//! Subrecord iteration is defensive: a malformed header or an overrun in
//! trailing data copies the remaining bytes verbatim and stops, reported
//! through stats rather than an error. Schema gaps, by contrast, are
//! always fatal — a layout is never guessed.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::esm::catalog::SchemaCatalog;
use crate::esm::codec::Endian;
use crate::esm::compress;
use crate::esm::convert::ConversionStats;
use crate::esm::header::{
    RecordHeader, Signature, SubrecordHeader, FLAG_COMPRESSED, FLAG_CONSOLE,
    RECORD_HEADER_SIZE, SUBRECORD_HEADER_SIZE, TAG_INFO, TAG_TES4, TAG_TOFT, TAG_XXXX,
};
use crate::esm::info_merge::{InfoMerger, MergeAction, MergePolicy};
use crate::esm::subrecord;

/// Orphaned trailing marker stripped from merged dialogue responses.
const MERGE_ORPHAN_TAG: Signature = Signature(*b"NEXT");

/// Shared read-only state for one conversion run.
pub(crate) struct Ctx<'a> {
    pub catalog: &'a SchemaCatalog,
    pub merger: &'a InfoMerger,
    pub policy: &'a dyn MergePolicy,
}

/// Convert the record starting at `offset`, appending its PC form to
/// `out` (or nothing, for dropped records). Returns the number of source
/// bytes consumed.
pub(crate) fn convert_record(
    ctx: &Ctx<'_>,
    data: &[u8],
    offset: usize,
    out: &mut Vec<u8>,
    stats: &mut ConversionStats,
) -> Result<usize> {
    let header = RecordHeader::parse(data, offset, Endian::Big)?;
    let body_start = offset + RECORD_HEADER_SIZE;
    let body_end = body_start + header.data_size as usize;
    if body_end > data.len() {
        return Err(Error::Truncated {
            context: "record body",
            offset,
        });
    }
    let consumed = RECORD_HEADER_SIZE + header.data_size as usize;
    let body = &data[body_start..body_end];

    // Streaming-cache records never reach the output; their contents were
    // consumed by the merge pre-pass.
    if header.signature == TAG_TOFT {
        trace!("dropping cache record {:08X}", header.form_id);
        stats.cache_records_dropped += 1;
        return Ok(consumed);
    }

    if header.signature == TAG_INFO {
        match ctx.merger.decide(ctx.policy, &header) {
            MergeAction::Drop => {
                debug!("dropping superseded response {:08X}", header.form_id);
                stats.infos_dropped += 1;
                return Ok(consumed);
            }
            MergeAction::Merge(captured) => {
                debug!("merging captured response {:08X}", header.form_id);
                stats.infos_merged += 1;
                let merged = decompressed_body(&captured.header, &captured.body)?;
                let converted =
                    convert_subrecords(ctx, header.signature, header.form_id, &merged, true, stats)?;
                emit(&header, captured.header.flags, converted, out, stats);
                return Ok(consumed);
            }
            MergeAction::Keep => {}
        }
    }

    let mut flags = header.flags;
    if header.signature == TAG_TES4 {
        flags &= !FLAG_CONSOLE;
    }

    let plain = decompressed_body(&header, body)?;
    if header.is_compressed() {
        stats.records_decompressed += 1;
    }
    let converted =
        convert_subrecords(ctx, header.signature, header.form_id, &plain, false, stats)?;
    emit(&header, flags, converted, out, stats);
    Ok(consumed)
}

fn emit(
    header: &RecordHeader,
    flags: u32,
    body: Vec<u8>,
    out: &mut Vec<u8>,
    stats: &mut ConversionStats,
) {
    // The output stream is never compressed.
    header.write_pc(out, body.len() as u32, flags & !FLAG_COMPRESSED);
    out.extend_from_slice(&body);
    stats.records_converted += 1;
    *stats.per_signature.entry(header.signature).or_insert(0) += 1;
}

/// Expand a compressed body: a big-endian declared size, then the zlib
/// stream. Uncompressed bodies pass through.
fn decompressed_body(header: &RecordHeader, body: &[u8]) -> Result<Vec<u8>> {
    if !header.is_compressed() {
        return Ok(body.to_vec());
    }
    if body.len() < 4 {
        return Err(Error::Truncated {
            context: "compressed body size",
            offset: 0,
        });
    }
    let declared = BigEndian::read_u32(&body[0..4]) as usize;
    compress::decompress(&body[4..], declared, header.signature, header.form_id)
}

/// One parsed chunk of the subrecord stream: either a plain subrecord or
/// an extended-size pair.
struct Chunk {
    signature: Signature,
    used_escape: bool,
    data_start: usize,
    data_len: usize,
    consumed: usize,
}

/// Parse the chunk at `offset`, or `None` when the remaining bytes are
/// malformed and should be copied verbatim.
fn next_chunk(body: &[u8], offset: usize) -> Option<Chunk> {
    let remaining = body.len() - offset;
    if remaining < SUBRECORD_HEADER_SIZE {
        return None;
    }
    let head = SubrecordHeader::parse(body, offset, Endian::Big).ok()?;
    if !head.signature.is_plausible() {
        return None;
    }

    if head.signature == TAG_XXXX
        && head.length == 4
        && remaining >= 10 + SUBRECORD_HEADER_SIZE
    {
        let follower = SubrecordHeader::parse(body, offset + 10, Endian::Big).ok()?;
        // The escape applies to the next subrecord only when that record
        // declares length zero; otherwise the XXXX stands alone.
        if follower.length == 0 && follower.signature.is_plausible() {
            let true_len = BigEndian::read_u32(&body[offset + 6..offset + 10]) as usize;
            if 10 + SUBRECORD_HEADER_SIZE + true_len > remaining {
                return None;
            }
            return Some(Chunk {
                signature: follower.signature,
                used_escape: true,
                data_start: offset + 10 + SUBRECORD_HEADER_SIZE,
                data_len: true_len,
                consumed: 10 + SUBRECORD_HEADER_SIZE + true_len,
            });
        }
    }

    let data_len = head.length as usize;
    if SUBRECORD_HEADER_SIZE + data_len > remaining {
        return None;
    }
    Some(Chunk {
        signature: head.signature,
        used_escape: false,
        data_start: offset + SUBRECORD_HEADER_SIZE,
        data_len,
        consumed: SUBRECORD_HEADER_SIZE + data_len,
    })
}

/// Convert a record body's subrecord stream to PC order.
fn convert_subrecords(
    ctx: &Ctx<'_>,
    owner: Signature,
    form_id: u32,
    body: &[u8],
    strip_trailing_orphan: bool,
    stats: &mut ConversionStats,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let mut offset = 0usize;
    // Start offset in `out` of the last emitted subrecord, for orphan
    // stripping after a merge.
    let mut last_emitted: Option<(Signature, usize, usize)> = None;

    while offset < body.len() {
        let chunk = match next_chunk(body, offset) {
            Some(c) => c,
            None => {
                debug!(
                    "record {owner} {form_id:08X}: malformed trailing data at offset {offset}, copying {} bytes verbatim",
                    body.len() - offset
                );
                out.extend_from_slice(&body[offset..]);
                stats.verbatim_anomalies += 1;
                break;
            }
        };

        let raw = &body[chunk.data_start..chunk.data_start + chunk.data_len];
        let converted = subrecord::convert(ctx.catalog, chunk.signature, owner, raw)?;
        stats.subrecords_converted += 1;
        stats.note_resolution(chunk.signature, owner, chunk.data_len, converted.tier);

        let emit_start = out.len();
        if chunk.used_escape {
            // Preserve the escape pair; the carried length is recomputed
            // from the converted body.
            SubrecordHeader::write_pc(TAG_XXXX, 4, &mut out);
            let mut le = [0u8; 4];
            LittleEndian::write_u32(&mut le, converted.bytes.len() as u32);
            out.extend_from_slice(&le);
            SubrecordHeader::write_pc(chunk.signature, 0, &mut out);
        } else {
            if converted.bytes.len() > u16::MAX as usize {
                return Err(Error::SubrecordTooLarge {
                    signature: chunk.signature,
                    form_id,
                    length: converted.bytes.len(),
                });
            }
            SubrecordHeader::write_pc(chunk.signature, converted.bytes.len() as u16, &mut out);
        }
        let body_len = converted.bytes.len();
        out.extend_from_slice(&converted.bytes);
        last_emitted = Some((chunk.signature, emit_start, body_len));
        offset += chunk.consumed;
    }

    if strip_trailing_orphan {
        if let Some((sig, start, body_len)) = last_emitted {
            if sig == MERGE_ORPHAN_TAG && body_len == 0 {
                trace!("record {owner} {form_id:08X}: stripping orphaned {sig} marker");
                out.truncate(start);
            }
        }
    }
    Ok(out)
}
