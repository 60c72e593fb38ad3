//! Dialogue-response merging
//!
//! Console builds carry a streaming-cache region of TOFT records whose
//! bodies hold captured copies of dialogue responses. Before any record is
//! converted, a pre-pass indexes those captures by FormID; during the main
//! pass each INFO record encountered in its canonical location is either
//! kept, replaced by its captured copy, or dropped as superseded. The
//! exact decision rule is a policy supplied by the caller; conversion only
//! depends on the three-way contract.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::esm::codec::Endian;
use crate::esm::header::{
    GrupHeader, RecordHeader, Signature, RECORD_HEADER_SIZE, TAG_GRUP, TAG_INFO, TAG_TOFT,
};

/// FormID of the TOFT record marking the start of the cache region.
pub const CACHE_REGION_BEGIN: u32 = 0x0000_0000;
/// FormID of the TOFT record marking the end of the cache region.
pub const CACHE_REGION_END: u32 = 0xFFFF_FFFF;

/// A dialogue response captured from the streaming-cache region. The body
/// is kept in source (big-endian) order; conversion happens when and if
/// the capture is merged.
#[derive(Debug, Clone)]
pub struct CapturedInfo {
    pub header: RecordHeader,
    pub body: Vec<u8>,
}

/// What to do with an INFO record met in its canonical location.
pub enum MergeAction<'a> {
    /// Convert the record as found.
    Keep,
    /// Re-serialize from the captured copy instead.
    Merge(&'a CapturedInfo),
    /// Superseded; omit from output.
    Drop,
}

/// The merge decision rule. Swappable so the empirical rule can be
/// validated against known-good converted files without touching the
/// conversion engine.
pub trait MergePolicy {
    fn decide<'a>(
        &self,
        original: &RecordHeader,
        captured: Option<&'a CapturedInfo>,
    ) -> MergeAction<'a>;
}

/// Default rule: a captured copy replaces the canonical record, and a
/// captured copy flagged deleted supersedes it entirely.
pub struct CapturedWins;

impl MergePolicy for CapturedWins {
    fn decide<'a>(
        &self,
        _original: &RecordHeader,
        captured: Option<&'a CapturedInfo>,
    ) -> MergeAction<'a> {
        match captured {
            Some(c) if c.header.is_deleted() => MergeAction::Drop,
            Some(c) => MergeAction::Merge(c),
            None => MergeAction::Keep,
        }
    }
}

/// Index of captured dialogue responses, built by one pre-pass over the
/// whole file before conversion starts.
pub struct InfoMerger {
    captured: HashMap<u32, CapturedInfo>,
    cache_records_seen: u64,
}

impl InfoMerger {
    /// An empty merger, for converting files with no cache region.
    pub fn empty() -> InfoMerger {
        InfoMerger {
            captured: HashMap::new(),
            cache_records_seen: 0,
        }
    }

    /// Walk the top-level record/GRUP stream and index every INFO record
    /// nested in a TOFT body. Later captures win, matching the order the
    /// console runtime applied them.
    pub fn scan(data: &[u8]) -> Result<InfoMerger> {
        let mut merger = InfoMerger::empty();
        merger.scan_span(data, 0, data.len())?;
        debug!(
            "cache pre-pass: {} TOFT records, {} captured responses",
            merger.cache_records_seen,
            merger.captured.len()
        );
        Ok(merger)
    }

    fn scan_span(&mut self, data: &[u8], mut offset: usize, end: usize) -> Result<()> {
        while offset < end {
            let signature = peek_signature(data, offset)?;
            if signature == TAG_GRUP {
                let grup = GrupHeader::parse(data, offset, Endian::Big)?;
                let span_end = offset + grup.group_size as usize;
                if span_end > end || grup.group_size < RECORD_HEADER_SIZE as u32 {
                    return Err(Error::InvalidPlugin(format!(
                        "GRUP at offset {offset} spans {} bytes past its parent",
                        grup.group_size
                    )));
                }
                self.scan_span(data, offset + RECORD_HEADER_SIZE, span_end)?;
                offset = span_end;
                continue;
            }

            let header = RecordHeader::parse(data, offset, Endian::Big)?;
            let body_start = offset + RECORD_HEADER_SIZE;
            let body_end = body_start + header.data_size as usize;
            if body_end > end {
                return Err(Error::Truncated {
                    context: "record body",
                    offset,
                });
            }
            if header.signature == TAG_TOFT {
                self.cache_records_seen += 1;
                if header.form_id != CACHE_REGION_BEGIN && header.form_id != CACHE_REGION_END {
                    self.index_cache_body(&data[body_start..body_end]);
                }
            }
            offset = body_end;
        }
        Ok(())
    }

    /// Parse a TOFT body as a nested record stream. Malformed trailing
    /// content stops indexing for this carrier but is not fatal — the
    /// carrier never reaches the output either way.
    fn index_cache_body(&mut self, body: &[u8]) {
        let mut offset = 0usize;
        while offset + RECORD_HEADER_SIZE <= body.len() {
            let header = match RecordHeader::parse(body, offset, Endian::Big) {
                Ok(h) => h,
                Err(_) => break,
            };
            if !header.signature.is_plausible() {
                warn!(
                    "cache carrier holds malformed data at offset {offset}; ignoring the rest"
                );
                break;
            }
            let body_start = offset + RECORD_HEADER_SIZE;
            let body_end = body_start + header.data_size as usize;
            if body_end > body.len() {
                warn!(
                    "captured {} record at offset {offset} overruns its carrier; ignoring the rest",
                    header.signature
                );
                break;
            }
            if header.signature == TAG_INFO {
                self.captured.insert(
                    header.form_id,
                    CapturedInfo {
                        header,
                        body: body[body_start..body_end].to_vec(),
                    },
                );
            }
            offset = body_end;
        }
    }

    pub fn captured(&self, form_id: u32) -> Option<&CapturedInfo> {
        self.captured.get(&form_id)
    }

    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }

    pub fn cache_records_seen(&self) -> u64 {
        self.cache_records_seen
    }

    /// Apply the policy to one canonical INFO record.
    pub fn decide<'a>(
        &'a self,
        policy: &dyn MergePolicy,
        original: &RecordHeader,
    ) -> MergeAction<'a> {
        policy.decide(original, self.captured(original.form_id))
    }
}

fn peek_signature(data: &[u8], offset: usize) -> Result<Signature> {
    if offset + 4 > data.len() {
        return Err(Error::Truncated {
            context: "record signature",
            offset,
        });
    }
    Ok(Signature::from_console(&data[offset..offset + 4]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::esm::header::FLAG_DELETED;

    fn console_record(sig: &[u8; 4], flags: u32, form_id: u32, body: &[u8]) -> Vec<u8> {
        let mut rec = Vec::new();
        rec.extend(sig.iter().rev());
        rec.extend_from_slice(&(body.len() as u32).to_be_bytes());
        rec.extend_from_slice(&flags.to_be_bytes());
        rec.extend_from_slice(&form_id.to_be_bytes());
        rec.extend_from_slice(&0u32.to_be_bytes());
        rec.extend_from_slice(&0u32.to_be_bytes());
        rec.extend_from_slice(body);
        rec
    }

    fn toft_carrier(captures: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = captures.concat();
        console_record(b"TOFT", 0, 0x0F00_0001, &body)
    }

    #[test]
    fn test_scan_indexes_nested_infos() {
        let info = console_record(b"INFO", 0, 0x00012345, &[0u8; 4]);
        let mut data = console_record(b"TOFT", 0, CACHE_REGION_BEGIN, &[]);
        data.extend(toft_carrier(&[info]));
        data.extend(console_record(b"TOFT", 0, CACHE_REGION_END, &[]));

        let merger = InfoMerger::scan(&data).unwrap();
        assert_eq!(merger.captured_count(), 1);
        assert_eq!(merger.cache_records_seen(), 3);
        let c = merger.captured(0x00012345).unwrap();
        assert_eq!(c.body.len(), 4);
    }

    #[test]
    fn test_later_capture_wins() {
        let first = console_record(b"INFO", 0, 0x00012345, &[1u8; 4]);
        let second = console_record(b"INFO", 0, 0x00012345, &[2u8; 8]);
        let mut data = toft_carrier(&[first]);
        data.extend(toft_carrier(&[second]));

        let merger = InfoMerger::scan(&data).unwrap();
        assert_eq!(merger.captured(0x00012345).unwrap().body.len(), 8);
    }

    #[test]
    fn test_captured_wins_policy() {
        let live = console_record(b"INFO", 0, 0x00012345, &[0u8; 4]);
        let deleted = console_record(b"INFO", FLAG_DELETED, 0x00019999, &[0u8; 4]);
        let mut data = toft_carrier(&[live]);
        data.extend(toft_carrier(&[deleted]));
        let merger = InfoMerger::scan(&data).unwrap();
        let policy = CapturedWins;

        let header = RecordHeader {
            signature: TAG_INFO,
            data_size: 0,
            flags: 0,
            form_id: 0x00012345,
            timestamp: 0,
            vcs_info: 0,
        };
        assert!(matches!(
            merger.decide(&policy, &header),
            MergeAction::Merge(_)
        ));

        let header = RecordHeader {
            form_id: 0x00019999,
            ..header
        };
        assert!(matches!(merger.decide(&policy, &header), MergeAction::Drop));

        let header = RecordHeader {
            form_id: 0x00015555,
            ..header
        };
        assert!(matches!(merger.decide(&policy, &header), MergeAction::Keep));
    }

    #[test]
    fn test_malformed_carrier_is_not_fatal() {
        let mut data = toft_carrier(&[]);
        // Carrier with garbage body.
        data.extend(console_record(b"TOFT", 0, 0x0F00_0002, &[0xFF; 30]));
        let merger = InfoMerger::scan(&data).unwrap();
        assert_eq!(merger.captured_count(), 0);
    }
}
