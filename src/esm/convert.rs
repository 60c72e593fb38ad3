//! Whole-file conversion orchestration
//!
//! Walks the top-level GRUP/record stream of a console plugin and emits
//! the PC form. Group spans are recomputed from converted children —
//! decompression, merging and the length-changing overrides all move
//! byte counts, so no source span survives. Conversion is all-or-nothing:
//! a fatal error aborts with no partial output, though the stats gathered
//! up to the failure are returned for debugging.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::esm::catalog::{ResolutionTier, SchemaCatalog};
use crate::esm::codec::Endian;
use crate::esm::header::{GrupHeader, Signature, RECORD_HEADER_SIZE, TAG_GRUP};
use crate::esm::info_merge::{CapturedWins, InfoMerger, MergePolicy};
use crate::esm::record::{self, Ctx};

use std::collections::HashMap;

/// One recorded fallback-tier hit, for schema-coverage review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackUse {
    pub signature: Signature,
    pub owner: Signature,
    pub length: usize,
    pub tier: ResolutionTier,
}

/// Per-conversion counters. Owned by one conversion run; never global.
/// Partial stats from parallel per-record workers can be combined with
/// [`ConversionStats::absorb`].
#[derive(Debug, Clone, Default)]
pub struct ConversionStats {
    pub records_converted: u64,
    pub subrecords_converted: u64,
    pub groups_converted: u64,
    pub records_decompressed: u64,
    pub cache_records_dropped: u64,
    pub infos_merged: u64,
    pub infos_dropped: u64,
    pub verbatim_anomalies: u64,
    /// Converted record count per record signature.
    pub per_signature: HashMap<Signature, u64>,
    fallback_log: Vec<FallbackUse>,
    log_fallbacks: bool,
}

impl ConversionStats {
    pub fn new(log_fallbacks: bool) -> ConversionStats {
        ConversionStats {
            log_fallbacks,
            ..ConversionStats::default()
        }
    }

    /// Record which tier served a subrecord resolution. Only fallback
    /// tiers are logged, and only when logging was requested.
    pub(crate) fn note_resolution(
        &mut self,
        signature: Signature,
        owner: Signature,
        length: usize,
        tier: ResolutionTier,
    ) {
        if self.log_fallbacks && tier.is_fallback() {
            self.fallback_log.push(FallbackUse {
                signature,
                owner,
                length,
                tier,
            });
        }
    }

    pub fn fallback_log(&self) -> &[FallbackUse] {
        &self.fallback_log
    }

    pub fn clear_fallback_log(&mut self) {
        self.fallback_log.clear();
    }

    /// Fold another run's counters into this one.
    pub fn absorb(&mut self, other: ConversionStats) {
        self.records_converted += other.records_converted;
        self.subrecords_converted += other.subrecords_converted;
        self.groups_converted += other.groups_converted;
        self.records_decompressed += other.records_decompressed;
        self.cache_records_dropped += other.cache_records_dropped;
        self.infos_merged += other.infos_merged;
        self.infos_dropped += other.infos_dropped;
        self.verbatim_anomalies += other.verbatim_anomalies;
        for (sig, n) in other.per_signature {
            *self.per_signature.entry(sig).or_insert(0) += n;
        }
        self.fallback_log.extend(other.fallback_log);
    }
}

/// Conversion options.
pub struct ConvertOptions {
    /// Record which fallback tier served each subrecord lookup.
    pub log_fallbacks: bool,
    /// The dialogue-response merge rule.
    pub policy: Box<dyn MergePolicy>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            log_fallbacks: false,
            policy: Box::new(CapturedWins),
        }
    }
}

/// A completed conversion: the PC-order output buffer and the run's
/// counters.
pub struct Conversion {
    pub output: Vec<u8>,
    pub stats: ConversionStats,
}

/// Convert a whole console plugin to PC layout.
pub fn convert_plugin(
    data: &[u8],
    catalog: &SchemaCatalog,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let mut stats = ConversionStats::new(options.log_fallbacks);
    let output = convert_plugin_into(data, catalog, options, &mut stats)?;
    Ok(Conversion { output, stats })
}

/// Convert into caller-owned stats. On a fatal error no output is
/// produced, but the counters gathered up to the failure stay in `stats`
/// for debugging.
pub fn convert_plugin_into(
    data: &[u8],
    catalog: &SchemaCatalog,
    options: &ConvertOptions,
    stats: &mut ConversionStats,
) -> Result<Vec<u8>> {
    let merger = InfoMerger::scan(data)?;
    let ctx = Ctx {
        catalog,
        merger: &merger,
        policy: options.policy.as_ref(),
    };
    let mut out = Vec::with_capacity(data.len());

    let mut offset = 0usize;
    while offset < data.len() {
        offset = convert_item(&ctx, data, offset, data.len(), &mut out, stats)?;
    }

    info!(
        "converted {} records / {} subrecords in {} groups ({} cache records dropped, {} responses merged, {} dropped)",
        stats.records_converted,
        stats.subrecords_converted,
        stats.groups_converted,
        stats.cache_records_dropped,
        stats.infos_merged,
        stats.infos_dropped,
    );
    Ok(out)
}

/// Convert one top-level item (record or group) and return the offset
/// just past it.
fn convert_item(
    ctx: &Ctx<'_>,
    data: &[u8],
    offset: usize,
    end: usize,
    out: &mut Vec<u8>,
    stats: &mut ConversionStats,
) -> Result<usize> {
    if offset + 4 > data.len() {
        return Err(Error::Truncated {
            context: "record signature",
            offset,
        });
    }
    let signature = Signature::from_console(&data[offset..offset + 4]);
    if signature == TAG_GRUP {
        convert_group(ctx, data, offset, end, out, stats)
    } else {
        let consumed = record::convert_record(ctx, data, offset, out, stats)?;
        Ok(offset + consumed)
    }
}

/// Convert a GRUP and its children, patching the emitted header with the
/// recomputed span. Empty groups (all children dropped) are still
/// emitted; their span is just the header.
fn convert_group(
    ctx: &Ctx<'_>,
    data: &[u8],
    offset: usize,
    end: usize,
    out: &mut Vec<u8>,
    stats: &mut ConversionStats,
) -> Result<usize> {
    let grup = GrupHeader::parse(data, offset, Endian::Big)?;
    let span_end = offset + grup.group_size as usize;
    if (grup.group_size as usize) < RECORD_HEADER_SIZE || span_end > end {
        return Err(Error::InvalidPlugin(format!(
            "GRUP at offset {offset} declares an invalid span of {} bytes",
            grup.group_size
        )));
    }
    debug!(
        "group {} (type {}) spanning {} bytes",
        grup.label_as_tag(),
        grup.group_type.raw(),
        grup.group_size
    );

    let header_pos = out.len();
    // Reserve the header; the true span is known only after the children
    // have converted.
    grup.write_pc(out, 0);

    let mut child = offset + RECORD_HEADER_SIZE;
    while child < span_end {
        child = convert_item(ctx, data, child, span_end, out, stats)?;
    }
    if child != span_end {
        return Err(Error::InvalidPlugin(format!(
            "children of GRUP at offset {offset} overran its span"
        )));
    }

    let new_size = (out.len() - header_pos) as u32;
    out[header_pos + 4..header_pos + 8].copy_from_slice(&new_size.to_le_bytes());
    stats.groups_converted += 1;
    Ok(span_end)
}
