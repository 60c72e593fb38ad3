//! GRUP scanning and containment queries
//!
//! Downstream semantic reconstruction needs to attribute loose records
//! (CELL/LAND/REFR/INFO) to their structural parents: which world-children
//! group holds this LAND record, which topic-children group holds this
//! INFO. The scanner collects every GRUP header in one pass; the interval
//! index answers containment in O(log n) instead of a linear scan per
//! query.

use log::trace;

use crate::error::{Error, Result};
use crate::esm::codec::Endian;
use crate::esm::header::{
    GroupType, GrupHeader, RecordHeader, Signature, RECORD_HEADER_SIZE, TAG_GRUP,
};

/// Collect every GRUP header in the file, including nested ones, with
/// absolute offsets.
pub fn scan_groups(data: &[u8], endian: Endian) -> Result<Vec<GrupHeader>> {
    let mut groups = Vec::new();
    scan_span(data, 0, data.len(), endian, &mut groups)?;
    trace!("group scan found {} containers", groups.len());
    Ok(groups)
}

fn scan_span(
    data: &[u8],
    mut offset: usize,
    end: usize,
    endian: Endian,
    groups: &mut Vec<GrupHeader>,
) -> Result<()> {
    while offset < end {
        if offset + 4 > data.len() {
            return Err(Error::Truncated {
                context: "record signature",
                offset,
            });
        }
        let signature = Signature::from_endian(&data[offset..offset + 4], endian);
        if signature == TAG_GRUP {
            let grup = GrupHeader::parse(data, offset, endian)?;
            let span_end = offset + grup.group_size as usize;
            if (grup.group_size as usize) < RECORD_HEADER_SIZE || span_end > end {
                return Err(Error::InvalidPlugin(format!(
                    "GRUP at offset {offset} declares an invalid span of {} bytes",
                    grup.group_size
                )));
            }
            groups.push(grup);
            scan_span(data, offset + RECORD_HEADER_SIZE, span_end, endian, groups)?;
            offset = span_end;
        } else {
            let header = RecordHeader::parse(data, offset, endian)?;
            offset += RECORD_HEADER_SIZE + header.data_size as usize;
            if offset > end {
                return Err(Error::Truncated {
                    context: "record body",
                    offset,
                });
            }
        }
    }
    Ok(())
}

/// One indexed container span. `start` is the GRUP header offset; `end`
/// is exclusive.
#[derive(Debug, Clone, Copy)]
pub struct GroupSpan {
    pub start: u64,
    pub end: u64,
    pub label: [u8; 4],
}

impl GroupSpan {
    pub fn label_as_form_id(&self) -> u32 {
        u32::from_le_bytes(self.label)
    }

    pub fn label_as_tag(&self) -> Signature {
        Signature(self.label)
    }
}

/// Sorted interval index over the containers of one group type.
pub struct GroupIndex {
    spans: Vec<GroupSpan>,
}

impl GroupIndex {
    /// Build from scanned headers, keeping only `group_type` containers.
    /// Spans are sorted by start offset; nesting keeps same-type spans
    /// disjoint, so the rightmost candidate is unambiguous.
    pub fn build(groups: &[GrupHeader], group_type: GroupType) -> GroupIndex {
        let mut spans: Vec<GroupSpan> = groups
            .iter()
            .filter(|g| g.group_type == group_type)
            .map(|g| GroupSpan {
                start: g.offset,
                end: g.offset + g.group_size as u64,
                label: g.label,
            })
            .collect();
        spans.sort_by_key(|s| s.start);
        GroupIndex { spans }
    }

    /// The container holding `offset`: the rightmost span starting
    /// strictly before it, provided the offset falls before that span's
    /// end. The data region begins just past the 24-byte header, so the
    /// strict lower bound never excludes a real child.
    pub fn find(&self, offset: u64) -> Option<&GroupSpan> {
        // Binary search for the rightmost span with start < offset.
        let idx = self.spans.partition_point(|s| s.start < offset);
        if idx == 0 {
            return None;
        }
        let span = &self.spans[idx - 1];
        if offset < span.end {
            Some(span)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u64, end: u64, label: u32) -> GrupHeader {
        GrupHeader {
            offset: start,
            group_size: (end - start) as u32,
            label: label.to_le_bytes(),
            group_type: GroupType::WorldChildren,
            stamp: 0,
            unknown: 0,
        }
    }

    #[test]
    fn test_containment_bounds() {
        let groups = vec![span(1000, 1500, 0xA), span(2000, 2400, 0xB)];
        let index = GroupIndex::build(&groups, GroupType::WorldChildren);

        assert_eq!(index.find(1001).unwrap().label_as_form_id(), 0xA);
        assert_eq!(index.find(1024).unwrap().label_as_form_id(), 0xA);
        assert_eq!(index.find(1499).unwrap().label_as_form_id(), 0xA);
        // Start is a strict lower bound, end is exclusive.
        assert!(index.find(999).is_none());
        assert!(index.find(1000).is_none());
        assert!(index.find(1500).is_none());
        // Between spans.
        assert!(index.find(1700).is_none());
        assert_eq!(index.find(2100).unwrap().label_as_form_id(), 0xB);
    }

    #[test]
    fn test_type_filter() {
        let mut groups = vec![span(1000, 1500, 0xA)];
        groups.push(GrupHeader {
            group_type: GroupType::TopicChildren,
            ..span(1100, 1400, 0xC)
        });
        let world = GroupIndex::build(&groups, GroupType::WorldChildren);
        let topics = GroupIndex::build(&groups, GroupType::TopicChildren);
        assert_eq!(world.len(), 1);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics.find(1200).unwrap().label_as_form_id(), 0xC);
    }

    #[test]
    fn test_empty_index() {
        let index = GroupIndex::build(&[], GroupType::CellChildren);
        assert!(index.is_empty());
        assert!(index.find(1234).is_none());
    }

    #[test]
    fn test_scan_nested_groups() {
        // Build: GRUP(top) { GRUP(topic children) { INFO record } }
        let mut info = Vec::new();
        info.extend(b"INFO".iter().rev());
        info.extend_from_slice(&4u32.to_be_bytes());
        info.extend_from_slice(&[0u8; 16]);
        info.extend_from_slice(&[0u8; 4]);

        let mut inner = Vec::new();
        inner.extend(b"GRUP".iter().rev());
        inner.extend_from_slice(&((24 + info.len()) as u32).to_be_bytes());
        inner.extend_from_slice(&0x00012345u32.to_be_bytes());
        inner.extend_from_slice(&7u32.to_be_bytes());
        inner.extend_from_slice(&[0u8; 8]);
        inner.extend_from_slice(&info);

        let mut outer = Vec::new();
        outer.extend(b"GRUP".iter().rev());
        outer.extend_from_slice(&((24 + inner.len()) as u32).to_be_bytes());
        outer.extend(b"DIAL".iter().rev());
        outer.extend_from_slice(&0u32.to_be_bytes());
        outer.extend_from_slice(&[0u8; 8]);
        outer.extend_from_slice(&inner);

        let groups = scan_groups(&outer, Endian::Big).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_type, GroupType::TopLevel);
        assert_eq!(groups[1].group_type, GroupType::TopicChildren);
        assert_eq!(groups[1].offset, 24);

        let index = GroupIndex::build(&groups, GroupType::TopicChildren);
        // The INFO record starts at offset 48; it resolves to the inner
        // group.
        assert_eq!(index.find(48).unwrap().label_as_form_id(), 0x00012345);
    }
}
