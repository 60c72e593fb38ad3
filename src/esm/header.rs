//! Record, group and subrecord headers
//!
//! Both the console and PC layouts use the same structural grammar:
//! 24-byte main-record headers, 24-byte GRUP container headers and 6-byte
//! subrecord headers. The console side stores all signatures reversed and
//! all integer fields big-endian.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::esm::codec::{reversed_tag, Endian};

/// Size of a main-record header and a GRUP header.
pub const RECORD_HEADER_SIZE: usize = 24;
/// Size of a subrecord header (tag + 16-bit length).
pub const SUBRECORD_HEADER_SIZE: usize = 6;

/// Record flag: body is zlib-compressed. Always cleared on output since the
/// converted file is emitted uncompressed.
pub const FLAG_COMPRESSED: u32 = 0x0004_0000;
/// Record flag: record is deleted.
pub const FLAG_DELETED: u32 = 0x0000_0020;
/// Record flag: initially disabled.
pub const FLAG_INITIALLY_DISABLED: u32 = 0x0000_0800;
/// Console build marker on the file header record; cleared on output.
pub const FLAG_CONSOLE: u32 = 0x0000_0004;

/// File header record tag.
pub const TAG_TES4: Signature = Signature(*b"TES4");
/// Group container pseudo-record tag.
pub const TAG_GRUP: Signature = Signature(*b"GRUP");
/// Streaming-cache record tag; never emitted to output.
pub const TAG_TOFT: Signature = Signature(*b"TOFT");
/// Dialogue response record tag, subject to cross-record merging.
pub const TAG_INFO: Signature = Signature(*b"INFO");
/// Extended-size escape subrecord tag.
pub const TAG_XXXX: Signature = Signature(*b"XXXX");

/// A 4-character record or subrecord signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(pub [u8; 4]);

impl Signature {
    /// Read a signature as stored on the console side (byte-reversed).
    pub fn from_console(bytes: &[u8]) -> Signature {
        Signature(reversed_tag([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a signature in PC order.
    pub fn from_pc(bytes: &[u8]) -> Signature {
        Signature([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn from_endian(bytes: &[u8], endian: Endian) -> Signature {
        match endian {
            Endian::Big => Signature::from_console(bytes),
            Endian::Little => Signature::from_pc(bytes),
        }
    }

    /// Signatures are upper-case ASCII letters, digits and underscores
    /// (e.g. `NPC_`, `MO2T`, `NAM0`). Anything else means the subrecord
    /// stream is malformed at this point.
    pub fn is_plausible(&self) -> bool {
        self.0
            .iter()
            .all(|&b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        Ok(())
    }
}

/// Parsed 24-byte main-record header.
///
/// `data_size` on output is always recomputed from the converted body;
/// decompression, merging and truncating overrides all change body length,
/// so the source value is never reused.
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    pub signature: Signature,
    pub data_size: u32,
    pub flags: u32,
    pub form_id: u32,
    pub timestamp: u32,
    pub vcs_info: u32,
}

impl RecordHeader {
    /// Parse a record header from `buf` in the given byte order.
    pub fn parse(buf: &[u8], offset: usize, endian: Endian) -> Result<RecordHeader> {
        if buf.len() < offset + RECORD_HEADER_SIZE {
            return Err(Error::Truncated {
                context: "record header",
                offset,
            });
        }
        let h = &buf[offset..offset + RECORD_HEADER_SIZE];
        Ok(RecordHeader {
            signature: Signature::from_endian(&h[0..4], endian),
            data_size: endian.read_u32(&h[4..8]),
            flags: endian.read_u32(&h[8..12]),
            form_id: endian.read_u32(&h[12..16]),
            timestamp: endian.read_u32(&h[16..20]),
            vcs_info: endian.read_u32(&h[20..24]),
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub fn is_deleted(&self) -> bool {
        self.flags & FLAG_DELETED != 0
    }

    /// Format version, carried in the low half of the VC info word.
    pub fn version(&self) -> u16 {
        (self.vcs_info & 0xFFFF) as u16
    }

    /// Serialize in PC (little-endian) order with the given body size.
    pub fn write_pc(&self, out: &mut Vec<u8>, data_size: u32, flags: u32) {
        out.extend_from_slice(self.signature.as_bytes());
        let mut tail = [0u8; 20];
        LittleEndian::write_u32(&mut tail[0..4], data_size);
        LittleEndian::write_u32(&mut tail[4..8], flags);
        LittleEndian::write_u32(&mut tail[8..12], self.form_id);
        LittleEndian::write_u32(&mut tail[12..16], self.timestamp);
        LittleEndian::write_u32(&mut tail[16..20], self.vcs_info);
        out.extend_from_slice(&tail);
    }
}

/// GRUP container semantics, one per group-type code 0-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    /// Top-level group of one record type; label is the type tag.
    TopLevel,
    /// Children of a worldspace; label is the WRLD FormID.
    WorldChildren,
    /// Interior cell block; label is the block number.
    InteriorCellBlock,
    /// Interior cell sub-block; label is the sub-block number.
    InteriorCellSubBlock,
    /// Exterior cell block; label is packed grid coordinates.
    ExteriorCellBlock,
    /// Exterior cell sub-block; label is packed grid coordinates.
    ExteriorCellSubBlock,
    /// Children of a cell; label is the CELL FormID.
    CellChildren,
    /// Children of a dialogue topic; label is the DIAL FormID.
    TopicChildren,
    /// Persistent references of a cell; label is the CELL FormID.
    CellPersistent,
    /// Temporary references of a cell; label is the CELL FormID.
    CellTemporary,
    /// Visible-distant references of a cell; label is the CELL FormID.
    CellVisibleDistant,
}

impl GroupType {
    pub fn from_raw(value: u32) -> Result<GroupType> {
        Ok(match value {
            0 => GroupType::TopLevel,
            1 => GroupType::WorldChildren,
            2 => GroupType::InteriorCellBlock,
            3 => GroupType::InteriorCellSubBlock,
            4 => GroupType::ExteriorCellBlock,
            5 => GroupType::ExteriorCellSubBlock,
            6 => GroupType::CellChildren,
            7 => GroupType::TopicChildren,
            8 => GroupType::CellPersistent,
            9 => GroupType::CellTemporary,
            10 => GroupType::CellVisibleDistant,
            other => return Err(Error::InvalidGroupType(other)),
        })
    }

    pub fn raw(&self) -> u32 {
        match self {
            GroupType::TopLevel => 0,
            GroupType::WorldChildren => 1,
            GroupType::InteriorCellBlock => 2,
            GroupType::InteriorCellSubBlock => 3,
            GroupType::ExteriorCellBlock => 4,
            GroupType::ExteriorCellSubBlock => 5,
            GroupType::CellChildren => 6,
            GroupType::TopicChildren => 7,
            GroupType::CellPersistent => 8,
            GroupType::CellTemporary => 9,
            GroupType::CellVisibleDistant => 10,
        }
    }

    /// Whether the label bytes hold a FormID (as opposed to a type tag or
    /// block coordinates).
    pub fn label_is_form_id(&self) -> bool {
        matches!(
            self,
            GroupType::WorldChildren
                | GroupType::CellChildren
                | GroupType::TopicChildren
                | GroupType::CellPersistent
                | GroupType::CellTemporary
                | GroupType::CellVisibleDistant
        )
    }
}

/// Parsed 24-byte GRUP header.
///
/// `group_size` covers the header itself plus all children. The label is
/// kept raw; interpretation depends on the group type.
#[derive(Debug, Clone, Copy)]
pub struct GrupHeader {
    /// Absolute offset of the GRUP header in the source buffer.
    pub offset: u64,
    pub group_size: u32,
    pub label: [u8; 4],
    pub group_type: GroupType,
    pub stamp: u32,
    pub unknown: u32,
}

impl GrupHeader {
    pub fn parse(buf: &[u8], offset: usize, endian: Endian) -> Result<GrupHeader> {
        if buf.len() < offset + RECORD_HEADER_SIZE {
            return Err(Error::Truncated {
                context: "group header",
                offset,
            });
        }
        let h = &buf[offset..offset + RECORD_HEADER_SIZE];
        let signature = Signature::from_endian(&h[0..4], endian);
        if signature != TAG_GRUP {
            return Err(Error::InvalidPlugin(format!(
                "expected GRUP header at offset {offset}, found {signature}"
            )));
        }
        // The label is stored in the same byte order as everything else, so
        // a plain reversal maps it whether it holds a tag, a FormID or a
        // block number.
        let raw_label = [h[8], h[9], h[10], h[11]];
        let label = match endian {
            Endian::Big => reversed_tag(raw_label),
            Endian::Little => raw_label,
        };
        Ok(GrupHeader {
            offset: offset as u64,
            group_size: endian.read_u32(&h[4..8]),
            label,
            group_type: GroupType::from_raw(endian.read_u32(&h[12..16]))?,
            stamp: endian.read_u32(&h[16..20]),
            unknown: endian.read_u32(&h[20..24]),
        })
    }

    /// Label interpreted as a record-type tag (top-level groups).
    pub fn label_as_tag(&self) -> Signature {
        Signature(self.label)
    }

    /// Label interpreted as a FormID (world/cell/topic children groups).
    pub fn label_as_form_id(&self) -> u32 {
        u32::from_le_bytes(self.label)
    }

    /// Serialize in PC order with the given total group size.
    pub fn write_pc(&self, out: &mut Vec<u8>, group_size: u32) {
        out.extend_from_slice(TAG_GRUP.as_bytes());
        let mut tail = [0u8; 20];
        LittleEndian::write_u32(&mut tail[0..4], group_size);
        tail[4..8].copy_from_slice(&self.label);
        LittleEndian::write_u32(&mut tail[8..12], self.group_type.raw());
        LittleEndian::write_u32(&mut tail[12..16], self.stamp);
        LittleEndian::write_u32(&mut tail[16..20], self.unknown);
        out.extend_from_slice(&tail);
    }
}

/// Parsed 6-byte subrecord header.
#[derive(Debug, Clone, Copy)]
pub struct SubrecordHeader {
    pub signature: Signature,
    pub length: u16,
}

impl SubrecordHeader {
    pub fn parse(buf: &[u8], offset: usize, endian: Endian) -> Result<SubrecordHeader> {
        if buf.len() < offset + SUBRECORD_HEADER_SIZE {
            return Err(Error::Truncated {
                context: "subrecord header",
                offset,
            });
        }
        Ok(SubrecordHeader {
            signature: Signature::from_endian(&buf[offset..offset + 4], endian),
            length: endian.read_u16(&buf[offset + 4..offset + 6]),
        })
    }

    pub fn write_pc(signature: Signature, length: u16, out: &mut Vec<u8>) {
        out.extend_from_slice(signature.as_bytes());
        out.extend_from_slice(&length.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console_record_header(sig: &[u8; 4], size: u32, flags: u32, form_id: u32) -> Vec<u8> {
        let mut h = Vec::new();
        h.extend(sig.iter().rev());
        h.extend_from_slice(&size.to_be_bytes());
        h.extend_from_slice(&flags.to_be_bytes());
        h.extend_from_slice(&form_id.to_be_bytes());
        h.extend_from_slice(&0u32.to_be_bytes());
        h.extend_from_slice(&0u32.to_be_bytes());
        h
    }

    #[test]
    fn test_parse_console_record_header() {
        let buf = console_record_header(b"WEAP", 0x1234, FLAG_COMPRESSED, 0x00010001);
        let h = RecordHeader::parse(&buf, 0, Endian::Big).unwrap();
        assert_eq!(h.signature, Signature(*b"WEAP"));
        assert_eq!(h.data_size, 0x1234);
        assert!(h.is_compressed());
        assert_eq!(h.form_id, 0x00010001);
    }

    #[test]
    fn test_write_pc_record_header() {
        let buf = console_record_header(b"ALCH", 10, 0, 0x00010001);
        let h = RecordHeader::parse(&buf, 0, Endian::Big).unwrap();
        let mut out = Vec::new();
        h.write_pc(&mut out, 16, h.flags);
        assert_eq!(&out[0..4], b"ALCH");
        assert_eq!(LittleEndian::read_u32(&out[4..8]), 16);
        // FormId lands little-endian at header offset +12.
        assert_eq!(LittleEndian::read_u32(&out[12..16]), 0x00010001);
    }

    #[test]
    fn test_signature_plausibility() {
        assert!(Signature(*b"NPC_").is_plausible());
        assert!(Signature(*b"NAM0").is_plausible());
        assert!(!Signature([0x00, b'A', b'B', b'C']).is_plausible());
        assert!(!Signature(*b"abcd").is_plausible());
    }

    #[test]
    fn test_group_type_range() {
        assert_eq!(GroupType::from_raw(0).unwrap(), GroupType::TopLevel);
        assert_eq!(GroupType::from_raw(10).unwrap(), GroupType::CellVisibleDistant);
        assert!(GroupType::from_raw(11).is_err());
    }

    #[test]
    fn test_parse_console_grup_header() {
        let mut buf = Vec::new();
        buf.extend(b"GRUP".iter().rev());
        buf.extend_from_slice(&100u32.to_be_bytes());
        // Top-level label is a reversed type tag on the console side.
        buf.extend(b"ALCH".iter().rev());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        let g = GrupHeader::parse(&buf, 0, Endian::Big).unwrap();
        assert_eq!(g.group_size, 100);
        assert_eq!(g.group_type, GroupType::TopLevel);
        assert_eq!(g.label_as_tag(), Signature(*b"ALCH"));
    }

    #[test]
    fn test_grup_form_id_label_round_trip() {
        let mut buf = Vec::new();
        buf.extend(b"GRUP".iter().rev());
        buf.extend_from_slice(&24u32.to_be_bytes());
        // FormID labels are big-endian on the console side.
        buf.extend_from_slice(&0x00012345u32.to_be_bytes());
        buf.extend_from_slice(&7u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        let g = GrupHeader::parse(&buf, 0, Endian::Big).unwrap();
        assert_eq!(g.group_type, GroupType::TopicChildren);
        assert!(g.group_type.label_is_form_id());
        assert_eq!(g.label_as_form_id(), 0x00012345);
    }
}
