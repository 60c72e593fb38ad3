//! Hand-written subrecord transforms
//!
//! A fixed set of subrecords cannot be expressed as a field list: some
//! permute byte positions, some are half pre-swapped on the console side,
//! some change length, and the navmesh connection subrecords embed their
//! own repeat counts. Each transform here is a small pure function over
//! the source body; the table is consulted before generic schema dispatch.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::esm::codec::{push_reversed, push_reversed_each};
use crate::esm::header::Signature;

/// NVMI flag bit gating the optional island geometry sub-block.
const NVMI_ISLAND_FLAG: u32 = 0x0000_0020;
/// Platform flag byte value written into door-link subrecords on output.
const DOOR_LINK_PC_SENTINEL: u8 = 0x00;

/// A conversion override: a named pure function over one subrecord body.
pub struct Override {
    pub name: &'static str,
    pub apply: fn(&[u8]) -> Result<Vec<u8>>,
}

/// Look up an override for (signature, owner). Owner-specific entries are
/// checked before signature-wide ones.
pub fn find(signature: Signature, owner: Signature) -> Option<&'static Override> {
    match (signature.as_bytes(), owner.as_bytes()) {
        (b"DNAM", b"WATR") => Some(&WATR_DNAM),
        (b"DATA", b"LIGH") => Some(&LIGH_DATA),
        (b"TNAM", b"CLMT") => Some(&CLMT_TNAM),
        (b"DATA", b"ALCH") => Some(&ALCH_DATA),
        (b"XNAM", b"FACT") => Some(&FACT_XNAM),
        (b"TNAM", b"NOTE") => Some(&NOTE_TNAM),
        (b"CTDA", _) => Some(&CTDA),
        (b"XNDP", _) => Some(&XNDP),
        (b"NVMI", _) => Some(&NVMI),
        (b"NVCI", _) => Some(&NVCI),
        (b"NVGD", _) => Some(&NVGD),
        _ => None,
    }
}

fn malformed(name: &'static str, detail: String) -> Error {
    Error::MalformedSubrecord {
        signature: Signature(name.as_bytes()[0..4].try_into().unwrap()),
        owner: Signature(*b"____"),
        detail,
    }
}

static CTDA: Override = Override {
    name: "CTDA",
    apply: convert_ctda,
};

/// Condition tuple. The console packs the operator byte at the far end of
/// the leading word: byte 0 and byte 3 trade places while the 16-bit
/// run-on flags between them swap normally. The remaining fields are all
/// 4-byte values.
fn convert_ctda(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() < 4 || body.len() % 4 != 0 {
        return Err(malformed(
            "CTDA",
            format!("condition body of {} bytes", body.len()),
        ));
    }
    let mut out = Vec::with_capacity(body.len());
    out.push(body[3]);
    out.push(body[2]);
    out.push(body[1]);
    out.push(body[0]);
    push_reversed_each(&mut out, &body[4..], 4);
    Ok(out)
}

static WATR_DNAM: Override = Override {
    name: "WATR/DNAM",
    apply: convert_watr_dnam,
};

/// Water visual block. The leading 4 bytes are already little-endian on
/// the console side and pass through; the remainder is a float array.
fn convert_watr_dnam(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() < 4 || (body.len() - 4) % 4 != 0 {
        return Err(malformed(
            "DNAM",
            format!("water visual block of {} bytes", body.len()),
        ));
    }
    let mut out = Vec::with_capacity(body.len());
    out.extend_from_slice(&body[0..4]);
    push_reversed_each(&mut out, &body[4..], 4);
    Ok(out)
}

static LIGH_DATA: Override = Override {
    name: "LIGH/DATA",
    apply: convert_ligh_data,
};

/// Light data: eight 4-byte fields. After the normal per-field swap, the
/// last two fields (value, weight) are transposed relative to the PC
/// layout and swap positions with each other.
fn convert_ligh_data(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() != 32 {
        return Err(malformed(
            "DATA",
            format!("light data of {} bytes, expected 32", body.len()),
        ));
    }
    let mut out = Vec::with_capacity(32);
    push_reversed_each(&mut out, &body[0..8], 4);
    // Color bytes stay put.
    out.extend_from_slice(&body[8..12]);
    push_reversed_each(&mut out, &body[12..24], 4);
    push_reversed(&mut out, &body[28..32]);
    push_reversed(&mut out, &body[24..28]);
    Ok(out)
}

static CLMT_TNAM: Override = Override {
    name: "CLMT/TNAM",
    apply: convert_clmt_tnam,
};

/// Climate timing. The console pads the 6-byte PC form to 8; the four
/// leading time bytes copy through and the embedded 16-bit phase length
/// swaps.
fn convert_clmt_tnam(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() != 8 {
        return Err(malformed(
            "TNAM",
            format!("climate timing of {} bytes, expected 8", body.len()),
        ));
    }
    let mut out = Vec::with_capacity(6);
    out.extend_from_slice(&body[0..4]);
    push_reversed(&mut out, &body[4..6]);
    Ok(out)
}

static ALCH_DATA: Override = Override {
    name: "ALCH/DATA",
    apply: convert_alch_data,
};

/// Consumable weight. The console appends one pad byte to the 4-byte
/// float; drop it and swap.
fn convert_alch_data(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() != 5 && body.len() != 4 {
        return Err(malformed(
            "DATA",
            format!("consumable weight of {} bytes", body.len()),
        ));
    }
    let mut out = Vec::with_capacity(4);
    push_reversed(&mut out, &body[0..4]);
    Ok(out)
}

static FACT_XNAM: Override = Override {
    name: "FACT/XNAM",
    apply: convert_fact_xnam,
};

/// Faction relation. Only the leading faction FormID is big-endian on the
/// console side; the modifier bytes that follow are already in target
/// order and pass through.
fn convert_fact_xnam(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() < 4 {
        return Err(malformed(
            "XNAM",
            format!("faction relation of {} bytes", body.len()),
        ));
    }
    let mut out = Vec::with_capacity(body.len());
    push_reversed(&mut out, &body[0..4]);
    out.extend_from_slice(&body[4..]);
    Ok(out)
}

static NOTE_TNAM: Override = Override {
    name: "NOTE/TNAM",
    apply: convert_note_tnam,
};

/// Note contents. Text notes pass through, but a voice note stores a
/// FormID here and must swap as a 32-bit value, not as text.
fn convert_note_tnam(body: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    if body.len() == 4 {
        push_reversed(&mut out, body);
    } else {
        out.extend_from_slice(body);
    }
    Ok(out)
}

static XNDP: Override = Override {
    name: "XNDP",
    apply: convert_xndp,
};

/// Navmesh door link on a reference: linked mesh FormID, then a platform
/// flag byte that is rewritten to the PC sentinel rather than copied, then
/// passthrough filler.
fn convert_xndp(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() < 5 {
        return Err(malformed(
            "XNDP",
            format!("door link of {} bytes", body.len()),
        ));
    }
    let mut out = Vec::with_capacity(body.len());
    push_reversed(&mut out, &body[0..4]);
    out.push(DOOR_LINK_PC_SENTINEL);
    out.extend_from_slice(&body[5..]);
    Ok(out)
}

static NVMI: Override = Override {
    name: "NVMI",
    apply: convert_nvmi,
};

/// A bounds-checked big-endian reader over a subrecord body that mirrors
/// every consumed value into little-endian output.
struct SwapCursor<'a> {
    body: &'a [u8],
    pos: usize,
    out: Vec<u8>,
    tag: &'static str,
}

impl<'a> SwapCursor<'a> {
    fn new(body: &'a [u8], tag: &'static str) -> SwapCursor<'a> {
        SwapCursor {
            body,
            pos: 0,
            out: Vec::with_capacity(body.len()),
            tag,
        }
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.pos + n > self.body.len() {
            return Err(malformed(
                self.tag,
                format!(
                    "needs {} more bytes at offset {}, body is {}",
                    n,
                    self.pos,
                    self.body.len()
                ),
            ));
        }
        Ok(())
    }

    fn swap_u32(&mut self) -> Result<u32> {
        self.need(4)?;
        let v = BigEndian::read_u32(&self.body[self.pos..]);
        let mut le = [0u8; 4];
        LittleEndian::write_u32(&mut le, v);
        self.out.extend_from_slice(&le);
        self.pos += 4;
        Ok(v)
    }

    fn swap_u16(&mut self) -> Result<u16> {
        self.need(2)?;
        let v = BigEndian::read_u16(&self.body[self.pos..]);
        self.out.extend_from_slice(&v.to_le_bytes());
        self.pos += 2;
        Ok(v)
    }

    fn swap_u32_run(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.swap_u32()?;
        }
        Ok(())
    }

    fn swap_u16_run(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.swap_u16()?;
        }
        Ok(())
    }

    fn remaining(&self) -> usize {
        self.body.len() - self.pos
    }

    /// Swap whatever trails the structured portion as 4-byte values.
    fn finish_u32_tail(mut self) -> Result<Vec<u8>> {
        if self.remaining() % 4 != 0 {
            return Err(malformed(
                self.tag,
                format!("{}-byte trailing region is not 4-byte aligned", self.remaining()),
            ));
        }
        let tail = self.remaining() / 4;
        self.swap_u32_run(tail)?;
        Ok(self.out)
    }
}

/// Navmesh map info: header fields, two count-prefixed FormID arrays,
/// then an island geometry sub-block present only when the island flag is
/// set, then a fixed tail of 4-byte values.
fn convert_nvmi(body: &[u8]) -> Result<Vec<u8>> {
    let mut cur = SwapCursor::new(body, "NVMI");
    cur.swap_u32()?; // unknown
    cur.swap_u32()?; // navmesh
    let flags = cur.swap_u32()?;
    cur.swap_u32_run(3)?; // x, y, z

    let merged = cur.swap_u32()? as usize;
    cur.swap_u32_run(merged)?;
    let preferred = cur.swap_u32()? as usize;
    cur.swap_u32_run(preferred)?;

    if flags & NVMI_ISLAND_FLAG != 0 {
        cur.swap_u32_run(6)?; // bounds min/max
        let triangles = cur.swap_u32()? as usize;
        // Each triangle is three vertex indices.
        cur.swap_u16_run(triangles * 3)?;
        let vertices = cur.swap_u32()? as usize;
        // Each vertex is three floats.
        cur.swap_u32_run(vertices * 3)?;
    }

    cur.finish_u32_tail()
}

static NVCI: Override = Override {
    name: "NVCI",
    apply: convert_nvci,
};

/// Navmesh connection info: owning mesh, then three count-prefixed FormID
/// arrays (connected meshes, unknown set, doors).
fn convert_nvci(body: &[u8]) -> Result<Vec<u8>> {
    let mut cur = SwapCursor::new(body, "NVCI");
    cur.swap_u32()?; // navmesh
    for _ in 0..3 {
        let count = cur.swap_u32()? as usize;
        cur.swap_u32_run(count)?;
    }
    cur.finish_u32_tail()
}

static NVGD: Override = Override {
    name: "NVGD",
    apply: convert_nvgd,
};

/// Navmesh cell grid: grid dimensions and bounds, then per-cell triangle
/// lists, each a 16-bit count followed by that many triangle indices.
fn convert_nvgd(body: &[u8]) -> Result<Vec<u8>> {
    let mut cur = SwapCursor::new(body, "NVGD");
    cur.swap_u32()?; // divisor
    cur.swap_u32_run(2)?; // max x/y distance
    cur.swap_u32_run(4)?; // bounds
    while cur.remaining() > 0 {
        let count = cur.swap_u16()? as usize;
        cur.swap_u16_run(count)?;
    }
    Ok(cur.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(s: &[u8; 4]) -> Signature {
        Signature(*s)
    }

    #[test]
    fn test_find_prefers_owner_entries() {
        assert!(find(sig(b"DNAM"), sig(b"WATR")).is_some());
        assert!(find(sig(b"DNAM"), sig(b"WEAP")).is_none());
        assert!(find(sig(b"CTDA"), sig(b"INFO")).is_some());
        assert!(find(sig(b"CTDA"), sig(b"QUST")).is_some());
    }

    #[test]
    fn test_ctda_positional_swap() {
        // Operator 0x03 at byte 0, a 16-bit field at bytes 1-2, flags 0x00
        // at byte 3, then two 4-byte values.
        let body = [
            0x03, 0xAA, 0xBB, 0x00, //
            0x00, 0x00, 0x00, 0x2A, //
            0x41, 0x20, 0x00, 0x00,
        ];
        let out = convert_ctda(&body).unwrap();
        assert_eq!(out[0], 0x00);
        assert_eq!(out[3], 0x03);
        assert_eq!(&out[1..3], &[0xBB, 0xAA]);
        assert_eq!(&out[4..8], &[0x2A, 0x00, 0x00, 0x00]);
        assert_eq!(&out[8..12], &[0x00, 0x00, 0x20, 0x41]);
    }

    #[test]
    fn test_watr_dnam_skips_prefix() {
        let mut body = vec![0xDE, 0xAD, 0xBE, 0xEF];
        body.extend_from_slice(&[0x41, 0x20, 0x00, 0x00]);
        let out = convert_watr_dnam(&body).unwrap();
        assert_eq!(&out[0..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(&out[4..8], &[0x00, 0x00, 0x20, 0x41]);
    }

    #[test]
    fn test_ligh_data_transposes_trailing_pair() {
        let mut body = Vec::new();
        body.extend_from_slice(&100i32.to_be_bytes()); // time
        body.extend_from_slice(&256u32.to_be_bytes()); // radius
        body.extend_from_slice(&[1, 2, 3, 4]); // color
        body.extend_from_slice(&0u32.to_be_bytes()); // flags
        body.extend_from_slice(&1.0f32.to_be_bytes()); // falloff
        body.extend_from_slice(&90.0f32.to_be_bytes()); // fov
        body.extend_from_slice(&25u32.to_be_bytes()); // value
        body.extend_from_slice(&0.5f32.to_be_bytes()); // weight
        let out = convert_ligh_data(&body).unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(&out[8..12], &[1, 2, 3, 4]);
        // Weight lands where value was and vice versa.
        assert_eq!(f32::from_le_bytes(out[24..28].try_into().unwrap()), 0.5);
        assert_eq!(u32::from_le_bytes(out[28..32].try_into().unwrap()), 25);
    }

    #[test]
    fn test_clmt_tnam_truncates_to_six() {
        let body = [6, 20, 8, 18, 0x01, 0x40, 0xCC, 0xCC];
        let out = convert_clmt_tnam(&body).unwrap();
        assert_eq!(out, vec![6, 20, 8, 18, 0x40, 0x01]);
    }

    #[test]
    fn test_alch_data_drops_pad_byte() {
        let mut body = 1.5f32.to_be_bytes().to_vec();
        body.push(0xCC);
        let out = convert_alch_data(&body).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(f32::from_le_bytes(out.try_into().unwrap()), 1.5);
    }

    #[test]
    fn test_fact_xnam_swaps_first_half_only() {
        let mut body = 0x00012345u32.to_be_bytes().to_vec();
        body.extend_from_slice(&[0x0A, 0x00, 0x00, 0x00]);
        let out = convert_fact_xnam(&body).unwrap();
        assert_eq!(u32::from_le_bytes(out[0..4].try_into().unwrap()), 0x00012345);
        assert_eq!(&out[4..8], &[0x0A, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_note_tnam_reinterprets_four_bytes() {
        let out = convert_note_tnam(&0x00010203u32.to_be_bytes()).unwrap();
        assert_eq!(u32::from_le_bytes(out.try_into().unwrap()), 0x00010203);
        let text = b"A short note\0";
        assert_eq!(convert_note_tnam(text).unwrap(), text.to_vec());
    }

    #[test]
    fn test_xndp_forces_platform_sentinel() {
        let mut body = 0x00014444u32.to_be_bytes().to_vec();
        body.push(0xFF); // console flag value
        body.extend_from_slice(&[0x12, 0x34, 0x56]);
        let out = convert_xndp(&body).unwrap();
        assert_eq!(u32::from_le_bytes(out[0..4].try_into().unwrap()), 0x00014444);
        assert_eq!(out[4], 0x00);
        assert_eq!(&out[5..8], &[0x12, 0x34, 0x56]);
    }

    fn be32(v: u32, out: &mut Vec<u8>) {
        out.extend_from_slice(&v.to_be_bytes());
    }

    #[test]
    fn test_nvmi_without_island() {
        let mut body = Vec::new();
        be32(7, &mut body); // unknown
        be32(0x00010000, &mut body); // navmesh
        be32(0, &mut body); // flags, island bit clear
        be32(1.0f32.to_bits(), &mut body);
        be32(2.0f32.to_bits(), &mut body);
        be32(3.0f32.to_bits(), &mut body);
        be32(2, &mut body); // merged count
        be32(0x00010001, &mut body);
        be32(0x00010002, &mut body);
        be32(1, &mut body); // preferred count
        be32(0x00010003, &mut body);
        be32(0x00020000, &mut body); // tail: worldspace
        be32(0x00000005, &mut body); // tail: grid
        let out = convert_nvmi(&body).unwrap();
        assert_eq!(out.len(), body.len());
        assert_eq!(u32::from_le_bytes(out[24..28].try_into().unwrap()), 2);
        assert_eq!(
            u32::from_le_bytes(out[28..32].try_into().unwrap()),
            0x00010001
        );
    }

    #[test]
    fn test_nvmi_island_block() {
        let mut body = Vec::new();
        be32(0, &mut body);
        be32(0x00010000, &mut body);
        be32(NVMI_ISLAND_FLAG, &mut body);
        be32(0, &mut body);
        be32(0, &mut body);
        be32(0, &mut body);
        be32(0, &mut body); // merged count
        be32(0, &mut body); // preferred count
        // Island: six bounds floats, one triangle, two vertices.
        for _ in 0..6 {
            be32(1.0f32.to_bits(), &mut body);
        }
        be32(1, &mut body);
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&2u16.to_be_bytes());
        body.extend_from_slice(&3u16.to_be_bytes());
        be32(2, &mut body);
        for _ in 0..6 {
            be32(0.5f32.to_bits(), &mut body);
        }
        let out = convert_nvmi(&body).unwrap();
        assert_eq!(out.len(), body.len());
        // The triangle indices swapped as 16-bit values.
        let tri_off = 8 * 4 + 6 * 4 + 4;
        assert_eq!(
            u16::from_le_bytes(out[tri_off..tri_off + 2].try_into().unwrap()),
            1
        );
    }

    #[test]
    fn test_nvmi_truncated_count_is_error() {
        let mut body = Vec::new();
        be32(0, &mut body);
        be32(0x00010000, &mut body);
        be32(0, &mut body);
        be32(0, &mut body);
        be32(0, &mut body);
        be32(0, &mut body);
        be32(10, &mut body); // merged count overruns the body
        assert!(convert_nvmi(&body).is_err());
    }

    #[test]
    fn test_nvci_three_arrays() {
        let mut body = Vec::new();
        be32(0x00010000, &mut body);
        be32(1, &mut body);
        be32(0x00010001, &mut body);
        be32(0, &mut body);
        be32(2, &mut body);
        be32(0x00010002, &mut body);
        be32(0x00010003, &mut body);
        let out = convert_nvci(&body).unwrap();
        assert_eq!(out.len(), body.len());
        assert_eq!(
            u32::from_le_bytes(out[out.len() - 4..].try_into().unwrap()),
            0x00010003
        );
    }

    #[test]
    fn test_nvgd_cell_lists() {
        let mut body = Vec::new();
        be32(2, &mut body); // divisor
        be32(1.0f32.to_bits(), &mut body);
        be32(1.0f32.to_bits(), &mut body);
        for _ in 0..4 {
            be32(0, &mut body);
        }
        // Two cells: one with two triangles, one empty.
        body.extend_from_slice(&2u16.to_be_bytes());
        body.extend_from_slice(&5u16.to_be_bytes());
        body.extend_from_slice(&6u16.to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes());
        let out = convert_nvgd(&body).unwrap();
        assert_eq!(out.len(), body.len());
        let cells = &out[28..];
        assert_eq!(u16::from_le_bytes(cells[0..2].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(cells[2..4].try_into().unwrap()), 5);
    }
}
