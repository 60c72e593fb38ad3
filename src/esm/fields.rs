//! Read-only field extraction
//!
//! Downstream analysis tools (FormID/editor-id indexing and the external
//! dump/script/texture consumers) need typed views of subrecord bodies
//! without converting anything. `read_fields` decodes a body against the
//! same catalog the converter uses, in either byte order, and returns an
//! ordered name-to-value map. No write-back.

use crate::error::{Error, Result};
use crate::esm::catalog::SchemaCatalog;
use crate::esm::codec::{decode_word_swapped, Endian};
use crate::esm::header::Signature;
use crate::esm::schema::{FieldKind, Schema, Sizing, SubrecordField};

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    FormId(u32),
    Color([u8; 4]),
    Floats(Vec<f32>),
    Bytes(Vec<u8>),
    Text(String),
    /// One entry per element of a repeating schema.
    Elements(Vec<FieldMap>),
}

/// An ordered name-to-value map; order matches the schema's field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FieldValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, name: &str, value: FieldValue) {
        self.entries.push((name.to_string(), value));
    }
}

/// Decode one subrecord body into named values. `endian` selects the side
/// being inspected: `Big` for console input, `Little` for converted
/// output.
pub fn read_fields(
    catalog: &SchemaCatalog,
    signature: Signature,
    owner: Signature,
    body: &[u8],
    endian: Endian,
) -> Result<FieldMap> {
    let resolved = catalog
        .resolve(signature, owner, body.len())
        .ok_or(Error::UnknownSchema {
            signature,
            owner,
            length: body.len(),
        })?;
    decode_schema(resolved.schema, signature, owner, body, endian)
}

fn decode_schema(
    schema: &Schema,
    signature: Signature,
    owner: Signature,
    body: &[u8],
    endian: Endian,
) -> Result<FieldMap> {
    let mut map = FieldMap::default();
    match schema.sizing() {
        Sizing::Fixed(expected) => {
            if body.len() != expected {
                return Err(Error::SchemaSizeMismatch {
                    signature,
                    owner,
                    expected,
                    found: body.len(),
                });
            }
            decode_fields(schema.fields_list(), body, endian, &mut map);
        }
        Sizing::AnySize => {
            let prefix = schema.fixed_prefix_size();
            if body.len() < prefix {
                return Err(Error::SchemaSizeMismatch {
                    signature,
                    owner,
                    expected: prefix,
                    found: body.len(),
                });
            }
            decode_fields(schema.fields_list(), body, endian, &mut map);
        }
        Sizing::Repeating(elem) => {
            if elem == 0 || body.len() % elem != 0 {
                return Err(Error::SchemaSizeMismatch {
                    signature,
                    owner,
                    expected: elem,
                    found: body.len(),
                });
            }
            // A repeating float/FormID array flattens to one value; a
            // composite element yields one map per element.
            if schema.fields_list().len() == 1 {
                let kind = schema.fields_list()[0].kind;
                let name = schema.fields_list()[0].name;
                if kind == FieldKind::Float {
                    let floats = body
                        .chunks_exact(4)
                        .map(|c| f32::from_bits(endian.read_u32(c)))
                        .collect();
                    map.push(name, FieldValue::Floats(floats));
                    return Ok(map);
                }
            }
            let mut elements = Vec::with_capacity(body.len() / elem.max(1));
            for chunk in body.chunks_exact(elem) {
                let mut element = FieldMap::default();
                decode_fields(schema.fields_list(), chunk, endian, &mut element);
                elements.push(element);
            }
            map.push("elements", FieldValue::Elements(elements));
        }
    }
    Ok(map)
}

fn decode_fields(fields: &[SubrecordField], body: &[u8], endian: Endian, map: &mut FieldMap) {
    let mut offset = 0usize;
    for f in fields {
        let size = f.effective_size().unwrap_or(body.len() - offset);
        let bytes = &body[offset..offset + size];
        offset += size;
        if f.name.is_empty() {
            continue;
        }
        map.push(f.name, decode_one(f.kind, bytes, endian));
    }
}

fn decode_one(kind: FieldKind, bytes: &[u8], endian: Endian) -> FieldValue {
    match kind {
        FieldKind::UInt8 | FieldKind::Padding => FieldValue::U8(bytes[0]),
        FieldKind::Int8 => FieldValue::I8(bytes[0] as i8),
        FieldKind::UInt16 => FieldValue::U16(endian.read_u16(bytes)),
        FieldKind::Int16 => FieldValue::I16(endian.read_u16(bytes) as i16),
        FieldKind::UInt32 => FieldValue::U32(endian.read_u32(bytes)),
        FieldKind::Int32 => FieldValue::I32(endian.read_u32(bytes) as i32),
        FieldKind::UInt64 => FieldValue::U64(endian.read_u64(bytes)),
        FieldKind::Int64 => FieldValue::I64(endian.read_u64(bytes) as i64),
        FieldKind::Float => FieldValue::F32(endian.read_f32(bytes)),
        FieldKind::Double => FieldValue::F64(endian.read_f64(bytes)),
        FieldKind::FormId => FieldValue::FormId(endian.read_u32(bytes)),
        // Pre-swapped kinds are little-endian regardless of the side being
        // inspected.
        FieldKind::FormIdLittleEndian => {
            FieldValue::FormId(Endian::Little.read_u32(bytes))
        }
        FieldKind::UInt16LittleEndian => FieldValue::U16(Endian::Little.read_u16(bytes)),
        FieldKind::UInt32WordSwapped => match endian {
            Endian::Big => FieldValue::U32(decode_word_swapped(bytes)),
            Endian::Little => FieldValue::U32(Endian::Little.read_u32(bytes)),
        },
        FieldKind::Vec3 | FieldKind::Quaternion | FieldKind::PosRot => FieldValue::Floats(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_bits(endian.read_u32(c)))
                .collect(),
        ),
        FieldKind::ColorRgba => FieldValue::Color([bytes[0], bytes[1], bytes[2], bytes[3]]),
        FieldKind::ColorArgb => match endian {
            // ARGB only exists on the source side; normalize to RGBA.
            Endian::Big => FieldValue::Color([bytes[1], bytes[2], bytes[3], bytes[0]]),
            Endian::Little => FieldValue::Color([bytes[0], bytes[1], bytes[2], bytes[3]]),
        },
        FieldKind::Bytes => FieldValue::Bytes(bytes.to_vec()),
        FieldKind::String => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            FieldValue::Text(String::from_utf8_lossy(&bytes[..end]).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::esm::registry::build_catalog;

    fn sig(s: &[u8; 4]) -> Signature {
        Signature(*s)
    }

    #[test]
    fn test_read_fixed_fields_console_side() {
        let catalog = build_catalog();
        let mut body = Vec::new();
        body.extend_from_slice(&250i32.to_be_bytes());
        body.extend_from_slice(&3.5f32.to_be_bytes());
        let map = read_fields(&catalog, sig(b"DATA"), sig(b"MISC"), &body, Endian::Big).unwrap();
        assert_eq!(map.get("value"), Some(&FieldValue::I32(250)));
        assert_eq!(map.get("weight"), Some(&FieldValue::F32(3.5)));
    }

    #[test]
    fn test_read_fields_pc_side() {
        let catalog = build_catalog();
        let mut body = Vec::new();
        body.extend_from_slice(&250i32.to_le_bytes());
        body.extend_from_slice(&3.5f32.to_le_bytes());
        let map =
            read_fields(&catalog, sig(b"DATA"), sig(b"MISC"), &body, Endian::Little).unwrap();
        assert_eq!(map.get("value"), Some(&FieldValue::I32(250)));
    }

    #[test]
    fn test_read_string() {
        let catalog = build_catalog();
        let map = read_fields(
            &catalog,
            sig(b"EDID"),
            sig(b"ALCH"),
            b"TestAlch\0",
            Endian::Big,
        )
        .unwrap();
        assert_eq!(
            map.get("value"),
            Some(&FieldValue::Text("TestAlch".to_string()))
        );
    }

    #[test]
    fn test_padding_is_skipped() {
        let catalog = build_catalog();
        // LVLO: level i16, pad, FormID, count i16, pad.
        let mut body = Vec::new();
        body.extend_from_slice(&4i16.to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        body.extend_from_slice(&0x00010001u32.to_be_bytes());
        body.extend_from_slice(&2i16.to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        let map = read_fields(&catalog, sig(b"LVLO"), sig(b"LVLI"), &body, Endian::Big).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("level"), Some(&FieldValue::I16(4)));
        assert_eq!(map.get("reference"), Some(&FieldValue::FormId(0x00010001)));
    }

    #[test]
    fn test_repeating_composite_elements() {
        let catalog = build_catalog();
        let mut body = Vec::new();
        for (w, c, g) in [(0x10u32, 40u32, 0u32), (0x11, 60, 0)] {
            body.extend_from_slice(&w.to_be_bytes());
            body.extend_from_slice(&(c as i32).to_be_bytes());
            body.extend_from_slice(&g.to_be_bytes());
        }
        let map = read_fields(&catalog, sig(b"WLST"), sig(b"CLMT"), &body, Endian::Big).unwrap();
        match map.get("elements") {
            Some(FieldValue::Elements(els)) => {
                assert_eq!(els.len(), 2);
                assert_eq!(els[0].get("weather"), Some(&FieldValue::FormId(0x10)));
                assert_eq!(els[1].get("chance"), Some(&FieldValue::I32(60)));
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_float_array_flattens() {
        let catalog = build_catalog();
        let mut body = Vec::new();
        for v in [0.5f32, 1.5, 2.5] {
            body.extend_from_slice(&v.to_be_bytes());
        }
        let map = read_fields(&catalog, sig(b"FGGS"), sig(b"NPC_"), &body, Endian::Big).unwrap();
        assert_eq!(
            map.get("geometry_symmetric"),
            Some(&FieldValue::Floats(vec![0.5, 1.5, 2.5]))
        );
    }
}
