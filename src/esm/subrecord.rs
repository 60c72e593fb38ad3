//! Schema-driven subrecord conversion
//!
//! `convert` is the single entry point for one subrecord body: overrides
//! first, then catalog resolution, then the generic per-field engine. It
//! is pure and total — either the whole body converts or an error comes
//! back; nothing is ever half-written.

use crate::error::{Error, Result};
use crate::esm::catalog::{ResolutionTier, SchemaCatalog};
use crate::esm::codec::{
    push_argb_as_rgba, push_reversed, push_reversed_each, push_word_swapped,
};
use crate::esm::header::Signature;
use crate::esm::overrides;
use crate::esm::schema::{FieldKind, Schema, Sizing, SubrecordField};

/// A converted subrecord body plus the resolution tier that produced it,
/// so the caller can account for fallback usage.
#[derive(Debug)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub tier: ResolutionTier,
}

/// Convert one subrecord body from console to PC byte order.
pub fn convert(
    catalog: &SchemaCatalog,
    signature: Signature,
    owner: Signature,
    body: &[u8],
) -> Result<Converted> {
    if let Some(ov) = overrides::find(signature, owner) {
        let bytes = (ov.apply)(body).map_err(|e| match e {
            Error::MalformedSubrecord {
                signature, detail, ..
            } => Error::MalformedSubrecord {
                signature,
                owner,
                detail,
            },
            other => other,
        })?;
        return Ok(Converted {
            bytes,
            tier: ResolutionTier::Override,
        });
    }

    let resolved = catalog
        .resolve(signature, owner, body.len())
        .ok_or(Error::UnknownSchema {
            signature,
            owner,
            length: body.len(),
        })?;

    let bytes = apply_schema(resolved.schema, signature, owner, body)?;
    Ok(Converted {
        bytes,
        tier: resolved.tier,
    })
}

/// Apply a resolved schema to a body. Fixed layouts must match exactly;
/// repeating layouts must divide evenly; an unsized trailing field
/// consumes the remainder unmodified.
pub fn apply_schema(
    schema: &Schema,
    signature: Signature,
    owner: Signature,
    body: &[u8],
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
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
            convert_fields(schema.fields_list(), body, &mut out);
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
            convert_fields(schema.fields_list(), body, &mut out);
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
            for chunk in body.chunks_exact(elem) {
                convert_fields(schema.fields_list(), chunk, &mut out);
            }
        }
    }
    Ok(out)
}

/// Convert a run of sized fields; an unsized final field takes the tail.
/// Bounds are guaranteed by the sizing checks above.
fn convert_fields(fields: &[SubrecordField], body: &[u8], out: &mut Vec<u8>) {
    let mut offset = 0usize;
    for field in fields {
        match field.effective_size() {
            Some(size) => {
                convert_one(field, &body[offset..offset + size], out);
                offset += size;
            }
            None => {
                out.extend_from_slice(&body[offset..]);
                offset = body.len();
            }
        }
    }
    // Defensive: bytes past the last field (possible only for a malformed
    // hand-built schema) are preserved rather than dropped.
    if offset < body.len() {
        out.extend_from_slice(&body[offset..]);
    }
}

fn convert_one(field: &SubrecordField, bytes: &[u8], out: &mut Vec<u8>) {
    match field.kind {
        FieldKind::UInt8 | FieldKind::Int8 => out.extend_from_slice(bytes),
        FieldKind::UInt16 | FieldKind::Int16 => push_reversed(out, bytes),
        FieldKind::UInt32 | FieldKind::Int32 | FieldKind::Float | FieldKind::FormId => {
            push_reversed(out, bytes)
        }
        FieldKind::UInt64 | FieldKind::Int64 | FieldKind::Double => push_reversed(out, bytes),
        FieldKind::UInt16LittleEndian | FieldKind::FormIdLittleEndian => {
            out.extend_from_slice(bytes)
        }
        FieldKind::UInt32WordSwapped => push_word_swapped(out, bytes),
        FieldKind::Vec3 | FieldKind::Quaternion | FieldKind::PosRot => {
            push_reversed_each(out, bytes, 4)
        }
        FieldKind::ColorRgba => out.extend_from_slice(bytes),
        FieldKind::ColorArgb => push_argb_as_rgba(out, bytes),
        FieldKind::Bytes | FieldKind::String | FieldKind::Padding => {
            out.extend_from_slice(bytes)
        }
    }
}
