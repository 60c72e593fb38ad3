//! Subrecord layout schemas
//!
//! A schema is an ordered list of typed fields describing one subrecord
//! shape. Conversion behavior is carried by the field kind: most kinds
//! reverse their bytes, a few pass through, and two use orderings that are
//! neither big- nor little-endian.

/// One field kind per distinct conversion behavior. Sizes derive from the
/// kind unless a field carries an explicit override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float,
    Double,
    /// 32-bit form identifier, byte-reversed like any u32.
    FormId,
    /// FormID already stored little-endian on the console side; passthrough.
    FormIdLittleEndian,
    /// u16 already stored little-endian on the console side; passthrough.
    UInt16LittleEndian,
    /// Two big-endian 16-bit halves, low half first. A third byte order,
    /// not expressible as a reversal.
    UInt32WordSwapped,
    /// Three consecutive floats, each reversed independently.
    Vec3,
    /// Four consecutive floats, each reversed independently.
    Quaternion,
    /// Position plus rotation: six consecutive floats.
    PosRot,
    /// Four color bytes in RGBA order; passthrough.
    ColorRgba,
    /// Four color bytes in ARGB order; permuted to RGBA on conversion.
    ColorArgb,
    /// Opaque bytes; passthrough. Sized by override or trailing.
    Bytes,
    /// Zero-terminated or length-bounded text; passthrough.
    String,
    /// Alignment padding; passthrough. Sized by override, 1 byte otherwise.
    Padding,
}

impl FieldKind {
    /// Intrinsic byte size, or `None` for kinds sized by context
    /// (byte blobs, strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            FieldKind::UInt8 | FieldKind::Int8 | FieldKind::Padding => Some(1),
            FieldKind::UInt16
            | FieldKind::Int16
            | FieldKind::UInt16LittleEndian => Some(2),
            FieldKind::UInt32
            | FieldKind::Int32
            | FieldKind::Float
            | FieldKind::FormId
            | FieldKind::FormIdLittleEndian
            | FieldKind::UInt32WordSwapped
            | FieldKind::ColorRgba
            | FieldKind::ColorArgb => Some(4),
            FieldKind::UInt64 | FieldKind::Int64 | FieldKind::Double => Some(8),
            FieldKind::Vec3 => Some(12),
            FieldKind::Quaternion => Some(16),
            FieldKind::PosRot => Some(24),
            FieldKind::Bytes | FieldKind::String => None,
        }
    }
}

/// One field of a subrecord layout. An empty name marks padding or bytes
/// that downstream field extraction should skip.
#[derive(Debug, Clone, Copy)]
pub struct SubrecordField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Explicit byte size; overrides the kind's intrinsic size.
    pub size: Option<usize>,
}

impl SubrecordField {
    pub const fn new(name: &'static str, kind: FieldKind) -> SubrecordField {
        SubrecordField {
            name,
            kind,
            size: None,
        }
    }

    pub const fn sized(name: &'static str, kind: FieldKind, size: usize) -> SubrecordField {
        SubrecordField {
            name,
            kind,
            size: Some(size),
        }
    }

    /// Effective size: explicit override, intrinsic kind size, or `None`
    /// for an unsized trailing field that consumes the remainder.
    pub fn effective_size(&self) -> Option<usize> {
        self.size.or_else(|| self.kind.size())
    }
}

/// How a schema relates to the byte length of a subrecord body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Fields sum to exactly this many bytes.
    Fixed(usize),
    /// Any length is acceptable (strings, blobs, fixed prefix + free tail).
    AnySize,
    /// Body is a uniform array of elements of this size; the element count
    /// is implied by the total length.
    Repeating(usize),
}

/// Declarative description of one subrecord shape.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<SubrecordField>,
    sizing: Sizing,
}

impl Schema {
    /// A fixed-layout schema. If the final field is unsized it consumes
    /// whatever trails the fixed prefix and the schema accepts any length
    /// at least as large as that prefix.
    pub fn fields(fields: Vec<SubrecordField>) -> Schema {
        let mut total = 0usize;
        let mut open_tail = false;
        for (i, f) in fields.iter().enumerate() {
            match f.effective_size() {
                Some(n) => total += n,
                None => {
                    debug_assert!(i == fields.len() - 1, "unsized field must be last");
                    open_tail = true;
                }
            }
        }
        let sizing = if open_tail {
            Sizing::AnySize
        } else {
            Sizing::Fixed(total)
        };
        Schema { fields, sizing }
    }

    /// Any-length schema decoded as a single kind (string, byte blob).
    pub fn blob(name: &'static str, kind: FieldKind) -> Schema {
        Schema {
            fields: vec![SubrecordField::new(name, kind)],
            sizing: Sizing::AnySize,
        }
    }

    /// Zero-terminated string covering the whole body.
    pub fn string() -> Schema {
        Schema::blob("value", FieldKind::String)
    }

    /// Opaque passthrough bytes covering the whole body.
    pub fn bytes() -> Schema {
        Schema::blob("data", FieldKind::Bytes)
    }

    /// Uniform repeating array of one field (FormID arrays, float arrays).
    pub fn array(name: &'static str, kind: FieldKind) -> Schema {
        let elem = kind.size().expect("array element kind must be sized");
        Schema {
            fields: vec![SubrecordField::new(name, kind)],
            sizing: Sizing::Repeating(elem),
        }
    }

    /// Repeating array whose element is itself a field sequence
    /// (e.g. navmesh triangles: six shorts plus a flag word).
    pub fn array_of(fields: Vec<SubrecordField>) -> Schema {
        let elem: usize = fields
            .iter()
            .map(|f| f.effective_size().expect("array element fields must be sized"))
            .sum();
        Schema {
            fields,
            sizing: Sizing::Repeating(elem),
        }
    }

    /// Single FormID.
    pub fn form_id(name: &'static str) -> Schema {
        Schema::fields(vec![SubrecordField::new(name, FieldKind::FormId)])
    }

    /// Single u32.
    pub fn uint32(name: &'static str) -> Schema {
        Schema::fields(vec![SubrecordField::new(name, FieldKind::UInt32)])
    }

    /// Single float.
    pub fn float(name: &'static str) -> Schema {
        Schema::fields(vec![SubrecordField::new(name, FieldKind::Float)])
    }

    pub fn fields_list(&self) -> &[SubrecordField] {
        &self.fields
    }

    pub fn sizing(&self) -> Sizing {
        self.sizing
    }

    /// Fixed expected size, if the schema has one.
    pub fn fixed_size(&self) -> Option<usize> {
        match self.sizing {
            Sizing::Fixed(n) => Some(n),
            _ => None,
        }
    }

    /// Whether a body of `len` bytes is acceptable for this schema.
    pub fn accepts_len(&self, len: usize) -> bool {
        match self.sizing {
            Sizing::Fixed(n) => len == n,
            Sizing::AnySize => len >= self.fixed_prefix_size(),
            Sizing::Repeating(elem) => elem != 0 && len % elem == 0,
        }
    }

    /// Byte size of the sized leading fields (everything before an unsized
    /// trailing field).
    pub fn fixed_prefix_size(&self) -> usize {
        self.fields
            .iter()
            .filter_map(|f| f.effective_size())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sizing_sums_fields() {
        let s = Schema::fields(vec![
            SubrecordField::new("value", FieldKind::Int32),
            SubrecordField::new("weight", FieldKind::Float),
        ]);
        assert_eq!(s.sizing(), Sizing::Fixed(8));
        assert!(s.accepts_len(8));
        assert!(!s.accepts_len(12));
    }

    #[test]
    fn test_explicit_size_override() {
        let f = SubrecordField::sized("", FieldKind::Padding, 3);
        assert_eq!(f.effective_size(), Some(3));
    }

    #[test]
    fn test_trailing_unsized_field_makes_any_size() {
        let s = Schema::fields(vec![
            SubrecordField::new("offset", FieldKind::Float),
            SubrecordField::new("heights", FieldKind::Bytes),
        ]);
        assert_eq!(s.sizing(), Sizing::AnySize);
        assert!(s.accepts_len(4));
        assert!(s.accepts_len(1096));
        assert!(!s.accepts_len(2));
    }

    #[test]
    fn test_repeating_accepts_multiples() {
        let s = Schema::array("forms", FieldKind::FormId);
        assert_eq!(s.sizing(), Sizing::Repeating(4));
        assert!(s.accepts_len(0));
        assert!(s.accepts_len(16));
        assert!(!s.accepts_len(6));
    }

    #[test]
    fn test_array_of_composite_element() {
        let s = Schema::array_of(vec![
            SubrecordField::new("vertex0", FieldKind::Int16),
            SubrecordField::new("vertex1", FieldKind::Int16),
            SubrecordField::new("vertex2", FieldKind::Int16),
            SubrecordField::new("edge0", FieldKind::Int16),
            SubrecordField::new("edge1", FieldKind::Int16),
            SubrecordField::new("edge2", FieldKind::Int16),
            SubrecordField::new("flags", FieldKind::UInt32),
        ]);
        assert_eq!(s.sizing(), Sizing::Repeating(16));
        assert!(s.accepts_len(48));
        assert!(!s.accepts_len(50));
    }

    #[test]
    fn test_kind_sizes() {
        assert_eq!(FieldKind::PosRot.size(), Some(24));
        assert_eq!(FieldKind::Quaternion.size(), Some(16));
        assert_eq!(FieldKind::Vec3.size(), Some(12));
        assert_eq!(FieldKind::String.size(), None);
    }
}
