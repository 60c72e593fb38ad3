//! Schema catalog: (signature, owner, length) to layout resolution
//!
//! Lookup runs most-specific first: exact signature/owner/length, then
//! signature/owner at any length, then signature/length across all owners,
//! then the signature-wide default, then the dynamic owner and suffix
//! rules, and finally the length-based fallback for the catch-all `DATA`
//! tag. A miss after every tier is a hard error at the call site; the
//! catalog itself reports which tier served each hit so coverage gaps can
//! be surfaced from a conversion run.

use std::collections::HashMap;

use crate::esm::header::Signature;
use crate::esm::schema::{FieldKind, Schema};

/// Owning record type whose unrecognized subrecords are float timelines.
const DYNAMIC_FLOAT_OWNER: Signature = Signature(*b"IMAD");
/// Keyed subrecord family suffix; any `?IAD` tag is a float timeline.
const FLOAT_FAMILY_SUFFIX: &[u8; 3] = b"IAD";
/// The one catch-all tag with a generic length-based fallback.
const CATCH_ALL: Signature = Signature(*b"DATA");

/// Which tier of the lookup served a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// A hand-written override, consulted before the catalog.
    Override,
    /// Exact (signature, owner, length) entry.
    Exact,
    /// (signature, owner) entry accepting any length.
    OwnerAnyLength,
    /// (signature, length) entry across all owners.
    AnyOwnerLength,
    /// Signature-wide default entry.
    Default,
    /// Unrecognized subrecord under the dynamic float-array owner.
    DynamicOwner,
    /// Keyed-suffix float-array family.
    SuffixFamily,
    /// Length-based fallback for the catch-all tag.
    CatchAll,
}

impl ResolutionTier {
    /// True for tiers that indicate a schema-coverage gap rather than a
    /// deliberate entry.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            ResolutionTier::DynamicOwner | ResolutionTier::SuffixFamily | ResolutionTier::CatchAll
        )
    }
}

impl std::fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResolutionTier::Override => "override",
            ResolutionTier::Exact => "exact",
            ResolutionTier::OwnerAnyLength => "owner-any-length",
            ResolutionTier::AnyOwnerLength => "any-owner-length",
            ResolutionTier::Default => "default",
            ResolutionTier::DynamicOwner => "dynamic-owner",
            ResolutionTier::SuffixFamily => "suffix-family",
            ResolutionTier::CatchAll => "catch-all",
        };
        f.write_str(name)
    }
}

/// A successful resolution: the schema plus the tier that produced it.
pub struct Resolved<'a> {
    pub schema: &'a Schema,
    pub tier: ResolutionTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    signature: Signature,
    owner: Option<Signature>,
    length: Option<usize>,
}

/// The composed schema table. Built once from the registry and immutable
/// afterwards, so conversions can share it freely.
pub struct SchemaCatalog {
    entries: HashMap<Key, Schema>,
    // Fallback schemas are owned here so resolve() can hand out references
    // with the catalog's lifetime.
    float_array: Schema,
    raw_bytes: Schema,
}

impl SchemaCatalog {
    /// Resolve a subrecord layout. `None` means no tier matched; callers
    /// treat that as a fatal unknown-schema error.
    pub fn resolve(
        &self,
        signature: Signature,
        owner: Signature,
        length: usize,
    ) -> Option<Resolved<'_>> {
        let probes = [
            (
                Key {
                    signature,
                    owner: Some(owner),
                    length: Some(length),
                },
                ResolutionTier::Exact,
            ),
            (
                Key {
                    signature,
                    owner: Some(owner),
                    length: None,
                },
                ResolutionTier::OwnerAnyLength,
            ),
            (
                Key {
                    signature,
                    owner: None,
                    length: Some(length),
                },
                ResolutionTier::AnyOwnerLength,
            ),
            (
                Key {
                    signature,
                    owner: None,
                    length: None,
                },
                ResolutionTier::Default,
            ),
        ];
        for (key, tier) in probes {
            if let Some(schema) = self.entries.get(&key) {
                if schema.accepts_len(length) {
                    return Some(Resolved { schema, tier });
                }
            }
        }

        if owner == DYNAMIC_FLOAT_OWNER && length % 4 == 0 {
            return Some(Resolved {
                schema: &self.float_array,
                tier: ResolutionTier::DynamicOwner,
            });
        }
        if &signature.0[1..4] == FLOAT_FAMILY_SUFFIX && length % 4 == 0 {
            return Some(Resolved {
                schema: &self.float_array,
                tier: ResolutionTier::SuffixFamily,
            });
        }
        if signature == CATCH_ALL {
            let schema = if length <= 2 {
                &self.raw_bytes
            } else if length <= 64 && length % 4 == 0 {
                &self.float_array
            } else {
                &self.raw_bytes
            };
            return Some(Resolved {
                schema,
                tier: ResolutionTier::CatchAll,
            });
        }

        None
    }

    /// Number of registered entries (excluding the dynamic tiers).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates registrations from the per-category registry modules and
/// composes them into one catalog.
pub struct CatalogBuilder {
    entries: HashMap<Key, Schema>,
}

impl CatalogBuilder {
    pub fn new() -> CatalogBuilder {
        CatalogBuilder {
            entries: HashMap::new(),
        }
    }

    /// Register a schema. The key's length component is the schema's fixed
    /// size when it has one, so fixed-layout entries only match bodies of
    /// exactly that length and variable entries match any length.
    pub fn add(&mut self, signature: &[u8; 4], owner: Option<&[u8; 4]>, schema: Schema) {
        let key = Key {
            signature: Signature(*signature),
            owner: owner.map(|o| Signature(*o)),
            length: schema.fixed_size(),
        };
        debug_assert!(
            !self.entries.contains_key(&key),
            "duplicate schema registration for {:?}",
            key
        );
        self.entries.insert(key, schema);
    }

    /// Register a fixed-layout schema under the any-length key, making it
    /// the default shape for the signature regardless of body size checks
    /// at more specific tiers. Used sparingly; `add` is the normal path.
    pub fn add_loose(&mut self, signature: &[u8; 4], owner: Option<&[u8; 4]>, schema: Schema) {
        let key = Key {
            signature: Signature(*signature),
            owner: owner.map(|o| Signature(*o)),
            length: None,
        };
        self.entries.insert(key, schema);
    }

    pub fn build(self) -> SchemaCatalog {
        SchemaCatalog {
            entries: self.entries,
            float_array: Schema::array("values", FieldKind::Float),
            raw_bytes: Schema::bytes(),
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        CatalogBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::esm::schema::SubrecordField;

    fn sig(s: &[u8; 4]) -> Signature {
        Signature(*s)
    }

    fn fixed(n: usize) -> Schema {
        Schema::fields(vec![SubrecordField::sized("data", FieldKind::Bytes, n)])
    }

    #[test]
    fn test_specificity_order() {
        let mut b = CatalogBuilder::new();
        b.add(b"DNAM", Some(b"WEAP"), fixed(8));
        b.add_loose(b"DNAM", Some(b"WEAP"), Schema::string());
        b.add(b"DNAM", None, fixed(8));
        b.add_loose(b"DNAM", None, Schema::bytes());
        let c = b.build();

        // Exact (sig, owner, len) wins over every general entry.
        let r = c.resolve(sig(b"DNAM"), sig(b"WEAP"), 8).unwrap();
        assert_eq!(r.tier, ResolutionTier::Exact);

        // Wrong length under the owner falls to the owner any-length entry.
        let r = c.resolve(sig(b"DNAM"), sig(b"WEAP"), 5).unwrap();
        assert_eq!(r.tier, ResolutionTier::OwnerAnyLength);

        // A different owner at the registered length takes the
        // owner-agnostic sized entry.
        let r = c.resolve(sig(b"DNAM"), sig(b"ARMO"), 8).unwrap();
        assert_eq!(r.tier, ResolutionTier::AnyOwnerLength);

        // Different owner, unregistered length: signature-wide default.
        let r = c.resolve(sig(b"DNAM"), sig(b"ARMO"), 5).unwrap();
        assert_eq!(r.tier, ResolutionTier::Default);
    }

    #[test]
    fn test_dynamic_owner_float_rule() {
        let c = CatalogBuilder::new().build();
        let r = c.resolve(sig(b"QQZZ"), sig(b"IMAD"), 16).unwrap();
        assert_eq!(r.tier, ResolutionTier::DynamicOwner);
        assert!(r.tier.is_fallback());
    }

    #[test]
    fn test_suffix_family_rule() {
        let c = CatalogBuilder::new().build();
        let r = c.resolve(sig(b"NIAD"), sig(b"WTHR"), 8).unwrap();
        assert_eq!(r.tier, ResolutionTier::SuffixFamily);
        let r = c.resolve(sig(b"RIAD"), sig(b"WTHR"), 24).unwrap();
        assert_eq!(r.tier, ResolutionTier::SuffixFamily);
    }

    #[test]
    fn test_catch_all_length_rules() {
        let c = CatalogBuilder::new().build();
        // <= 2 bytes: raw.
        let r = c.resolve(sig(b"DATA"), sig(b"ZZZZ"), 1).unwrap();
        assert_eq!(r.tier, ResolutionTier::CatchAll);
        assert_eq!(r.schema.fields_list()[0].kind, FieldKind::Bytes);
        // In (2, 64] and divisible by 4: float array.
        let r = c.resolve(sig(b"DATA"), sig(b"ZZZZ"), 16).unwrap();
        assert_eq!(r.schema.fields_list()[0].kind, FieldKind::Float);
        // Not divisible by 4: raw.
        let r = c.resolve(sig(b"DATA"), sig(b"ZZZZ"), 15).unwrap();
        assert_eq!(r.schema.fields_list()[0].kind, FieldKind::Bytes);
        // Above 64: raw.
        let r = c.resolve(sig(b"DATA"), sig(b"ZZZZ"), 68).unwrap();
        assert_eq!(r.schema.fields_list()[0].kind, FieldKind::Bytes);
    }

    #[test]
    fn test_miss_after_all_tiers() {
        let c = CatalogBuilder::new().build();
        assert!(c.resolve(sig(b"QQZZ"), sig(b"WEAP"), 10).is_none());
    }
}
