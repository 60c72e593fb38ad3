//! Declarative subrecord schema registry
//!
//! The full schema table is built from pure registration functions grouped
//! by game-content category. Each module registers the layouts for one
//! slice of the record universe; `build_catalog` composes them into a
//! single immutable catalog.
//!
//! Registration conventions:
//! - `add` keys a fixed-layout schema by its exact byte size, so several
//!   entries for one signature/owner pair can coexist at different sizes.
//! - `add_loose` registers the any-length default for a signature.
//! - Unnamed fields are padding or opaque filler skipped by downstream
//!   field extraction.

mod actors;
mod common;
mod dialogue;
mod items;
mod magic;
mod misc;
mod navmesh;
mod world;

use crate::esm::catalog::{CatalogBuilder, SchemaCatalog};
use crate::esm::schema::{FieldKind, SubrecordField};

/// Build the complete schema catalog used by conversion and field
/// extraction.
pub fn build_catalog() -> SchemaCatalog {
    let mut b = CatalogBuilder::new();
    common::register(&mut b);
    items::register(&mut b);
    actors::register(&mut b);
    magic::register(&mut b);
    world::register(&mut b);
    dialogue::register(&mut b);
    navmesh::register(&mut b);
    misc::register(&mut b);
    b.build()
}

pub(crate) fn field(name: &'static str, kind: FieldKind) -> SubrecordField {
    SubrecordField::new(name, kind)
}

pub(crate) fn pad(size: usize) -> SubrecordField {
    SubrecordField::sized("", FieldKind::Padding, size)
}

pub(crate) fn raw(name: &'static str, size: usize) -> SubrecordField {
    SubrecordField::sized(name, FieldKind::Bytes, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::esm::catalog::ResolutionTier;
    use crate::esm::header::Signature;

    #[test]
    fn test_catalog_composes_all_categories() {
        let c = build_catalog();
        assert!(c.len() > 200, "expected a few hundred entries, got {}", c.len());
    }

    #[test]
    fn test_cross_category_lookups() {
        let c = build_catalog();
        // common
        assert!(c
            .resolve(Signature(*b"EDID"), Signature(*b"WEAP"), 9)
            .is_some());
        // items
        assert!(c
            .resolve(Signature(*b"ENIT"), Signature(*b"ALCH"), 20)
            .is_some());
        // world
        assert!(c
            .resolve(Signature(*b"XTEL"), Signature(*b"REFR"), 28)
            .is_some());
        // dialogue
        assert!(c
            .resolve(Signature(*b"TRDT"), Signature(*b"INFO"), 24)
            .is_some());
    }

    #[test]
    fn test_gmst_size_tiers() {
        let c = build_catalog();
        // 4-byte game settings are numeric, anything else is text. Both
        // entries live under the same signature/owner pair.
        let r = c
            .resolve(Signature(*b"DATA"), Signature(*b"GMST"), 4)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::Exact);
        let r = c
            .resolve(Signature(*b"DATA"), Signature(*b"GMST"), 11)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::OwnerAnyLength);
    }
}
