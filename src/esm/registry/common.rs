//! Schemas shared across most record types: identifiers, names, models,
//! bounds, scripts and the file header record.

use super::{field, pad};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // Editor identifier and display names: plain text everywhere.
    b.add_loose(b"EDID", None, Schema::string());
    b.add_loose(b"FULL", None, Schema::string());
    b.add_loose(b"DESC", None, Schema::string());

    // Model filenames and their texture-hash blobs.
    for tag in [b"MODL", b"MOD2", b"MOD3", b"MOD4"] {
        b.add_loose(tag, None, Schema::string());
    }
    for tag in [b"MODT", b"MO2T", b"MO3T", b"MO4T", b"MODS", b"MODD"] {
        b.add_loose(tag, None, Schema::bytes());
    }
    b.add(b"MODB", None, Schema::uint32("bound_radius"));

    // Icon paths.
    b.add_loose(b"ICON", None, Schema::string());
    b.add_loose(b"MICO", None, Schema::string());

    // Object bounds: six signed shorts.
    b.add(
        b"OBND",
        None,
        Schema::fields(vec![
            field("x1", Int16),
            field("y1", Int16),
            field("z1", Int16),
            field("x2", Int16),
            field("y2", Int16),
            field("z2", Int16),
        ]),
    );

    // Attached script.
    b.add(b"SCRI", None, Schema::form_id("script"));

    // Condition tuples are handled by an override during conversion; the
    // layouts here serve read-only field extraction.
    for size in [20usize, 24, 28] {
        let mut fields = vec![
            field("operator", UInt8),
            field("run_on_flags", UInt16),
            field("unused", UInt8),
            field("comparison_value", Float),
            field("function", UInt32),
            field("param1", UInt32),
        ];
        if size >= 24 {
            fields.push(field("param2", UInt32));
        }
        if size >= 28 {
            fields.push(field("reference", FormId));
        }
        b.add(b"CTDA", None, Schema::fields(fields));
    }

    // Destruction data.
    b.add(
        b"DEST",
        None,
        Schema::fields(vec![
            field("health", Int32),
            field("stage_count", UInt8),
            field("flags", UInt8),
            pad(2),
        ]),
    );
    b.add(
        b"DSTD",
        None,
        Schema::fields(vec![
            field("health_percent", UInt8),
            field("index", UInt8),
            field("stage_flags", UInt8),
            pad(1),
            field("self_damage_rate", Int32),
            field("explosion", FormId),
            field("debris", FormId),
            field("debris_count", Int32),
        ]),
    );
    b.add_loose(b"DMDL", None, Schema::string());
    b.add_loose(b"DMDT", None, Schema::bytes());
    b.add(b"DSTF", None, Schema::fields(vec![]));

    // Repair and equipment lists.
    b.add(b"REPL", None, Schema::form_id("repair_list"));
    b.add(b"ETYP", None, Schema::fields(vec![field("equipment_type", Int32)]));
    b.add(b"BIPL", None, Schema::form_id("biped_model_list"));

    // Pickup/drop sounds.
    b.add(b"YNAM", None, Schema::form_id("pickup_sound"));
    b.add(b"ZNAM", None, Schema::form_id("drop_sound"));

    // File header record.
    b.add(
        b"HEDR",
        Some(b"TES4"),
        Schema::fields(vec![
            field("version", Float),
            field("record_count", Int32),
            field("next_object_id", UInt32),
        ]),
    );
    b.add_loose(b"CNAM", Some(b"TES4"), Schema::string());
    b.add_loose(b"SNAM", Some(b"TES4"), Schema::string());
    b.add_loose(b"MAST", Some(b"TES4"), Schema::string());
    b.add(b"DATA", Some(b"TES4"), Schema::fields(vec![field("master_size", UInt64)]));
    b.add_loose(b"ONAM", Some(b"TES4"), Schema::array("overrides", FormId));

    // Extended-size escape carrier; consumed structurally, but the layout
    // is registered so stray occurrences still convert.
    b.add(b"XXXX", None, Schema::uint32("true_length"));

    // Placed-object base reference, used by REFR/ACHR/ACRE and also by the
    // placed grenade/mine records.
    b.add(b"NAME", None, Schema::form_id("base"));

    // Ownership, commonly attached to references and cells.
    b.add(b"XOWN", None, Schema::form_id("owner"));
    b.add(b"XRNK", None, Schema::fields(vec![field("rank", Int32)]));
    b.add(b"XGLB", None, Schema::form_id("global_variable"));

    // Embedded script header/body, shared by SCPT, QUST, INFO, PACK, TERM.
    b.add(
        b"SCHR",
        None,
        Schema::fields(vec![
            pad(4),
            field("ref_count", UInt32),
            field("compiled_size", UInt32),
            field("variable_count", UInt32),
            field("script_type", UInt16),
            field("script_flags", UInt16),
        ]),
    );
    // Compiled bytecode is opaque to the converter; the decompiler is a
    // separate consumer.
    b.add_loose(b"SCDA", None, Schema::bytes());
    b.add_loose(b"SCTX", None, Schema::string());
    b.add(
        b"SLSD",
        None,
        Schema::fields(vec![
            field("index", UInt32),
            pad(12),
            field("flags", UInt8),
            pad(7),
        ]),
    );
    b.add_loose(b"SCVR", None, Schema::string());
    b.add(b"SCRO", None, Schema::form_id("reference"));
    b.add(b"SCRV", None, Schema::uint32("variable_index"));
}

#[cfg(test)]
mod tests {
    use crate::esm::catalog::CatalogBuilder;
    use crate::esm::header::Signature;
    use crate::esm::schema::Sizing;

    #[test]
    fn test_hedr_is_twelve_bytes() {
        let mut b = CatalogBuilder::new();
        super::register(&mut b);
        let c = b.build();
        let r = c
            .resolve(Signature(*b"HEDR"), Signature(*b"TES4"), 12)
            .unwrap();
        assert_eq!(r.schema.sizing(), Sizing::Fixed(12));
    }

    #[test]
    fn test_ctda_variants_coexist() {
        let mut b = CatalogBuilder::new();
        super::register(&mut b);
        let c = b.build();
        for len in [20usize, 24, 28] {
            let r = c
                .resolve(Signature(*b"CTDA"), Signature(*b"INFO"), len)
                .unwrap();
            assert_eq!(r.schema.sizing(), Sizing::Fixed(len));
        }
    }
}
