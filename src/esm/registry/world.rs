//! World records: worldspaces, cells, terrain, placed references, lights
//! and water.

use super::{field, pad};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // --- Worldspaces ---
    b.add(b"CNAM", Some(b"WRLD"), Schema::form_id("climate"));
    b.add(b"NAM2", Some(b"WRLD"), Schema::form_id("water"));
    b.add(b"NAM3", Some(b"WRLD"), Schema::form_id("lod_water_type"));
    b.add(b"NAM4", Some(b"WRLD"), Schema::float("lod_water_height"));
    b.add(
        b"DNAM",
        Some(b"WRLD"),
        Schema::fields(vec![
            field("default_land_height", Float),
            field("default_water_height", Float),
        ]),
    );
    b.add(
        b"NAM0",
        Some(b"WRLD"),
        Schema::fields(vec![field("min_x", Float), field("min_y", Float)]),
    );
    b.add(
        b"NAM9",
        Some(b"WRLD"),
        Schema::fields(vec![field("max_x", Float), field("max_y", Float)]),
    );
    b.add(
        b"MNAM",
        Some(b"WRLD"),
        Schema::fields(vec![
            field("usable_x", Int32),
            field("usable_y", Int32),
            field("nw_cell_x", Int16),
            field("nw_cell_y", Int16),
            field("se_cell_x", Int16),
            field("se_cell_y", Int16),
        ]),
    );
    b.add(b"WNAM", Some(b"WRLD"), Schema::form_id("parent_worldspace"));
    b.add(b"PNAM", Some(b"WRLD"), Schema::fields(vec![field("parent_flags", UInt16)]));
    b.add(b"DATA", Some(b"WRLD"), Schema::fields(vec![field("flags", UInt8)]));
    b.add(b"ZNAM", Some(b"WRLD"), Schema::form_id("music"));
    b.add_loose(b"NNAM", Some(b"WRLD"), Schema::string());
    b.add_loose(b"XNAM", Some(b"WRLD"), Schema::string());
    // The cell offset table: packed little-endian-free u32 offsets on PC,
    // big-endian on the console, so it converts as a uniform u32 array.
    b.add_loose(b"OFST", None, Schema::array("offsets", UInt32));

    // --- Cells ---
    b.add(b"DATA", Some(b"CELL"), Schema::fields(vec![field("flags", UInt8)]));
    b.add(
        b"XCLC",
        Some(b"CELL"),
        Schema::fields(vec![field("x", Int32), field("y", Int32)]),
    );
    b.add(
        b"XCLC",
        Some(b"CELL"),
        Schema::fields(vec![
            field("x", Int32),
            field("y", Int32),
            field("force_hide_flags", UInt32),
        ]),
    );
    b.add(
        b"XCLL",
        None,
        Schema::fields(vec![
            field("ambient", ColorRgba),
            field("directional", ColorRgba),
            field("fog", ColorRgba),
            field("fog_near", Float),
            field("fog_far", Float),
            field("directional_rotation_xy", Int32),
            field("directional_rotation_z", Int32),
            field("directional_fade", Float),
            field("fog_clip_distance", Float),
            field("fog_power", Float),
        ]),
    );
    b.add(b"XCLW", Some(b"CELL"), Schema::float("water_height"));
    b.add_loose(b"XNAM", Some(b"CELL"), Schema::string());
    b.add(b"XCLR", Some(b"CELL"), Schema::array("regions", FormId));
    b.add(b"XCIM", Some(b"CELL"), Schema::form_id("image_space"));
    b.add(b"XCET", Some(b"CELL"), Schema::fields(vec![field("unknown", UInt8)]));
    b.add(b"LTMP", Some(b"CELL"), Schema::form_id("lighting_template"));
    b.add(b"LNAM", Some(b"CELL"), Schema::uint32("lighting_inherit_flags"));
    b.add(b"XCCM", Some(b"CELL"), Schema::form_id("climate"));
    b.add(b"XCWT", Some(b"CELL"), Schema::form_id("water"));
    b.add(b"XCAS", Some(b"CELL"), Schema::form_id("acoustic_space"));
    b.add(b"XCMT", Some(b"CELL"), Schema::fields(vec![field("unknown", UInt8)]));
    b.add(b"XCMO", Some(b"CELL"), Schema::form_id("music"));

    // --- Terrain ---
    // Height map: one float offset then 33x33 signed byte deltas plus
    // row padding, all passthrough after the offset.
    b.add(
        b"VHGT",
        Some(b"LAND"),
        Schema::fields(vec![
            field("offset", Float),
            field("heights", Bytes),
        ]),
    );
    b.add_loose(b"VNML", Some(b"LAND"), Schema::bytes());
    b.add_loose(b"VCLR", Some(b"LAND"), Schema::bytes());
    b.add(b"DATA", Some(b"LAND"), Schema::uint32("flags"));
    for tag in [b"BTXT", b"ATXT"] {
        b.add(
            tag,
            Some(b"LAND"),
            Schema::fields(vec![
                field("texture", FormId),
                field("quadrant", UInt8),
                pad(1),
                field("layer", Int16),
            ]),
        );
    }
    b.add(
        b"VTXT",
        Some(b"LAND"),
        Schema::array_of(vec![
            field("position", UInt16),
            pad(2),
            field("opacity", Float),
        ]),
    );

    // --- Placed references ---
    b.add(b"DATA", Some(b"REFR"), Schema::fields(vec![field("position", PosRot)]));
    b.add(b"DATA", Some(b"ACHR"), Schema::fields(vec![field("position", PosRot)]));
    b.add(b"DATA", Some(b"ACRE"), Schema::fields(vec![field("position", PosRot)]));
    b.add(
        b"XTEL",
        None,
        Schema::fields(vec![
            field("destination_door", FormId),
            field("destination", PosRot),
        ]),
    );
    b.add(
        b"XLOC",
        None,
        Schema::fields(vec![
            field("lock_level", UInt8),
            pad(3),
            field("key", FormId),
            field("flags", UInt8),
            pad(3),
        ]),
    );
    b.add(
        b"XESP",
        None,
        Schema::fields(vec![field("parent", FormId), field("flags", UInt32)]),
    );
    b.add(b"XSCL", None, Schema::float("scale"));
    b.add(b"XCNT", None, Schema::fields(vec![field("count", Int32)]));
    b.add(b"XRDS", None, Schema::float("radius"));
    b.add(b"XHLP", None, Schema::float("health"));
    b.add(b"XMRC", None, Schema::form_id("merchant_container"));
    b.add(b"XTRG", None, Schema::form_id("target"));
    b.add(b"XEMI", None, Schema::form_id("emittance"));
    b.add(b"XMBR", None, Schema::form_id("multibound_reference"));
    b.add(b"XLCM", None, Schema::fields(vec![field("level_modifier", Int32)]));
    b.add_loose(b"XRGD", None, Schema::bytes());
    b.add_loose(b"XRGB", None, Schema::bytes());
    b.add(b"XACT", None, Schema::uint32("action_flags"));
    b.add(b"XMRK", None, Schema::fields(vec![]));
    b.add(b"FNAM", Some(b"REFR"), Schema::fields(vec![field("marker_flags", UInt8)]));
    b.add(
        b"TNAM",
        Some(b"REFR"),
        Schema::fields(vec![field("marker_type", UInt8), pad(1)]),
    );
    b.add(b"XPRD", None, Schema::float("idle_time"));
    b.add(b"XPPA", None, Schema::fields(vec![]));
    b.add(b"XRDO", None, Schema::fields(vec![
        field("range_radius", Float),
        field("broadcast_range_type", UInt32),
        field("static_percentage", Float),
        field("position_reference", FormId),
    ]));
    b.add(b"XPRM", None, Schema::fields(vec![
        field("bounds", Vec3),
        field("color", Vec3),
        field("unknown", Float),
        field("type", UInt32),
    ]));

    // --- Lights ---
    // DATA under LIGH is converted by an override (the console transposes
    // the trailing value/weight pair); this layout describes the PC result
    // for field extraction.
    b.add(
        b"DATA",
        Some(b"LIGH"),
        Schema::fields(vec![
            field("time", Int32),
            field("radius", UInt32),
            field("color", ColorRgba),
            field("flags", UInt32),
            field("falloff_exponent", Float),
            field("fov", Float),
            field("value", UInt32),
            field("weight", Float),
        ]),
    );
    b.add(b"FNAM", Some(b"LIGH"), Schema::float("fade_value"));
    b.add(b"SNAM", Some(b"LIGH"), Schema::form_id("sound"));

    // --- Water ---
    // DNAM under WATR is converted by an override (skip-prefix rule); no
    // generic entry on purpose.
    b.add(b"FNAM", Some(b"WATR"), Schema::fields(vec![field("flags", UInt8)]));
    b.add_loose(b"MNAM", Some(b"WATR"), Schema::string());
    b.add(b"SNAM", Some(b"WATR"), Schema::form_id("sound"));
    b.add(b"XNAM", Some(b"WATR"), Schema::form_id("material"));
    b.add(
        b"RNAM",
        Some(b"WATR"),
        Schema::fields(vec![field("related_daytime", FormId)]),
    );
    b.add(b"ANAM", Some(b"WATR"), Schema::fields(vec![field("opacity", UInt8)]));
    b.add(b"GNAM", Some(b"WATR"), Schema::fields(vec![
        field("daytime", FormId),
        field("nighttime", FormId),
        field("underwater", FormId),
    ]));

    // --- Statics, doors, furniture ---
    b.add(b"BRUS", Some(b"STAT"), Schema::fields(vec![field("passthrough_sound", Int8)]));
    b.add(b"RNAM", Some(b"STAT"), Schema::form_id("looping_sound"));
    b.add(b"FNAM", Some(b"DOOR"), Schema::fields(vec![field("flags", UInt8)]));
    b.add(b"SNAM", Some(b"DOOR"), Schema::form_id("open_sound"));
    b.add(b"ANAM", Some(b"DOOR"), Schema::form_id("close_sound"));
    b.add(b"BNAM", Some(b"DOOR"), Schema::form_id("loop_sound"));
    b.add(b"MNAM", Some(b"FURN"), Schema::uint32("marker_flags"));

    // --- Trees and grass ---
    b.add(b"SNAM", Some(b"TREE"), Schema::array("seeds", UInt32));
    b.add(
        b"CNAM",
        Some(b"TREE"),
        Schema::fields(vec![
            field("leaf_curvature", Float),
            field("min_leaf_angle", Float),
            field("max_leaf_angle", Float),
            field("branch_dimming", Float),
            field("leaf_dimming", Float),
            field("shadow_radius", Int32),
            field("rock_speed", Float),
            field("rustle_speed", Float),
        ]),
    );
    b.add(
        b"BNAM",
        Some(b"TREE"),
        Schema::fields(vec![field("width", Float), field("height", Float)]),
    );
    b.add(
        b"DATA",
        Some(b"GRAS"),
        Schema::fields(vec![
            field("density", UInt8),
            field("min_slope", UInt8),
            field("max_slope", UInt8),
            pad(1),
            field("units_from_water", UInt16),
            pad(2),
            field("units_from_water_type", UInt32),
            field("position_range", Float),
            field("height_range", Float),
            field("color_range", Float),
            field("wave_period", Float),
            field("flags", UInt32),
        ]),
    );
}

#[cfg(test)]
mod tests {
    use crate::esm::catalog::CatalogBuilder;
    use crate::esm::header::Signature;
    use crate::esm::schema::Sizing;

    #[test]
    fn test_xclc_sizes_coexist() {
        let mut b = CatalogBuilder::new();
        super::register(&mut b);
        let c = b.build();
        let r = c
            .resolve(Signature(*b"XCLC"), Signature(*b"CELL"), 8)
            .unwrap();
        assert_eq!(r.schema.sizing(), Sizing::Fixed(8));
        let r = c
            .resolve(Signature(*b"XCLC"), Signature(*b"CELL"), 12)
            .unwrap();
        assert_eq!(r.schema.sizing(), Sizing::Fixed(12));
    }

    #[test]
    fn test_vhgt_accepts_full_height_map() {
        let mut b = CatalogBuilder::new();
        super::register(&mut b);
        let c = b.build();
        // 4-byte offset + 1089 deltas + 3 bytes of row padding.
        assert!(c
            .resolve(Signature(*b"VHGT"), Signature(*b"LAND"), 1096)
            .is_some());
    }
}
