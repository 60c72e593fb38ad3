//! Effect records: actor effects, object effects, base effects and the
//! image-space modifiers whose keyed timeline subrecords fall to the
//! dynamic float-array rule.

use super::{field, pad};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // --- Actor effects ---
    b.add(
        b"SPIT",
        Some(b"SPEL"),
        Schema::fields(vec![
            field("effect_type", UInt32),
            field("cost", UInt32),
            field("level", UInt32),
            field("flags", UInt8),
            pad(3),
        ]),
    );

    // --- Object effects ---
    b.add(
        b"ENIT",
        Some(b"ENCH"),
        Schema::fields(vec![
            field("enchantment_type", UInt32),
            pad(4),
            field("charge_amount", UInt32),
            field("flags", UInt8),
            pad(3),
        ]),
    );

    // Effect entries shared by SPEL/ENCH/ALCH/INGR.
    b.add(b"EFID", None, Schema::form_id("base_effect"));
    b.add(
        b"EFIT",
        None,
        Schema::fields(vec![
            field("magnitude", UInt32),
            field("area", UInt32),
            field("duration", UInt32),
            field("delivery", UInt32),
            field("actor_value", Int32),
        ]),
    );

    // --- Base effects ---
    b.add(
        b"DATA",
        Some(b"MGEF"),
        Schema::fields(vec![
            field("flags", UInt32),
            field("base_cost", Float),
            field("associated_item", FormId),
            field("magic_school", Int32),
            field("resistance_av", Int32),
            field("counter_count", UInt16),
            pad(2),
            field("light", FormId),
            field("projectile_speed", Float),
            field("effect_shader", FormId),
            field("object_display_shader", FormId),
            field("effect_sound", FormId),
            field("bolt_sound", FormId),
            field("hit_sound", FormId),
            field("area_sound", FormId),
            field("constant_effect_enchantment_factor", Float),
            field("constant_effect_barter_factor", Float),
            field("archetype", UInt32),
            field("actor_value", Int32),
        ]),
    );
    b.add(b"ESCE", None, Schema::array("counter_effects", FormId));

    // --- Image space adapters ---
    // IMAD's counted timeline subrecords carry mangled tag bytes and are
    // resolved by the dynamic owner rule; only the stable members are
    // registered here.
    b.add_loose(b"DNAM", Some(b"IMAD"), Schema::bytes());
    b.add(b"BNAM", Some(b"IMAD"), Schema::array("blur_timeline", Float));
    b.add(b"VNAM", Some(b"IMAD"), Schema::array("double_vision_timeline", Float));
    b.add(b"TNAM", Some(b"IMAD"), Schema::array("tint_timeline", Float));
    b.add(b"NAM3", Some(b"IMAD"), Schema::array("fade_timeline", Float));
    b.add(b"RNAM", Some(b"IMAD"), Schema::array("radial_blur_timeline", Float));

    // --- Image spaces ---
    b.add_loose(b"DNAM", Some(b"IMGS"), Schema::array("values", Float));

    // --- Perks ---
    b.add(
        b"DATA",
        Some(b"PERK"),
        Schema::fields(vec![
            field("is_trait", UInt8),
            field("min_level", UInt8),
            field("ranks", UInt8),
            field("playable", UInt8),
            field("hidden", UInt8),
        ]),
    );
    b.add(
        b"PRKE",
        None,
        Schema::fields(vec![
            field("effect_type", UInt8),
            field("rank", UInt8),
            field("priority", UInt8),
        ]),
    );
    b.add(b"PRKC", None, Schema::fields(vec![field("run_on", Int8)]));
    b.add(b"EPFT", None, Schema::fields(vec![field("function_type", UInt8)]));
    // Entry-point data is a float or a FormID depending on the function
    // type; both convert as one 4-byte swap.
    b.add(b"EPFD", None, Schema::uint32("argument"));
    b.add_loose(b"EPF2", None, Schema::string());
    b.add(b"EPF3", None, Schema::fields(vec![field("script_flags", UInt16)]));
    b.add(b"PRKF", None, Schema::fields(vec![]));

    // --- Global variables ---
    b.add(b"FNAM", Some(b"GLOB"), Schema::fields(vec![field("value_type", UInt8)]));
    b.add(b"FLTV", Some(b"GLOB"), Schema::float("value"));
}
