//! Inventory item records: weapons, armor, ammo, consumables, books, misc
//! objects, containers and leveled lists.

use super::{field, pad};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // --- Weapons ---
    b.add(
        b"DATA",
        Some(b"WEAP"),
        Schema::fields(vec![
            field("value", Int32),
            field("health", Int32),
            field("weight", Float),
            field("damage", Int16),
            field("clip_size", UInt8),
        ]),
    );
    b.add(
        b"DNAM",
        Some(b"WEAP"),
        Schema::fields(vec![
            field("animation_type", UInt32),
            field("animation_multiplier", Float),
            field("reach", Float),
            field("flags1", UInt8),
            field("grip_animation", UInt8),
            field("ammo_use", UInt8),
            field("reload_animation", UInt8),
            field("min_spread", Float),
            field("spread", Float),
            pad(4),
            field("sight_fov", Float),
            pad(4),
            field("projectile", FormId),
            field("vats_hit_chance", UInt8),
            field("attack_animation", UInt8),
            field("projectile_count", UInt8),
            field("weapon_av", UInt8),
            field("min_range", Float),
            field("max_range", Float),
            field("on_hit", UInt32),
            field("flags2", UInt32),
            field("attack_multiplier", Float),
            field("fire_rate", Float),
            field("override_ap", Float),
            field("rumble_left", Float),
            field("rumble_right", Float),
            field("rumble_duration", Float),
            field("override_damage_to_weapon", Float),
            field("attack_shots_per_sec", Float),
            field("reload_time", Float),
            field("jam_time", Float),
            field("aim_arc", Float),
            field("skill", Int32),
            field("rumble_pattern", UInt32),
            field("rumble_wavelength", Float),
            field("limb_damage_multiplier", Float),
            field("resistance_type", Int32),
            field("sight_usage", Float),
            field("semi_auto_fire_delay_min", Float),
            field("semi_auto_fire_delay_max", Float),
        ]),
    );
    b.add(
        b"CRDT",
        Some(b"WEAP"),
        Schema::fields(vec![
            field("critical_damage", UInt16),
            pad(2),
            field("critical_multiplier", Float),
            field("critical_flags", UInt32),
            field("critical_effect", FormId),
        ]),
    );
    b.add(b"INAM", Some(b"WEAP"), Schema::form_id("impact_dataset"));
    b.add(b"WNAM", Some(b"WEAP"), Schema::form_id("first_person_model"));
    b.add(b"EITM", None, Schema::form_id("object_effect"));
    b.add(b"EAMT", None, Schema::fields(vec![field("enchantment_charge", Int16)]));
    b.add(b"BAMT", Some(b"WEAP"), Schema::form_id("alternate_block_material"));
    // Sound slots shared by the weapon record.
    for tag in [b"SNAM", b"XNAM", b"NAM7", b"TNAM", b"NAM6", b"UNAM", b"NAM9", b"NAM8"] {
        b.add(tag, Some(b"WEAP"), Schema::form_id("sound"));
    }

    // --- Armor ---
    b.add(
        b"DATA",
        Some(b"ARMO"),
        Schema::fields(vec![
            field("value", Int32),
            field("health", Int32),
            field("weight", Float),
        ]),
    );
    b.add(
        b"DNAM",
        Some(b"ARMO"),
        Schema::fields(vec![
            field("armor_rating", Int16),
            field("flags", UInt16),
        ]),
    );
    b.add(
        b"BMDT",
        None,
        Schema::fields(vec![
            field("biped_flags", UInt32),
            field("general_flags", UInt8),
            pad(3),
        ]),
    );

    // --- Ammunition ---
    b.add(
        b"DATA",
        Some(b"AMMO"),
        Schema::fields(vec![
            field("speed", Float),
            field("flags", UInt8),
            pad(3),
            field("value", UInt32),
            field("clip_rounds", UInt8),
        ]),
    );

    // --- Consumables ---
    b.add(
        b"ENIT",
        Some(b"ALCH"),
        Schema::fields(vec![
            field("value", Int32),
            field("flags", UInt8),
            pad(3),
            field("withdrawal_effect", FormId),
            field("addiction_chance", Float),
            field("consume_sound", FormId),
        ]),
    );
    // The 4-byte PC weight; the console's padded 5-byte form is truncated
    // by an override before this layout applies.
    b.add(b"DATA", Some(b"ALCH"), Schema::float("weight"));
    b.add(
        b"ENIT",
        Some(b"INGR"),
        Schema::fields(vec![
            field("value", Int32),
            field("flags", UInt8),
            pad(3),
        ]),
    );
    b.add(b"DATA", Some(b"INGR"), Schema::float("weight"));

    // --- Books and notes ---
    b.add(
        b"DATA",
        Some(b"BOOK"),
        Schema::fields(vec![
            field("flags", UInt8),
            field("teaches", Int8),
            field("value", Int32),
            field("weight", Float),
        ]),
    );

    // --- Simple valuables ---
    for owner in [b"MISC", b"KEYM"] {
        b.add(
            b"DATA",
            Some(owner),
            Schema::fields(vec![field("value", Int32), field("weight", Float)]),
        );
    }

    // --- Containers ---
    b.add(
        b"DATA",
        Some(b"CONT"),
        Schema::fields(vec![field("flags", UInt8), field("weight", Float)]),
    );
    b.add(b"SNAM", Some(b"CONT"), Schema::form_id("open_sound"));
    b.add(b"QNAM", Some(b"CONT"), Schema::form_id("close_sound"));

    // Inventory entries, shared by containers and actors.
    b.add(
        b"CNTO",
        None,
        Schema::fields(vec![field("item", FormId), field("count", Int32)]),
    );
    b.add(
        b"COED",
        None,
        Schema::fields(vec![
            field("owner", FormId),
            field("global_or_rank", UInt32),
            field("item_condition", Float),
        ]),
    );

    // --- Leveled lists ---
    b.add(b"LVLD", None, Schema::fields(vec![field("chance_none", UInt8)]));
    b.add(b"LVLF", None, Schema::fields(vec![field("flags", UInt8)]));
    b.add(b"LVLG", None, Schema::form_id("global_variable"));
    b.add(
        b"LVLO",
        None,
        Schema::fields(vec![
            field("level", Int16),
            pad(2),
            field("reference", FormId),
            field("count", Int16),
            pad(2),
        ]),
    );
}
