//! Actor records: NPCs, creatures, factions, races and AI packages.

use super::{field, pad, raw};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // Base actor configuration, shared by NPC_ and CREA.
    b.add(
        b"ACBS",
        None,
        Schema::fields(vec![
            field("flags", UInt32),
            field("fatigue", UInt16),
            field("barter_gold", UInt16),
            field("level", Int16),
            field("calc_min", UInt16),
            field("calc_max", UInt16),
            field("speed_multiplier", UInt16),
            field("karma", Float),
            field("disposition_base", Int16),
            field("template_flags", UInt16),
        ]),
    );
    b.add(
        b"AIDT",
        None,
        Schema::fields(vec![
            field("aggression", UInt8),
            field("confidence", UInt8),
            field("energy", UInt8),
            field("responsibility", UInt8),
            field("mood", UInt8),
            pad(3),
            field("services", UInt32),
            field("teaches", Int8),
            field("train_level", UInt8),
            field("assistance", Int8),
            field("aggro_radius_behavior", UInt8),
            field("aggro_radius", Int32),
        ]),
    );
    // Faction membership: the console stores the rank byte followed by
    // explicit pad, same as PC.
    b.add(
        b"SNAM",
        Some(b"NPC_"),
        Schema::fields(vec![
            field("faction", FormId),
            field("rank", UInt8),
            pad(3),
        ]),
    );
    b.add(
        b"SNAM",
        Some(b"CREA"),
        Schema::fields(vec![
            field("faction", FormId),
            field("rank", UInt8),
            pad(3),
        ]),
    );
    b.add(b"INAM", Some(b"NPC_"), Schema::form_id("death_item"));
    b.add(b"INAM", Some(b"CREA"), Schema::form_id("death_item"));
    b.add(b"VTCK", None, Schema::form_id("voice"));
    b.add(b"TPLT", None, Schema::form_id("template"));
    b.add(b"RNAM", Some(b"NPC_"), Schema::form_id("race"));
    b.add(b"EITM", Some(b"NPC_"), Schema::form_id("unarmed_effect"));
    b.add(b"EAMT", Some(b"NPC_"), Schema::fields(vec![field("unarmed_animation", UInt16)]));
    b.add(b"CNAM", Some(b"NPC_"), Schema::form_id("class"));
    b.add(
        b"DATA",
        Some(b"NPC_"),
        Schema::fields(vec![
            field("base_health", Int32),
            field("strength", UInt8),
            field("perception", UInt8),
            field("endurance", UInt8),
            field("charisma", UInt8),
            field("intelligence", UInt8),
            field("agility", UInt8),
            field("luck", UInt8),
        ]),
    );
    b.add_loose(b"DNAM", Some(b"NPC_"), Schema::bytes());
    b.add(b"PNAM", Some(b"NPC_"), Schema::form_id("head_part"));
    b.add(b"HNAM", Some(b"NPC_"), Schema::form_id("hair"));
    b.add(b"LNAM", Some(b"NPC_"), Schema::float("hair_length"));
    b.add(b"ENAM", Some(b"NPC_"), Schema::form_id("eyes"));
    b.add(
        b"HCLR",
        Some(b"NPC_"),
        Schema::fields(vec![field("hair_color", ColorRgba)]),
    );
    b.add(b"ZNAM", Some(b"NPC_"), Schema::form_id("combat_style"));
    b.add(b"NAM4", Some(b"NPC_"), Schema::uint32("impact_material_type"));
    b.add(b"FGGS", None, Schema::array("geometry_symmetric", Float));
    b.add(b"FGGA", None, Schema::array("geometry_asymmetric", Float));
    b.add(b"FGTS", None, Schema::array("texture_symmetric", Float));
    b.add(b"NAM5", None, Schema::fields(vec![field("unknown", UInt16)]));
    b.add(b"NAM6", Some(b"NPC_"), Schema::float("height"));
    b.add(b"NAM7", Some(b"NPC_"), Schema::float("weight"));

    // --- Creatures ---
    b.add(
        b"DATA",
        Some(b"CREA"),
        Schema::fields(vec![
            field("creature_type", UInt8),
            field("combat_skill", UInt8),
            field("magic_skill", UInt8),
            field("stealth_skill", UInt8),
            field("health", Int32),
            pad(2),
            field("attack_damage", Int16),
            field("strength", UInt8),
            field("perception", UInt8),
            field("endurance", UInt8),
            field("charisma", UInt8),
            field("intelligence", UInt8),
            field("agility", UInt8),
            field("luck", UInt8),
        ]),
    );
    b.add(b"NIFZ", Some(b"CREA"), Schema::string());
    b.add_loose(b"NIFT", Some(b"CREA"), Schema::bytes());
    b.add(b"PKID", None, Schema::form_id("package"));
    b.add(b"KFFZ", None, Schema::string());
    b.add(
        b"NAM0",
        Some(b"CREA"),
        Schema::fields(vec![field("attack_reach", UInt8)]),
    );
    b.add(b"CSCR", Some(b"CREA"), Schema::form_id("inherited_sound"));
    b.add(
        b"CSDT",
        None,
        Schema::fields(vec![field("sound_type", UInt32)]),
    );
    b.add(b"CSDI", None, Schema::form_id("sound"));
    b.add(b"CSDC", None, Schema::fields(vec![field("sound_chance", UInt8)]));
    b.add(b"BNAM", Some(b"CREA"), Schema::float("base_scale"));
    b.add(b"WNAM", Some(b"CREA"), Schema::form_id("water_type"));
    b.add(b"NAM1", Some(b"CREA"), Schema::string());

    // --- Factions ---
    b.add(
        b"DATA",
        Some(b"FACT"),
        Schema::fields(vec![
            field("flags1", UInt8),
            field("flags2", UInt8),
            pad(2),
        ]),
    );
    // XNAM under FACT is handled by an override (first half pre-swapped on
    // the console side); no generic entry so the override stays the only
    // conversion path. Field extraction reads it through the override's
    // output layout.
    b.add(b"CNAM", Some(b"FACT"), Schema::float("crime_gold_multiplier"));
    b.add(b"RNAM", Some(b"FACT"), Schema::fields(vec![field("rank_number", Int32)]));
    b.add_loose(b"MNAM", Some(b"FACT"), Schema::string());
    b.add_loose(b"FNAM", Some(b"FACT"), Schema::string());
    b.add_loose(b"INAM", Some(b"FACT"), Schema::string());
    b.add(b"WMI1", Some(b"FACT"), Schema::form_id("reputation"));

    // --- Races ---
    b.add(
        b"DATA",
        Some(b"RACE"),
        Schema::fields(vec![
            raw("skill_boosts", 14),
            pad(2),
            field("male_height", Float),
            field("female_height", Float),
            field("male_weight", Float),
            field("female_weight", Float),
            field("flags", UInt32),
        ]),
    );
    b.add(b"ONAM", Some(b"RACE"), Schema::form_id("older_race"));
    b.add(b"YNAM", Some(b"RACE"), Schema::form_id("younger_race"));
    b.add(b"NAM2", Some(b"RACE"), Schema::fields(vec![]));
    b.add(
        b"VTCK",
        Some(b"RACE"),
        Schema::fields(vec![field("male_voice", FormId), field("female_voice", FormId)]),
    );
    b.add(
        b"DNAM",
        Some(b"RACE"),
        Schema::fields(vec![
            field("male_default_hair", FormId),
            field("female_default_hair", FormId),
        ]),
    );
    b.add(
        b"CNAM",
        Some(b"RACE"),
        Schema::fields(vec![
            field("male_default_hair_color", UInt8),
            field("female_default_hair_color", UInt8),
        ]),
    );
    b.add(b"PNAM", Some(b"RACE"), Schema::float("facegen_main_clamp"));
    b.add(b"UNAM", Some(b"RACE"), Schema::float("facegen_face_clamp"));
    b.add(b"ATTR", Some(b"RACE"), Schema::bytes());
    b.add(b"HNAM", Some(b"RACE"), Schema::array("hairs", FormId));
    b.add(b"ENAM", Some(b"RACE"), Schema::array("eyes", FormId));
    b.add(b"INDX", None, Schema::uint32("index"));
    for tag in [b"MNAM", b"FNAM", b"NAM0", b"NAM1"] {
        b.add(tag, Some(b"RACE"), Schema::fields(vec![]));
    }

    // --- Classes ---
    b.add(
        b"DATA",
        Some(b"CLAS"),
        Schema::fields(vec![
            field("tag_skill_1", Int32),
            field("tag_skill_2", Int32),
            field("tag_skill_3", Int32),
            field("tag_skill_4", Int32),
            field("flags", UInt32),
            field("services", UInt32),
            field("teaches", Int8),
            field("train_level", UInt8),
            pad(2),
        ]),
    );
    b.add(
        b"ATTR",
        Some(b"CLAS"),
        Schema::fields(vec![
            field("strength", UInt8),
            field("perception", UInt8),
            field("endurance", UInt8),
            field("charisma", UInt8),
            field("intelligence", UInt8),
            field("agility", UInt8),
            field("luck", UInt8),
        ]),
    );

    // --- AI packages ---
    b.add(
        b"PKDT",
        None,
        Schema::fields(vec![
            field("flags", UInt32),
            field("package_type", UInt8),
            pad(1),
            field("fallout_behavior_flags", UInt16),
            field("type_specific_flags", UInt16),
            pad(2),
        ]),
    );
    b.add(
        b"PLDT",
        None,
        Schema::fields(vec![
            field("location_type", Int32),
            field("location", UInt32),
            field("radius", Int32),
        ]),
    );
    b.add(
        b"PSDT",
        None,
        Schema::fields(vec![
            field("month", Int8),
            field("day_of_week", Int8),
            field("date", UInt8),
            field("time", Int8),
            field("duration", Int32),
        ]),
    );
    b.add(
        b"PTDT",
        None,
        Schema::fields(vec![
            field("target_type", Int32),
            field("target", UInt32),
            field("count_or_distance", Int32),
        ]),
    );
    b.add(b"PKDD", None, Schema::fields(vec![
        field("fov", Float),
        field("topic", FormId),
        field("flags", UInt32),
        pad(4),
    ]));
    b.add(b"PKPT", None, Schema::bytes());
    b.add(b"PKED", None, Schema::fields(vec![]));
    b.add(b"PKE2", None, Schema::uint32("escort_distance"));
    b.add(b"PKFD", None, Schema::float("follow_radius"));
    b.add(b"PKAM", None, Schema::fields(vec![]));
    b.add(b"PKW3", None, Schema::fields(vec![
        field("flags", UInt32),
        field("fire_rate", UInt8),
        field("fire_type", UInt8),
        field("burst_count", UInt16),
        field("shoot_min", UInt16),
        field("shoot_max", UInt16),
        field("pause_min", UInt16),
        field("pause_max", UInt16),
        pad(4),
    ]));

    // --- Combat styles ---
    b.add_loose(b"CSTD", Some(b"CSTY"), Schema::bytes());
    b.add(
        b"CSAD",
        Some(b"CSTY"),
        Schema::array("advanced_values", Float),
    );
}
