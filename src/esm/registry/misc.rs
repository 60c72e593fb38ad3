//! Remaining record families: game settings, sounds, weather and climate,
//! regions, idle animations, projectiles, explosions and form lists.

use super::{field, pad};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // --- Game settings ---
    // 4-byte settings are int or float depending on the editor-id prefix;
    // both convert as one 4-byte swap. Any other length is text. The two
    // entries exercise the exact-size tier against the owner default.
    b.add(b"DATA", Some(b"GMST"), Schema::uint32("value"));
    b.add_loose(b"DATA", Some(b"GMST"), Schema::string());

    // --- Sounds ---
    b.add_loose(b"FNAM", Some(b"SOUN"), Schema::string());
    b.add(
        b"SNDD",
        None,
        Schema::fields(vec![
            field("min_attenuation", UInt8),
            field("max_attenuation", UInt8),
            field("frequency_adjustment", Int8),
            pad(1),
            field("flags", UInt32),
            field("static_attenuation", Int16),
            field("stop_time", UInt8),
            field("start_time", UInt8),
            field("attenuation_point_1", Int16),
            field("attenuation_point_2", Int16),
            field("attenuation_point_3", Int16),
            field("attenuation_point_4", Int16),
            field("attenuation_point_5", Int16),
            field("reverb_attenuation", Int16),
            field("priority", Int32),
            field("x", Int32),
            field("y", Int32),
        ]),
    );
    b.add(
        b"SNDX",
        None,
        Schema::fields(vec![
            field("min_attenuation", UInt8),
            field("max_attenuation", UInt8),
            field("frequency_adjustment", Int8),
            pad(1),
            field("flags", UInt32),
            field("static_attenuation", Int16),
            field("stop_time", UInt8),
            field("start_time", UInt8),
        ]),
    );
    b.add(b"ANAM", Some(b"SOUN"), Schema::array("attenuation_curve", Int16));
    b.add(b"GNAM", Some(b"SOUN"), Schema::fields(vec![field("reverb_attenuation", Int16)]));
    b.add(b"HNAM", Some(b"SOUN"), Schema::fields(vec![field("priority", Int32)]));

    // --- Acoustic spaces ---
    b.add(b"SNAM", Some(b"ASPC"), Schema::form_id("ambient_loop"));
    b.add(b"RDAT", Some(b"ASPC"), Schema::form_id("region_sound"));
    b.add(b"ANAM", Some(b"ASPC"), Schema::uint32("environment_type"));
    b.add(b"INAM", Some(b"ASPC"), Schema::uint32("is_interior"));

    // --- Weather ---
    b.add(b"IAD0", Some(b"WTHR"), Schema::array("image_space_values", Float));
    for tag in [b"0IAD", b"1IAD", b"2IAD", b"3IAD"] {
        // Keyed timeline family members; the suffix rule also covers the
        // variants with mangled first bytes.
        b.add(tag, Some(b"WTHR"), Schema::array("timeline", Float));
    }
    b.add(b"DNAM", Some(b"WTHR"), Schema::string());
    b.add(b"CNAM", Some(b"WTHR"), Schema::string());
    b.add(b"ANAM", Some(b"WTHR"), Schema::string());
    b.add(b"BNAM", Some(b"WTHR"), Schema::string());
    b.add(
        b"FNAM",
        Some(b"WTHR"),
        Schema::fields(vec![
            field("fog_day_near", Float),
            field("fog_day_far", Float),
            field("fog_night_near", Float),
            field("fog_night_far", Float),
            field("fog_day_power", Float),
            field("fog_night_power", Float),
        ]),
    );
    b.add_loose(b"INAM", Some(b"WTHR"), Schema::bytes());
    // Color tables are byte quadruplets on both sides.
    b.add_loose(b"NAM0", Some(b"WTHR"), Schema::bytes());
    b.add_loose(b"PNAM", Some(b"WTHR"), Schema::bytes());
    b.add_loose(b"DATA", Some(b"WTHR"), Schema::bytes());
    b.add(
        b"SNAM",
        Some(b"WTHR"),
        Schema::fields(vec![field("sound", FormId), field("sound_type", UInt32)]),
    );

    // --- Climate ---
    b.add(
        b"WLST",
        Some(b"CLMT"),
        Schema::array_of(vec![
            field("weather", FormId),
            field("chance", Int32),
            field("global", FormId),
        ]),
    );
    b.add_loose(b"FNAM", Some(b"CLMT"), Schema::string());
    b.add_loose(b"GNAM", Some(b"CLMT"), Schema::string());
    // TNAM under CLMT is length-converted by an override (the console form
    // carries two trailing pad bytes).

    // --- Regions ---
    b.add(b"RCLR", Some(b"REGN"), Schema::fields(vec![field("map_color", ColorRgba)]));
    b.add(b"WNAM", Some(b"REGN"), Schema::form_id("worldspace"));
    b.add(
        b"RPLI",
        Some(b"REGN"),
        Schema::uint32("edge_fall_off"),
    );
    b.add(b"RPLD", Some(b"REGN"), Schema::array("points", Float));
    b.add(
        b"RDAT",
        Some(b"REGN"),
        Schema::fields(vec![
            field("data_type", UInt32),
            field("flags", UInt8),
            field("priority", UInt8),
            pad(2),
        ]),
    );
    b.add(
        b"RDOT",
        Some(b"REGN"),
        Schema::array_of(vec![
            field("object", FormId),
            field("parent_index", UInt16),
            pad(2),
            field("density", Float),
            field("clustering", UInt8),
            field("min_slope", UInt8),
            field("max_slope", UInt8),
            field("flags", UInt8),
            field("radius_wrt_parent", UInt16),
            field("radius", UInt16),
            field("min_height", Float),
            field("max_height", Float),
            field("sink", Float),
            field("sink_variance", Float),
            field("size_variance", Float),
            field("angle_variance_x", UInt16),
            field("angle_variance_y", UInt16),
            field("angle_variance_z", UInt16),
            pad(2),
            field("unknown_color", ColorRgba),
        ]),
    );
    b.add_loose(b"RDMP", Some(b"REGN"), Schema::string());
    b.add(
        b"RDGS",
        Some(b"REGN"),
        Schema::array_of(vec![field("grass", FormId), pad(4)]),
    );
    b.add(b"RDMD", Some(b"REGN"), Schema::uint32("music_type"));
    b.add(
        b"RDSD",
        Some(b"REGN"),
        Schema::array_of(vec![
            field("sound", FormId),
            field("flags", UInt32),
            field("chance", UInt32),
        ]),
    );
    b.add(
        b"RDWT",
        Some(b"REGN"),
        Schema::array_of(vec![
            field("weather", FormId),
            field("chance", UInt32),
            field("global", FormId),
        ]),
    );

    // --- Idle animations ---
    b.add(
        b"ANAM",
        Some(b"IDLE"),
        Schema::fields(vec![field("parent", FormId), field("previous", FormId)]),
    );
    b.add(
        b"DATA",
        Some(b"IDLE"),
        Schema::fields(vec![
            field("animation_group", UInt8),
            field("loop_min", UInt8),
            field("loop_max", UInt8),
            pad(1),
            field("replay_delay", Int16),
            field("flags", UInt8),
            pad(1),
        ]),
    );

    // --- Effect shaders ---
    b.add_loose(b"DATA", Some(b"EFSH"), Schema::bytes());
    b.add_loose(b"ICO2", Some(b"EFSH"), Schema::string());

    // --- Projectiles ---
    b.add(
        b"DATA",
        Some(b"PROJ"),
        Schema::fields(vec![
            field("flags", UInt16),
            field("projectile_type", UInt16),
            field("gravity", Float),
            field("speed", Float),
            field("range", Float),
            field("light", FormId),
            field("muzzle_flash_light", FormId),
            field("tracer_chance", Float),
            field("explosion_alt_trigger_proximity", Float),
            field("explosion_alt_trigger_timer", Float),
            field("explosion", FormId),
            field("sound", FormId),
            field("muzzle_flash_duration", Float),
            field("fade_duration", Float),
            field("impact_force", Float),
            field("countdown_sound", FormId),
            pad(4),
            field("default_weapon_source", FormId),
        ]),
    );
    b.add_loose(b"NAM1", Some(b"PROJ"), Schema::string());
    b.add_loose(b"NAM2", Some(b"PROJ"), Schema::bytes());
    b.add(b"VNAM", Some(b"PROJ"), Schema::uint32("sound_level"));

    // --- Explosions ---
    b.add(
        b"DATA",
        Some(b"EXPL"),
        Schema::fields(vec![
            field("force", Float),
            field("damage", Float),
            field("radius", Float),
            field("light", FormId),
            field("sound1", FormId),
            field("flags", UInt32),
            field("is_radius", Float),
            field("impact_dataset", FormId),
            field("sound2", FormId),
            field("radiation_level", Float),
            field("radiation_dissipation_time", Float),
            field("radiation_radius", Float),
            field("sound_level", UInt32),
        ]),
    );
    b.add(b"INAM", Some(b"EXPL"), Schema::form_id("placed_impact_object"));

    // --- Form lists ---
    b.add(b"LNAM", Some(b"FLST"), Schema::form_id("entry"));

    // --- Body parts ---
    b.add(b"DATA", Some(b"EYES"), Schema::fields(vec![field("flags", UInt8)]));
    b.add(b"DATA", Some(b"HAIR"), Schema::fields(vec![field("flags", UInt8)]));
    b.add(b"DATA", Some(b"HDPT"), Schema::fields(vec![field("flags", UInt8)]));
    b.add(b"HNAM", Some(b"HDPT"), Schema::form_id("extra_part"));

    // --- Textures ---
    b.add(
        b"HNAM",
        Some(b"LTEX"),
        Schema::fields(vec![
            field("material_type", UInt8),
            field("friction", UInt8),
            field("restitution", UInt8),
        ]),
    );
    b.add(b"SNAM", Some(b"LTEX"), Schema::fields(vec![field("specular_exponent", UInt8)]));
    b.add(b"GNAM", Some(b"LTEX"), Schema::form_id("grass"));
    b.add(b"TNAM", Some(b"LTEX"), Schema::form_id("texture"));

    // --- Message boxes ---
    b.add(b"DNAM", Some(b"MESG"), Schema::uint32("flags"));
    b.add(b"TNAM", Some(b"MESG"), Schema::uint32("display_time"));
    b.add_loose(b"ITXT", Some(b"MESG"), Schema::string());

    // --- Load screens ---
    b.add(
        b"LNAM",
        Some(b"LSCR"),
        Schema::fields(vec![
            field("direct", FormId),
            field("indirect", FormId),
            field("grid_y", Int16),
            field("grid_x", Int16),
        ]),
    );

    // --- Music and media ---
    b.add_loose(b"FNAM", Some(b"MUSC"), Schema::string());
    b.add(b"ANAM", Some(b"MUSC"), Schema::float("decibel_attenuation"));
}

#[cfg(test)]
mod tests {
    use crate::esm::catalog::CatalogBuilder;
    use crate::esm::catalog::ResolutionTier;
    use crate::esm::header::Signature;

    #[test]
    fn test_weather_timeline_suffix_family() {
        let mut b = CatalogBuilder::new();
        super::register(&mut b);
        let c = b.build();
        // Registered members resolve exactly; unregistered family members
        // fall to the suffix rule.
        let r = c
            .resolve(Signature(*b"0IAD"), Signature(*b"WTHR"), 16)
            .unwrap();
        assert!(!r.tier.is_fallback());
        let r = c
            .resolve(Signature(*b"RIAD"), Signature(*b"WTHR"), 16)
            .unwrap();
        assert_eq!(r.tier, ResolutionTier::SuffixFamily);
    }
}
