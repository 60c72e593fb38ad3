//! Dialogue records: topics, responses, quests, notes and terminals.

use super::{field, pad};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // --- Dialogue topics ---
    b.add(b"DATA", Some(b"DIAL"), Schema::fields(vec![field("topic_type", UInt8)]));
    b.add(
        b"DATA",
        Some(b"DIAL"),
        Schema::fields(vec![field("topic_type", UInt8), field("flags", UInt8)]),
    );
    b.add(b"QSTI", None, Schema::form_id("quest"));
    b.add(b"QSTR", None, Schema::form_id("removed_quest"));
    b.add(b"PNAM", Some(b"DIAL"), Schema::float("priority"));
    b.add_loose(b"TDUM", Some(b"DIAL"), Schema::string());
    b.add(b"INFC", None, Schema::form_id("shared_info"));
    b.add(b"INFX", None, Schema::fields(vec![field("shared_info_count", Int32)]));

    // --- Dialogue responses ---
    b.add(
        b"DATA",
        Some(b"INFO"),
        Schema::fields(vec![
            field("dialogue_type", UInt8),
            field("next_speaker", UInt8),
            field("flags", UInt16),
        ]),
    );
    b.add(
        b"TRDT",
        None,
        Schema::fields(vec![
            field("emotion_type", UInt32),
            field("emotion_value", Int32),
            pad(4),
            field("response_number", UInt8),
            pad(3),
            field("sound", FormId),
            field("use_emotion_animation", UInt8),
            pad(3),
        ]),
    );
    b.add_loose(b"NAM1", Some(b"INFO"), Schema::string());
    b.add_loose(b"NAM2", Some(b"INFO"), Schema::string());
    b.add_loose(b"NAM3", Some(b"INFO"), Schema::string());
    b.add(b"SNAM", Some(b"INFO"), Schema::form_id("speaker"));
    b.add(b"TPIC", None, Schema::form_id("topic"));
    b.add(b"PNAM", Some(b"INFO"), Schema::form_id("previous_info"));
    b.add(b"TCLT", None, Schema::array("choices", FormId));
    b.add(b"TCLF", None, Schema::array("link_from", FormId));
    // Script-block separator; zero length. An orphaned trailing NEXT is
    // stripped after a response merge.
    b.add(b"NEXT", None, Schema::fields(vec![]));
    b.add(b"ANAM", Some(b"INFO"), Schema::form_id("speaker_reference"));
    b.add(b"KNAM", Some(b"INFO"), Schema::form_id("actor_value_or_perk"));
    b.add(b"DNAM", Some(b"INFO"), Schema::uint32("speech_challenge"));

    // --- Quests ---
    b.add(
        b"DATA",
        Some(b"QUST"),
        Schema::fields(vec![field("flags", UInt8), field("priority", UInt8)]),
    );
    b.add(
        b"DATA",
        Some(b"QUST"),
        Schema::fields(vec![
            field("flags", UInt8),
            field("priority", UInt8),
            pad(2),
            field("quest_delay", Float),
        ]),
    );
    b.add(b"INDX", Some(b"QUST"), Schema::fields(vec![field("stage_index", Int16)]));
    b.add(b"QSDT", Some(b"QUST"), Schema::fields(vec![field("stage_flags", UInt8)]));
    b.add_loose(b"CNAM", Some(b"QUST"), Schema::string());
    b.add(b"QOBJ", Some(b"QUST"), Schema::fields(vec![field("objective_index", Int32)]));
    b.add_loose(b"NNAM", Some(b"QUST"), Schema::string());
    b.add(
        b"QSTA",
        Some(b"QUST"),
        Schema::fields(vec![
            field("target", FormId),
            field("flags", UInt8),
            pad(3),
        ]),
    );

    // --- Notes ---
    b.add(b"DATA", Some(b"NOTE"), Schema::fields(vec![field("note_type", UInt8)]));
    b.add_loose(b"XNAM", Some(b"NOTE"), Schema::string());
    // TNAM under NOTE is normally note text but holds a FormID for voice
    // notes; the reinterpretation lives in the override table.
    b.add_loose(b"TNAM", None, Schema::string());
    b.add(b"SNAM", Some(b"NOTE"), Schema::form_id("sound_or_npc"));

    // --- Terminals ---
    b.add(
        b"DNAM",
        Some(b"TERM"),
        Schema::fields(vec![
            field("base_hacking_difficulty", UInt8),
            field("flags", UInt8),
            field("server_type", UInt8),
            pad(1),
        ]),
    );
    b.add_loose(b"ITXT", Some(b"TERM"), Schema::string());
    b.add_loose(b"RNAM", Some(b"TERM"), Schema::string());
    b.add(b"ANAM", Some(b"TERM"), Schema::fields(vec![field("flags", UInt8)]));
    b.add(b"INAM", Some(b"TERM"), Schema::form_id("display_note"));
    b.add(b"TNAM", Some(b"TERM"), Schema::form_id("sub_menu"));
    b.add(b"PNAM", Some(b"TERM"), Schema::form_id("password_note"));
    b.add(b"SNAM", Some(b"TERM"), Schema::form_id("sound_looping"));
}

#[cfg(test)]
mod tests {
    use crate::esm::catalog::CatalogBuilder;
    use crate::esm::header::Signature;
    use crate::esm::schema::Sizing;

    #[test]
    fn test_info_data_is_four_bytes() {
        let mut b = CatalogBuilder::new();
        super::register(&mut b);
        let c = b.build();
        let r = c
            .resolve(Signature(*b"DATA"), Signature(*b"INFO"), 4)
            .unwrap();
        assert_eq!(r.schema.sizing(), Sizing::Fixed(4));
    }

    #[test]
    fn test_next_marker_is_empty() {
        let mut b = CatalogBuilder::new();
        super::register(&mut b);
        let c = b.build();
        let r = c
            .resolve(Signature(*b"NEXT"), Signature(*b"INFO"), 0)
            .unwrap();
        assert_eq!(r.schema.sizing(), Sizing::Fixed(0));
    }
}
