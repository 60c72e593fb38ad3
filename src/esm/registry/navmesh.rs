//! Navigation mesh records.
//!
//! The per-mesh geometry subrecords are uniform arrays and convert through
//! the generic engine. The map-level connection subrecords (NVMI/NVCI) and
//! the cell grid (NVGD) embed their own repeat counts and are converted by
//! overrides; they are deliberately absent here so the override table is
//! their only conversion path.

use super::{field, pad};
use crate::esm::catalog::CatalogBuilder;
use crate::esm::schema::{FieldKind::*, Schema};

pub(crate) fn register(b: &mut CatalogBuilder) {
    // Format version, shared by NAVM and NAVI.
    b.add(b"NVER", None, Schema::uint32("version"));

    // --- Per-mesh geometry (NAVM) ---
    b.add(
        b"DATA",
        Some(b"NAVM"),
        Schema::fields(vec![
            field("cell", FormId),
            field("vertex_count", UInt32),
            field("triangle_count", UInt32),
            field("external_connection_count", UInt32),
            field("cover_triangle_count", UInt32),
        ]),
    );
    // Vertices: packed x/y/z floats.
    b.add(b"NVVX", Some(b"NAVM"), Schema::array("vertices", Float));
    // Triangles: three vertex indices, three edge links, one flag word.
    b.add(
        b"NVTR",
        Some(b"NAVM"),
        Schema::array_of(vec![
            field("vertex0", Int16),
            field("vertex1", Int16),
            field("vertex2", Int16),
            field("edge0", Int16),
            field("edge1", Int16),
            field("edge2", Int16),
            field("flags", UInt32),
        ]),
    );
    // Cover triangles.
    b.add(b"NVCA", Some(b"NAVM"), Schema::array("cover_triangles", Int16));
    // Door links: portal FormID plus the triangle that owns it.
    b.add(
        b"NVDP",
        Some(b"NAVM"),
        Schema::array_of(vec![
            field("door", FormId),
            field("triangle", UInt16),
            pad(2),
        ]),
    );
    // External edge links.
    b.add(
        b"NVEX",
        Some(b"NAVM"),
        Schema::array_of(vec![
            field("unknown", UInt32),
            field("mesh", FormId),
            field("triangle", UInt16),
        ]),
    );
}
