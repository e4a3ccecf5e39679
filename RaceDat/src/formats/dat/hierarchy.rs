//! Mesh → part hierarchy.
//!
//! Layout:
//! ```text
//! [4 bytes]  unknown
//! [4 bytes]  mesh_count
//! mesh_count × Mesh:
//!     name (null-terminated)
//!     unk_count(4) + unk_count × 16 bytes
//!     part_count(4) + part_count × Part:
//!         label (null-terminated)
//!         first_vert_index(4) last_vert_index(4) indices_offset(4) triangles_count(4)
//!         BoundingVolume(32)
//!     BoundingVolume(32)
//!     first_vert_index(4) indices_offset(4) vert_count(4)
//! ```

use super::cursor::ByteCursor;
use super::types::{BoundingVolume, Mesh, MeshUnk, Part};
use crate::error::Result;

/// Smallest possible part: empty label + four words + bounds.
const MIN_PART_SIZE: usize = 1 + 16 + BoundingVolume::SIZE;

/// Smallest possible mesh: empty name + two counts + bounds + three words.
const MIN_MESH_SIZE: usize = 1 + 8 + BoundingVolume::SIZE + 12;

const UNK_RECORD_SIZE: usize = 16;

/// Read a bounding volume.
pub fn read_bounding_volume(cursor: &mut ByteCursor<'_>) -> Result<BoundingVolume> {
    Ok(BoundingVolume::from_floats(cursor.read_f32_array::<8>()?))
}

/// Read the whole hierarchy. Any overrun aborts; no partial list is returned.
pub fn read_meshes(cursor: &mut ByteCursor<'_>) -> Result<Vec<Mesh>> {
    let start = cursor.position();
    let unknown = cursor.read_u32()?;
    let count = cursor.read_u32()? as usize;
    tracing::debug!("Mesh hierarchy at {start}: {count} mesh(es), leading word {unknown:#010x}");

    let mut meshes = Vec::with_capacity(count.min(cursor.remaining() / MIN_MESH_SIZE));
    for _ in 0..count {
        meshes.push(read_mesh(cursor)?);
    }
    Ok(meshes)
}

fn read_mesh(cursor: &mut ByteCursor<'_>) -> Result<Mesh> {
    let name = cursor.read_cstring()?;

    let unk_count = cursor.read_u32()? as usize;
    let mut unk = Vec::with_capacity(unk_count.min(cursor.remaining() / UNK_RECORD_SIZE));
    for _ in 0..unk_count {
        unk.push(MeshUnk([
            cursor.read_u32()?,
            cursor.read_u32()?,
            cursor.read_u32()?,
            cursor.read_u32()?,
        ]));
    }

    let part_count = cursor.read_u32()? as usize;
    let mut parts = Vec::with_capacity(part_count.min(cursor.remaining() / MIN_PART_SIZE));
    for _ in 0..part_count {
        parts.push(read_part(cursor)?);
    }

    let bounds = read_bounding_volume(cursor)?;
    let first_vert_index = cursor.read_u32()?;
    let indices_offset = cursor.read_u32()?;
    let vert_count = cursor.read_u32()?;

    tracing::debug!(
        "Mesh '{name}': {} part(s), {} unk record(s), {vert_count} vertices from {first_vert_index}",
        parts.len(),
        unk.len()
    );

    Ok(Mesh {
        name,
        unk,
        parts,
        bounds,
        first_vert_index,
        indices_offset,
        vert_count,
        frame: None,
    })
}

fn read_part(cursor: &mut ByteCursor<'_>) -> Result<Part> {
    Ok(Part {
        label: cursor.read_cstring()?,
        first_vert_index: cursor.read_u32()?,
        last_vert_index: cursor.read_u32()?,
        indices_offset: cursor.read_u32()?,
        triangles_count: cursor.read_u32()?,
        bounds: read_bounding_volume(cursor)?,
    })
}
