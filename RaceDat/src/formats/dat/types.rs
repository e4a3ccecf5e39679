//! Public data structures for `.dat` decoding.

use glam::Mat4;
use serde::Serialize;

use super::normals::{EncodedNormal, NormalEncoding};
use crate::error::Error;

// ============================================================================
// Header
// ============================================================================

/// One entry of the leading signature table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSignature {
    pub tag: String,
    pub value: u32,
}

/// File header. Descriptive only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    pub signatures: Vec<HeaderSignature>,
    /// The two trailing i16 fields of the legacy header layout.
    pub legacy_fields: Option<[i16; 2]>,
}

// ============================================================================
// Vertices
// ============================================================================

/// Vertex layout family, fixed once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelVariant {
    /// Position, normal, UV.
    StaticPlain,
    /// Position, normal, UV, packed color.
    StaticColor,
    /// Position, normal, UV, bone-weight word, bone-index word.
    Skinned,
}

impl ModelVariant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StaticPlain => "static",
            Self::StaticColor => "static+color",
            Self::Skinned => "skinned",
        }
    }

    #[must_use]
    pub fn is_skinned(self) -> bool {
        matches!(self, Self::Skinned)
    }

    /// Normal encoding this layout family stores.
    #[must_use]
    pub fn default_normal_encoding(self) -> NormalEncoding {
        match self {
            Self::StaticPlain | Self::Skinned => NormalEncoding::AnglePair,
            Self::StaticColor => NormalEncoding::Quaternion,
        }
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two skinning words of a skinned vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkinWords {
    /// Bit-packed weights (10/10/5/5 bits).
    pub weights: u32,
    /// Four 8-bit bone indices.
    pub indices: u32,
}

/// Variant-specific trailing fields of a vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VertexExtra {
    None,
    /// Packed 4×8-bit color word.
    Color(u32),
    Skin(SkinWords),
}

impl VertexExtra {
    /// Color channels, most significant byte first.
    #[must_use]
    pub fn color(&self) -> Option<[u8; 4]> {
        match self {
            Self::Color(packed) => Some(packed.to_be_bytes()),
            _ => None,
        }
    }

    #[must_use]
    pub fn skin(&self) -> Option<SkinWords> {
        match self {
            Self::Skin(words) => Some(*words),
            _ => None,
        }
    }
}

/// A decoded vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub position: [f32; 3],
    /// Reconstructed unit direction.
    pub normal: [f32; 3],
    /// The normal as stored.
    pub encoded_normal: EncodedNormal,
    pub uv: [f32; 2],
    pub extra: VertexExtra,
}

/// The decoded vertex array together with its declared layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexBuffer {
    pub variant: ModelVariant,
    pub normal_encoding: NormalEncoding,
    /// Declared record stride in bytes.
    pub stride: u32,
    /// Declared buffer length in bytes.
    pub byte_length: u32,
    /// Bytes skipped at the end of each record.
    pub padding: u32,
    pub vertices: Vec<Vertex>,
}

// ============================================================================
// Indices
// ============================================================================

/// Element width of the index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
}

impl IndexWidth {
    /// Map a width code read from the stream.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::U8),
            2 => Some(Self::U16),
            4 => Some(Self::U32),
            _ => None,
        }
    }

    #[must_use]
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// File-global vertex indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexBuffer {
    pub width: IndexWidth,
    pub byte_length: u32,
    pub indices: Vec<u32>,
}

// ============================================================================
// Hierarchy
// ============================================================================

/// Extents plus two orientation hints, stored as
/// `min.x, min.y, min.z, yaw, max.x, max.y, max.z, pitch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingVolume {
    pub min: [f32; 3],
    pub yaw: f32,
    pub max: [f32; 3],
    pub pitch: f32,
}

impl BoundingVolume {
    /// Wire size in bytes.
    pub const SIZE: usize = 32;

    #[must_use]
    pub fn from_floats(v: [f32; 8]) -> Self {
        Self {
            min: [v[0], v[1], v[2]],
            yaw: v[3],
            max: [v[4], v[5], v[6]],
            pitch: v[7],
        }
    }
}

/// Opaque 4×u32 mesh record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeshUnk(pub [u32; 4]);

/// A drawable sub-range of a mesh, usually one material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub label: String,
    /// First vertex, inclusive.
    pub first_vert_index: u32,
    /// Last vertex, inclusive.
    pub last_vert_index: u32,
    /// Offset into the index buffer, in elements.
    pub indices_offset: u32,
    pub triangles_count: u32,
    pub bounds: BoundingVolume,
}

impl Part {
    /// Number of vertices in the inclusive range, zero if inverted.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        if self.last_vert_index < self.first_vert_index {
            0
        } else {
            (self.last_vert_index - self.first_vert_index) as usize + 1
        }
    }
}

/// A named object made of parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    pub name: String,
    pub unk: Vec<MeshUnk>,
    pub parts: Vec<Part>,
    pub bounds: BoundingVolume,
    pub first_vert_index: u32,
    pub indices_offset: u32,
    pub vert_count: u32,
    /// World transform recovered from the trailing region, if found.
    pub frame: Option<CoordinateFrame>,
}

/// World transform and second bounding volume of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinateFrame {
    /// Row-major 4×4 matrix.
    pub matrix: [f32; 16],
    pub bounds: BoundingVolume,
    /// Absolute file offset the record was decoded from.
    pub offset: usize,
    /// Number of times the mesh name occurred in the scan region.
    pub match_count: usize,
}

impl CoordinateFrame {
    /// Matrix as a `glam` (column-major) matrix.
    #[must_use]
    pub fn to_mat4(self) -> Mat4 {
        Mat4::from_cols_array(&self.matrix).transpose()
    }
}

// ============================================================================
// Skeleton
// ============================================================================

/// Per-bone frame. Only the position is understood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientationFrame {
    pub position: [f32; 3],
    /// Seven floats of unconfirmed meaning (the last four are usually 1.0).
    pub extra: [f32; 7],
    pub flags: u32,
    /// Leading opaque word of the 48-byte frame layout.
    pub lead: Option<u32>,
}

/// A bone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bone {
    pub name: String,
    /// Parent index as stored; -1 for a root.
    pub parent_index: i32,
    /// Resolved parent. `None` for roots and for invalid parent indices.
    pub parent: Option<usize>,
    pub frame: OrientationFrame,
}

/// Bone table of a skinned model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    /// Three opaque words between the parent table and the frames.
    pub unknown: [u32; 3],
    /// Opaque floats after the frames.
    pub trailer: Vec<f32>,
}

impl Skeleton {
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A recoverable problem found while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// The mesh has no coordinate frame.
    TransformNotFound { mesh: String },
    /// The mesh name occurred several times; the first match was used.
    AmbiguousTransformName { mesh: String, matches: usize },
    /// The bone was attached as a root.
    InvalidBoneParent { bone: usize, parent: i32 },
}

impl Diagnostic {
    /// The equivalent error, for callers that treat diagnostics as fatal.
    #[must_use]
    pub fn to_error(&self) -> Error {
        match self {
            Self::TransformNotFound { mesh } => Error::TransformNotFound { mesh: mesh.clone() },
            Self::AmbiguousTransformName { mesh, matches } => Error::AmbiguousTransformName {
                mesh: mesh.clone(),
                matches: *matches,
            },
            Self::InvalidBoneParent { bone, parent } => Error::InvalidBoneParent {
                bone: *bone,
                parent: *parent,
            },
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_error())
    }
}

// ============================================================================
// Model
// ============================================================================

/// A fully decoded `.dat` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelFile {
    pub header: Header,
    pub variant: ModelVariant,
    pub skeleton: Option<Skeleton>,
    pub vertex_buffer: VertexBuffer,
    pub index_buffer: IndexBuffer,
    pub meshes: Vec<Mesh>,
    /// Absolute offset where the trailing scan region starts.
    pub trailing_offset: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ModelFile {
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertex_buffer.vertices
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.index_buffer.indices
    }

    #[must_use]
    pub fn find_mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    /// Names of meshes that have no coordinate frame.
    #[must_use]
    pub fn meshes_without_frame(&self) -> Vec<&str> {
        self.meshes
            .iter()
            .filter(|m| m.frame.is_none())
            .map(|m| m.name.as_str())
            .collect()
    }
}
