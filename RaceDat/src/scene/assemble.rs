//! Scene assembly from a decoded model.
//!
//! Slices the shared vertex array per part and rebases the file-global
//! indices onto each part's own vertex range.

use glam::Mat4;
use serde::Serialize;

use super::skin::{SkinInfluence, unpack_skin};
use crate::error::{Error, Result};
use crate::formats::dat::{
    BoundingVolume, Diagnostic, Mesh, ModelFile, ModelVariant, Part, Skeleton, Vertex,
};

/// Everything a consumer needs to build its own objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub variant: ModelVariant,
    pub meshes: Vec<SceneMesh>,
    pub skeleton: Option<SceneSkeleton>,
    /// Meshes whose transform could not be located.
    pub meshes_without_frame: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A mesh and its parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneMesh {
    pub name: String,
    pub bounds: BoundingVolume,
    pub frame: Option<SceneFrame>,
    pub parts: Vec<ScenePart>,
}

/// World transform of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneFrame {
    pub matrix: Mat4,
    pub bounds: BoundingVolume,
}

/// Part geometry with indices local to the part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePart {
    pub label: String,
    pub bounds: BoundingVolume,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Present for the color variant.
    pub colors: Option<Vec<[u8; 4]>>,
    /// Present for the skinned variant, one list per vertex.
    pub skin: Option<Vec<Vec<SkinInfluence>>>,
    pub triangles: Vec<[u32; 3]>,
}

impl ScenePart {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Bone with its parent resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneBone {
    pub name: String,
    pub parent: Option<usize>,
    pub position: [f32; 3],
}

/// Bone hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSkeleton {
    pub bones: Vec<SceneBone>,
    pub roots: Vec<usize>,
    /// Bones in depth-first order, roots first.
    pub depth_first: Vec<usize>,
}

impl SceneSkeleton {
    #[must_use]
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let bones: Vec<SceneBone> = skeleton
            .bones
            .iter()
            .map(|b| SceneBone {
                name: b.name.clone(),
                parent: b.parent,
                position: b.frame.position,
            })
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); bones.len()];
        let mut roots = Vec::new();
        for (i, bone) in bones.iter().enumerate() {
            match bone.parent {
                Some(parent) => children[parent].push(i),
                None => roots.push(i),
            }
        }

        let mut depth_first = Vec::with_capacity(bones.len());
        let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            depth_first.push(idx);
            stack.extend(children[idx].iter().rev());
        }

        Self {
            bones,
            roots,
            depth_first,
        }
    }
}

/// Build the scene.
///
/// # Errors
///
/// Returns [`Error::OutOfData`] when a part's vertex or index range lies
/// outside the decoded buffers (offsets and sizes in elements), and
/// [`Error::IndexOutOfPartRange`] when a triangle references a vertex
/// outside its part.
pub fn assemble(model: &ModelFile) -> Result<Scene> {
    let meshes = model
        .meshes
        .iter()
        .map(|mesh| assemble_mesh(model, mesh))
        .collect::<Result<Vec<_>>>()?;

    Ok(Scene {
        variant: model.variant,
        meshes,
        skeleton: model.skeleton.as_ref().map(SceneSkeleton::from_skeleton),
        meshes_without_frame: model
            .meshes_without_frame()
            .into_iter()
            .map(String::from)
            .collect(),
        diagnostics: model.diagnostics.clone(),
    })
}

fn assemble_mesh(model: &ModelFile, mesh: &Mesh) -> Result<SceneMesh> {
    let parts = mesh
        .parts
        .iter()
        .map(|part| assemble_part(model, part))
        .collect::<Result<Vec<_>>>()?;

    Ok(SceneMesh {
        name: mesh.name.clone(),
        bounds: mesh.bounds,
        frame: mesh.frame.map(|f| SceneFrame {
            matrix: f.to_mat4(),
            bounds: f.bounds,
        }),
        parts,
    })
}

/// Assemble one part.
///
/// # Errors
///
/// See [`assemble`].
pub fn assemble_part(model: &ModelFile, part: &Part) -> Result<ScenePart> {
    let vertices = part_vertices(model.vertices(), part)?;
    let triangles = part_triangles(model.indices(), part)?;

    let colors = (model.variant == ModelVariant::StaticColor)
        .then(|| vertices.iter().map(|v| v.extra.color().unwrap_or_default()).collect());
    let skin = model.variant.is_skinned().then(|| {
        vertices
            .iter()
            .map(|v| v.extra.skin().map(unpack_skin).unwrap_or_default())
            .collect()
    });

    Ok(ScenePart {
        label: part.label.clone(),
        bounds: part.bounds,
        positions: vertices.iter().map(|v| v.position).collect(),
        normals: vertices.iter().map(|v| v.normal).collect(),
        uvs: vertices.iter().map(|v| v.uv).collect(),
        colors,
        skin,
        triangles,
    })
}

/// The part's inclusive vertex range. An inverted range is empty, but must
/// still start inside the vertex array.
fn part_vertices<'a>(vertices: &'a [Vertex], part: &Part) -> Result<&'a [Vertex]> {
    let first = part.first_vert_index as usize;
    let count = part.vertex_count();
    vertices.get(first..first + count).ok_or(Error::OutOfData {
        offset: first,
        needed: count,
        available: vertices.len().saturating_sub(first),
    })
}

/// The part's triangles, rebased to `first_vert_index`.
fn part_triangles(indices: &[u32], part: &Part) -> Result<Vec<[u32; 3]>> {
    let start = part.indices_offset as usize;
    let needed = part.triangles_count as usize * 3;
    let slice = indices.get(start..start + needed).ok_or(Error::OutOfData {
        offset: start,
        needed,
        available: indices.len().saturating_sub(start),
    })?;

    let first = part.first_vert_index;
    let last = part.last_vert_index;
    let rebase = |index: u32| {
        if (first..=last).contains(&index) {
            Ok(index - first)
        } else {
            Err(Error::IndexOutOfPartRange {
                part: part.label.clone(),
                index,
                first,
                last,
            })
        }
    };

    slice
        .chunks_exact(3)
        .map(|tri| -> Result<[u32; 3]> { Ok([rebase(tri[0])?, rebase(tri[1])?, rebase(tri[2])?]) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dat::{
        Bone, CoordinateFrame, EncodedNormal, Header, IndexBuffer, IndexWidth, NormalEncoding,
        OrientationFrame, SkinWords, VertexBuffer, VertexExtra,
    };
    use pretty_assertions::assert_eq;

    fn vertex(x: f32, extra: VertexExtra) -> Vertex {
        Vertex {
            position: [x, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            encoded_normal: EncodedNormal::AnglePair { pitch: 0, yaw: 0 },
            uv: [0.0, 0.0],
            extra,
        }
    }

    fn part(label: &str, first: u32, last: u32, offset: u32, triangles: u32) -> Part {
        Part {
            label: label.into(),
            first_vert_index: first,
            last_vert_index: last,
            indices_offset: offset,
            triangles_count: triangles,
            bounds: BoundingVolume::default(),
        }
    }

    fn model(variant: ModelVariant, vertices: Vec<Vertex>, indices: Vec<u32>, parts: Vec<Part>) -> ModelFile {
        ModelFile {
            header: Header::default(),
            variant,
            skeleton: None,
            vertex_buffer: VertexBuffer {
                variant,
                normal_encoding: NormalEncoding::AnglePair,
                stride: 24,
                byte_length: 0,
                padding: 0,
                vertices,
            },
            index_buffer: IndexBuffer {
                width: IndexWidth::U16,
                byte_length: 0,
                indices,
            },
            meshes: vec![Mesh {
                name: "body".into(),
                unk: Vec::new(),
                parts,
                bounds: BoundingVolume::default(),
                first_vert_index: 0,
                indices_offset: 0,
                vert_count: 0,
                frame: None,
            }],
            trailing_offset: 0,
            diagnostics: Vec::new(),
        }
    }

    fn plain(count: usize) -> Vec<Vertex> {
        (0..count).map(|i| vertex(i as f32, VertexExtra::None)).collect()
    }

    #[test]
    fn test_indices_rebased_per_part() {
        let m = model(
            ModelVariant::StaticPlain,
            plain(6),
            vec![0, 1, 2, 3, 4, 5, 5, 4, 3],
            vec![part("front", 0, 2, 0, 1), part("rear", 3, 5, 3, 2)],
        );
        let scene = assemble(&m).unwrap();
        let rear = &scene.meshes[0].parts[1];
        assert_eq!(rear.triangles, vec![[0, 1, 2], [2, 1, 0]]);
        assert_eq!(rear.positions[0], [3.0, 0.0, 0.0]);
        assert_eq!(rear.vertex_count(), 3);
        assert!(rear.colors.is_none());
        assert!(rear.skin.is_none());
        assert_eq!(scene.meshes_without_frame, vec!["body".to_string()]);
    }

    #[test]
    fn test_index_outside_part() {
        let m = model(
            ModelVariant::StaticPlain,
            plain(6),
            vec![3, 4, 2],
            vec![part("rear", 3, 5, 0, 1)],
        );
        assert!(matches!(
            assemble(&m),
            Err(Error::IndexOutOfPartRange { index: 2, first: 3, last: 5, .. })
        ));
    }

    #[test]
    fn test_part_range_outside_vertices() {
        let m = model(
            ModelVariant::StaticPlain,
            plain(2),
            vec![0, 1, 2],
            vec![part("paint", 0, 2, 0, 1)],
        );
        assert!(matches!(
            assemble(&m),
            Err(Error::OutOfData { offset: 0, needed: 3, available: 2 })
        ));
    }

    #[test]
    fn test_triangles_past_index_buffer() {
        let m = model(
            ModelVariant::StaticPlain,
            plain(3),
            vec![0, 1, 2],
            vec![part("paint", 0, 2, 0, 2)],
        );
        assert!(matches!(assemble(&m), Err(Error::OutOfData { needed: 6, .. })));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let m = model(
            ModelVariant::StaticPlain,
            plain(3),
            vec![0, 1, 2],
            vec![part("empty", 2, 1, 0, 0)],
        );
        let scene = assemble(&m).unwrap();
        assert_eq!(scene.meshes[0].parts[0].vertex_count(), 0);
    }

    #[test]
    fn test_inverted_range_past_vertices() {
        let m = model(
            ModelVariant::StaticPlain,
            plain(3),
            Vec::new(),
            vec![part("ghost", 9, 4, 0, 0)],
        );
        assert!(matches!(
            assemble(&m),
            Err(Error::OutOfData { offset: 9, needed: 0, available: 0 })
        ));
    }

    #[test]
    fn test_color_and_skin_attributes() {
        let colored = vec![vertex(0.0, VertexExtra::Color(0x1122_3344)); 3];
        let m = model(ModelVariant::StaticColor, colored, vec![0, 1, 2], vec![part("p", 0, 2, 0, 1)]);
        let scene = assemble(&m).unwrap();
        assert_eq!(scene.meshes[0].parts[0].colors.as_ref().unwrap()[1], [0x11, 0x22, 0x33, 0x44]);

        let words = SkinWords { weights: 0x7DFF_FFFF, indices: 0x0403_0201 };
        let skinned = vec![vertex(0.0, VertexExtra::Skin(words)); 3];
        let m = model(ModelVariant::Skinned, skinned, vec![0, 1, 2], vec![part("p", 0, 2, 0, 1)]);
        let scene = assemble(&m).unwrap();
        let skin = scene.meshes[0].parts[0].skin.as_ref().unwrap();
        assert_eq!(skin.len(), 3);
        assert_eq!(skin[0].len(), 4);
        assert_eq!(skin[0][3], SkinInfluence { bone: 4, weight: 1.0 });
    }

    #[test]
    fn test_frame_becomes_mat4() {
        let mut m = model(ModelVariant::StaticPlain, plain(3), vec![0, 1, 2], vec![part("p", 0, 2, 0, 1)]);
        let mut matrix = [0.0f32; 16];
        matrix[0] = 1.0;
        matrix[5] = 1.0;
        matrix[10] = 1.0;
        matrix[15] = 1.0;
        matrix[11] = -2.0;
        m.meshes[0].frame = Some(CoordinateFrame {
            matrix,
            bounds: BoundingVolume::default(),
            offset: 0,
            match_count: 1,
        });
        let scene = assemble(&m).unwrap();
        let frame = scene.meshes[0].frame.unwrap();
        assert_eq!(frame.matrix.transform_point3(glam::Vec3::ZERO), glam::Vec3::new(0.0, 0.0, -2.0));
        assert!(scene.meshes_without_frame.is_empty());
    }

    #[test]
    fn test_skeleton_depth_first() {
        let frame = OrientationFrame {
            position: [0.0; 3],
            extra: [0.0; 7],
            flags: 0,
            lead: None,
        };
        let bone = |name: &str, parent: Option<usize>| Bone {
            name: name.into(),
            parent_index: parent.map_or(-1, |p| p as i32),
            parent,
            frame,
        };
        let skeleton = Skeleton {
            bones: vec![
                bone("root", None),
                bone("wheel_l", Some(0)),
                bone("orphan", None),
                bone("hub_l", Some(1)),
                bone("wheel_r", Some(0)),
            ],
            unknown: [0; 3],
            trailer: Vec::new(),
        };
        let scene = SceneSkeleton::from_skeleton(&skeleton);
        assert_eq!(scene.roots, vec![0, 2]);
        assert_eq!(scene.depth_first, vec![0, 1, 3, 4, 2]);
        assert_eq!(scene.bones[3].parent, Some(1));
    }
}
