//! `.dat` inspection utilities
//!
//! Summarises a decoded model as a serializable report.

use super::options::DecodeOptions;
use super::reader::parse_dat_bytes;
use super::types::{ModelFile, ModelVariant};
use crate::error::Result;
use std::path::Path;

/// Summary of one part.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatPartInfo {
    pub label: String,
    pub first_vert_index: u32,
    pub last_vert_index: u32,
    pub triangle_count: u32,
}

/// Summary of one mesh.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatMeshInfo {
    pub name: String,
    pub vert_count: u32,
    pub has_frame: bool,
    /// Translation column of the frame, if found.
    pub translation: Option<[f32; 3]>,
    pub parts: Vec<DatPartInfo>,
}

/// Bone summary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatBoneInfo {
    pub name: String,
    pub parent_index: i32,
    pub position: [f32; 3],
}

/// Skeleton summary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatSkeletonInfo {
    pub bone_count: usize,
    pub trailer_len: usize,
    pub bones: Vec<DatBoneInfo>,
}

/// Complete model summary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatModelInfo {
    pub file_path: Option<String>,
    pub file_size: usize,
    pub variant: ModelVariant,
    pub signatures: Vec<String>,
    pub stride: u32,
    pub vertex_count: usize,
    pub index_count: usize,
    pub index_width: usize,
    pub trailing_offset: usize,
    pub meshes: Vec<DatMeshInfo>,
    pub skeleton: Option<DatSkeletonInfo>,
    pub diagnostics: Vec<String>,
}

impl DatModelInfo {
    /// Build the summary of an already decoded model.
    #[must_use]
    pub fn from_model(model: &ModelFile, file_size: usize) -> Self {
        let meshes = model
            .meshes
            .iter()
            .map(|m| DatMeshInfo {
                name: m.name.clone(),
                vert_count: m.vert_count,
                has_frame: m.frame.is_some(),
                translation: m.frame.map(|f| f.to_mat4().w_axis.truncate().to_array()),
                parts: m
                    .parts
                    .iter()
                    .map(|p| DatPartInfo {
                        label: p.label.clone(),
                        first_vert_index: p.first_vert_index,
                        last_vert_index: p.last_vert_index,
                        triangle_count: p.triangles_count,
                    })
                    .collect(),
            })
            .collect();

        let skeleton = model.skeleton.as_ref().map(|s| DatSkeletonInfo {
            bone_count: s.bones.len(),
            trailer_len: s.trailer.len(),
            bones: s
                .bones
                .iter()
                .map(|b| DatBoneInfo {
                    name: b.name.clone(),
                    parent_index: b.parent_index,
                    position: b.frame.position,
                })
                .collect(),
        });

        Self {
            file_path: None,
            file_size,
            variant: model.variant,
            signatures: model.header.signatures.iter().map(|s| s.tag.clone()).collect(),
            stride: model.vertex_buffer.stride,
            vertex_count: model.vertices().len(),
            index_count: model.indices().len(),
            index_width: model.index_buffer.width.bytes(),
            trailing_offset: model.trailing_offset,
            meshes,
            skeleton,
            diagnostics: model.diagnostics.iter().map(ToString::to_string).collect(),
        }
    }

    /// Total triangles across every part.
    #[must_use]
    pub fn triangle_count(&self) -> u64 {
        self.meshes
            .iter()
            .flat_map(|m| &m.parts)
            .map(|p| u64::from(p.triangle_count))
            .sum()
    }
}

/// Decode a file and summarise it.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn inspect_dat<P: AsRef<Path>>(source: P, options: &DecodeOptions) -> Result<DatModelInfo> {
    let source_path = source.as_ref();
    let data = std::fs::read(source_path)?;
    let mut info = inspect_dat_bytes(&data, options)?;
    info.file_path = Some(source_path.display().to_string());
    Ok(info)
}

/// Decode bytes and summarise them.
///
/// # Errors
/// Returns an error if the data cannot be decoded.
pub fn inspect_dat_bytes(data: &[u8], options: &DecodeOptions) -> Result<DatModelInfo> {
    let model = parse_dat_bytes(data, options)?;
    Ok(DatModelInfo::from_model(&model, data.len()))
}

/// Decode a file and write its summary as pretty JSON.
///
/// # Errors
/// Returns an error if the file cannot be decoded or the output cannot be written.
pub fn extract_dat_info_json<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    options: &DecodeOptions,
) -> Result<DatModelInfo> {
    let info = inspect_dat(source, options)?;
    let json = serde_json::to_string_pretty(&info)?;
    std::fs::write(dest, json)?;
    Ok(info)
}
