//! Scene assembly
//!
//! Turns a decoded [`ModelFile`](crate::formats::dat::ModelFile) into
//! per-part geometry with local indices, unpacked skin influences and
//! resolved transforms. Consumers build their own objects from this.

pub mod assemble;
pub mod skin;

pub use assemble::{
    Scene, SceneBone, SceneFrame, SceneMesh, ScenePart, SceneSkeleton, assemble, assemble_part,
};
pub use skin::{SkinInfluence, unpack_bone_indices, unpack_skin, unpack_weights};
