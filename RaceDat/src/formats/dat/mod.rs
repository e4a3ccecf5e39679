//! Racing game `.dat` model format
//!
//! Big-endian throughout. The vertex layout is inferred from the declared
//! stride, skinned models carry a bone table ahead of their vertices, and
//! per-mesh transforms are recovered by scanning for mesh names.

pub mod cursor;
pub mod header;
pub mod hierarchy;
pub mod index;
pub mod inspect;
pub mod normals;
pub mod options;
pub mod reader;
pub mod skeleton;
pub mod transform;
pub mod types;
pub mod vertex;

pub use cursor::ByteCursor;
pub use inspect::{DatModelInfo, extract_dat_info_json, inspect_dat, inspect_dat_bytes};
pub use normals::{AnglePair, EncodedNormal, EulerAngles, NormalEncoding, QuantizedQuaternion};
pub use options::{DecodeOptions, FrameLayout, HeaderLayout, ModelKind};
pub use reader::{DatReader, detect_kind, parse_dat_bytes, read_dat};
pub use transform::{TRANSFORM_BACK_OFFSET, TransformLocator};
pub use types::{
    Bone, BoundingVolume, CoordinateFrame, Diagnostic, Header, HeaderSignature, IndexBuffer,
    IndexWidth, Mesh, MeshUnk, ModelFile, ModelVariant, OrientationFrame, Part, Skeleton,
    SkinWords, Vertex, VertexBuffer, VertexExtra,
};
