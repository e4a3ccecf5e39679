//! # RaceDat
//!
//! A pure-Rust decoder for the reverse-engineered `.dat` model format of a
//! racing game.
//!
//! ## What gets decoded
//!
//! - **Vertices** - static, static with vertex color, and skinned layouts
//! - **Indices** - 8, 16 or 32-bit, kept file-global
//! - **Meshes and parts** - with their bounding volumes
//! - **Skeletons** - bone names, parent links and orientation frames
//! - **Transforms** - per-mesh world matrices recovered by name search
//!
//! ## Quick Start
//!
//! ```no_run
//! use racedat::formats::dat::{DecodeOptions, read_dat};
//! use racedat::scene::assemble;
//!
//! let model = read_dat("car.dat", &DecodeOptions::default())?;
//! println!("{} meshes, {} vertices", model.meshes.len(), model.vertices().len());
//!
//! let scene = assemble(&model)?;
//! for mesh in &scene.meshes {
//!     println!("{}: {} parts", mesh.name, mesh.parts.len());
//! }
//! # Ok::<(), racedat::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `racedat` command-line binary

pub mod batch;
pub mod error;
pub mod formats;
pub mod scene;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::dat::{
        DatModelInfo, DatReader, DecodeOptions, Diagnostic, FrameLayout, HeaderLayout, ModelFile,
        ModelKind, ModelVariant, TransformLocator, inspect_dat, parse_dat_bytes, read_dat,
    };
    pub use crate::scene::{Scene, SceneMesh, ScenePart, SkinInfluence, assemble};
    pub use crate::batch::{BatchDecodeResult, batch_inspect, find_dat_files};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
