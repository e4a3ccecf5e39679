//! `.dat` file reading
//!
//! Wire order:
//! ```text
//! Header
//! Skeleton            (skinned models only)
//! VertexBuffer
//! IndexBuffer
//! Mesh hierarchy
//! trailing region     (transform records, located by mesh name)
//! ```

use super::cursor::ByteCursor;
use super::header::read_header;
use super::hierarchy::read_meshes;
use super::index::read_index_buffer;
use super::options::{DecodeOptions, ModelKind};
use super::skeleton::read_skeleton;
use super::transform::TransformLocator;
use super::types::{Diagnostic, ModelFile};
use super::vertex::{STATIC_RECORD_SIZE, is_plausible_preamble, read_vertex_buffer};
use crate::error::Result;
use std::path::Path;

/// Read a `.dat` file from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or any decode error
/// from [`parse_dat_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_dat<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<ModelFile> {
    let data = std::fs::read(path)?;
    parse_dat_bytes(&data, options)
}

/// Decode a `.dat` file held in memory.
///
/// # Errors
///
/// Returns [`Error::OutOfData`] on truncation, [`Error::InvalidStride`] or
/// [`Error::UnsupportedIndexWidth`] on unknown layouts, and in strict mode
/// the error matching the first diagnostic.
///
/// [`Error::OutOfData`]: crate::Error::OutOfData
/// [`Error::InvalidStride`]: crate::Error::InvalidStride
/// [`Error::UnsupportedIndexWidth`]: crate::Error::UnsupportedIndexWidth
pub fn parse_dat_bytes(data: &[u8], options: &DecodeOptions) -> Result<ModelFile> {
    DatReader::new(data, options.clone()).read()
}

/// Guess whether the data at the cursor starts a static vertex buffer.
///
/// Skinned files put their skeleton here instead, whose leading bone count
/// and first name bytes do not form a plausible stride/length pair.
#[must_use]
pub fn detect_kind(cursor: &ByteCursor<'_>) -> ModelKind {
    if is_plausible_preamble(cursor, cursor.position(), STATIC_RECORD_SIZE) {
        ModelKind::Static
    } else {
        ModelKind::Skinned
    }
}

/// Single-pass decoder over one file buffer.
pub struct DatReader<'a> {
    cursor: ByteCursor<'a>,
    options: DecodeOptions,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> DatReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            options,
            diagnostics: Vec::new(),
        }
    }

    /// Decode the whole file.
    ///
    /// # Errors
    ///
    /// See [`parse_dat_bytes`].
    pub fn read(mut self) -> Result<ModelFile> {
        let header = read_header(&mut self.cursor, self.options.header_layout)?;

        let kind = match self.options.kind {
            Some(kind) => kind,
            None => detect_kind(&self.cursor),
        };
        tracing::debug!("Model kind: {kind:?}");

        let skeleton = match kind {
            ModelKind::Skinned => {
                let (skeleton, diagnostics) = read_skeleton(&mut self.cursor, &self.options)?;
                for diagnostic in diagnostics {
                    self.report(diagnostic)?;
                }
                Some(skeleton)
            }
            ModelKind::Static => None,
        };

        let vertex_buffer =
            read_vertex_buffer(&mut self.cursor, kind, self.options.normal_encoding)?;
        let index_buffer = read_index_buffer(&mut self.cursor)?;
        let mut meshes = read_meshes(&mut self.cursor)?;

        let trailing_offset = self.cursor.position();
        let locator = TransformLocator::new(self.cursor.data(), trailing_offset)
            .with_back_offset(self.options.transform_back_offset);
        tracing::debug!(
            "Scanning {} trailing bytes for {} transform(s)",
            locator.scan_region().len(),
            meshes.len()
        );

        for mesh in &mut meshes {
            match locator.locate(&mesh.name) {
                Ok(frame) => {
                    if frame.match_count > 1 {
                        self.report(Diagnostic::AmbiguousTransformName {
                            mesh: mesh.name.clone(),
                            matches: frame.match_count,
                        })?;
                    }
                    mesh.frame = Some(frame);
                }
                Err(_) => self.report(Diagnostic::TransformNotFound {
                    mesh: mesh.name.clone(),
                })?,
            }
        }

        Ok(ModelFile {
            header,
            variant: vertex_buffer.variant,
            skeleton,
            vertex_buffer,
            index_buffer,
            meshes,
            trailing_offset,
            diagnostics: self.diagnostics,
        })
    }

    /// Record a recoverable problem, or fail with it in strict mode.
    fn report(&mut self, diagnostic: Diagnostic) -> Result<()> {
        if self.options.strict {
            return Err(diagnostic.to_error());
        }
        tracing::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
        Ok(())
    }
}
