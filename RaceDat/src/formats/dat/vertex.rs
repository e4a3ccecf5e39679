//! Vertex buffer decoding.
//!
//! The buffer is preceded by its declared stride and byte length. The
//! stride decides which optional fields a record carries: a static record
//! with at least four spare bytes has a packed color word, and whatever is
//! left after the declared fields is padding.

use super::cursor::ByteCursor;
use super::normals::{EncodedNormal, NormalEncoding};
use super::options::ModelKind;
use super::types::{ModelVariant, SkinWords, Vertex, VertexBuffer, VertexExtra};
use crate::error::{Error, Result};

/// Position (12) + normal (8) + UV (4).
pub const STATIC_RECORD_SIZE: u32 = 24;

/// Static record plus bone-weight and bone-index words.
pub const SKINNED_RECORD_SIZE: u32 = 32;

/// Packed color word.
pub const COLOR_SIZE: u32 = 4;

/// Largest stride accepted when probing for a vertex buffer preamble.
pub const MAX_PROBE_STRIDE: u32 = 256;

/// Record layout resolved from a declared stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub variant: ModelVariant,
    pub normal_encoding: NormalEncoding,
    pub stride: u32,
    pub padding: u32,
}

impl VertexLayout {
    /// Resolve the layout for `kind` with the declared `stride`.
    pub fn resolve(kind: ModelKind, stride: u32, encoding: Option<NormalEncoding>) -> Result<Self> {
        let (variant, padding) = match kind {
            ModelKind::Static => {
                let padding = checked_padding(stride, STATIC_RECORD_SIZE, ModelVariant::StaticPlain)?;
                if padding >= COLOR_SIZE {
                    (ModelVariant::StaticColor, padding - COLOR_SIZE)
                } else {
                    (ModelVariant::StaticPlain, padding)
                }
            }
            ModelKind::Skinned => {
                let padding = checked_padding(stride, SKINNED_RECORD_SIZE, ModelVariant::Skinned)?;
                (ModelVariant::Skinned, padding)
            }
        };

        Ok(Self {
            variant,
            normal_encoding: encoding.unwrap_or_else(|| variant.default_normal_encoding()),
            stride,
            padding,
        })
    }
}

fn checked_padding(stride: u32, minimum: u32, variant: ModelVariant) -> Result<u32> {
    stride.checked_sub(minimum).ok_or(Error::InvalidStride {
        stride,
        minimum,
        variant: variant.as_str(),
    })
}

/// Whether the two words at `offset` look like a vertex buffer preamble:
/// a stride of at least `min_stride`, and a byte length that is a multiple
/// of it and fits in the buffer.
#[must_use]
pub fn is_plausible_preamble(cursor: &ByteCursor<'_>, offset: usize, min_stride: u32) -> bool {
    let (Some(stride), Some(length)) = (cursor.peek_u32_at(offset), cursor.peek_u32_at(offset + 4)) else {
        return false;
    };
    if stride < min_stride || stride > MAX_PROBE_STRIDE {
        return false;
    }
    length % stride == 0 && offset + 8 + length as usize <= cursor.len()
}

/// Read the stride, byte length and every vertex record.
pub fn read_vertex_buffer(
    cursor: &mut ByteCursor<'_>,
    kind: ModelKind,
    encoding: Option<NormalEncoding>,
) -> Result<VertexBuffer> {
    let start = cursor.position();
    let stride = cursor.read_u32()?;
    let byte_length = cursor.read_u32()?;

    // A zero stride is below every minimum, so this also guards the division
    let layout = VertexLayout::resolve(kind, stride, encoding)?;
    let count = (byte_length / stride) as usize;
    let remainder = (byte_length % stride) as usize;

    tracing::debug!(
        "Vertex buffer at {start}: {count} x {stride} bytes ({}, {:?}, {} padding)",
        layout.variant,
        layout.normal_encoding,
        layout.padding
    );

    let mut vertices = Vec::with_capacity(count.min(cursor.remaining() / stride as usize));
    for _ in 0..count {
        vertices.push(read_vertex(cursor, &layout)?);
    }

    if remainder != 0 {
        tracing::warn!(
            "Vertex byte length {byte_length} is not a multiple of stride {stride}; skipping {remainder} bytes"
        );
        cursor.skip(remainder)?;
    }

    Ok(VertexBuffer {
        variant: layout.variant,
        normal_encoding: layout.normal_encoding,
        stride,
        byte_length,
        padding: layout.padding,
        vertices,
    })
}

/// Read one record, including its padding.
pub fn read_vertex(cursor: &mut ByteCursor<'_>, layout: &VertexLayout) -> Result<Vertex> {
    let position = cursor.read_f32_array::<3>()?;
    let encoded_normal = read_normal(cursor, layout.normal_encoding)?;
    let uv = [cursor.read_f16()?, cursor.read_f16()?];

    let extra = match layout.variant {
        ModelVariant::StaticPlain => VertexExtra::None,
        ModelVariant::StaticColor => VertexExtra::Color(cursor.read_u32()?),
        ModelVariant::Skinned => VertexExtra::Skin(SkinWords {
            weights: cursor.read_u32()?,
            indices: cursor.read_u32()?,
        }),
    };

    cursor.skip(layout.padding as usize)?;

    Ok(Vertex {
        position,
        normal: encoded_normal.direction(),
        encoded_normal,
        uv,
        extra,
    })
}

/// Read an 8-byte encoded normal.
pub fn read_normal(cursor: &mut ByteCursor<'_>, encoding: NormalEncoding) -> Result<EncodedNormal> {
    Ok(match encoding {
        NormalEncoding::AnglePair => EncodedNormal::AnglePair {
            pitch: cursor.read_u32()?,
            yaw: cursor.read_u32()?,
        },
        NormalEncoding::Quaternion => EncodedNormal::Quaternion([
            cursor.read_u16()?,
            cursor.read_u16()?,
            cursor.read_u16()?,
            cursor.read_u16()?,
        ]),
    })
}
