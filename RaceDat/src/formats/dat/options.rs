//! Decode options for `.dat` files
//!
//! The format carries no version tag, so a few layout choices are detected
//! heuristically. These options force them when the heuristics are wrong for
//! a particular file.

use super::normals::NormalEncoding;
use super::transform::TRANSFORM_BACK_OFFSET;

/// Static or skinned model. Static files further split by stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Static,
    Skinned,
}

/// Layout of the leading header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderLayout {
    /// Count-prefixed table of (signature, u32) pairs.
    #[default]
    SignatureTable,
    /// Leading i32, one signature string, two i16 fields.
    Legacy,
}

/// Layout of each bone's orientation frame record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameLayout {
    /// 44 bytes: position, 7 floats, flags.
    #[default]
    Compact,
    /// 48 bytes: opaque word, 7 floats, flags, position.
    Leading,
}

impl FrameLayout {
    /// Record size in bytes.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Compact => 44,
            Self::Leading => 48,
        }
    }
}

/// Options controlling a decode.
///
/// # Example
///
/// ```
/// use racedat::formats::dat::{DecodeOptions, FrameLayout};
///
/// let options = DecodeOptions::new()
///     .with_frame_layout(FrameLayout::Leading)
///     .with_skeleton_trailer(5)
///     .with_strict(true);
/// assert!(options.strict);
/// ```
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Force static or skinned decoding instead of probing.
    pub kind: Option<ModelKind>,

    /// Override the variant's normal encoding.
    pub normal_encoding: Option<NormalEncoding>,

    pub header_layout: HeaderLayout,

    pub frame_layout: FrameLayout,

    /// Number of opaque floats after the bone frames. Probed (5 or 8) when `None`.
    pub skeleton_trailer: Option<usize>,

    /// Distance from a name match back to the start of its transform record.
    /// Default: 97
    pub transform_back_offset: usize,

    /// Turn the first recoverable diagnostic into an error.
    pub strict: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeOptions {
    /// Options with every layout choice detected automatically.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: None,
            normal_encoding: None,
            header_layout: HeaderLayout::SignatureTable,
            frame_layout: FrameLayout::Compact,
            skeleton_trailer: None,
            transform_back_offset: TRANSFORM_BACK_OFFSET,
            strict: false,
        }
    }

    /// Layout read by the earliest known importer: legacy header and
    /// 48-byte bone frames followed by five floats.
    #[must_use]
    pub fn legacy() -> Self {
        Self::new()
            .with_header_layout(HeaderLayout::Legacy)
            .with_frame_layout(FrameLayout::Leading)
            .with_skeleton_trailer(5)
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_normal_encoding(mut self, encoding: NormalEncoding) -> Self {
        self.normal_encoding = Some(encoding);
        self
    }

    #[must_use]
    pub fn with_header_layout(mut self, layout: HeaderLayout) -> Self {
        self.header_layout = layout;
        self
    }

    #[must_use]
    pub fn with_frame_layout(mut self, layout: FrameLayout) -> Self {
        self.frame_layout = layout;
        self
    }

    #[must_use]
    pub fn with_skeleton_trailer(mut self, count: usize) -> Self {
        self.skeleton_trailer = Some(count);
        self
    }

    #[must_use]
    pub fn with_transform_back_offset(mut self, offset: usize) -> Self {
        self.transform_back_offset = offset;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
