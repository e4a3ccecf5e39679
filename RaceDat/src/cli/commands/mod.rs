use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::formats::dat::{DecodeOptions, FrameLayout, HeaderLayout};

pub mod batch;
pub mod execute;
pub mod model;

/// Skeleton frame layout argument
#[derive(Debug, Clone, Copy)]
pub struct FrameLayoutArg(pub FrameLayout);

impl FromStr for FrameLayoutArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" | "44" => Ok(Self(FrameLayout::Compact)),
            "leading" | "48" => Ok(Self(FrameLayout::Leading)),
            _ => Err(format!(
                "Invalid frame layout '{s}'. Valid values: compact/44, leading/48"
            )),
        }
    }
}

/// Decoding flags shared by every command that reads a model.
#[derive(Args, Debug, Clone, Default)]
pub struct DecodeArgs {
    /// Number of opaque floats after the skeleton frames (probed when omitted)
    #[arg(long)]
    pub trailer: Option<usize>,

    /// Skeleton frame layout: compact (44 bytes) or leading (48 bytes)
    #[arg(long)]
    pub frame_layout: Option<FrameLayoutArg>,

    /// Read the legacy header (i32, signature, two i16)
    #[arg(long)]
    pub legacy_header: bool,

    /// Fail on the first recoverable problem
    #[arg(long)]
    pub strict: bool,

    /// Distance from a mesh name back to its transform record
    #[arg(long)]
    pub back_offset: Option<usize>,
}

impl DecodeArgs {
    /// Map the flags onto decode options.
    #[must_use]
    pub fn to_options(&self) -> DecodeOptions {
        let mut options = DecodeOptions::new().with_strict(self.strict);
        if let Some(trailer) = self.trailer {
            options = options.with_skeleton_trailer(trailer);
        }
        if let Some(FrameLayoutArg(layout)) = self.frame_layout {
            options = options.with_frame_layout(layout);
        }
        if self.legacy_header {
            options = options.with_header_layout(HeaderLayout::Legacy);
        }
        if let Some(offset) = self.back_offset {
            options = options.with_transform_back_offset(offset);
        }
        options
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a summary of a .dat model
    Inspect {
        /// Source .dat file
        path: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Write the model summary as JSON
    Json {
        /// Source .dat file
        path: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Write the assembled scene (per-part geometry) as JSON
    Scene {
        /// Source .dat file
        path: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Decode every .dat file under a directory
    Batch {
        /// Directory to search
        dir: PathBuf,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Locate the transform record of one mesh name
    Locate {
        /// Source .dat file
        path: PathBuf,

        /// Mesh name to search for
        name: String,

        #[command(flatten)]
        decode: DecodeArgs,
    },
}
