//! Error types for `RaceDat`

use thiserror::Error;

/// The error type for `RaceDat` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Primitive Read Errors ====================
    /// The buffer ran out while reading a value or a declared range.
    #[error("out of data: needed {needed} bytes at offset {offset}, {available} available")]
    OutOfData {
        /// Absolute offset where the read started.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes left in the buffer at that offset.
        available: usize,
    },

    /// String bytes were not valid UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidEncoding {
        /// Absolute offset of the first string byte.
        offset: usize,
    },

    /// A null-terminated string ran into the end of the buffer.
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString {
        /// Absolute offset of the first string byte.
        offset: usize,
    },

    // ==================== Buffer Layout Errors ====================
    /// The declared vertex stride is smaller than the variant's base record.
    #[error("invalid vertex stride {stride} (minimum {minimum} for {variant})")]
    InvalidStride {
        /// Declared stride in bytes.
        stride: u32,
        /// Base record size of the active variant.
        minimum: u32,
        /// Name of the active variant.
        variant: &'static str,
    },

    /// The index buffer width code is not 1, 2 or 4.
    #[error("unsupported index width code: {code}")]
    UnsupportedIndexWidth {
        /// The width code read from the stream.
        code: u32,
    },

    /// A triangle of a part references a vertex outside the part's range.
    #[error("index {index} of part '{part}' outside vertex range [{first}, {last}]")]
    IndexOutOfPartRange {
        /// Part label.
        part: String,
        /// The offending file-global index.
        index: u32,
        /// First vertex of the part (inclusive).
        first: u32,
        /// Last vertex of the part (inclusive).
        last: u32,
    },

    // ==================== Recoverable Lookup Errors ====================
    /// The out-of-band transform block for a mesh could not be located.
    #[error("transform block not found for mesh '{mesh}'")]
    TransformNotFound {
        /// Name of the mesh being looked up.
        mesh: String,
    },

    /// A bone's parent index is out of range or refers forward.
    #[error("bone {bone} has invalid parent index {parent}")]
    InvalidBoneParent {
        /// Index of the bone.
        bone: usize,
        /// The parent index read from the file.
        parent: i32,
    },

    /// A mesh name occurs more than once in the transform scan region.
    #[error("mesh name '{mesh}' matched {matches} times in the transform region")]
    AmbiguousTransformName {
        /// Name of the mesh being looked up.
        mesh: String,
        /// Number of matches found.
        matches: usize,
    },

    // ==================== Parsing Errors ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for `RaceDat` operations.
pub type Result<T> = std::result::Result<T, Error>;
