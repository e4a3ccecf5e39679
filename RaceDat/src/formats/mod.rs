//! File format handlers

pub mod dat;

pub use dat::{DecodeOptions, ModelFile, parse_dat_bytes, read_dat};
