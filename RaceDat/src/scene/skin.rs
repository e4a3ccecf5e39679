//! Bit-packed skin weights.
//!
//! Index word: four 8-bit bone indices, slot 0 in the low byte.
//!
//! Weight word (slot precision differs):
//! ```text
//! bits  0..=9   slot 0   / 1023
//! bits 10..=19  slot 1   / 1023
//! bits 20..=24  slot 2   / 31
//! bits 26..=30  slot 3   / 31
//! ```
//! Bits 25 and 31 are unused.

use crate::formats::dat::SkinWords;
use serde::Serialize;

/// One bone influence on a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkinInfluence {
    pub bone: u8,
    pub weight: f32,
}

/// Bone indices of all four slots.
#[must_use]
pub fn unpack_bone_indices(word: u32) -> [u8; 4] {
    word.to_le_bytes()
}

/// Weights of all four slots, as stored. Never renormalized.
#[must_use]
pub fn unpack_weights(word: u32) -> [f32; 4] {
    [
        (word & 0x3FF) as f32 / 1023.0,
        ((word >> 10) & 0x3FF) as f32 / 1023.0,
        ((word >> 20) & 0x1F) as f32 / 31.0,
        ((word >> 26) & 0x1F) as f32 / 31.0,
    ]
}

/// Influences of a skinned vertex.
///
/// A slot repeating the previous slot's bone index marks the end of the used
/// slots for that run and is skipped.
#[must_use]
pub fn unpack_skin(words: SkinWords) -> Vec<SkinInfluence> {
    let bones = unpack_bone_indices(words.indices);
    let weights = unpack_weights(words.weights);

    let mut influences = Vec::with_capacity(4);
    for slot in 0..4 {
        if slot > 0 && bones[slot] == bones[slot - 1] {
            continue;
        }
        influences.push(SkinInfluence {
            bone: bones[slot],
            weight: weights[slot],
        });
    }
    influences
}
