//! Vertex normal reconstruction.
//!
//! Two encodings exist across format generations. Which one is used is a
//! property of the vertex layout, never decided per vertex.

use std::f64::consts::TAU;

use serde::Serialize;

/// Full-scale value of a raw angle word.
pub const ANGLE_FULL_SCALE: f64 = 4_294_967_295.0;

/// Full-scale value of a quaternion component word.
pub const QUAT_FULL_SCALE: f64 = 65_535.0;

/// Normal encoding used by a vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NormalEncoding {
    /// Two u32 words mapped to (pitch, yaw) angles.
    AnglePair,
    /// Four u16 words mapped to a (w, x, y, z) quaternion.
    Quaternion,
}

/// A normal exactly as stored in the vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncodedNormal {
    /// Raw angle words in wire order (pitch first).
    AnglePair { pitch: u32, yaw: u32 },
    /// Raw quaternion words in wire order (w, x, y, z).
    Quaternion([u16; 4]),
}

impl EncodedNormal {
    /// Reconstruct the unit direction.
    #[must_use]
    pub fn direction(&self) -> [f32; 3] {
        match *self {
            Self::AnglePair { pitch, yaw } => AnglePair::from_raw(pitch, yaw).direction(),
            Self::Quaternion(raw) => QuantizedQuaternion::from_raw(raw).to_euler().direction(),
        }
    }
}

/// Map a raw angle word onto `[-2π, 2π]`.
#[must_use]
pub fn raw_to_angle(raw: u32) -> f64 {
    ((f64::from(raw) / ANGLE_FULL_SCALE) * 2.0 - 1.0) * TAU
}

/// Unit direction from a pitch/yaw pair in radians.
#[must_use]
pub fn direction_from_angles(pitch: f64, yaw: f64) -> [f32; 3] {
    [
        (yaw.cos() * pitch.cos()) as f32,
        (yaw.sin() * pitch.cos()) as f32,
        pitch.sin() as f32,
    ]
}

/// Decoded angle pair, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnglePair {
    pub pitch: f64,
    pub yaw: f64,
}

impl AnglePair {
    #[must_use]
    pub fn from_raw(pitch: u32, yaw: u32) -> Self {
        Self {
            pitch: raw_to_angle(pitch),
            yaw: raw_to_angle(yaw),
        }
    }

    #[must_use]
    pub fn direction(&self) -> [f32; 3] {
        direction_from_angles(self.pitch, self.yaw)
    }
}

/// Quaternion with components mapped onto `[-1, 1]`. Not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantizedQuaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl QuantizedQuaternion {
    /// Map raw words in (w, x, y, z) order.
    #[must_use]
    pub fn from_raw(raw: [u16; 4]) -> Self {
        let unit = |v: u16| (f64::from(v) / QUAT_FULL_SCALE) * 2.0 - 1.0;
        Self {
            w: unit(raw[0]),
            x: unit(raw[1]),
            y: unit(raw[2]),
            z: unit(raw[3]),
        }
    }

    /// Convert to roll/pitch/yaw.
    ///
    /// The pitch `asin` argument is clamped to `[-1, 1]`, so components that
    /// do not form a unit quaternion still give finite angles.
    #[must_use]
    pub fn to_euler(self) -> EulerAngles {
        let Self { w, x, y, z } = self;

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let sin_pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        EulerAngles { roll, pitch, yaw }
    }
}

/// Euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    /// Unit direction from pitch and yaw. Roll does not affect a direction.
    #[must_use]
    pub fn direction(&self) -> [f32; 3] {
        direction_from_angles(self.pitch, self.yaw)
    }
}
