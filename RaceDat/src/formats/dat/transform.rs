//! Out-of-band mesh transforms.
//!
//! After the hierarchy the file carries one transform record per mesh, but
//! nothing links a record to its mesh by offset. The only known anchor is
//! the mesh name, which appears shortly after the record. The locator
//! scans the trailing bytes for the name and reads the record a fixed
//! distance before it.
//!
//! This is a reverse-engineered heuristic. The distance has been confirmed
//! on the files available so far, and a name that also occurs elsewhere in
//! the trailing region will resolve to whichever occurrence comes first.

use super::cursor::ByteCursor;
use super::hierarchy::read_bounding_volume;
use super::types::{BoundingVolume, CoordinateFrame};
use crate::error::{Error, Result};

/// Distance from the start of a name match back to its transform record.
pub const TRANSFORM_BACK_OFFSET: usize = 97;

/// Size of the row-major 4×4 matrix.
pub const MATRIX_SIZE: usize = 64;

/// Matrix plus bounding volume.
pub const TRANSFORM_RECORD_SIZE: usize = MATRIX_SIZE + BoundingVolume::SIZE;

/// Searches the trailing region of a file for per-mesh transforms.
///
/// Holds no mutable state, so repeated lookups of the same name return the
/// same frame.
#[derive(Debug, Clone, Copy)]
pub struct TransformLocator<'a> {
    data: &'a [u8],
    scan_start: usize,
    back_offset: usize,
}

impl<'a> TransformLocator<'a> {
    /// Locator over `data[scan_start..]`, using the default back-offset.
    #[must_use]
    pub fn new(data: &'a [u8], scan_start: usize) -> Self {
        Self {
            data,
            scan_start: scan_start.min(data.len()),
            back_offset: TRANSFORM_BACK_OFFSET,
        }
    }

    #[must_use]
    pub fn with_back_offset(mut self, back_offset: usize) -> Self {
        self.back_offset = back_offset;
        self
    }

    #[must_use]
    pub fn scan_start(&self) -> usize {
        self.scan_start
    }

    /// The bytes searched for names.
    #[must_use]
    pub fn scan_region(&self) -> &'a [u8] {
        &self.data[self.scan_start..]
    }

    /// Offsets (relative to the scan start) of every occurrence of `name`.
    #[must_use]
    pub fn find_matches(&self, name: &str) -> Vec<usize> {
        let needle = name.as_bytes();
        if needle.is_empty() {
            return Vec::new();
        }
        self.scan_region()
            .windows(needle.len())
            .enumerate()
            .filter(|(_, window)| *window == needle)
            .map(|(offset, _)| offset)
            .collect()
    }

    /// Decode the transform record belonging to `name`.
    ///
    /// The first occurrence wins; `match_count` on the result tells the
    /// caller whether there were others.
    pub fn locate(&self, name: &str) -> Result<CoordinateFrame> {
        let not_found = || Error::TransformNotFound {
            mesh: name.to_string(),
        };

        let matches = self.find_matches(name);
        let first = *matches.first().ok_or_else(not_found)?;
        let offset = (self.scan_start + first)
            .checked_sub(self.back_offset)
            .ok_or_else(not_found)?;

        let mut cursor = ByteCursor::new(self.data);
        cursor.seek(offset)?;
        let matrix = cursor.read_f32_array::<16>().map_err(|_| not_found())?;
        let bounds = read_bounding_volume(&mut cursor).map_err(|_| not_found())?;

        tracing::debug!(
            "Transform for '{name}' at {offset} ({} match(es))",
            matches.len()
        );

        Ok(CoordinateFrame {
            matrix,
            bounds,
            offset,
            match_count: matches.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(translation: [f32; 3]) -> Vec<u8> {
        let mut matrix = [0.0f32; 16];
        matrix[0] = 1.0;
        matrix[5] = 1.0;
        matrix[10] = 1.0;
        matrix[15] = 1.0;
        matrix[3] = translation[0];
        matrix[7] = translation[1];
        matrix[11] = translation[2];
        let mut out = Vec::new();
        for v in matrix {
            out.extend_from_slice(&v.to_be_bytes());
        }
        for v in [-1.0f32, -1.0, -1.0, 0.0, 1.0, 1.0, 1.0, 0.0] {
            out.extend_from_slice(&v.to_be_bytes());
        }
        out
    }

    /// Prefix bytes, then a record, one gap byte and the name.
    fn region(prefix: usize, entries: &[(&str, [f32; 3])]) -> Vec<u8> {
        let mut out = vec![0xAA; prefix];
        for (name, t) in entries {
            out.extend_from_slice(&record(*t));
            out.push(0);
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
        out
    }

    #[test]
    fn test_record_size_matches_back_offset() {
        assert_eq!(TRANSFORM_RECORD_SIZE + 1, TRANSFORM_BACK_OFFSET);
    }

    #[test]
    fn test_locate_each_mesh() {
        let data = region(10, &[("body", [1.0, 2.0, 3.0]), ("wheel_fl", [4.0, 5.0, 6.0])]);
        let locator = TransformLocator::new(&data, 10);

        let body = locator.locate("body").unwrap();
        assert_eq!(body.offset, 10);
        assert_eq!(body.match_count, 1);
        assert_eq!(body.to_mat4().w_axis.truncate().to_array(), [1.0, 2.0, 3.0]);
        assert_eq!(body.bounds.min, [-1.0, -1.0, -1.0]);

        let wheel = locator.locate("wheel_fl").unwrap();
        assert_eq!(wheel.matrix[7], 5.0);
        assert_eq!(wheel.bounds.max, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_locate_is_idempotent() {
        let data = region(0, &[("body", [1.0, 2.0, 3.0])]);
        let locator = TransformLocator::new(&data, 0);
        let first = locator.locate("body").unwrap();
        let second = locator.locate("body").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_name() {
        let data = region(0, &[("body", [0.0; 3])]);
        let locator = TransformLocator::new(&data, 0);
        assert!(matches!(
            locator.locate("spoiler"),
            Err(Error::TransformNotFound { mesh }) if mesh == "spoiler"
        ));
    }

    #[test]
    fn test_name_before_scan_start_is_ignored() {
        let mut data = b"body".to_vec();
        data.extend_from_slice(&region(0, &[("wheel", [0.0; 3])]));
        let locator = TransformLocator::new(&data, 4);
        assert!(locator.find_matches("body").is_empty());
    }

    #[test]
    fn test_back_offset_underflow() {
        let data = b"xxbodyxx".to_vec();
        let locator = TransformLocator::new(&data, 0);
        assert!(matches!(
            locator.locate("body"),
            Err(Error::TransformNotFound { .. })
        ));
    }

    #[test]
    fn test_truncated_record() {
        // Name far enough in for the back-offset, but the record runs into the name
        let mut data = vec![0u8; 100];
        data.extend_from_slice(b"body");
        let locator = TransformLocator::new(&data, 0).with_back_offset(20);
        assert!(matches!(
            locator.locate("body"),
            Err(Error::TransformNotFound { .. })
        ));
    }

    #[test]
    fn test_ambiguous_name_uses_first_match() {
        // "wheel" also occurs inside "wheel_rear"
        let data = region(0, &[("wheel", [1.0, 0.0, 0.0]), ("wheel_rear", [2.0, 0.0, 0.0])]);
        let locator = TransformLocator::new(&data, 0);
        assert_eq!(locator.find_matches("wheel").len(), 2);
        let frame = locator.locate("wheel").unwrap();
        assert_eq!(frame.match_count, 2);
        assert_eq!(frame.matrix[3], 1.0);
    }

    #[test]
    fn test_custom_back_offset() {
        let mut data = record([9.0, 0.0, 0.0]);
        data.extend_from_slice(b"body");
        let locator = TransformLocator::new(&data, 0).with_back_offset(TRANSFORM_RECORD_SIZE);
        assert_eq!(locator.locate("body").unwrap().matrix[3], 9.0);
    }
}
