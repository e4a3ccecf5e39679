//! Bone table of skinned models.
//!
//! Layout:
//! ```text
//! [4 bytes]        bone_count
//! bone_count × 32  names (NUL padded)
//! bone_count × 4   parent indices (i32, -1 = root)
//! [12 bytes]       three opaque words
//! bone_count ×     orientation frames (44 or 48 bytes, see FrameLayout)
//! 5 or 8 × 4       opaque trailing floats
//! ```

use super::cursor::ByteCursor;
use super::options::{DecodeOptions, FrameLayout};
use super::types::{Bone, Diagnostic, OrientationFrame, Skeleton};
use super::vertex::{SKINNED_RECORD_SIZE, is_plausible_preamble};
use crate::error::Result;

/// Width of a bone name field.
pub const BONE_NAME_SIZE: usize = 32;

/// Trailer lengths seen in the wild, in probe order.
pub const TRAILER_CANDIDATES: [usize; 2] = [5, 8];

/// Read the skeleton. Invalid parent links are returned as diagnostics,
/// not errors; the caller decides whether to log or escalate them.
pub fn read_skeleton(
    cursor: &mut ByteCursor<'_>,
    options: &DecodeOptions,
) -> Result<(Skeleton, Vec<Diagnostic>)> {
    let start = cursor.position();
    let count = cursor.read_u32()? as usize;
    tracing::debug!("Skeleton at {start}: {count} bone(s)");

    let mut names = Vec::with_capacity(count.min(cursor.remaining() / BONE_NAME_SIZE));
    for _ in 0..count {
        names.push(cursor.read_fixed_string(BONE_NAME_SIZE)?);
    }

    let mut parent_indices = Vec::with_capacity(names.len());
    for _ in 0..count {
        parent_indices.push(cursor.read_i32()?);
    }

    let unknown = [cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?];

    let mut frames = Vec::with_capacity(names.len());
    for _ in 0..count {
        frames.push(read_frame(cursor, options.frame_layout)?);
    }

    let trailer_len = match options.skeleton_trailer {
        Some(n) => n,
        None => probe_trailer(cursor),
    };
    let mut trailer = Vec::with_capacity(trailer_len);
    for _ in 0..trailer_len {
        trailer.push(cursor.read_f32()?);
    }

    let mut diagnostics = Vec::new();
    let bones = names
        .into_iter()
        .zip(parent_indices)
        .zip(frames)
        .enumerate()
        .map(|(index, ((name, parent_index), frame))| {
            let parent = resolve_parent(index, parent_index);
            if parent.is_none() && parent_index != -1 {
                diagnostics.push(Diagnostic::InvalidBoneParent {
                    bone: index,
                    parent: parent_index,
                });
            }
            Bone {
                name,
                parent_index,
                parent,
                frame,
            }
        })
        .collect();

    Ok((
        Skeleton {
            bones,
            unknown,
            trailer,
        },
        diagnostics,
    ))
}

/// A parent must be defined before its child.
fn resolve_parent(index: usize, parent_index: i32) -> Option<usize> {
    usize::try_from(parent_index).ok().filter(|&p| p < index)
}

fn read_frame(cursor: &mut ByteCursor<'_>, layout: FrameLayout) -> Result<OrientationFrame> {
    match layout {
        FrameLayout::Compact => {
            let position = cursor.read_f32_array::<3>()?;
            let extra = cursor.read_f32_array::<7>()?;
            let flags = cursor.read_u32()?;
            Ok(OrientationFrame {
                position,
                extra,
                flags,
                lead: None,
            })
        }
        FrameLayout::Leading => {
            let lead = cursor.read_u32()?;
            let extra = cursor.read_f32_array::<7>()?;
            let flags = cursor.read_u32()?;
            let position = cursor.read_f32_array::<3>()?;
            Ok(OrientationFrame {
                position,
                extra,
                flags,
                lead: Some(lead),
            })
        }
    }
}

/// Pick the trailer length after which a skinned vertex buffer preamble follows.
fn probe_trailer(cursor: &ByteCursor<'_>) -> usize {
    let here = cursor.position();
    for candidate in TRAILER_CANDIDATES {
        if is_plausible_preamble(cursor, here + candidate * 4, SKINNED_RECORD_SIZE) {
            tracing::debug!("Skeleton trailer: {candidate} floats");
            return candidate;
        }
    }
    let fallback = TRAILER_CANDIDATES[0];
    tracing::warn!("No vertex buffer found after skeleton at {here}; assuming {fallback} trailing floats");
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct Bones<'a> {
        names: &'a [&'a str],
        parents: &'a [i32],
    }

    fn skeleton_bytes(bones: &Bones<'_>, layout: FrameLayout, trailer: usize) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(bones.names.len() as u32).to_be_bytes());
        for name in bones.names {
            let mut field = [0u8; BONE_NAME_SIZE];
            field[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&field);
        }
        for p in bones.parents {
            out.extend_from_slice(&p.to_be_bytes());
        }
        for w in [7u32, 8, 9] {
            out.extend_from_slice(&w.to_be_bytes());
        }
        for i in 0..bones.names.len() {
            let pos = [i as f32, 1.0, 2.0];
            let floats = [0.0f32, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
            match layout {
                FrameLayout::Compact => {
                    pos.iter().for_each(|v| out.extend_from_slice(&v.to_be_bytes()));
                    floats.iter().for_each(|v| out.extend_from_slice(&v.to_be_bytes()));
                    out.extend_from_slice(&0x10u32.to_be_bytes());
                }
                FrameLayout::Leading => {
                    out.extend_from_slice(&0xCAFEu32.to_be_bytes());
                    floats.iter().for_each(|v| out.extend_from_slice(&v.to_be_bytes()));
                    out.extend_from_slice(&0x10u32.to_be_bytes());
                    pos.iter().for_each(|v| out.extend_from_slice(&v.to_be_bytes()));
                }
            }
        }
        for i in 0..trailer {
            out.extend_from_slice(&(i as f32 * 0.5).to_be_bytes());
        }
        out
    }

    /// One skinned vertex buffer preamble and record.
    fn vertex_preamble(out: &mut Vec<u8>) {
        out.extend_from_slice(&32u32.to_be_bytes());
        out.extend_from_slice(&32u32.to_be_bytes());
        out.extend_from_slice(&[0u8; 32]);
    }

    const CHAIN: Bones<'static> = Bones {
        names: &["root", "spine", "head"],
        parents: &[-1, 0, 1],
    };

    #[test]
    fn test_forced_trailer() {
        let data = skeleton_bytes(&CHAIN, FrameLayout::Compact, 5);
        let mut cursor = ByteCursor::new(&data);
        let options = DecodeOptions::new().with_skeleton_trailer(5);
        let (skeleton, diagnostics) = read_skeleton(&mut cursor, &options).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(skeleton.bones.len(), 3);
        assert_eq!(skeleton.bones[2].name, "head");
        assert_eq!(skeleton.bones[0].parent, None);
        assert_eq!(skeleton.bones[2].parent, Some(1));
        assert_eq!(skeleton.bones[1].frame.position, [1.0, 1.0, 2.0]);
        assert_eq!(skeleton.bones[1].frame.flags, 0x10);
        assert_eq!(skeleton.unknown, [7, 8, 9]);
        assert_eq!(skeleton.trailer, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(skeleton.find_bone("spine"), Some(1));
    }

    #[test]
    fn test_leading_frame_layout() {
        let data = skeleton_bytes(&CHAIN, FrameLayout::Leading, 5);
        let mut cursor = ByteCursor::new(&data);
        let options = DecodeOptions::legacy();
        let (skeleton, _) = read_skeleton(&mut cursor, &options).unwrap();
        assert_eq!(cursor.remaining(), 0);
        let frame = &skeleton.bones[2].frame;
        assert_eq!(frame.position, [2.0, 1.0, 2.0]);
        assert_eq!(frame.lead, Some(0xCAFE));
        assert_eq!(frame.extra[3..], [1.0f32; 4]);
    }

    #[test]
    fn test_trailer_probe() {
        for trailer in TRAILER_CANDIDATES {
            let mut data = skeleton_bytes(&CHAIN, FrameLayout::Compact, trailer);
            let end = data.len();
            vertex_preamble(&mut data);
            let mut cursor = ByteCursor::new(&data);
            let (skeleton, _) = read_skeleton(&mut cursor, &DecodeOptions::new()).unwrap();
            assert_eq!(skeleton.trailer.len(), trailer);
            assert_eq!(cursor.position(), end);
        }
    }

    #[test]
    fn test_invalid_parents_become_roots() {
        let bones = Bones {
            names: &["a", "b", "c", "d"],
            parents: &[-1, 3, 1, -5],
        };
        let data = skeleton_bytes(&bones, FrameLayout::Compact, 5);
        let mut cursor = ByteCursor::new(&data);
        let options = DecodeOptions::new().with_skeleton_trailer(5);
        let (skeleton, diagnostics) = read_skeleton(&mut cursor, &options).unwrap();
        assert_eq!(skeleton.bones[1].parent, None);
        assert_eq!(skeleton.bones[1].parent_index, 3);
        assert_eq!(skeleton.bones[2].parent, Some(1));
        assert_eq!(skeleton.bones[3].parent, None);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::InvalidBoneParent { bone: 1, parent: 3 },
                Diagnostic::InvalidBoneParent { bone: 3, parent: -5 },
            ]
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_parent_is_not_logged_here() {
        let bones = Bones {
            names: &["a", "b"],
            parents: &[-1, 7],
        };
        let data = skeleton_bytes(&bones, FrameLayout::Compact, 5);
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let diagnostics = tracing::subscriber::with_default(subscriber, || {
            let mut cursor = ByteCursor::new(&data);
            let options = DecodeOptions::new().with_skeleton_trailer(5);
            read_skeleton(&mut cursor, &options).unwrap().1
        });

        assert_eq!(diagnostics.len(), 1);
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_self_parent_is_invalid() {
        let bones = Bones {
            names: &["only"],
            parents: &[0],
        };
        let data = skeleton_bytes(&bones, FrameLayout::Compact, 5);
        let mut cursor = ByteCursor::new(&data);
        let options = DecodeOptions::new().with_skeleton_trailer(5);
        let (_, diagnostics) = read_skeleton(&mut cursor, &options).unwrap();
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_truncated_frames() {
        let mut data = skeleton_bytes(&CHAIN, FrameLayout::Compact, 0);
        data.truncate(data.len() - 10);
        let mut cursor = ByteCursor::new(&data);
        let options = DecodeOptions::new().with_skeleton_trailer(5);
        assert!(matches!(
            read_skeleton(&mut cursor, &options),
            Err(Error::OutOfData { .. })
        ));
    }
}
