//! Index buffer decoding.

use super::cursor::ByteCursor;
use super::types::{IndexBuffer, IndexWidth};
use crate::error::{Error, Result};

/// Read the byte length, the width code and every index.
///
/// Indices are returned file-global; mapping them into a part's local range
/// happens during scene assembly.
pub fn read_index_buffer(cursor: &mut ByteCursor<'_>) -> Result<IndexBuffer> {
    let start = cursor.position();
    let byte_length = cursor.read_u32()?;
    let code = cursor.read_u32()?;
    let width = IndexWidth::from_code(code).ok_or(Error::UnsupportedIndexWidth { code })?;

    let count = byte_length as usize / width.bytes();
    let remainder = byte_length as usize % width.bytes();
    tracing::debug!("Index buffer at {start}: {count} x {} bytes", width.bytes());

    let mut indices = Vec::with_capacity(count.min(cursor.remaining() / width.bytes()));
    for _ in 0..count {
        let index = match width {
            IndexWidth::U8 => u32::from(cursor.read_u8()?),
            IndexWidth::U16 => u32::from(cursor.read_u16()?),
            IndexWidth::U32 => cursor.read_u32()?,
        };
        indices.push(index);
    }

    if remainder != 0 {
        tracing::warn!(
            "Index byte length {byte_length} is not a multiple of width {}; skipping {remainder} bytes",
            width.bytes()
        );
        cursor.skip(remainder)?;
    }

    Ok(IndexBuffer {
        width,
        byte_length,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(width: u32, values: &[u32]) -> Vec<u8> {
        let mut body = Vec::new();
        for &v in values {
            match width {
                1 => body.push(v as u8),
                2 => body.extend_from_slice(&(v as u16).to_be_bytes()),
                _ => body.extend_from_slice(&v.to_be_bytes()),
            }
        }
        let mut out = Vec::new();
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&width.to_be_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_every_width_code() {
        let values = [0u32, 1, 2, 2, 1, 3];
        for width in [1u32, 2, 4] {
            let data = encode(width, &values);
            let mut cursor = ByteCursor::new(&data);
            let ib = read_index_buffer(&mut cursor).unwrap();
            assert_eq!(ib.indices.len(), ib.byte_length as usize / width as usize);
            assert_eq!(ib.indices, values);
            assert_eq!(ib.width.bytes(), width as usize);
            assert_eq!(cursor.remaining(), 0);
        }
    }

    #[test]
    fn test_wide_values() {
        let data = encode(4, &[0x0001_0000, 0xFFFF_FFFF]);
        let mut cursor = ByteCursor::new(&data);
        let ib = read_index_buffer(&mut cursor).unwrap();
        assert_eq!(ib.indices, vec![0x0001_0000, 0xFFFF_FFFF]);
    }

    #[test]
    fn test_unsupported_width() {
        for code in [0u32, 3, 8] {
            let mut data = Vec::new();
            data.extend_from_slice(&12u32.to_be_bytes());
            data.extend_from_slice(&code.to_be_bytes());
            let mut cursor = ByteCursor::new(&data);
            assert!(matches!(
                read_index_buffer(&mut cursor),
                Err(Error::UnsupportedIndexWidth { code: c }) if c == code
            ));
        }
    }

    #[test]
    fn test_length_remainder_is_skipped() {
        let mut data = Vec::new();
        data.extend_from_slice(&5u32.to_be_bytes());
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x02, 0xEE]);
        data.extend_from_slice(&0xAABB_CCDDu32.to_be_bytes());
        let mut cursor = ByteCursor::new(&data);
        let ib = read_index_buffer(&mut cursor).unwrap();
        assert_eq!(ib.indices, vec![1, 2]);
        assert_eq!(cursor.read_u32().unwrap(), 0xAABB_CCDD);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_truncated_indices() {
        let mut data = encode(2, &[0, 1, 2]);
        data.truncate(data.len() - 1);
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            read_index_buffer(&mut cursor),
            Err(Error::OutOfData { .. })
        ));
    }
}
