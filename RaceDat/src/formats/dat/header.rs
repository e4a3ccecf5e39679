//! Leading signature table.

use super::cursor::ByteCursor;
use super::options::HeaderLayout;
use super::types::{Header, HeaderSignature};
use crate::error::Result;

/// Smallest possible signature entry: empty tag terminator plus value.
const MIN_SIGNATURE_SIZE: usize = 5;

/// Read the header in the given layout.
pub fn read_header(cursor: &mut ByteCursor<'_>, layout: HeaderLayout) -> Result<Header> {
    let header = match layout {
        HeaderLayout::SignatureTable => read_signature_table(cursor)?,
        HeaderLayout::Legacy => read_legacy_header(cursor)?,
    };
    tracing::debug!(
        "Header: {} signature(s), ends at offset {}",
        header.signatures.len(),
        cursor.position()
    );
    Ok(header)
}

fn read_signature_table(cursor: &mut ByteCursor<'_>) -> Result<Header> {
    let count = cursor.read_u32()? as usize;
    let mut signatures = Vec::with_capacity(count.min(cursor.remaining() / MIN_SIGNATURE_SIZE));
    for _ in 0..count {
        let tag = cursor.read_cstring()?;
        let value = cursor.read_u32()?;
        signatures.push(HeaderSignature { tag, value });
    }
    Ok(Header {
        signatures,
        legacy_fields: None,
    })
}

fn read_legacy_header(cursor: &mut ByteCursor<'_>) -> Result<Header> {
    let lead = cursor.read_i32()?;
    let tag = cursor.read_cstring()?;
    let first = cursor.read_i16()?;
    let second = cursor.read_i16()?;
    Ok(Header {
        signatures: vec![HeaderSignature {
            tag,
            value: lead as u32,
        }],
        legacy_fields: Some([first, second]),
    })
}
