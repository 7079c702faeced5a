// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS wire protocol helpers
//!
//! Every word is preceded by its length, encoded on 1 to 5 bytes. The number
//! of leading 1-bits of the first byte tells how many bytes follow it.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{CodecError, Result};

/// Largest length a five byte prefix can carry (35 bits)
pub const MAX_WORD_LENGTH: u64 = 0x7_FFFF_FFFF;

/// Encodes a word length into its variable length prefix
///
/// # Errors
///
/// Returns [`CodecError::TooLarge`] above [`MAX_WORD_LENGTH`].
// RouterOS protocol length encoding - intentional truncation is part of the wire format
#[allow(clippy::cast_possible_truncation)]
pub fn encode_length(len: u64) -> std::result::Result<Vec<u8>, CodecError> {
    let encoded = if len < 0x80 {
        vec![len as u8]
    } else if len < 0x4000 {
        vec![((len >> 8) as u8) | 0x80, (len & 0xFF) as u8]
    } else if len < 0x0020_0000 {
        vec![
            ((len >> 16) as u8) | 0xC0,
            ((len >> 8) & 0xFF) as u8,
            (len & 0xFF) as u8,
        ]
    } else if len < 0x1000_0000 {
        vec![
            ((len >> 24) as u8) | 0xE0,
            ((len >> 16) & 0xFF) as u8,
            ((len >> 8) & 0xFF) as u8,
            (len & 0xFF) as u8,
        ]
    } else if len <= MAX_WORD_LENGTH {
        vec![
            ((len >> 32) as u8) | 0xF0,
            ((len >> 24) & 0xFF) as u8,
            ((len >> 16) & 0xFF) as u8,
            ((len >> 8) & 0xFF) as u8,
            (len & 0xFF) as u8,
        ]
    } else {
        return Err(CodecError::TooLarge(len));
    };
    Ok(encoded)
}

/// Total prefix size announced by its first byte
fn prefix_size(first: u8) -> std::result::Result<usize, CodecError> {
    match first.leading_ones() {
        n @ 0..=4 => Ok(n as usize + 1),
        _ => Err(CodecError::ControlByte(first)),
    }
}

/// Rebuilds the length from a complete prefix
fn assemble(prefix: &[u8]) -> u64 {
    // strip the tier marker bits from the first byte
    let mask = match prefix.len() {
        1 => 0x7F,
        2 => 0x3F,
        3 => 0x1F,
        4 => 0x0F,
        _ => 0x07,
    };
    prefix[1..]
        .iter()
        .fold(u64::from(prefix[0] & mask), |acc, b| (acc << 8) | u64::from(*b))
}

/// Decodes a length prefix from the start of `bytes`
///
/// # Errors
///
/// Fails on a control byte or when `bytes` is shorter than the prefix.
pub fn decode_length(bytes: &[u8]) -> std::result::Result<u64, CodecError> {
    let first = *bytes.first().ok_or(CodecError::Truncated {
        expected: 1,
        actual: 0,
    })?;
    let size = prefix_size(first)?;
    if bytes.len() < size {
        return Err(CodecError::Truncated {
            expected: size,
            actual: bytes.len(),
        });
    }
    Ok(assemble(&bytes[..size]))
}

/// Reads one length prefix from the stream
///
/// # Errors
///
/// Fails on I/O errors or on a control byte.
pub async fn read_length<R>(reader: &mut R) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 5];
    prefix[0] = reader.read_u8().await?;
    let size = prefix_size(prefix[0])?;
    if size > 1 {
        reader.read_exact(&mut prefix[1..size]).await?;
    }
    Ok(assemble(&prefix[..size]))
}
