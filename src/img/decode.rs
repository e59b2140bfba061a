//! Image authentication and decode.
//!
//! An obfuscated image ends in a 32-byte trailer: the per-file key block
//! followed by the authentication tag committed by the producer. Decoding
//! authenticates first and writes nothing until the tag checks out.

use log::{debug, info};
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom, Write};

use super::constants::{CIPHER_BLOCK_SIZE, DIGEST_SIZE, KEY_SIZE, TRAILER_SIZE};
use super::keystream::{digest_stream, generate};
use super::stream::process_blocks;
use crate::exceptions::{FwImgError, Result};
use crate::utils::xor_in_place;

/// Outcome of a successful authenticate-and-decode run
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// Per-file key block, hex encoded
    pub key: String,
    /// Authentication tag, hex encoded
    pub tag: String,
    /// Number of content bytes written to the destination
    pub content_size: u64,
}

/// Authenticate `src` and stream its decoded content to `dst`.
///
/// The whole file minus the trailing tag (content plus key block) is
/// digested first; the tag derived from that digest must equal the stored
/// tag byte-for-byte, otherwise `AuthenticationError` is returned and no
/// output is written. On success the content is decoded in 16-byte blocks
/// against an output-feedback keystream seeded from the all-zero state.
pub fn decode_stream<R, W>(src: &mut R, dst: &mut W) -> Result<DecodeReport>
where
    R: Read + Seek,
    W: Write,
{
    let file_size = src.seek(SeekFrom::End(0))?;
    let content_size = file_size.checked_sub(TRAILER_SIZE).ok_or_else(|| {
        FwImgError::FormatError(format!(
            "image of {file_size} bytes is too small for a {TRAILER_SIZE}-byte trailer"
        ))
    })?;
    if content_size % CIPHER_BLOCK_SIZE as u64 != 0 {
        return Err(FwImgError::FormatError(format!(
            "content size {content_size} is not a multiple of {CIPHER_BLOCK_SIZE}"
        )));
    }

    // Trailer: key block then stored tag
    src.seek(SeekFrom::Start(content_size))?;
    let mut key_block = [0u8; KEY_SIZE];
    src.read_exact(&mut key_block)?;
    let mut stored_tag = [0u8; DIGEST_SIZE];
    src.read_exact(&mut stored_tag)?;

    // Digest everything except the stored tag, content and key block alike
    src.seek(SeekFrom::Start(0))?;
    let digest = digest_stream(src, file_size - DIGEST_SIZE as u64)?;
    let tag = generate(&key_block, &digest);

    info!("🔑 Key block   : {}", hex::encode(key_block));
    info!("📄 Stored tag  : {}", hex::encode(stored_tag));
    info!("🧮 Computed tag: {}", hex::encode(tag));

    if tag != stored_tag {
        return Err(FwImgError::AuthenticationError(
            "stored and computed tags differ".to_string(),
        ));
    }
    debug!("✅ Tags match, decoding {content_size} content bytes");

    src.seek(SeekFrom::Start(0))?;
    let mut state = [0u8; KEY_SIZE];
    process_blocks(src, CIPHER_BLOCK_SIZE, content_size, |block| {
        state = generate(&key_block, &state);
        xor_in_place(block, &state);
        dst.write_all(block)?;
        Ok(())
    })?;

    Ok(DecodeReport {
        key: hex::encode(key_block),
        tag: hex::encode(tag),
        content_size,
    })
}

#[cfg(test)]
mod tests {
    use super::decode_stream;
    use crate::exceptions::FwImgError;
    use std::io::Cursor;

    // Obfuscation of b"ABCDEFGHIJKLMNOP" under the all-zero key block,
    // independently computed
    const CIPHER: [u8; 16] = [
        0x52, 0xd1, 0x33, 0xc2, 0x07, 0xc4, 0xea, 0x81, 0x35, 0xe6, 0x16, 0xe0, 0x04, 0x4c, 0x30,
        0x9f,
    ];
    const TAG: [u8; 16] = [
        0xe3, 0xe0, 0xe1, 0x1a, 0x21, 0xef, 0x5f, 0xed, 0x06, 0x26, 0x16, 0x4f, 0x2b, 0xfe, 0xbc,
        0xd4,
    ];

    fn one_block_image() -> Vec<u8> {
        let mut image = Vec::new();
        image.extend_from_slice(&CIPHER);
        image.extend_from_slice(&[0u8; 16]);
        image.extend_from_slice(&TAG);
        image
    }

    #[test]
    fn test_decode_known_image() {
        let mut src = Cursor::new(one_block_image());
        let mut dst = Vec::new();
        let report = decode_stream(&mut src, &mut dst).unwrap();
        assert_eq!(dst, b"ABCDEFGHIJKLMNOP");
        assert_eq!(report.content_size, 16);
        assert_eq!(report.key, "0".repeat(32));
    }

    #[test]
    fn test_decode_empty_content_image() {
        // 32-byte image: zero key block plus the tag over just the key block
        let tag: [u8; 16] = [
            0x34, 0x5a, 0x8d, 0x70, 0xb2, 0x49, 0xef, 0xc0, 0x1d, 0x6c, 0xc7, 0x97, 0x75, 0xd8,
            0xe0, 0xee,
        ];
        let mut image = vec![0u8; 16];
        image.extend_from_slice(&tag);

        let mut src = Cursor::new(image);
        let mut dst = Vec::new();
        let report = decode_stream(&mut src, &mut dst).unwrap();
        assert!(dst.is_empty());
        assert_eq!(report.content_size, 0);
    }

    #[test]
    fn test_corrupted_tag_is_rejected_before_output() {
        let mut image = one_block_image();
        let last = image.len() - 1;
        image[last] ^= 0x01;

        let mut src = Cursor::new(image);
        let mut dst = Vec::new();
        let result = decode_stream(&mut src, &mut dst);
        assert!(matches!(result, Err(FwImgError::AuthenticationError(_))));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_corrupted_key_block_is_rejected() {
        let mut image = one_block_image();
        // Flip one bit inside the key block
        image[16] ^= 0x80;

        let mut src = Cursor::new(image);
        let mut dst = Vec::new();
        let result = decode_stream(&mut src, &mut dst);
        assert!(matches!(result, Err(FwImgError::AuthenticationError(_))));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_corrupted_content_is_rejected() {
        let mut image = one_block_image();
        image[0] ^= 0x01;

        let mut src = Cursor::new(image);
        let mut dst = Vec::new();
        let result = decode_stream(&mut src, &mut dst);
        assert!(matches!(result, Err(FwImgError::AuthenticationError(_))));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_too_small_image_is_format_error() {
        let mut src = Cursor::new(vec![0u8; 31]);
        let mut dst = Vec::new();
        let result = decode_stream(&mut src, &mut dst);
        assert!(matches!(result, Err(FwImgError::FormatError(_))));
    }

    #[test]
    fn test_misaligned_content_is_format_error() {
        // 40 bytes: trailer fits but content would be 8 bytes
        let mut src = Cursor::new(vec![0u8; 40]);
        let mut dst = Vec::new();
        let result = decode_stream(&mut src, &mut dst);
        assert!(matches!(result, Err(FwImgError::FormatError(_))));
    }
}
