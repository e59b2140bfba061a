//! Additive rolling-sum checksum for 1024-aligned system images.
//!
//! The accumulator starts at `0xFFFFFFFF`, every little-endian 32-bit word
//! of the content is added with wraparound, and the result is the bitwise
//! complement. This is not a CRC and must not be replaced by one: producers
//! and consumers of these images agree on the plain modular sum.

use log::{debug, info};
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom, Write};

use super::constants::{CHECKSUM_ALIGNMENT, CHECKSUM_BLOCK_SIZE, CHECKSUM_SIZE};
use super::stream::process_blocks;
use crate::exceptions::{FwImgError, Result};

/// Stored and recomputed checksum of an image
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChecksumReport {
    /// Checksum read from the 4-byte trailer
    pub stored: u32,
    /// Checksum recomputed over the content
    pub computed: u32,
}

impl ChecksumReport {
    /// Whether the stored trailer matches the recomputed value
    pub fn is_valid(&self) -> bool {
        self.stored == self.computed
    }
}

/// Compute the additive checksum over the next `content_size` bytes of
/// `reader`, streamed in 256-byte blocks.
///
/// `content_size` must be a multiple of 4; only whole 32-bit words are
/// summed.
pub fn compute<R: Read>(reader: &mut R, content_size: u64) -> Result<u32> {
    if content_size % 4 != 0 {
        return Err(FwImgError::FormatError(format!(
            "content size {content_size} is not a multiple of 4"
        )));
    }

    let mut acc: u32 = 0xFFFF_FFFF;
    process_blocks(reader, CHECKSUM_BLOCK_SIZE, content_size, |block| {
        for word in block.chunks_exact(4) {
            let bytes = [word[0], word[1], word[2], word[3]];
            acc = acc.wrapping_add(u32::from_le_bytes(bytes));
        }
        Ok(())
    })?;

    Ok(!acc)
}

/// Recompute the checksum of `src` and compare it against the stored
/// 4-byte trailer.
///
/// The file must be nonzero, a multiple of 4, and exactly a multiple of
/// 1024 once the trailer is removed. A mismatch is reported, not an error;
/// callers decide how loudly to fail.
pub fn verify_stream<R>(src: &mut R) -> Result<ChecksumReport>
where
    R: Read + Seek,
{
    let file_size = src.seek(SeekFrom::End(0))?;
    if file_size == 0
        || file_size % CHECKSUM_SIZE != 0
        || (file_size - CHECKSUM_SIZE) % CHECKSUM_ALIGNMENT != 0
    {
        return Err(FwImgError::FormatError(format!(
            "file size {file_size} does not leave a {CHECKSUM_SIZE}-byte checksum after \
             {CHECKSUM_ALIGNMENT}-byte-aligned content"
        )));
    }

    src.seek(SeekFrom::Start(file_size - CHECKSUM_SIZE))?;
    let mut trailer = [0u8; CHECKSUM_SIZE as usize];
    src.read_exact(&mut trailer)?;
    let stored = u32::from_le_bytes(trailer);

    src.seek(SeekFrom::Start(0))?;
    let computed = compute(src, file_size - CHECKSUM_SIZE)?;

    info!("📄 Stored checksum  : {stored:08X}");
    info!("🧮 Computed checksum: {computed:08X}");

    Ok(ChecksumReport { stored, computed })
}

/// Recompute the checksum of `src` and write it to the trailer position in
/// place.
///
/// A size that is an exact multiple of 1024 means no trailer exists yet and
/// the checksum is appended; any other size means the last 4 bytes are an
/// existing trailer to overwrite. Returns the checksum written. A failure
/// after computation leaves the trailer in an indeterminate state.
pub fn update_stream<S>(src: &mut S) -> Result<u32>
where
    S: Read + Write + Seek,
{
    let file_size = src.seek(SeekFrom::End(0))?;
    if file_size % CHECKSUM_SIZE != 0 {
        return Err(FwImgError::FormatError(format!(
            "file size {file_size} is not a multiple of {CHECKSUM_SIZE}"
        )));
    }

    let has_trailer = file_size % CHECKSUM_ALIGNMENT != 0;
    let content_size = if has_trailer {
        file_size
            .checked_sub(CHECKSUM_SIZE)
            .filter(|content| content % CHECKSUM_ALIGNMENT == 0)
            .ok_or_else(|| {
                FwImgError::FormatError(format!(
                    "file size {file_size} does not match {CHECKSUM_ALIGNMENT}-byte-aligned \
                     content with or without a trailer"
                ))
            })?
    } else {
        file_size
    };
    debug!(
        "File size indicates the checksum needs to be {}",
        if has_trailer { "updated" } else { "added" }
    );

    src.seek(SeekFrom::Start(0))?;
    let computed = compute(src, content_size)?;
    info!("🧮 Computed checksum: {computed:08X}");

    src.seek(SeekFrom::Start(content_size))?;
    src.write_all(&computed.to_le_bytes())?;

    Ok(computed)
}
