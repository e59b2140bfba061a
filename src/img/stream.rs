//! Bounded block streaming driver.
//!
//! Every per-block operation in this crate (digesting, keystream XOR,
//! checksum accumulation) runs through [`process_blocks`], which reads a
//! declared number of bytes from a stream in fixed-size chunks and hands
//! each chunk to a handler. Short reads are fatal: a stream that ends
//! before the declared total is corrupt, and resuming it is not defined.

use std::io::Read;

use crate::exceptions::{FwImgError, Result};

/// Read exactly `total` bytes from `reader` in chunks of up to
/// `block_size`, invoking `handler` for each chunk.
///
/// The handler receives a mutable slice holding exactly the bytes read, so
/// it may transform them in place before forwarding them elsewhere. The
/// final chunk may be shorter only if it exactly completes `total`.
///
/// Errors:
/// - `MemError` if the scratch buffer cannot be allocated
/// - `IoError` if the stream ends before `total` bytes were delivered
/// - any error returned by the handler, which aborts the stream immediately
///
/// On success the stream position has advanced by exactly `total` bytes;
/// on failure the position is unspecified. The same open stream may be
/// driven repeatedly, with the caller seeking between invocations.
pub fn process_blocks<R, F>(reader: &mut R, block_size: usize, total: u64, mut handler: F) -> Result<()>
where
    R: Read,
    F: FnMut(&mut [u8]) -> Result<()>,
{
    if total == 0 {
        return Ok(());
    }
    if block_size == 0 {
        return Err(FwImgError::FormatError(
            "block size must be nonzero".to_string(),
        ));
    }

    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(block_size)?;
    buffer.resize(block_size, 0);

    let mut processed: u64 = 0;
    while processed < total {
        let want = (total - processed).min(block_size as u64) as usize;
        let chunk = &mut buffer[..want];
        reader.read_exact(chunk)?;
        handler(chunk)?;
        processed += want as u64;
    }

    Ok(())
}
