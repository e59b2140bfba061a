//! Image encode: produce an obfuscated image with fresh key material.
//!
//! The inverse of [`super::decode`]: content is XORed against the same
//! output-feedback keystream, then the key block and the authentication tag
//! derived from the digest of `ciphertext ∥ key block` are appended. A
//! single forward pass suffices because the digest is accumulated while the
//! ciphertext is written.

use log::{debug, info, warn};
use md5::{Digest, Md5};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use std::io::{Read, Seek, SeekFrom, Write};

use super::constants::{CIPHER_BLOCK_SIZE, DIGEST_SIZE, KEY_SIZE};
use super::keystream::generate;
use super::stream::process_blocks;
use crate::exceptions::{FwImgError, Result};
use crate::utils::xor_in_place;

/// Options controlling where the per-file key block comes from
#[derive(Debug, Default, Clone)]
pub struct EncodeOptions {
    /// Explicit key block; wins over every other source
    pub key_block: Option<[u8; KEY_SIZE]>,
    /// Seed for deterministic key derivation (SHA-256, truncated)
    pub key_seed: Option<String>,
}

/// Resolve the per-file key block: explicit block, then seed, then OS
/// randomness.
pub(crate) fn resolve_key_block(options: &EncodeOptions) -> [u8; KEY_SIZE] {
    if let Some(key) = options.key_block {
        debug!("Using caller-provided key block");
        return key;
    }

    if let Some(ref seed) = options.key_seed {
        info!("🔑 Deriving key block from seed");
        let digest = Sha256::digest(seed.as_bytes());
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&digest[..KEY_SIZE]);
        return key;
    }

    warn!("No key material provided, drawing a random key block");
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    key
}

/// Obfuscate `src` into `dst`, appending the key block and authentication
/// tag. Returns the key block that was used.
///
/// The plaintext length must be a multiple of 16; producers are expected to
/// pad their content before encoding, since the trailer leaves no room to
/// record an unpadded length.
pub fn encode_stream<R, W>(src: &mut R, dst: &mut W, options: &EncodeOptions) -> Result<[u8; KEY_SIZE]>
where
    R: Read + Seek,
    W: Write,
{
    let content_size = src.seek(SeekFrom::End(0))?;
    if content_size % CIPHER_BLOCK_SIZE as u64 != 0 {
        return Err(FwImgError::FormatError(format!(
            "content size {content_size} is not a multiple of {CIPHER_BLOCK_SIZE}"
        )));
    }
    src.seek(SeekFrom::Start(0))?;

    let key_block = resolve_key_block(options);
    info!("🔑 Key block   : {}", hex::encode(key_block));

    let mut state = [0u8; KEY_SIZE];
    let mut hasher = Md5::new();
    process_blocks(src, CIPHER_BLOCK_SIZE, content_size, |block| {
        state = generate(&key_block, &state);
        xor_in_place(block, &state);
        hasher.update(&block[..]);
        dst.write_all(block)?;
        Ok(())
    })?;

    dst.write_all(&key_block)?;
    hasher.update(key_block);

    let digest: [u8; DIGEST_SIZE] = hasher.finalize().into();
    let tag = generate(&key_block, &digest);
    dst.write_all(&tag)?;

    debug!(
        "✅ Encoded {content_size} content bytes, tag {}",
        hex::encode(tag)
    );
    Ok(key_block)
}
