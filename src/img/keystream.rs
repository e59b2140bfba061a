//! Hash-chain keystream generator.
//!
//! A 16-byte block is derived from a per-file key block and a 16-byte input
//! through two rounds of MD5 over embedded static key material. The same
//! function serves two roles: deriving the authentication tag from a
//! whole-file digest, and advancing the decode keystream in output-feedback
//! fashion (the next state depends only on the previous state, never on the
//! ciphertext).

use md5::{Digest, Md5};
use std::io::Read;

use super::constants::{DIGEST_SIZE, HASH_BLOCK_SIZE, KEY_SIZE};
use super::stream::process_blocks;
use crate::exceptions::Result;
use crate::utils::xor_const;

/// First embedded static key fragment
const KEY_A: [u8; KEY_SIZE] = [
    0xC1, 0x81, 0x56, 0xC2, 0x44, 0xBD, 0x11, 0xE1, 0x94, 0x38, 0x00, 0x0C, 0x29, 0xBA, 0x27,
    0xC0,
];

/// Second embedded static key fragment; also mixed verbatim into round two
const KEY_B: [u8; KEY_SIZE] = [
    0x81, 0x6B, 0xAE, 0x89, 0x3F, 0x95, 0xE6, 0xDB, 0x96, 0xA3, 0xB9, 0x90, 0x57, 0x17, 0x29,
    0xAF,
];

/// Derived static key: index-wise XOR of the two fragments. Only the
/// derived value enters round one.
const DERIVED_KEY: [u8; KEY_SIZE] = xor_const(&KEY_A, &KEY_B);

/// Derive a 16-byte output block from a per-file key block and a 16-byte
/// input.
///
/// Round one digests `key_block ∥ input ∥ derived static key` (48 bytes);
/// round two digests the round-one digest followed by the second static key
/// fragment (32 bytes). Deterministic and side-effect-free.
pub fn generate(key_block: &[u8; KEY_SIZE], input: &[u8; KEY_SIZE]) -> [u8; DIGEST_SIZE] {
    let mut buffer = [0u8; KEY_SIZE * 3];
    buffer[..KEY_SIZE].copy_from_slice(key_block);
    buffer[KEY_SIZE..2 * KEY_SIZE].copy_from_slice(input);
    buffer[2 * KEY_SIZE..].copy_from_slice(&DERIVED_KEY);

    let round_one: [u8; DIGEST_SIZE] = Md5::digest(buffer).into();

    buffer[..DIGEST_SIZE].copy_from_slice(&round_one);
    buffer[DIGEST_SIZE..2 * DIGEST_SIZE].copy_from_slice(&KEY_B);

    Md5::digest(&buffer[..2 * DIGEST_SIZE]).into()
}

/// Compute the MD5 digest of the next `total` bytes of `reader`, streamed
/// in 4096-byte blocks.
pub fn digest_stream<R: Read>(reader: &mut R, total: u64) -> Result<[u8; DIGEST_SIZE]> {
    let mut hasher = Md5::new();
    process_blocks(reader, HASH_BLOCK_SIZE, total, |block| {
        hasher.update(&block[..]);
        Ok(())
    })?;
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::{DERIVED_KEY, digest_stream, generate};
    use std::io::Cursor;

    const ZERO: [u8; 16] = [0u8; 16];

    #[test]
    fn test_derived_key_value() {
        assert_eq!(
            DERIVED_KEY,
            [
                0x40, 0xea, 0xf8, 0x4b, 0x7b, 0x28, 0xf7, 0x3a, 0x02, 0x9b, 0xb9, 0x9c, 0x7e,
                0xad, 0x0e, 0x6f
            ]
        );
    }

    #[test]
    fn test_generate_is_deterministic() {
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        let input: [u8; 16] = core::array::from_fn(|i| (i + 16) as u8);
        assert_eq!(generate(&key, &input), generate(&key, &input));
    }

    #[test]
    fn test_generate_known_answers() {
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        let input: [u8; 16] = core::array::from_fn(|i| (i + 16) as u8);

        assert_eq!(
            generate(&ZERO, &ZERO),
            [
                0x13, 0x93, 0x70, 0x86, 0x42, 0x82, 0xad, 0xc9, 0x7c, 0xac, 0x5d, 0xac, 0x49,
                0x02, 0x7f, 0xcf
            ]
        );
        assert_eq!(
            generate(&key, &input),
            [
                0xa8, 0x64, 0xf2, 0xaa, 0x27, 0x2c, 0xf4, 0x36, 0x7c, 0xaf, 0x97, 0x68, 0x87,
                0x37, 0x7e, 0xc0
            ]
        );
        assert_eq!(
            generate(&key, &ZERO),
            [
                0x77, 0x8f, 0xa9, 0x1c, 0xea, 0x46, 0x39, 0x62, 0x13, 0xc7, 0x7b, 0xeb, 0xae,
                0x30, 0x3f, 0xfb
            ]
        );
        assert_eq!(
            generate(&ZERO, &input),
            [
                0x3a, 0xc5, 0x91, 0x1a, 0x53, 0x74, 0xbd, 0xdc, 0x4e, 0xe6, 0x48, 0x00, 0x7b,
                0xee, 0xd5, 0xe7
            ]
        );
    }

    #[test]
    fn test_generate_distinguishes_key_and_input() {
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        let input: [u8; 16] = core::array::from_fn(|i| (i + 16) as u8);
        assert_ne!(generate(&key, &input), generate(&input, &key));
    }

    #[test]
    fn test_digest_stream_matches_whole_buffer() {
        // MD5 of the zero key block, independently computed
        let mut reader = Cursor::new(vec![0u8; 16]);
        let digest = digest_stream(&mut reader, 16).unwrap();
        assert_eq!(
            digest,
            [
                0x4a, 0xe7, 0x13, 0x36, 0xe4, 0x4b, 0xf9, 0xbf, 0x79, 0xd2, 0x75, 0x2e, 0x23,
                0x48, 0x18, 0xa5
            ]
        );
    }

    #[test]
    fn test_digest_stream_only_consumes_total() {
        let mut data = vec![0u8; 16];
        data.extend_from_slice(&[0xde, 0xad]);
        let mut reader = Cursor::new(data);
        let digest = digest_stream(&mut reader, 16).unwrap();
        assert_eq!(
            digest,
            [
                0x4a, 0xe7, 0x13, 0x36, 0xe4, 0x4b, 0xf9, 0xbf, 0x79, 0xd2, 0x75, 0x2e, 0x23,
                0x48, 0x18, 0xa5
            ]
        );
        assert_eq!(reader.position(), 16);
    }
}
