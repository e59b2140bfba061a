// Core format constants that never change

/// Per-file key block size in bytes
pub const KEY_SIZE: usize = 16;

/// Digest and authentication tag size in bytes (MD5)
pub const DIGEST_SIZE: usize = 16;

/// Obfuscated image trailer: key block followed by authentication tag
pub const TRAILER_SIZE: u64 = (KEY_SIZE + DIGEST_SIZE) as u64;

/// Obfuscated content advances in keystream-sized blocks
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Block size for whole-file digesting
pub const HASH_BLOCK_SIZE: usize = 4096;

/// Block size for checksum accumulation
pub const CHECKSUM_BLOCK_SIZE: usize = 256;

/// Checksum trailer size in bytes
pub const CHECKSUM_SIZE: u64 = 4;

/// Checksum-format images are built from units of this many bytes
pub const CHECKSUM_ALIGNMENT: u64 = 1024;
