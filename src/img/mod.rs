//! Firmware image format implementations
//!
//! Two on-disk layouts are handled here: obfuscated boot/vendor images that
//! end in a 16-byte key block plus a 16-byte authentication tag, and system
//! images built from 1024-byte units with a 4-byte additive checksum
//! appended. Both are streamed through the bounded block driver so image
//! size never matters.

pub mod checksum;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod keystream;
pub mod stream;

// Re-export main operations
pub use checksum::{ChecksumReport, update_stream, verify_stream};
pub use decode::{DecodeReport, decode_stream};
pub use encode::{EncodeOptions, encode_stream};
