//! High-level API for fwimg operations

use crate::exceptions::Result;
use crate::img::checksum::{self, ChecksumReport};
use crate::img::decode::{self, DecodeReport};
use crate::img::encode::{self, EncodeOptions};
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Authenticate an obfuscated image file and write its decoded content to
/// `dest`.
///
/// Nothing beyond creating/truncating `dest` happens before the image
/// authenticates; on tag mismatch the destination is left empty.
pub fn decode_image(source: &Path, dest: &Path) -> Result<DecodeReport> {
    info!("Decoding image {source:?} -> {dest:?}");
    let mut src = BufReader::new(File::open(source)?);
    let mut dst = BufWriter::new(File::create(dest)?);
    let report = decode::decode_stream(&mut src, &mut dst)?;
    dst.flush()?;
    Ok(report)
}

/// Obfuscate `source` into a new image at `dest`, appending the key block
/// and authentication tag. Returns the key block used.
pub fn encode_image(source: &Path, dest: &Path, options: &EncodeOptions) -> Result<[u8; 16]> {
    info!("Encoding image {source:?} -> {dest:?}");
    let mut src = BufReader::new(File::open(source)?);
    let mut dst = BufWriter::new(File::create(dest)?);
    let key_block = encode::encode_stream(&mut src, &mut dst, options)?;
    dst.flush()?;
    Ok(key_block)
}

/// Recompute the additive checksum of `source` and compare it against the
/// stored trailer.
pub fn verify_image_checksum(source: &Path) -> Result<ChecksumReport> {
    info!("Verifying checksum of {source:?}");
    let mut src = BufReader::new(File::open(source)?);
    checksum::verify_stream(&mut src)
}

/// Recompute the additive checksum of `source` and write it to the trailer
/// position in place.
pub fn update_image_checksum(source: &Path) -> Result<u32> {
    info!("Updating checksum of {source:?}");
    let mut file = OpenOptions::new().read(true).write(true).open(source)?;
    checksum::update_stream(&mut file)
}

#[cfg(test)]
mod tests {
    use super::{decode_image, encode_image, update_image_checksum, verify_image_checksum};
    use crate::img::encode::EncodeOptions;
    use std::fs;

    #[test]
    fn test_encode_decode_files_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let raw = dir.path().join("content.bin");
        let image = dir.path().join("content.img");
        let restored = dir.path().join("restored.bin");

        let content: Vec<u8> = (0..512u32).flat_map(|w| w.to_le_bytes()).collect();
        fs::write(&raw, &content).unwrap();

        let options = EncodeOptions {
            key_block: None,
            key_seed: Some("api round trip".to_string()),
        };
        let key = encode_image(&raw, &image, &options).unwrap();

        let report = decode_image(&image, &restored).unwrap();
        assert_eq!(report.key, hex::encode(key));
        assert_eq!(fs::read(&restored).unwrap(), content);
    }

    #[test]
    fn test_failed_decode_leaves_destination_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let raw = dir.path().join("content.bin");
        let image = dir.path().join("content.img");
        let restored = dir.path().join("restored.bin");

        fs::write(&raw, vec![0xa5u8; 64]).unwrap();
        encode_image(&raw, &image, &EncodeOptions::default()).unwrap();

        // Flip a bit in the stored tag
        let mut bytes = fs::read(&image).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x10;
        fs::write(&image, &bytes).unwrap();

        assert!(decode_image(&image, &restored).is_err());
        assert_eq!(fs::read(&restored).unwrap().len(), 0);
    }

    #[test]
    fn test_update_then_verify_file_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let image = dir.path().join("system.img");
        fs::write(&image, vec![0x11u8; 2048]).unwrap();

        let written = update_image_checksum(&image).unwrap();
        assert_eq!(fs::metadata(&image).unwrap().len(), 2052);

        let report = verify_image_checksum(&image).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.stored, written);
    }
}
