//! fwimg - firmware image authentication, obfuscation, and checksum maintenance
//!
//! This crate authenticates and reversibly de-obfuscates head-unit firmware
//! images carrying a key+digest trailer, and computes/verifies the appended
//! additive checksum of 1024-byte-aligned system images.

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,
    unreachable_pub,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,

    // All warnings must be fixed
    warnings,
)]
#![warn(
    // Documentation
    missing_docs,

    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_enum_variant,

    // Code clarity and maintainability
    clippy::cognitive_complexity,
    clippy::type_complexity,

    // Best practices
    clippy::clone_on_ref_ptr,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::if_not_else,
    clippy::single_match_else,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
)]
#![allow(missing_docs)]

pub mod api;
pub mod exceptions;
pub mod exit_codes;
pub mod img;
pub mod logger;
pub mod utils;
pub mod version;

// Re-export main API functions
pub use api::{decode_image, encode_image, update_image_checksum, verify_image_checksum};
pub use exceptions::FwImgError;

// Re-export format-level types for advanced usage
pub use img::checksum::ChecksumReport;
pub use img::decode::DecodeReport;
pub use img::encode::EncodeOptions;
