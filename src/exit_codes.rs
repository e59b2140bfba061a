//! Standard exit codes for the fwimg binary
//!
//! These exit codes let wrapper scripts distinguish a malformed image from a
//! failed authentication or a plain I/O problem.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Image format error (bad length or alignment for the requested operation)
pub const EXIT_FORMAT_ERROR: i32 = 102;

/// Stored and computed checksums disagree
pub const EXIT_CHECKSUM_MISMATCH: i32 = 103;

/// Scratch buffer allocation failure
pub const EXIT_MEM_ERROR: i32 = 104;

/// Invalid command-line arguments
pub const EXIT_INVALID_ARGS: i32 = 105;

/// I/O error (file not found, permission denied, short read/write)
pub const EXIT_IO_ERROR: i32 = 106;

/// Image authentication failed (tag mismatch)
pub const EXIT_AUTH_ERROR: i32 = 107;
