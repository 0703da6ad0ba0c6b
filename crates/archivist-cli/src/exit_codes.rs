//! Exit codes for the `archivist` binary.
//! These codes are part of the public contract; wrapper scripts branch on them.

pub const SUCCESS: i32 = 0;
pub const BUILD_FAILED: i32 = 1; // Data source, archive I/O, manifest write, or verify mismatch
pub const CONFIG_ERROR: i32 = 2; // Unreadable/invalid config or bad arguments
