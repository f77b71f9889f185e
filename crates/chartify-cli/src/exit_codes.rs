//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - manifest could not be read as Kubernetes resources
pub const INPUT_ERROR: i32 = 2;

/// Conversion error - at least one matching resource could not be converted
pub const CONVERSION_ERROR: i32 = 3;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
