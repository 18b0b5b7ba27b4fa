//! Exit codes for CLI operations
//!
//! These follow Unix conventions and sysexits.h where applicable.

/// Operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error, including schema loading failures
pub const ERROR: i32 = 1;

/// Lint found errors in a manifest
pub const LINT_ERROR: i32 = 2;

/// File not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Invalid arguments or options (sysexits.h `EX_USAGE`)
pub const USAGE_ERROR: i32 = 64;
