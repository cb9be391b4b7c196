//! Exit codes for the `flakeboard` binary.
//! Failures exit with `FlakeError::exit_code`: 2 setup, 3 transport, 4 a job aborted the run.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 2; // Bad config, unusable cache directory
