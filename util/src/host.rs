//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the gimbal software installation.
///
/// The root is given by the `GIMBAL_SW_ROOT` environment variable, which must
/// be set before any executable is run. The `params` and `sessions`
/// directories live under this root.
pub fn get_gimbal_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(env::var("GIMBAL_SW_ROOT")?))
}
