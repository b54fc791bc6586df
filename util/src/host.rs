//! Host environment utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the root of the software tree.
///
/// Parameter files and session directories are resolved relative to this
/// root, so the executables can be run from any working directory.
pub const SW_ROOT_ENV_VAR: &str = "TRACK_SW_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the software root directory from the environment.
///
/// Returns `Err(())` if the environment variable is not set.
pub fn get_sw_root() -> Result<PathBuf, ()> {
    match std::env::var(SW_ROOT_ENV_VAR) {
        Ok(p) => Ok(PathBuf::from(p)),
        Err(_) => Err(())
    }
}
