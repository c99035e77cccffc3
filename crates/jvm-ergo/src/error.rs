use std::ffi::OsString;
use std::path::PathBuf;

/// Exit code for failures that have no dedicated code (exec failure, bad argv).
pub const EXIT_GENERAL: u8 = 1;
/// Exit code when the shim's own executable path cannot be read.
pub const EXIT_SELF_EXE: u8 = 2;
/// Exit code when the shim's own executable path does not fit the path buffer.
pub const EXIT_PATH_TOO_LONG: u8 = 3;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("could not read {} ({source}), aborting", .path.display())]
    SelfExe {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("path too long ({len} bytes, max {max}), aborting")]
    PathTooLong { len: usize, max: usize },

    #[error("argument contains an interior NUL byte: {0:?}")]
    NulArgument(OsString),

    #[error("failed to exec {}: {source}", .program.display())]
    Exec {
        program: PathBuf,
        source: nix::Error,
    },
}

impl LaunchError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::SelfExe { .. } => EXIT_SELF_EXE,
            LaunchError::PathTooLong { .. } => EXIT_PATH_TOO_LONG,
            LaunchError::NulArgument(_) | LaunchError::Exec { .. } => EXIT_GENERAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
