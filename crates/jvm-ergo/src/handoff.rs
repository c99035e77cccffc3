//! Replacing the current process with the real java binary.

use std::convert::Infallible;
use std::ffi::{CString, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::{LaunchError, Result};

/// Final step of a launch. Only returns on failure.
pub trait Handoff {
    fn replace(&mut self, program: &Path, argv: &[OsString]) -> Result<Infallible>;
}

/// `execv(2)`: same pid, same stdio, same working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Execv;

impl Handoff for Execv {
    fn replace(&mut self, program: &Path, argv: &[OsString]) -> Result<Infallible> {
        let path = to_cstring(program.as_os_str())?;
        let args = argv
            .iter()
            .map(|arg| to_cstring(arg.as_os_str()))
            .collect::<Result<Vec<_>>>()?;

        nix::unistd::execv(&path, &args).map_err(|source| LaunchError::Exec {
            program: program.to_path_buf(),
            source,
        })
    }
}

fn to_cstring(s: &OsStr) -> Result<CString> {
    CString::new(s.as_bytes()).map_err(|_| LaunchError::NulArgument(s.to_os_string()))
}
