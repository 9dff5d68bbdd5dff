use crate::error::{self, Result};
use log::{debug, warn};
use snafu::ResultExt;
use std::path::{Path, PathBuf};

/// Changes the working directory of the process and changes it back when dropped, whichever way
/// the scope is left.
///
/// The working directory is process wide. Holders must not overlap across threads.
#[derive(Debug)]
pub struct ScopedWorkingDir {
    previous: PathBuf,
}

impl ScopedWorkingDir {
    pub fn enter<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let previous = std::env::current_dir().context(error::WorkingDirSnafu { path: "." })?;
        std::env::set_current_dir(path).context(error::WorkingDirSnafu { path })?;
        debug!("Entered '{}'", path.display());
        Ok(Self { previous })
    }

    /// The directory restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for ScopedWorkingDir {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            warn!(
                "Unable to return to '{}': {}",
                self.previous.display(),
                e
            );
        }
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=
