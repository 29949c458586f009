//! Executable rights check.
//!
//! The backend runs with our privileges and sees every handle we send it,
//! so it must be a regular file owned by the effective user, with no rights
//! for "others" and no write access for the group.

use std::path::Path;

use tracing::trace;

use crate::error::{BackendError, Result};

/// Verify that `path` is safe to execute as the secret backend.
///
/// # Errors
///
/// Returns `BackendError::Permission` describing the first failed check.
#[cfg(unix)]
pub fn check_rights(path: &Path) -> Result<()> {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let deny = |reason: String| -> crate::error::Error {
        BackendError::Permission {
            path: path.display().to_string(),
            reason,
        }
        .into()
    };

    let metadata = std::fs::metadata(path).map_err(|e| deny(format!("cannot stat: {}", e)))?;

    if !metadata.is_file() {
        return Err(deny("not a regular file".to_string()));
    }

    // SAFETY: geteuid has no preconditions and cannot fail.
    let euid = unsafe { libc::geteuid() };
    if metadata.uid() != euid {
        return Err(deny(format!(
            "owned by uid {}, expected current user (uid {})",
            metadata.uid(),
            euid
        )));
    }

    let mode = metadata.permissions().mode() & 0o777;
    trace!(path = %path.display(), mode = %format!("{:o}", mode), "checking backend rights");

    if mode & 0o007 != 0 {
        return Err(deny(format!("'others' have rights on it (mode {:o})", mode)));
    }
    if mode & 0o020 != 0 {
        return Err(deny(format!("group can write to it (mode {:o})", mode)));
    }
    if mode & 0o100 == 0 {
        return Err(deny(format!("not executable by its owner (mode {:o})", mode)));
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn check_rights(_path: &Path) -> Result<()> {
    Ok(())
}
