//! Secret reference parsing.
//!
//! A reference is a scalar of the form `ENC[<handle>]`. Spaces and tabs
//! around the whole scalar are ignored, and so is whitespace inside the
//! brackets: `  ENC[ db_pass ]` refers to the handle `db_pass`.

use crate::core::constants::{REFERENCE_PREFIX, REFERENCE_SUFFIX};
use crate::error::{DocumentError, Result};

/// Extract the handle from a scalar if it is a secret reference.
///
/// Returns `Ok(None)` for ordinary strings.
///
/// # Errors
///
/// Returns `DocumentError::InvalidReference` for `ENC[]` and other
/// references whose handle is blank.
pub fn parse(value: &str) -> Result<Option<&str>> {
    let trimmed = value.trim_matches(|c| c == ' ' || c == '\t');

    let Some(inner) = trimmed
        .strip_prefix(REFERENCE_PREFIX)
        .and_then(|rest| rest.strip_suffix(REFERENCE_SUFFIX))
    else {
        return Ok(None);
    };

    let handle = inner.trim();
    if handle.is_empty() {
        return Err(DocumentError::InvalidReference(value.to_string()).into());
    }

    Ok(Some(handle))
}
