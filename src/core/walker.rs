//! Document tree traversal.
//!
//! Visits every string scalar in value position and lets a transform
//! replace it in place. Mapping keys are never visited.

use serde_yaml::Value;

use crate::error::Result;

/// Walk `node`, replacing each string scalar with `transform(value)`.
///
/// Numbers, booleans, and nulls are left untouched. Tagged values are walked
/// into. The first error returned by `transform` aborts the walk; nodes
/// visited before the error keep their new values, so callers that need
/// all-or-nothing behaviour must discard the tree on error.
pub fn walk<F>(node: &mut Value, transform: &mut F) -> Result<()>
where
    F: FnMut(&str) -> Result<String>,
{
    match node {
        Value::String(s) => {
            *s = transform(s)?;
        }
        Value::Mapping(map) => {
            for (_, value) in map.iter_mut() {
                walk(value, transform)?;
            }
        }
        Value::Sequence(seq) => {
            for item in seq.iter_mut() {
                walk(item, transform)?;
            }
        }
        Value::Tagged(tagged) => walk(&mut tagged.value, transform)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}
