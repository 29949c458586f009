//! Document codec.
//!
//! Documents are YAML (JSON parses too). Mappings keep insertion order, so
//! unresolved content round-trips with keys and sequences in place.

use serde_yaml::Value;

use crate::error::{DocumentError, Result};

pub fn parse(input: &[u8]) -> Result<Value> {
    Ok(serde_yaml::from_slice(input).map_err(DocumentError::Parse)?)
}

pub fn serialize(document: &Value) -> Result<Vec<u8>> {
    let rendered = serde_yaml::to_string(document).map_err(DocumentError::Serialize)?;
    Ok(rendered.into_bytes())
}
