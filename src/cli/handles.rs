//! Handles command.
//!
//! Lists the secret handles a document references without contacting the
//! backend.

use std::path::Path;

use crate::cli::output;
use crate::core::resolver::referenced_handles;
use crate::error::Result;

pub fn execute(file: Option<&Path>, json: bool) -> Result<()> {
    let input = super::read_input(file)?;
    let handles = referenced_handles(&input)?;

    if json {
        let result = serde_json::json!({
            "handles": handles,
            "count": handles.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if handles.is_empty() {
        output::dimmed("no secret references");
        return Ok(());
    }
    for handle in &handles {
        output::list_item(handle);
    }
    Ok(())
}
