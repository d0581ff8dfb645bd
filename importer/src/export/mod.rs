//! Rendering and exporting the generated stacks

pub mod file;
pub mod log;

use serde_json::{json, Value};

use crate::errors::ImportError;
use crate::stacks::TomlStack;

pub use file::export_to_file;
pub use log::export_to_log;

/// Render stacks as the contents of a Komodo resource sync file
pub fn render_toml(stacks: &[TomlStack]) -> Result<String, ImportError> {
    let stacks = stacks
        .iter()
        .map(TomlStack::to_value)
        .collect::<Result<Vec<Value>, _>>()?;
    let doc = json!({ "stack": stacks });
    Ok(toml::to_string(&doc)?)
}
