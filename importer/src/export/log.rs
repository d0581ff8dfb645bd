//! Print the rendered TOML to the log

use tracing::info;

const SEPARATOR: &str = "✂️  ✂️  ✂️  ✂️  ✂️  ✂️  ✂️  ✂️  ✂️  ✂️  ✂️  ✂️";

/// Log `toml` between scissor lines, ready to paste into a Resource Sync
pub fn export_to_log(toml: &str, enabled: bool) {
    if !enabled {
        return;
    }
    info!(
        "Copy the text between the scissors to use as the *Resource File* contents within your Resource Sync\n\n{}\n{}\n{}",
        SEPARATOR,
        toml.trim_end(),
        SEPARATOR
    );
}
