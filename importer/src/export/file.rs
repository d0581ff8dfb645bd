//! Write the rendered TOML to disk

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tracing::{debug, info, warn};

use crate::errors::ImportError;
use crate::filesys::file::File;

/// Write `toml` to `sync-<timestamp>.toml` in `output_dir`, creating the
/// directory when needed.
///
/// Nothing is written when no directory is configured. A failed write is
/// logged and reported but does not undo anything else the run did.
pub async fn export_to_file(
    toml: &str,
    output_dir: Option<&Path>,
) -> Result<Option<PathBuf>, ImportError> {
    let Some(output_dir) = output_dir else {
        debug!("Not writing to file because OUTPUT_DIR is empty or not defined.");
        return Ok(None);
    };

    let time = Local::now().format("%Y-%m-%d--%H-%M-%S");
    let output_file = output_dir.join(format!("sync-{}.toml", time));

    match write(toml, &output_file).await {
        Ok(()) => {
            info!("Contents written to {}", output_file.display());
            Ok(Some(output_file))
        }
        Err(e) => {
            warn!("Unable to write toml to file {}: {:#}", output_file.display(), e);
            Err(ImportError::ExportError(format!("{:#}", e)))
        }
    }
}

async fn write(toml: &str, output_file: &Path) -> anyhow::Result<()> {
    File::new(output_file)
        .write_string(toml)
        .await
        .with_context(|| format!("Could not write {}", output_file.display()))
}
