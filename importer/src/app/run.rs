//! One import run

use std::sync::Arc;

use tracing::{error, info};

use crate::app::options::ImportOptions;
use crate::docker::{ContainerSource, DockerApi};
use crate::errors::ImportError;
use crate::export::{export_to_file, export_to_log, render_toml};
use crate::filesys::paths::resolve_directories;
use crate::komodo::CachedRegistry;
use crate::stacks::{RunSummary, StackBuilder};

/// Resolve directories, build stacks and export them.
///
/// Returns the run summary; a run that found nothing is not an error.
pub async fn run(options: ImportOptions) -> Result<RunSummary, ImportError> {
    run_with(options, Arc::new(DockerApi)).await
}

/// [`run`] with an explicit container source
pub async fn run_with(
    options: ImportOptions,
    containers: Arc<dyn ContainerSource>,
) -> Result<RunSummary, ImportError> {
    let dirs = resolve_directories(&options.directories).await?;
    info!("Mount Dir : {} -> Resolved: {}", options.directories.mount, dirs.mount.display());
    info!(
        "Host Dir  : {} -> Resolved: {}",
        options.directories.host.as_deref().unwrap_or("(mount)"),
        dirs.host.display()
    );
    info!(
        "Scan Dir  : {} -> Resolved: {}",
        options.directories.scan.as_deref().unwrap_or("(mount)"),
        dirs.scan.display()
    );

    let registry = if options.komodo.is_configured() {
        Some(Arc::new(CachedRegistry::from_options(options.komodo.clone())))
    } else {
        info!("KOMODO_URL is not set, git Stacks will not be linked to existing Repos");
        None
    };

    let builder = StackBuilder::new(
        options.stack.clone(),
        options.discovery.clone(),
        dirs,
        containers,
        registry,
    );
    let (stacks, summary) = builder.build_stacks().await?;

    if stacks.is_empty() {
        info!("No Stacks found! Nothing to do.");
        return Ok(summary);
    }

    let toml = render_toml(&stacks).inspect_err(|e| error!("Could not produce TOML: {}", e))?;

    export_to_log(&toml, options.export.log_toml);
    // failures are logged by the exporter
    let _ = export_to_file(&toml, options.export.output_dir.as_deref()).await;

    info!("Done!");
    Ok(summary)
}
