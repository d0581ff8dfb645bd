//! Stacks that run from files already present on the host

use tracing::{debug, info, warn};

use crate::app::options::StackOptions;
use crate::errors::ImportError;
use crate::filesys::dir::Dir;
use crate::filesys::paths::DirectoryConfig;
use crate::stacks::models::{DiscoveredVia, StackCandidate, StackConfig, TomlStack};
use crate::stacks::select::{
    parse_env_config, select_compose_files, without_komodo_default, EnvOptions,
};

/// Build a Files-On-Server stack whose run directory is the candidate's
/// host path
pub async fn build_file_stack(
    candidate: &StackCandidate,
    dirs: &DirectoryConfig,
    options: &StackOptions,
) -> Result<TomlStack, ImportError> {
    if !candidate.path.starts_with(&dirs.mount) {
        return Err(ImportError::ConfigError(format!(
            "Folder {} is not under mount dir {} so it has no host path",
            candidate.path.display(),
            dirs.mount.display()
        )));
    }
    let run_directory = dirs.to_host_path(&candidate.path);
    info!(
        "Found Stack '{}' at dir {} (host dir {})",
        candidate.name,
        candidate.path.display(),
        run_directory.display()
    );

    let mut config = StackConfig::from_options(options);
    config.run_directory = Some(run_directory.to_string_lossy().to_string());
    config.files_on_host = Some(true);
    config.project_name = candidate.project_name();

    config.file_paths = match candidate.compose.as_ref() {
        Some(meta) if !meta.compose_files.is_empty() => {
            debug!("Using compose files from project labels: {}", meta.compose_files.join(", "));
            without_komodo_default(meta.compose_files.clone())
        }
        _ => select_compose_files(&options.compose_file_glob, &candidate.path)?,
    };
    if config.file_paths.is_none() && !has_default_compose(candidate).await {
        match candidate.discovered_via {
            DiscoveredVia::Compose => {
                info!("No compose files found for compose project, Stack will be created without them")
            }
            DiscoveredVia::Folder => {
                warn!("No compose files found, Stack may not be deployable as-is")
            }
        }
    }

    let env = parse_env_config(
        &candidate.path,
        &EnvOptions {
            env_file_glob: &options.env_file_glob,
            write_env: options.write_env.dir,
            komodo_env_name: &options.komodo_env_name,
            path_prefix: None,
        },
    )
    .await?;
    config.env_file_path = env.env_file_path;
    config.additional_env_files = env.additional_env_files;
    config.environment = env.environment;

    info!("Stack config complete");
    Ok(TomlStack {
        name: candidate.name.clone(),
        config,
    })
}

async fn has_default_compose(candidate: &StackCandidate) -> bool {
    Dir::new(&candidate.path).file("compose.yaml").exists().await
}
