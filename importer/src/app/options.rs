//! Import run options

use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::ImportError;
use crate::filesys::paths::DirectoryValues;
use crate::komodo::KomodoApiOptions;
use crate::logs::LogOptions;
use crate::stacks::select::{DEFAULT_COMPOSE_GLOB, DEFAULT_ENV_GLOB, DEFAULT_KOMODO_ENV_NAME};

/// Default include glob for child folders of the scan dir
pub const DEFAULT_FOLDER_GLOB: &str = "*";

/// Default include glob for compose project working dirs
pub const DEFAULT_COMPOSE_DIR_GLOB: &str = "**";

/// Where stack candidates come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackSource {
    /// Child folders of the scan dir
    #[default]
    Dir,
    /// Working dirs of compose projects known to the Docker daemon
    Compose,
}

impl FromStr for StackSource {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dir" => Ok(StackSource::Dir),
            "compose" => Ok(StackSource::Compose),
            other => Err(ImportError::ConfigError(format!(
                "STACKS_FROM must be either 'compose' or 'dir', got '{}'",
                other
            ))),
        }
    }
}

/// Whether env file contents are inlined, per kind of stack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteEnvPolicy {
    /// Files-On-Server stacks
    pub dir: bool,
    /// Git stacks
    pub git: bool,
}

/// Values written into every generated stack
#[derive(Debug, Clone)]
pub struct StackOptions {
    /// Komodo server the stacks deploy to
    pub server: String,

    pub compose_file_glob: String,

    pub env_file_glob: String,

    /// Name of the env file Komodo writes into the run directory
    pub komodo_env_name: String,

    pub write_env: WriteEnvPolicy,

    pub registry_provider: Option<String>,

    pub registry_account: Option<String>,

    pub auto_update: Option<bool>,

    pub poll_for_updates: Option<bool>,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            server: String::new(),
            compose_file_glob: DEFAULT_COMPOSE_GLOB.to_string(),
            env_file_glob: DEFAULT_ENV_GLOB.to_string(),
            komodo_env_name: DEFAULT_KOMODO_ENV_NAME.to_string(),
            write_env: WriteEnvPolicy::default(),
            registry_provider: None,
            registry_account: None,
            auto_update: None,
            poll_for_updates: None,
        }
    }
}

/// How candidate folders are found
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub stacks_from: StackSource,

    /// Include glob for child folder names in `dir` mode
    pub folder_glob: String,

    pub folder_ignore_glob: Option<String>,

    /// Include glob for compose working dirs in `compose` mode
    pub compose_dir_glob: String,

    pub compose_dir_ignore_glob: Option<String>,

    /// Look for an enclosing repository when a folder is not one itself
    pub probe_parents: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            stacks_from: StackSource::default(),
            folder_glob: DEFAULT_FOLDER_GLOB.to_string(),
            folder_ignore_glob: None,
            compose_dir_glob: DEFAULT_COMPOSE_DIR_GLOB.to_string(),
            compose_dir_ignore_glob: None,
            probe_parents: true,
        }
    }
}

/// Where the rendered TOML goes
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Log the TOML between scissor lines
    pub log_toml: bool,

    /// Directory to write `sync-<timestamp>.toml` into
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            log_toml: true,
            output_dir: None,
        }
    }
}

/// Everything a run needs
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub directories: DirectoryValues,

    pub discovery: DiscoveryOptions,

    pub stack: StackOptions,

    pub komodo: KomodoApiOptions,

    pub export: ExportOptions,

    pub log: LogOptions,
}
