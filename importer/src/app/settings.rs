//! Settings read from the process environment

use std::path::PathBuf;

use secrecy::SecretString;

use crate::app::options::{
    DiscoveryOptions, ExportOptions, ImportOptions, StackOptions, StackSource, WriteEnvPolicy,
    DEFAULT_COMPOSE_DIR_GLOB, DEFAULT_FOLDER_GLOB,
};
use crate::errors::ImportError;
use crate::filesys::paths::DirectoryValues;
use crate::komodo::KomodoApiOptions;
use crate::logs::{LogLevel, LogOptions};
use crate::stacks::select::{DEFAULT_COMPOSE_GLOB, DEFAULT_ENV_GLOB, DEFAULT_KOMODO_ENV_NAME};
use crate::utils::{non_empty, parse_bool};

/// Raw configuration values, blank values already treated as unset
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub mount_dir: Option<String>,
    pub host_dir: Option<String>,
    pub scan_dir: Option<String>,
    pub server_name: Option<String>,
    pub stacks_from: Option<String>,
    pub folder_glob: Option<String>,
    pub folder_ignore_glob: Option<String>,
    pub compose_dir_glob: Option<String>,
    pub compose_dir_ignore_glob: Option<String>,
    pub compose_file_glob: Option<String>,
    pub env_file_glob: Option<String>,
    pub komodo_env_name: Option<String>,
    pub write_env: Option<String>,
    pub write_env_dir: Option<String>,
    pub write_env_git: Option<String>,
    pub image_registry_provider: Option<String>,
    pub image_registry_account: Option<String>,
    pub auto_update: Option<String>,
    pub poll_for_update: Option<String>,
    pub git_probe_parents: Option<String>,
    pub komodo_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub output_dir: Option<String>,
    pub log_toml: Option<String>,
    pub log_level: Option<String>,
    pub debug_mode: Option<String>,
    pub log_json: Option<String>,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| non_empty(lookup(key));
        Self {
            mount_dir: get("MOUNT_DIR"),
            host_dir: get("HOST_DIR"),
            scan_dir: get("SCAN_DIR"),
            server_name: get("SERVER_NAME"),
            stacks_from: get("STACKS_FROM"),
            folder_glob: get("FOLDER_GLOB"),
            folder_ignore_glob: get("FOLDER_IGNORE_GLOB"),
            compose_dir_glob: get("COMPOSE_DIR_GLOB"),
            compose_dir_ignore_glob: get("COMPOSE_DIR_IGNORE_GLOB"),
            compose_file_glob: get("COMPOSE_FILE_GLOB"),
            env_file_glob: get("ENV_FILE_GLOB"),
            komodo_env_name: get("KOMODO_ENV_NAME"),
            write_env: get("WRITE_ENV"),
            write_env_dir: get("WRITE_ENV_DIR"),
            write_env_git: get("WRITE_ENV_GIT"),
            image_registry_provider: get("IMAGE_REGISTRY_PROVIDER"),
            image_registry_account: get("IMAGE_REGISTRY_ACCOUNT"),
            auto_update: get("AUTO_UPDATE"),
            poll_for_update: get("POLL_FOR_UPDATE"),
            git_probe_parents: get("GIT_PROBE_PARENTS"),
            komodo_url: get("KOMODO_URL"),
            api_key: get("API_KEY"),
            api_secret: get("API_SECRET"),
            output_dir: get("OUTPUT_DIR"),
            log_toml: get("LOG_TOML"),
            log_level: get("LOG_LEVEL"),
            debug_mode: get("DEBUG_MODE"),
            log_json: get("LOG_JSON"),
        }
    }

    /// Logging options alone, so logging can start before the rest is validated
    pub fn log_options(&self) -> Result<LogOptions, ImportError> {
        let log_level = if parse_bool(self.debug_mode.as_deref(), false) {
            LogLevel::Debug
        } else {
            match self.log_level.as_deref() {
                Some(level) => level.parse::<LogLevel>().map_err(ImportError::ConfigError)?,
                None => LogLevel::default(),
            }
        };
        Ok(LogOptions {
            log_level,
            json_format: parse_bool(self.log_json.as_deref(), false),
        })
    }

    /// Validate and convert into run options
    pub fn into_options(self) -> Result<ImportOptions, ImportError> {
        let log = self.log_options()?;

        let Some(mount) = self.mount_dir else {
            return Err(ImportError::ConfigError("ENV MOUNT_DIR must be set".to_string()));
        };
        let Some(server) = self.server_name else {
            return Err(ImportError::ConfigError("ENV SERVER_NAME must be set".to_string()));
        };
        let stacks_from = match self.stacks_from.as_deref() {
            Some(s) => s.parse::<StackSource>()?,
            None => StackSource::default(),
        };

        if self.komodo_url.is_some() && (self.api_key.is_none() || self.api_secret.is_none()) {
            return Err(ImportError::ConfigError(
                "KOMODO_URL is set so API_KEY and API_SECRET must also be set".to_string(),
            ));
        }

        let write_env_global = parse_bool(self.write_env.as_deref(), false);
        let optional_bool = |v: Option<String>| v.map(|v| parse_bool(Some(&v), false));

        Ok(ImportOptions {
            directories: DirectoryValues {
                mount,
                host: self.host_dir,
                scan: self.scan_dir,
            },
            discovery: DiscoveryOptions {
                stacks_from,
                folder_glob: self.folder_glob.unwrap_or_else(|| DEFAULT_FOLDER_GLOB.to_string()),
                folder_ignore_glob: self.folder_ignore_glob,
                compose_dir_glob: self
                    .compose_dir_glob
                    .unwrap_or_else(|| DEFAULT_COMPOSE_DIR_GLOB.to_string()),
                compose_dir_ignore_glob: self.compose_dir_ignore_glob,
                probe_parents: parse_bool(self.git_probe_parents.as_deref(), true),
            },
            stack: StackOptions {
                server,
                compose_file_glob: self
                    .compose_file_glob
                    .unwrap_or_else(|| DEFAULT_COMPOSE_GLOB.to_string()),
                env_file_glob: self.env_file_glob.unwrap_or_else(|| DEFAULT_ENV_GLOB.to_string()),
                komodo_env_name: self
                    .komodo_env_name
                    .unwrap_or_else(|| DEFAULT_KOMODO_ENV_NAME.to_string()),
                write_env: WriteEnvPolicy {
                    dir: parse_bool(self.write_env_dir.as_deref(), write_env_global),
                    git: parse_bool(self.write_env_git.as_deref(), write_env_global),
                },
                registry_provider: self.image_registry_provider,
                registry_account: self.image_registry_account,
                auto_update: optional_bool(self.auto_update),
                poll_for_updates: optional_bool(self.poll_for_update),
            },
            komodo: KomodoApiOptions {
                url: self.komodo_url,
                api_key: self.api_key,
                api_secret: self.api_secret.map(SecretString::from),
            },
            export: ExportOptions {
                log_toml: parse_bool(self.log_toml.as_deref(), true),
                output_dir: self.output_dir.map(PathBuf::from),
            },
            log,
        })
    }
}
