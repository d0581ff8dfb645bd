//! Komodo API access

pub mod address;
pub mod client;
pub mod matcher;
pub mod registry;

pub use client::{KomodoApiOptions, KomodoClient};
pub use matcher::{match_git_data, ProviderMatch, RegistryMatch};
pub use registry::{CachedRegistry, KomodoRegistry, LazyKomodo};
