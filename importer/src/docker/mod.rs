//! Docker daemon access

pub mod compose;

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::Docker;
use tracing::{debug, warn};

pub use compose::{consolidate_compose_stacks, ComposeCandidate, COMPOSE_PROJECT_LABEL};

/// The parts of a container the importer reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub image: String,
    pub labels: HashMap<String, String>,
    pub state: Option<String>,
}

/// Anything that can list containers by label
#[async_trait]
pub trait ContainerSource: Send + Sync {
    /// Containers (running or not) carrying `label`. An unreachable daemon
    /// yields an empty list.
    async fn list_containers(&self, label: &str) -> Vec<Container>;
}

/// Local Docker daemon, reached through the default socket or `DOCKER_HOST`
#[derive(Debug, Default, Clone, Copy)]
pub struct DockerApi;

#[async_trait]
impl ContainerSource for DockerApi {
    async fn list_containers(&self, label: &str) -> Vec<Container> {
        let docker = match Docker::connect_with_local_defaults() {
            Ok(d) => d,
            Err(e) => {
                warn!("Failed to connect to Docker, compose projects will not be used: {}", e);
                return Vec::new();
            }
        };

        if let Err(e) = docker.ping().await {
            warn!("Docker is not reachable, compose projects will not be used: {}", e);
            return Vec::new();
        }

        let mut filters = HashMap::new();
        filters.insert("label".to_string(), vec![label.to_string()]);
        let options = ListContainersOptions::<String> {
            all: true,
            filters,
            ..Default::default()
        };

        match docker.list_containers(Some(options)).await {
            Ok(summaries) => {
                debug!("Docker returned {} containers with label {}", summaries.len(), label);
                summaries
                    .into_iter()
                    .map(|s| Container {
                        id: s.id.unwrap_or_default(),
                        image: s.image.unwrap_or_default(),
                        labels: s.labels.unwrap_or_default(),
                        state: s.state.map(|state| state.to_string()),
                    })
                    .collect()
            }
            Err(e) => {
                warn!("Failed to list containers: {}", e);
                Vec::new()
            }
        }
    }
}
