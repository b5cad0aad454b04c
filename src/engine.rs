use crate::spec::CreateRequest;

use ::async_trait::async_trait;
use ::std::fmt::{self, Display, Formatter};
use ::thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerStatus {
    Exited,
    Running,
}

impl ContainerStatus {
    /// Value of the engine's `status` filter.
    pub fn as_filter(&self) -> &'static str {
        match self {
            ContainerStatus::Exited => "exited",
            ContainerStatus::Running => "running",
        }
    }
}

impl Display for ContainerStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineInfo {
    pub server_version: Option<String>,
    pub containers_running: Option<i64>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Docker(#[from] ::bollard::errors::Error),

    #[error("{0}")]
    Other(String),
}

/// The container engine as seen by the reconciler.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn list_containers(&self, status: ContainerStatus, name: &str) -> Result<Vec<ContainerSummary>, EngineError>;

    async fn remove_container(&self, id: &str) -> Result<(), EngineError>;

    async fn info(&self) -> Result<EngineInfo, EngineError>;

    /// Ids of local images matching `reference` (`image:tag`).
    async fn list_images(&self, reference: &str) -> Result<Vec<String>, EngineError>;

    /// Resolves only after the pull has finished.
    async fn pull_image(&self, image: &str, tag: &str) -> Result<(), EngineError>;

    async fn create_container(&self, request: &CreateRequest) -> Result<String, EngineError>;

    async fn start_container(&self, id: &str) -> Result<(), EngineError>;

    async fn stop_container(&self, id: &str) -> Result<(), EngineError>;
}
