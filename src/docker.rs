use crate::engine::{ContainerStatus, ContainerSummary, Engine, EngineError, EngineInfo};
use crate::spec::CreateRequest;

use ::async_trait::async_trait;
use ::bollard::Docker;
use ::bollard::container::{
    Config as ContainerConfig,
    CreateContainerOptions,
    ListContainersOptions,
    RemoveContainerOptions,
    StartContainerOptions,
    StopContainerOptions,
};
use ::bollard::image::{CreateImageOptions, ListImagesOptions};
use ::bollard::models::{HostConfig, PortBinding as DockerPortBinding};
use ::futures::future;
use ::futures::stream::TryStreamExt;
use ::std::collections::HashMap;
use ::tracing::{debug, warn};

/// [`Engine`] backed by a local Docker daemon.
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Unix socket, named pipe or `DOCKER_HOST`, whichever the platform defaults to.
    pub fn connect() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl Engine for DockerEngine {
    async fn list_containers(&self, status: ContainerStatus, name: &str) -> Result<Vec<ContainerSummary>, EngineError> {
        let name_filter = exact_name_filter(name);
        let query = ListContainersOptions {
            all: true,  // exited ones are hidden otherwise
            filters: hashmap!{
                "status" => vec![status.as_filter()],
                "name" => vec![name_filter.as_str()],
            },
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(query)).await?;
        Ok(containers.into_iter()
            .filter_map(|c| {
                let names = c.names;
                c.id.map(|id| ContainerSummary {
                    id,
                    names: names.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker.remove_container(id, None::<RemoveContainerOptions>).await?;
        Ok(())
    }

    async fn info(&self) -> Result<EngineInfo, EngineError> {
        let info = self.docker.info().await?;
        Ok(EngineInfo {
            server_version: info.server_version,
            containers_running: info.containers_running,
        })
    }

    async fn list_images(&self, reference: &str) -> Result<Vec<String>, EngineError> {
        let query = ListImagesOptions {
            filters: hashmap!{"reference" => vec![reference]},
            ..Default::default()
        };
        let images = self.docker.list_images(Some(query)).await?;
        Ok(images.into_iter().map(|image| image.id).collect())
    }

    async fn pull_image(&self, image: &str, tag: &str) -> Result<(), EngineError> {
        let options = CreateImageOptions {
            from_image: image,
            tag,
            ..Default::default()
        };
        self.docker.create_image(Some(options), None, None)
            .try_for_each(|progress| {
                debug!(image, tag, status = ?progress.status, progress = ?progress.progress, "pulling");
                future::ready(Ok(()))
            })
            .await?;
        Ok(())
    }

    async fn create_container(&self, request: &CreateRequest) -> Result<String, EngineError> {
        let exposed_ports: HashMap<String, HashMap<(), ()>> = request.exposed_ports.iter()
            .map(|port| (port.clone(), hashmap!()))
            .collect();
        let mut port_bindings: HashMap<String, Option<Vec<DockerPortBinding>>> = HashMap::new();
        for binding in &request.port_bindings {
            port_bindings.entry(binding.container_port.clone())
                .or_insert_with(|| Some(vec![]))
                .get_or_insert_with(Vec::new)
                .push(DockerPortBinding {
                    host_ip: Some(binding.host_ip.clone()),
                    host_port: Some(binding.host_port.clone()),
                });
        }
        let options = CreateContainerOptions {
            name: request.name.clone(),
            ..Default::default()
        };
        let config = ContainerConfig {
            image: Some(request.image.clone()),
            cmd: request.cmd.clone(),
            env: request.env.clone(),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                binds: Some(request.binds.clone()),
                publish_all_ports: Some(request.publish_all_ports),
                ..Default::default()
            }),
            ..Default::default()
        };
        let created = self.docker.create_container(Some(options), config).await?;
        for warning in &created.warnings {
            warn!(name = %request.name, "engine warned on create: {}", warning);
        }
        Ok(created.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker.start_container(id, None::<StartContainerOptions<String>>).await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker.stop_container(id, None::<StopContainerOptions>).await?;
        Ok(())
    }
}

/// The engine matches `name` as an unanchored regex against `/<name>`.
fn exact_name_filter(name: &str) -> String {
    format!("^/{}$", name.replace('.', "\\."))
}
