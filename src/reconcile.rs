use crate::engine::{ContainerStatus, Engine, EngineError};
use crate::error::Error;
use crate::spec::ContainerSpec;
use crate::wait::PortWait;

use ::async_std::task;
use ::tracing::{debug, error, info, warn};

/// Engine-assigned id of the container this session started or reused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerHandle {
    id: String,
    name: String,
}

impl ContainerHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Keeps one named container running and remembers it so it can be stopped later.
///
/// A container that is already running under the requested name is reused as is,
/// its image, ports and environment are not compared with the spec.
/// A container that was created but failed to start is removed again, so it
/// does not block the name on the next run.
pub struct Reconciler<E> {
    engine: E,
    container: Option<ContainerHandle>,
}

impl<E: Engine> Reconciler<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, container: None }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn handle(&self) -> Option<&ContainerHandle> {
        self.container.as_ref()
    }

    pub fn start(&mut self, spec: &ContainerSpec) -> Result<ContainerHandle, Error> {
        task::block_on(self.start_async(spec))
    }

    pub async fn start_async(&mut self, spec: &ContainerSpec) -> Result<ContainerHandle, Error> {
        self.remove_exited(&spec.name).await?;
        if let Some(running) = self.find_running(&spec.name).await? {
            self.container = Some(running.clone());
            return Ok(running);
        }
        self.ensure_image(spec).await?;
        let request = spec.create_request();
        let id = self.engine.create_container(&request).await?;
        info!(name = %spec.name, id = %id, image = %request.image, "created container");
        if let Err(err) = self.engine.start_container(&id).await {
            self.discard_created(&id).await;
            return Err(err.into());
        }
        info!(name = %spec.name, id = %id, "started container");
        let handle = ContainerHandle { id, name: spec.name.clone() };
        self.container = Some(handle.clone());
        Ok(handle)
    }

    /// Starts the container, then blocks until its port opens or `wait` times out.
    pub fn start_and_wait(&mut self, spec: &ContainerSpec, wait: &PortWait) -> Result<bool, Error> {
        task::block_on(async {
            self.start_async(spec).await?;
            Ok::<_, Error>(wait.wait_async().await)
        })
    }

    /// Takes over a container started by an earlier session, if it is running.
    pub fn adopt(&mut self, name: &str) -> Result<Option<ContainerHandle>, Error> {
        task::block_on(async {
            let running = self.find_running(name).await?;
            if let Some(handle) = &running {
                self.container = Some(handle.clone());
            }
            Ok::<_, Error>(running)
        })
    }

    /// Does nothing if no container is held. Whether the container really stopped is not checked.
    pub fn stop(&mut self) -> Result<(), Error> {
        task::block_on(self.stop_async())
    }

    pub async fn stop_async(&mut self) -> Result<(), Error> {
        let id = match &self.container {
            Some(container) => container.id.clone(),
            None => return Ok(()),
        };
        info!(id = %id, "stopping container");
        self.engine.stop_container(&id).await?;
        self.container = None;
        Ok(())
    }

    async fn remove_exited(&self, name: &str) -> Result<(), Error> {
        let exited = self.engine.list_containers(ContainerStatus::Exited, name).await
            .map_err(engine_unreachable)?;
        for container in exited {
            info!(id = %container.id, "removing exited container");
            self.engine.remove_container(&container.id).await
                .map_err(engine_unreachable)?;
        }
        Ok(())
    }

    async fn discard_created(&self, id: &str) {
        match self.engine.remove_container(id).await {
            Ok(()) => info!(id, "removed container that failed to start"),
            Err(err) => warn!(id, error = %err, "could not remove container that failed to start"),
        }
    }

    async fn find_running(&self, name: &str) -> Result<Option<ContainerHandle>, Error> {
        let running = self.engine.list_containers(ContainerStatus::Running, name).await
            .map_err(engine_unreachable)?;
        Ok(running.into_iter().next().map(|container| {
            info!(name, id = %container.id, "container is already running");
            ContainerHandle { id: container.id, name: name.to_owned() }
        }))
    }

    async fn ensure_image(&self, spec: &ContainerSpec) -> Result<(), Error> {
        let info = self.engine.info().await.map_err(engine_unreachable)?;
        debug!(server_version = ?info.server_version, containers_running = ?info.containers_running, "container engine info");
        let image = spec.image_ref();
        if !self.engine.list_images(&image).await?.is_empty() {
            return Ok(());
        }
        info!(image = %image, "image is not local, pulling");
        self.engine.pull_image(&spec.image, &spec.tag).await?;
        let images = self.engine.list_images(&image).await?;
        if images.is_empty() {
            error!("image {} not found, unable to automatically pull image, check `docker images`", image);
            return Err(Error::ImageUnavailable { image });
        }
        debug!(image = %image, ids = ?images, "image pulled");
        Ok(())
    }
}

fn engine_unreachable(err: EngineError) -> Error {
    error!(error = %err, "unable to contact docker, make sure docker is up and try again");
    error!("if docker is installed make sure this user has access to the docker group");
    error!("$ sudo gpasswd -a ${{USER}} docker && newgrp docker");
    Error::EngineUnreachable(err)
}
