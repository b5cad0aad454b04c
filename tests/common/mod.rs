use dbcontainer::docker::DockerEngine;
use dbcontainer::engine::{ContainerStatus, Engine};
use dbcontainer::{ContainerSpec, Reconciler};

use ::async_std::task;

pub const REDIS_IMAGE: &str = "redis";
pub const REDIS_TAG: &str = "7-alpine";

/// Redis listening on `port`, published on the same host port.
pub fn redis_spec(name: &str, port: u16) -> ContainerSpec {
    ContainerSpec::new(REDIS_IMAGE, REDIS_TAG, name)
        .port(port)
        .cmd("redis-server")
        .cmd("--port")
        .cmd(port.to_string())
}

pub fn reconciler() -> Reconciler<DockerEngine> {
    let engine = DockerEngine::connect().expect("could not connect to docker");
    Reconciler::new(engine)
}

/// Stops and removes every container named `name`, ignoring errors.
pub fn remove_all(name: &str) {
    let engine = DockerEngine::connect().expect("could not connect to docker");
    task::block_on(async {
        for status in &[ContainerStatus::Running, ContainerStatus::Exited] {
            let containers = engine.list_containers(*status, name).await.unwrap_or_default();
            for container in containers {
                let _ = engine.stop_container(&container.id).await;
                let _ = engine.remove_container(&container.id).await;
            }
        }
    });
}

/// Cleans up on drop, so a failed assertion does not leak the container.
pub struct Cleanup(pub &'static str);

impl Drop for Cleanup {
    fn drop(&mut self) {
        remove_all(self.0);
    }
}
