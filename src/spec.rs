use crate::error::Error;

use ::std::str::FromStr;

/// What the reconciler should keep running. The name is the only lookup key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub tag: String,
    pub name: String,
    pub ports: Vec<u16>,
    pub volumes: Vec<VolumeBind>,
    pub env: Vec<String>,
    pub cmd: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeBind {
    pub host_path: String,
    pub container_path: String,
}

/// Engine-agnostic create parameters derived from a [`ContainerSpec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub image: String,
    pub cmd: Option<Vec<String>>,
    pub env: Option<Vec<String>>,
    pub exposed_ports: Vec<String>,
    pub port_bindings: Vec<PortBinding>,
    pub binds: Vec<String>,
    pub publish_all_ports: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortBinding {
    pub container_port: String,
    pub host_ip: String,
    pub host_port: String,
}

const ALL_INTERFACES: &str = "0.0.0.0";

impl ContainerSpec {
    pub fn new(image: impl Into<String>, tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            tag: tag.into(),
            name: name.into(),
            ports: vec![],
            volumes: vec![],
            env: vec![],
            cmd: vec![],
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.ports.push(port);
        self
    }

    pub fn volume(mut self, desc: &str) -> Result<Self, Error> {
        self.volumes.push(desc.parse()?);
        Ok(self)
    }

    pub fn env(mut self, assignment: impl Into<String>) -> Self {
        self.env.push(assignment.into());
        self
    }

    pub fn cmd(mut self, arg: impl Into<String>) -> Self {
        self.cmd.push(arg.into());
        self
    }

    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// Every port is published on the same host port on all interfaces.
    pub fn create_request(&self) -> CreateRequest {
        let mut exposed_ports: Vec<String> = vec![];
        let mut port_bindings = vec![];
        for port in &self.ports {
            let container_port = format!("{}/tcp", port);
            if exposed_ports.contains(&container_port) {
                continue;
            }
            port_bindings.push(PortBinding {
                container_port: container_port.clone(),
                host_ip: ALL_INTERFACES.to_owned(),
                host_port: port.to_string(),
            });
            exposed_ports.push(container_port);
        }
        let binds = self.volumes.iter()
            .map(|v| format!("{}:{}", v.host_path, v.container_path))
            .collect();
        CreateRequest {
            name: self.name.clone(),
            image: self.image_ref(),
            cmd: non_empty(&self.cmd),
            env: non_empty(&self.env),
            exposed_ports,
            port_bindings,
            binds,
            publish_all_ports: true,
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

impl FromStr for VolumeBind {
    type Err = Error;

    /// `host:container`; anything after a second `:` is ignored.
    fn from_str(desc: &str) -> Result<Self, Error> {
        let mut parts = desc.split(':');
        match (parts.next(), parts.next()) {
            (Some(host), Some(container)) if !host.is_empty() && !container.is_empty() => {
                Ok(VolumeBind {
                    host_path: host.to_owned(),
                    container_path: container.to_owned(),
                })
            }
            _ => Err(Error::InvalidVolume(desc.to_owned())),
        }
    }
}
