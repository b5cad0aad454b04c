use crate::engine::EngineError;

use ::thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Listing or inspecting containers failed, nothing else can work in this session.
    #[error("unable to contact the container engine: {0}")]
    EngineUnreachable(#[source] EngineError),

    #[error("image {image} not found, unable to automatically pull it")]
    ImageUnavailable { image: String },

    #[error("container engine call failed: {0}")]
    Engine(#[from] EngineError),

    #[error("invalid volume descriptor {0:?}, expected host_path:container_path")]
    InvalidVolume(String),
}

impl Error {
    /// Fatal errors mean the environment is broken; the top-level caller should abort.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::EngineUnreachable(_) | Error::ImageUnavailable { .. } => true,
            Error::Engine(_) | Error::InvalidVolume(_) => false,
        }
    }
}
