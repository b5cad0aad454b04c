extern crate async_std;
extern crate bollard;
extern crate futures;
extern crate thiserror;
extern crate tracing;
#[macro_use] extern crate maplit;

#[cfg(test)] #[macro_use] extern crate claims;
#[cfg(test)] extern crate rstest;

pub mod docker;
pub mod engine;
pub mod error;
pub mod presets;
pub mod reconcile;
pub mod spec;
pub mod wait;

pub use crate::error::Error;
pub use crate::reconcile::{ContainerHandle, Reconciler};
pub use crate::spec::{ContainerSpec, VolumeBind};
pub use crate::wait::{wait_for_port, PortWait};
