//! The DataStax Distribution of Apache Cassandra container used by integration tests.

use crate::spec::ContainerSpec;
use crate::wait::PortWait;

use ::std::time::Duration;

pub const DDAC_NAME: &str = "ddac";
pub const DDAC_CQL_PORT: u16 = 9042;
pub const DDAC_STARTUP_TIMEOUT: Duration = Duration::from_millis(50_000);

pub fn ddac() -> ContainerSpec {
    ContainerSpec::new("datastax/ddac", "latest", DDAC_NAME)
        .port(DDAC_CQL_PORT)
        .env("DS_LICENSE=accept")
}

pub fn ddac_wait() -> PortWait {
    PortWait::new("localhost", DDAC_CQL_PORT, DDAC_STARTUP_TIMEOUT)
}
