extern crate dbcontainer;
extern crate structopt;
extern crate tracing;
extern crate tracing_subscriber;

use dbcontainer::docker::DockerEngine;
use dbcontainer::{presets, ContainerSpec, Error, PortWait, Reconciler};

use ::std::process;
use ::std::time::Duration;
use ::structopt::StructOpt;
use ::tracing::{error, info};
use ::tracing_subscriber::EnvFilter;

#[derive(StructOpt)]
#[structopt(name = "dbcontainer", about = "Starts, waits for and stops a single test database container")]
enum Command {
    /// Makes sure the named container is running, optionally waiting for a port
    Up(Up),

    /// Stops the named container if it is running
    Down {
        #[structopt(long = "name")]
        name: String,
    },

    /// Waits until a TCP port accepts connections
    Wait(Wait),

    /// Starts the DDAC container and waits for its CQL port
    Ddac,
}

#[derive(StructOpt)]
struct Up {
    #[structopt(long = "image")]
    image: String,

    #[structopt(long = "tag", default_value = "latest")]
    tag: String,

    #[structopt(long = "name")]
    name: String,

    #[structopt(long = "port", number_of_values = 1)]
    ports: Vec<u16>,

    /// host_path:container_path
    #[structopt(long = "volume", number_of_values = 1)]
    volumes: Vec<String>,

    /// NAME=value
    #[structopt(long = "env", number_of_values = 1)]
    env: Vec<String>,

    #[structopt(long = "wait-host", default_value = "localhost")]
    wait_host: String,

    #[structopt(long = "wait-port")]
    wait_port: Option<u16>,

    #[structopt(long = "timeout-ms", default_value = "50000")]
    timeout_ms: u64,

    /// Command line for the container, after `--`
    #[structopt(last = true)]
    cmd: Vec<String>,
}

#[derive(StructOpt)]
struct Wait {
    #[structopt(long = "host", default_value = "localhost")]
    host: String,

    #[structopt(long = "port")]
    port: u16,

    #[structopt(long = "timeout-ms", default_value = "50000")]
    timeout_ms: u64,

    #[structopt(long = "quiet")]
    quiet: bool,
}

impl Up {
    fn spec(&self) -> Result<ContainerSpec, Error> {
        let mut spec = ContainerSpec::new(self.image.as_str(), self.tag.as_str(), self.name.as_str());
        for port in &self.ports {
            spec = spec.port(*port);
        }
        for volume in &self.volumes {
            spec = spec.volume(volume)?;
        }
        for assignment in &self.env {
            spec = spec.env(assignment.as_str());
        }
        for arg in &self.cmd {
            spec = spec.cmd(arg.as_str());
        }
        Ok(spec)
    }
}

fn connect() -> Result<Reconciler<DockerEngine>, Error> {
    let engine = DockerEngine::connect().map_err(Error::EngineUnreachable)?;
    Ok(Reconciler::new(engine))
}

/// `Ok(false)` means the awaited port never opened.
fn run(command: Command) -> Result<bool, Error> {
    match command {
        Command::Up(up) => {
            let spec = up.spec()?;
            let mut reconciler = connect()?;
            let handle = reconciler.start(&spec)?;
            println!("{}", handle.id());
            Ok(match up.wait_port {
                Some(port) => PortWait::new(up.wait_host, port, Duration::from_millis(up.timeout_ms)).wait(),
                None => true,
            })
        }
        Command::Down { name } => {
            let mut reconciler = connect()?;
            if reconciler.adopt(&name)?.is_none() {
                info!(name = %name, "no running container to stop");
            }
            reconciler.stop()?;
            Ok(true)
        }
        Command::Wait(wait) => {
            let timeout = Duration::from_millis(wait.timeout_ms);
            Ok(PortWait::new(wait.host, wait.port, timeout).quiet(wait.quiet).wait())
        }
        Command::Ddac => {
            let mut reconciler = connect()?;
            reconciler.start_and_wait(&presets::ddac(), &presets::ddac_wait())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

fn main() {
    init_tracing();
    let code = match run(Command::from_args()) {
        Ok(true) => 0,
        Ok(false) => 2,
        Err(err) => {
            error!(fatal = err.is_fatal(), "{}", err);
            1
        }
    };
    process::exit(code);
}
