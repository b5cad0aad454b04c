use ::async_std::future;
use ::async_std::net::TcpStream;
use ::async_std::task;
use ::std::time::{Duration, Instant};
use ::tracing::{debug, info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Polls a TCP port until it accepts a connection or the timeout runs out.
///
/// Only plain connection establishment is checked, nothing is sent.
#[derive(Clone, Debug)]
pub struct PortWait {
    hostname: String,
    port: u16,
    timeout: Duration,
    quiet: bool,
    interval: Duration,
}

impl PortWait {
    pub fn new(hostname: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            timeout,
            quiet: false,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Suppresses the warning logged when the port never opens.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn wait(&self) -> bool {
        task::block_on(self.wait_async())
    }

    /// Dropping the future cancels both the pending attempt and the sleep.
    pub async fn wait_async(&self) -> bool {
        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                break;
            }
            debug!(host = %self.hostname, port = self.port, "checking port");
            let attempt = TcpStream::connect((self.hostname.as_str(), self.port));
            match future::timeout(self.timeout - elapsed, attempt).await {
                Ok(Ok(stream)) => {
                    drop(stream);
                    info!("connected to {}:{}", self.hostname, self.port);
                    return true;
                }
                Ok(Err(err)) => {
                    debug!(host = %self.hostname, port = self.port, error = %err, "port is not open yet");
                }
                Err(_) => {
                    debug!(host = %self.hostname, port = self.port, "connection attempt timed out");
                }
            }
            task::sleep(self.interval).await;
        }
        if !self.quiet {
            warn!("failed to connect to {}:{} after {} sec", self.hostname, self.port, self.timeout.as_secs());
        }
        false
    }
}

/// Blocking shortcut for a one-off [`PortWait`] with the default interval.
pub fn wait_for_port(hostname: &str, port: u16, timeout: Duration, quiet: bool) -> bool {
    PortWait::new(hostname, port, timeout).quiet(quiet).wait()
}
