//! Connector contract.
//!
//! The bootstrapper never talks to a daemon itself. It builds a
//! [`ClientDescriptor`] and hands it to a [`Connector`], which owns everything
//! stateful: dialling, spawning a daemon through the entry point, retrying,
//! version handshakes, cancellation. Any implementation satisfying the trait
//! can be plugged in; [`unix::UnixSocketConnector`] is a minimal dial-only one.

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use turbod_config::ClientConfig;

use crate::BoxFuture;

#[cfg(unix)]
pub mod unix;

/// Options forwarded verbatim to the connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Idle timeout a freshly spawned daemon is started with.
    pub server_timeout: Duration,
    /// Never spawn a daemon.
    pub dont_start: bool,
    /// Never kill a daemon running a mismatched version.
    pub dont_kill: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for ClientOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            server_timeout: Duration::from_secs(config.server_timeout_secs),
            dont_start: config.dont_start,
            dont_kill: config.dont_kill,
        }
    }
}

/// Everything a connector needs to reach one repository's daemon.
///
/// Built fresh for every connection attempt and moved into the connector.
#[derive(Debug, Clone)]
pub struct ClientDescriptor {
    /// Span named `turbod_client`, a child of the caller's span.
    pub span: tracing::Span,
    /// Executable to launch the daemon through.
    pub bin: PathBuf,
    pub options: ClientOptions,
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,
    /// Version of the calling tool, used by the connector's handshake.
    pub tool_version: String,
}

/// Errors returned by a [`Connector`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("daemon is not running (socket not found at {})", .0.display())]
    NotRunning(PathBuf),

    #[error("failed to connect to daemon socket at {}: {source}", .path.display())]
    Dial {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("connection attempt cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ConnectError {
    /// Wrap an arbitrary connector failure.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }
}

/// Turns a [`ClientDescriptor`] into a live client handle.
///
/// Implementations must be `Send + Sync` and must honour `cancel`; the
/// bootstrapper adds no timeout or retry of its own.
pub trait Connector: Send + Sync {
    /// Live handle to the daemon.
    type Client: Send;

    fn connect(
        &self,
        cancel: CancellationToken,
        descriptor: ClientDescriptor,
    ) -> BoxFuture<'_, Result<Self::Client, ConnectError>>;
}
