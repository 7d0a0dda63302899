//! Client bootstrap.
//!
//! Resolves the daemon's paths and client entry point for a repository, packs
//! them into a [`ClientDescriptor`], and delegates to a [`Connector`]. The
//! connector is only reached once every resolution step has succeeded, and its
//! result is passed back untouched.

use std::io;

use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info_span};

use crate::connector::{ClientDescriptor, ClientOptions, ConnectError, Connector};
use crate::entry_point::EntryPointRule;
use crate::host::{HostEnvironment, SystemHost};
use crate::paths::{PathError, resolve_paths};
use crate::repo_hash::RepoRoot;

/// Name of the span every descriptor carries.
pub const CLIENT_SPAN_NAME: &str = "turbod_client";

/// Errors from bootstrapping a daemon client, tagged by the failing step.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to resolve daemon paths: {0}")]
    PathResolution(#[from] PathError),

    #[error("failed to determine the running executable: {0}")]
    ExecutableResolution(#[source] io::Error),

    #[error(transparent)]
    Connection(#[from] ConnectError),
}

/// Builds descriptors against a host and hands them to a connector.
///
/// Holds no mutable state, so one bootstrapper can serve any number of
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct ClientBootstrapper<H, C> {
    host: H,
    connector: C,
    entry_point: EntryPointRule,
}

impl<C: Connector> ClientBootstrapper<SystemHost, C> {
    /// Bootstrapper backed by the real operating system.
    pub fn system(connector: C) -> Self {
        Self::new(SystemHost, connector)
    }
}

impl<H: HostEnvironment, C: Connector> ClientBootstrapper<H, C> {
    pub fn new(host: H, connector: C) -> Self {
        Self {
            host,
            connector,
            entry_point: EntryPointRule::default(),
        }
    }

    /// Replace the engine-to-wrapper rule, e.g. with
    /// [`EntryPointRule::disabled`] for single-binary deployments.
    pub fn with_entry_point_rule(mut self, rule: EntryPointRule) -> Self {
        self.entry_point = rule;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Resolve everything the connector needs, without contacting it.
    pub fn describe(
        &self,
        repo_root: &RepoRoot,
        logger: &Span,
        tool_version: &str,
        options: ClientOptions,
    ) -> Result<ClientDescriptor, BootstrapError> {
        let paths = resolve_paths(&self.host, repo_root)?;
        let exe = self
            .host
            .current_exe()
            .map_err(BootstrapError::ExecutableResolution)?;
        let bin = self.entry_point.resolve(&exe);

        let span = info_span!(parent: logger, CLIENT_SPAN_NAME, repo_hash = %paths.repo_hash);
        debug!(
            parent: &span,
            bin = %bin.display(),
            socket = %paths.socket.display(),
            "built daemon client descriptor"
        );

        Ok(ClientDescriptor {
            span,
            bin,
            options,
            socket_path: paths.socket,
            pid_path: paths.pid,
            log_path: paths.log,
            tool_version: tool_version.to_string(),
        })
    }

    /// Resolve the descriptor for `repo_root` and connect through the
    /// connector. `cancel` reaches the connector unchanged.
    pub async fn connect(
        &self,
        cancel: CancellationToken,
        repo_root: &RepoRoot,
        logger: &Span,
        tool_version: &str,
        options: ClientOptions,
    ) -> Result<C::Client, BootstrapError> {
        let descriptor = self.describe(repo_root, logger, tool_version, options)?;
        Ok(self.connector.connect(cancel, descriptor).await?)
    }
}

/// Get a client for the daemon serving `repo_root`, using the real host and
/// the default entry point rule.
pub async fn get_client<C: Connector>(
    cancel: CancellationToken,
    connector: C,
    repo_root: &RepoRoot,
    logger: &Span,
    tool_version: &str,
    options: ClientOptions,
) -> Result<C::Client, BootstrapError> {
    ClientBootstrapper::system(connector)
        .connect(cancel, repo_root, logger, tool_version, options)
        .await
}
