#![deny(unsafe_code)]

//! Locating and connecting to the per-repository `turbod` daemon.
//!
//! Every repository gets exactly one daemon. Clients find it again across
//! process invocations by deriving all of its addresses from the repository
//! root alone:
//!
//! ```text
//! <temp-root>/turbod/<16-hex-hash>/turbod.sock
//! <temp-root>/turbod/<16-hex-hash>/turbod.pid
//! <data-dir>/logs/<16-hex-hash>-<repo-base-name>.log
//! ```
//!
//! [`client::get_client`] is the single entry point. It resolves these paths,
//! works out which executable the daemon must be launched through, and hands
//! the resulting [`ClientDescriptor`] to a [`Connector`]. Spawning, retrying
//! and handshaking are the connector's business, not this crate's.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future, used as the return type of
/// [`Connector::connect`] so connectors stay usable behind `dyn`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Client bootstrap: paths + entry point + connector delegation.
pub mod client;
/// Connector contract and the dial-only Unix socket connector.
pub mod connector;
/// Engine-to-wrapper entry point resolution.
pub mod entry_point;
/// Injectable OS queries (temp dir, data dir, current executable).
pub mod host;
/// Socket, pid and log path derivation.
pub mod paths;
/// Repository root to discriminator hashing.
pub mod repo_hash;

pub use client::{BootstrapError, ClientBootstrapper, get_client};
pub use connector::{ClientDescriptor, ClientOptions, ConnectError, Connector};
pub use entry_point::EntryPointRule;
pub use host::{HostEnvironment, SystemHost};
pub use paths::{DaemonPaths, PathError, resolve_paths};
pub use repo_hash::{RepoHash, RepoRoot, repo_hash};

#[cfg(unix)]
pub use connector::unix::{DaemonConnection, UnixSocketConnector};
