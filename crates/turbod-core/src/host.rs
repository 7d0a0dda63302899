//! Injectable OS queries.
//!
//! Path and entry point resolution only ever *read* three facts from the host:
//! a namespaced temp directory, the per-user data directory, and the path of
//! the running executable. They are gathered behind [`HostEnvironment`] so the
//! resolvers stay pure and can be tested without touching the real machine.

use std::io;
use std::path::PathBuf;

/// Application directory created under the platform data dir.
pub const DATA_DIR_NAME: &str = "turborepo";

/// Read-only queries against the host operating system.
///
/// Implementations must be `Send + Sync`: resolution may run on any thread and
/// holds no lock while calling in.
pub trait HostEnvironment: Send + Sync {
    /// Temp directory reserved for `namespace`, e.g. `/tmp/turbod`.
    fn temp_dir(&self, namespace: &str) -> io::Result<PathBuf>;

    /// Persistent per-user data directory for the tool.
    fn data_dir(&self) -> io::Result<PathBuf>;

    /// Absolute path of the currently running executable.
    fn current_exe(&self) -> io::Result<PathBuf>;
}

/// [`HostEnvironment`] backed by the real operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn temp_dir(&self, namespace: &str) -> io::Result<PathBuf> {
        Ok(std::env::temp_dir().join(namespace))
    }

    fn data_dir(&self) -> io::Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(DATA_DIR_NAME))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "could not determine the user data directory",
                )
            })
    }

    fn current_exe(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }
}
