//! Socket, pid and log path derivation.
//!
//! All daemon addresses are pure functions of the [`RepoHash`] and two
//! host-provided roots. Nothing here touches the filesystem: directories are
//! owned and created by the daemon and the connector.
//!
//! ```text
//! <temp-root>/turbod/<hash>/turbod.sock
//! <temp-root>/turbod/<hash>/turbod.pid
//! <data-dir>/logs/<hash>-<repo-base-name>.log
//! ```
//!
//! The log lives outside the daemon file root so it survives when the temp
//! directory is cleaned.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::host::HostEnvironment;
use crate::repo_hash::{RepoHash, RepoRoot, repo_hash};

/// Temp-dir namespace shared by every daemon on the machine.
pub const DAEMON_NAMESPACE: &str = "turbod";
/// Socket file name inside the daemon file root.
pub const SOCKET_FILE_NAME: &str = "turbod.sock";
/// Pid file name inside the daemon file root.
pub const PID_FILE_NAME: &str = "turbod.pid";
/// Directory under the data dir holding daemon logs.
pub const LOGS_DIR_NAME: &str = "logs";

/// Size of `sockaddr_un.sun_path` on this platform, terminating NUL included.
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
const SUN_PATH_LEN: usize = 104;
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
)))]
const SUN_PATH_LEN: usize = 108;

/// Longest socket path, in bytes, that can be bound on this platform.
pub const MAX_SOCKET_PATH_LEN: usize = SUN_PATH_LEN - 1;

/// Errors from resolving daemon paths.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("repository root must be an absolute path, got {}", .0.display())]
    NotAbsolute(PathBuf),

    #[error("could not determine temp directory for {namespace:?}: {source}")]
    TempDir {
        namespace: &'static str,
        source: io::Error,
    },

    #[error("could not determine data directory: {0}")]
    DataDir(#[source] io::Error),

    #[error(
        "socket path {} is {len} bytes, longer than the {max}-byte limit for unix sockets",
        .path.display()
    )]
    SocketPathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

/// Every address of one repository's daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonPaths {
    pub repo_hash: RepoHash,
    pub daemon_root: PathBuf,
    pub socket: PathBuf,
    pub pid: PathBuf,
    pub log: PathBuf,
}

/// `<temp-root>/turbod/<hash>`, the parent of the socket and pid file.
pub fn daemon_file_root(
    host: &impl HostEnvironment,
    root: &RepoRoot,
) -> Result<PathBuf, PathError> {
    root_for_hash(host, &repo_hash(root))
}

/// `<temp-root>/turbod/<hash>/turbod.sock`.
pub fn socket_path(host: &impl HostEnvironment, root: &RepoRoot) -> Result<PathBuf, PathError> {
    Ok(daemon_file_root(host, root)?.join(SOCKET_FILE_NAME))
}

/// `<temp-root>/turbod/<hash>/turbod.pid`.
pub fn pid_path(host: &impl HostEnvironment, root: &RepoRoot) -> Result<PathBuf, PathError> {
    Ok(daemon_file_root(host, root)?.join(PID_FILE_NAME))
}

/// `<data-dir>/logs/<hash>-<repo-base-name>.log`.
pub fn log_path(host: &impl HostEnvironment, root: &RepoRoot) -> Result<PathBuf, PathError> {
    log_for_hash(host, root, &repo_hash(root))
}

/// Resolve socket, pid and log paths for `root` in one pass.
///
/// Fails only when the host cannot report its temp or data directory; the
/// host's error is carried through untouched.
pub fn resolve_paths(
    host: &impl HostEnvironment,
    root: &RepoRoot,
) -> Result<DaemonPaths, PathError> {
    let hash = repo_hash(root);
    let daemon_root = root_for_hash(host, &hash)?;
    let log = log_for_hash(host, root, &hash)?;

    debug!(
        repo = %root,
        repo_hash = %hash,
        daemon_root = %daemon_root.display(),
        "resolved daemon paths"
    );

    Ok(DaemonPaths {
        socket: daemon_root.join(SOCKET_FILE_NAME),
        pid: daemon_root.join(PID_FILE_NAME),
        daemon_root,
        log,
        repo_hash: hash,
    })
}

/// Reject socket paths that cannot be bound on this platform.
///
/// The discriminator is already as short as it gets, so an over-long path
/// means the temp root itself is too deep; there is nothing left to truncate.
pub fn check_socket_path(path: &Path) -> Result<(), PathError> {
    let len = path.as_os_str().as_encoded_bytes().len();
    if len > MAX_SOCKET_PATH_LEN {
        return Err(PathError::SocketPathTooLong {
            path: path.to_path_buf(),
            len,
            max: MAX_SOCKET_PATH_LEN,
        });
    }
    Ok(())
}

fn root_for_hash(host: &impl HostEnvironment, hash: &RepoHash) -> Result<PathBuf, PathError> {
    let temp = host
        .temp_dir(DAEMON_NAMESPACE)
        .map_err(|source| PathError::TempDir {
            namespace: DAEMON_NAMESPACE,
            source,
        })?;
    Ok(temp.join(hash.as_str()))
}

fn log_for_hash(
    host: &impl HostEnvironment,
    root: &RepoRoot,
    hash: &RepoHash,
) -> Result<PathBuf, PathError> {
    let data = host.data_dir().map_err(PathError::DataDir)?;
    let mut file_name = OsString::from(hash.as_str());
    if let Some(base) = root.base_name() {
        file_name.push("-");
        file_name.push(base);
    }
    file_name.push(".log");
    Ok(data.join(LOGS_DIR_NAME).join(file_name))
}
