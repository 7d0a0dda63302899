//! Repository root to discriminator hashing.
//!
//! A repository is identified by a short, stable [`RepoHash`]: the first eight
//! bytes of the SHA-256 digest of its absolute root path, hex encoded. Sixteen
//! hex characters keep the socket path well under the `sun_path` limit while
//! leaving 64 bits of entropy, so two repositories on one machine colliding is
//! a birthday-bound `N² / 2⁶⁴` event.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::paths::PathError;

/// Number of digest bytes kept in a [`RepoHash`].
const HASH_BYTES: usize = 8;

/// Length, in characters, of every [`RepoHash`].
pub const REPO_HASH_LEN: usize = HASH_BYTES * 2;

/// Absolute path of a repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Wrap an absolute path. Relative paths are rejected, since the same
    /// relative path names different repositories from different directories.
    ///
    /// The path is cleaned lexically first: trailing separators and `.`
    /// components are dropped so `/repo/` and `/repo/.` hash like `/repo`.
    /// `..` is kept, since resolving it needs the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, PathError> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(PathError::NotAbsolute(path));
        }
        Ok(Self(path.components().collect()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Final path component, if any. The filesystem root has none.
    ///
    /// Returned as raw OS bytes: log file names must match the daemon's even
    /// when the name is not valid UTF-8.
    pub fn base_name(&self) -> Option<&OsStr> {
        self.0.file_name()
    }
}

impl AsRef<Path> for RepoRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RepoRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Sixteen lowercase hex characters identifying one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RepoHash(String);

impl RepoHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepoHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hash a repository root into its discriminator.
///
/// The input is the path's own byte encoding, which is its UTF-8 form for any
/// path that is valid UTF-8.
pub fn repo_hash(root: &RepoRoot) -> RepoHash {
    let digest = Sha256::digest(root.as_path().as_os_str().as_encoded_bytes());
    RepoHash(hex::encode(&digest[..HASH_BYTES]))
}
