//! Scriptable [`HostEnvironment`] for tests.
//!
//! Every query answers from a fixed value, or fails with a chosen error so
//! tests can drive each resolution failure without touching the real machine.

use std::io;
use std::path::PathBuf;

use turbod_core::HostEnvironment;

/// A fake host with fixed temp root, data dir and executable path.
///
/// # Example
///
/// ```ignore
/// let host = FakeHost::new()
///     .exe("/usr/local/bin/go-turbo")
///     .without_data_dir();
/// ```
#[derive(Debug, Clone)]
pub struct FakeHost {
    temp_root: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    exe: Option<PathBuf>,
}

impl FakeHost {
    /// `/tmp`, `/home/user/.local/share/turborepo`, `/usr/local/bin/turbo`.
    pub fn new() -> Self {
        Self {
            temp_root: Some(PathBuf::from("/tmp")),
            data_dir: Some(PathBuf::from("/home/user/.local/share/turborepo")),
            exe: Some(PathBuf::from("/usr/local/bin/turbo")),
        }
    }

    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(dir.into());
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn exe(mut self, exe: impl Into<PathBuf>) -> Self {
        self.exe = Some(exe.into());
        self
    }

    pub fn without_temp_dir(mut self) -> Self {
        self.temp_root = None;
        self
    }

    pub fn without_data_dir(mut self) -> Self {
        self.data_dir = None;
        self
    }

    pub fn without_exe(mut self) -> Self {
        self.exe = None;
        self
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEnvironment for FakeHost {
    fn temp_dir(&self, namespace: &str) -> io::Result<PathBuf> {
        self.temp_root
            .as_ref()
            .map(|root| root.join(namespace))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "temp dir unavailable"))
    }

    fn data_dir(&self) -> io::Result<PathBuf> {
        self.data_dir
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "data dir unavailable"))
    }

    fn current_exe(&self) -> io::Result<PathBuf> {
        self.exe
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable path unavailable"))
    }
}
