//! Engine-to-wrapper entry point resolution.
//!
//! The tool ships as two binaries: a public wrapper (`turbo`) that owns
//! version negotiation and argument handling, and an internal engine
//! (`go-turbo`) the wrapper delegates to. A daemon must always be launched
//! through the wrapper, so when the engine asks for a daemon client the
//! executable is swapped for the wrapper sitting in the same directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use turbod_config::EntryPointConfig;

/// Platform executable suffix recognised on either side of the swap.
const EXE_SUFFIX: &str = ".exe";

/// How to map the running executable onto the daemon's client entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointRule {
    redirect: Option<Redirect>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Redirect {
    engine: String,
    wrapper: String,
}

impl EntryPointRule {
    /// Redirect `engine` (optionally `engine.exe`) to `wrapper` in the same
    /// directory.
    pub fn new(engine: impl Into<String>, wrapper: impl Into<String>) -> Self {
        Self {
            redirect: Some(Redirect {
                engine: engine.into(),
                wrapper: wrapper.into(),
            }),
        }
    }

    /// Single-binary deployment: the running executable is always the entry
    /// point.
    pub fn disabled() -> Self {
        Self { redirect: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.redirect.is_some()
    }

    /// Resolve the entry point for the executable at `exe`.
    ///
    /// Only an exact file name match counts; `my-go-turbo` is left alone.
    pub fn resolve(&self, exe: &Path) -> PathBuf {
        let Some(redirect) = &self.redirect else {
            return exe.to_path_buf();
        };
        let Some(file_name) = exe.file_name().and_then(|name| name.to_str()) else {
            return exe.to_path_buf();
        };

        let (stem, suffix) = match file_name.strip_suffix(EXE_SUFFIX) {
            Some(stem) => (stem, EXE_SUFFIX),
            None => (file_name, ""),
        };
        if stem != redirect.engine {
            return exe.to_path_buf();
        }

        let wrapper = exe.with_file_name(format!("{}{suffix}", redirect.wrapper));
        debug!(
            engine = %exe.display(),
            wrapper = %wrapper.display(),
            "redirecting daemon entry point to wrapper binary"
        );
        wrapper
    }
}

impl Default for EntryPointRule {
    fn default() -> Self {
        Self::from(&EntryPointConfig::default())
    }
}

impl From<&EntryPointConfig> for EntryPointRule {
    fn from(config: &EntryPointConfig) -> Self {
        if config.redirect {
            Self::new(&config.engine_name, &config.wrapper_name)
        } else {
            Self::disabled()
        }
    }
}
