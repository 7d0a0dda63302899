#![deny(unsafe_code)]

//! Shared test utilities for the turbod workspace.
//!
//! Provides a scriptable host, a recording connector, config builders and
//! tracing helpers so that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member and use it
//! from integration tests under `tests/`:
//!
//! ```toml
//! [dev-dependencies]
//! turbod-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod connector;
pub mod host;
pub mod tracing_setup;

pub use connector::SpyConnector;
pub use host::FakeHost;
