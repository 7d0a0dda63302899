//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use turbod_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .dont_start(true)
///     .single_binary()
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn server_timeout_secs(mut self, secs: u64) -> Self {
        self.config.client.server_timeout_secs = secs;
        self
    }

    pub fn dont_start(mut self, dont_start: bool) -> Self {
        self.config.client.dont_start = dont_start;
        self
    }

    pub fn dont_kill(mut self, dont_kill: bool) -> Self {
        self.config.client.dont_kill = dont_kill;
        self
    }

    pub fn entry_point(mut self, engine: &str, wrapper: &str) -> Self {
        self.config.entry_point.redirect = true;
        self.config.entry_point.engine_name = engine.to_string();
        self.config.entry_point.wrapper_name = wrapper.to_string();
        self
    }

    pub fn single_binary(mut self) -> Self {
        self.config.entry_point.redirect = false;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
