//! Configuration builders for tests.

use seedbox_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .daemon_host(&fake.url())
///     .torrent_metrics(true)
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

    pub fn daemon_host(mut self, host: &str) -> Self {
        self.config.daemon.host = host.to_string();
        self
    }

    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.config.daemon.username = username.to_string();
        self.config.daemon.password = password.to_string();
        self
    }

    pub fn listen_port(mut self, port: u16) -> Self {
        self.config.exporter.listen_port = port;
        self
    }

    pub fn torrent_metrics(mut self, enabled: bool) -> Self {
        self.config.exporter.torrent_metrics = enabled;
        self
    }

    pub fn scrape_timeout_secs(mut self, secs: u64) -> Self {
        self.config.exporter.scrape_timeout_secs = secs;
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
