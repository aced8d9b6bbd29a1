use crate::application::scheduler::Cadence;
use anyhow::{Context, ensure};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub refresh: RefreshSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    /// Root of the host-metrics API, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    /// Preset that counts as "live" and is auto-refreshed.
    pub default_range: String,
    pub history_interval_secs: u64,
    pub status_interval_secs: u64,
    pub services_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelTimezone {
    Local,
    Utc,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    pub label_timezone: LabelTimezone,
    pub notification_capacity: usize,
    /// Buffered dashboard events per stream subscriber.
    pub event_capacity: usize,
}

impl AppConfig {
    pub fn cadence(&self) -> Cadence {
        Cadence {
            history: Duration::from_secs(self.refresh.history_interval_secs),
            status: Duration::from_secs(self.refresh.status_interval_secs),
            services: Duration::from_secs(self.refresh.services_interval_secs),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.backend.base_url.starts_with("http://")
                || self.backend.base_url.starts_with("https://"),
            "backend.base_url must be an http(s) URL, got {:?}",
            self.backend.base_url
        );
        ensure!(
            !self.refresh.default_range.trim().is_empty(),
            "refresh.default_range must be non-empty"
        );
        for (name, secs) in [
            ("history_interval_secs", self.refresh.history_interval_secs),
            ("status_interval_secs", self.refresh.status_interval_secs),
            ("services_interval_secs", self.refresh.services_interval_secs),
        ] {
            ensure!(secs > 0, "refresh.{} must be > 0, got {}", name, secs);
        }
        ensure!(
            self.display.event_capacity > 0,
            "display.event_capacity must be > 0"
        );
        Ok(())
    }
}

fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("server.listen_addr", "0.0.0.0:8080")?
        .set_default("backend.base_url", "http://127.0.0.1:5000")?
        .set_default("refresh.default_range", "today")?
        .set_default("refresh.history_interval_secs", 60)?
        .set_default("refresh.status_interval_secs", 5)?
        .set_default("refresh.services_interval_secs", 30)?
        .set_default("display.label_timezone", "local")?
        .set_default("display.notification_capacity", 50)?
        .set_default("display.event_capacity", 256)?)
}

/// Defaults, then `config/dashboard.{toml,yaml,json}` if present, then
/// `HOSTDASH__SECTION__KEY` environment overrides.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = defaults()?
        .add_source(File::with_name("config/dashboard").required(false))
        .add_source(
            Environment::with_prefix("HOSTDASH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to load dashboard configuration")?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Parse a TOML document on top of the defaults.
#[cfg(test)]
pub fn load_app_config_from_str(toml: &str) -> anyhow::Result<AppConfig> {
    let settings = defaults()?
        .add_source(File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
