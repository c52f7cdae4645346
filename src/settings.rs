use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://zone-xsec.com";
const DEFAULT_USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/14.0.3 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/88.0.4324.96 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
];

/// Runtime settings, overridable through `DEFACE_*` environment variables.
///
/// `DEFACE_USER_AGENTS` takes a `|`-separated list.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub user_agents: Vec<String>,
    pub timeout_secs: u64,
    pub log_file: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder().add_source(
                Environment::with_prefix("DEFACE")
                    .try_parsing(true)
                    .list_separator("|")
                    .with_list_parse_key("user_agents"),
            ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings: Self = builder
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("user_agents", DEFAULT_USER_AGENTS.to_vec())?
            .set_default("timeout_secs", 10)?
            .set_default("log_file", "debug.log")?
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        if settings.user_agents.is_empty() {
            bail!("user_agents must list at least one User-Agent");
        }
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
