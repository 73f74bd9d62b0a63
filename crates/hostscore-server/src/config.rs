use hostscore_common::i18n::{is_supported_locale, DEFAULT_LOCALE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// JSON array of metric samples.
    pub samples_path: String,
    /// JSON rule catalog (`{"rules": [...]}`). The built-in defaults are
    /// used when omitted.
    #[serde(default)]
    pub rules_path: Option<String>,
    /// Locale for default alert messages: `zh-CN` or `en`.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Length of the look-back window ending at the evaluation instant.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Hosts scored in parallel during fleet runs.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default = "default_include_details")]
    pub include_details: bool,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_window_secs() -> u64 {
    300
}

fn default_max_concurrent() -> usize {
    8
}

fn default_include_details() -> bool {
    true
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config '{}': {}", path, e))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_supported_locale(&self.locale) {
            anyhow::bail!("unsupported locale '{}'", self.locale);
        }
        if self.window_secs == 0 {
            anyhow::bail!("window_secs must be greater than 0");
        }
        if self.max_concurrent == 0 {
            anyhow::bail!("max_concurrent must be greater than 0");
        }
        Ok(())
    }
}
