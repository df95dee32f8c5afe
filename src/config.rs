use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `PROMCHART_PROMETHEUS_URL`
pub const ENV_PREFIX: &str = "PROMCHART";

pub const DEFAULT_URL: &str = "http://localhost:9090";
pub const DEFAULT_WIDTH: u16 = 120;
pub const DEFAULT_HEIGHT: u16 = 30;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub prometheus_url: String,
    pub width: u16,
    pub height: u16,
    pub timeout_seconds: u64,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Values given on the command line; `None` leaves lower layers in charge
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prometheus_url: Option<String>,
    pub width: Option<u16>,
    pub height: Option<u16>,
}

/// Resolve settings from defaults, an optional file, the environment and flags
///
/// Later layers win: defaults < config file < `PROMCHART_*` variables < flags.
/// The file format follows its extension (`.yaml`, `.toml`, `.json`, ...).
pub fn load_settings(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Settings> {
    let mut builder = config::Config::builder()
        .set_default("prometheus_url", DEFAULT_URL)?
        .set_default("width", u64::from(DEFAULT_WIDTH))?
        .set_default("height", u64::from(DEFAULT_HEIGHT))?
        .set_default("timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?;

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .set_override_option("prometheus_url", overrides.prometheus_url.clone())?
        .set_override_option("width", overrides.width.map(u64::from))?
        .set_override_option("height", overrides.height.map(u64::from))?
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    validate_settings(&settings)?;

    Ok(settings)
}

fn validate_settings(settings: &Settings) -> anyhow::Result<()> {
    let url = settings.prometheus_url.trim();
    if url.is_empty() {
        anyhow::bail!("prometheus_url cannot be empty");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!(
            "prometheus_url must start with http:// or https://, got '{}'",
            settings.prometheus_url
        );
    }

    if settings.width == 0 || settings.height == 0 {
        anyhow::bail!(
            "Chart size must be positive, got {}x{}",
            settings.width,
            settings.height
        );
    }

    if settings.timeout_seconds == 0 {
        anyhow::bail!("timeout_seconds must be at least 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_settings() -> Settings {
        Settings {
            prometheus_url: DEFAULT_URL.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    #[test]
    fn test_validate_settings_accepts_defaults() {
        assert!(validate_settings(&create_test_settings()).is_ok());
    }

    #[test]
    fn test_validate_settings_requires_http_url() {
        let mut settings = create_test_settings();
        settings.prometheus_url = "localhost:9090".to_string();

        let result = validate_settings(&settings);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must start with http"));
    }

    #[test]
    fn test_validate_settings_requires_positive_size() {
        let mut settings = create_test_settings();
        settings.height = 0;

        let result = validate_settings(&settings);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Chart size must be positive"));
    }

    #[test]
    fn test_validate_settings_requires_timeout() {
        let mut settings = create_test_settings();
        settings.timeout_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_timeout_duration() {
        assert_eq!(create_test_settings().timeout(), Duration::from_secs(30));
    }
}
