//! Session configuration.
//!
//! Values come from the environment (optionally through a `.env` file) or are
//! assembled in code with [`ConfigBuilder`].

use crate::consts::*;
use crate::error::ConfigError;
use std::time::Duration;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct Config {
    base_url: String,
    tunnel_header: Option<(String, String)>,
    frame_cadence: Duration,
    audio_cadence: Duration,
    request_timeout: Duration,
    log_level: Level,
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_tunnel_header(mut self, name: &str, value: &str) -> Self {
        self.config.tunnel_header = Some((name.to_string(), value.to_string()));
        self
    }

    pub fn without_tunnel_header(mut self) -> Self {
        self.config.tunnel_header = None;
        self
    }

    pub fn with_frame_cadence(mut self, cadence: Duration) -> Self {
        self.config.frame_cadence = cadence;
        self
    }

    pub fn with_audio_cadence(mut self, cadence: Duration) -> Self {
        self.config.audio_cadence = cadence;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn with_log_level(mut self, level: Level) -> Self {
        self.config.log_level = level;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tunnel_header: Some((TUNNEL_BYPASS_HEADER.to_string(), TUNNEL_BYPASS_VALUE.to_string())),
            frame_cadence: Duration::from_millis(FRAME_CADENCE_MS),
            audio_cadence: Duration::from_millis(AUDIO_CADENCE_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            log_level: Level::INFO,
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Loads configuration from environment variables.
    ///
    // *   `MOODCAST_BASE_URL`: HTTP base of the analysis service. Defaults to "http://127.0.0.1:8000".
    // *   `MOODCAST_TUNNEL_HEADER` / `MOODCAST_TUNNEL_VALUE`: header sent with every request. An empty name disables it.
    // *   `MOODCAST_FRAME_CADENCE_MS`, `MOODCAST_AUDIO_CADENCE_MS`: sampling periods.
    // *   `MOODCAST_REQUEST_TIMEOUT_SECS`: timeout of catalog calls.
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::new();

        if let Some(base_url) = lookup("MOODCAST_BASE_URL") {
            builder = builder.with_base_url(&base_url);
        }

        match lookup("MOODCAST_TUNNEL_HEADER") {
            Some(name) if name.trim().is_empty() => builder = builder.without_tunnel_header(),
            Some(name) => {
                let value = lookup("MOODCAST_TUNNEL_VALUE").unwrap_or_else(|| TUNNEL_BYPASS_VALUE.to_string());
                builder = builder.with_tunnel_header(name.trim(), &value);
            }
            None => {}
        }

        if let Some(ms) = parse_u64(&lookup, "MOODCAST_FRAME_CADENCE_MS")? {
            builder = builder.with_frame_cadence(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_u64(&lookup, "MOODCAST_AUDIO_CADENCE_MS")? {
            builder = builder.with_audio_cadence(Duration::from_millis(ms));
        }
        if let Some(secs) = parse_u64(&lookup, "MOODCAST_REQUEST_TIMEOUT_SECS")? {
            builder = builder.with_request_timeout(Duration::from_secs(secs));
        }

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(builder.with_log_level(log_level).build())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tunnel_header(&self) -> Option<(&str, &str)> {
        self.tunnel_header
            .as_ref()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn frame_cadence(&self) -> Duration {
        self.frame_cadence
    }

    pub fn audio_cadence(&self) -> Duration {
        self.audio_cadence
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn log_level(&self) -> Level {
        self.log_level
    }

    /// Full URL of an HTTP endpoint.
    pub fn http_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Full URL of a stream endpoint: the base URL with its `http` scheme
    /// swapped for `ws` (`https` becomes `wss`).
    pub fn stream_url(&self, path: &str) -> String {
        let base = match self.base_url.strip_prefix("http") {
            Some(rest) => format!("ws{rest}"),
            None => self.base_url.clone(),
        };
        format!("{base}{path}")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
