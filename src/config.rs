//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Crawl Service ===
    /// Base URL of the crawl service API (e.g. `https://fedi.example/api/v1`).
    pub api_url: String,

    // === Server Configuration ===
    /// HTTP port for the page server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Load configuration, letting `api_url` stand in for or override API_URL.
    pub fn load_with_api_url(api_url: Option<String>) -> Result<Self, envy::Error> {
        Self::override_api_url(Self::load(), api_url)
    }

    /// Apply an explicit API URL to a loaded configuration.
    ///
    /// A missing API_URL is filled in by `api_url`; every other environment
    /// error is returned as-is.
    pub fn override_api_url(
        loaded: Result<Self, envy::Error>,
        api_url: Option<String>,
    ) -> Result<Self, envy::Error> {
        match (loaded, api_url) {
            (Ok(mut config), Some(url)) => {
                config.api_url = url;
                Ok(config)
            }
            (Ok(config), None) => Ok(config),
            (Err(envy::Error::MissingValue("api_url")), Some(url)) => Ok(Self::for_api_url(url)),
            (Err(e), _) => Err(e),
        }
    }

    /// Build a configuration pointing at `api_url` with defaults elsewhere.
    pub fn for_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.trim().is_empty() {
            return Err("API_URL is required".to_string());
        }

        let url = Url::parse(&self.api_url)
            .map_err(|e| format!("API_URL is not a valid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "API_URL must use http or https, got {}",
                url.scheme()
            ));
        }

        if url.cannot_be_a_base() {
            return Err("API_URL cannot be used as a base URL".to_string());
        }

        Ok(())
    }

    /// Parsed API base URL, normalised to end with `/` so endpoint
    /// segments are appended under any path prefix.
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(self.api_url.trim())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}
