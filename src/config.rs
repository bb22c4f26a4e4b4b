//! Configuration management for the `StoreWeather` service
//!
//! Handles loading configuration from an optional TOML file layered under
//! `STOREWEATHER_*` environment variables, and validates every setting.

use crate::StoreWeatherError;
use crate::models::WeatherProvider;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `StoreWeather` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreWeatherConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// JWT validation settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Document store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Weather provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Address geocoding settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for handling one inbound request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret for bearer tokens
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `fjall` (on disk) or `memory`
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Database directory for the `fjall` backend
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Settings for a single weather provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API key
    pub api_key: Option<String>,
    /// Base URL, empty means the provider's public endpoint
    #[serde(default)]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    /// Maximum in-flight requests to this provider
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: u32,
    /// Retries for transient failures, zero disables retrying
    #[serde(default)]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_google_provider")]
    pub google: ProviderConfig,
    #[serde(default = "default_weatherapi_provider")]
    pub weatherapi: ProviderConfig,
    #[serde(default = "default_openweather_provider")]
    pub openweather: ProviderConfig,
    #[serde(default = "default_visualcrossing_provider")]
    pub visualcrossing: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Google Maps key, falls back to the Google weather key
    pub api_key: Option<String>,
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u32 {
    60
}

fn default_storage_backend() -> String {
    "fjall".to_string()
}

fn default_storage_path() -> String {
    "data/storeweather".to_string()
}

fn default_provider_timeout() -> u32 {
    10
}

fn default_max_concurrent_requests() -> u32 {
    16
}

fn default_geocoding_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Public endpoint of each provider
#[must_use]
pub fn default_base_url(provider: WeatherProvider) -> &'static str {
    match provider {
        WeatherProvider::Google => "https://weather.googleapis.com",
        WeatherProvider::WeatherApi => "https://api.weatherapi.com",
        WeatherProvider::OpenWeather => "https://api.openweathermap.org",
        WeatherProvider::VisualCrossing => "https://weather.visualcrossing.com",
    }
}

fn default_provider(provider: WeatherProvider) -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: default_base_url(provider).to_string(),
        timeout_seconds: default_provider_timeout(),
        max_concurrent_requests: default_max_concurrent_requests(),
        max_retries: 0,
    }
}

fn default_google_provider() -> ProviderConfig {
    default_provider(WeatherProvider::Google)
}

fn default_weatherapi_provider() -> ProviderConfig {
    default_provider(WeatherProvider::WeatherApi)
}

fn default_openweather_provider() -> ProviderConfig {
    default_provider(WeatherProvider::OpenWeather)
}

fn default_visualcrossing_provider() -> ProviderConfig {
    default_provider(WeatherProvider::VisualCrossing)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            google: default_google_provider(),
            weatherapi: default_weatherapi_provider(),
            openweather: default_openweather_provider(),
            visualcrossing: default_visualcrossing_provider(),
        }
    }
}

impl ProvidersConfig {
    #[must_use]
    pub fn get(&self, provider: WeatherProvider) -> &ProviderConfig {
        match provider {
            WeatherProvider::Google => &self.google,
            WeatherProvider::WeatherApi => &self.weatherapi,
            WeatherProvider::OpenWeather => &self.openweather,
            WeatherProvider::VisualCrossing => &self.visualcrossing,
        }
    }

    /// Providers that will send requests without a key
    #[must_use]
    pub fn missing_keys(&self) -> Vec<WeatherProvider> {
        WeatherProvider::ALL
            .into_iter()
            .filter(|p| self.get(*p).api_key.is_none())
            .collect()
    }

    pub fn get_mut(&mut self, provider: WeatherProvider) -> &mut ProviderConfig {
        match provider {
            WeatherProvider::Google => &mut self.google,
            WeatherProvider::WeatherApi => &mut self.weatherapi,
            WeatherProvider::OpenWeather => &mut self.openweather,
            WeatherProvider::VisualCrossing => &mut self.visualcrossing,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_provider_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl StoreWeatherConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(Self::get_config_path);

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // STOREWEATHER_PROVIDERS__WEATHERAPI__API_KEY -> providers.weatherapi.api_key
        builder = builder.add_source(
            Environment::with_prefix("STOREWEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: StoreWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// `STOREWEATHER_CONFIG` if set, otherwise `config/default.toml`
    #[must_use]
    pub fn get_config_path() -> PathBuf {
        std::env::var("STOREWEATHER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.storage.backend.is_empty() {
            self.storage.backend = default_storage_backend();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        for provider in WeatherProvider::ALL {
            let settings = self.providers.get_mut(provider);
            if settings.base_url.is_empty() {
                settings.base_url = default_base_url(provider).to_string();
            }
            if settings.timeout_seconds == 0 {
                settings.timeout_seconds = default_provider_timeout();
            }
            if settings.max_concurrent_requests == 0 {
                settings.max_concurrent_requests = default_max_concurrent_requests();
            }
        }
        if self.geocoding.api_key.is_none() {
            self.geocoding.api_key = self.providers.google.api_key.clone();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_provider_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_secrets()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate keys and credentials
    pub fn validate_secrets(&self) -> Result<()> {
        if let Some(secret) = &self.auth.secret_key {
            if secret.len() < 8 {
                return Err(StoreWeatherError::config(
                    "Auth secret key appears to be invalid (too short). Use at least 8 characters.",
                )
                .into());
            }
        }

        for provider in WeatherProvider::ALL {
            if let Some(api_key) = &self.providers.get(provider).api_key {
                if api_key.is_empty() {
                    return Err(StoreWeatherError::config(format!(
                        "{provider} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(StoreWeatherError::config("Server port cannot be 0").into());
        }

        if self.server.request_timeout_seconds > 600 {
            return Err(StoreWeatherError::config(
                "Server request timeout cannot exceed 600 seconds",
            )
            .into());
        }

        for provider in WeatherProvider::ALL {
            let settings = self.providers.get(provider);
            if settings.timeout_seconds > 300 {
                return Err(StoreWeatherError::config(format!(
                    "{provider} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
            if settings.max_concurrent_requests > 1000 {
                return Err(StoreWeatherError::config(format!(
                    "{provider} max concurrent requests cannot exceed 1000"
                ))
                .into());
            }
            if settings.max_retries > 10 {
                return Err(StoreWeatherError::config(format!(
                    "{provider} max retries cannot exceed 10"
                ))
                .into());
            }
        }

        if self.geocoding.timeout_seconds > 300 {
            return Err(StoreWeatherError::config(
                "Geocoding timeout cannot exceed 300 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(StoreWeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(StoreWeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_backends = ["fjall", "memory"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(StoreWeatherError::config(format!(
                "Invalid storage backend '{}'. Must be one of: {}",
                self.storage.backend,
                valid_backends.join(", ")
            ))
            .into());
        }

        for provider in WeatherProvider::ALL {
            if !is_http_url(&self.providers.get(provider).base_url) {
                return Err(StoreWeatherError::config(format!(
                    "{provider} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if !is_http_url(&self.geocoding.base_url) {
            return Err(StoreWeatherError::config(
                "Geocoding base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = StoreWeatherConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, "fjall");
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.providers.weatherapi.base_url,
            "https://api.weatherapi.com"
        );
        assert_eq!(config.providers.openweather.max_retries, 0);
        assert!(config.auth.secret_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let mut config = StoreWeatherConfig::default();
        config.auth.secret_key = Some("short".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_empty_api_key() {
        let mut config = StoreWeatherConfig::default();
        config.providers.visualcrossing.api_key = Some(String::new());
        let result = config.validate_secrets();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = StoreWeatherConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = StoreWeatherConfig::default();
        config.providers.google.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = StoreWeatherConfig::default();
        config.providers.openweather.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_blanks_and_shares_google_key() {
        let mut config = StoreWeatherConfig::default();
        config.providers.weatherapi.base_url = String::new();
        config.providers.weatherapi.max_concurrent_requests = 0;
        config.providers.google.api_key = Some("google-maps-key".to_string());
        config.apply_defaults();

        assert_eq!(
            config.providers.weatherapi.base_url,
            default_base_url(WeatherProvider::WeatherApi)
        );
        assert_eq!(config.providers.weatherapi.max_concurrent_requests, 16);
        assert_eq!(config.geocoding.api_key.as_deref(), Some("google-maps-key"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[storage]
backend = "memory"

[providers.weatherapi]
api_key = "weatherapi-test-key"
timeout_seconds = 5
"#
        )
        .unwrap();

        let config = StoreWeatherConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(
            config.providers.weatherapi.api_key.as_deref(),
            Some("weatherapi-test-key")
        );
        assert_eq!(config.providers.weatherapi.timeout_seconds, 5);
        assert_eq!(
            config.providers.weatherapi.base_url,
            "https://api.weatherapi.com"
        );
        assert_eq!(config.providers.google.timeout_seconds, 10);
    }

    #[test]
    fn test_providers_missing_keys() {
        let mut config = StoreWeatherConfig::default();
        config.providers.google.api_key = Some("k".repeat(20));
        let missing = config.providers.missing_keys();
        assert_eq!(missing.len(), 3);
        assert!(!missing.contains(&WeatherProvider::Google));
    }
}
