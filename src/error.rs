//! Error types and handling for the `StoreWeather` service

use thiserror::Error;

/// Machine-readable error codes carried in every error envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    LocationNotFound,
    LocationAlreadyExists,
    GeocodingFailed,
    UpstreamHttpError,
    UpstreamParseError,
    Storage,
    Config,
    GenericFailure,
}

impl ErrorCode {
    /// Numeric code exposed as `error_code` on the wire
    #[must_use]
    pub fn as_u16(self) -> u16 {
        match self {
            ErrorCode::Validation => 1000,
            ErrorCode::Unauthorized => 1001,
            ErrorCode::LocationNotFound => 2001,
            ErrorCode::LocationAlreadyExists => 2002,
            ErrorCode::GeocodingFailed => 2003,
            ErrorCode::UpstreamHttpError => 3001,
            ErrorCode::UpstreamParseError => 3002,
            ErrorCode::Storage => 4001,
            ErrorCode::Config => 4002,
            ErrorCode::GenericFailure => 5000,
        }
    }

    /// HTTP status used when this code reaches a caller
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::Validation => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::LocationNotFound => 404,
            ErrorCode::LocationAlreadyExists => 409,
            ErrorCode::GeocodingFailed => 422,
            ErrorCode::UpstreamHttpError | ErrorCode::UpstreamParseError => 502,
            ErrorCode::Storage | ErrorCode::Config | ErrorCode::GenericFailure => 500,
        }
    }
}

/// Main error type for the `StoreWeather` service
#[derive(Error, Debug)]
pub enum StoreWeatherError {
    /// No stored coordinates for the requested group
    #[error("Location not found for group_id: {group_id}")]
    LocationNotFound { group_id: String },

    /// A location with this group id is already stored
    #[error("Location already exists for group_id: {group_id}")]
    LocationAlreadyExists { group_id: String },

    /// Address could not be turned into coordinates
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// Provider answered with a non-2xx status
    #[error("{provider} API error: {status}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    /// Provider could not be reached at all
    #[error("Failed to reach {provider} API: {message}")]
    Transport { provider: String, message: String },

    /// Provider answered but the payload lacks the expected structure
    #[error("Invalid {provider} response: {message}")]
    Parse { provider: String, message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    /// Document store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl StoreWeatherError {
    pub fn location_not_found<S: Into<String>>(group_id: S) -> Self {
        Self::LocationNotFound {
            group_id: group_id.into(),
        }
    }

    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    pub fn parse<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Parse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn transport<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// The tag callers branch on
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreWeatherError::LocationNotFound { .. } => ErrorCode::LocationNotFound,
            StoreWeatherError::LocationAlreadyExists { .. } => ErrorCode::LocationAlreadyExists,
            StoreWeatherError::Geocoding { .. } => ErrorCode::GeocodingFailed,
            StoreWeatherError::Upstream { .. } | StoreWeatherError::Transport { .. } => {
                ErrorCode::UpstreamHttpError
            }
            StoreWeatherError::Parse { .. } => ErrorCode::UpstreamParseError,
            StoreWeatherError::Validation { .. } => ErrorCode::Validation,
            StoreWeatherError::Unauthorized { .. } => ErrorCode::Unauthorized,
            StoreWeatherError::Storage { .. } => ErrorCode::Storage,
            StoreWeatherError::Config { .. } => ErrorCode::Config,
            StoreWeatherError::General { .. } => ErrorCode::GenericFailure,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            StoreWeatherError::Storage { .. } => {
                "Database operation failed. Please try again later.".to_string()
            }
            StoreWeatherError::Config { .. } => {
                "Service is misconfigured. Please contact support.".to_string()
            }
            StoreWeatherError::Transport { provider, .. } => {
                format!("Unable to connect to the {provider} weather service.")
            }
            other => other.to_string(),
        }
    }
}

impl From<postcard::Error> for StoreWeatherError {
    fn from(err: postcard::Error) -> Self {
        StoreWeatherError::storage(format!("Failed to decode document: {err}"))
    }
}

impl From<fjall::Error> for StoreWeatherError {
    fn from(err: fjall::Error) -> Self {
        StoreWeatherError::storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreWeatherError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreWeatherError::general(format!("Background task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let not_found = StoreWeatherError::location_not_found("G2");
        assert!(matches!(not_found, StoreWeatherError::LocationNotFound { .. }));
        assert_eq!(not_found.code(), ErrorCode::LocationNotFound);

        let parse = StoreWeatherError::parse("WeatherAPI", "No forecast data");
        assert_eq!(parse.code(), ErrorCode::UpstreamParseError);

        let validation = StoreWeatherError::validation("page must be >= 1");
        assert_eq!(validation.code(), ErrorCode::Validation);
    }

    #[test]
    fn test_upstream_and_transport_share_code() {
        let upstream = StoreWeatherError::Upstream {
            provider: "OpenWeather".to_string(),
            status: 401,
            body: "invalid key".to_string(),
        };
        let transport = StoreWeatherError::transport("OpenWeather", "connection refused");
        assert_eq!(upstream.code(), ErrorCode::UpstreamHttpError);
        assert_eq!(transport.code(), ErrorCode::UpstreamHttpError);
        assert_eq!(upstream.to_string(), "OpenWeather API error: 401");
    }

    #[test]
    fn test_codes_map_to_http_statuses() {
        assert_eq!(ErrorCode::LocationNotFound.http_status(), 404);
        assert_eq!(ErrorCode::LocationAlreadyExists.http_status(), 409);
        assert_eq!(ErrorCode::UpstreamParseError.http_status(), 502);
        assert_eq!(ErrorCode::GenericFailure.as_u16(), 5000);
    }

    #[test]
    fn test_user_messages() {
        let storage = StoreWeatherError::storage("disk full");
        assert!(storage.user_message().contains("Database operation failed"));

        let not_found = StoreWeatherError::location_not_found("G9");
        assert!(not_found.user_message().contains("G9"));
    }
}
