//! Error types for the HTTP adapter.

use circlib_registry::TransportError;
use thiserror::Error;

/// Result type for HTTP adapter operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when talking to the circuit service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No endpoint configured.
    #[error(
        "Circuit service endpoint not configured. Set CIRCLIB_URL or add `endpoint` to the config file."
    )]
    MissingEndpoint,

    /// Endpoint is not a usable base URL.
    #[error("Invalid circuit service endpoint: {0}")]
    InvalidEndpoint(String),

    /// Token cannot be sent as a header.
    #[error("Invalid circuit service token")]
    InvalidToken,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("Circuit service error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The response body has an unexpected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed.
    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Config file could not be read.
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ClientError> for TransportError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Api { status, message } => TransportError::with_status(status, message),
            ClientError::Http(err) => match err.status() {
                Some(status) => TransportError::with_status(status.as_u16(), err.to_string()),
                None => TransportError::new(err.to_string()),
            },
            other => TransportError::new(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Display message tests --

    #[test]
    fn test_missing_endpoint_display() {
        let err = ClientError::MissingEndpoint;
        assert!(err.to_string().contains("CIRCLIB_URL"));
    }

    #[test]
    fn test_invalid_endpoint_display() {
        let err = ClientError::InvalidEndpoint("not a url".into());
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: 404,
            message: "Circuit phantom_circuit not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("phantom_circuit"));
    }

    #[test]
    fn test_unexpected_response_display() {
        let err = ClientError::UnexpectedResponse("expected a list".into());
        assert!(err.to_string().contains("expected a list"));
    }

    // -- TransportError conversion tests --

    #[test]
    fn test_api_404_to_transport_not_found() {
        let transport: TransportError = ClientError::Api {
            status: 404,
            message: "Circuit phantom_circuit not found".into(),
        }
        .into();
        assert!(transport.is_not_found());
        assert_eq!(transport.message, "Circuit phantom_circuit not found");
    }

    #[test]
    fn test_api_500_to_transport() {
        let transport: TransportError = ClientError::Api {
            status: 500,
            message: "internal".into(),
        }
        .into();
        assert_eq!(transport.status, Some(500));
        assert!(!transport.is_not_found());
    }

    #[test]
    fn test_config_errors_to_transport_without_status() {
        let transport: TransportError = ClientError::MissingEndpoint.into();
        assert_eq!(transport.status, None);
        assert!(transport.message.contains("CIRCLIB_URL"));
    }
}
