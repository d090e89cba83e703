//! Error types for the observations API client.
//!
//! # Design
//! Every variant raised while talking to the provider names the operation
//! that failed, and the URL where one exists, so a caller can log the error
//! without extra bookkeeping. Free-text observation dates fail with their own
//! `ObservedOnError`, which never comes out of response decoding.

use std::error::Error;
use std::fmt;

use crate::http::TransportError;

/// The resource operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListObservations,
    ListObservationsByUsername,
    GetObservation,
    GetObservationSummary,
    CreateObservation,
    UpdateObservation,
    DeleteObservation,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListObservations => "list observations",
            Operation::ListObservationsByUsername => "list observations by username",
            Operation::GetObservation => "get observation",
            Operation::GetObservationSummary => "get observation summary",
            Operation::CreateObservation => "create observation",
            Operation::UpdateObservation => "update observation",
            Operation::DeleteObservation => "delete observation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by `NaturalistClient`.
#[derive(Debug)]
pub enum ApiError {
    /// The executor could not complete the round-trip.
    Transport {
        operation: Operation,
        url: String,
        source: TransportError,
    },

    /// The provider answered with a status other than the operation's
    /// success code.
    UnexpectedStatus {
        operation: Operation,
        url: String,
        expected: u16,
        status: u16,
        body: String,
    },

    /// The response could not be decoded into the expected shape.
    Decode {
        operation: Operation,
        url: String,
        message: String,
    },

    /// The request payload could not be serialized to JSON.
    Encode {
        operation: Operation,
        message: String,
    },

    /// A free-text observation date could not be interpreted.
    ObservedOn(ObservedOnError),
}

impl ApiError {
    /// The actual HTTP status, for `UnexpectedStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            ApiError::Transport { operation, .. }
            | ApiError::UnexpectedStatus { operation, .. }
            | ApiError::Decode { operation, .. }
            | ApiError::Encode { operation, .. } => Some(*operation),
            ApiError::ObservedOn(_) => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport {
                operation,
                url,
                source,
            } => write!(f, "{operation} ({url}): transport failed: {source}"),
            ApiError::UnexpectedStatus {
                operation,
                url,
                expected,
                status,
                body,
            } => write!(
                f,
                "{operation} ({url}): expected HTTP {expected}, got {status}: {body}"
            ),
            ApiError::Decode {
                operation,
                url,
                message,
            } => write!(f, "{operation} ({url}): decoding failed: {message}"),
            ApiError::Encode { operation, message } => {
                write!(f, "{operation}: encoding failed: {message}")
            }
            ApiError::ObservedOn(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Transport { source, .. } => Some(source),
            ApiError::ObservedOn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ObservedOnError> for ApiError {
    fn from(err: ObservedOnError) -> Self {
        ApiError::ObservedOn(err)
    }
}

/// Failure to interpret an `observed_on_string` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedOnError {
    /// The string was missing or blank.
    Empty,
    /// No known layout matched the string.
    Unrecognized(String),
}

impl fmt::Display for ObservedOnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedOnError::Empty => write!(f, "observed-on string is empty"),
            ObservedOnError::Unrecognized(input) => {
                write!(f, "unrecognized observed-on string: {input:?}")
            }
        }
    }
}

impl Error for ObservedOnError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_display_names_operation_and_url() {
        let err = ApiError::UnexpectedStatus {
            operation: Operation::DeleteObservation,
            url: "https://www.inaturalist.org/observations/7.json".to_string(),
            expected: 201,
            status: 200,
            body: "ok".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "delete observation (https://www.inaturalist.org/observations/7.json): expected HTTP 201, got 200: ok"
        );
        assert_eq!(err.status(), Some(200));
        assert_eq!(err.operation(), Some(Operation::DeleteObservation));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_detected_from_status() {
        let err = ApiError::UnexpectedStatus {
            operation: Operation::GetObservation,
            url: String::new(),
            expected: 200,
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn transport_error_is_the_source() {
        let err = ApiError::Transport {
            operation: Operation::ListObservations,
            url: "http://localhost".to_string(),
            source: TransportError::new("connection refused"),
        };
        assert_eq!(err.source().unwrap().to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn observed_on_error_converts() {
        let err: ApiError = ObservedOnError::Unrecognized("yesterday".to_string()).into();
        assert_eq!(err.to_string(), "unrecognized observed-on string: \"yesterday\"");
        assert_eq!(err.operation(), None);
        assert!(matches!(err, ApiError::ObservedOn(ObservedOnError::Unrecognized(_))));
    }

    #[test]
    fn empty_observed_on_display() {
        assert_eq!(ObservedOnError::Empty.to_string(), "observed-on string is empty");
    }
}
