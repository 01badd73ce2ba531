//! Unified error handling for the campus-zones library.
//!
//! Containment violations are deliberately absent: a rejected edit is an
//! expected outcome of the editor ([`crate::MutationOutcome::Reverted`]), not
//! an error.

use thiserror::Error;

/// Unified error type for campus-zones operations.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// Ring has too few distinct vertices to form a polygon
    #[error("Zone '{zone_id}' has {point_count} points, minimum {minimum_required} required")]
    InsufficientPoints {
        zone_id: String,
        point_count: usize,
        minimum_required: usize,
    },

    /// Ring or point carries non-finite or out-of-range coordinates
    #[error("Zone '{zone_id}' has invalid coordinates: {message}")]
    InvalidCoordinates { zone_id: String, message: String },

    #[error("Zone '{0}' not found")]
    ZoneNotFound(String),

    #[error("Zone id '{0}' is already in use")]
    DuplicateZone(String),

    /// Campus boundary cannot be derived (no campus loaded, missing area)
    #[error("Campus boundary unavailable: {0}")]
    BoundaryUnavailable(String),

    /// Operation not allowed in the current editor mode
    #[error("Invalid editor operation: {0}")]
    InvalidMode(String),

    /// Server answered with a payload missing required fields
    #[error("Malformed server response: {0}")]
    MalformedResponse(String),

    /// No bearer token; the caller should route to sign-in
    #[error("Not signed in")]
    Unauthenticated,

    /// HTTP/API error
    #[error("HTTP error{}: {message}", .status_code.map(|c| format!(" ({c})")).unwrap_or_default())]
    Http {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ZoneError {
    /// Build an HTTP error from a status and message.
    pub fn http(status_code: Option<u16>, message: impl Into<String>) -> Self {
        ZoneError::Http {
            message: message.into(),
            status_code,
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Transport failures (no status), rate limiting and server errors are
    /// retryable; client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ZoneError::Http { status_code, .. } => match status_code {
                None => true,
                Some(429) => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }
}

/// Result type alias for campus-zones operations.
pub type Result<T> = std::result::Result<T, ZoneError>;

/// Extension trait for converting Option to ZoneError.
pub trait OptionExt<T> {
    /// Convert Option to Result with insufficient points error.
    fn ok_or_insufficient_points(self, zone_id: &str, point_count: usize, minimum: usize)
        -> Result<T>;

    /// Convert Option to Result with a malformed-response error.
    fn ok_or_malformed(self, message: &str) -> Result<T>;

    /// Convert Option to Result with zone-not-found error.
    fn ok_or_not_found(self, zone_id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_points(
        self,
        zone_id: &str,
        point_count: usize,
        minimum: usize,
    ) -> Result<T> {
        self.ok_or_else(|| ZoneError::InsufficientPoints {
            zone_id: zone_id.to_string(),
            point_count,
            minimum_required: minimum,
        })
    }

    fn ok_or_malformed(self, message: &str) -> Result<T> {
        self.ok_or_else(|| ZoneError::MalformedResponse(message.to_string()))
    }

    fn ok_or_not_found(self, zone_id: &str) -> Result<T> {
        self.ok_or_else(|| ZoneError::ZoneNotFound(zone_id.to_string()))
    }
}
