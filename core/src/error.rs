//! Error types for the Makeplans client.
//!
//! # Design
//! The vendor reports failures in two JSON shapes (a single description, or a
//! map of per-field messages) and a handful of descriptions have a fixed
//! meaning. Those get dedicated variants so callers can `match` on them
//! instead of comparing strings. Local precondition failures never reach the
//! network and are kept apart from anything the server said.

use std::fmt;

use thiserror::Error;

/// Boxed error produced by a `Transport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS or TLS failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The vendor returned no body where one was required.
    #[error("empty response")]
    EmptyResponse,

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// The booking exceeds the remaining capacity of the resource.
    #[error("booking capacity limit reached")]
    BookingCapacityLimit,

    /// A person with this email address already exists.
    #[error("email has already been taken")]
    EmailTaken,

    /// A vendor error description with no dedicated variant, kept verbatim.
    #[error("{description}")]
    Vendor { description: String },

    /// Per-field validation messages.
    #[error("{0}")]
    FieldValidation(FieldErrors),

    /// Update issued for an entity without a persisted id.
    #[error("id is required")]
    IdRequired,

    /// Booking action name with no matching endpoint.
    #[error("action {0} not implemented")]
    UnknownAction(String),

    /// Non-2xx status whose body matched no known error shape.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// Coarse grouping of `ApiError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    EmptyResponse,
    Description,
    FieldValidation,
    LocalPrecondition,
    Http,
    Codec,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::EmptyResponse => "empty_response",
            Self::Description => "description",
            Self::FieldValidation => "field_validation",
            Self::LocalPrecondition => "local_precondition",
            Self::Http => "http",
            Self::Codec => "codec",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::EmptyResponse => ErrorKind::EmptyResponse,
            ApiError::NotFound
            | ApiError::BookingCapacityLimit
            | ApiError::Vendor { .. } => ErrorKind::Description,
            // Reachable from either error shape, grouped with the map form.
            ApiError::EmailTaken | ApiError::FieldValidation(_) => ErrorKind::FieldValidation,
            ApiError::IdRequired | ApiError::UnknownAction(_) => ErrorKind::LocalPrecondition,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Serialization(_) | ApiError::Deserialization(_) => ErrorKind::Codec,
        }
    }

    /// True for errors raised before any request was sent.
    pub fn is_local(&self) -> bool {
        self.kind() == ErrorKind::LocalPrecondition
    }
}

/// Messages reported against a single request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

/// Validation failures keyed by field, ordered by field name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new(mut errors: Vec<FieldError>) -> Self {
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages for `field`, if the vendor reported any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.messages.as_slice())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "error {}: {}", err.field, err.messages.join(", "))?;
        }
        Ok(())
    }
}
