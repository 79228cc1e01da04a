//! Turns a raw response body into an `ApiError`, or decides it is not one.
//!
//! The vendor uses two unrelated error shapes depending on the endpoint:
//!
//! ```text
//! {"error": {"description": "Not found"}}
//! {"resource_id": ["can't be blank"], "count": ["too high"]}
//! ```
//!
//! Both are checked, in that order, after the empty-body check. Bodies that
//! match neither are handed back to the caller for envelope decoding.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::{Map, Value};

use crate::error::{ApiError, FieldError, FieldErrors};

/// Validation message the vendor uses for a duplicate unique field.
pub const ALREADY_TAKEN: &str = "has already been taken";

/// Description returned when a booking exceeds the resource's capacity.
pub const BOOKING_CAPACITY_DESCRIPTION: &str = "error resource_id: Not available for booking at this timeerror count: More than maximum count per booking";

/// Descriptions with a dedicated `ApiError` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownError {
    NotFound,
    BookingCapacityLimit,
    EmailTaken,
}

impl KnownError {
    pub fn to_error(self) -> ApiError {
        match self {
            KnownError::NotFound => ApiError::NotFound,
            KnownError::BookingCapacityLimit => ApiError::BookingCapacityLimit,
            KnownError::EmailTaken => ApiError::EmailTaken,
        }
    }
}

/// Immutable lookup from vendor description to known error.
///
/// Keys are stored trimmed and lowercased; lookups normalise the same way.
#[derive(Debug, Clone)]
pub struct ErrorTable {
    entries: HashMap<String, KnownError>,
}

impl Default for ErrorTable {
    fn default() -> Self {
        Self::from_entries([
            ("Not found", KnownError::NotFound),
            (BOOKING_CAPACITY_DESCRIPTION, KnownError::BookingCapacityLimit),
            ("booking capacity exceeded", KnownError::BookingCapacityLimit),
            ("error email: has already been taken", KnownError::EmailTaken),
            ("email already taken", KnownError::EmailTaken),
        ])
    }
}

static DEFAULT_TABLE: LazyLock<ErrorTable> = LazyLock::new(ErrorTable::default);

/// Classify `body` against the default table.
pub fn classify(body: &[u8]) -> Option<ApiError> {
    DEFAULT_TABLE.classify(body)
}

impl ErrorTable {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, KnownError)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(description, known)| (normalize(description), known))
                .collect(),
        }
    }

    pub fn lookup(&self, description: &str) -> Option<KnownError> {
        self.entries.get(&normalize(description)).copied()
    }

    /// Returns the error carried by `body`, or `None` if it carries none.
    pub fn classify(&self, body: &[u8]) -> Option<ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Some(ApiError::EmptyResponse);
        }

        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
            return None;
        };

        if let Some(description) = description_of(&map) {
            return Some(match self.lookup(description) {
                Some(known) => known.to_error(),
                None => ApiError::Vendor {
                    description: description.to_string(),
                },
            });
        }

        let errors = field_errors(&map)?;
        if is_email_taken(&errors) {
            return Some(ApiError::EmailTaken);
        }
        Some(ApiError::FieldValidation(errors))
    }
}

fn normalize(description: &str) -> String {
    description.trim().to_ascii_lowercase()
}

fn description_of(map: &Map<String, Value>) -> Option<&str> {
    map.get("error")?
        .get("description")?
        .as_str()
        .filter(|d| !d.trim().is_empty())
}

/// A field map qualifies only if every value is an array of strings.
fn field_errors(map: &Map<String, Value>) -> Option<FieldErrors> {
    let mut errors = Vec::with_capacity(map.len());
    for (field, value) in map {
        let messages = value
            .as_array()?
            .iter()
            .map(|m| m.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        if !messages.is_empty() {
            errors.push(FieldError {
                field: field.clone(),
                messages,
            });
        }
    }
    if errors.is_empty() {
        return None;
    }
    Some(FieldErrors::new(errors))
}

fn is_email_taken(errors: &FieldErrors) -> bool {
    match errors.get("email") {
        Some([message]) if errors.len() == 1 => message.trim().eq_ignore_ascii_case(ALREADY_TAKEN),
        _ => false,
    }
}
