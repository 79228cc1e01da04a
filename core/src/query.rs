//! Query filters and booking actions.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::types::Timestamp;

/// Wire format for date-only parameters and fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filters for slot listing and next-available-date lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Sent comma-joined as `selected_resources`.
    pub selected_resources: Vec<u64>,
}

impl SlotParams {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            selected_resources: Vec::new(),
        }
    }

    pub fn with_resources(mut self, resources: impl IntoIterator<Item = u64>) -> Self {
        self.selected_resources = resources.into_iter().collect();
        self
    }

    /// URL-encoded query string without the leading `?`; empty if unset.
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(from) = self.from {
            query.append_pair("from", &from.format(DATE_FORMAT).to_string());
        }
        if let Some(to) = self.to {
            query.append_pair("to", &to.format(DATE_FORMAT).to_string());
        }
        if !self.selected_resources.is_empty() {
            query.append_pair("selected_resources", &join_ids(&self.selected_resources));
        }
        query.finish()
    }
}

/// Filters for booking listing. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingParams {
    pub service_id: Option<u64>,
    pub event_id: Option<u64>,
    pub resource_id: Option<u64>,
    pub person_id: Option<u64>,
    pub external_id: Option<String>,
    pub collection_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Only bookings changed after this instant.
    pub since: Option<Timestamp>,
}

impl BookingParams {
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        let ids = [
            ("service_id", self.service_id),
            ("resource_id", self.resource_id),
            ("person_id", self.person_id),
            ("event_id", self.event_id),
        ];
        for (name, id) in ids {
            if let Some(id) = id.filter(|id| *id > 0) {
                query.append_pair(name, &id.to_string());
            }
        }
        if let Some(external_id) = self.external_id.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("external_id", external_id);
        }
        if let Some(collection_id) = self.collection_id.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("collection_id", collection_id);
        }
        if let Some(start) = self.start {
            query.append_pair("start", &start.format(DATE_FORMAT).to_string());
        }
        if let Some(end) = self.end {
            query.append_pair("end", &end.format(DATE_FORMAT).to_string());
        }
        if let Some(since) = self.since {
            query.append_pair("since", &since.to_rfc3339());
        }
        query.finish()
    }
}

pub(crate) fn join_ids(ids: &[u64]) -> String {
    ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",")
}

/// Vendor-side booking state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Delete,
    Cancel,
    Verify,
    Confirm,
    Decline,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Delete => "delete",
            BookingAction::Cancel => "cancel",
            BookingAction::Verify => "verify",
            BookingAction::Confirm => "confirm",
            BookingAction::Decline => "decline",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(BookingAction::Delete),
            "cancel" => Ok(BookingAction::Cancel),
            "verify" => Ok(BookingAction::Verify),
            "confirm" => Ok(BookingAction::Confirm),
            "decline" => Ok(BookingAction::Decline),
            other => Err(ApiError::UnknownAction(other.to_string())),
        }
    }
}
