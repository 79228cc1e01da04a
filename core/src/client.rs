//! Stateless request builder and response parser for the Makeplans API.
//!
//! # Design
//! `MakeplansClient` holds only the resolved base URL, the request headers
//! and the known-error table. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! the `HttpResponse`. Parsing always runs the error classifier before any
//! envelope decoding. `Makeplans` in `api.rs` pairs this with a `Transport`.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::classify::ErrorTable;
use crate::config::ClientConfig;
use crate::envelope::{decode_many, decode_one, encode_one, Entity};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{join_ids, BookingAction, BookingParams, SlotParams, DATE_FORMAT};
use crate::types::{Booking, Person, Provider, Resource, Service};

pub const SERVICES_PATH: &str = "/services";
pub const RESOURCES_PATH: &str = "/resources/";
pub const PROVIDERS_PATH: &str = "/providers/";
pub const PEOPLE_PATH: &str = "/people/";
pub const BOOKINGS_PATH: &str = "/bookings/";
pub const ALL_BOOKINGS_PATH: &str = "/bookings/all";
pub const EVENTS_PATH: &str = "/events";

#[derive(Debug, Clone)]
pub struct MakeplansClient {
    base_url: String,
    headers: Vec<(String, String)>,
    errors: Arc<ErrorTable>,
}

impl MakeplansClient {
    pub fn new(config: &ClientConfig) -> Self {
        let credentials = STANDARD.encode(format!("{}:", config.token));
        Self {
            base_url: config.base_url(),
            headers: vec![
                ("Authorization".to_string(), format!("Basic {credentials}")),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), config.user_agent.clone()),
            ],
            errors: Arc::new(ErrorTable::default()),
        }
    }

    /// Replace the known-error table.
    pub fn with_error_table(mut self, table: ErrorTable) -> Self {
        self.errors = Arc::new(table);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn error_table(&self) -> &ErrorTable {
        &self.errors
    }

    // -----------------------------------------------------------------------
    // Services
    // -----------------------------------------------------------------------

    pub fn build_list_services(&self) -> HttpRequest {
        self.request(HttpMethod::Get, SERVICES_PATH, None)
    }

    pub fn build_create_service(&self, service: &Service) -> Result<HttpRequest, ApiError> {
        self.request_with(HttpMethod::Post, SERVICES_PATH, service)
    }

    pub fn build_update_service(&self, service: &Service) -> Result<HttpRequest, ApiError> {
        let id = require_id(service.id)?;
        self.request_with(HttpMethod::Put, &format!("{SERVICES_PATH}/{id}"), service)
    }

    /// The vendor deactivates the service and returns it.
    pub fn build_delete_service(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("{SERVICES_PATH}/{id}"), None)
    }

    pub fn build_service_slots(&self, service_id: u64, params: &SlotParams) -> HttpRequest {
        let path = with_query(format!("{SERVICES_PATH}/{service_id}/slots"), params.to_query());
        self.request(HttpMethod::Get, &path, None)
    }

    /// Next date with free slots for the given services.
    ///
    /// The vendor only ever answers for one of the services when several are
    /// queried together; which one is not specified.
    ///
    /// An empty id list, or one holding a zero id, fails with `IdRequired`.
    pub fn build_next_available_date(
        &self,
        service_ids: &[u64],
        params: &SlotParams,
    ) -> Result<HttpRequest, ApiError> {
        if service_ids.is_empty() || service_ids.contains(&0) {
            return Err(ApiError::IdRequired);
        }
        let path = with_query(
            format!("{SERVICES_PATH}/{}/next_available_date", join_ids(service_ids)),
            params.to_query(),
        );
        Ok(self.request(HttpMethod::Get, &path, None))
    }

    /// Dates come back unwrapped as `[{"available_date": "YYYY-MM-DD"}]`.
    pub fn parse_next_available_date(&self, response: HttpResponse) -> Result<Vec<NaiveDate>, ApiError> {
        #[derive(Deserialize)]
        struct AvailableDate {
            available_date: String,
        }

        self.check(&response)?;
        let dates: Vec<AvailableDate> = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        dates
            .into_iter()
            .map(|d| {
                NaiveDate::parse_from_str(&d.available_date, DATE_FORMAT).map_err(|e| {
                    ApiError::Deserialization(format!("available_date {:?}: {e}", d.available_date))
                })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    pub fn build_list_resources(&self) -> HttpRequest {
        self.request(HttpMethod::Get, RESOURCES_PATH, None)
    }

    pub fn build_get_resource(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("{RESOURCES_PATH}{id}"), None)
    }

    pub fn build_create_resource(&self, resource: &Resource) -> Result<HttpRequest, ApiError> {
        self.request_with(HttpMethod::Post, RESOURCES_PATH, resource)
    }

    pub fn build_update_resource(&self, resource: &Resource) -> Result<HttpRequest, ApiError> {
        let id = require_id(resource.id)?;
        self.request_with(HttpMethod::Put, &format!("{RESOURCES_PATH}{id}"), resource)
    }

    pub fn build_delete_resource(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("{RESOURCES_PATH}{id}"), None)
    }

    // -----------------------------------------------------------------------
    // Providers
    // -----------------------------------------------------------------------

    pub fn build_list_providers(&self) -> HttpRequest {
        self.request(HttpMethod::Get, PROVIDERS_PATH, None)
    }

    pub fn build_create_provider(&self, provider: &Provider) -> Result<HttpRequest, ApiError> {
        self.request_with(HttpMethod::Post, PROVIDERS_PATH, provider)
    }

    /// The id goes in the path only; the vendor rejects it in the body.
    pub fn build_update_provider(&self, provider: &Provider) -> Result<HttpRequest, ApiError> {
        let id = require_id(provider.id)?;
        let body = Provider {
            id: None,
            ..provider.clone()
        };
        self.request_with(HttpMethod::Put, &format!("{PROVIDERS_PATH}{id}"), &body)
    }

    pub fn build_delete_provider(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("{PROVIDERS_PATH}{id}"), None)
    }

    // -----------------------------------------------------------------------
    // People
    // -----------------------------------------------------------------------

    pub fn build_list_people(&self) -> HttpRequest {
        self.request(HttpMethod::Get, PEOPLE_PATH, None)
    }

    pub fn build_create_person(&self, person: &Person) -> Result<HttpRequest, ApiError> {
        self.request_with(HttpMethod::Post, PEOPLE_PATH, person)
    }

    pub fn build_update_person(&self, person: &Person) -> Result<HttpRequest, ApiError> {
        let id = require_id(person.id)?;
        self.request_with(HttpMethod::Put, &format!("{PEOPLE_PATH}{id}"), person)
    }

    // -----------------------------------------------------------------------
    // Bookings
    // -----------------------------------------------------------------------

    /// Active bookings matching `params`.
    pub fn build_list_bookings(&self, params: &BookingParams) -> HttpRequest {
        let path = with_query(BOOKINGS_PATH.to_string(), params.to_query());
        self.request(HttpMethod::Get, &path, None)
    }

    /// Bookings in every state, including cancelled, declined, expired and deleted.
    pub fn build_list_all_bookings(&self) -> HttpRequest {
        self.request(HttpMethod::Get, ALL_BOOKINGS_PATH, None)
    }

    pub fn build_get_booking(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("{BOOKINGS_PATH}{id}"), None)
    }

    /// Bookings made through the API are always public.
    pub fn build_create_booking(&self, booking: &Booking) -> Result<HttpRequest, ApiError> {
        let body = Booking {
            public_booking: true,
            ..booking.clone()
        };
        self.request_with(HttpMethod::Post, BOOKINGS_PATH, &body)
    }

    pub fn build_update_booking(&self, booking: &Booking) -> Result<HttpRequest, ApiError> {
        let id = require_id(booking.id)?;
        self.request_with(HttpMethod::Put, &format!("{BOOKINGS_PATH}{id}"), booking)
    }

    pub fn build_booking_action(&self, id: u64, action: BookingAction) -> HttpRequest {
        match action {
            BookingAction::Delete => {
                self.request(HttpMethod::Delete, &format!("{BOOKINGS_PATH}{id}"), None)
            }
            other => self.request(
                HttpMethod::Put,
                &format!("{BOOKINGS_PATH}{id}/{}", other.as_str()),
                None,
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn build_list_events(&self) -> HttpRequest {
        self.request(HttpMethod::Get, EVENTS_PATH, None)
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Classify the body, then reject non-2xx statuses it did not explain.
    pub fn check(&self, response: &HttpResponse) -> Result<(), ApiError> {
        if let Some(err) = self.errors.classify(&response.body) {
            if matches!(err, ApiError::EmptyResponse) && response.is_success() {
                debug!(status = response.status, "empty response body");
            } else {
                warn!(status = response.status, kind = %err.kind(), error = %err, "vendor error");
            }
            return Err(err);
        }
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body_text(),
            });
        }
        Ok(())
    }

    /// Decode a `{"<key>": {...}}` response.
    pub fn parse_one<T: Entity>(&self, response: HttpResponse) -> Result<T, ApiError> {
        self.check(&response)?;
        decode_one(&response.body, T::KEY)
    }

    /// Decode a `[{"<key>": {...}}, ...]` response.
    pub fn parse_many<T: Entity>(&self, response: HttpResponse) -> Result<Vec<T>, ApiError> {
        self.check(&response)?;
        let items = decode_many(&response.body, T::KEY)?;
        debug!(key = T::KEY, count = items.len(), "decoded list");
        Ok(items)
    }

    /// Like `parse_one`, but a successful response with no body is `None`.
    pub fn parse_deleted<T: Entity>(&self, response: HttpResponse) -> Result<Option<T>, ApiError> {
        if response.is_success() && response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        self.parse_one(response).map(Some)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "building request");
        HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
        }
    }

    fn request_with<T: Entity>(&self, method: HttpMethod, path: &str, entity: &T) -> Result<HttpRequest, ApiError> {
        let body = encode_one(T::KEY, entity)?;
        Ok(self.request(method, path, Some(body)))
    }
}

fn require_id(id: Option<u64>) -> Result<u64, ApiError> {
    id.filter(|id| *id > 0).ok_or(ApiError::IdRequired)
}

fn with_query(path: String, query: String) -> String {
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}
