//! Blocking client: `MakeplansClient` plus a `Transport`.
//!
//! Each method is one request/response round trip. Nothing is retried or
//! cached, and local precondition failures return before the transport is
//! touched.

use chrono::NaiveDate;

use crate::client::MakeplansClient;
use crate::config::ClientConfig;
use crate::envelope::Entity;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{BookingAction, BookingParams, SlotParams};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Booking, Event, Person, Provider, Resource, Service, Slot};

#[derive(Debug, Clone)]
pub struct Makeplans<T = UreqTransport> {
    client: MakeplansClient,
    transport: T,
}

impl Makeplans<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::default())
    }
}

impl<T: Transport> Makeplans<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self::from_parts(MakeplansClient::new(config), transport)
    }

    pub fn from_parts(client: MakeplansClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &MakeplansClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.send(&request).map_err(ApiError::Transport)
    }

    fn fetch_one<E: Entity>(&self, request: HttpRequest) -> Result<E, ApiError> {
        self.client.parse_one(self.execute(request)?)
    }

    fn fetch_many<E: Entity>(&self, request: HttpRequest) -> Result<Vec<E>, ApiError> {
        self.client.parse_many(self.execute(request)?)
    }

    fn fetch_deleted<E: Entity>(&self, request: HttpRequest) -> Result<Option<E>, ApiError> {
        self.client.parse_deleted(self.execute(request)?)
    }

    // Services

    pub fn services(&self) -> Result<Vec<Service>, ApiError> {
        self.fetch_many(self.client.build_list_services())
    }

    pub fn create_service(&self, service: &Service) -> Result<Service, ApiError> {
        self.fetch_one(self.client.build_create_service(service)?)
    }

    pub fn update_service(&self, service: &Service) -> Result<Service, ApiError> {
        self.fetch_one(self.client.build_update_service(service)?)
    }

    /// Deactivates the service; it no longer appears in listings.
    pub fn delete_service(&self, id: u64) -> Result<Option<Service>, ApiError> {
        self.fetch_deleted(self.client.build_delete_service(id))
    }

    pub fn service_slots(&self, service_id: u64, params: &SlotParams) -> Result<Vec<Slot>, ApiError> {
        self.fetch_many(self.client.build_service_slots(service_id, params))
    }

    /// See `MakeplansClient::build_next_available_date` for the vendor's
    /// multi-service limitation.
    pub fn next_available_dates(
        &self,
        service_ids: &[u64],
        params: &SlotParams,
    ) -> Result<Vec<NaiveDate>, ApiError> {
        let request = self.client.build_next_available_date(service_ids, params)?;
        self.client.parse_next_available_date(self.execute(request)?)
    }

    // Resources

    pub fn resources(&self) -> Result<Vec<Resource>, ApiError> {
        self.fetch_many(self.client.build_list_resources())
    }

    pub fn resource(&self, id: u64) -> Result<Resource, ApiError> {
        self.fetch_one(self.client.build_get_resource(id))
    }

    pub fn create_resource(&self, resource: &Resource) -> Result<Resource, ApiError> {
        self.fetch_one(self.client.build_create_resource(resource)?)
    }

    pub fn update_resource(&self, resource: &Resource) -> Result<Resource, ApiError> {
        self.fetch_one(self.client.build_update_resource(resource)?)
    }

    pub fn delete_resource(&self, id: u64) -> Result<Option<Resource>, ApiError> {
        self.fetch_deleted(self.client.build_delete_resource(id))
    }

    // Providers

    pub fn providers(&self) -> Result<Vec<Provider>, ApiError> {
        self.fetch_many(self.client.build_list_providers())
    }

    pub fn create_provider(&self, provider: &Provider) -> Result<Provider, ApiError> {
        self.fetch_one(self.client.build_create_provider(provider)?)
    }

    pub fn update_provider(&self, provider: &Provider) -> Result<Provider, ApiError> {
        self.fetch_one(self.client.build_update_provider(provider)?)
    }

    pub fn delete_provider(&self, id: u64) -> Result<Option<Provider>, ApiError> {
        self.fetch_deleted(self.client.build_delete_provider(id))
    }

    // People

    pub fn people(&self) -> Result<Vec<Person>, ApiError> {
        self.fetch_many(self.client.build_list_people())
    }

    pub fn create_person(&self, person: &Person) -> Result<Person, ApiError> {
        self.fetch_one(self.client.build_create_person(person)?)
    }

    pub fn update_person(&self, person: &Person) -> Result<Person, ApiError> {
        self.fetch_one(self.client.build_update_person(person)?)
    }

    // Bookings

    pub fn bookings(&self, params: &BookingParams) -> Result<Vec<Booking>, ApiError> {
        self.fetch_many(self.client.build_list_bookings(params))
    }

    pub fn all_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.fetch_many(self.client.build_list_all_bookings())
    }

    pub fn booking(&self, id: u64) -> Result<Booking, ApiError> {
        self.fetch_one(self.client.build_get_booking(id))
    }

    pub fn create_booking(&self, booking: &Booking) -> Result<Booking, ApiError> {
        self.fetch_one(self.client.build_create_booking(booking)?)
    }

    pub fn update_booking(&self, booking: &Booking) -> Result<Booking, ApiError> {
        self.fetch_one(self.client.build_update_booking(booking)?)
    }

    pub fn transition_booking(&self, id: u64, action: BookingAction) -> Result<Booking, ApiError> {
        self.fetch_one(self.client.build_booking_action(id, action))
    }

    /// Transition by action name; unknown names fail before any request.
    pub fn transition_booking_named(&self, id: u64, action: &str) -> Result<Booking, ApiError> {
        self.transition_booking(id, action.parse()?)
    }

    pub fn delete_booking(&self, id: u64) -> Result<Option<Booking>, ApiError> {
        self.fetch_deleted(self.client.build_booking_action(id, BookingAction::Delete))
    }

    pub fn cancel_booking(&self, id: u64) -> Result<Booking, ApiError> {
        self.transition_booking(id, BookingAction::Cancel)
    }

    pub fn verify_booking(&self, id: u64) -> Result<Booking, ApiError> {
        self.transition_booking(id, BookingAction::Verify)
    }

    pub fn confirm_booking(&self, id: u64) -> Result<Booking, ApiError> {
        self.transition_booking(id, BookingAction::Confirm)
    }

    pub fn decline_booking(&self, id: u64) -> Result<Booking, ApiError> {
        self.transition_booking(id, BookingAction::Decline)
    }

    // Events

    pub fn events(&self) -> Result<Vec<Event>, ApiError> {
        self.fetch_many(self.client.build_list_events())
    }
}
