//! Typed client for the Makeplans booking API.
//!
//! # Overview
//! Every operation is a single authenticated request/response round trip.
//! Responses go through one pipeline: the error classifier inspects the raw
//! body first, and only a body it does not recognise as an error is decoded
//! from its `{"<resource>": {...}}` envelope.
//!
//! # Design
//! - `MakeplansClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO).
//! - `Makeplans` pairs it with a `Transport`; `UreqTransport` is the default.
//! - The client holds only immutable configuration, so it can be shared
//!   across threads whenever the transport can.
//!
//! ```no_run
//! use makeplans_core::{ClientConfig, Makeplans, BookingParams};
//!
//! let api = Makeplans::new(&ClientConfig::new("acme", "api-token"));
//! for booking in api.bookings(&BookingParams { service_id: Some(394), ..Default::default() })? {
//!     println!("{:?} {:?}", booking.id, booking.state);
//! }
//! # Ok::<(), makeplans_core::ApiError>(())
//! ```

pub mod api;
pub mod classify;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use api::Makeplans;
pub use classify::{classify, ErrorTable, KnownError};
pub use client::MakeplansClient;
pub use config::{Account, ClientConfig, ConfigError, FixedResolver, TemplateResolver, UrlResolver};
pub use envelope::{decode_many, decode_one, encode_one, Entity};
pub use error::{ApiError, ErrorKind, FieldError, FieldErrors, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{BookingAction, BookingParams, SlotParams};
pub use transport::{Transport, UreqTransport};
pub use types::{Booking, BookingState, CustomData, Event, Person, Provider, Resource, Service, Slot, Timestamp};
