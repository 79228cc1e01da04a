//! In-memory stand-in for the Makeplans API.
//!
//! Records are kept as raw JSON maps so whatever a client sends comes back
//! unchanged, plus the ids and timestamps the vendor assigns. Failures use
//! the same two shapes the real service does: `{"error":{"description"}}`
//! for lookups and capacity, and per-field message maps for validation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const CAPACITY_DESCRIPTION: &str = "error resource_id: Not available for booking at this timeerror count: More than maximum count per booking";

pub type Record = Map<String, Value>;

/// Booking states that drop a booking out of the default listing.
const INACTIVE_STATES: [&str; 4] = ["cancelled", "declined", "deleted", "expired"];

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    services: BTreeMap<u64, Record>,
    resources: BTreeMap<u64, Record>,
    providers: BTreeMap<u64, Record>,
    people: BTreeMap<u64, Record>,
    bookings: BTreeMap<u64, Record>,
    events: BTreeMap<u64, Record>,
}

impl Store {
    /// Events are read-only through the API, so tests seed them here.
    pub fn add_event(&mut self, mut event: Record) -> u64 {
        let id = self.allocate();
        stamp(&mut event, id, true);
        self.events.insert(id, event);
        id
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn resource_ids_for(&self, service_id: u64) -> Vec<u64> {
        self.providers
            .values()
            .filter(|p| id_field(p, "service_id") == Some(service_id))
            .filter_map(|p| id_field(p, "resource_id"))
            .collect()
    }

    fn service_ids_for(&self, resource_id: u64) -> Vec<u64> {
        self.providers
            .values()
            .filter(|p| id_field(p, "resource_id") == Some(resource_id))
            .filter_map(|p| id_field(p, "service_id"))
            .collect()
    }

    fn booked_count(&self, resource_id: u64, booked_from: Option<&Value>) -> u64 {
        self.bookings
            .values()
            .filter(|b| id_field(b, "resource_id") == Some(resource_id))
            .filter(|b| b.get("booked_from") == booked_from)
            .filter(|b| !is_inactive(b))
            .map(|b| id_field(b, "count").unwrap_or(1))
            .sum()
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route("/services/{id}", put(update_service).delete(delete_service))
        .route("/services/{id}/slots", get(service_slots))
        .route("/services/{id}/next_available_date", get(next_available_date))
        .route("/resources", get(list_resources).post(create_resource))
        .route("/resources/", get(list_resources).post(create_resource))
        .route(
            "/resources/{id}",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
        .route("/providers", get(list_providers).post(create_provider))
        .route("/providers/", get(list_providers).post(create_provider))
        .route("/providers/{id}", put(update_provider).delete(delete_provider))
        .route("/people", get(list_people).post(create_person))
        .route("/people/", get(list_people).post(create_person))
        .route("/people/{id}", put(update_person))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/", get(list_bookings).post(create_booking))
        .route("/bookings/all", get(list_all_bookings))
        .route(
            "/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/bookings/{id}/{action}", put(booking_action))
        .route("/events", get(list_events))
        .layer(middleware::from_fn(require_basic_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn wrapped(key: &str, record: &Record) -> Value {
    json!({ key: record })
}

fn ok_one(key: &str, record: &Record) -> Response {
    Json(wrapped(key, record)).into_response()
}

fn ok_many<'a>(key: &str, records: impl Iterator<Item = &'a Record>) -> Response {
    let items: Vec<Value> = records.map(|r| wrapped(key, r)).collect();
    Json(Value::Array(items)).into_response()
}

fn created(key: &str, record: &Record) -> Response {
    (StatusCode::CREATED, Json(wrapped(key, record))).into_response()
}

fn description_error(status: StatusCode, description: &str) -> Response {
    (status, Json(json!({ "error": { "description": description } }))).into_response()
}

fn not_found() -> Response {
    description_error(StatusCode::NOT_FOUND, "Not found")
}

fn field_errors(fields: &[(&str, &str)]) -> Response {
    let body: Map<String, Value> = fields
        .iter()
        .map(|(field, message)| (field.to_string(), json!([message])))
        .collect();
    (StatusCode::UNPROCESSABLE_ENTITY, Json(Value::Object(body))).into_response()
}

// ---------------------------------------------------------------------------
// Record helpers
// ---------------------------------------------------------------------------

fn id_field(record: &Record, field: &str) -> Option<u64> {
    record.get(field).and_then(Value::as_u64).filter(|id| *id > 0)
}

fn text_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_inactive(booking: &Record) -> bool {
    text_field(booking, "state").is_some_and(|s| INACTIVE_STATES.contains(&s))
}

fn stamp(record: &mut Record, id: u64, new: bool) {
    let now = Value::String(Utc::now().to_rfc3339());
    record.insert("id".to_string(), json!(id));
    if new {
        record.insert("created_at".to_string(), now.clone());
    }
    record.insert("updated_at".to_string(), now);
}

/// Pull the record out of `{"<key>": {...}}`.
fn unwrap_body(key: &str, body: Value) -> Result<Record, Response> {
    match body {
        Value::Object(mut outer) => match outer.remove(key) {
            Some(Value::Object(record)) => Ok(record),
            _ => Err(field_errors(&[(key, "can't be blank")])),
        },
        _ => Err(field_errors(&[(key, "can't be blank")])),
    }
}

/// Overwrite stored fields with the ones sent; id and timestamps stay ours.
fn merge(target: &mut Record, update: Record) {
    for (field, value) in update {
        if !matches!(field.as_str(), "id" | "created_at" | "updated_at") {
            target.insert(field, value);
        }
    }
}

async fn require_basic_auth(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .is_some_and(|credentials| {
            credentials
                .split_once(':')
                .is_some_and(|(token, _)| !token.is_empty())
        });
    if !authorized {
        return description_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Services and slots
// ---------------------------------------------------------------------------

async fn list_services(State(db): State<Db>) -> Response {
    let store = db.read().await;
    let active = store
        .services
        .values()
        .filter(|s| s.get("active").and_then(Value::as_bool).unwrap_or(true));
    ok_many("service", active)
}

async fn create_service(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut service = match unwrap_body("service", body) {
        Ok(service) => service,
        Err(resp) => return resp,
    };
    if text_field(&service, "title").is_none() {
        return field_errors(&[("title", "can't be blank")]);
    }
    let mut store = db.write().await;
    let id = store.allocate();
    service.entry("active").or_insert(json!(true));
    stamp(&mut service, id, true);
    store.services.insert(id, service.clone());
    debug!(id, "service created");
    created("service", &service)
}

async fn update_service(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let update = match unwrap_body("service", body) {
        Ok(update) => update,
        Err(resp) => return resp,
    };
    let mut store = db.write().await;
    let Some(service) = store.services.get_mut(&id) else {
        return not_found();
    };
    merge(service, update);
    stamp(service, id, false);
    ok_one("service", service)
}

async fn delete_service(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    let Some(service) = store.services.get_mut(&id) else {
        return not_found();
    };
    service.insert("active".to_string(), json!(false));
    stamp(service, id, false);
    ok_one("service", service)
}

fn parse_date(query: &HashMap<String, String>, key: &str) -> Option<NaiveDate> {
    query
        .get(key)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

async fn service_slots(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = db.read().await;
    let Some(service) = store.services.get(&id) else {
        return not_found();
    };
    let from = parse_date(&query, "from").unwrap_or_else(|| Utc::now().date_naive());
    let to = parse_date(&query, "to").unwrap_or(from);
    let selected: Vec<u64> = query
        .get("selected_resources")
        .map(|s| s.split(',').filter_map(|id| id.trim().parse().ok()).collect())
        .unwrap_or_default();

    let mut resources = store.resource_ids_for(id);
    if !selected.is_empty() {
        resources.retain(|r| selected.contains(r));
    }
    let interval = id_field(service, "interval").unwrap_or(60) as i64;

    let mut slots = Vec::new();
    for day in from.iter_days().take_while(|d| *d <= to).take(31) {
        let Some(start) = day.and_hms_opt(10, 0, 0).map(|t| t.and_utc()) else {
            continue;
        };
        let end = start + Duration::minutes(interval);
        let timestamp = json!(start.to_rfc3339());

        let mut free = 0;
        let mut open = Vec::new();
        for resource_id in &resources {
            let capacity = store
                .resources
                .get(resource_id)
                .and_then(|r| id_field(r, "capacity"))
                .unwrap_or(1);
            let left = capacity.saturating_sub(store.booked_count(*resource_id, Some(&timestamp)));
            if left > 0 {
                open.push(*resource_id);
            }
            free += left;
        }

        slots.push(json!({
            "slot": {
                "timestamp": timestamp,
                "timestamp_end": end.to_rfc3339(),
                "formatted_timestamp": start.format("%A, %B %e, %Y, %l:%M %p").to_string(),
                "formatted_timestamp_end": end.format("%A, %B %e, %Y, %l:%M %p").to_string(),
                "free": free,
                "open_resources": open,
                "available_resources": &resources,
            }
        }));
    }
    Json(Value::Array(slots)).into_response()
}

/// Answers for the first listed service only, like the real endpoint.
async fn next_available_date(
    State(db): State<Db>,
    Path(ids): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = db.read().await;
    let first = ids.split(',').find_map(|id| id.trim().parse::<u64>().ok());
    let Some(first) = first.filter(|id| store.services.contains_key(id)) else {
        return not_found();
    };
    let date = parse_date(&query, "from").unwrap_or_else(|| Utc::now().date_naive());
    debug!(service_id = first, %date, "next available date");
    Json(json!([{ "available_date": date.format("%Y-%m-%d").to_string() }])).into_response()
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

async fn list_resources(State(db): State<Db>) -> Response {
    let store = db.read().await;
    ok_many("resource", store.resources.values())
}

async fn get_resource(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let store = db.read().await;
    let Some(resource) = store.resources.get(&id) else {
        return not_found();
    };
    let mut resource = resource.clone();
    let services: Vec<Value> = store
        .service_ids_for(id)
        .into_iter()
        .filter_map(|sid| store.services.get(&sid).cloned().map(Value::Object))
        .collect();
    resource.insert("services".to_string(), Value::Array(services));
    ok_one("resource", &resource)
}

async fn create_resource(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut resource = match unwrap_body("resource", body) {
        Ok(resource) => resource,
        Err(resp) => return resp,
    };
    if text_field(&resource, "title").is_none() {
        return field_errors(&[("title", "can't be blank")]);
    }
    let mut store = db.write().await;
    let id = store.allocate();
    resource.entry("capacity").or_insert(json!(1));
    stamp(&mut resource, id, true);
    store.resources.insert(id, resource.clone());
    created("resource", &resource)
}

async fn update_resource(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let update = match unwrap_body("resource", body) {
        Ok(update) => update,
        Err(resp) => return resp,
    };
    let mut store = db.write().await;
    let Some(resource) = store.resources.get_mut(&id) else {
        return not_found();
    };
    merge(resource, update);
    stamp(resource, id, false);
    ok_one("resource", resource)
}

/// Replies with an empty body, as some vendor deletes do.
async fn delete_resource(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    match store.resources.remove(&id) {
        Some(_) => StatusCode::OK.into_response(),
        None => not_found(),
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

async fn list_providers(State(db): State<Db>) -> Response {
    let store = db.read().await;
    ok_many("provider", store.providers.values())
}

async fn create_provider(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut provider = match unwrap_body("provider", body) {
        Ok(provider) => provider,
        Err(resp) => return resp,
    };
    let mut store = db.write().await;
    let mut missing = Vec::new();
    if !id_field(&provider, "service_id").is_some_and(|id| store.services.contains_key(&id)) {
        missing.push(("service_id", "can't be blank"));
    }
    if !id_field(&provider, "resource_id").is_some_and(|id| store.resources.contains_key(&id)) {
        missing.push(("resource_id", "can't be blank"));
    }
    if !missing.is_empty() {
        return field_errors(&missing);
    }
    let id = store.allocate();
    stamp(&mut provider, id, true);
    store.providers.insert(id, provider.clone());
    created("provider", &provider)
}

async fn update_provider(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let update = match unwrap_body("provider", body) {
        Ok(update) => update,
        Err(resp) => return resp,
    };
    if update.contains_key("id") {
        return field_errors(&[("id", "can't be changed")]);
    }
    let mut store = db.write().await;
    let Some(provider) = store.providers.get_mut(&id) else {
        return not_found();
    };
    merge(provider, update);
    stamp(provider, id, false);
    ok_one("provider", provider)
}

async fn delete_provider(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    match store.providers.remove(&id) {
        Some(provider) => ok_one("provider", &provider),
        None => not_found(),
    }
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

async fn list_people(State(db): State<Db>) -> Response {
    let store = db.read().await;
    ok_many("person", store.people.values())
}

fn email_taken(store: &Store, email: &str, except: Option<u64>) -> bool {
    store
        .people
        .iter()
        .filter(|(id, _)| Some(**id) != except)
        .any(|(_, p)| text_field(p, "email").is_some_and(|e| e.eq_ignore_ascii_case(email)))
}

async fn create_person(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut person = match unwrap_body("person", body) {
        Ok(person) => person,
        Err(resp) => return resp,
    };
    let mut store = db.write().await;
    if let Some(email) = text_field(&person, "email") {
        if email_taken(&store, email, None) {
            return field_errors(&[("email", "has already been taken")]);
        }
    }
    let id = store.allocate();
    stamp(&mut person, id, true);
    store.people.insert(id, person.clone());
    created("person", &person)
}

async fn update_person(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let update = match unwrap_body("person", body) {
        Ok(update) => update,
        Err(resp) => return resp,
    };
    let mut store = db.write().await;
    if let Some(email) = text_field(&update, "email") {
        if email_taken(&store, email, Some(id)) {
            return field_errors(&[("email", "has already been taken")]);
        }
    }
    let Some(person) = store.people.get_mut(&id) else {
        return not_found();
    };
    merge(person, update);
    stamp(person, id, false);
    ok_one("person", person)
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

async fn list_bookings(
    State(db): State<Db>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = db.read().await;
    let wanted = |booking: &&Record| {
        ["service_id", "resource_id", "person_id", "event_id"]
            .iter()
            .all(|field| match query.get(*field).and_then(|v| v.parse::<u64>().ok()) {
                Some(wanted) => id_field(booking, field) == Some(wanted),
                None => true,
            })
            && query
                .get("external_id")
                .map_or(true, |external| text_field(booking, "external_id") == Some(external.as_str()))
    };
    let active = store
        .bookings
        .values()
        .filter(|b| !is_inactive(b))
        .filter(wanted);
    ok_many("booking", active)
}

async fn list_all_bookings(State(db): State<Db>) -> Response {
    let store = db.read().await;
    ok_many("booking", store.bookings.values())
}

async fn get_booking(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let store = db.read().await;
    match store.bookings.get(&id) {
        Some(booking) => ok_one("booking", booking),
        None => not_found(),
    }
}

async fn create_booking(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut booking = match unwrap_body("booking", body) {
        Ok(booking) => booking,
        Err(resp) => return resp,
    };
    let mut store = db.write().await;

    let mut missing = Vec::new();
    if id_field(&booking, "service_id").is_none() {
        missing.push(("service_id", "can't be blank"));
    }
    let resource_id = id_field(&booking, "resource_id");
    if resource_id.is_none() {
        missing.push(("resource_id", "can't be blank"));
    }
    if !missing.is_empty() {
        return field_errors(&missing);
    }
    let Some(resource) = resource_id.and_then(|id| store.resources.get(&id)) else {
        return field_errors(&[("resource_id", "is invalid")]);
    };

    let capacity = id_field(resource, "capacity").unwrap_or(1);
    let count = id_field(&booking, "count").unwrap_or(1);
    let resource_id = resource_id.unwrap_or_default();
    let already = store.booked_count(resource_id, booking.get("booked_from"));
    if already + count > capacity {
        return description_error(StatusCode::UNPROCESSABLE_ENTITY, CAPACITY_DESCRIPTION);
    }

    let id = store.allocate();
    booking.insert("count".to_string(), json!(count));
    booking.insert("state".to_string(), json!("confirmed"));
    stamp(&mut booking, id, true);
    store.bookings.insert(id, booking.clone());
    debug!(id, resource_id, count, "booking created");
    created("booking", &booking)
}

async fn update_booking(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let update = match unwrap_body("booking", body) {
        Ok(update) => update,
        Err(resp) => return resp,
    };
    let mut store = db.write().await;
    let Some(booking) = store.bookings.get_mut(&id) else {
        return not_found();
    };
    merge(booking, update);
    stamp(booking, id, false);
    ok_one("booking", booking)
}

async fn delete_booking(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    set_booking_state(&db, id, "deleted").await
}

async fn booking_action(State(db): State<Db>, Path((id, action)): Path<(u64, String)>) -> Response {
    let state = match action.as_str() {
        "cancel" => "cancelled",
        "confirm" | "verify" => "confirmed",
        "decline" => "declined",
        _ => return not_found(),
    };
    set_booking_state(&db, id, state).await
}

async fn set_booking_state(db: &Db, id: u64, state: &str) -> Response {
    let mut store = db.write().await;
    let Some(booking) = store.bookings.get_mut(&id) else {
        return not_found();
    };
    booking.insert("state".to_string(), json!(state));
    stamp(booking, id, false);
    debug!(id, state, "booking state changed");
    ok_one("booking", booking)
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

async fn list_events(State(db): State<Db>) -> Response {
    let store = db.read().await;
    ok_many("event", store.events.values())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn unwrap_body_requires_key() {
        let Ok(booking) = unwrap_body("booking", json!({"booking": {"count": 1}})) else {
            panic!("booking body rejected");
        };
        assert_eq!(booking["count"], 1);
        assert!(unwrap_body("booking", json!({"count": 1})).is_err());
        assert!(unwrap_body("booking", json!([])).is_err());
    }

    #[test]
    fn merge_keeps_server_fields() {
        let mut target = record(json!({"id": 1, "title": "old", "created_at": "then"}));
        merge(&mut target, record(json!({"id": 9, "title": "new", "created_at": "now"})));
        assert_eq!(target["id"], 1);
        assert_eq!(target["title"], "new");
        assert_eq!(target["created_at"], "then");
    }

    #[test]
    fn stamp_sets_id_and_timestamps() {
        let mut r = Record::new();
        stamp(&mut r, 7, true);
        assert_eq!(r["id"], 7);
        assert!(r["created_at"].is_string());
        assert!(r["updated_at"].is_string());
    }

    #[test]
    fn inactive_states() {
        assert!(is_inactive(&record(json!({"state": "cancelled"}))));
        assert!(!is_inactive(&record(json!({"state": "confirmed"}))));
        assert!(!is_inactive(&record(json!({}))));
    }

    #[test]
    fn booked_count_ignores_inactive_and_other_slots() {
        let mut store = Store::default();
        let from = json!("2015-11-10T08:00:00-06:00");
        store.bookings.insert(1, record(json!({"resource_id": 484, "count": 2, "booked_from": from})));
        store.bookings.insert(2, record(json!({"resource_id": 484, "count": 1, "booked_from": from, "state": "cancelled"})));
        store.bookings.insert(3, record(json!({"resource_id": 484, "count": 1, "booked_from": "2015-11-11T08:00:00-06:00"})));
        assert_eq!(store.booked_count(484, Some(&from)), 2);
    }

    #[test]
    fn add_event_assigns_ids() {
        let mut store = Store::default();
        let first = store.add_event(record(json!({"title": "a"})));
        let second = store.add_event(record(json!({"title": "b"})));
        assert_eq!((first, second), (1, 2));
        assert_eq!(store.events[&2]["id"], 2);
    }
}
