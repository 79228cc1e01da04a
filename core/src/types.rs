//! Records mirrored from the Makeplans JSON schema.
//!
//! # Design
//! Every field the vendor may send as `null` is an `Option`, and `None` is
//! left out when encoding, so "not set" never turns into a zero id or an
//! epoch timestamp. Settings the vendor treats as free-form (custom data,
//! templates, mail and SMS settings) stay as raw JSON.

use chrono::{DateTime, FixedOffset, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::envelope::Entity;

/// RFC 3339 timestamp as sent by the vendor, offset preserved.
pub type Timestamp = DateTime<FixedOffset>;

/// Open string-keyed map of arbitrary JSON values.
pub type CustomData = Map<String, Value>;

/// Reads an explicit `null` as the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_default")]
    pub active: bool,
    #[serde(deserialize_with = "null_default")]
    pub booking_capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_type_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_booking_specify_time: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub has_day_booking: bool,
    #[serde(deserialize_with = "null_default")]
    pub interval: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_confirmation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_verification: Option<Value>,
    #[serde(deserialize_with = "null_default")]
    pub max_slots: u32,
    /// Decimal amount as text, e.g. `"20.0"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub same_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_confirmation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_reminder: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_verification: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Value>,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Entity for Service {
    const KEY: &'static str = "service";
}

/// A bookable calendar (person, room, machine).
///
/// Opening hours are `"HH:MM"` strings read in open/close pairs; `None`
/// means closed all day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_default")]
    pub capacity: u32,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    pub opening_hours_mon: Option<Vec<String>>,
    pub opening_hours_tue: Option<Vec<String>>,
    pub opening_hours_wed: Option<Vec<String>>,
    pub opening_hours_thu: Option<Vec<String>>,
    pub opening_hours_fri: Option<Vec<String>>,
    pub opening_hours_sat: Option<Vec<String>>,
    pub opening_hours_sun: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_default")]
    pub services: Vec<Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Resource {
    pub fn opening_hours(&self, day: Weekday) -> Option<&[String]> {
        self.day_slot(day).as_deref()
    }

    pub fn set_opening_hours(&mut self, day: Weekday, hours: Option<Vec<String>>) {
        *self.day_slot_mut(day) = hours;
    }

    /// `(open, close)` pairs for `day`; a trailing unpaired entry is dropped.
    pub fn opening_intervals(&self, day: Weekday) -> Vec<(&str, &str)> {
        self.opening_hours(day)
            .unwrap_or_default()
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect()
    }

    fn day_slot(&self, day: Weekday) -> &Option<Vec<String>> {
        match day {
            Weekday::Mon => &self.opening_hours_mon,
            Weekday::Tue => &self.opening_hours_tue,
            Weekday::Wed => &self.opening_hours_wed,
            Weekday::Thu => &self.opening_hours_thu,
            Weekday::Fri => &self.opening_hours_fri,
            Weekday::Sat => &self.opening_hours_sat,
            Weekday::Sun => &self.opening_hours_sun,
        }
    }

    fn day_slot_mut(&mut self, day: Weekday) -> &mut Option<Vec<String>> {
        match day {
            Weekday::Mon => &mut self.opening_hours_mon,
            Weekday::Tue => &mut self.opening_hours_tue,
            Weekday::Wed => &mut self.opening_hours_wed,
            Weekday::Thu => &mut self.opening_hours_thu,
            Weekday::Fri => &mut self.opening_hours_fri,
            Weekday::Sat => &mut self.opening_hours_sat,
            Weekday::Sun => &mut self.opening_hours_sun,
        }
    }
}

impl Entity for Resource {
    const KEY: &'static str = "resource";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "phonenumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(rename = "national_id_no", skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Entity for Person {
    const KEY: &'static str = "person";
}

/// Links a service to a resource that can deliver it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Entity for Provider {
    const KEY: &'static str = "provider";
}

/// Booking lifecycle state. Transitions happen on the vendor side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    Confirmed,
    Cancelled,
    Declined,
    Deleted,
    Expired,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Booking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_from: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_to: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<BookingState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub public_booking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Entity for Booking {
    const KEY: &'static str = "booking";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
    #[serde(deserialize_with = "null_default")]
    pub capacity: u32,
    #[serde(deserialize_with = "null_default")]
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Entity for Event {
    const KEY: &'static str = "event";
}

/// Availability window for a service. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_end: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_timestamp_end: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub free: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_default")]
    pub open_resources: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_default")]
    pub available_resources: Vec<u64>,
}

impl Entity for Slot {
    const KEY: &'static str = "slot";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{decode_many, decode_one, encode_one};

    const PROVIDERS: &str = r#"[
        {"provider":{"created_at":"2015-08-27T00:55:03-05:00","id":2044912747,"resource_id":484,"service_id":395,"updated_at":"2015-08-27T00:55:03-05:00"}},
        {"provider":{"created_at":"2015-08-27T00:55:03-05:00","id":2044912746,"resource_id":484,"service_id":394,"updated_at":"2015-08-27T00:55:03-05:00"}},
        {"provider":{"created_at":"2015-08-27T00:55:03-05:00","id":2044912745,"resource_id":484,"service_id":393,"updated_at":"2015-08-27T00:55:03-05:00"}}
    ]"#;

    const BOOKING: &str = r#"{"booking":{"booked_from":"2015-11-10T08:00:00-06:00","booked_to":"2015-11-10T09:00:00-06:00","collection_id":null,"count":1,"created_at":"2015-11-07T09:09:32-06:00","custom_data":{},"event_id":null,"expires_at":null,"external_id":null,"id":410372,"notes":"Very handsome client","person_id":null,"resource_id":484,"service_id":394,"state":"confirmed","updated_at":"2015-11-07T09:09:32-06:00","resource":{"id":484,"title":"Calendar"}}}"#;

    const SERVICES: &str = r#"[
        {"service":{"active":true,"booking_capacity":1,"booking_type_id":1,"created_at":"2015-08-23T18:59:51-05:00","custom_data":{},"day_booking_specify_time":null,"description":"<p>This is a description of the service.</p>","has_day_booking":false,"id":393,"interval":60,"mail_confirmation":null,"mail_verification":null,"max_slots":1,"price":"20.0","same_day":false,"sms_confirmation":null,"sms_reminder":null,"sms_verification":null,"template":null,"title":"Cross Fit Session","updated_at":"2015-08-24T22:28:17-05:00"}},
        {"service":{"active":true,"booking_capacity":1,"booking_type_id":2,"created_at":"2015-08-23T19:00:07-05:00","custom_data":{},"day_booking_specify_time":null,"description":"<p>This is a cross fit type</p>","has_day_booking":false,"id":394,"interval":60,"mail_confirmation":null,"mail_verification":null,"max_slots":1,"price":null,"same_day":false,"sms_confirmation":null,"sms_reminder":null,"sms_verification":null,"template":null,"title":"Cross Fit Type","updated_at":"2015-08-23T19:01:34-05:00"}},
        {"service":{"active":true,"booking_capacity":10,"booking_type_id":1,"created_at":"2015-08-23T19:37:47-05:00","custom_data":{},"day_booking_specify_time":null,"description":null,"has_day_booking":false,"id":395,"interval":30,"mail_confirmation":null,"mail_verification":null,"max_slots":1,"price":null,"same_day":false,"sms_confirmation":null,"sms_reminder":null,"sms_verification":null,"template":null,"title":"Running Session","updated_at":"2015-08-23T19:37:47-05:00"}}
    ]"#;

    const RESOURCE: &str = r#"{"resource":{
        "capacity":4,"created_at":"2015-08-27T00:53:53-05:00","custom_data":{},"id":484,
        "opening_hours_fri":["08:00","20:00"],"opening_hours_mon":["08:00","20:00"],
        "opening_hours_sat":null,"opening_hours_sun":null,
        "opening_hours_thu":["08:00","20:00"],"opening_hours_tue":["08:00","20:00"],
        "opening_hours_wed":["08:00","20:00"],
        "title":"Calendar","updated_at":"2015-09-11T22:21:08-05:00",
        "services":[
            {"active":false,"booking_capacity":10,"booking_type_id":1,"created_at":"2015-08-23T19:37:47-05:00","custom_data":{},"day_booking_specify_time":null,"description":null,"has_day_booking":false,"id":395,"interval":30,"mail_confirmation":null,"mail_verification":null,"max_slots":1,"price":null,"same_day":false,"sms_confirmation":null,"sms_reminder":null,"sms_verification":null,"template":null,"title":"Running Session","updated_at":"2015-08-27T09:22:06-05:00"},
            {"active":true,"booking_capacity":1,"booking_type_id":2,"created_at":"2015-08-23T19:00:07-05:00","custom_data":{},"day_booking_specify_time":null,"description":"<p>This is a cross fit type</p>","has_day_booking":false,"id":394,"interval":60,"mail_confirmation":null,"mail_verification":null,"max_slots":1,"price":"20.0","same_day":false,"sms_confirmation":null,"sms_reminder":null,"sms_verification":null,"template":null,"title":"Cross Fit Type","updated_at":"2015-09-11T22:21:08-05:00"},
            {"active":false,"booking_capacity":1,"booking_type_id":1,"created_at":"2015-08-23T18:59:51-05:00","custom_data":{},"day_booking_specify_time":null,"description":"<p>This is a description of the service.</p>","has_day_booking":false,"id":393,"interval":60,"mail_confirmation":null,"mail_verification":null,"max_slots":1,"price":"20.0","same_day":false,"sms_confirmation":null,"sms_reminder":null,"sms_verification":null,"template":null,"title":"Cross Fit Session","updated_at":"2015-08-27T09:21:53-05:00"}
        ]}}"#;

    #[test]
    fn services_list_decodes() {
        let services: Vec<Service> = decode_many(SERVICES.as_bytes(), Service::KEY).unwrap();
        let ids: Vec<_> = services.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Some(393), Some(394), Some(395)]);
        assert_eq!(services[0].title, "Cross Fit Session");
        assert_eq!(services[0].price.as_deref(), Some("20.0"));
        assert_eq!(services[0].booking_type_id, Some(1));
        assert!(services[1].price.is_none());
        assert_eq!(services[2].booking_capacity, 10);
        assert_eq!(services[2].interval, 30);
        assert!(services[2].description.is_none());
        assert!(services.iter().all(|s| s.active && s.custom_data.is_some()));
    }

    #[test]
    fn resource_with_nested_services_decodes() {
        let res: Resource = decode_one(RESOURCE.as_bytes(), Resource::KEY).unwrap();
        assert_eq!(res.id, Some(484));
        assert_eq!(res.capacity, 4);
        assert_eq!(res.title, "Calendar");
        assert_eq!(res.opening_intervals(Weekday::Fri), vec![("08:00", "20:00")]);
        assert!(res.opening_hours(Weekday::Sun).is_none());
        let titles: Vec<_> = res.services.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Running Session", "Cross Fit Type", "Cross Fit Session"]);
        assert!(!res.services[0].active);
        assert_eq!(res.services[1].price.as_deref(), Some("20.0"));
    }

    #[test]
    fn null_plain_fields_decode_as_defaults() {
        let svc: Service = decode_one(
            br#"{"service":{"id":1,"title":"x","interval":null,"active":null,"max_slots":null}}"#,
            Service::KEY,
        )
        .unwrap();
        assert_eq!(svc.interval, 0);
        assert!(!svc.active);
        assert_eq!(svc.max_slots, 0);

        let svc: Service = decode_one(br#"{"service":{"id":2,"title":null}}"#, Service::KEY).unwrap();
        assert_eq!(svc.title, "");

        let res: Resource = decode_one(
            br#"{"resource":{"id":484,"title":"Calendar","capacity":null,"services":null}}"#,
            Resource::KEY,
        )
        .unwrap();
        assert_eq!(res.capacity, 0);
        assert!(res.services.is_empty());

        let events: Vec<Event> = decode_many(
            br#"[{"event":{"id":1,"capacity":null,"published":null}}]"#,
            Event::KEY,
        )
        .unwrap();
        assert_eq!(events[0].capacity, 0);
        assert!(!events[0].published);

        let slots: Vec<Slot> = decode_many(
            br#"[{"slot":{"free":null,"open_resources":null,"available_resources":null}}]"#,
            Slot::KEY,
        )
        .unwrap();
        assert_eq!(slots[0], Slot::default());
    }

    #[test]
    fn providers_decode_in_order_with_timestamps() {
        let providers: Vec<Provider> = decode_many(PROVIDERS.as_bytes(), Provider::KEY).unwrap();
        assert_eq!(providers.len(), 3);
        assert_eq!(providers[2].id, Some(2044912745));
        assert_eq!(providers[2].service_id, Some(393));
        assert!(providers.iter().all(|p| p.created_at.is_some() && p.updated_at.is_some()));
    }

    #[test]
    fn booking_nulls_decode_as_absent() {
        let booking: Booking = decode_one(BOOKING.as_bytes(), Booking::KEY).unwrap();
        assert_eq!(booking.id, Some(410372));
        assert_eq!(booking.state, Some(BookingState::Confirmed));
        assert!(booking.person_id.is_none());
        assert!(booking.expires_at.is_none());
        assert_eq!(
            booking.booked_from.unwrap().to_rfc3339(),
            "2015-11-10T08:00:00-06:00"
        );
    }

    #[test]
    fn booking_round_trip_keeps_absent_fields_absent() {
        let booking: Booking = decode_one(BOOKING.as_bytes(), Booking::KEY).unwrap();
        let body = encode_one(Booking::KEY, &booking).unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        let inner = &value["booking"];
        assert_eq!(inner["id"], 410372);
        assert_eq!(inner["resource_id"], 484);
        assert_eq!(inner["notes"], "Very handsome client");
        assert_eq!(inner["booked_from"], "2015-11-10T08:00:00-06:00");
        assert!(inner.get("expires_at").is_none());
        assert!(inner.get("person_id").is_none());

        let again: Booking = decode_one(body.as_bytes(), Booking::KEY).unwrap();
        assert_eq!(again, booking);
    }

    #[test]
    fn unknown_booking_state_is_preserved() {
        let state: BookingState = serde_json::from_str(r#""awaiting_verification""#).unwrap();
        assert_eq!(state, BookingState::Other("awaiting_verification".into()));
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#""awaiting_verification""#
        );
        assert_eq!(
            serde_json::to_string(&BookingState::Cancelled).unwrap(),
            r#""cancelled""#
        );
    }

    #[test]
    fn service_price_stays_textual() {
        let svc: Service = decode_one(
            br#"{"service":{"id":393,"active":true,"price":"20.0","title":"Cross Fit Session","template":null}}"#,
            Service::KEY,
        )
        .unwrap();
        assert_eq!(svc.price.as_deref(), Some("20.0"));
        assert!(svc.template.is_none());

        let svc: Service = decode_one(br#"{"service":{"id":394,"price":null}}"#, Service::KEY).unwrap();
        assert!(svc.price.is_none());
    }

    #[test]
    fn resource_opening_hours_by_weekday() {
        let res: Resource = decode_one(
            br#"{"resource":{"id":1,"capacity":1,"title":"Mr. Spine Twister",
                "opening_hours_mon":["08:00","16:00"],
                "opening_hours_tue":["08:00","11:00","13:00","17:30"],
                "opening_hours_sat":null}}"#,
            Resource::KEY,
        )
        .unwrap();
        assert_eq!(res.opening_intervals(Weekday::Mon), vec![("08:00", "16:00")]);
        assert_eq!(
            res.opening_intervals(Weekday::Tue),
            vec![("08:00", "11:00"), ("13:00", "17:30")]
        );
        assert!(res.opening_hours(Weekday::Sat).is_none());
        assert!(res.opening_intervals(Weekday::Sun).is_empty());
    }

    #[test]
    fn resource_encodes_closed_days_as_null() {
        let mut res = Resource {
            id: Some(484),
            title: "Calendar".into(),
            ..Default::default()
        };
        res.set_opening_hours(Weekday::Mon, Some(vec!["08:00".into(), "10:00".into()]));
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(value["opening_hours_mon"], serde_json::json!(["08:00", "10:00"]));
        assert!(value["opening_hours_sun"].is_null());
    }

    #[test]
    fn person_custom_data_is_open() {
        let person: Person = decode_one(
            br#"{"person":{"id":1,"name":"Espen Antonsen","phonenumber":"",
                "custom_data":{"shoe_size":44,"tags":["vip"]}}}"#,
            Person::KEY,
        )
        .unwrap();
        let custom = person.custom_data.unwrap();
        assert_eq!(custom["shoe_size"], 44);
        assert_eq!(custom["tags"][0], "vip");
        assert_eq!(person.phone_number.as_deref(), Some(""));
    }
}
