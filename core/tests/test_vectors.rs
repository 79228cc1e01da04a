//! Verify request building and response checking against the JSON vectors in
//! `test-vectors/`.
//!
//! Bodies are compared as parsed JSON so field order does not matter.

use chrono::NaiveDate;
use makeplans_core::{
    ApiError, Booking, BookingAction, BookingParams, ClientConfig, HttpMethod, HttpRequest, HttpResponse,
    MakeplansClient, Person, Provider, Resource, Service, SlotParams,
};
use serde_json::Value;

fn client() -> MakeplansClient {
    MakeplansClient::new(&ClientConfig::new("acme", "token123"))
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn date(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
}

fn id_list(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .map(|ids| ids.iter().map(|id| id.as_u64().unwrap()).collect())
        .unwrap_or_default()
}

fn slot_params(input: &Value) -> SlotParams {
    SlotParams {
        from: date(&input["from"]),
        to: date(&input["to"]),
        selected_resources: id_list(&input["selected_resources"]),
    }
}

fn booking_params(input: &Value) -> BookingParams {
    BookingParams {
        service_id: input["service_id"].as_u64(),
        resource_id: input["resource_id"].as_u64(),
        person_id: input["person_id"].as_u64(),
        event_id: input["event_id"].as_u64(),
        external_id: input["external_id"].as_str().map(str::to_string),
        start: date(&input["start"]),
        end: date(&input["end"]),
        ..Default::default()
    }
}

fn input<T: serde::de::DeserializeOwned>(case: &Value) -> T {
    serde_json::from_value(case["input"].clone()).unwrap()
}

fn build(c: &MakeplansClient, case: &Value) -> HttpRequest {
    let id = case["id"].as_u64().unwrap_or_default();
    match case["operation"].as_str().unwrap() {
        "list_services" => c.build_list_services(),
        "create_service" => c.build_create_service(&input::<Service>(case)).unwrap(),
        "update_service" => c.build_update_service(&input::<Service>(case)).unwrap(),
        "delete_service" => c.build_delete_service(id),
        "service_slots" => c.build_service_slots(id, &slot_params(&case["input"])),
        "next_available_date" => {
            c.build_next_available_date(&id_list(&case["ids"]), &slot_params(&case["input"])).unwrap()
        }
        "get_resource" => c.build_get_resource(id),
        "update_resource" => c.build_update_resource(&input::<Resource>(case)).unwrap(),
        "update_provider" => c.build_update_provider(&input::<Provider>(case)).unwrap(),
        "create_person" => c.build_create_person(&input::<Person>(case)).unwrap(),
        "create_booking" => c.build_create_booking(&input::<Booking>(case)).unwrap(),
        "list_bookings" => c.build_list_bookings(&booking_params(&case["input"])),
        "list_all_bookings" => c.build_list_all_bookings(),
        "booking_action" => {
            let action: BookingAction = case["action"].as_str().unwrap().parse().unwrap();
            c.build_booking_action(id, action)
        }
        "list_events" => c.build_list_events(),
        other => panic!("unknown operation: {other}"),
    }
}

#[test]
fn request_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();
    let headers = vectors["headers"].as_object().unwrap();

    let c = client();
    assert_eq!(c.base_url(), base_url);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(&c, case);

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(
            req.url,
            format!("{base_url}{}", expected["path"].as_str().unwrap()),
            "{name}: url"
        );
        for (header, value) in headers {
            assert_eq!(req.header(header), value.as_str(), "{name}: header {header}");
        }

        let body: Value = match &req.body {
            Some(body) => serde_json::from_str(body).unwrap(),
            None => Value::Null,
        };
        assert_eq!(body, expected["body"], "{name}: body");
    }
}

fn outcome(err: &ApiError) -> &'static str {
    match err {
        ApiError::EmptyResponse => "empty_response",
        ApiError::NotFound => "not_found",
        ApiError::BookingCapacityLimit => "booking_capacity_limit",
        ApiError::EmailTaken => "email_taken",
        ApiError::Vendor { .. } => "vendor",
        ApiError::FieldValidation(_) => "field_validation",
        ApiError::Http { .. } => "http",
        other => panic!("unexpected error from check: {other:?}"),
    }
}

#[test]
fn classify_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let response = HttpResponse::new(status, case["body"].as_str().unwrap());

        match c.check(&response) {
            Ok(()) => assert_eq!(case["expected"], "ok", "{name}: outcome"),
            Err(err) => {
                assert_eq!(outcome(&err), case["expected"].as_str().unwrap(), "{name}: outcome");
                if let Some(display) = case["display"].as_str() {
                    assert_eq!(err.to_string(), display, "{name}: display");
                }
            }
        }
    }
}

#[test]
fn update_without_id_is_rejected_before_sending() {
    let c = client();
    let err = c.build_update_booking(&Booking::default()).unwrap_err();
    assert!(matches!(err, ApiError::IdRequired));

    let err = c
        .build_update_provider(&Provider {
            id: Some(0),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::IdRequired));
}
