//! Wrapping and unwrapping of the vendor's per-resource JSON envelopes.
//!
//! Every record travels under a singular key: `{"booking": {...}}` for one
//! record and `[{"booking": {...}}, {"booking": {...}}]` for a list. The key
//! is required on every element; a bare array of records is rejected.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A record that travels wrapped under `KEY`.
pub trait Entity: Serialize + DeserializeOwned {
    const KEY: &'static str;
}

/// Decode `{"<key>": {...}}`. Other top-level keys are ignored.
pub fn decode_one<T: DeserializeOwned>(bytes: &[u8], key: &str) -> Result<T, ApiError> {
    let wrapper: Map<String, Value> = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Deserialization(format!("expected {key} envelope: {e}")))?;
    unwrap_value(wrapper, key)
}

/// Decode `[{"<key>": {...}}, ...]`, preserving order.
pub fn decode_many<T: DeserializeOwned>(bytes: &[u8], key: &str) -> Result<Vec<T>, ApiError> {
    let wrappers: Vec<Map<String, Value>> = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Deserialization(format!("expected list of {key} envelopes: {e}")))?;
    wrappers
        .into_iter()
        .enumerate()
        .map(|(i, wrapper)| {
            unwrap_value(wrapper, key)
                .map_err(|e| ApiError::Deserialization(format!("item {i}: {e}")))
        })
        .collect()
}

/// Wrap `value` under `key` and serialize it for a request body.
pub fn encode_one<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, ApiError> {
    let inner = serde_json::to_value(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
    let mut wrapper = Map::with_capacity(1);
    wrapper.insert(key.to_string(), inner);
    serde_json::to_string(&wrapper).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn unwrap_value<T: DeserializeOwned>(mut wrapper: Map<String, Value>, key: &str) -> Result<T, ApiError> {
    let inner = wrapper
        .remove(key)
        .ok_or_else(|| ApiError::Deserialization(format!("missing `{key}` key")))?;
    serde_json::from_value(inner).map_err(|e| ApiError::Deserialization(format!("{key}: {e}")))
}
