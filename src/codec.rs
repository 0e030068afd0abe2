//! JSON <-> record conversion.
//!
//! Bodies are checked against the record's [`DataClass`] before serde sees
//! them, so callers get messages naming the offending field instead of a
//! serde position.

use crate::error::ApiError;
use crate::record::{DataClass, Record};
use serde::Serialize;
use serde_json::Value;

/// Decode a request body into `R`.
///
/// An empty body or a literal `null` is an absent candidate (`Ok(None)`).
/// Anything that is not a well-formed object matching the descriptor is a
/// [`ApiError::BadRequest`].
pub fn decode_record<R: Record>(body: &[u8]) -> Result<Option<R>, ApiError> {
    let class = R::data_class();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        ApiError::bad_request(format!("Malformed JSON body for {}: {e}", class.name))
    })?;
    if value.is_null() {
        return Ok(None);
    }
    decode_value(value).map(Some)
}

/// Decode an already parsed JSON value into `R`.
pub fn decode_value<R: Record>(value: Value) -> Result<R, ApiError> {
    let class = R::data_class();
    check_structure(&value, class)?;
    serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Invalid {} body: {e}", class.name)))
}

fn check_structure(value: &Value, class: &DataClass) -> Result<(), ApiError> {
    let Some(object) = value.as_object() else {
        return Err(ApiError::bad_request(format!(
            "Expected a JSON object for {}",
            class.name
        )));
    };
    for field in class.fields {
        match object.get(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(ApiError::bad_request(format!(
                    "Missing required field `{}` for {}",
                    field.name, class.name
                )));
            }
            Some(v) if !field.accepts(v) => {
                return Err(ApiError::bad_request(format!(
                    "Field `{}` of {} must be {}",
                    field.name,
                    class.name,
                    field.expected()
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Structural encoding of a service result.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal(format!("Failed to encode result: {e}")))
}

/// Wire bytes of an encoded value.
#[must_use]
pub fn to_bytes(value: &Value) -> Vec<u8> {
    value.to_string().into_bytes()
}
