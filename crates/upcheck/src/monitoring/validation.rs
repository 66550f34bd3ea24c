//! Validation of raw check records read from a store.
//!
//! Records are written by the CRUD layer, so nothing about their shape can
//! be trusted. Every field the engine needs is re-derived here with an
//! explicit predicate and a single failing field rejects the whole record.
//! The persisted state fields fall back to defaults instead, so a check that
//! has never been probed is still eligible for its first probe.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{CheckSpec, CheckState, CheckStatus, HttpMethod, Protocol, ValidatedCheck};

/// Keys of the stored record
pub mod fields {
    pub const ID: &str = "id";
    pub const USER_PHONE: &str = "userPhone";
    pub const PROTOCOL: &str = "protocol";
    pub const URL: &str = "url";
    pub const METHOD: &str = "method";
    pub const SUCCESS_CODES: &str = "successCodes";
    pub const TIMEOUT_SECONDS: &str = "timeoutSeconds";
    pub const STATE: &str = "state";
    pub const LAST_CHECKED: &str = "lastChecked";
}

pub const ID_LENGTH: usize = 20;
pub const PHONE_LENGTH: usize = 10;
pub const MIN_TIMEOUT_SECONDS: u64 = 1;
pub const MAX_TIMEOUT_SECONDS: u64 = 5;

/// Why a stored record cannot be probed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record is not valid JSON: {0}")]
    Unparsable(String),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("field `{field}` {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField { field, reason: reason.into() }
    }
}

/// Validate a raw record into a `CheckSpec` and its persisted state
pub fn validate(raw: &Value) -> Result<ValidatedCheck, ValidationError> {
    let record = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    let spec = CheckSpec {
        id: validate_id(record)?,
        owner_phone: validate_phone(record)?,
        protocol: validate_protocol(record)?,
        url: validate_url(record)?,
        method: validate_method(record)?,
        success_codes: validate_success_codes(record)?,
        timeout_seconds: validate_timeout(record)?,
    };

    let state = CheckState {
        status: stored_status(record),
        last_checked: stored_last_checked(record),
    };

    Ok(ValidatedCheck { spec, state })
}

fn string_field<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match record.get(field) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(ValidationError::field(field, "must be a string")),
        None => Err(ValidationError::field(field, "is missing")),
    }
}

fn validate_id(record: &Map<String, Value>) -> Result<String, ValidationError> {
    let id = string_field(record, fields::ID)?.trim();
    if id.chars().count() != ID_LENGTH {
        return Err(ValidationError::field(
            fields::ID,
            format!("must be exactly {ID_LENGTH} characters"),
        ));
    }
    Ok(id.to_string())
}

fn validate_phone(record: &Map<String, Value>) -> Result<String, ValidationError> {
    let phone = string_field(record, fields::USER_PHONE)?.trim();
    if phone.len() != PHONE_LENGTH || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::field(
            fields::USER_PHONE,
            format!("must be exactly {PHONE_LENGTH} digits"),
        ));
    }
    Ok(phone.to_string())
}

fn validate_protocol(record: &Map<String, Value>) -> Result<Protocol, ValidationError> {
    match string_field(record, fields::PROTOCOL)? {
        "http" => Ok(Protocol::Http),
        "https" => Ok(Protocol::Https),
        other => Err(ValidationError::field(
            fields::PROTOCOL,
            format!("'{other}' is not one of http, https"),
        )),
    }
}

fn validate_url(record: &Map<String, Value>) -> Result<String, ValidationError> {
    let url = string_field(record, fields::URL)?.trim();
    if url.is_empty() {
        return Err(ValidationError::field(fields::URL, "cannot be empty"));
    }
    Ok(url.to_string())
}

fn validate_method(record: &Map<String, Value>) -> Result<HttpMethod, ValidationError> {
    match string_field(record, fields::METHOD)? {
        "get" => Ok(HttpMethod::Get),
        "post" => Ok(HttpMethod::Post),
        "put" => Ok(HttpMethod::Put),
        "delete" => Ok(HttpMethod::Delete),
        other => Err(ValidationError::field(
            fields::METHOD,
            format!("'{other}' is not one of get, post, put, delete"),
        )),
    }
}

fn validate_success_codes(record: &Map<String, Value>) -> Result<BTreeSet<u16>, ValidationError> {
    let codes = match record.get(fields::SUCCESS_CODES) {
        Some(Value::Array(codes)) => codes,
        Some(_) => return Err(ValidationError::field(fields::SUCCESS_CODES, "must be an array")),
        None => return Err(ValidationError::field(fields::SUCCESS_CODES, "is missing")),
    };

    if codes.is_empty() {
        return Err(ValidationError::field(fields::SUCCESS_CODES, "cannot be empty"));
    }

    codes
        .iter()
        .map(|code| {
            integral(code)
                .filter(|code| (100..=599).contains(code))
                .map(|code| code as u16)
                .ok_or_else(|| {
                    ValidationError::field(
                        fields::SUCCESS_CODES,
                        format!("{code} is not an HTTP status code"),
                    )
                })
        })
        .collect()
}

fn validate_timeout(record: &Map<String, Value>) -> Result<u64, ValidationError> {
    let value = record
        .get(fields::TIMEOUT_SECONDS)
        .ok_or_else(|| ValidationError::field(fields::TIMEOUT_SECONDS, "is missing"))?;

    integral(value)
        .filter(|seconds| (MIN_TIMEOUT_SECONDS as i64..=MAX_TIMEOUT_SECONDS as i64).contains(seconds))
        .map(|seconds| seconds as u64)
        .ok_or_else(|| {
            ValidationError::field(
                fields::TIMEOUT_SECONDS,
                format!(
                    "must be a whole number between {MIN_TIMEOUT_SECONDS} and {MAX_TIMEOUT_SECONDS}"
                ),
            )
        })
}

/// Whole JSON number, accepting `3.0` as well as `3`
fn integral(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    value
        .as_f64()
        .filter(|number| number.is_finite() && number.fract() == 0.0)
        .map(|number| number as i64)
}

fn stored_status(record: &Map<String, Value>) -> CheckStatus {
    match record.get(fields::STATE).and_then(Value::as_str) {
        Some("up") => CheckStatus::Up,
        _ => CheckStatus::Down,
    }
}

fn stored_last_checked(record: &Map<String, Value>) -> Option<DateTime<Utc>> {
    record
        .get(fields::LAST_CHECKED)
        .and_then(Value::as_f64)
        .filter(|millis| *millis > 0.0)
        .and_then(|millis| DateTime::from_timestamp_millis(millis as i64))
}
