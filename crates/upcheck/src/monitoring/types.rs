use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classified availability of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Up,
    #[default]
    Down,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Up => "up",
            CheckStatus::Down => "down",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport used to reach the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method a check is allowed to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Uppercase wire name, e.g. `GET`
    pub fn as_upper(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Validated, immutable view of one check.
///
/// Built fresh from the stored record every cycle and never written back
/// directly; the persisted fields are updated through `commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSpec {
    /// 20 character identifier
    pub id: String,

    /// 10 digit subscriber number alerts are sent to
    pub owner_phone: String,

    pub protocol: Protocol,

    /// Host and path, without scheme
    pub url: String,

    pub method: HttpMethod,

    /// Status codes considered "up"
    pub success_codes: BTreeSet<u16>,

    /// Probe budget, 1 to 5 seconds
    pub timeout_seconds: u64,
}

impl CheckSpec {
    /// Full target, e.g. `https://example.com/health`
    pub fn target(&self) -> String {
        format!("{}://{}", self.protocol, self.url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_seconds * 1000)
    }
}

/// Persisted, mutable part of a check record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckState {
    pub status: CheckStatus,

    /// Time of the last completed probe, `None` if never probed
    pub last_checked: Option<DateTime<Utc>>,
}

/// A stored record that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheck {
    pub spec: CheckSpec,
    pub state: CheckState,
}

/// Raw result of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The target answered, whatever the status code
    Response { code: u16 },

    /// DNS, connection, TLS or protocol failure
    TransportError { detail: String },

    /// No answer within the check's timeout
    Timeout,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Response { code } => write!(f, "responded with {code}"),
            CheckOutcome::TransportError { detail } => write!(f, "transport error: {detail}"),
            CheckOutcome::Timeout => write!(f, "timed out"),
        }
    }
}

/// New state of a check and whether its owner should hear about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: CheckStatus,
    pub alert_warranted: bool,
}
