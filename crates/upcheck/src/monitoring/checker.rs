use std::error::Error as StdError;

use anyhow::Result;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

use super::slot::first_outcome;
use super::types::{CheckOutcome, CheckSpec};

const USER_AGENT: &str = concat!("uppe-worker/", env!("CARGO_PKG_VERSION"));

/// Executes one probe against a check's target
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Perform exactly one request and report its outcome.
    ///
    /// Never retries; a failed probe is retried by the next cycle.
    async fn check(&self, spec: &CheckSpec) -> CheckOutcome;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new() -> Result<Self> {
        // Redirects are reported as-is so that 3xx codes can be success codes
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client })
    }

    fn build_request(&self, spec: &CheckSpec) -> Result<reqwest::RequestBuilder, CheckOutcome> {
        let target = spec.target();
        let url = Url::parse(&target).map_err(|e| CheckOutcome::TransportError {
            detail: format!("invalid target {target}: {e}"),
        })?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(CheckOutcome::TransportError { detail: format!("no host in {target}") });
        }

        Ok(self.client.request(spec.method.into(), url).timeout(spec.timeout()))
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, spec: &CheckSpec) -> CheckOutcome {
        let request = match self.build_request(spec) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        debug!(check_id = %spec.id, "{} {}", spec.method.as_upper(), spec.target());

        first_outcome(
            async move {
                match request.send().await {
                    Ok(response) => CheckOutcome::Response { code: response.status().as_u16() },
                    Err(e) if e.is_timeout() => CheckOutcome::Timeout,
                    Err(e) => CheckOutcome::TransportError { detail: error_chain(&e) },
                }
            },
            spec.timeout(),
        )
        .await
    }
}

/// Render an error with all of its sources, e.g. `error sending request: connection refused`
fn error_chain(error: &dyn StdError) -> String {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !detail.ends_with(&message) {
            detail.push_str(": ");
            detail.push_str(&message);
        }
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::{HttpMethod, Protocol};
    use std::collections::BTreeSet;

    fn spec(url: &str) -> CheckSpec {
        CheckSpec {
            id: "abcdefghij0123456789".to_string(),
            owner_phone: "5551234567".to_string(),
            protocol: Protocol::Http,
            url: url.to_string(),
            method: HttpMethod::Get,
            success_codes: BTreeSet::from([200]),
            timeout_seconds: 1,
        }
    }

    #[tokio::test]
    async fn test_unparsable_target_is_transport_error() {
        let checker = HttpChecker::new().unwrap();

        let outcome = checker.check(&spec("exa mple.com:notaport/")).await;
        assert!(matches!(outcome, CheckOutcome::TransportError { .. }), "got {outcome:?}");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct SendError(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");

        let detail = error_chain(&SendError(inner));
        assert_eq!(detail, "error sending request: connection refused");
    }
}
