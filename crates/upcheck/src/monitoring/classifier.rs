use super::types::{CheckOutcome, CheckSpec, CheckState, CheckStatus, Classification};

/// Decide the new state of a check from one probe outcome.
///
/// A check is up only when the target answered with one of its success
/// codes. An alert is warranted when the state flips, except on the very
/// first probe of a check: without a previous `last_checked` there is no
/// earlier state to compare against, so no alert is raised even if the
/// check starts out down.
pub fn classify(spec: &CheckSpec, prior: &CheckState, outcome: &CheckOutcome) -> Classification {
    let status = match outcome {
        CheckOutcome::Response { code } if spec.success_codes.contains(code) => CheckStatus::Up,
        _ => CheckStatus::Down,
    };

    let alert_warranted = prior.last_checked.is_some() && prior.status != status;

    Classification { status, alert_warranted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::{HttpMethod, Protocol};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn spec() -> CheckSpec {
        CheckSpec {
            id: "abcdefghij0123456789".to_string(),
            owner_phone: "5551234567".to_string(),
            protocol: Protocol::Http,
            url: "example.com".to_string(),
            method: HttpMethod::Get,
            success_codes: BTreeSet::from([200, 201]),
            timeout_seconds: 2,
        }
    }

    fn checked(status: CheckStatus) -> CheckState {
        CheckState {
            status,
            last_checked: Some(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    fn never_checked(status: CheckStatus) -> CheckState {
        CheckState { status, last_checked: None }
    }

    #[test]
    fn test_recovery_after_downtime_alerts() {
        let result = classify(&spec(), &checked(CheckStatus::Down), &CheckOutcome::Response { code: 200 });
        assert_eq!(result, Classification { status: CheckStatus::Up, alert_warranted: true });
    }

    #[test]
    fn test_timeout_while_down_is_silent() {
        let result = classify(&spec(), &checked(CheckStatus::Down), &CheckOutcome::Timeout);
        assert_eq!(result, Classification { status: CheckStatus::Down, alert_warranted: false });
    }

    #[test]
    fn test_first_probe_never_alerts() {
        let result =
            classify(&spec(), &never_checked(CheckStatus::Down), &CheckOutcome::Response { code: 200 });
        assert_eq!(result, Classification { status: CheckStatus::Up, alert_warranted: false });

        let outcomes = [
            CheckOutcome::Response { code: 201 },
            CheckOutcome::Response { code: 500 },
            CheckOutcome::Timeout,
            CheckOutcome::TransportError { detail: "connection refused".to_string() },
        ];
        for prior in [CheckStatus::Up, CheckStatus::Down] {
            for outcome in &outcomes {
                assert!(!classify(&spec(), &never_checked(prior), outcome).alert_warranted);
            }
        }
    }

    #[test]
    fn test_unlisted_status_code_is_down() {
        let result = classify(&spec(), &checked(CheckStatus::Up), &CheckOutcome::Response { code: 204 });
        assert_eq!(result, Classification { status: CheckStatus::Down, alert_warranted: true });
    }

    #[test]
    fn test_transport_error_takes_check_down() {
        let outcome = CheckOutcome::TransportError { detail: "dns error".to_string() };
        let result = classify(&spec(), &checked(CheckStatus::Up), &outcome);
        assert_eq!(result, Classification { status: CheckStatus::Down, alert_warranted: true });
    }

    #[test]
    fn test_steady_state_is_silent() {
        let result = classify(&spec(), &checked(CheckStatus::Up), &CheckOutcome::Response { code: 201 });
        assert_eq!(result, Classification { status: CheckStatus::Up, alert_warranted: false });
    }

    #[test]
    fn test_classification_is_deterministic() {
        let prior = checked(CheckStatus::Up);
        let outcome = CheckOutcome::Response { code: 503 };
        let first = classify(&spec(), &prior, &outcome);

        for _ in 0..10 {
            assert_eq!(classify(&spec(), &prior, &outcome), first);
        }
    }
}
