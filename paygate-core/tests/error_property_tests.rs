//! Property-based tests for the error system.

use paygate_core::error::{Error, NetworkError, RETRY_LIMIT_MESSAGE};
use proptest::prelude::*;
use std::error::Error as StdError;

// ============================================================================
// Test Generators
// ============================================================================

/// Strategy for generating response bodies, including JSON-looking ones.
fn body_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 _-]{0,100}".prop_map(|s| s.to_string()),
        "[a-z]{1,10}".prop_map(|s| format!("{{\"error\":{{\"message\":\"{s}\"}}}}")),
    ]
}

/// Strategy for generating every status-derived Error variant.
fn status_error_strategy() -> impl Strategy<Value = Error> {
    prop_oneof![
        body_strategy().prop_map(Error::unprocessable_entity),
        body_strategy().prop_map(Error::authentication),
        body_strategy().prop_map(Error::authorization),
        body_strategy().prop_map(Error::upgrade_required),
        body_strategy().prop_map(Error::server_error),
        body_strategy().prop_map(Error::service_unavailable),
        (100u16..600, body_strategy()).prop_map(|(status, body)| Error::unexpected_status(status, body)),
    ]
}

/// Strategy for generating all Error variants.
fn error_strategy() -> impl Strategy<Value = Error> {
    prop_oneof![
        status_error_strategy(),
        "[a-z ]{1,40}".prop_map(|s| Error::malformed_request(s)),
        "[a-z ]{1,40}".prop_map(|s| Error::invalid_argument(s)),
        Just(()).prop_map(|()| Error::rate_limit()),
        "[a-z ]{1,40}".prop_map(Error::network),
        "[a-z ]{1,40}".prop_map(Error::ssl),
        Just(()).prop_map(|()| Error::from(NetworkError::Timeout)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_status_error_message_is_body(body in body_strategy(), status in 0usize..7) {
        let errors = [
            Error::unprocessable_entity(body.clone()),
            Error::authentication(body.clone()),
            Error::authorization(body.clone()),
            Error::upgrade_required(body.clone()),
            Error::server_error(body.clone()),
            Error::service_unavailable(body.clone()),
            Error::unexpected_status(418, body.clone()),
        ];
        prop_assert_eq!(errors[status].message(), Some(body.as_str()));
    }

    #[test]
    fn prop_error_display_non_empty(error in error_strategy()) {
        let display = format!("{}", error);
        prop_assert!(
            !display.is_empty() || error.message() == Some(""),
            "Error display should not be empty: {:?}",
            error
        );
    }

    #[test]
    fn prop_error_box_conversion(error in error_strategy()) {
        let debug = format!("{error:?}");
        let boxed: Box<dyn StdError + Send + Sync + 'static> = Box::new(error);
        prop_assert_eq!(format!("{boxed:?}"), debug);
    }

    #[test]
    fn prop_retry_limit_wraps_any_error(error in error_strategy()) {
        let expected = error.to_string();
        let wrapped = Error::retry_limit_exceeded(error);

        prop_assert_eq!(wrapped.to_string(), RETRY_LIMIT_MESSAGE);
        let source = wrapped.source().map(ToString::to_string);
        prop_assert_eq!(source, Some(expected));
        prop_assert!(wrapped.last_attempt_error().is_some());
    }

    #[test]
    fn prop_error_context_preserved(
        base_error in error_strategy(),
        context_msg in "[a-z ]{1,40}"
    ) {
        let status = base_error.status_code();
        let with_context = base_error.context(context_msg.clone());

        prop_assert_eq!(with_context.to_string(), context_msg);
        prop_assert_eq!(with_context.status_code(), status);
        prop_assert!(with_context.report().len() >= with_context.to_string().len());
    }
}
