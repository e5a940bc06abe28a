//! Property-based tests for response handling.
//!
//! Uses proptest with 100 iterations per property.

use harness_client::ApiResponse;
use harness_data::generators::http_status_code_strategy;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any body text is accepted; non-JSON text parses to `Null` and is kept verbatim.
    #[test]
    fn prop_any_body_text_is_accepted(status in http_status_code_strategy(), text in ".{0,64}") {
        let response = ApiResponse::from_parts(status, text.clone(), Duration::ZERO);
        prop_assert_eq!(&response.text, &text);
        if serde_json::from_str::<Value>(&text).is_err() {
            prop_assert_eq!(response.body, Value::Null);
        }
    }

    /// Success is exactly the 2xx range.
    #[test]
    fn prop_success_is_2xx(status in 100u16..600) {
        let response = ApiResponse::from_parts(status, String::new(), Duration::ZERO);
        prop_assert_eq!(response.is_success(), (200..300).contains(&status));
    }

    /// Error flag and code are read straight from the body.
    #[test]
    fn prop_error_fields_are_read(flag in any::<bool>(), code in "[A-Za-z_]{1,24}") {
        let text = json!({"error": flag, "code": code}).to_string();
        let response = ApiResponse::from_parts(400, text, Duration::ZERO);
        prop_assert_eq!(response.error_flag(), flag);
        prop_assert_eq!(response.code(), Some(code.as_str()));
    }
}
