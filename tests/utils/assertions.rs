//! Test assertion helpers - fluent API for verifying responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::Value;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion {
    pub status: StatusCode,
    pub body: Value,
}

impl ResponseAssertion {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// Assert the response status, keeping the body for further checks
    pub fn status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "unexpected status, body: {}",
            self.body
        );
        self
    }

    /// Assert the `{"error": ...}` body of a failed request
    pub fn error(self, expected: &str) -> Self {
        assert_eq!(self.body["error"], expected, "unexpected error body");
        self
    }

    /// The `id` of a created record
    pub fn id(&self) -> i64 {
        self.body["id"]
            .as_i64()
            .unwrap_or_else(|| panic!("response has no id: {}", self.body))
    }
}
