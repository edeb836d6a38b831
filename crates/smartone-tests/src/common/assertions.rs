// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Assertions
//!
//! Helpers for inspecting HTTP responses produced by the router.

use axum::body::to_bytes;
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde_json::Value;

/// Reads the response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Asserts the status and error code of an error response and returns the body.
pub async fn assert_error(response: Response, status: StatusCode, code: &str) -> Value {
    assert_eq!(response.status(), status, "unexpected status");
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], code, "unexpected error body: {body}");
    body
}

/// Asserts a `303 See Other` to `location`.
pub fn assert_redirect(response: &Response, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let actual = response
        .headers()
        .get(header::LOCATION)
        .expect("Redirect without Location header");
    assert_eq!(actual, location);
}

/// Returns every `Set-Cookie` value on the response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Returns the value the response sets for cookie `name`, if any.
pub fn set_cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(response).into_iter().find_map(|cookie| {
        cookie
            .strip_prefix(&prefix)
            .and_then(|rest| rest.split(';').next())
            .map(str::to_string)
    })
}

/// Asserts that no string in `body` contains `needle`.
pub fn assert_not_leaked(body: &Value, needle: &str) {
    let rendered = body.to_string();
    assert!(
        !rendered.contains(needle),
        "response body leaks internal detail: {rendered}"
    );
}
