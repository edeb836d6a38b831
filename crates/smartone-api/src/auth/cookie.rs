// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session cookie and bearer credential handling.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;
use smartone_config::schema::MAX_SESSION_AGE_SECS;
use smartone_config::SessionConfig;

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `Authorization: Bearer` header.
    Bearer,
    /// Session cookie.
    Cookie,
}

/// Reads and writes the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    max_age: Duration,
}

impl SessionCookie {
    /// Creates a cookie helper.
    pub fn new(name: impl Into<String>, secure: bool, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age,
        }
    }

    /// Creates a cookie helper from the session configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.cookie_name.clone(),
            config.cookie_secure,
            Duration::seconds(config.max_age_secs.min(MAX_SESSION_AGE_SECS) as i64),
        )
    }

    /// Returns the cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finds the session credential: bearer header first, then cookie.
    pub fn credential(&self, headers: &HeaderMap) -> Option<(String, CredentialSource)> {
        if let Some(token) = bearer_token(headers) {
            return Some((token, CredentialSource::Bearer));
        }
        self.read(headers).map(|token| (token, CredentialSource::Cookie))
    }

    /// Reads the session cookie value.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Builds a `Set-Cookie` value carrying the token.
    pub fn issue(&self, token: &str) -> Option<HeaderValue> {
        self.render(token, self.max_age.num_seconds())
    }

    /// Builds a `Set-Cookie` value that removes the cookie.
    pub fn expire(&self) -> Option<HeaderValue> {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }
}

/// Extracts the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================
