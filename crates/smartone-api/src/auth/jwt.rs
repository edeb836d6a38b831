// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session token signing and verification.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use smartone_config::{SessionAlgorithm, SessionConfig};
use thiserror::Error;

use super::claims::{SessionClaims, SessionClaimsBuilder};

// =============================================================================
// TokenError
// =============================================================================

/// Result type alias for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Session token errors.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token manager cannot be built from the configuration.
    #[error("Invalid session configuration: {message}")]
    Configuration {
        /// What is wrong.
        message: String,
    },

    /// The token has expired.
    #[error("Token has expired")]
    Expired,

    /// The token is not valid yet.
    #[error("Token is not valid yet")]
    NotYetValid,

    /// The signature does not match.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The token was issued by someone else.
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// The token cannot be parsed.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Parser message.
        message: String,
    },

    /// Signing failed.
    #[error("Failed to sign token: {message}")]
    Encoding {
        /// Encoder message.
        message: String,
    },
}

impl TokenError {
    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            TokenError::Configuration { .. } => "configuration",
            TokenError::Expired => "expired",
            TokenError::NotYetValid => "not_yet_valid",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidIssuer => "invalid_issuer",
            TokenError::Malformed { .. } => "malformed",
            TokenError::Encoding { .. } => "encoding",
        }
    }

    fn from_decode(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            _ => TokenError::Malformed {
                message: err.to_string(),
            },
        }
    }
}

// =============================================================================
// IssuedToken
// =============================================================================

/// A signed token together with the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The claims that were signed.
    pub claims: SessionClaims,
    /// The compact JWT.
    pub token: String,
}

// =============================================================================
// SessionTokenManager
// =============================================================================

/// Signs, verifies and renews session tokens.
#[derive(Clone)]
pub struct SessionTokenManager {
    issuer: String,
    algorithm: Algorithm,
    max_age: Duration,
    update_age: Duration,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl SessionTokenManager {
    /// Creates a token manager from the session configuration.
    pub fn new(config: &SessionConfig) -> TokenResult<Self> {
        let secret = config
            .secret
            .as_ref()
            .filter(|s| !s.raw().is_empty())
            .ok_or_else(|| TokenError::Configuration {
                message: "session secret is not configured".to_string(),
            })?;

        let algorithm = match config.algorithm {
            SessionAlgorithm::HS256 => Algorithm::HS256,
            SessionAlgorithm::HS384 => Algorithm::HS384,
            SessionAlgorithm::HS512 => Algorithm::HS512,
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = config.leeway_secs;

        Ok(Self {
            issuer: config.issuer.clone(),
            algorithm,
            max_age: to_chrono("max_age_secs", config.max_age_secs)?,
            update_age: to_chrono("update_age_secs", config.update_age_secs)?,
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(validation),
        })
    }

    /// Stamps issuer and lifetime onto assembled claims.
    pub fn stamp(&self, builder: SessionClaimsBuilder) -> SessionClaims {
        builder.issuer(&self.issuer).lifetime(self.max_age).build()
    }

    /// Signs the given claims.
    pub fn encode(&self, claims: &SessionClaims) -> TokenResult<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key).map_err(|e| {
            TokenError::Encoding {
                message: e.to_string(),
            }
        })
    }

    /// Stamps and signs assembled claims.
    pub fn issue(&self, builder: SessionClaimsBuilder) -> TokenResult<IssuedToken> {
        let claims = self.stamp(builder);
        let token = self.encode(&claims)?;
        Ok(IssuedToken { claims, token })
    }

    /// Verifies a token and returns its claims.
    pub fn decode(&self, token: &str) -> TokenResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::from_decode)
    }

    /// Returns `true` once the token is older than the update age.
    pub fn needs_refresh(&self, claims: &SessionClaims, now: DateTime<Utc>) -> bool {
        claims.age_at(now) > self.update_age
    }

    /// Re-signs the same claims with a fresh issue time and expiry.
    ///
    /// The permission list is carried over untouched.
    pub fn refresh(&self, claims: &SessionClaims, now: DateTime<Utc>) -> TokenResult<IssuedToken> {
        let claims = claims.renewed(now, self.max_age);
        let token = self.encode(&claims)?;
        Ok(IssuedToken { claims, token })
    }

    /// Returns the session lifetime.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns the refresh threshold.
    pub fn update_age(&self) -> Duration {
        self.update_age
    }

    /// Returns the issuer.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl std::fmt::Debug for SessionTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenManager")
            .field("issuer", &self.issuer)
            .field("algorithm", &self.algorithm)
            .field("max_age", &self.max_age)
            .field("update_age", &self.update_age)
            .finish()
    }
}

fn to_chrono(field: &str, secs: u64) -> TokenResult<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| TokenError::Configuration {
            message: format!("session.{} is out of range: {}", field, secs),
        })
}

// =============================================================================
// Tests
// =============================================================================
