// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # smartone-api
//!
//! Session resolution, role gates and the HTTP API for SmartOne ERP.
//!
//! ## Request flow
//!
//! ```text
//! request ─► SessionLayer ─► Resolution ─► RoleGateLayer ─► handler
//!              │                              │
//!              └─ renewed cookie              └─ 401/403 or 303 redirect
//! ```
//!
//! The [`SessionLayer`](middleware::SessionLayer) reads the session token
//! from the bearer header or the session cookie, verifies it and attaches a
//! [`SessionContext`](auth::SessionContext). Route groups carry a
//! [`RoleGateLayer`](middleware::RoleGateLayer) that admits an exact set of
//! role names.
//!
//! ## Example
//!
//! ```rust,ignore
//! use smartone_api::ApiServerBuilder;
//!
//! let server = ApiServerBuilder::new()
//!     .config(config)
//!     .store(store)
//!     .build()?;
//! server.run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    Gate, GateDecision, PermissionRequirement, Resolution, RoleSet, SessionClaims, SessionContext,
    SessionResolver, SessionTokenManager, SessionUser, SessionView,
};
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
