// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`SessionLayer`]: resolves the session and attaches a `SessionContext`
//! - [`RoleGateLayer`]: admits only the configured roles, denying or redirecting

mod gate;
mod session;

pub use gate::{GateMode, RoleGateLayer, RoleGateMiddleware};
pub use session::{SessionLayer, SessionMiddleware};
