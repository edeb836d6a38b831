// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Health check endpoints
//! - [`auth`]: Login, logout and the current session
//! - [`settings`]: Permission, role and user listings
//! - [`profile`]: Profile page data

mod auth;
mod health;
mod profile;
mod settings;

pub use auth::*;
pub use health::*;
pub use profile::*;
pub use settings::*;
