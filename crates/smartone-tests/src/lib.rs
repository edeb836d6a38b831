// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # SmartOne Integration Tests
//!
//! End-to-end tests for the SmartOne authorization service, plus the
//! fixtures and helpers they share.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: The standard directory and ready-made configurations
//!   - `builders`: Builders for directories and configurations
//!   - `assertions`: Response assertion helpers
//!   - `mocks`: A store that can be switched into failure
//!   - `harness`: [`TestApp`](common::harness::TestApp), the full router behind `oneshot`
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p smartone-tests
//!
//! # Run specific test suite
//! cargo test -p smartone-tests --test integration_core
//! cargo test -p smartone-tests --test integration_config
//! cargo test -p smartone-tests --test integration_api
//! ```
//!
//! ## Test Categories
//!
//! ### Core Tests (`integration_core.rs`)
//! - Directory ordering guarantees
//! - User listing, deletion and provisioning
//! - File store persistence
//!
//! ### Config Tests (`integration_config.rs`)
//! - Configuration parsing (YAML, TOML, JSON)
//! - Placeholder expansion
//! - Validation rules
//!
//! ### API Tests (`integration_api.rs`)
//! - Credentials login and the session cookie
//! - Session resolution, renewal and staleness
//! - Role gates in deny and redirect mode
//! - Store failure reporting
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use smartone_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::standard().await;
//!     let token = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
//!     let response = app.get("/api/roles", Some(&token)).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};

    pub use axum::http::StatusCode;
}
