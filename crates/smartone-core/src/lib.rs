// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # smartone-core
//!
//! Identity directory and shared types for the SmartOne authorization service.
//!
//! - **Types**: `User`, `Role`, `Permission` and their identifiers
//! - **Store**: the `IdentityStore` trait with in-memory and file-backed implementations
//! - **Admin**: user listing, deletion and provisioning
//! - **Password**: Argon2 hashing and verification
//! - **Audit**: security audit logging
//! - **Error**: core error hierarchy
//!
//! ## Example
//!
//! ```rust,ignore
//! use smartone_core::admin;
//! use smartone_core::store::MemoryIdentityStore;
//!
//! let store = MemoryIdentityStore::new();
//! admin::seed_default_roles(&store).await?;
//! for line in admin::list_users(&store).await? {
//!     println!("{line}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod types;

// =============================================================================
// Directory Modules
// =============================================================================

pub mod admin;
pub mod password;
pub mod store;

// =============================================================================
// Audit
// =============================================================================

pub mod audit;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, PasswordError, StoreError, StoreResult};
pub use store::{FileIdentityStore, IdentityStore, MemoryIdentityStore};
pub use types::{
    Permission, PermissionId, Role, RoleId, RoleWithPermissions, User, UserId, UserWithRole,
};
