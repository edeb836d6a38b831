// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Session claims and their assembly from the identity store
//! - Session token signing, verification and renewal
//! - Session resolution from bearer headers and cookies
//! - Role and permission gates
//! - The per-request session context

mod assembly;
mod claims;
mod context;
mod cookie;
mod gate;
mod jwt;
mod resolver;

pub use assembly::assemble_claims;
pub use claims::{SessionClaims, SessionClaimsBuilder, SessionUser, SessionView};
pub use context::SessionContext;
pub use cookie::{bearer_token, CredentialSource, SessionCookie};
pub use gate::{Gate, GateDecision, GateError, PermissionRequirement, RoleSet};
pub use jwt::{IssuedToken, SessionTokenManager, TokenError, TokenResult};
pub use resolver::{Resolution, ResolvedSession, SessionResolver};
