// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `users` commands.

use std::sync::Arc;

use smartone_core::admin::{self, DeleteOutcome, NewUser};
use smartone_core::audit::{AuditLog, AuditLogger};
use smartone_core::IdentityStore;

use crate::cli::{AddUserArgs, Cli};
use crate::error::BinResult;
use crate::runtime::{create_audit_logger, load_configuration, open_store};

async fn open(cli: &Cli) -> BinResult<(Arc<dyn IdentityStore>, Arc<dyn AuditLogger>)> {
    let config = load_configuration(&cli.config)?;
    let store = open_store(&config).await?;
    Ok((store, create_audit_logger(&config)))
}

async fn record(logger: &Arc<dyn AuditLogger>, entry: AuditLog) {
    if let Err(e) = logger.log(entry).await {
        tracing::warn!(error = %e, "Failed to write audit entry");
    }
}

/// `smartone users list`
pub async fn list_users(cli: &Cli) -> BinResult<()> {
    let (store, _) = open(cli).await?;
    for line in admin::list_users(store.as_ref()).await? {
        println!("{}", line);
    }
    Ok(())
}

/// `smartone users delete <email>`
///
/// An unknown email is reported and changes nothing.
pub async fn delete_user(cli: &Cli, email: &str) -> BinResult<()> {
    let (store, audit) = open(cli).await?;
    let outcome = admin::delete_user_by_email(store.as_ref(), email).await?;

    if let DeleteOutcome::Deleted { user } = &outcome {
        record(&audit, AuditLog::user_deleted(user.id.to_string(), &user.email)).await;
    }
    println!("{}", outcome);
    Ok(())
}

/// `smartone users add`
pub async fn add_user(cli: &Cli, args: AddUserArgs) -> BinResult<()> {
    let (store, audit) = open(cli).await?;
    let user = admin::add_user(
        store.as_ref(),
        NewUser {
            name: args.name,
            email: args.email,
            password: args.password,
            role_name: args.role.clone(),
        },
    )
    .await?;

    record(&audit, AuditLog::user_created(user.id.to_string(), &user.email)).await;
    println!("Created user: {} ({}), Role: {}", user.name, user.email, args.role);
    Ok(())
}
