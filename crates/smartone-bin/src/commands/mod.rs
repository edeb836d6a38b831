// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `serve`: Start the HTTP service
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `users`: User administration against the identity store

mod serve;
mod users;
mod validate;
mod version;

pub use serve::serve;
pub use users::{add_user, delete_user, list_users};
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands, UsersCommand};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Serve(args) => serve::serve(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::Users(UsersCommand::List) => users::list_users(&cli).await,
        Commands::Users(UsersCommand::Delete { email }) => users::delete_user(&cli, &email).await,
        Commands::Users(UsersCommand::Add(args)) => users::add_user(&cli, args).await,
    }
}
