// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `serve` command.

use tracing::info;

use crate::cli::{Cli, ServeArgs};
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Executes the `serve` command to start the HTTP service.
pub async fn serve(cli: &Cli, args: ServeArgs) -> BinResult<()> {
    info!(config = %cli.config.display(), "Starting SmartOne service...");

    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .port(args.port)
        .build()?;

    runtime.run().await
}
