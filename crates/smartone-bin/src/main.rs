// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! SmartOne - authorization and session service for SmartOne ERP.

use smartone_bin::error::report_error_and_exit;
use smartone_bin::{commands, init_logging, logging_settings, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let (level, format) = logging_settings(&cli);
    init_logging(&level, format);

    if let Err(e) = commands::execute(cli).await {
        tracing::error!(error = %e, exit_code = e.exit_code(), "Command failed");
        report_error_and_exit(e);
    }
}
