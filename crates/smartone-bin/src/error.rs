// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the `smartone` command.
//!
//! Every command returns [`BinResult`]. `main` reports the error with its
//! cause chain and exits with the code below:
//!
//! | code | failure |
//! |------|---------|
//! | 1 | configuration missing, unreadable or invalid |
//! | 2 | identity store or server could not be set up |
//! | 3 | the server failed while running |
//! | 4 | I/O outside the identity store |
//! | 5 | API layer (router or token manager construction) |
//! | 6 | identity directory or user administration |

use smartone_core::{CoreError, StoreError};
use thiserror::Error;

/// Result type alias for command results.
pub type BinResult<T> = Result<T, BinError>;

/// Failures of a `smartone` command.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration is missing or rejected.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Startup could not open the store or bind the listener.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// The running service failed.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// The API layer could not be built.
    #[error("API error: {0}")]
    Api(#[from] smartone_api::ApiError),

    /// Loading or validating the configuration file failed.
    #[error("Config error: {0}")]
    Config(#[from] smartone_config::ConfigError),

    /// A directory or administration operation failed.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Error with the step that produced it.
    #[error("{context}: {source}")]
    WithContext {
        /// The step that failed.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Wraps the error with the step that failed.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::Api(_) => 5,
            Self::Core(_) => 6,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// Returns a next step for the operator, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Configuration(_) | Self::Config(_) => {
                Some("run `smartone validate <config>` to see every problem in the file")
            }
            Self::Core(CoreError::Store(e)) if e.is_unavailable() => {
                Some("check that store.path exists and is readable and writable")
            }
            Self::Core(CoreError::Store(e)) if e.is_not_found() => {
                Some("run `smartone users list` to see the existing accounts")
            }
            Self::WithContext { source, .. } => source.hint(),
            _ => None,
        }
    }
}

impl From<StoreError> for BinError {
    fn from(err: StoreError) -> Self {
        Self::Core(err.into())
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{:#}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints the error, its causes and a hint to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("smartone: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }

    if let Some(hint) = error.hint() {
        eprintln!("  hint: {}", hint);
    }
}

/// Reports the error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
