// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `serve`: Start the HTTP service (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `users`: List, add or delete users in the identity store

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// SmartOne - authorization and session service for SmartOne ERP
#[derive(Parser, Debug)]
#[command(
    name = "smartone",
    author = "Sylvex <contact@sylvex.io>",
    version = smartone_api::VERSION,
    about = "Authorization and session service for SmartOne ERP",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "smartone.yaml",
        env = "SMARTONE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SMARTONE_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact)
    #[arg(long, env = "SMARTONE_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the SmartOne CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP service
    ///
    /// This is the default command when no subcommand is specified.
    Serve(ServeArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the service.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Manage users in the identity store
    #[command(subcommand)]
    Users(UsersCommand),
}

/// User administration subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum UsersCommand {
    /// List every user with their role
    List,

    /// Delete the user with the given email
    Delete {
        /// Email of the user to delete
        email: String,
    },

    /// Add a user with a password and an existing role
    Add(AddUserArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `users add`.
#[derive(Args, Debug, Clone)]
pub struct AddUserArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Exact name of an existing role
    #[arg(long)]
    pub role: String,

    /// Password
    #[arg(long, env = "SMARTONE_USER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<smartone_config::LogFormat> for LogFormat {
    fn from(format: smartone_config::LogFormat) -> Self {
        match format {
            smartone_config::LogFormat::Text => LogFormat::Text,
            smartone_config::LogFormat::Json => LogFormat::Json,
            smartone_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Serve` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level based on flags.
    ///
    /// `-q` and `-v` win over `--log-level`, which wins over `fallback`.
    pub fn effective_log_level<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(fallback)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
