// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use smartone_config::{SmartOneConfig, StoreKind};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Non-fatal findings for a configuration that already passed validation.
pub fn collect_warnings(config: &SmartOneConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(secret) = &config.session.secret {
        if secret.as_bytes().len() < smartone_config::schema::RECOMMENDED_SECRET_LEN {
            warnings.push(format!(
                "Session secret is shorter than {} bytes",
                smartone_config::schema::RECOMMENDED_SECRET_LEN
            ));
        }
    }

    if !config.session.cookie_secure {
        warnings.push("Session cookie is sent without the Secure attribute".to_string());
    }

    if config.store.kind == StoreKind::Memory {
        warnings.push("In-memory identity store loses all data on exit".to_string());
    }

    if config.server.cors.allow_credentials
        && config.server.cors.allowed_origins.iter().any(|o| o == "*")
    {
        warnings.push("CORS credentials are ignored with a wildcard origin".to_string());
    }

    warnings
}

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = smartone_config::load_config(config_path).map_err(|e| {
        BinError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen: {}", config.server.socket_addr());
            println!("  Issuer: {}", config.session.issuer);
            println!("  Session max age: {}s", config.session.max_age_secs);
            println!("  Cookie: {}", config.session.cookie_name);
            println!("  Store: {:?} ({})", config.store.kind, config.store.path.display());
            println!("  Allowed roles: {}", config.settings.allowed_roles.join(", "));
            println!("  Audit: {}", if config.audit.enabled { "enabled" } else { "disabled" });

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "issuer": config.session.issuer,
                    "max_age_secs": config.session.max_age_secs,
                    "cookie_name": config.session.cookie_name,
                    "store_path": config.store.path.display().to_string(),
                    "allowed_roles": config.settings.allowed_roles,
                    "audit_enabled": config.audit.enabled,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::runtime(format!("Failed to render JSON: {}", e)))?;
            println!("{}", rendered);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartone_config::SecretValue;

    #[test]
    fn test_collect_warnings() {
        let mut config = SmartOneConfig::default();
        config.session.secret = Some(SecretValue::new("short"));
        config.store.kind = StoreKind::Memory;

        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("shorter than")));
        assert!(warnings.iter().any(|w| w.contains("In-memory")));
    }

    #[test]
    fn test_validate_missing_file() {
        let cli = <Cli as clap::Parser>::parse_from(["smartone", "-c", "/nonexistent/smartone.yaml"]);
        let err = validate(&cli, ValidateArgs::default()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
