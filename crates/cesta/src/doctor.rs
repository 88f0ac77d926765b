// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cesta doctor` command implementation.
//!
//! Runs diagnostic checks against the configured backend to identify
//! configuration issues, connectivity problems, and session state.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use cesta_config::CestaConfig;
use cesta_core::CestaError;

use crate::auth::client_from_config;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

/// Run the `cesta doctor` command.
///
/// With `--plain`, disables colored output.
pub async fn run_doctor(config: &CestaConfig, plain: bool) -> Result<(), CestaError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    results.push(check_config().await);
    results.push(check_backend_health(config).await);
    results.push(check_backend_version(config).await);
    results.push(check_session(config).await);

    // Print results
    println!();
    println!("  cesta doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let status_symbol;
        let line;

        match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    status_symbol = "✓".green().to_string();
                    line = format!(
                        "    {status_symbol} {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                } else {
                    line = format!(
                        "    [OK]   {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    status_symbol = "!".yellow().to_string();
                    line = format!(
                        "    {status_symbol} {:<16} {} ({duration_ms}ms)",
                        result.name,
                        result.message.yellow()
                    );
                } else {
                    line = format!(
                        "    [WARN] {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    status_symbol = "✗".red().to_string();
                    line = format!(
                        "    {status_symbol} {:<16} {} ({duration_ms}ms)",
                        result.name,
                        result.message.red()
                    );
                } else {
                    line = format!(
                        "    [FAIL] {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
        }

        println!("{line}");
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }

    println!();

    Ok(())
}

/// Check configuration loads without errors.
async fn check_config() -> CheckResult {
    let start = Instant::now();
    match cesta_config::load_and_validate() {
        Ok(config) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Pass,
            message: format!("valid (api {})", config.api.base_url),
            duration: start.elapsed(),
        },
        Err(errors) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Fail,
            message: format!("{} error(s)", errors.len()),
            duration: start.elapsed(),
        },
    }
}

/// Check the backend liveness endpoint.
async fn check_backend_health(config: &CestaConfig) -> CheckResult {
    let start = Instant::now();
    let client = match client_from_config(config) {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                name: "Backend health".to_string(),
                status: CheckStatus::Fail,
                message: format!("HTTP client error: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    match client.health().await {
        Ok(health) if health.database => CheckResult {
            name: "Backend health".to_string(),
            status: CheckStatus::Pass,
            message: health.status,
            duration: start.elapsed(),
        },
        Ok(_) => CheckResult {
            name: "Backend health".to_string(),
            status: CheckStatus::Warn,
            message: "reachable, but its database is down".to_string(),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Backend health".to_string(),
            status: CheckStatus::Fail,
            message: e.to_string(),
            duration: start.elapsed(),
        },
    }
}

/// Check the backend version endpoint.
async fn check_backend_version(config: &CestaConfig) -> CheckResult {
    let start = Instant::now();
    let client = match client_from_config(config) {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                name: "Backend version".to_string(),
                status: CheckStatus::Fail,
                message: format!("HTTP client error: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    match client.version().await {
        Ok(version) => CheckResult {
            name: "Backend version".to_string(),
            status: CheckStatus::Pass,
            message: version.version,
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Backend version".to_string(),
            status: CheckStatus::Fail,
            message: e.to_string(),
            duration: start.elapsed(),
        },
    }
}

/// Check the stored session, if any, is still accepted by the backend.
///
/// A rejected token has already been cleared by the client when the 401
/// comes back, so the warning reflects the post-check state.
async fn check_session(config: &CestaConfig) -> CheckResult {
    let start = Instant::now();
    let client = match client_from_config(config) {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                name: "Session".to_string(),
                status: CheckStatus::Fail,
                message: format!("HTTP client error: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    if client.credentials().get().await.is_none() {
        return CheckResult {
            name: "Session".to_string(),
            status: CheckStatus::Warn,
            message: "no stored session (run `cesta login`)".to_string(),
            duration: start.elapsed(),
        };
    }

    match client.me().await {
        Ok(account) => CheckResult {
            name: "Session".to_string(),
            status: CheckStatus::Pass,
            message: format!("signed in as {}", account.email),
            duration: start.elapsed(),
        },
        Err(CestaError::AuthRequired) => CheckResult {
            name: "Session".to_string(),
            status: CheckStatus::Warn,
            message: "stored session expired (token cleared)".to_string(),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Session".to_string(),
            status: CheckStatus::Fail,
            message: e.to_string(),
            duration: start.elapsed(),
        },
    }
}
