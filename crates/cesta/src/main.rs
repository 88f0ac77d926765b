// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cesta - a terminal shopping-list client.
//!
//! This is the binary entry point for the cesta CLI.

use clap::{Parser, Subcommand};
use colored::Colorize;

mod auth;
mod doctor;
mod export;
mod render;
mod shell;

/// Cesta - a terminal shopping-list client.
#[derive(Parser, Debug)]
#[command(name = "cesta", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive shell (the default).
    Shell,
    /// Sign in and persist the session token.
    Login {
        /// Account email; prompted for when omitted.
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account and sign in.
    Register,
    /// Sign out and discard the persisted token.
    Logout,
    /// Show the signed-in account.
    Whoami,
    /// Export a list to a file.
    Export {
        /// Id of the list to export.
        list_id: i64,
        /// Output format: txt or csv.
        #[arg(long, default_value = "txt")]
        format: String,
        /// Destination path; defaults to the server-chosen filename.
        #[arg(long)]
        output: Option<String>,
    },
    /// Run configuration and connectivity checks.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Run the forwarding proxy in front of the backend.
    Proxy,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match cesta_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            cesta_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.ui.log_level);

    let result = match cli.command {
        Some(Commands::Login { email }) => auth::run_login(&config, email.as_deref()).await,
        Some(Commands::Register) => auth::run_register(&config).await,
        Some(Commands::Logout) => auth::run_logout(&config).await,
        Some(Commands::Whoami) => auth::run_whoami(&config).await,
        Some(Commands::Export {
            list_id,
            format,
            output,
        }) => export::run_export(&config, list_id, &format, output.as_deref()).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        Some(Commands::Proxy) => cesta_proxy::run(&config.proxy).await,
        Some(Commands::Shell) | None => shell::run_shell(config).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cesta={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = cesta_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui.history_page_size, 10);
    }
}
