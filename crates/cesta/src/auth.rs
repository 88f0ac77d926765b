// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cesta login`, `register`, `logout`, and `whoami` command implementations.
//!
//! The interactive prompts and the local input validation live here; the
//! wire calls live in `cesta-api`. Email and password are checked before
//! any request leaves the process.

use std::io::Write;
use std::sync::Arc;

use cesta_api::{ApiClient, CredentialStore};
use cesta_config::CestaConfig;
use cesta_core::CestaError;
use colored::Colorize;

/// Builds an API client from the configured endpoint and token path.
pub fn client_from_config(config: &CestaConfig) -> Result<ApiClient, CestaError> {
    let credentials = Arc::new(CredentialStore::new(&config.auth.token_path));
    ApiClient::new(&config.api, credentials)
}

/// Runs `cesta login`. Prompts for the email unless given as a flag; the
/// password is always read without echo.
pub async fn run_login(config: &CestaConfig, email: Option<&str>) -> Result<(), CestaError> {
    let email = match email {
        Some(e) => e.to_string(),
        None => prompt_line("email: ")?,
    };
    validate_email(&email)?;
    let password = prompt_password("password: ")?;
    validate_password(&password)?;

    let client = client_from_config(config)?;
    client.login(email.trim(), &password).await?;
    let account = client.me().await?;
    println!("signed in as {} <{}>", account.name.bold(), account.email);
    Ok(())
}

/// Runs `cesta register`: creates the account, then signs straight in.
pub async fn run_register(config: &CestaConfig) -> Result<(), CestaError> {
    let name = prompt_line("name: ")?;
    if name.is_empty() {
        return Err(CestaError::Validation("a name is required".to_string()));
    }
    let email = prompt_line("email: ")?;
    validate_email(&email)?;
    let password = prompt_password("password: ")?;
    validate_password(&password)?;

    let client = client_from_config(config)?;
    client.register(&name, email.trim(), &password).await?;
    client.login(email.trim(), &password).await?;
    println!("account created; signed in as {}", email.trim().bold());
    Ok(())
}

/// Runs `cesta logout`. The stored token is dropped even when the server
/// treats the session as already gone.
pub async fn run_logout(config: &CestaConfig) -> Result<(), CestaError> {
    let client = client_from_config(config)?;
    client.logout().await?;
    println!("signed out");
    Ok(())
}

/// Runs `cesta whoami`.
pub async fn run_whoami(config: &CestaConfig) -> Result<(), CestaError> {
    let client = client_from_config(config)?;
    match client.me().await {
        Ok(account) => {
            println!(
                "{} <{}> (id {})",
                account.name.bold(),
                account.email,
                account.id
            );
            Ok(())
        }
        Err(CestaError::AuthRequired) => {
            println!("not signed in");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Local email shape check: one `@`, a dotted domain, no whitespace.
pub fn validate_email(email: &str) -> Result<(), CestaError> {
    let email = email.trim();
    let valid = !email.contains(char::is_whitespace)
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if valid {
        Ok(())
    } else {
        Err(CestaError::Validation(format!("not a valid email: {email}")))
    }
}

/// Rejects empty passwords before any network call.
pub fn validate_password(password: &str) -> Result<(), CestaError> {
    if password.is_empty() {
        return Err(CestaError::Validation("a password is required".to_string()));
    }
    Ok(())
}

/// Reads one trimmed line from stdin, echoed.
pub fn prompt_line(prompt: &str) -> Result<String, CestaError> {
    print!("{prompt}");
    std::io::stdout()
        .flush()
        .map_err(|e| CestaError::Internal(format!("failed to flush stdout: {e}")))?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| CestaError::Internal(format!("failed to read input: {e}")))?;
    Ok(line.trim().to_string())
}

/// Reads a password from the terminal without echoing it.
pub fn prompt_password(prompt: &str) -> Result<String, CestaError> {
    rpassword::prompt_password(prompt)
        .map_err(|e| CestaError::Internal(format!("failed to read password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_emails_pass() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("  ana.silva+cesta@mail.example.org  ").is_ok());
    }

    #[test]
    fn malformed_emails_are_rejected_locally() {
        for email in [
            "",
            "ana",
            "ana@",
            "@example.com",
            "ana@example",
            "ana@.com",
            "ana@example.",
            "ana@ex@ample.com",
            "ana maria@example.com",
        ] {
            let err = validate_email(email).unwrap_err();
            assert!(
                matches!(err, CestaError::Validation(_)),
                "{email:?} should fail validation"
            );
        }
    }

    #[test]
    fn empty_password_is_rejected_locally() {
        assert!(matches!(
            validate_password("").unwrap_err(),
            CestaError::Validation(_)
        ));
        assert!(validate_password("s3gredo").is_ok());
    }
}
