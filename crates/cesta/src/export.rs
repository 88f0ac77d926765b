// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cesta export` command implementation.
//!
//! Fetches a list as txt or csv and writes it to disk. The filename comes
//! from the server's `Content-Disposition` unless an output path is given.

use cesta_config::CestaConfig;
use cesta_core::{CestaError, ExportFormat};

use crate::auth::client_from_config;

/// Runs the `cesta export` command.
pub async fn run_export(
    config: &CestaConfig,
    list_id: i64,
    format: &str,
    output: Option<&str>,
) -> Result<(), CestaError> {
    let format: ExportFormat = format.parse().map_err(|_| {
        CestaError::Validation(format!("unknown export format: {format} (use txt or csv)"))
    })?;

    let client = client_from_config(config)?;
    let payload = client.export_list(list_id, format).await?;

    let path = output.unwrap_or(&payload.filename);
    tokio::fs::write(path, &payload.bytes)
        .await
        .map_err(|e| CestaError::Internal(format!("failed to write {path}: {e}")))?;
    println!("wrote {path} ({} bytes)", payload.bytes.len());
    Ok(())
}
