//! Shared helpers for command handlers.

use std::path::Path;

use wanmesh_config::load_topology;
use wanmesh_core::{Assembly, assemble_all};

use crate::error::CliError;

/// Load the topology at `path` and assemble every device model.
pub fn assemble(path: &Path) -> Result<Assembly, CliError> {
    let topology = load_topology(path).map_err(|source| CliError::Topology {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), members = topology.len(), "assembling");
    Ok(assemble_all(&topology)?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|_| CliError::NonInteractiveRequiresYes {
            action: message.into(),
        })
}
