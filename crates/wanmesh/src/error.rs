//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use wanmesh_config::ConfigError;
use wanmesh_core::CoreError;

use crate::push::PushError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const TOPOLOGY: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const RENDER: i32 = 5;
    pub const PUSH: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Topology ─────────────────────────────────────────────────────

    #[error("Topology {path} is invalid")]
    #[diagnostic(
        code(wanmesh::topology),
        help("Fix the topology file and run: wanmesh validate")
    )]
    Topology {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("Cannot build configuration for this topology")]
    #[diagnostic(code(wanmesh::generation))]
    Generation {
        #[source]
        source: CoreError,
        #[help]
        advice: Option<String>,
    },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wanmesh::not_found),
        help("Run: wanmesh {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No generated files in {dir}")]
    #[diagnostic(
        code(wanmesh::nothing_to_push),
        help("Run: wanmesh generate")
    )]
    NothingToPush { dir: String },

    // ── Rendering ────────────────────────────────────────────────────

    #[error("Failed to load template '{name}'")]
    #[diagnostic(
        code(wanmesh::template),
        help("Check the template syntax, or remove template_dir to use the built-in templates.")
    )]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to render configuration for '{device}'")]
    #[diagnostic(code(wanmesh::render))]
    Render {
        device: String,
        #[source]
        source: tera::Error,
    },

    // ── Push ─────────────────────────────────────────────────────────

    #[error("No push host configured")]
    #[diagnostic(
        code(wanmesh::no_push_host),
        help("Pass --host, set WANMESH_PUSH__HOST, or add `host` under [push] in {path}")
    )]
    NoPushHost { path: String },

    #[error("Failed to push {file}")]
    #[diagnostic(
        code(wanmesh::push),
        help("Nothing after this file was pushed. Use --on-error continue to push the rest.")
    )]
    Push {
        file: String,
        #[source]
        source: PushError,
    },

    #[error("{failed} of {total} files failed to push: {files}")]
    #[diagnostic(code(wanmesh::push_incomplete), help("Run with -v for per-file details."))]
    PushIncomplete {
        failed: usize,
        total: usize,
        files: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wanmesh::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(wanmesh::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(wanmesh::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wanmesh::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize configuration: {0}")]
    #[diagnostic(code(wanmesh::serialize))]
    Serialize(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Topology { .. } | Self::Generation { .. } => exit_code::TOPOLOGY,
            Self::NotFound { .. } | Self::NothingToPush { .. } => exit_code::NOT_FOUND,
            Self::Template { .. } | Self::Render { .. } => exit_code::RENDER,
            Self::Push { .. } | Self::PushIncomplete { .. } => exit_code::PUSH,
            Self::Validation { .. }
            | Self::NoPushHost { .. }
            | Self::ConfigExists { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Serialization(e) => Self::Serialize(e),
            ConfigError::Io(e) => Self::Io(e),
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Topology {
                path: "(topology)".into(),
                source: other,
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let advice = match &err {
            CoreError::PoolCapacityExceeded { spoke, .. } => Some(format!(
                "Reduce the WAN/ISP interfaces on the hubs or on '{spoke}'."
            )),
            CoreError::TunnelNumberOverflow { remote, .. } => Some(format!(
                "Tunnel numbers are <remote id><2-digit sequence>; give '{remote}' an id below 100."
            )),
            CoreError::PoolTooNarrow { .. } | CoreError::InvalidPool { .. } => {
                Some("Set tunnels.pool to a /16 or wider IPv4 network.".into())
            }
            CoreError::AddressOverflow { .. } => {
                Some("Move tunnels.pool lower in the address space.".into())
            }
            _ => None,
        };
        Self::Generation { source: err, advice }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_topology_exit_code() {
        let err = CliError::from(CoreError::PoolCapacityExceeded {
            spoke: "branch1".into(),
            edges: 144,
            max: 128,
        });
        assert_eq!(err.exit_code(), exit_code::TOPOLOGY);
        assert!(matches!(err, CliError::Generation { advice: Some(_), .. }));
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "push.on_error".into(),
            reason: "unknown".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn push_incomplete_uses_push_exit_code() {
        let err = CliError::PushIncomplete {
            failed: 1,
            total: 2,
            files: "hub1.txt".into(),
        };
        assert_eq!(err.exit_code(), exit_code::PUSH);
    }
}
