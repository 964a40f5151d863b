//! CLI configuration: a thin wrapper around `wanmesh_config` shared types.
//!
//! Re-exports the shared types and applies `GlobalOpts` / push flag
//! overrides on top of the file + environment layers.

use wanmesh_core::OutputTarget;

use crate::cli::{GlobalOpts, PolicyArg, PushOpts, TargetArg};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wanmesh_config::{
    Config, PushPolicy, PushSettings, config_path, load_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Load settings and apply global flag overrides (flag > env > file > default).
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config()?;
    if let Some(ref topology) = global.topology {
        cfg.topology.clone_from(topology);
    }
    if let Some(ref output_dir) = global.output_dir {
        cfg.output_dir.clone_from(output_dir);
    }
    Ok(cfg)
}

/// Apply push flag overrides to the `[push]` section.
pub fn resolve_push(mut settings: PushSettings, opts: &PushOpts) -> PushSettings {
    if let Some(ref host) = opts.host {
        settings.host = Some(host.clone());
    }
    if let Some(ref username) = opts.username {
        settings.username.clone_from(username);
    }
    if let Some(policy) = opts.on_error {
        settings.on_error = policy.into();
    }
    if let Some(ref log) = opts.session_log {
        settings.session_log = Some(log.clone());
    }
    settings
}

/// Output target: `--target` wins over the topology's own setting.
pub fn effective_target(global: &GlobalOpts, topology_target: OutputTarget) -> OutputTarget {
    global.target.map_or(topology_target, Into::into)
}

impl From<TargetArg> for OutputTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Panorama => Self::Panorama,
            TargetArg::Standalone => Self::Standalone,
        }
    }
}

impl From<PolicyArg> for PushPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Abort => Self::Abort,
            PolicyArg::Continue => Self::Continue,
        }
    }
}
