//! Configuration for the wanmesh CLI.
//!
//! Two kinds of input live here: the YAML topology that describes the
//! network (parsed and validated into `wanmesh_core::Topology`), and the
//! tool's own TOML settings (topology path, output directory, template
//! overrides, push target) layered from defaults, file and environment.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wanmesh_core::CoreError;

mod topology;

pub use topology::{load_topology, parse_topology};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("member '{member}' is missing required field '{field}'")]
    MissingField { member: String, field: &'static str },

    #[error("failed to read topology {}: {source}", path.display())]
    ReadTopology {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed topology document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Topology file read by every command.
    #[serde(default = "default_topology")]
    pub topology: PathBuf,

    /// Directory rendered configuration files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory whose `pa-set.tera` / `pa-standalone.tera` replace the
    /// built-in templates.
    pub template_dir: Option<PathBuf>,

    #[serde(default)]
    pub push: PushSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topology: default_topology(),
            output_dir: default_output_dir(),
            template_dir: None,
            push: PushSettings::default(),
        }
    }
}

/// Where and how rendered files are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushSettings {
    /// Management host (Panorama or firewall). Required to push.
    pub host: Option<String>,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub on_error: PushPolicy,

    /// Append every device session transcript to this file.
    pub session_log: Option<PathBuf>,

    /// Extra arguments passed to `ssh` before the destination.
    #[serde(default)]
    pub ssh_args: Vec<String>,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            host: None,
            username: default_username(),
            on_error: PushPolicy::default(),
            session_log: None,
            ssh_args: Vec::new(),
        }
    }
}

/// What to do when one file fails to push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PushPolicy {
    /// Stop at the first failure.
    #[default]
    Abort,
    /// Record the failure and move on to the next file.
    Continue,
}

fn default_topology() -> PathBuf {
    "model-sdwan.yaml".into()
}
fn default_output_dir() -> PathBuf {
    "output".into()
}
fn default_username() -> String {
    "admin".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "wanmesh", "wanmesh").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wanmesh");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` + environment. A missing file is not an error.
///
/// Environment keys use `__` for nesting: `WANMESH_OUTPUT_DIR`,
/// `WANMESH_PUSH__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WANMESH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
