//! Clap derive structures for the `wanmesh` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! This file is also compiled by `build.rs` for man page generation, so it
//! must depend on nothing but clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wanmesh -- hub/branch SD-WAN tunnel mesh generator
#[derive(Debug, Parser)]
#[command(
    name = "wanmesh",
    version,
    about = "Generate hub/branch SD-WAN tunnel configurations from a topology file",
    long_about = "Reads a YAML topology of hub and branch firewalls, builds a full tunnel\n\
        mesh between every hub WAN/ISP interface and every branch WAN/ISP interface,\n\
        and renders PAN-OS set commands for Panorama or standalone firewalls.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Topology file (overrides config)
    #[arg(long, short = 't', global = true, value_name = "FILE")]
    pub topology: Option<PathBuf>,

    /// Directory for generated configuration files (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output target (overrides the topology's `target`)
    #[arg(long, global = true)]
    pub target: Option<TargetArg>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WANMESH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetArg {
    /// One aggregated `panorama-set.txt` for all devices
    Panorama,
    /// One `<name>.txt` per firewall
    Standalone,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Stop at the first failed file
    Abort,
    /// Push remaining files and report failures at the end
    Continue,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build device models and write rendered configuration files
    #[command(alias = "gen", alias = "g")]
    Generate(GenerateArgs),

    /// Show the tunnel mesh
    #[command(alias = "m")]
    Mesh,

    /// Inspect assembled device models
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Check the topology and report warnings without writing anything
    Validate,

    /// Push previously generated files to the management host
    Push(PushArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GENERATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Push the generated files after writing them
    #[arg(long)]
    pub push: bool,

    /// Print rendered configuration to stdout instead of writing files
    #[arg(long, conflicts_with = "push")]
    pub dry_run: bool,

    /// Skip the tunnel mesh summary
    #[arg(long)]
    pub no_summary: bool,

    #[command(flatten)]
    pub push_opts: PushOpts,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List assembled devices
    #[command(alias = "ls")]
    List,

    /// Show one device's full model
    Show {
        /// Member name
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PUSH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PushArgs {
    #[command(flatten)]
    pub push_opts: PushOpts,
}

/// Overrides for the `[push]` config section.
#[derive(Debug, Args)]
pub struct PushOpts {
    /// Management host (Panorama or firewall)
    #[arg(long, env = "WANMESH_PUSH__HOST")]
    pub host: Option<String>,

    /// SSH username
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// What to do when a file fails to push
    #[arg(long)]
    pub on_error: Option<PolicyArg>,

    /// Append session transcripts to this file
    #[arg(long, value_name = "FILE")]
    pub session_log: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
