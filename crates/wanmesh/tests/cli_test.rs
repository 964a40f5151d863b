//! Integration tests for the `wanmesh` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! file generation and error exit codes, all against a temporary topology
//! and without ever opening an SSH session.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

// ── Helpers ─────────────────────────────────────────────────────────

const TOPOLOGY: &str = r#"
target: panorama
tunnels:
  pool: 100.64.0.0/16
profiles:
  ISP1: { latency: 200 }
members:
  hub1:
    id: 1
    role: hub
    sn: "0001"
    router_id: 10.255.0.1
    interfaces:
      isp1: { name: ethernet1/1, address: 203.0.113.2/30, l3: true, sdwan_gw: 203.0.113.1 }
      isp2: { name: ethernet1/2, address: 198.51.100.2/30, l3: true, sdwan_gw: 198.51.100.1 }
      lan1: { name: ethernet1/3, address: 10.1.0.1/24 }
  branch1:
    id: 5
    role: branch
    sn: "0005"
    router_id: 10.255.0.5
    interfaces:
      isp1: { name: ethernet1/1, address: 192.0.2.6/30, l3: true, sdwan_gw: 192.0.2.5 }
      isp2: { name: ethernet1/2, l3: true }
      dmz1: { name: ethernet1/4 }
  branch2:
    id: 6
    role: branch
    sn: "0006"
    router_id: 10.255.0.6
    interfaces:
      isp1: { name: ethernet1/1, address: 192.0.2.10/30, l3: true, sdwan_gw: 192.0.2.9 }
"#;

/// Build a [`Command`] for the `wanmesh` binary with env isolation.
///
/// Clears all `WANMESH_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn wanmesh_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wanmesh");
    cmd.env("HOME", "/tmp/wanmesh-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/wanmesh-cli-test-nonexistent")
        .env_remove("WANMESH_OUTPUT")
        .env_remove("WANMESH_TOPOLOGY")
        .env_remove("WANMESH_OUTPUT_DIR")
        .env_remove("WANMESH_TEMPLATE_DIR")
        .env_remove("WANMESH_PUSH_HOST")
        .env_remove("WANMESH_PUSH__HOST")
        .env_remove("RUST_LOG");
    cmd
}

/// A temp dir holding `model-sdwan.yaml`; outputs go to `<dir>/output`.
struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new(topology: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model-sdwan.yaml"), topology).unwrap();
        Self { dir }
    }

    fn topology(&self) -> PathBuf {
        self.dir.path().join("model-sdwan.yaml")
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    /// A command with `--topology`, `--output-dir` and `--color never` set.
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = wanmesh_cmd();
        cmd.arg("--topology")
            .arg(self.topology())
            .arg("--output-dir")
            .arg(self.output_dir())
            .args(["--color", "never"]);
        cmd
    }
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = wanmesh_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    wanmesh_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("SD-WAN")
            .and(predicate::str::contains("generate"))
            .and(predicate::str::contains("mesh"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("push")),
    );
}

#[test]
fn test_version_flag() {
    wanmesh_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wanmesh"));
}

#[test]
fn test_invalid_output_format() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws.cmd().args(["-o", "xml", "mesh"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("invalid value"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    wanmesh_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    wanmesh_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wanmesh"));
}

// ── Validate ────────────────────────────────────────────────────────

#[test]
fn test_validate_reports_counts_and_warnings() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd().arg("validate").assert().success().stdout(
        predicate::str::contains("1 hubs, 2 branches, 6 tunnels, 3 devices").and(
            predicate::str::contains("warning: branch1: unknown interface type 'dmz1'"),
        ),
    );
}

#[test]
fn test_validate_json() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws.cmd().args(["-o", "json", "validate"]).output().unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["valid"], true);
    assert_eq!(report["tunnels"], 6);
    assert_eq!(report["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_topology_exits_3() {
    let ws = Workspace::new(TOPOLOGY);
    let output = wanmesh_cmd()
        .arg("--topology")
        .arg(ws.dir.path().join("absent.yaml"))
        .arg("validate")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("is invalid"));
}

#[test]
fn test_duplicate_ids_exit_3() {
    let ws = Workspace::new(
        "members:\n  \
           hub1: { id: 4, role: hub, sn: A, router_id: 10.0.0.1 }\n  \
           branch1: { id: 4, role: branch, sn: B, router_id: 10.0.0.2 }\n",
    );
    let output = ws.cmd().arg("validate").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_missing_role_exit_3() {
    let ws = Workspace::new("members:\n  hub1: { id: 1, sn: A, router_id: 10.0.0.1 }\n");
    let output = ws.cmd().arg("validate").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("role"));
}

// ── Mesh ────────────────────────────────────────────────────────────

#[test]
fn test_mesh_plain_lists_edges_in_order() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws.cmd().args(["-o", "plain", "mesh"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "hub1 isp1 <-> branch1 isp1: 100.64.5.0 <-> 100.64.5.1");
    assert_eq!(lines[3], "hub1 isp2 <-> branch1 isp2: 100.64.5.6 <-> 100.64.5.7");
    assert_eq!(lines[5], "hub1 isp2 <-> branch2 isp1: 100.64.6.2 <-> 100.64.6.3");
}

#[test]
fn test_mesh_json_includes_spoke_identity() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws.cmd().args(["-o", "json", "mesh"]).output().unwrap();
    let edges = stdout_json(&output);

    let first = &edges[0];
    assert_eq!(first["spoke"], "branch1");
    assert_eq!(first["spoke_id"], 5);
    assert_eq!(first["asn"], 65005);
    assert_eq!(first["hub_tunnel_ip"], "100.64.5.0/31");
    assert_eq!(first["hub_monitor_ip"], "100.64.5.1");
}

// ── Devices ─────────────────────────────────────────────────────────

#[test]
fn test_devices_list_plain() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd()
        .args(["-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout("branch1\nbranch2\nhub1\n");
}

#[test]
fn test_devices_show_json_model() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws
        .cmd()
        .args(["-o", "json", "devices", "show", "hub1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let model = stdout_json(&output);
    assert_eq!(model["asn"], 65001);
    assert_eq!(model["sn"], "0001");
    assert_eq!(model["interfaces"]["isp1"]["sdwan_profile"], "ISP1");
    assert_eq!(model["interfaces"]["isp2"]["sdwan_profile"], "Internet");
    assert_eq!(model["interfaces"]["lan1"]["zone"], "zone-internal");

    let branch1 = &model["remotes"]["branch1"];
    assert_eq!(branch1["sdwan_intf"], 105);
    assert_eq!(branch1["tunnels"]["branch1_isp1_isp1"]["intf"], "tunnel.500");
    assert_eq!(branch1["tunnels"]["branch1_isp2_isp1"]["intf"], "tunnel.502");

    let routes = branch1["remote_wans"].as_object().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes["192.0.2.4/30"]["gw"], "203.0.113.1");
}

#[test]
fn test_devices_show_unknown_exits_4() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws.cmd().args(["devices", "show", "nope"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("devices list"));
}

// ── Generate ────────────────────────────────────────────────────────

#[test]
fn test_generate_panorama_writes_single_file() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd().arg("generate").assert().success().stdout(
        predicate::str::contains("=== Tunnel Mesh Summary ===")
            .and(predicate::str::contains("branch1 (id=5, ASN=65005):"))
            .and(predicate::str::contains("Generated:")),
    );

    assert_eq!(file_names(&ws.output_dir()), ["panorama-set.txt"]);
    let text = std::fs::read_to_string(ws.output_dir().join("panorama-set.txt")).unwrap();
    assert!(text.starts_with("# ===== Configuration for branch1 ====="));
    assert!(text.contains("\n\n# ===== Configuration for hub1 ====="));
    assert!(text.contains("network interface tunnel units tunnel.100 ip 100.64.5.1/31"));
}

#[test]
fn test_generate_standalone_writes_per_device() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd()
        .args(["--target", "standalone", "generate", "--no-summary"])
        .assert()
        .success();

    assert_eq!(
        file_names(&ws.output_dir()),
        ["branch1.txt", "branch2.txt", "hub1.txt"]
    );
    let hub = std::fs::read_to_string(ws.output_dir().join("hub1.txt")).unwrap();
    assert!(hub.contains("set deviceconfig system hostname hub1"));
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd()
        .args(["generate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("==> panorama-set.txt <=="));
    assert!(!ws.output_dir().exists());
}

#[test]
fn test_generate_quiet_prints_nothing() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd()
        .args(["-q", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(ws.output_dir().join("panorama-set.txt").is_file());
}

#[test]
fn test_generate_fails_before_writing_on_bad_topology() {
    let ws = Workspace::new("tunnels:\n  pool: 100.64.0.0/24\nmembers: {}\n");
    let output = ws.cmd().arg("generate").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(!ws.output_dir().exists());
}

#[test]
fn test_generate_standalone_push_is_manual() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd()
        .args(["--target", "standalone", "generate", "--push", "--no-summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Push manually to each firewall"));
}

#[test]
fn test_generate_push_without_host_exits_2() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws
        .cmd()
        .args(["-y", "generate", "--push", "--no-summary"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No push host configured"));
    assert!(text.contains("WANMESH_PUSH__HOST"));
    // Files are written before the push step.
    assert!(ws.output_dir().join("panorama-set.txt").is_file());
}

// ── Push ────────────────────────────────────────────────────────────

#[test]
fn test_push_without_generated_files_exits_4() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws
        .cmd()
        .args(["-y", "push", "--host", "panorama.lab"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("wanmesh generate"));
}

/// Put an `ssh` script on PATH that records its arguments and stdin.
#[cfg(unix)]
fn fake_ssh_path(dir: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let script = bin.join("ssh");
    let body = format!(
        "#!/bin/sh\necho \"$@\" > '{args}'\ncat > '{stdin}'\n",
        args = dir.join("ssh-args").display(),
        stdin = dir.join("ssh-stdin").display(),
    );
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    format!("{}:{}", bin.display(), std::env::var("PATH").unwrap_or_default())
}

#[cfg(unix)]
#[test]
fn test_push_takes_host_from_nested_env_key() {
    let ws = Workspace::new(TOPOLOGY);
    ws.cmd()
        .args(["-q", "generate", "--no-summary"])
        .assert()
        .success();

    let path = fake_ssh_path(ws.dir.path());
    ws.cmd()
        .env("PATH", path)
        .env("WANMESH_PUSH__HOST", "panorama.lab")
        .args(["-y", "-q", "push"])
        .assert()
        .success();

    let args = std::fs::read_to_string(ws.dir.path().join("ssh-args")).unwrap();
    assert!(args.contains("admin@panorama.lab"), "ssh args: {args}");
    let stdin = std::fs::read_to_string(ws.dir.path().join("ssh-stdin")).unwrap();
    assert!(stdin.starts_with("configure\n"));
    assert!(stdin.ends_with("exit\n"));
    assert!(!stdin.contains("# ====="));
}

#[test]
fn test_push_rejects_unknown_policy() {
    let ws = Workspace::new(TOPOLOGY);
    let output = ws
        .cmd()
        .args(["push", "--on-error", "retry"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    wanmesh_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wanmesh").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_show_defaults_json() {
    let output = wanmesh_cmd()
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let cfg = stdout_json(&output);
    assert_eq!(cfg["topology"], "model-sdwan.yaml");
    assert_eq!(cfg["output_dir"], "output");
    assert_eq!(cfg["push"]["username"], "admin");
    assert_eq!(cfg["push"]["on_error"], "abort");
}

#[test]
fn test_config_show_applies_flag_overrides() {
    let output = wanmesh_cmd()
        .args(["--output-dir", "build", "-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["output_dir"], "build");
}
