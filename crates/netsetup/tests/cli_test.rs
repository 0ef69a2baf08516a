//! Integration tests for the `netsetup` CLI binary.
//!
//! Every test works on its own temporary state file and points the config
//! directories at a nonexistent path, so the user's real configuration is
//! never read.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `netsetup` binary with env isolation.
fn netsetup_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("netsetup");
    cmd.env("HOME", "/tmp/netsetup-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/netsetup-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("NETSETUP_STATE")
        .env_remove("NETSETUP_DEFAULTS")
        .env_remove("NETSETUP_HARDWARE")
        .env_remove("NETSETUP_SESSION")
        .env_remove("RUST_LOG");
    cmd
}

/// A command bound to a fresh state file.
struct Workspace {
    _dir: TempDir,
    state: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        Self { _dir: dir, state }
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = netsetup_cmd();
        cmd.arg("--state").arg(&self.state);
        cmd
    }

    fn run(&self, args: &[&str]) -> std::process::Output {
        self.cmd().args(args).output().unwrap()
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "netsetup {args:?} failed:\n{}",
            combined_output(&output)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn state_json(&self) -> Value {
        read_json(&self.state)
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Workspace with hardware eth0..eth2 and a statically addressed eth0.
fn with_static_eth0() -> Workspace {
    let ws = Workspace::new();
    ws.ok(&[
        "--physical",
        "eth0,eth1,eth2",
        "interfaces",
        "add",
        "eth0",
        "--type",
        "ethernet",
        "--ip4",
        "192.0.2.1/255.255.255.0",
    ]);
    ws
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = netsetup_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    netsetup_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("network interface")
            .and(predicate::str::contains("interfaces"))
            .and(predicate::str::contains("summary")),
    );
}

#[test]
fn test_version_flag() {
    netsetup_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netsetup"));
}

#[test]
fn test_completions_bash() {
    netsetup_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_path_names_the_app() {
    netsetup_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("netsetup"));
}

// ── Editing ─────────────────────────────────────────────────────────

#[test]
fn test_add_writes_wire_records() {
    let ws = with_static_eth0();
    let state = ws.state_json();

    assert_eq!(state["physical_interfaces"], json!(["eth0", "eth1", "eth2"]));
    assert_eq!(state["interfaces"]["eth0"]["interfaceType"], "Ethernet");
    assert_eq!(
        state["interfaces"]["eth0"]["ip4"],
        json!([["192.0.2.1", "255.255.255.0"]])
    );
}

#[test]
fn test_bond_absorbs_members() {
    let ws = with_static_eth0();
    let out = ws.ok(&[
        "interfaces", "add", "bond0", "--type", "bond", "--member", "eth0,eth1", "--dhcp",
    ]);
    assert!(out.contains("Added interface 'bond0'"), "{out}");
    assert!(out.contains("eth0: standalone addressing cleared"), "{out}");
    assert!(out.contains("eth1: created as member"), "{out}");

    let state = ws.state_json();
    assert_eq!(state["interfaces"]["bond0"]["bond_slaves"], json!(["eth0", "eth1"]));
    assert_eq!(state["interfaces"]["bond0"]["ip4dynamic"], true);
    assert_eq!(state["interfaces"]["eth0"]["ip4"], json!([]));
    assert_eq!(state["interfaces"]["eth1"]["interfaceType"], "Ethernet");

    let used = ws.ok(&["interfaces", "list", "--used", "-o", "plain"]);
    assert_eq!(used.lines().collect::<Vec<_>>(), ["eth0", "eth1"]);
}

#[test]
fn test_member_cannot_be_removed() {
    let ws = with_static_eth0();
    ws.ok(&["interfaces", "add", "bond0", "--type", "bond", "--member", "eth0"]);

    let output = ws.run(&["interfaces", "remove", "eth0", "--yes"]);
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("member of 'bond0'"));
}

#[test]
fn test_remove_needs_confirmation_when_not_interactive() {
    let ws = with_static_eth0();
    let output = ws.run(&["interfaces", "remove", "eth0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
    assert!(ws.state_json()["interfaces"]["eth0"].is_object());
}

#[test]
fn test_remove_releases_members() {
    let ws = with_static_eth0();
    ws.ok(&["interfaces", "add", "bond0", "--type", "bond", "--member", "eth0,eth1"]);
    assert_eq!(ws.state_json()["interfaces"]["eth0"]["ip4"], json!([]));

    let out = ws.ok(&["interfaces", "remove", "bond0", "-y"]);
    assert!(out.contains("eth0: addressing restored"), "{out}");
    assert!(!out.contains("eth1: addressing restored"), "{out}");

    let state = ws.state_json();
    assert!(state["interfaces"].get("bond0").is_none());
    assert_eq!(
        state["interfaces"]["eth0"]["ip4"],
        json!([["192.0.2.1", "255.255.255.0"]])
    );
    assert!(state.get("suspended").is_none());

    let unused = ws.ok(&["interfaces", "list", "--unused", "-o", "plain"]);
    for name in ["eth0", "eth1", "eth2"] {
        assert!(unused.lines().any(|l| l == name), "{name} missing from:\n{unused}");
    }
}

#[test]
fn test_member_keeps_its_kind() {
    let ws = with_static_eth0();
    ws.ok(&["interfaces", "add", "bond0", "--type", "bond", "--member", "eth0"]);

    let output = ws.run(&[
        "interfaces", "put", "eth0", "--type", "vlan", "--vlan-id", "5", "--parent", "eth1",
    ]);
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("is a member of 'bond0'"));
    assert_eq!(ws.state_json()["interfaces"]["eth0"]["interfaceType"], "Ethernet");
}

#[test]
fn test_duplicate_add_is_a_conflict() {
    let ws = with_static_eth0();
    let output = ws.run(&["interfaces", "add", "eth0", "--type", "ethernet"]);
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("already exists"));

    ws.ok(&["interfaces", "put", "eth0", "--type", "ethernet", "--dhcp"]);
    assert_eq!(ws.state_json()["interfaces"]["eth0"]["ip4dynamic"], true);
}

#[test]
fn test_vlan_id_out_of_range_is_invalid() {
    let ws = with_static_eth0();
    let output = ws.run(&[
        "interfaces", "add", "eth0.5000", "--type", "vlan", "--vlan-id", "5000", "--parent", "eth0",
    ]);
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
    assert!(ws.state_json()["interfaces"].get("eth0.5000").is_none());
}

#[test]
fn test_bad_address_is_a_usage_error() {
    let ws = Workspace::new();
    let output = ws.run(&["interfaces", "add", "eth0", "--type", "ethernet", "--ip4", "192.0.2.1"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("ADDR/MASK"));
}

#[test]
fn test_flag_for_another_kind_is_rejected() {
    let ws = Workspace::new();
    let output = ws.run(&["interfaces", "add", "eth0", "--type", "ethernet", "--member", "eth1"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--member"));
}

#[test]
fn test_put_from_file() {
    let ws = with_static_eth0();
    let record = ws.state.with_file_name("br0.json");
    std::fs::write(
        &record,
        r#"{"interfaceType": "Bridge", "bridge_ports": ["eth2"], "bridge_fd": 4}"#,
    )
    .unwrap();

    ws.ok(&["interfaces", "put", "br0", "--from-file", record.to_str().unwrap()]);

    let br0 = &ws.state_json()["interfaces"]["br0"];
    assert_eq!(br0["bridge_ports"], json!(["eth2"]));
    assert_eq!(br0["bridge_fd"], 4);
}

#[test]
fn test_rename_follows_primary() {
    let ws = with_static_eth0();
    ws.ok(&["interfaces", "primary", "eth0"]);
    assert_eq!(ws.state_json()["primary"], "eth0");

    ws.ok(&["interfaces", "rename", "eth0", "lan0"]);
    let state = ws.state_json();
    assert_eq!(state["primary"], "lan0");
    assert!(state["interfaces"]["lan0"].is_object());

    ws.ok(&["interfaces", "primary", "--clear"]);
    assert!(ws.state_json()["primary"].is_null());
}

#[test]
fn test_mutation_without_state_file() {
    let output = netsetup_cmd()
        .args(["interfaces", "add", "eth0", "--type", "ethernet"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--state"));
}

// ── Queries ─────────────────────────────────────────────────────────

#[test]
fn test_get_missing_interface() {
    let ws = with_static_eth0();
    let output = ws.run(&["interfaces", "get", "eth9"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("not found"));
}

#[test]
fn test_get_shows_detail() {
    let ws = with_static_eth0();
    let out = ws.ok(&["interfaces", "get", "eth0"]);
    assert!(out.contains("192.0.2.1/255.255.255.0"), "{out}");
    assert!(out.contains("available"), "{out}");

    let hw = ws.ok(&["interfaces", "get", "eth2"]);
    assert!(hw.contains("unconfigured hardware"), "{hw}");
}

#[test]
fn test_list_json_uses_wire_records() {
    let ws = with_static_eth0();
    ws.ok(&["interfaces", "add", "eth0.7", "--type", "vlan", "--vlan-id", "7", "--parent", "eth0"]);

    let out = ws.ok(&["interfaces", "list", "-o", "json"]);
    let list: Value = serde_json::from_str(&out).unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["eth0", "eth0.7"]);
    assert_eq!(list[1]["interfaceType"], "VLAN");
    assert_eq!(list[1]["vlan_id"], 7);
}

#[test]
fn test_candidates_exclude_members() {
    let ws = with_static_eth0();
    ws.ok(&["interfaces", "add", "bond0", "--type", "bond", "--member", "eth0,eth1"]);

    let out = ws.ok(&["interfaces", "candidates", "bond1", "--type", "bond", "-o", "plain"]);
    assert_eq!(out.lines().collect::<Vec<_>>(), ["eth2"]);

    let own = ws.ok(&["interfaces", "candidates", "bond0", "--type", "bond", "-o", "plain"]);
    assert!(own.lines().any(|l| l == "eth0"), "{own}");
}

#[test]
fn test_types_for_new_name() {
    let ws = with_static_eth0();
    let out = ws.ok(&["interfaces", "types", "br0", "-o", "plain"]);
    let types: Vec<&str> = out.lines().collect();
    assert!(types.contains(&"Bond"), "{out}");
    assert!(types.contains(&"Bridge"), "{out}");
}

#[test]
fn test_summary_plain() {
    let ws = with_static_eth0();
    ws.ok(&["interfaces", "add", "bond0", "--type", "bond", "--member", "eth1", "--slaac"]);

    let out = ws.ok(&["summary", "-o", "plain"]);
    assert!(out.contains("  eth0: 192.0.2.1/255.255.255.0"), "{out}");
    assert!(out.contains("IPv6 autoconfiguration: bond0"), "{out}");
    assert!(out.contains("  eth1: member of bond0"), "{out}");
    assert!(out.trim_end().ends_with("Primary interface: none"), "{out}");
}

#[test]
fn test_summary_without_state_is_empty() {
    netsetup_cmd()
        .args(["summary", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Primary interface: none\n"));
}
