//! Integration tests for the `dk` CLI.
//!
//! Each test points `dk` at a library file inside a temp directory, runs
//! it as a subprocess, and verifies stdout and/or the persisted file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

/// Get the path to the built `dk` binary.
fn dk_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dk");
    path
}

/// Run `dk` against the given library file, returning (stdout, stderr, success).
fn run_dk(library: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(dk_bin())
        .arg("--library")
        .arg(library)
        .args(args)
        .output()
        .expect("failed to run dk");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `dk` expecting success, return stdout.
fn run_dk_ok(library: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_dk(library, args);
    if !success {
        panic!(
            "dk {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Add a profile pointing at a real directory under the temp root and
/// return its id.
fn add_profile(library: &Path, tmp: &Path, name: &str) -> String {
    let dir = tmp.join(name);
    fs::create_dir_all(&dir).unwrap();
    let out = run_dk_ok(library, &["add", name, dir.to_str().unwrap()]);
    out.trim().to_string()
}

/// Names in display order, parsed out of `list --json`.
fn listed_names(library: &Path) -> Vec<String> {
    let out = run_dk_ok(library, &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[test]
fn test_list_seeds_default_entry() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");

    let out = run_dk_ok(&library, &["list"]);
    assert!(out.contains("Home"));
    assert!(out.contains("~"));

    // the file now exists with the seeded entry
    let text = fs::read_to_string(&library).unwrap();
    assert!(text.contains("\"version\": 1"));
    assert!(text.contains("\"kind\": \"default\""));
}

#[test]
fn test_no_subcommand_lists() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");

    let out = run_dk_ok(&library, &[]);
    assert!(out.contains("Home"));
}

#[test]
fn test_list_json_shape() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");

    let out = run_dk_ok(&library, &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["group"], "default");
    assert_eq!(arr[0]["position"], 0);
    assert_eq!(arr[1]["name"], "api");
    assert_eq!(arr[1]["sort_order"], 0);
    // tokens never reach the JSON surface
    assert!(!out.contains("token"));
}

#[test]
fn test_add_appends_in_creation_order() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");
    add_profile(&library, tmp.path(), "infra");

    assert_eq!(listed_names(&library), vec!["Home", "api", "web", "infra"]);
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[test]
fn test_add_rejects_missing_directory() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");

    let (_stdout, stderr, success) = run_dk(
        &library,
        &["add", "ghost", tmp.path().join("nope").to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("cannot resolve directory"));
}

#[test]
fn test_show_accepts_id_prefix() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    let id = add_profile(&library, tmp.path(), "api");

    let out = run_dk_ok(&library, &["show", &id[..8]]);
    assert!(out.contains("api"));
    assert!(out.contains(&id));
}

#[test]
fn test_show_unknown_id_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");

    let (_stdout, stderr, success) = run_dk(&library, &["show", "no-such-id"]);
    assert!(!success);
    assert!(stderr.contains("no profile matches"));
}

#[test]
fn test_edit_updates_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    let id = add_profile(&library, tmp.path(), "api");

    run_dk_ok(&library, &["edit", &id, "--name", "api-v2"]);
    let out = run_dk_ok(&library, &["show", &id]);
    assert!(out.contains("api-v2"));
}

#[test]
fn test_edit_custom_endpoint() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    let id = add_profile(&library, tmp.path(), "api");

    run_dk_ok(
        &library,
        &[
            "edit",
            &id,
            "--custom",
            "--model",
            "some-model",
            "--base-url",
            "https://example.test",
        ],
    );
    let out = run_dk_ok(&library, &["show", &id, "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["mode"], "custom");
    assert_eq!(parsed["model"], "some-model");
    assert_eq!(parsed["base_url"], "https://example.test");
}

#[test]
fn test_rm_deletes_profile() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");

    let out = run_dk_ok(&library, &["rm", "api"]);
    assert!(out.contains("removed"));
    assert_eq!(listed_names(&library), vec!["Home", "web"]);
}

#[test]
fn test_rm_default_entry_refused() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    run_dk_ok(&library, &["list"]);

    let (_stdout, stderr, success) = run_dk(&library, &["rm", "Home"]);
    assert!(!success);
    assert!(stderr.contains("default entry cannot be removed"));
}

// ---------------------------------------------------------------------------
// Pinning
// ---------------------------------------------------------------------------

#[test]
fn test_pin_surfaces_above_normal_group() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");

    run_dk_ok(&library, &["pin", "web"]);
    assert_eq!(listed_names(&library), vec!["Home", "web", "api"]);

    let out = run_dk_ok(&library, &["list"]);
    let web_line = out.lines().find(|l| l.contains("web")).unwrap();
    assert!(web_line.contains('*'));
}

#[test]
fn test_unpin_appends_to_normal_group() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");

    run_dk_ok(&library, &["pin", "api"]);
    run_dk_ok(&library, &["unpin", "api"]);
    assert_eq!(listed_names(&library), vec!["Home", "web", "api"]);
}

#[test]
fn test_pin_default_entry_refused() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    run_dk_ok(&library, &["list"]);

    let (_stdout, stderr, success) = run_dk(&library, &["pin", "Home"]);
    assert!(!success);
    assert!(stderr.contains("default entry cannot be pinned"));
}

// ---------------------------------------------------------------------------
// Moving
// ---------------------------------------------------------------------------

#[test]
fn test_mv_within_normal_group_persists() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");
    add_profile(&library, tmp.path(), "infra");

    let out = run_dk_ok(&library, &["mv", "infra", "api"]);
    assert!(out.contains("moved"));

    // a separate process sees the saved order
    assert_eq!(listed_names(&library), vec!["Home", "infra", "api", "web"]);
}

#[test]
fn test_mv_within_pinned_group() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");

    run_dk_ok(&library, &["pin", "api"]);
    run_dk_ok(&library, &["pin", "web"]);

    // pins in the same second tie on the timestamp, so read the order back
    // rather than assuming it
    let names = listed_names(&library);
    let (leader, trailer) = (names[1].clone(), names[2].clone());

    run_dk_ok(&library, &["mv", &trailer, &leader]);
    assert_eq!(
        listed_names(&library),
        vec!["Home".to_string(), trailer, leader]
    );
}

#[test]
fn test_mv_across_groups_cancels() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");
    run_dk_ok(&library, &["pin", "api"]);

    let (_stdout, stderr, success) = run_dk(&library, &["mv", "api", "web"]);
    assert!(!success);
    assert!(stderr.contains("cannot be mixed"));

    // nothing moved
    assert_eq!(listed_names(&library), vec!["Home", "api", "web"]);
}

#[test]
fn test_mv_onto_itself_cancels() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");

    let (_stdout, stderr, success) = run_dk(&library, &["mv", "api", "api"]);
    assert!(!success);
    assert!(stderr.contains("dropped on itself"));
}

#[test]
fn test_mv_onto_default_cancels() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");

    let (_stdout, stderr, success) = run_dk(&library, &["mv", "api", "Home"]);
    assert!(!success);
    assert!(stderr.contains("default entry"));
}

#[test]
fn test_mv_reindexes_ranks_densely() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    add_profile(&library, tmp.path(), "web");
    add_profile(&library, tmp.path(), "infra");
    run_dk_ok(&library, &["rm", "web"]);

    // removal leaves a gap (0, 2); the next move rewrites 0..n
    run_dk_ok(&library, &["mv", "infra", "api"]);
    let out = run_dk_ok(&library, &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let orders: Vec<i64> = parsed
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["group"] == "normal")
        .map(|p| p["sort_order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![0, 1]);
}

// ---------------------------------------------------------------------------
// Launch
// ---------------------------------------------------------------------------

#[test]
fn test_launch_missing_agent_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");

    let (_stdout, stderr, success) = run_dk(
        &library,
        &["launch", "api", "--agent", "dk-no-such-agent-binary"],
    );
    assert!(!success);
    assert!(stderr.contains("could not start"));
}

#[test]
fn test_launch_missing_directory_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    fs::remove_dir(tmp.path().join("api")).unwrap();

    let (_stdout, stderr, success) = run_dk(&library, &["launch", "api"]);
    assert!(!success);
    assert!(stderr.contains("working directory does not exist"));
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[test]
fn test_corrupt_library_is_backed_up_and_reseeded() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");
    add_profile(&library, tmp.path(), "api");
    fs::write(&library, "{ not json").unwrap();

    let out = run_dk_ok(&library, &["list"]);
    assert!(out.contains("Home"));
    assert!(tmp.path().join("library.json.bak").exists());
}

#[test]
fn test_help() {
    let tmp = tempfile::TempDir::new().unwrap();
    let library = tmp.path().join("library.json");

    let (stdout, _stderr, success) = run_dk(&library, &["--help"]);
    assert!(success);
    assert!(stdout.contains("dock"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("mv"));
    assert!(stdout.contains("launch"));
}
