//! Integration tests for the `scholarly` CLI binary.
//!
//! Each test gets its own data directory and a config path that does not
//! exist, so nothing touches the user's real records or settings.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `scholarly` binary with env isolation.
///
/// Clears all `SCHOLARLY_*` env vars, points config directories at a
/// nonexistent path, and stores records under `data`.
fn scholarly_cmd(data: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("scholarly");
    cmd.env("HOME", "/tmp/scholarly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/scholarly-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/scholarly-cli-test-nonexistent")
        .env("SCHOLARLY_CONFIG", data.join("no-such-config.toml"))
        .env_remove("SCHOLARLY_DATA_DIR")
        .env_remove("SCHOLARLY_OUTPUT")
        .env_remove("SCHOLARLY_PARENT_PASSWORD")
        .env_remove("SCHOLARLY_STORAGE__BACKEND")
        .env_remove("SCHOLARLY_SUBSCRIPTION__TRIAL_DAYS")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data)
        .arg("--color")
        .arg("never")
        .write_stdin("");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run with `-o json` and parse stdout, asserting success.
fn json(data: &Path, args: &[&str]) -> Value {
    let output = scholarly_cmd(data)
        .args(["--output", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {args:?} failed:\n{}",
        combined_output(&output)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn create_request(data: &Path, extra: &[&str]) -> String {
    let mut args = vec![
        "requests",
        "create",
        "--student",
        "Sam",
        "--parent-email",
        "Parent@Example.com",
    ];
    args.extend_from_slice(extra);
    let request = json(data, &args);
    request["token"].as_str().unwrap().to_owned()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = scholarly_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_command_groups() {
    let dir = TempDir::new().unwrap();
    scholarly_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("subscription")
            .and(predicate::str::contains("requests"))
            .and(predicate::str::contains("parents"))
            .and(predicate::str::contains("privacy")),
    );
}

#[test]
fn test_completions_zsh() {
    let dir = TempDir::new().unwrap();
    scholarly_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    let dir = TempDir::new().unwrap();
    let output = scholarly_cmd(dir.path())
        .args(["--output", "invalid", "subscription", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn test_config_path_honors_override() {
    let dir = TempDir::new().unwrap();
    scholarly_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no-such-config.toml"));
}

#[test]
fn test_config_init_defaults_then_show() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    scholarly_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init", "--defaults"])
        .assert()
        .success();
    assert!(config.exists());

    let shown = json(
        dir.path(),
        &["--config", config.to_str().unwrap(), "config", "show"],
    );
    assert_eq!(shown["subscription"]["trial_days"], 7);
}

// ── Subscription ────────────────────────────────────────────────────

#[test]
fn test_config_default_output_applies_unless_flag_given() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[defaults]\noutput = \"json\"\n").unwrap();

    let output = scholarly_cmd(dir.path())
        .env("SCHOLARLY_CONFIG", &config)
        .args(["subscription", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["status"], "trial");

    scholarly_cmd(dir.path())
        .env("SCHOLARLY_CONFIG", &config)
        .args(["--output", "plain", "subscription", "show"])
        .assert()
        .success()
        .stdout(predicate::str::diff("trial\n"));
}

#[test]
fn test_first_visit_starts_trial_once() {
    let dir = TempDir::new().unwrap();
    let first = json(dir.path(), &["subscription", "show"]);
    assert_eq!(first["status"], "trial");
    assert_eq!(first["tier"], "premium");
    assert_eq!(first["premium"], true);
    assert!(first["trialEndsAt"].is_string());

    // The stored trial is reused, not restarted.
    let second = json(dir.path(), &["subscription", "show"]);
    assert_eq!(second["trialEndsAt"], first["trialEndsAt"]);
}

#[test]
fn test_clear_does_not_grant_new_trial() {
    let dir = TempDir::new().unwrap();
    json(dir.path(), &["subscription", "show"]);
    scholarly_cmd(dir.path())
        .args(["-y", "subscription", "clear"])
        .assert()
        .success();

    let after = json(dir.path(), &["subscription", "show"]);
    assert_eq!(after["status"], "free");
    assert_eq!(after["tier"], "free");
    assert_eq!(after["subscriptionActive"], false);
}

#[test]
fn test_lapsed_plan_expires_on_next_open() {
    let dir = TempDir::new().unwrap();
    json(
        dir.path(),
        &[
            "subscription",
            "update",
            "--status",
            "active",
            "--tier",
            "premium",
            "--expires-at",
            "2000-01-01T00:00:00Z",
            "--trial-ends-at",
            "none",
        ],
    );

    let swept = json(dir.path(), &["subscription", "show"]);
    assert_eq!(swept["status"], "expired");
    assert_eq!(swept["tier"], "premium");
    assert_eq!(swept["premium"], false);

    scholarly_cmd(dir.path())
        .args(["--output", "plain", "subscription", "feature", "unlimited_scholarships"])
        .assert()
        .success()
        .stdout(predicate::str::diff("locked\n"));
}

#[test]
fn test_sweep_reports_lapsed_plan() {
    let dir = TempDir::new().unwrap();
    json(
        dir.path(),
        &[
            "subscription",
            "update",
            "--status",
            "active",
            "--expires-at",
            "2000-01-01T00:00:00Z",
        ],
    );

    let output = scholarly_cmd(dir.path())
        .args(["--output", "plain", "subscription", "sweep"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "expired\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Subscription lapsed and was downgraded"));
    assert!(!stderr.contains("Nothing to expire"));

    // A second sweep finds nothing left to do.
    scholarly_cmd(dir.path())
        .args(["subscription", "sweep"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing to expire"));
}

#[test]
fn test_incoherent_update_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = scholarly_cmd(dir.path())
        .args(["subscription", "update", "--status", "trial", "--trial-ends-at", "none"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("trialEndsAt"));

    // Nothing was written: still the first-visit trial.
    let current = json(dir.path(), &["subscription", "show"]);
    assert!(current["trialEndsAt"].is_string());
}

#[test]
fn test_direct_checkout_activates() {
    let dir = TempDir::new().unwrap();
    let sub = json(
        dir.path(),
        &["-y", "subscription", "checkout", "--plan", "annual"],
    );
    assert_eq!(sub["status"], "active");
    assert_eq!(sub["paymentMethod"], "direct");
    assert!(sub.get("trialEndsAt").is_none());
}

// ── Payment requests ────────────────────────────────────────────────

#[test]
fn test_request_pay_flow() {
    let dir = TempDir::new().unwrap();
    let token = create_request(dir.path(), &[]);

    scholarly_cmd(dir.path())
        .args(["--output", "plain", "requests", "pending", "--latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains(token.as_str()));

    let receipt = json(
        dir.path(),
        &["-y", "requests", "pay", &token, "--payer-email", "parent@example.com"],
    );
    assert_eq!(receipt["subscription"]["status"], "active");
    assert_eq!(receipt["subscription"]["paymentMethod"], "parent");
    assert_eq!(receipt["request"]["status"], "completed");
    assert_eq!(receipt["request"]["amount"], 999);

    // Paying twice is a conflict.
    let output = scholarly_cmd(dir.path())
        .args(["-y", "requests", "pay", &token, "--payer-email", "parent@example.com"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn test_unknown_token_is_not_found() {
    let dir = TempDir::new().unwrap();
    let output = scholarly_cmd(dir.path())
        .args(["requests", "validate", "nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_parent_plan_needs_password_for_new_account() {
    let dir = TempDir::new().unwrap();
    let token = create_request(dir.path(), &["--type", "parent"]);

    let output = scholarly_cmd(dir.path())
        .args(["-y", "requests", "pay", &token, "--payer-email", "parent@example.com"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let receipt = json(
        dir.path(),
        &[
            "-y",
            "requests",
            "pay",
            &token,
            "--payer-email",
            "parent@example.com",
            "--password",
            "s3cret-pw",
        ],
    );
    let account = &receipt["parentAccount"];
    assert_eq!(account["accountType"], "parent-paid");
    assert_eq!(account["linkedStudents"][0], "Sam");
    assert!(account.get("password").is_none());
    assert!(!receipt.to_string().contains("s3cret-pw"));
}

#[test]
fn test_request_link_uses_route() {
    let dir = TempDir::new().unwrap();
    scholarly_cmd(dir.path())
        .args(["requests", "link", "abc", "--parent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/parent-payment/abc"));
}

// ── Parent accounts ─────────────────────────────────────────────────

#[test]
fn test_free_parent_student_limit() {
    let dir = TempDir::new().unwrap();
    let account = json(
        dir.path(),
        &[
            "parents",
            "create",
            "--email",
            "p@example.com",
            "--student",
            "Sam",
            "--password",
            "pw-123",
        ],
    );
    assert_eq!(account["accountType"], "parent-free");

    let output = scholarly_cmd(dir.path())
        .args(["parents", "link-student", "p@example.com", "Alex"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));

    json(
        dir.path(),
        &["parents", "upgrade", "p@example.com", "--to", "parent-paid"],
    );
    let linked = json(
        dir.path(),
        &["parents", "link-student", "p@example.com", "Alex"],
    );
    assert_eq!(linked["linkedStudents"][1], "Alex");
}

#[test]
fn test_upgrade_options_for_unknown_email() {
    let dir = TempDir::new().unwrap();
    let options = json(dir.path(), &["parents", "options", "new@example.com"]);
    assert_eq!(options["hasAccount"], false);
    assert_eq!(options["canAddStudent"], true);
}

// ── Privacy ─────────────────────────────────────────────────────────

#[test]
fn test_privacy_filter_hides_gender_tagged_listing() {
    let dir = TempDir::new().unwrap();
    let listings = dir.path().join("listings.json");
    std::fs::write(
        &listings,
        r#"[
            {"id": "1", "name": "Women in Technology", "description": "For women in tech"},
            {"id": "2", "name": "General Merit Award", "description": "Open to all"}
        ]"#,
    )
    .unwrap();

    json(dir.path(), &["privacy", "set", "gender", "false"]);
    let result = json(
        dir.path(),
        &["privacy", "filter", listings.to_str().unwrap()],
    );
    assert_eq!(result["hiddenCount"], 1);
    assert_eq!(result["visible"][0]["id"], "2");
}

#[test]
fn test_unknown_privacy_flag_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = scholarly_cmd(dir.path())
        .args(["privacy", "set", "shoeSize", "false"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("scholarshipMatches"));
}

// ── Scholarships & children ─────────────────────────────────────────

#[test]
fn test_saved_scholarships_toggle() {
    let dir = TempDir::new().unwrap();
    scholarly_cmd(dir.path())
        .args(["scholarships", "save", "s-1"])
        .assert()
        .success();
    scholarly_cmd(dir.path())
        .args(["scholarships", "toggle", "s-2"])
        .assert()
        .success();
    scholarly_cmd(dir.path())
        .args(["scholarships", "toggle", "s-1"])
        .assert()
        .success();

    let saved = json(dir.path(), &["scholarships", "list"]);
    assert_eq!(saved, serde_json::json!(["s-2"]));
}

#[test]
fn test_child_invitation_accept() {
    let dir = TempDir::new().unwrap();
    let child = json(dir.path(), &["children", "add", "Riley", "--grade", "11"]);
    let id = child["id"].as_str().unwrap().to_owned();

    let invited = json(dir.path(), &["children", "invite", &id]);
    let token = invited["invitationToken"].as_str().unwrap().to_owned();
    assert_ne!(token, id);

    let accepted = json(dir.path(), &["children", "accept", &token]);
    assert_eq!(accepted["invitationStatus"], "accepted");

    let output = scholarly_cmd(dir.path())
        .args(["children", "accept", &token])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn test_memory_store_leaves_no_files() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    cargo_bin_cmd!("scholarly")
        .env("SCHOLARLY_CONFIG", dir.path().join("no-such-config.toml"))
        .env_remove("SCHOLARLY_DATA_DIR")
        .env_remove("SCHOLARLY_OUTPUT")
        .env("HOME", &data)
        .env("XDG_DATA_HOME", &data)
        .args(["--memory", "--output", "plain", "subscription", "show"])
        .assert()
        .success()
        .stdout(predicate::str::diff("trial\n"));
    assert!(!data.exists());
}
