//! Offline CLI tests: every case here is decided before a request is sent.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn siteadmin(storage: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("siteadmin").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("SITEADMIN_PASSWORD")
        .env("API_URL", "http://127.0.0.1:9")
        .env("SITEADMIN_STORAGE_DIR", storage.path())
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn version_prints_package_version() {
    let storage = TempDir::new().unwrap();
    siteadmin(&storage)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn whoami_without_session_is_not_logged_in() {
    let storage = TempDir::new().unwrap();
    siteadmin(&storage)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn protected_screen_requires_login() {
    let storage = TempDir::new().unwrap();
    siteadmin(&storage)
        .args(["list", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn public_screen_is_allowed_anonymously() {
    let storage = TempDir::new().unwrap();
    siteadmin(&storage)
        .args(["check", "/forgot-password"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allowed: /forgot-password"));
}

#[test]
fn login_validates_before_sending() {
    let storage = TempDir::new().unwrap();
    siteadmin(&storage)
        .args(["login", "--email", "not-an-email", "--password", "123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email is not a valid address"))
        .stderr(predicate::str::contains("at least 6 characters"));
}

#[test]
fn change_password_rejects_short_code() {
    let storage = TempDir::new().unwrap();
    siteadmin(&storage)
        .args([
            "change-password",
            "--email",
            "admin@tr.az",
            "--otp",
            "123",
            "--new-password",
            "secret1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("one-time code must be 6 characters"));
}

#[test]
fn logout_without_session_succeeds() {
    let storage = TempDir::new().unwrap();
    siteadmin(&storage)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
    assert_eq!(std::fs::read_dir(storage.path()).unwrap().count(), 0);
}
