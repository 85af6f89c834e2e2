// End-to-end tests driving the steep binary with an isolated prefix
// and a local HTTP server - exit codes, store layout, and cleanup.


use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use test_helpers::{TestEnvironment, fixture_archive, fixture_descriptor};

fn steep_bin() -> &'static str {
    env!("CARGO_BIN_EXE_steep")
}

/// Serve one HTTP response from a background thread, returning the
/// base URL.
fn serve_once(body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        if let Ok((mut socket, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request);

            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(header.as_bytes());
            let _ = socket.write_all(&body);
        }
    });

    format!("http://{addr}")
}

fn run_steep(prefix: &Path, args: &[&str]) -> std::process::Output {
    Command::new(steep_bin())
        .args(args)
        .env("STEEP_PREFIX", prefix)
        .output()
        .expect("failed to run steep")
}

#[test]
fn missing_descriptor_is_a_load_error() {
    let env = TestEnvironment::new();
    let output = run_steep(&env.prefix, &["install", "/nonexistent/yada.json"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn malformed_descriptor_is_a_load_error() {
    let env = TestEnvironment::new();
    let descriptor_path = env.temp_dir.path().join("yada.json");
    std::fs::write(&descriptor_path, r#"{"name": "yada"}"#).unwrap();

    let output = run_steep(&env.prefix, &["install", descriptor_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed descriptor"), "got: {stderr}");
}

#[test]
fn install_list_uninstall_workflow() {
    let env = TestEnvironment::new();
    let staging = env.temp_dir.path().join("staging.tar.gz");
    let (bytes, digest) = fixture_archive(&staging);

    let base = serve_once(bytes);
    let descriptor_path = env.temp_dir.path().join("yada.json");
    std::fs::write(
        &descriptor_path,
        fixture_descriptor(&format!("{base}/yada-1.0.0.tar.gz"), &digest),
    )
    .unwrap();

    // Install: exit 0, populated package dir, receipt written.
    let output = run_steep(&env.prefix, &["install", descriptor_path.to_str().unwrap()]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let package_dir = env.prefix.join("pkgs/yada/1.0.0");
    assert!(package_dir.join("bin/yada").exists());
    assert!(package_dir.join("RECEIPT.json").exists());

    // List shows it.
    let output = run_steep(&env.prefix, &["list", "--versions"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("yada"), "got: {stdout}");
    assert!(stdout.contains("1.0.0"), "got: {stdout}");

    // Uninstall removes it.
    let output = run_steep(&env.prefix, &["uninstall", "yada"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!env.prefix.join("pkgs/yada").exists());
}

#[test]
fn failed_verification_exits_5_and_removes_the_package() {
    let env = TestEnvironment::new();
    let staging = env.temp_dir.path().join("staging.tar.gz");
    let (bytes, digest) = fixture_archive(&staging);

    let base = serve_once(bytes);
    let descriptor_path = env.temp_dir.path().join("yada.json");
    std::fs::write(
        &descriptor_path,
        format!(
            r#"{{
                "name": "yada",
                "version": "1.0.0",
                "url": "{base}/yada-1.0.0.tar.gz",
                "sha256": "{digest}",
                "install": [
                    "mkdir -p \"$STEEP_PREFIX/bin\"",
                    "cp yada \"$STEEP_PREFIX/bin/yada\"",
                    "chmod 755 \"$STEEP_PREFIX/bin/yada\""
                ],
                "test": {{ "command": "yada --version", "expect": "2.0.0" }}
            }}"#
        ),
    )
    .unwrap();

    let output = run_steep(&env.prefix, &["install", descriptor_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("verification failed"), "got: {stderr}");

    // The partially installed package is cleaned up.
    assert!(!env.prefix.join("pkgs/yada/1.0.0").exists());
}

#[test]
fn failed_install_step_exits_4() {
    let env = TestEnvironment::new();
    let staging = env.temp_dir.path().join("staging.tar.gz");
    let (bytes, digest) = fixture_archive(&staging);

    let base = serve_once(bytes);
    let descriptor_path = env.temp_dir.path().join("yada.json");
    std::fs::write(
        &descriptor_path,
        format!(
            r#"{{
                "name": "yada",
                "version": "1.0.0",
                "url": "{base}/yada-1.0.0.tar.gz",
                "sha256": "{digest}",
                "install": ["exit 3"]
            }}"#
        ),
    )
    .unwrap();

    let output = run_steep(&env.prefix, &["install", descriptor_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(4));
    assert!(!env.prefix.join("pkgs/yada/1.0.0").exists());
}

#[test]
fn checksum_mismatch_exits_3_and_never_installs() {
    let env = TestEnvironment::new();
    let staging = env.temp_dir.path().join("staging.tar.gz");
    let (mut bytes, digest) = fixture_archive(&staging);
    bytes[0] ^= 0xff;

    let base = serve_once(bytes);
    let descriptor_path = env.temp_dir.path().join("yada.json");
    std::fs::write(
        &descriptor_path,
        fixture_descriptor(&format!("{base}/yada-1.0.0.tar.gz"), &digest),
    )
    .unwrap();

    let output = run_steep(&env.prefix, &["install", descriptor_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(!env.prefix.join("pkgs/yada").exists());
}

#[test]
fn show_json_round_trips_the_descriptor() {
    let env = TestEnvironment::new();
    let descriptor_path = env.temp_dir.path().join("yada.json");
    let text = fixture_descriptor("https://example.com/yada-1.0.0.tar.gz", &"ab".repeat(32));
    std::fs::write(&descriptor_path, &text).unwrap();

    let output = run_steep(
        &env.prefix,
        &["show", "--json", descriptor_path.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let reparsed = steep::Descriptor::parse(&stdout).unwrap();
    let original = steep::Descriptor::parse(&text).unwrap();
    assert_eq!(reparsed, original);
}

#[test]
fn dry_run_touches_nothing() {
    let env = TestEnvironment::new();
    let descriptor_path = env.temp_dir.path().join("yada.json");
    // Unreachable URL: a dry run must not fetch.
    std::fs::write(
        &descriptor_path,
        fixture_descriptor("http://127.0.0.1:1/yada-1.0.0.tar.gz", &"ab".repeat(32)),
    )
    .unwrap();

    let output = run_steep(
        &env.prefix,
        &["install", "--dry-run", descriptor_path.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(0));
    assert!(!env.prefix.join("pkgs").exists());
}

#[test]
#[ignore] // Requires outbound network access
fn real_network_install() {
    // Exercises the retry/backoff path against a real host. Kept out of
    // the default run; the local-server tests cover the pipeline.
    let env = TestEnvironment::new();
    let descriptor_path = env.temp_dir.path().join("yada.json");
    std::fs::write(
        &descriptor_path,
        fixture_descriptor("https://example.com/my-python-app-1.0.0.tar.gz", &"ab".repeat(32)),
    )
    .unwrap();

    let output = run_steep(&env.prefix, &["install", descriptor_path.to_str().unwrap()]);
    // example.com serves HTML, not our archive: fetch must fail closed.
    assert_eq!(output.status.code(), Some(3));
}
