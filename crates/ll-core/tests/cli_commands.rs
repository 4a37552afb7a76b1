//! CLI tests for linkedin-launch.
//!
//! Every test runs the real binary against an isolated environment: a temp
//! XDG config home and no LINKEDIN_* variables from the developer's shell.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CLIENT_ID: &str = "client-id-0001";
const CLIENT_SECRET: &str = "client-secret-S3cr3tValue";
const ACCESS_TOKEN: &str = "AQVaccess-token-value-123";
const REFRESH_TOKEN: &str = "AQWrefresh-token-value-456";

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn write(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).expect("write config");
        path
    }

    fn full_config(&self) -> PathBuf {
        self.write(
            "full.json",
            &serde_json::json!({
                "linkedinClientId": CLIENT_ID,
                "linkedinClientSecret": CLIENT_SECRET,
                "linkedinAccessToken": ACCESS_TOKEN,
                "linkedinRefreshToken": REFRESH_TOKEN,
            })
            .to_string(),
        )
    }

    fn missing_token_config(&self) -> PathBuf {
        self.write(
            "partial.json",
            &serde_json::json!({
                "linkedinClientId": CLIENT_ID,
                "linkedinClientSecret": CLIENT_SECRET,
                "linkedinRefreshToken": REFRESH_TOKEN,
            })
            .to_string(),
        )
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("linkedin-launch").expect("binary should exist");
        cmd.env("XDG_CONFIG_HOME", self.dir.path())
            .env_remove("LINKEDIN_LAUNCH_CONFIG")
            .env_remove("LINKEDIN_CLIENT_ID")
            .env_remove("LINKEDIN_CLIENT_SECRET")
            .env_remove("LINKEDIN_ACCESS_TOKEN")
            .env_remove("LINKEDIN_REFRESH_TOKEN")
            .env_remove("RUST_LOG")
            .env_remove("LL_LOG")
            .env_remove("LL_LOG_FORMAT");
        cmd
    }

    fn with_config(&self, path: &Path) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--config").arg(path);
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

mod schema {
    use super::*;

    #[test]
    fn lists_fields_in_order() {
        let sandbox = Sandbox::new();
        let output = sandbox.cmd().arg("schema").output().unwrap();
        assert!(output.status.success());

        let json = stdout_json(&output);
        let names: Vec<&str> = json["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "linkedinClientId",
                "linkedinClientSecret",
                "linkedinAccessToken",
                "linkedinRefreshToken"
            ]
        );
        assert_eq!(json["fields"][0]["type"], "string");
        assert_eq!(json["fields"][0]["required"], true);
    }

    #[test]
    fn json_schema_flag() {
        Sandbox::new()
            .cmd()
            .args(["schema", "--json-schema"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"required\""))
            .stdout(predicate::str::contains("\"linkedinRefreshToken\""));
    }

    #[test]
    fn descriptor_schema_flag() {
        Sandbox::new()
            .cmd()
            .args(["schema", "--descriptor"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"command\""))
            .stdout(predicate::str::contains("\"env\""));
    }

    #[test]
    fn markdown_table() {
        Sandbox::new()
            .cmd()
            .args(["schema", "--format", "md"])
            .assert()
            .success()
            .stdout(predicate::str::contains("| linkedinAccessToken | string | yes | LINKEDIN_ACCESS_TOKEN |"));
    }
}

mod validate {
    use super::*;

    #[test]
    fn complete_config_is_valid() {
        let sandbox = Sandbox::new();
        let output = sandbox
            .with_config(&sandbox.full_config())
            .arg("validate")
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(0));

        let json = stdout_json(&output);
        assert_eq!(json["status"], "valid");
        assert_eq!(json["source"], "CLI argument");
        assert!(json["missing_fields"].as_array().unwrap().is_empty());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains(CLIENT_SECRET));
    }

    #[test]
    fn missing_field_exits_10() {
        let sandbox = Sandbox::new();
        let output = sandbox
            .with_config(&sandbox.missing_token_config())
            .arg("validate")
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(10));

        let json = stdout_json(&output);
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["missing_fields"][0], "linkedinAccessToken");
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let sandbox = Sandbox::new();
        let path = sandbox.write(
            "empty.json",
            r#"{"linkedinClientId": "", "linkedinClientSecret": "x", "linkedinAccessToken": "y", "linkedinRefreshToken": "z"}"#,
        );
        sandbox
            .with_config(&path)
            .args(["validate", "--format", "summary"])
            .assert()
            .code(10)
            .stdout(predicate::str::contains("missing linkedinClientId"));
    }

    #[test]
    fn reads_stdin_with_dash() {
        let sandbox = Sandbox::new();
        let body = std::fs::read_to_string(sandbox.full_config()).unwrap();
        sandbox
            .cmd()
            .args(["--config", "-", "validate", "--format", "summary"])
            .write_stdin(body)
            .assert()
            .success()
            .stdout(predicate::str::contains("valid (stdin)"));
    }

    #[test]
    fn falls_back_to_xdg_config() {
        let sandbox = Sandbox::new();
        let app_dir = sandbox.dir.path().join("linkedin-launch");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::copy(sandbox.full_config(), app_dir.join("config.json")).unwrap();

        sandbox
            .cmd()
            .args(["validate", "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("valid (XDG config)"));
    }

    #[test]
    fn falls_back_to_process_env() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .env("LINKEDIN_CLIENT_ID", CLIENT_ID)
            .env("LINKEDIN_CLIENT_SECRET", CLIENT_SECRET)
            .env("LINKEDIN_ACCESS_TOKEN", ACCESS_TOKEN)
            .env("LINKEDIN_REFRESH_TOKEN", REFRESH_TOKEN)
            .args(["validate", "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("valid (process environment)"));
    }

    #[test]
    fn env_path_variable() {
        let sandbox = Sandbox::new();
        let path = sandbox.missing_token_config();
        sandbox
            .cmd()
            .env("LINKEDIN_LAUNCH_CONFIG", &path)
            .args(["validate", "--format", "summary"])
            .assert()
            .code(10)
            .stdout(predicate::str::contains("environment variable"));
    }
}

mod describe {
    use super::*;

    #[test]
    fn hides_values_by_default() {
        let sandbox = Sandbox::new();
        let output = sandbox
            .with_config(&sandbox.full_config())
            .arg("describe")
            .output()
            .unwrap();
        assert!(output.status.success());

        let json = stdout_json(&output);
        let descriptor = &json["descriptor"];
        assert_eq!(descriptor["command"], "python");
        assert_eq!(
            descriptor["args"],
            serde_json::json!(["-m", "uvicorn", "main:app", "--host", "0.0.0.0", "--port", "8000"])
        );
        assert_eq!(descriptor["env"]["LINKEDIN_ACCESS_TOKEN"], "[REDACTED]");
        assert_eq!(descriptor["env"].as_object().unwrap().len(), 4);

        let stdout = String::from_utf8_lossy(&output.stdout);
        for secret in [CLIENT_ID, CLIENT_SECRET, ACCESS_TOKEN, REFRESH_TOKEN] {
            assert!(!stdout.contains(secret), "leaked {secret}");
        }
    }

    #[test]
    fn reveal_env_shows_values() {
        let sandbox = Sandbox::new();
        let output = sandbox
            .with_config(&sandbox.full_config())
            .args(["describe", "--reveal-env"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json = stdout_json(&output);
        let env = &json["descriptor"]["env"];
        assert_eq!(env["LINKEDIN_CLIENT_ID"], CLIENT_ID);
        assert_eq!(env["LINKEDIN_CLIENT_SECRET"], CLIENT_SECRET);
        assert_eq!(env["LINKEDIN_ACCESS_TOKEN"], ACCESS_TOKEN);
        assert_eq!(env["LINKEDIN_REFRESH_TOKEN"], REFRESH_TOKEN);
    }

    #[test]
    fn missing_field_reports_error() {
        let sandbox = Sandbox::new();
        sandbox
            .with_config(&sandbox.missing_token_config())
            .arg("describe")
            .assert()
            .code(10)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Missing required field: linkedinAccessToken"));
    }

    #[test]
    fn jsonl_logs_do_not_leak_values() {
        let sandbox = Sandbox::new();
        let output = sandbox
            .with_config(&sandbox.full_config())
            .args(["-vv", "--log-format", "jsonl", "describe", "--reveal-env"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("descriptor.built"));
        for secret in [CLIENT_ID, CLIENT_SECRET, ACCESS_TOKEN, REFRESH_TOKEN] {
            assert!(!stderr.contains(secret), "log leaked {secret}");
        }
    }
}

#[cfg(unix)]
mod run {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Stand-in for `python`: reports what it was started with, echoes one
    /// line of stdin and exits 7.
    const FAKE_SERVER: &str = r#"#!/bin/sh
printf 'ARGS:%s\n' "$*"
printf 'ENV:%s|%s\n' "$LINKEDIN_CLIENT_SECRET" "$LINKEDIN_REFRESH_TOKEN"
IFS= read -r line
printf 'GOT:%s\n' "$line"
exit 7
"#;

    fn with_fake_python(sandbox: &Sandbox) -> Command {
        let bin = sandbox.dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python");
        std::fs::write(&python, FAKE_SERVER).unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut paths = vec![bin];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        let mut cmd = sandbox.with_config(&sandbox.full_config());
        cmd.env("PATH", std::env::join_paths(paths).unwrap());
        cmd
    }

    fn assert_server_saw_launch(stdout: &str) {
        assert!(
            stdout.contains("ARGS:-m uvicorn main:app --host 0.0.0.0 --port 8000"),
            "{stdout}"
        );
        assert!(stdout.contains(&format!("ENV:{CLIENT_SECRET}|{REFRESH_TOKEN}")));
        assert!(stdout.contains("GOT:hello"));
    }

    #[test]
    fn piped_relays_stdio_and_forwards_exit() {
        let sandbox = Sandbox::new();
        let output = with_fake_python(&sandbox)
            .args(["run", "--piped"])
            .write_stdin("hello\n")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(7));
        assert_server_saw_launch(&String::from_utf8_lossy(&output.stdout));
    }

    #[test]
    fn inherited_stdio_reaches_server() {
        let sandbox = Sandbox::new();
        let output = with_fake_python(&sandbox)
            .arg("run")
            .write_stdin("hello\n")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(7));
        assert_server_saw_launch(&String::from_utf8_lossy(&output.stdout));
    }

    #[test]
    fn logs_never_carry_launched_values() {
        let sandbox = Sandbox::new();
        let output = with_fake_python(&sandbox)
            .args(["-vv", "--log-format", "jsonl", "run", "--piped"])
            .write_stdin("hello\n")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(7));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("launch.spawned"));
        assert!(stderr.contains("launch.exited"));
        for secret in [CLIENT_ID, CLIENT_SECRET, ACCESS_TOKEN, REFRESH_TOKEN] {
            assert!(!stderr.contains(secret), "log leaked {secret}");
        }
    }

    #[test]
    fn human_logs_scrub_values() {
        let sandbox = Sandbox::new();
        let output = with_fake_python(&sandbox)
            .args(["-vv", "run", "--piped"])
            .write_stdin("hello\n")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(7));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("server started"));
        for secret in [CLIENT_ID, CLIENT_SECRET, ACCESS_TOKEN, REFRESH_TOKEN] {
            assert!(!stderr.contains(secret), "log leaked {secret}");
        }
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_config_file_exits_11() {
        let sandbox = Sandbox::new();
        sandbox
            .with_config(&sandbox.dir.path().join("absent.json"))
            .arg("validate")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("ERR_CONFIG_LOAD"));
    }

    #[test]
    fn non_string_value_exits_11() {
        let sandbox = Sandbox::new();
        let path = sandbox.write("bad.json", r#"{"linkedinClientId": 42}"#);
        sandbox
            .with_config(&path)
            .arg("validate")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("must be a string"));
    }

    #[test]
    fn unknown_command_exits_12() {
        Sandbox::new()
            .cmd()
            .arg("nonexistent-command")
            .assert()
            .code(12)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_format_exits_12() {
        Sandbox::new()
            .cmd()
            .args(["schema", "--format", "yaml"])
            .assert()
            .code(12);
    }

    #[test]
    fn run_refuses_incomplete_config() {
        let sandbox = Sandbox::new();
        sandbox
            .with_config(&sandbox.missing_token_config())
            .arg("run")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("linkedinAccessToken"));
    }

    #[test]
    fn help_exits_0() {
        Sandbox::new()
            .cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("describe"));
    }
}

#[test]
fn version_reports_package() {
    Sandbox::new()
        .cmd()
        .args(["version", "--format", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("linkedin-launch "));
}
