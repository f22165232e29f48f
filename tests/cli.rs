use assert_cmd::Command;
use predicates::str::contains;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EDGERC: &str = "[default]
host = example.akamaiapis.net
client_token = akab-client-token
client_secret = client-secret
access_token = akab-access-token
";

struct TestEnv {
    _tmp: TempDir,
    home: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self { _tmp: tmp, home }
    }

    fn with_edgerc(self) -> Self {
        fs::write(self.home.join(".edgerc"), EDGERC).expect("write edgerc");
        self
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.join(name);
        fs::write(&path, content).expect("write file");
        path
    }

    fn args_file(&self, args: Value) -> PathBuf {
        self.write("args.json", &args.to_string())
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("akamai").expect("binary built");
        cmd.env("HOME", &self.home).env_remove("AKAMAI_EDGERC").env_remove("RUST_LOG");
        cmd
    }
}

fn failed_result(output: &[u8]) -> Value {
    let result: Value = serde_json::from_slice(output).expect("stdout is one JSON object");
    assert_eq!(result["failed"], json!(true), "{}", result);
    assert_eq!(result["changed"], json!(false), "{}", result);
    result
}

fn msg(result: &Value) -> &str {
    result["msg"].as_str().expect("msg is a string")
}

#[test]
fn unsupported_method_fails_explicitly() {
    let env = TestEnv::new().with_edgerc();
    let args = env.args_file(json!({
        "endpoint": "/papi/v1/properties/prp_1",
        "method": "DELETE",
    }));

    let output = env.cmd().arg(&args).assert().code(1).get_output().stdout.clone();
    let result = failed_result(&output);
    assert!(msg(&result).contains("unsupported method 'DELETE'"), "{}", result);
}

#[test]
fn missing_required_arguments() {
    let env = TestEnv::new().with_edgerc();
    let args = env.args_file(json!({"section": "default"}));

    env.cmd()
        .arg(&args)
        .assert()
        .code(1)
        .stdout(contains("missing required arguments: endpoint, method"));
}

#[test]
fn default_edgerc_expands_to_home() {
    let env = TestEnv::new();
    let args = env.args_file(json!({"endpoint": "/papi/v1/groups", "method": "GET"}));

    let output = env.cmd().arg(&args).assert().code(1).get_output().stdout.clone();
    let result = failed_result(&output);
    let expected = Path::new(&env.home).join(".edgerc");
    assert!(
        msg(&result).contains(expected.to_str().unwrap()),
        "{}",
        result
    );
}

#[test]
fn missing_section_lists_available_sections() {
    let env = TestEnv::new().with_edgerc();
    let args = env.args_file(json!({
        "endpoint": "/papi/v1/groups",
        "method": "GET",
        "section": "papi",
    }));

    env.cmd()
        .arg(&args)
        .assert()
        .code(1)
        .stdout(contains("Section 'papi' not found"))
        .stdout(contains("available: default"));
}

#[test]
fn invalid_body_file_fails_before_any_request() {
    let env = TestEnv::new().with_edgerc();
    let body = env.write("rule.json", "{ \"rules\": ");
    let args = env.args_file(json!({
        "endpoint": "/papi/v1/properties/prp_1/versions/1/rules",
        "method": "PUT",
        "body": body,
    }));

    env.cmd()
        .arg(&args)
        .assert()
        .code(1)
        .stdout(contains("is not valid JSON"));
}

#[test]
fn flags_override_args_file() {
    let env = TestEnv::new().with_edgerc();
    let args = env.args_file(json!({"endpoint": "/papi/v1/groups", "method": "GET"}));

    env.cmd()
        .arg(&args)
        .args(["--method", "DELETE"])
        .assert()
        .code(1)
        .stdout(contains("unsupported method 'DELETE'"));
}

#[test]
fn flags_alone_without_args_file() {
    let env = TestEnv::new();
    let edgerc = env.write("custom-edgerc", "[default]\nhost = example.akamaiapis.net\n");

    env.cmd()
        .args(["--endpoint", "/papi/v1/groups", "--method", "GET"])
        .arg("--edge-config")
        .arg(&edgerc)
        .assert()
        .code(1)
        .stdout(contains("'client_token' not found in section 'default'"));
}

#[test]
fn unreadable_args_file() {
    let env = TestEnv::new();
    env.cmd()
        .arg(env.home.join("missing-args.json"))
        .assert()
        .code(1)
        .stdout(contains("Could not read module args"));
}

#[test]
fn unknown_flag_reports_failed_json() {
    let env = TestEnv::new();
    let output = env
        .cmd()
        .arg("--bogus")
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let result = failed_result(&output);
    assert!(msg(&result).contains("Invalid arguments"), "{}", result);
    assert!(msg(&result).contains("--bogus"), "{}", result);
}

#[test]
fn help_still_prints_usage() {
    let env = TestEnv::new();
    env.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--edge-config"));
}
