//! End-to-end tests for config construction, validation and check resolution

mod common;

use common::{testdata, FakeGateway};
use composite_core::coordination::CheckWaiter;
use composite_core::{
    Check, CheckConclusion, CheckRun, CheckStatus, Config, Error, ErrorKind,
};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

const TOKEN: &str = "561427eed114801b0f69b28593c0ce4ab193d038";
const CHECKS_YAML: &str = "- job: court\n  paths:\n  - spotlight/**\n  - docs/**\n";

fn base_inputs(event_path: &str) -> HashMap<String, String> {
    [
        ("INPUT_GITHUB-TOKEN", TOKEN),
        ("INPUT_TIMEOUT", "30m"),
        ("INPUT_INTERVAL", "30s"),
        ("INPUT_CHECKS-YAML", "- paths: []\n"),
        ("GITHUB_EVENT_PATH", event_path),
        ("GITHUB_REPOSITORY", "mess/clean"),
        ("GITHUB_EVENT_NAME", "pull_request"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn test_invalid_timeout_names_input_and_value() {
    let inputs = HashMap::from([("INPUT_TIMEOUT", "y")]);
    let err = Config::from_inputs(&inputs).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);

    let source = humantime_message("y");
    assert_eq!(
        err.to_string(),
        format!("Invalid input; Input: \"timeout\", Value: \"y\"\n{source}")
    );
}

#[test]
fn test_invalid_interval_names_input_and_value() {
    let inputs = HashMap::from([("INPUT_TIMEOUT", "30m"), ("INPUT_INTERVAL", "z")]);
    let err = Config::from_inputs(&inputs).unwrap_err();

    let source = humantime_message("z");
    assert_eq!(
        err.to_string(),
        format!("Invalid input; Input: \"interval\", Value: \"z\"\n{source}")
    );
}

#[test]
fn test_invalid_event_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{").unwrap();
    let event_path = file.path().to_str().unwrap().to_string();

    let err = Config::from_inputs(&base_inputs(&event_path)).unwrap_err();
    assert!(matches!(err, Error::EventParse { .. }));
    assert!(
        err.to_string().starts_with(&format!(
            "Failed to parse GitHub Event file as JSON; Path: {event_path}\n"
        )),
        "{err}"
    );
}

#[test]
fn test_invalid_repository() {
    let mut inputs = base_inputs(&testdata("event.json"));
    inputs.insert("GITHUB_REPOSITORY".to_string(), String::new());

    let err = Config::from_inputs(&inputs).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Unexpected GitHub repository format; Repository: """#
    );
}

#[test]
fn test_event_file_checked_before_repository() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"not json").unwrap();
    let event_path = file.path().to_str().unwrap().to_string();

    let mut inputs = base_inputs(&event_path);
    inputs.insert("GITHUB_REPOSITORY".to_string(), "no-slash".to_string());

    let err = Config::from_inputs(&inputs).unwrap_err();
    assert!(matches!(err, Error::EventParse { .. }), "{err}");
}

#[tokio::test]
async fn test_happy_path() {
    let mut inputs = base_inputs(&testdata("event.json"));
    inputs.insert("INPUT_TIMEOUT".to_string(), "31m".to_string());
    inputs.insert("INPUT_INTERVAL".to_string(), "37s".to_string());
    inputs.insert("INPUT_CHECKS-YAML".to_string(), CHECKS_YAML.to_string());
    inputs.insert(
        "GITHUB_API_URL".to_string(),
        "https://ghe.k8s.invalid/api/v3".to_string(),
    );

    let config = Config::from_inputs(&inputs).unwrap();
    let expected = Config {
        github_token: TOKEN.to_string(),
        timeout: Duration::from_secs(31 * 60),
        interval: Duration::from_secs(37),
        checks_yaml: "- job: court\n  paths:\n  - spotlight/**\n  - docs/**".to_string(),
        checks_filename: String::new(),
        github_root_url: "https://ghe.k8s.invalid/api/v3".to_string(),
        event_name: "pull_request".to_string(),
        event_action: "opened".to_string(),
        github_org: "mess".to_string(),
        github_repo: "clean".to_string(),
        base_sha: "ef3237727fcb36295e462cd2c2b71e38d48fd772".to_string(),
        head_sha: "fb8bcd85860b706ad2d5a776775b4ad9bbf2520f".to_string(),
    };
    assert_eq!(config, expected);
    assert!(config.validate().is_ok());

    let gateway = FakeGateway::default();
    let checks = config
        .get_checks(&CancellationToken::new(), &gateway)
        .await
        .unwrap();
    assert_eq!(
        checks,
        vec![Check {
            job: "court".to_string(),
            paths: vec!["spotlight/**".to_string(), "docs/**".to_string()],
        }]
    );
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_invalid_inline_yaml() {
    let config = Config {
        checks_yaml: "- paths: 'abc''".to_string(),
        ..Default::default()
    };
    let gateway = FakeGateway::default();

    let err = config
        .get_checks(&CancellationToken::new(), &gateway)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Declaration);
    assert!(
        err.to_string().starts_with("Failed to parse checks file as YAML\n"),
        "{err}"
    );
    assert_eq!(gateway.calls(), 0);
}

fn remote_config() -> Config {
    Config {
        checks_filename: ".github/not-exist.yml".to_string(),
        github_org: "fish".to_string(),
        github_repo: "bowl".to_string(),
        head_sha: "c37f875d7a90cabf793847a1a20d980b56febc16".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_remote_file_not_found() {
    let gateway = FakeGateway::default();
    let err = remote_config()
        .get_checks(&CancellationToken::new(), &gateway)
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(404));
    assert_eq!(
        err.to_string(),
        "Failed to download file; Repository: fish/bowl, Ref: c37f875d7a90cabf793847a1a20d980b56febc16, Path: .github/not-exist.yml\n\
         GET https://ghe.k8s.invalid/api/v3/repos/fish/bowl/contents/.github/not-exist.yml?ref=c37f875d7a90cabf793847a1a20d980b56febc16: 404 Not Found"
    );
}

#[tokio::test]
async fn test_remote_file_parsed() {
    let gateway = FakeGateway {
        contents: Some(b"- job: court\n  paths: [docs/**]\n- job: field\n".to_vec()),
        ..Default::default()
    };
    let checks = remote_config()
        .get_checks(&CancellationToken::new(), &gateway)
        .await
        .unwrap();

    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0].paths, vec!["docs/**".to_string()]);
    assert!(checks[1].paths.is_empty());
}

#[tokio::test]
async fn test_remote_file_malformed() {
    let gateway = FakeGateway {
        contents: Some(b"- job: [unclosed\n".to_vec()),
        ..Default::default()
    };
    let err = remote_config()
        .get_checks(&CancellationToken::new(), &gateway)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ChecksYaml(_)));
}

#[tokio::test]
async fn test_remote_fetch_cancelled() {
    let gateway = FakeGateway {
        hang: true,
        ..Default::default()
    };
    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        })
    };

    let err = remote_config().get_checks(&cancel, &gateway).await.unwrap_err();
    canceller.await.unwrap();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.to_string(), "Operation cancelled");
}

#[tokio::test]
async fn test_resolve_decides_from_changed_files() {
    let mut inputs = base_inputs(&testdata("event.json"));
    inputs.insert(
        "INPUT_CHECKS-YAML".to_string(),
        "- job: court\n  paths: [spotlight/**]\n- job: field\n  paths: [grass/**]\n".to_string(),
    );
    let config = Config::from_inputs(&inputs).unwrap();
    config.validate().unwrap();

    let gateway = FakeGateway {
        changed: vec![composite_core::ChangedFile::modified("spotlight/lamp.go")],
        ..Default::default()
    };
    let resolution = composite_core::resolve(&config, &CancellationToken::new(), &gateway)
        .await
        .unwrap();

    assert_eq!(resolution.checks.len(), 2);
    assert_eq!(resolution.decision.required_jobs(), vec!["court"]);
    assert_eq!(resolution.decision.skipped_jobs(), vec!["field"]);
}

#[tokio::test]
async fn test_huge_timeout_input_waits_for_checks() {
    let mut inputs = base_inputs(&testdata("event.json"));
    inputs.insert("INPUT_TIMEOUT".to_string(), "500000000000years".to_string());
    let config = Config::from_inputs(&inputs).unwrap();
    config.validate().unwrap();

    let gateway = FakeGateway {
        runs: vec![CheckRun {
            id: 1,
            name: "court".to_string(),
            status: CheckStatus::Completed,
            conclusion: Some(CheckConclusion::Success),
        }],
        ..Default::default()
    };
    let outcome = CheckWaiter::new(&gateway, &config)
        .wait(&CancellationToken::new(), &["court"])
        .await
        .unwrap();
    assert!(outcome.is_success());
}

fn humantime_message(value: &str) -> String {
    // Local parse mirrors what the builder wraps
    match value.parse::<humantime::Duration>() {
        Ok(_) => panic!("{value} unexpectedly parsed"),
        Err(e) => e.to_string(),
    }
}
