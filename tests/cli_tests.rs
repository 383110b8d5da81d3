mod common;

use common::{danb_cmd, write_endpoint_config, write_file, FASTA_12CA};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_download_fasta_to_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fasta/entry/12ca"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FASTA_12CA))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_endpoint_config(home.path(), &server.uri()).unwrap();
    let output = home.path().join("out.fasta");

    danb_cmd(&home)
        .arg("fasta")
        .arg("12ca")
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Downloaded:"))
        .stdout(predicate::str::contains("out.fasta"));

    assert_eq!(fs::read_to_string(&output).unwrap(), FASTA_12CA);
}

#[tokio::test]
async fn test_default_output_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/AF-P69905-F1-model_v4.pdb"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ATOM\n"))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_endpoint_config(home.path(), &server.uri()).unwrap();

    danb_cmd(&home)
        .args(["pdb", "P69905", "--no-progress", "--config"])
        .arg(&config)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(home.path().join("P69905.pdb")).unwrap(),
        "ATOM\n"
    );
}

#[tokio::test]
async fn test_config_from_danb_home() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/4hhb.cif"))
        .respond_with(ResponseTemplate::new(200).set_body_string("data_4HHB\n"))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_endpoint_config(home.path(), &server.uri()).unwrap();

    danb_cmd(&home)
        .args(["cif", "4HHB", "-o", "hb.cif", "--no-progress"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(home.path().join("hb.cif")).unwrap(), "data_4HHB\n");
}

#[tokio::test]
async fn test_http_error_exits_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_endpoint_config(home.path(), &server.uri()).unwrap();

    danb_cmd(&home)
        .args(["pdb", "0xyz", "-o", "missing.pdb", "--no-progress", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("404"));

    assert!(!home.path().join("missing.pdb").exists());
}

#[test]
fn test_unreachable_host_exits_one() {
    let home = TempDir::new().unwrap();
    let config = write_endpoint_config(home.path(), "http://127.0.0.1:1").unwrap();

    danb_cmd(&home)
        .args(["fasta", "12ca", "--no-progress", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(!home.path().join("12ca.fasta").exists());
}

#[test]
fn test_invalid_config_exits_two() {
    let home = TempDir::new().unwrap();
    let config = write_file(home.path(), "bad.yaml", "download:\n  mirror: somewhere\n").unwrap();

    danb_cmd(&home)
        .args(["fasta", "12ca", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_unknown_format_is_usage_error() {
    let home = TempDir::new().unwrap();

    danb_cmd(&home)
        .args(["xml", "12ca"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
