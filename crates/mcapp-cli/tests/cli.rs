//! End-to-end tests for the `mcapp` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An isolated config directory so the user's own config never leaks in.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn with_config(self, content: &str) -> Self {
        std::fs::write(self.config_path(), content).expect("Failed to write config");
        self
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("config.toml")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("mcapp").expect("Failed to find mcapp binary");
        cmd.env_remove("MCAPP_SERVER")
            .env_remove("MCAPP_TOKEN")
            .env_remove("MCAPP_PROJECT")
            .env_remove("MCAPP_CONFIG")
            .env("HOME", self.temp_dir.path());
        cmd
    }
}

#[test]
fn help_lists_subcommands() {
    TestFixture::new()
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("install")
                .and(predicate::str::contains("upgrade"))
                .and(predicate::str::contains("rollback"))
                .and(predicate::str::contains("list-templates"))
                .and(predicate::str::contains("show-app")),
        );
}

#[test]
fn rollback_requires_revision_or_flag() {
    TestFixture::new()
        .command()
        .args(["rollback", "cache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("REVISION"));
}

#[test]
fn delete_requires_an_app() {
    TestFixture::new()
        .command()
        .arg("delete")
        .assert()
        .failure();
}

#[test]
fn missing_server_is_a_configuration_error() {
    TestFixture::new()
        .command()
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn invalid_server_scheme_is_rejected() {
    let fixture = TestFixture::new().with_config("server_url = \"ftp://example.com\"\n");
    fixture
        .command()
        .arg("--config")
        .arg(fixture.config_path())
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http"));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiet_ls_prints_ids_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/multiclusterapps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "mcapp-1", "name": "cache"},
                {"id": "mcapp-2", "name": "web"}
            ]
        })))
        .mount(&server)
        .await;

    let fixture = TestFixture::new().with_config(&format!("server_url = \"{}\"\n", server.uri()));
    fixture
        .command()
        .arg("--config")
        .arg(fixture.config_path())
        .args(["ls", "--quiet"])
        .assert()
        .success()
        .stdout("mcapp-1\nmcapp-2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn show_template_renders_versions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "cattle-global-data:library-redis",
                "name": "redis",
                "catalogId": "cattle-global-data:library",
                "defaultVersion": "1.2.0",
                "versionLinks": {
                    "1.2.0": "https://x/v3/templateVersions/cattle-global-data:library-redis-1.2.0",
                    "1.10.0": "https://x/v3/templateVersions/cattle-global-data:library-redis-1.10.0"
                }
            }]
        })))
        .mount(&server)
        .await;

    let fixture = TestFixture::new();
    fixture
        .command()
        .args(["--server", &server.uri(), "show-template", "redis"])
        .assert()
        .success()
        .stdout("CURRENT  VERSION\n*        1.2.0\n         1.10.0\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_app_fails_with_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/multiclusterapps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/multiclusterapps/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "error",
            "status": 404,
            "message": "not found"
        })))
        .mount(&server)
        .await;

    TestFixture::new()
        .command()
        .args(["--server", &server.uri(), "delete", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}
