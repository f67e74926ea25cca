use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>IRCC news</title>
  <id>urn:ircc:news</id>
  <updated>2024-01-16T12:00:00Z</updated>
  <entry>
    <title>Express Entry - new category-based draws announced</title>
    <link href="https://www.canada.ca/en/news/express-entry.html"/>
    <id>urn:ircc:1</id>
    <published>2024-01-16T10:00:00Z</published>
    <updated>2024-01-16T10:00:00Z</updated>
    <summary>Invitations will target healthcare occupations.</summary>
  </entry>
  <entry>
    <title>Study permit cap for 2024</title>
    <link href="https://www.canada.ca/en/news/study-permits.html"/>
    <id>urn:ircc:2</id>
    <published>2024-01-15T10:00:00Z</published>
    <updated>2024-01-15T10:00:00Z</updated>
  </entry>
</feed>"#;

/// Command isolated from the caller's config file and API keys
fn isolated_cmd(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("news-digest");
    cmd.current_dir(dir.path())
        .env_remove("NEWSAPI_KEY")
        .env_remove("DEEPSEEK_API_KEY")
        .env_remove("UNSPLASH_ACCESS_KEY")
        .env(
            "NEWS_DIGEST__GENERAL__HISTORY_PATH",
            dir.path().join("blog_posts.json"),
        )
        .env(
            "NEWS_DIGEST__GENERAL__LATEST_PATH",
            dir.path().join("latest_post.json"),
        );
    cmd
}

fn history_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("blog_posts.json")
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("read json file");
    serde_json::from_str(&content).expect("valid json")
}

async fn feed_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/atom+xml")
                .set_body_string(FEED),
        )
        .mount(&server)
        .await;
    server
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("news-digest");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[news_api]"));
    assert!(content.contains("interval_secs = 604800"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# mine\n").expect("write config");

    let mut cmd = cargo_bin_cmd!("news-digest");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
}

#[test]
fn config_show_applies_env_overrides() {
    let dir = TempDir::new().expect("temp dir");

    isolated_cmd(&dir)
        .env("NEWS_DIGEST__DIGEST__AUTHOR", "Test Team")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"author = "Test Team""#))
        .stdout(predicate::str::contains("deepseek-chat"));
}

#[test]
fn doctor_json_reports_missing_credentials() {
    let dir = TempDir::new().expect("temp dir");

    let output = isolated_cmd(&dir)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["config"]["status"], "ok");
    assert_eq!(report["history"]["status"], "ok");
    assert_eq!(report["news_api"]["status"], "warn");
    assert_eq!(report["llm"]["status"], "warn");
    assert_eq!(report["photos"]["status"], "warn");
    assert_eq!(report["overall"], "warn");
}

#[test]
fn doctor_flags_corrupt_history() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(history_path(&dir), "not json").expect("write history");

    let output = isolated_cmd(&dir)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["history"]["status"], "warn");
}

#[test]
fn run_without_news_fails_and_stores_nothing() {
    let dir = TempDir::new().expect("temp dir");

    isolated_cmd(&dir)
        .env("NEWS_DIGEST__FEED__URL", "http://127.0.0.1:9/feed")
        .env("NEWS_DIGEST__FEED__TIMEOUT_SECS", "2")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No news items found"));

    assert!(!history_path(&dir).exists());
    assert!(!dir.path().join("latest_post.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_stores_template_post_from_feed() {
    let server = feed_server().await;
    let dir = TempDir::new().expect("temp dir");

    isolated_cmd(&dir)
        .env("NEWS_DIGEST__FEED__URL", format!("{}/feed", server.uri()))
        .arg("run")
        .assert()
        .success();

    let history = read_json(&history_path(&dir));
    let posts = history.as_array().expect("history is an array");
    assert_eq!(posts.len(), 1);

    let latest = read_json(&dir.path().join("latest_post.json"));
    assert_eq!(latest, posts[0]);

    let sources = latest["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["source"], "IRCC Official");
    assert_eq!(
        sources[0]["url"],
        "https://www.canada.ca/en/news/express-entry.html"
    );
    assert_eq!(latest["images"].as_array().unwrap().len(), 2);
    assert_eq!(latest["author"], "The Culye Team");

    let content = latest["content"].as_str().unwrap();
    assert!(content.contains("**Update 1: Express Entry - new category-based draws announced**"));
    assert!(content.contains("Click the source link for full details."));
}

#[tokio::test(flavor = "multi_thread")]
async fn dry_run_prints_post_without_writing() {
    let server = feed_server().await;
    let dir = TempDir::new().expect("temp dir");

    let output = isolated_cmd(&dir)
        .env("NEWS_DIGEST__FEED__URL", format!("{}/feed", server.uri()))
        .args(["run", "--dry-run", "--print"])
        .output()
        .expect("run dry-run");

    assert!(output.status.success());

    let post: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert!(
        post["title"]
            .as_str()
            .unwrap()
            .starts_with("Canadian Immigration Weekly Update - ")
    );
    assert_eq!(post["sources"].as_array().unwrap().len(), 2);
    assert_eq!(post["id"].as_str().unwrap().len(), 8);

    assert!(!history_path(&dir).exists());
    assert!(!dir.path().join("latest_post.json").exists());
}
