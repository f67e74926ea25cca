//! Doctor command - validate configuration and show status

use anyhow::Result;
use news_digest_adapters::store::JsonFilePostStore;
use news_digest_domain::StoreError;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;
use crate::credentials::load_optional_key;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    history: CheckResult,
    news_api: CheckResult,
    feed: CheckResult,
    llm: CheckResult,
    photos: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        history: CheckResult::error("Not checked"),
        news_api: CheckResult::error("Not checked"),
        feed: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        photos: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.history = check_history(config).await;

        report.news_api = check_credential(
            &config.news_api.api_key_env,
            "news_api source skipped",
            format!("query: {}", config.news_api.query),
        );

        report.feed = check_feed(config);

        report.llm = check_credential(
            &config.llm.api_key_env,
            "template content will be used",
            format!("model: {}", config.llm.model),
        );

        report.photos = check_credential(
            &config.photos.api_key_env,
            "fallback images will be used",
            format!("base_url: {}", config.photos.base_url),
        );
    }

    // Determine overall status
    let checks = [
        &report.config,
        &report.history,
        &report.news_api,
        &report.feed,
        &report.llm,
        &report.photos,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_history(config: &AppConfig) -> CheckResult {
    let store = JsonFilePostStore::new(&config.general.history_path, &config.general.latest_path);
    let details = serde_json::json!({
        "history_path": store.history_path().display().to_string(),
        "latest_path": store.latest_path().display().to_string(),
    });

    match store.read_history().await {
        Ok(posts) => CheckResult::ok(format!(
            "{} posts in {}",
            posts.len(),
            store.history_path().display()
        ))
        .with_details(details),
        Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::ok(
            format!(
                "No history yet, first run creates {}",
                store.history_path().display()
            ),
        )
        .with_details(details),
        Err(e) => CheckResult::warn(format!(
            "History unreadable ({}), next run starts a new one",
            e
        ))
        .with_details(details),
    }
}

fn check_feed(config: &AppConfig) -> CheckResult {
    let url = config.feed.url.trim();
    if url.is_empty() {
        return CheckResult::error("Feed url is empty");
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return CheckResult::error(format!("Feed url is not http(s): {}", url));
    }

    CheckResult::ok(format!("{} ({})", url, config.feed.source_name))
}

/// Report whether an optional key is set (without revealing the value)
fn check_credential(env_var: &str, degraded: &str, context: String) -> CheckResult {
    if env_var.trim().is_empty() {
        return CheckResult::warn(format!("No env var configured, {}", degraded));
    }

    match load_optional_key(env_var) {
        Some(_) => CheckResult::ok(format!("{} (set), {}", env_var, context)),
        None => CheckResult::warn(format!("{} (not set), {}", env_var, degraded)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("news-digest Doctor Report");
    println!("=========================");
    println!();

    print_check("Config", &report.config);
    print_check("History", &report.history);
    print_check("News API", &report.news_api);
    print_check("Feed", &report.feed);
    print_check("LLM", &report.llm);
    print_check("Photos", &report.photos);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall != "error" {
        println!();
        println!("Ready to run! Try: news-digest run --dry-run --print");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
