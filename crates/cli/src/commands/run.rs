//! Run command - fetch, compose, and store loop

use anyhow::{Context, Result, bail};
use news_digest_adapters::{
    atom_feed::AtomFeedSource,
    llm::ChatCompletionsGenerator,
    news_api::NewsApiSource,
    store::{InMemoryPostStore, JsonFilePostStore},
    unsplash::UnsplashPhotoSearch,
};
use news_digest_domain::{
    NewsSource, PhotoSearch, PostStore, RunOutcome, SystemClock, TextGenerator,
    usecases::{ComposeUseCase, DigestPipeline, ImageResolver, PipelineError},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::args::RunArgs;
use crate::config::AppConfig;
use crate::credentials::Credentials;

type Pipeline = DigestPipeline<dyn TextGenerator, dyn PhotoSearch, dyn PostStore, SystemClock>;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let credentials = Credentials::from_config(&config);

    tracing::info!(
        dry_run = args.dry_run,
        watch = args.watch,
        news_api = credentials.search.is_some(),
        llm = credentials.generative.is_some(),
        photos = credentials.photo.is_some(),
        "Starting news-digest run"
    );

    let pipeline = build_pipeline(&config, credentials, args.dry_run).await;

    if args.watch {
        // Continuous loop, first post right away
        let run_interval = Duration::from_secs(config.general.interval_secs.max(1));
        let mut ticker = interval(run_interval);

        // Set up graceful shutdown
        let shutdown = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
            tracing::info!("Shutdown signal received");
        };

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match pipeline.run_once().await {
                        Ok(outcome) => report(&outcome, args.print)?,
                        Err(e) => {
                            tracing::error!(error = %e, "Run failed");
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutting down gracefully");
                    break;
                }
            }
        }
    } else {
        match pipeline.run_once().await {
            Ok(outcome) => report(&outcome, args.print)?,
            Err(PipelineError::NoContentFound) => bail!("No news items found"),
            Err(e) => return Err(e).context("Failed to store post"),
        }
    }

    tracing::info!("news-digest run completed");
    Ok(())
}

async fn build_pipeline(config: &AppConfig, credentials: Credentials, dry_run: bool) -> Pipeline {
    let sources = build_sources(config, &credentials);

    let generator: Option<Arc<dyn TextGenerator>> = credentials.generative.map(|key| {
        Arc::new(ChatCompletionsGenerator::new(
            key,
            config.llm.base_url.clone(),
            config.llm.to_generator_config(),
        )) as Arc<dyn TextGenerator>
    });

    let photos: Option<Arc<dyn PhotoSearch>> = credentials.photo.map(|key| {
        Arc::new(UnsplashPhotoSearch::with_base_url(
            key,
            config.photos.base_url.clone(),
            config.photos.timeout_secs,
        )) as Arc<dyn PhotoSearch>
    });

    if generator.is_none() {
        tracing::info!("No LLM key configured, posts will use template content");
    }
    if photos.is_none() {
        tracing::info!("No photo search key configured, posts will use fallback images");
    }

    let composer = ComposeUseCase::new(
        generator,
        ImageResolver::new(photos),
        config.digest.to_compose_config(),
    );

    let file_store =
        JsonFilePostStore::new(&config.general.history_path, &config.general.latest_path);
    let store: Arc<dyn PostStore> = if dry_run {
        tracing::info!("Dry run, history and latest files are left untouched");
        Arc::new(InMemoryPostStore::with_history(file_store.load().await))
    } else {
        Arc::new(file_store)
    };

    DigestPipeline::new(sources, composer, store, Arc::new(SystemClock))
}

/// Sources in fetch order: structured search first, then the official feed
fn build_sources(config: &AppConfig, credentials: &Credentials) -> Vec<Arc<dyn NewsSource>> {
    let mut sources: Vec<Arc<dyn NewsSource>> = Vec::new();

    match &credentials.search {
        Some(key) => sources.push(Arc::new(NewsApiSource::new(
            key.clone(),
            config.news_api.to_source_config(),
        ))),
        None => tracing::info!(
            env = %config.news_api.api_key_env,
            "No news search key configured, skipping news_api source"
        ),
    }

    sources.push(Arc::new(AtomFeedSource::new(config.feed.to_source_config())));

    sources
}

fn report(outcome: &RunOutcome, print: bool) -> Result<()> {
    tracing::info!(
        post_id = %outcome.post.id,
        generation = ?outcome.generation,
        fetched = outcome.fetched,
        ranked = outcome.ranked,
        "Post ready"
    );

    if print {
        let json =
            serde_json::to_string_pretty(&outcome.post).context("Failed to serialize post")?;
        println!("{}", json);
    }

    Ok(())
}
