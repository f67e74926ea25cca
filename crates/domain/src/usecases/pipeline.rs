//! Pipeline use case - orchestrates fetching, aggregation, composition and storage

use std::sync::Arc;

use crate::{
    model::{NewsItem, RunOutcome},
    ports::{Clock, NewsSource, PhotoSearch, PostStore, StoreError, TextGenerator},
    usecases::{aggregate::aggregate, compose::ComposeUseCase},
};

/// Digest pipeline, one post per successful run
pub struct DigestPipeline<G, P, St, Cl>
where
    G: TextGenerator + ?Sized,
    P: PhotoSearch + ?Sized,
    St: PostStore + ?Sized,
    Cl: Clock + ?Sized,
{
    sources: Vec<Arc<dyn NewsSource>>,
    composer: ComposeUseCase<G, P>,
    store: Arc<St>,
    clock: Arc<Cl>,
}

impl<G, P, St, Cl> DigestPipeline<G, P, St, Cl>
where
    G: TextGenerator + ?Sized,
    P: PhotoSearch + ?Sized,
    St: PostStore + ?Sized,
    Cl: Clock + ?Sized,
{
    /// Sources are fetched in the order given here
    pub fn new(
        sources: Vec<Arc<dyn NewsSource>>,
        composer: ComposeUseCase<G, P>,
        store: Arc<St>,
        clock: Arc<Cl>,
    ) -> Self {
        Self {
            sources,
            composer,
            store,
            clock,
        }
    }

    /// Run the pipeline once
    pub async fn run_once(&self) -> Result<RunOutcome, PipelineError> {
        let fetched = self.fetch_all().await;
        let fetched_count = fetched.len();

        let ranked = aggregate(fetched);
        if ranked.is_empty() {
            tracing::warn!("No news items found, nothing to publish");
            return Err(PipelineError::NoContentFound);
        }

        tracing::info!(
            fetched = fetched_count,
            ranked = ranked.len(),
            "Ranked news items"
        );

        let (post, generation) = self.composer.compose(&ranked, self.clock.now()).await;

        self.store.insert(&post).await?;

        tracing::info!(post_id = %post.id, title = %post.title, "Stored post");

        Ok(RunOutcome {
            ranked: post.sources.len(),
            post,
            generation,
            fetched: fetched_count,
        })
    }

    /// Fetch every source in order; a failing source contributes nothing
    async fn fetch_all(&self) -> Vec<NewsItem> {
        let mut items = Vec::new();

        for source in &self.sources {
            match source.fetch().await {
                Ok(batch) => {
                    tracing::info!(source = %source.name(), count = batch.len(), "Fetched items");
                    items.extend(batch);
                }
                Err(e) => {
                    tracing::warn!(source = %source.name(), error = %e, "Source unavailable");
                    // Continue with other sources
                }
            }
        }

        items
    }
}

/// Errors from a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No news items found")]
    NoContentFound,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
