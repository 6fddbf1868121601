//! # Feed Loader
//!
//! Produces one batch of candidates for the acting user:
//! 1. Fetch the candidate listing and the user's matches (in parallel)
//! 2. Build the feed context
//! 3. Apply filters
//! 4. Enrich the survivors with memes, like counts and comments
//!
//! Only steps 1 and 3 can fail the load. Enrichment degrades per item.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use api_client::SharedBackend;
use model::{Candidate, Session};

use crate::context::FeedContext;
use crate::enrich::enrich_all;
use crate::filter_pipeline::FilterPipeline;

/// Loads candidate batches from a backend.
///
/// Cheap to clone; the driver hands a clone to every load task.
#[derive(Clone)]
pub struct FeedLoader {
    backend: SharedBackend,
    session: Session,
    filter_pipeline: Arc<FilterPipeline>,
}

impl FeedLoader {
    /// Create a loader running the standard filter pipeline.
    ///
    /// # Arguments
    /// * `backend` - Where candidates, matches and memes come from
    /// * `session` - The acting user
    pub fn new(backend: SharedBackend, session: Session) -> Self {
        Self {
            backend,
            session,
            filter_pipeline: Arc::new(FilterPipeline::standard()),
        }
    }

    /// Replace the filter pipeline
    pub fn with_pipeline(mut self, pipeline: FilterPipeline) -> Self {
        self.filter_pipeline = Arc::new(pipeline);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Load one batch of candidates, in backend order.
    pub async fn load(&self) -> Result<Vec<Candidate>> {
        let start_time = Instant::now();

        let (profiles, matches) = tokio::join!(
            self.backend.fetch_candidates(&self.session),
            self.backend.fetch_matches(&self.session)
        );
        let profiles = profiles.context("Failed to fetch candidates")?;
        let matches = matches.context("Failed to fetch matches")?;
        info!(
            "Fetched {} profiles and {} matches for user {}",
            profiles.len(),
            matches.len(),
            self.session.user_id
        );

        let context = FeedContext::from_matches(&self.session, &matches);
        let visible = self
            .filter_pipeline
            .apply(profiles, &context)
            .context("Failed to apply filters")?;

        let candidates = enrich_all(self.backend.as_ref(), visible).await;

        info!(
            "Loaded {} candidates for user {} in {:.2?}",
            candidates.len(),
            self.session.user_id,
            start_time.elapsed()
        );
        Ok(candidates)
    }
}
