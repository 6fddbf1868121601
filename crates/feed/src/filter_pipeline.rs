//! The FilterPipeline chains profile filters.

use anyhow::Result;
use model::UserSummary;
use tracing;

use crate::context::FeedContext;
use crate::filters::{AlreadyMatchedFilter, DuplicateProfileFilter, ExcludeSelfFilter};
use crate::traits::ProfileFilter;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(ExcludeSelfFilter)
///     .add_filter(AlreadyMatchedFilter);
///
/// let visible = pipeline.apply(profiles, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn ProfileFilter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The pipeline every feed load runs: drop the acting user, drop users
    /// already matched with them, then drop repeated profiles.
    pub fn standard() -> Self {
        Self::new()
            .add_filter(ExcludeSelfFilter)
            .add_filter(AlreadyMatchedFilter)
            .add_filter(DuplicateProfileFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl ProfileFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the profiles.
    pub fn apply(
        &self,
        profiles: Vec<UserSummary>,
        context: &FeedContext,
    ) -> Result<Vec<UserSummary>> {
        let mut current = profiles;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
