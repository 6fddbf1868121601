//! Core trait for the profile filtering pipeline.
//!
//! This module defines the ProfileFilter trait that allows composable,
//! extensible filters to be applied to a freshly fetched candidate list.

use anyhow::Result;
use model::UserSummary;

use crate::context::FeedContext;

/// Core trait for filtering candidate profiles.
///
/// ## Design Note
/// - `Send + Sync` so the pipeline can be shared by the loader across tasks
/// - Filters take ownership of the Vec and return the survivors
/// - Filters must keep the relative order of the profiles they keep; the
///   feed shows candidates in backend order
pub trait ProfileFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of profiles.
    ///
    /// # Arguments
    /// * `profiles` - The profiles to filter (takes ownership)
    /// * `context` - The acting user and their existing matches
    fn apply(&self, profiles: Vec<UserSummary>, context: &FeedContext)
        -> Result<Vec<UserSummary>>;
}
