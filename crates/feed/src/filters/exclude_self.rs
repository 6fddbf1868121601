//! Filter to remove the acting user from their own feed.
//!
//! The candidate listing is the plain user directory, which includes the
//! caller.

use anyhow::Result;
use model::UserSummary;

use crate::context::FeedContext;
use crate::traits::ProfileFilter;

/// Removes the acting user's own profile.
pub struct ExcludeSelfFilter;

impl ProfileFilter for ExcludeSelfFilter {
    fn name(&self) -> &str {
        "ExcludeSelfFilter"
    }

    fn apply(
        &self,
        profiles: Vec<UserSummary>,
        context: &FeedContext,
    ) -> Result<Vec<UserSummary>> {
        Ok(profiles
            .into_iter()
            .filter(|profile| profile.id != context.user_id)
            .collect())
    }
}
