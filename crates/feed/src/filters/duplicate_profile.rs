//! Filter to drop repeated profiles from a candidate listing.

use std::collections::HashSet;

use anyhow::Result;
use model::UserSummary;

use crate::context::FeedContext;
use crate::traits::ProfileFilter;

/// Keeps the first occurrence of each user id, in order.
pub struct DuplicateProfileFilter;

impl ProfileFilter for DuplicateProfileFilter {
    fn name(&self) -> &str {
        "DuplicateProfileFilter"
    }

    fn apply(
        &self,
        profiles: Vec<UserSummary>,
        _context: &FeedContext,
    ) -> Result<Vec<UserSummary>> {
        let mut seen = HashSet::with_capacity(profiles.len());
        Ok(profiles
            .into_iter()
            .filter(|profile| seen.insert(profile.id))
            .collect())
    }
}
