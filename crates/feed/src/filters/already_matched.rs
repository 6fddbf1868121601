//! Filter to remove users the acting user is already matched with.
//!
//! After a match the feed reloads from scratch; this filter is what keeps
//! the new match from showing up again.

use anyhow::Result;
use model::UserSummary;

use crate::context::FeedContext;
use crate::traits::ProfileFilter;

/// Removes profiles found in `FeedContext::matched_users`.
///
/// ## Algorithm
/// Uses the HashSet in the context for O(1) lookups.
pub struct AlreadyMatchedFilter;

impl ProfileFilter for AlreadyMatchedFilter {
    fn name(&self) -> &str {
        "AlreadyMatchedFilter"
    }

    fn apply(
        &self,
        profiles: Vec<UserSummary>,
        context: &FeedContext,
    ) -> Result<Vec<UserSummary>> {
        Ok(profiles
            .into_iter()
            .filter(|profile| !context.is_matched(profile.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_matched_filter() {
        let mut context = FeedContext::new(1);
        context.matched_users.insert(100);
        context.matched_users.insert(200);

        let profiles = vec![
            UserSummary::new(100, "a"),
            UserSummary::new(101, "b"),
            UserSummary::new(200, "c"),
            UserSummary::new(300, "d"),
        ];

        let filtered = AlreadyMatchedFilter.apply(profiles, &context).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, 101);
        assert_eq!(filtered[1].id, 300);
    }
}
