//! Per-load context for candidate filtering.
//!
//! Gathered once per feed load so filters can do O(1) lookups instead of
//! asking the backend again.

use std::collections::HashSet;

use model::{Match, Session, UserId};

/// What the filters need to know about the acting user
#[derive(Debug, Clone, Default)]
pub struct FeedContext {
    pub user_id: UserId,
    /// Everyone the acting user is already matched with
    pub matched_users: HashSet<UserId>,
}

impl FeedContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            matched_users: HashSet::new(),
        }
    }

    /// Build the context from the acting user's match list.
    ///
    /// Matches that do not involve the acting user are ignored.
    pub fn from_matches(session: &Session, matches: &[Match]) -> Self {
        let matched_users = matches
            .iter()
            .filter_map(|m| m.counterpart(session.user_id))
            .map(|u| u.id)
            .collect();
        Self {
            user_id: session.user_id,
            matched_users,
        }
    }

    pub fn is_matched(&self, user: UserId) -> bool {
        self.matched_users.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::UserSummary;

    fn record(id: u64, a: UserId, b: UserId) -> Match {
        Match {
            id,
            user1: UserSummary::new(a, format!("user{}", a)),
            user2: UserSummary::new(b, format!("user{}", b)),
        }
    }

    #[test]
    fn test_from_matches_collects_counterparts() {
        let session = Session::new(1, "You");
        let matches = vec![record(1, 1, 4), record(2, 7, 1)];

        let context = FeedContext::from_matches(&session, &matches);

        assert_eq!(context.user_id, 1);
        assert!(context.is_matched(4));
        assert!(context.is_matched(7));
        assert!(!context.is_matched(1));
    }

    #[test]
    fn test_foreign_matches_ignored() {
        let session = Session::new(1, "You");
        let context = FeedContext::from_matches(&session, &[record(3, 5, 6)]);
        assert!(context.matched_users.is_empty());
    }
}
