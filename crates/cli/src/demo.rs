//! Offline demo data.
//!
//! Seeds an in-memory backend with a handful of meme accounts so every
//! command works without a server. Two of the accounts have already liked
//! the demo user, so liking them produces a match.

use std::time::Duration;

use api_client::InMemoryBackend;
use model::{Comment, MediaRef, Session, UserId, UserSummary};

/// The acting user in demo mode
pub const DEMO_USER: UserId = 7;

pub fn session() -> Session {
    Session::new(DEMO_USER, "You")
}

fn comment(id: u64, author_id: UserId, author_name: &str, text: &str) -> Comment {
    Comment {
        id,
        author_id,
        author_name: author_name.to_string(),
        text: text.to_string(),
    }
}

pub fn backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_user(
            UserSummary::new(1, "MemeKing")
                .with_avatar("/diverse-group-avatars.png")
                .with_bio("Professional meme curator | 5 years of making people laugh")
                .with_tags(["cats", "mondays"]),
        )
        .with_user(
            UserSummary::new(2, "CodeJoker")
                .with_bio("Developer by day, meme lord by night")
                .with_tags(["programming"]),
        )
        .with_user(
            UserSummary::new(3, "MemeLord").with_bio("Spreading joy one meme at a time"),
        )
        .with_user(UserSummary::new(4, "WorkHumor").with_tags(["office"]))
        .with_user(UserSummary::new(5, "GamerMemes").with_tags(["gaming"]))
        .with_user(UserSummary::new(6, "LaughMaster"))
        .with_user(
            UserSummary::new(DEMO_USER, "You")
                .with_bio("Meme enthusiast | Spreading laughter one swipe at a time"),
        )
        .with_meme(
            1,
            MediaRef::new(1, "/funny-cat-meme.png", "When you realize it's Monday tomorrow"),
            1234,
            vec![comment(1, 6, "LaughMaster", "This is too relatable")],
        )
        .with_meme(
            1,
            MediaRef::new(6, "/office-meme.jpg", "When the meeting could have been an email"),
            5621,
            vec![],
        )
        .with_meme(
            2,
            MediaRef::new(2, "/programming-meme.png", "Debugging at 3 AM be like"),
            2456,
            vec![],
        )
        .with_meme(
            3,
            MediaRef::new(3, "/dog-meme.jpg", "POV: You forgot to save your work"),
            3789,
            vec![comment(2, 1, "MemeKing", "Classic mistake!")],
        )
        .with_meme(
            5,
            MediaRef::new(5, "/gaming-meme.png", "One more game before bed"),
            4123,
            vec![comment(3, 2, "CodeJoker", "Every single night")],
        )
        .with_meme(
            DEMO_USER,
            MediaRef::new(7, "/my-meme.png", "My first viral meme!"),
            892,
            vec![],
        )
        .with_like(3, DEMO_USER)
        .with_like(5, DEMO_USER)
        .with_media_like(DEMO_USER, 3)
        .with_match(DEMO_USER, 6)
        .with_message(1, 6, "That cat meme killed me")
        .with_message(1, DEMO_USER, "Right?? Mondays are the worst")
        .with_like_latency(Duration::from_millis(150))
}
