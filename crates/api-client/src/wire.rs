//! JSON payloads exchanged with the REST backend, and their conversions into
//! domain types.
//!
//! The backend speaks camelCase and nests full user/match objects where the
//! client only needs ids; unknown fields are ignored.

use model::{
    ChatMessage, Comment, CommentId, LikeOutcome, Match, MatchId, MediaId, MediaRef, MessageId,
    UserId, UserSummary,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<UserDto> for UserSummary {
    fn from(dto: UserDto) -> Self {
        UserSummary {
            id: dto.id,
            name: dto.username,
            avatar_url: dto.image_url.filter(|url| !url.is_empty()),
            bio: dto.description.unwrap_or_default(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemeDto {
    pub id: MediaId,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

impl From<MemeDto> for MediaRef {
    fn from(dto: MemeDto) -> Self {
        MediaRef {
            id: dto.id,
            image_url: dto.image_url,
            caption: dto.caption.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentDto {
    pub id: CommentId,
    pub content: String,
    pub user: UserDto,
}

impl From<CommentDto> for Comment {
    fn from(dto: CommentDto) -> Self {
        Comment {
            id: dto.id,
            author_id: dto.user.id,
            author_name: dto.user.username,
            text: dto.content,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    pub id: MatchId,
    pub user1: UserDto,
    pub user2: UserDto,
}

impl From<MatchDto> for Match {
    fn from(dto: MatchDto) -> Self {
        Match {
            id: dto.id,
            user1: dto.user1.into(),
            user2: dto.user2.into(),
        }
    }
}

/// A nested object of which only the id is needed
#[derive(Debug, Clone, Deserialize)]
pub struct IdRef {
    pub id: u64,
}

/// Response of `POST /matches/like/{liker}/{liked}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeUserResponse {
    pub is_match: bool,
    #[serde(default, rename = "match")]
    pub matched: Option<IdRef>,
}

impl From<LikeUserResponse> for LikeOutcome {
    fn from(dto: LikeUserResponse) -> Self {
        LikeOutcome {
            is_match: dto.is_match,
            match_id: if dto.is_match {
                dto.matched.map(|m| m.id)
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: MessageId,
    #[serde(rename = "match")]
    pub match_ref: IdRef,
    pub sender: IdRef,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}

impl From<MessageDto> for ChatMessage {
    fn from(dto: MessageDto) -> Self {
        ChatMessage {
            id: dto.id,
            match_id: dto.match_ref.id,
            sender_id: dto.sender.id,
            content: dto.content,
            created_at: dto.created_at,
        }
    }
}

/// Body of `POST /messages/...` and `POST /comments/...`
#[derive(Debug, Clone, Serialize)]
pub struct ContentRequest<'a> {
    pub content: &'a str,
}

/// Response of `GET /likes/meme/{meme}/user/{user}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub has_liked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub username_or_email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Message for a non-2xx response.
///
/// The server's `message` when the body is JSON carrying one, the status
/// line when it is JSON without one, and a generic message otherwise.
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status)),
        Err(_) => "An error occurred".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dto_maps_missing_fields_to_defaults() {
        let dto: UserDto = serde_json::from_str(
            r#"{"id": 3, "email": "k@example.com", "username": "MemeKing", "imageUrl": ""}"#,
        )
        .unwrap();
        let user: UserSummary = dto.into();

        assert_eq!(user.id, 3);
        assert_eq!(user.name, "MemeKing");
        assert_eq!(user.bio, "");
        assert!(user.avatar_url.is_none(), "empty image url means no avatar");
    }

    #[test]
    fn test_meme_dto_ignores_nested_owner() {
        let dto: MemeDto = serde_json::from_str(
            r#"{"id": 10, "imageUrl": "/cat.png", "caption": null,
                "user": {"id": 3, "username": "MemeKing"}}"#,
        )
        .unwrap();
        let media: MediaRef = dto.into();

        assert_eq!(media.id, 10);
        assert_eq!(media.caption, "");
    }

    #[test]
    fn test_like_response_with_match() {
        let dto: LikeUserResponse = serde_json::from_str(
            r#"{"isMatch": true, "match": {"id": 42,
                "user1": {"id": 1, "username": "a"}, "user2": {"id": 2, "username": "b"}}}"#,
        )
        .unwrap();
        let outcome: LikeOutcome = dto.into();

        assert!(outcome.is_match);
        assert_eq!(outcome.match_id, Some(42));
    }

    #[test]
    fn test_like_response_without_match_drops_id() {
        let dto: LikeUserResponse =
            serde_json::from_str(r#"{"isMatch": false, "match": null}"#).unwrap();
        let outcome: LikeOutcome = dto.into();

        assert_eq!(outcome, LikeOutcome::default());
    }

    #[test]
    fn test_message_dto() {
        let dto: MessageDto = serde_json::from_str(
            r#"{"id": 7, "match": {"id": 42}, "sender": {"id": 2, "username": "b"},
                "content": "hi", "createdAt": "2024-01-15T10:30:00Z"}"#,
        )
        .unwrap();
        let message: ChatMessage = dto.into();

        assert_eq!(message.match_id, 42);
        assert_eq!(message.sender_id, 2);
        assert_eq!(message.created_at, "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_comment_dto_takes_author_from_nested_user() {
        let dto: CommentDto = serde_json::from_str(
            r#"{"id": 5, "content": "so true", "user": {"id": 6, "username": "LaughMaster"},
                "meme": {"id": 20, "imageUrl": "/cat.png"}}"#,
        )
        .unwrap();
        let comment: Comment = dto.into();

        assert_eq!(comment.author_id, 6);
        assert_eq!(comment.author_name, "LaughMaster");
        assert_eq!(comment.text, "so true");
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            error_message(409, r#"{"message": "Already liked"}"#),
            "Already liked"
        );
        assert_eq!(
            error_message(404, r#"{"error": "Not Found"}"#),
            "HTTP error! status: 404"
        );
        assert_eq!(error_message(400, r#"{"message": ""}"#), "HTTP error! status: 400");
        assert_eq!(error_message(502, "<html>Bad Gateway</html>"), "An error occurred");
        assert_eq!(error_message(500, ""), "An error occurred");
    }

    #[test]
    fn test_login_request_is_camel_case() {
        let body = serde_json::to_value(LoginRequest {
            username_or_email: "you",
            password: "hunter2",
        })
        .unwrap();
        assert_eq!(body["usernameOrEmail"], "you");
    }
}
