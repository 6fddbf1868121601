//! REST implementation of `Backend`.
//!
//! Mirrors the endpoints of the swipe backend:
//! - `GET  /users`, `GET /memes/user/{id}`, `GET /likes/meme/{id}/count`,
//!   `GET /comments/meme/{id}`
//! - `POST /matches/like/{liker}/{liked}`, `GET /matches/{id}`,
//!   `GET /matches/user/{id}`
//! - `POST /messages/match/{match}/user/{user}`, `GET /messages/match/{match}`
//! - `GET /users/{id}`, `POST /comments/meme/{meme}/user/{user}`
//! - `POST|DELETE|GET /likes/meme/{meme}/user/{user}`
//! - `POST /auth/login`
//!
//! Every request carries the bearer token when the backend was built from an
//! authenticated session.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, error};

use model::{
    ChatMessage, Comment, LikeOutcome, Match, MatchId, MediaId, MediaRef, Session, UserId,
    UserSummary,
};

use crate::wire::{
    error_message, AuthResponse, CommentDto, ContentRequest, CountResponse, LikeStatusResponse,
    LikeUserResponse, LoginRequest, MatchDto, MemeDto, MessageDto, UserDto,
};
use crate::{ApiError, Backend, Result};

/// Default API root used by the web client
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Client for the REST backend
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    /// Build an unauthenticated client.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "http://localhost:8080/api"
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("memeswipe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Attach the session's token to every subsequent request
    pub fn authenticated(mut self, session: &Session) -> Self {
        self.token = session.token.clone();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            username_or_email,
            password,
        };
        let auth: AuthResponse = self
            .execute(self.client.post(self.url("/auth/login")).json(&body))
            .await?;
        debug!("Logged in as {} (user {})", auth.username, auth.user_id);
        Ok(Session::new(auth.user_id, auth.username).with_token(auth.token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.client.get(self.url(path))).await
    }

    /// Send a request and decode the JSON body.
    ///
    /// A 204 decodes as JSON `null`, which suits `()` and `Option<_>` targets.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            error!("Backend returned {}: {}", status, message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_candidates(&self, _session: &Session) -> Result<Vec<UserSummary>> {
        let users: Vec<UserDto> = self.get("/users").await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn fetch_matches(&self, session: &Session) -> Result<Vec<Match>> {
        let matches: Vec<MatchDto> = self
            .get(&format!("/matches/user/{}", session.user_id))
            .await?;
        Ok(matches.into_iter().map(Into::into).collect())
    }

    async fn fetch_media(&self, owner: UserId) -> Result<Vec<MediaRef>> {
        let memes: Vec<MemeDto> = self.get(&format!("/memes/user/{}", owner)).await?;
        Ok(memes.into_iter().map(Into::into).collect())
    }

    async fn fetch_like_count(&self, media: MediaId) -> Result<u64> {
        let count: CountResponse = self.get(&format!("/likes/meme/{}/count", media)).await?;
        Ok(count.count)
    }

    async fn fetch_comments(&self, media: MediaId) -> Result<Vec<Comment>> {
        let comments: Vec<CommentDto> = self.get(&format!("/comments/meme/{}", media)).await?;
        Ok(comments.into_iter().map(Into::into).collect())
    }

    async fn submit_like(&self, session: &Session, target: UserId) -> Result<LikeOutcome> {
        let path = format!("/matches/like/{}/{}", session.user_id, target);
        let response: LikeUserResponse = self.execute(self.client.post(self.url(&path))).await?;
        Ok(response.into())
    }

    async fn submit_reject(&self, session: &Session, target: UserId) -> Result<()> {
        // The REST API has no reject endpoint; rejects stay client-side.
        debug!("Reject {} -> {} kept local", session.user_id, target);
        Ok(())
    }

    async fn fetch_match(&self, id: MatchId) -> Result<Match> {
        let dto: MatchDto = self.get(&format!("/matches/{}", id)).await?;
        Ok(dto.into())
    }

    async fn send_message(
        &self,
        match_id: MatchId,
        session: &Session,
        content: &str,
    ) -> Result<ChatMessage> {
        let path = format!("/messages/match/{}/user/{}", match_id, session.user_id);
        let dto: MessageDto = self
            .execute(
                self.client
                    .post(self.url(&path))
                    .json(&ContentRequest { content }),
            )
            .await?;
        Ok(dto.into())
    }

    async fn poll_messages(&self, match_id: MatchId) -> Result<Vec<ChatMessage>> {
        let messages: Vec<MessageDto> = self.get(&format!("/messages/match/{}", match_id)).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn fetch_user(&self, id: UserId) -> Result<UserSummary> {
        let user: UserDto = self.get(&format!("/users/{}", id)).await?;
        Ok(user.into())
    }

    async fn post_comment(
        &self,
        session: &Session,
        media: MediaId,
        content: &str,
    ) -> Result<Comment> {
        let path = format!("/comments/meme/{}/user/{}", media, session.user_id);
        let dto: CommentDto = self
            .execute(self.client.post(self.url(&path)).json(&ContentRequest { content }))
            .await?;
        Ok(dto.into())
    }

    async fn like_media(&self, session: &Session, media: MediaId) -> Result<()> {
        let path = format!("/likes/meme/{}/user/{}", media, session.user_id);
        // The stored like record is not needed
        let _: IgnoredAny = self.execute(self.client.post(self.url(&path))).await?;
        Ok(())
    }

    async fn unlike_media(&self, session: &Session, media: MediaId) -> Result<()> {
        let path = format!("/likes/meme/{}/user/{}", media, session.user_id);
        let _: IgnoredAny = self.execute(self.client.delete(self.url(&path))).await?;
        Ok(())
    }

    async fn has_liked_media(&self, session: &Session, media: MediaId) -> Result<bool> {
        let status: LikeStatusResponse = self
            .get(&format!("/likes/meme/{}/user/{}", media, session.user_id))
            .await?;
        Ok(status.has_liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:8080/api/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080/api");
        assert_eq!(backend.url("/users"), "http://localhost:8080/api/users");
    }

    #[test]
    fn test_authenticated_takes_session_token() {
        let session = Session::new(1, "you").with_token("t0k3n");
        let backend = HttpBackend::new(DEFAULT_BASE_URL)
            .unwrap()
            .authenticated(&session);
        assert_eq!(backend.token.as_deref(), Some("t0k3n"));
    }

    #[tokio::test]
    async fn test_reject_needs_no_network() {
        // Points at a closed port: a request would fail
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        let session = Session::new(1, "you");
        assert!(backend.submit_reject(&session, 2).await.is_ok());
    }
}
