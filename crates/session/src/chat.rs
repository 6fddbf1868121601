//! Chat room for a single match.
//!
//! There is no push channel: the room reloads the whole message list on a
//! fixed interval. Sent messages are appended only once the backend has
//! accepted them, so a failed send never shows up in the list.
//!
//! The poll loop is a spawned task owned by the room. `close()` or dropping
//! the room aborts it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use api_client::SharedBackend;
use model::{ChatMessage, Match, MatchId, Session, UserSummary};

use crate::error::ChatError;

pub struct ChatRoom {
    backend: SharedBackend,
    session: Session,
    record: Match,
    partner: UserSummary,
    messages: Arc<watch::Sender<Vec<ChatMessage>>>,
    poller: JoinHandle<()>,
}

impl ChatRoom {
    /// Open the chat for `match_id` and start polling.
    ///
    /// # Arguments
    /// * `backend` - Where the match and its messages live
    /// * `session` - The acting user; must be part of the match
    /// * `match_id` - The match to chat in
    /// * `poll_interval` - Time between message list reloads
    pub async fn open(
        backend: SharedBackend,
        session: Session,
        match_id: MatchId,
        poll_interval: Duration,
    ) -> Result<Self, ChatError> {
        let record = backend.fetch_match(match_id).await?;
        let partner = record
            .counterpart(session.user_id)
            .cloned()
            .ok_or(ChatError::NotParticipant {
                match_id,
                user_id: session.user_id,
            })?;

        let history = backend.poll_messages(match_id).await?;
        info!(
            "Opened chat {} with {} ({} messages)",
            match_id,
            partner.name,
            history.len()
        );

        let messages = Arc::new(watch::Sender::new(history));
        let poller = tokio::spawn(poll_loop(
            backend.clone(),
            match_id,
            poll_interval,
            messages.clone(),
        ));

        Ok(Self {
            backend,
            session,
            record,
            partner,
            messages,
            poller,
        })
    }

    pub fn match_id(&self) -> MatchId {
        self.record.id
    }

    /// The other participant
    pub fn partner(&self) -> &UserSummary {
        &self.partner
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.borrow().clone()
    }

    /// Receiver that changes whenever the message list does
    pub fn subscribe(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.messages.subscribe()
    }

    /// Send a message. Whitespace-only text is rejected without a call.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, ChatError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let sent = self
            .backend
            .send_message(self.record.id, &self.session, content)
            .await?;
        debug!("Sent message {} in chat {}", sent.id, self.record.id);

        self.messages.send_modify(|list| {
            if !list.iter().any(|m| m.id == sent.id) {
                list.push(sent.clone());
            }
        });
        Ok(sent)
    }

    /// Stop polling
    pub fn close(self) {
        info!("Closing chat {}", self.record.id);
    }
}

impl Drop for ChatRoom {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

async fn poll_loop(
    backend: SharedBackend,
    match_id: MatchId,
    every: Duration,
    messages: Arc<watch::Sender<Vec<ChatMessage>>>,
) {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match backend.poll_messages(match_id).await {
            Ok(latest) => {
                messages.send_if_modified(|list| {
                    if *list == latest {
                        false
                    } else {
                        *list = latest;
                        true
                    }
                });
            }
            Err(e) => warn!("Failed to poll chat {}: {}", match_id, e),
        }
    }
}
