//! # Swipe Session Driver
//!
//! Wires the pieces of the swipe screen together:
//! 1. UI input drives the commit engine
//! 2. Committed decisions go to the feed sequencer
//! 3. Sequencer commands run as network tasks (load, like, reject)
//! 4. Like results feed the match notifier
//! 5. Notifier dismissals reload the feed
//!
//! ## Design Note
//! One task owns all state (queue, counters, drag, overlays). It `select!`s
//! over UI events, finished network tasks and the earliest pending deadline,
//! then publishes a `FeedView` snapshot on a `watch` channel. Network tasks
//! live in a `JoinSet`; their only way to affect state is the value they
//! return.
//!
//! Shutting down aborts the loop task. That drops the `JoinSet` (aborting
//! every in-flight call) and every deadline with it, so nothing fires late.
//!
//! ## Usage
//! ```ignore
//! let mut handle = SwipeSession::spawn(backend, session, ClientConfig::default());
//! handle.wait_for(|view| view.status == FeedStatus::Ready).await?;
//! handle.send(UiEvent::Like).await?;
//! ```

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant as TokioInstant};
use tracing::{debug, info, warn};

use api_client::SharedBackend;
use feed::{FeedCommand, FeedLoader, FeedSequencer, FeedStatus};
use gesture::{CardVisual, Point, ReleaseOutcome, SwipeCommitEngine};
use model::{Candidate, Counters, MatchEvent, Session, SwipeDecision, SwipeDirection};

use crate::config::ClientConfig;
use crate::error::SessionClosed;
use crate::match_notifier::{MatchNotifier, NotifierSignal};

const EVENT_BUFFER: usize = 64;

/// Input from the swipe screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    PointerCancel,
    /// Like button
    Like,
    /// Reject button
    Reject,
    /// Tap on the match celebration
    TapOverlay,
    /// Retry after a failed or empty load
    Retry,
}

/// Snapshot of everything the swipe screen renders
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    pub status: FeedStatus,
    pub current: Option<Candidate>,
    pub preview: Option<Candidate>,
    pub card: CardVisual,
    pub counters: Counters,
    pub like_burst: bool,
    /// The matched candidate while the celebration is on screen
    pub celebration: Option<Candidate>,
    pub load_error: Option<String>,
}

impl Default for FeedView {
    fn default() -> Self {
        Self {
            status: FeedStatus::Idle,
            current: None,
            preview: None,
            card: CardVisual {
                opacity: 1.0,
                animated: true,
                ..CardVisual::default()
            },
            counters: Counters::default(),
            like_burst: false,
            celebration: None,
            load_error: None,
        }
    }
}

/// What a finished network task reports back
#[derive(Debug)]
enum NetworkEvent {
    Loaded {
        generation: u64,
        result: Result<Vec<Candidate>, String>,
    },
    Matched(MatchEvent),
    /// The call finished with nothing for the loop to do
    Settled,
}

/// Entry point for running a swipe session
pub struct SwipeSession;

impl SwipeSession {
    /// Start the event loop and request the first batch.
    ///
    /// # Arguments
    /// * `backend` - Collaborator for loads, likes and rejects
    /// * `session` - The acting user
    /// * `config` - Gesture constants and overlay timings
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(backend: SharedBackend, session: Session, config: ClientConfig) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (view_tx, view_rx) = watch::channel(FeedView::default());

        info!("Starting swipe session for user {}", session.user_id);
        let state = SessionLoop {
            loader: FeedLoader::new(backend.clone(), session.clone()),
            backend,
            session,
            feed: FeedSequencer::new(),
            engine: SwipeCommitEngine::new(config.gesture.clone()),
            notifier: MatchNotifier::new(&config.timings),
            tasks: JoinSet::new(),
            view: view_tx,
            reload_pending: false,
        };
        let task = tokio::spawn(state.run(events_rx));

        SessionHandle {
            events: events_tx,
            view: view_rx,
            task: Some(task),
        }
    }
}

/// Control handle for a running session. Dropping it shuts the session down.
pub struct SessionHandle {
    events: mpsc::Sender<UiEvent>,
    view: watch::Receiver<FeedView>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub async fn send(&self, event: UiEvent) -> Result<(), SessionClosed> {
        self.events.send(event).await.map_err(|_| SessionClosed)
    }

    /// The latest published view
    pub fn view(&self) -> FeedView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view.clone()
    }

    /// Wait until a published view satisfies `predicate` and return it.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&FeedView) -> bool,
    ) -> Result<FeedView, SessionClosed> {
        let mut view = self.view.clone();
        let matched = view.wait_for(predicate).await.map_err(|_| SessionClosed)?;
        Ok(matched.clone())
    }

    /// Stop the loop, abort in-flight calls and drop every pending timer.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("Swipe session task failed: {}", e);
                }
            }
        }
        info!("Swipe session shut down");
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct SessionLoop {
    backend: SharedBackend,
    session: Session,
    loader: FeedLoader,
    feed: FeedSequencer,
    engine: SwipeCommitEngine,
    notifier: MatchNotifier,
    tasks: JoinSet<NetworkEvent>,
    view: watch::Sender<FeedView>,
    /// A dismissal asked for a reload while a committed card was still
    /// flying off; the reload waits for that card's decision.
    reload_pending: bool,
}

fn now() -> std::time::Instant {
    TokioInstant::now().into_std()
}

impl SessionLoop {
    async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) {
        let command = self.feed.begin_load();
        self.run_command(command);
        self.publish(now());

        loop {
            let deadline = self.next_deadline();
            let wake_at = deadline
                .map(TokioInstant::from_std)
                .unwrap_or_else(|| TokioInstant::now() + Duration::from_secs(3600));

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_ui(event, now()),
                    None => break,
                },
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => match joined {
                    Ok(event) => self.handle_network(event, now()),
                    Err(e) => warn!("Network task failed: {}", e),
                },
                _ = sleep_until(wake_at), if deadline.is_some() => {}
            }

            let at = now();
            self.advance(at);
            self.publish(at);
        }

        self.notifier.cancel_all();
        self.engine.reset();
        self.tasks.abort_all();
        debug!("Swipe session loop for user {} ended", self.session.user_id);
    }

    fn next_deadline(&self) -> Option<std::time::Instant> {
        match (self.engine.next_deadline(), self.notifier.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn handle_ui(&mut self, event: UiEvent, now: std::time::Instant) {
        if self.notifier.is_celebrating() {
            if event == UiEvent::TapOverlay {
                if let Some(signal) = self.notifier.tap(now) {
                    self.handle_signal(signal);
                }
            } else {
                debug!("Ignoring {:?} while the match celebration is up", event);
            }
            return;
        }

        match event {
            UiEvent::PointerDown(position) => {
                self.engine.pointer_down(position);
            }
            UiEvent::PointerMove(position) => {
                self.engine.pointer_move(position);
            }
            UiEvent::PointerUp => {
                if let ReleaseOutcome::Committed { direction, .. } = self.engine.pointer_up(now) {
                    debug!("Card flying off {:?}", direction);
                }
            }
            UiEvent::PointerCancel => self.engine.pointer_cancel(now),
            UiEvent::Like => self.press(SwipeDirection::Right, now),
            UiEvent::Reject => self.press(SwipeDirection::Left, now),
            UiEvent::TapOverlay => {}
            UiEvent::Retry => {
                if let Some(command) = self.feed.retry() {
                    self.run_command(command);
                }
            }
        }
    }

    fn press(&mut self, direction: SwipeDirection, now: std::time::Instant) {
        if let Some(decision) = self.engine.press(direction) {
            self.apply_decision(decision, now);
        }
    }

    fn handle_network(&mut self, event: NetworkEvent, now: std::time::Instant) {
        match event {
            NetworkEvent::Loaded { generation, result } => {
                self.feed.complete_load(generation, result);
            }
            NetworkEvent::Matched(event) => self.notifier.on_match(event, now),
            NetworkEvent::Settled => {}
        }
    }

    /// Fire every deadline that has passed and re-attach the top card.
    fn advance(&mut self, now: std::time::Instant) {
        if let Some(decision) = self.engine.poll(now) {
            self.apply_decision(decision, now);
        }
        for signal in self.notifier.poll(now) {
            self.handle_signal(signal);
        }
        if self.reload_pending && !self.engine.is_flying_off() {
            self.reload_pending = false;
            self.reload();
        }

        match self.feed.current() {
            Some(card) => self.engine.attach(card.id(), card.is_draggable()),
            None if !self.engine.is_flying_off() => self.engine.detach(),
            None => {}
        }
    }

    fn apply_decision(&mut self, decision: SwipeDecision, now: std::time::Instant) {
        match self.feed.apply(decision) {
            Ok(commands) => {
                if decision.direction.is_like() {
                    self.notifier.like_committed(now);
                }
                for command in commands {
                    self.run_command(command);
                }
            }
            Err(e) => warn!("Dropping decision on user {}: {}", decision.candidate, e),
        }
    }

    fn handle_signal(&mut self, signal: NotifierSignal) {
        match signal {
            NotifierSignal::CelebrationShown { match_id } => {
                debug!("Celebration shown (match {:?})", match_id);
            }
            NotifierSignal::Dismissed { reload: true } if self.engine.is_flying_off() => {
                debug!("Match dismissed mid fly-off, reloading once the card settles");
                self.reload_pending = true;
            }
            NotifierSignal::Dismissed { reload: true } => self.reload(),
            NotifierSignal::Dismissed { reload: false } => {}
        }
    }

    fn reload(&mut self) {
        info!("Match dismissed, reloading feed");
        let command = self.feed.begin_load();
        self.run_command(command);
    }

    /// Spawn the network task for a sequencer command.
    fn run_command(&mut self, command: FeedCommand) {
        match command {
            FeedCommand::Fetch { generation } => {
                let loader = self.loader.clone();
                self.tasks.spawn(async move {
                    let result = loader.load().await.map_err(|e| format!("{:#}", e));
                    NetworkEvent::Loaded { generation, result }
                });
            }
            FeedCommand::SubmitLike { candidate } => {
                let backend = self.backend.clone();
                let session = self.session.clone();
                self.tasks.spawn(async move {
                    match backend.submit_like(&session, candidate.id()).await {
                        Ok(outcome) if outcome.is_match => {
                            info!("Like on user {} is a match", candidate.id());
                            NetworkEvent::Matched(MatchEvent {
                                candidate,
                                match_id: outcome.match_id,
                            })
                        }
                        Ok(_) => NetworkEvent::Settled,
                        Err(e) => {
                            warn!("Failed to submit like on user {}: {}", candidate.id(), e);
                            NetworkEvent::Settled
                        }
                    }
                });
            }
            FeedCommand::SubmitReject { target } => {
                let backend = self.backend.clone();
                let session = self.session.clone();
                self.tasks.spawn(async move {
                    if let Err(e) = backend.submit_reject(&session, target).await {
                        warn!("Failed to submit reject on user {}: {}", target, e);
                    }
                    NetworkEvent::Settled
                });
            }
        }
    }

    fn publish(&self, now: std::time::Instant) {
        let load_error = match self.feed.status() {
            FeedStatus::Failed { message } => Some(message.clone()),
            _ => None,
        };
        let view = FeedView {
            status: self.feed.status().clone(),
            current: self.feed.current().cloned(),
            preview: self.feed.preview().cloned(),
            card: self.engine.visual(),
            counters: self.feed.counters(),
            like_burst: self.notifier.like_burst_visible(now),
            celebration: self.notifier.celebration().map(|e| e.candidate.clone()),
            load_error,
        };
        self.view.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}
