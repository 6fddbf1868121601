mod demo;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use api_client::{HttpBackend, SharedBackend};
use feed::{FeedLoader, FeedStatus, ProfileView};
use gesture::Point;
use model::{Candidate, MatchId, MediaId, MediaItem, Session, SwipeDirection, UserId};
use session::{ChatRoom, ClientConfig, FeedView, SessionHandle, SwipeSession, UiEvent};

/// MemeSwipe - swipe on memes, match with their makers
#[derive(Parser)]
#[command(name = "memeswipe")]
#[command(about = "Terminal harness for the MemeSwipe client core", long_about = None)]
struct Cli {
    /// JSON config file (defaults are used for anything it leaves out)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config and MEMESWIPE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Acting user id when not logging in
    #[arg(long)]
    user_id: Option<UserId>,

    /// Bearer token for --user-id
    #[arg(long, conflicts_with = "login")]
    token: Option<String>,

    /// Username or email to log in with
    #[arg(long, requires = "password")]
    login: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Run against built-in demo data instead of a server
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one feed batch and print it
    Feed,

    /// Replay horizontal drags against the feed
    Swipe {
        /// Horizontal drag distances in px, e.g. 150,-40,-220
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        drags: Vec<f64>,
    },

    /// Like or reject candidates at random using the buttons
    Simulate {
        /// Number of decisions to make
        #[arg(long, default_value = "10")]
        swipes: usize,
    },

    /// List your matches
    Matches,

    /// Show a user's profile with their memes
    Profile {
        /// Whose profile to open
        user: UserId,

        /// Like this meme, or unlike it if you already do
        #[arg(long)]
        toggle_like: Option<MediaId>,

        /// Meme to comment on (needs --text)
        #[arg(long, requires = "text")]
        comment_on: Option<MediaId>,

        /// Comment text
        #[arg(long)]
        text: Option<String>,
    },

    /// Open the chat for a match
    Chat {
        #[arg(long)]
        match_id: MatchId,

        /// Message to send after opening
        #[arg(long)]
        send: Option<String>,

        /// Keep polling and print new messages for this many seconds
        #[arg(long, default_value = "0")]
        watch_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    config.apply_overrides(cli.api_url.clone());

    let (backend, session) = connect(&cli, &config).await?;
    println!(
        "{} Signed in as {} (user {})",
        "✓".green(),
        session.username.bold(),
        session.user_id
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Feed => handle_feed(backend, session).await?,
        Commands::Swipe { drags } => handle_swipe(backend, session, config, drags).await?,
        Commands::Simulate { swipes } => handle_simulate(backend, session, config, swipes).await?,
        Commands::Matches => handle_matches(backend, session).await?,
        Commands::Profile {
            user,
            toggle_like,
            comment_on,
            text,
        } => handle_profile(backend, session, user, toggle_like, comment_on, text).await?,
        Commands::Chat {
            match_id,
            send,
            watch_secs,
        } => handle_chat(backend, session, &config, match_id, send, watch_secs).await?,
    }

    Ok(())
}

/// Pick the backend and the acting user from the command line
async fn connect(cli: &Cli, config: &ClientConfig) -> Result<(SharedBackend, Session)> {
    if cli.demo {
        println!("{}", "Running against offline demo data".yellow());
        return Ok((Arc::new(demo::backend()), demo::session()));
    }

    let http = HttpBackend::new(config.api_base_url.as_str())
        .context("Failed to build HTTP client")?;

    let session = match (&cli.login, &cli.password, cli.user_id) {
        (Some(login), Some(password), _) => http
            .login(login, password)
            .await
            .context("Login failed")?,
        (None, _, Some(user_id)) => {
            let session = Session::new(user_id, format!("user{}", user_id));
            match &cli.token {
                Some(token) => session.with_token(token.as_str()),
                None => session,
            }
        }
        _ => bail!("Pass --login/--password, --user-id or --demo"),
    };

    let backend = http.authenticated(&session);
    println!("Using API at {}", backend.base_url());
    Ok((Arc::new(backend), session))
}

/// Handle the 'feed' command
async fn handle_feed(backend: SharedBackend, session: Session) -> Result<()> {
    let start = Instant::now();
    let candidates = FeedLoader::new(backend, session).load().await?;

    println!(
        "{}",
        format!("Feed ({} candidates, loaded in {:?}):", candidates.len(), start.elapsed())
            .bold()
            .blue()
    );
    for (i, candidate) in candidates.iter().enumerate() {
        print_candidate(i + 1, candidate);
    }
    Ok(())
}

/// Handle the 'swipe' command
async fn handle_swipe(
    backend: SharedBackend,
    session: Session,
    config: ClientConfig,
    drags: Vec<f64>,
) -> Result<()> {
    if drags.is_empty() {
        bail!("Give at least one drag distance with --drags");
    }
    let settle = config.gesture.settle() + Duration::from_millis(50);
    let reveal = config.timings.match_reveal() + Duration::from_millis(300);
    let handle = SwipeSession::spawn(backend, session, config);
    wait_until_ready(&handle).await?;

    for dx in drags {
        let before = handle.view();
        let Some(current) = before.current.as_ref() else {
            println!("{}", "No more candidates".yellow());
            break;
        };
        let name = current.profile.name.clone();

        handle.send(UiEvent::PointerDown(Point::ORIGIN)).await?;
        handle.send(UiEvent::PointerMove(Point::new(dx / 2.0, 0.0))).await?;
        handle.send(UiEvent::PointerMove(Point::new(dx, 0.0))).await?;
        handle.send(UiEvent::PointerUp).await?;
        tokio::time::sleep(settle).await;

        let after = handle.view();
        let liked = after.counters.likes > before.counters.likes;
        let outcome = if liked {
            "LIKE".green()
        } else if after.counters.rejects > before.counters.rejects {
            "NOPE".red()
        } else if current.is_draggable() {
            "returned".normal()
        } else {
            "not draggable (no memes)".dimmed()
        };
        println!("{:>7.1}px on {:<12} -> {}", dx, name, outcome);

        if liked {
            tokio::time::sleep(reveal).await;
            settle_celebration(&handle).await?;
        }
        wait_until_ready(&handle).await?;
    }

    finish(handle).await
}

/// Handle the 'simulate' command
async fn handle_simulate(
    backend: SharedBackend,
    session: Session,
    config: ClientConfig,
    swipes: usize,
) -> Result<()> {
    let handle = SwipeSession::spawn(backend, session, config);
    wait_until_ready(&handle).await?;

    let start = Instant::now();
    for _ in 0..swipes {
        let view = handle.view();
        let Some(current) = view.current.as_ref() else {
            println!("{}", "No more candidates".yellow());
            break;
        };
        let direction = if rand::random::<bool>() {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        };
        let decided = view.counters.total();

        let event = if direction.is_like() {
            UiEvent::Like
        } else {
            UiEvent::Reject
        };
        handle.send(event).await?;
        handle
            .wait_for(|view| view.counters.total() > decided)
            .await?;
        println!(
            "{} {}",
            if direction.is_like() { "♥".green() } else { "✗".red() },
            current.profile.name
        );

        // Give the like a chance to come back as a match
        tokio::time::sleep(Duration::from_millis(200)).await;
        settle_celebration(&handle).await?;
        wait_until_ready(&handle).await?;
    }
    println!("Simulated for {:?}", start.elapsed());

    finish(handle).await
}

/// Handle the 'matches' command
async fn handle_matches(backend: SharedBackend, session: Session) -> Result<()> {
    let matches = backend
        .fetch_matches(&session)
        .await
        .context("Failed to fetch matches")?;

    println!("{}", format!("Matches ({}):", matches.len()).bold().blue());
    for record in &matches {
        match record.counterpart(session.user_id) {
            Some(user) => println!("  #{} {}", record.id.to_string().green(), user.name.bold()),
            None => println!("  #{} (not a participant)", record.id),
        }
    }
    Ok(())
}

/// Handle the 'profile' command
async fn handle_profile(
    backend: SharedBackend,
    session: Session,
    user: UserId,
    toggle_like: Option<MediaId>,
    comment_on: Option<MediaId>,
    text: Option<String>,
) -> Result<()> {
    let mut view = ProfileView::load(backend.as_ref(), &session, user).await?;

    if let Some(media) = toggle_like {
        let liked = view
            .toggle_like(backend.as_ref(), &session, media)
            .await
            .map_err(|e| anyhow!("Failed to update like: {}", e))?;
        println!(
            "{} meme {}",
            if liked { "Liked".green() } else { "Unliked".yellow() },
            media
        );
    }
    if let (Some(media), Some(text)) = (comment_on, text) {
        view.add_comment(backend.as_ref(), &session, media, &text)
            .await
            .map_err(|e| anyhow!("Failed to add comment: {}", e))?;
        println!("{} Comment added to meme {}", "✓".green(), media);
    }

    let stats = view.stats();
    println!("{}", view.profile.name.bold().blue());
    if !view.profile.bio.is_empty() {
        println!("   {}", view.profile.bio.dimmed());
    }
    println!("   {} memes, {} likes", stats.total_memes, stats.total_likes);
    for item in &view.media {
        print_media(item, view.is_liked(item.id));
    }
    Ok(())
}

fn print_media(item: &MediaItem, liked: bool) {
    println!(
        "   {} #{} {} ({} likes)",
        if liked { "♥".red() } else { "♡".normal() },
        item.id,
        item.caption,
        item.like_count
    );
    for comment in &item.comments {
        println!("       {}: {}", comment.author_name.bold(), comment.text);
    }
}

/// Handle the 'chat' command
async fn handle_chat(
    backend: SharedBackend,
    session: Session,
    config: &ClientConfig,
    match_id: MatchId,
    send: Option<String>,
    watch_secs: u64,
) -> Result<()> {
    let me = session.user_id;
    let room = ChatRoom::open(backend, session, match_id, config.timings.chat_poll())
        .await
        .with_context(|| format!("Failed to open chat {}", match_id))?;
    let partner = room.partner().name.clone();

    println!("{}", format!("Chat with {}", partner).bold().blue());
    let mut shown = 0;
    print_messages(&room.messages(), &mut shown, me, &partner);

    if let Some(text) = send {
        room.send(&text)
            .await
            .map_err(|e| anyhow!("Failed to send message: {}", e))?;
        print_messages(&room.messages(), &mut shown, me, &partner);
    }

    if watch_secs > 0 {
        let mut updates = room.subscribe();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(watch_secs);
        while let Ok(Ok(())) = tokio::time::timeout_at(deadline, updates.changed()).await {
            let messages = updates.borrow_and_update().clone();
            print_messages(&messages, &mut shown, me, &partner);
        }
    }

    room.close();
    Ok(())
}

async fn wait_until_ready(handle: &SessionHandle) -> Result<FeedView> {
    let view = handle
        .wait_for(|view| view.status != FeedStatus::Idle && view.status != FeedStatus::Loading)
        .await?;
    if let Some(error) = &view.load_error {
        bail!("Feed failed to load: {}", error);
    }
    Ok(view)
}

/// If a like turned into a match, show it and tap it away
async fn settle_celebration(handle: &SessionHandle) -> Result<()> {
    let view = handle.view();
    if let Some(matched) = view.celebration.as_ref() {
        println!("{} You matched with {}!", "★".yellow(), matched.profile.name.bold());
        handle.send(UiEvent::TapOverlay).await?;
        handle.wait_for(|view| view.celebration.is_none()).await?;
    }
    Ok(())
}

async fn finish(handle: SessionHandle) -> Result<()> {
    // Let any pending reveal play out before printing the totals
    tokio::time::sleep(Duration::from_millis(900)).await;
    settle_celebration(&handle).await?;

    let counters = handle.view().counters;
    println!(
        "{} {} likes, {} rejects",
        "Session:".bold(),
        counters.likes.to_string().green(),
        counters.rejects.to_string().red()
    );
    handle.shutdown().await;
    Ok(())
}

fn print_candidate(rank: usize, candidate: &Candidate) {
    let profile = &candidate.profile;
    println!(
        "{}. {} {}",
        rank.to_string().green(),
        profile.name.bold(),
        if profile.tags.is_empty() {
            String::new()
        } else {
            format!("[{}]", profile.tags.join(", "))
        }
    );
    if !profile.bio.is_empty() {
        println!("   {}", profile.bio.dimmed());
    }
    if candidate.media.is_empty() {
        println!("   {}", "no memes yet".dimmed());
    }
    for item in &candidate.media {
        println!(
            "   • {} ({} likes, {} comments)",
            item.caption,
            item.like_count,
            item.comments.len()
        );
    }
}

fn print_messages(
    messages: &[model::ChatMessage],
    shown: &mut usize,
    me: UserId,
    partner: &str,
) {
    for message in messages.iter().skip(*shown) {
        let sender = if message.sender_id == me {
            "You".cyan()
        } else {
            partner.magenta()
        };
        println!("[{}] {}: {}", message.created_at.dimmed(), sender, message.content);
    }
    *shown = (*shown).max(messages.len());
}
