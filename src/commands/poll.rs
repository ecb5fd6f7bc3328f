use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::error::PollError;
use crate::gateway::PollGateway;
use crate::identity::IdentityProvider;
use crate::models::{Poll, PollDraft};
use crate::session::{PollSession, VoteState};
use crate::share::{SharePlatform, share_url, social_share_url};
use crate::tasks::live_sync::{LiveSync, SYNC_INTERVAL_SECONDS};
use crate::views::ViewCounter;

pub async fn list(gateway: &dyn PollGateway) -> Result<(), PollError> {
    let polls = gateway.list_polls().await?;
    if polls.is_empty() {
        println!("No polls yet.");
        return Ok(());
    }

    // Printed in backend order; no recency ordering is implied.
    for poll in &polls {
        println!(
            "{:<20} {} ({} votes, {} choices)",
            poll.id,
            poll.title,
            poll.total_votes(),
            poll.choices.len()
        );
    }
    Ok(())
}

pub async fn create(
    gateway: &dyn PollGateway,
    origin: &str,
    title: &str,
    choices: Vec<String>,
) -> Result<(), PollError> {
    // Validation happens before anything touches the network.
    let draft = PollDraft::new(title, choices)?;
    let poll = gateway.create_poll(&draft).await?;

    info!("created poll {}", poll.id);
    render(&poll, None);
    println!("\nShare: {}", share_url(origin, &poll.id));
    Ok(())
}

pub async fn vote(
    gateway: &dyn PollGateway,
    poll_id: &str,
    choice_id: &str,
) -> Result<(), PollError> {
    gateway.cast_vote(poll_id, choice_id).await?;

    // The ack carries no tally; re-fetch for the authoritative counts.
    let poll = gateway.get_poll(poll_id).await?;
    println!("Vote recorded.");
    render(&poll, None);
    Ok(())
}

pub async fn share(
    gateway: &dyn PollGateway,
    origin: &str,
    poll_id: &str,
) -> Result<(), PollError> {
    let poll = gateway.get_poll(poll_id).await?;
    let url = share_url(origin, &poll.id);

    println!("Link:     {url}");
    for (label, platform) in [
        ("Facebook", SharePlatform::Facebook),
        ("Twitter", SharePlatform::Twitter),
        ("LinkedIn", SharePlatform::Linkedin),
        ("WhatsApp", SharePlatform::Whatsapp),
    ] {
        println!("{label:<9} {}", social_share_url(platform, &poll.title, &url));
    }
    Ok(())
}

pub async fn watch(
    gateway: Arc<dyn PollGateway>,
    identity: Arc<dyn IdentityProvider>,
    poll_id: &str,
    vote: Option<&str>,
) -> Result<(), PollError> {
    let mut views = ViewCounter::load_default();
    let view_count = views.record_view(poll_id);

    // Establish the baseline before anything else; a missing poll is an
    // error shown to the user, not something to silently retry.
    let baseline = gateway.get_poll(poll_id).await?;
    let mut session = PollSession::new(Arc::clone(&gateway), identity, baseline);
    render_session(&session, view_count);

    if let Some(choice_id) = vote {
        match session.submit_vote(choice_id).await {
            // The optimistic snapshot shows the vote before any refresh.
            Ok(()) => render_session(&session, view_count),
            Err(err) => println!("Vote failed: {err}"),
        }
    }

    let (handle, mut updates) = LiveSync::start(
        Arc::clone(&gateway),
        poll_id,
        Duration::from_secs(SYNC_INTERVAL_SECONDS),
    );
    info!("watching poll {poll_id}, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = updates.recv() => match update {
                Some(poll) => {
                    session.apply_authoritative(poll);
                    render_session(&session, view_count);
                }
                None => break,
            }
        }
    }

    handle.stop();
    info!("stopped watching poll {poll_id}");
    Ok(())
}

fn render_session(session: &PollSession, views: u64) {
    render(&session.snapshot(), Some(views));
    if session.vote_state() == VoteState::Voted {
        println!("  Your vote has been recorded.");
    }
    if let Some(err) = session.last_error() {
        println!("  Error: {err}");
    }
}

fn render(poll: &Poll, views: Option<u64>) {
    let total = poll.total_votes();
    println!();
    match views {
        Some(views) => println!("{} ({total} votes, {views} views)", poll.title),
        None => println!("{} ({total} votes)", poll.title),
    }

    for choice in &poll.choices {
        let pct = choice.percentage(total);
        let bar = "#".repeat((pct / 5.0).round() as usize);
        println!(
            "  [{}] {:<24} {:>5} {:>5.1}% {bar}",
            choice.id, choice.text, choice.count, pct
        );
    }
}
