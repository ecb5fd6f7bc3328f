use std::sync::Arc;

use log::{debug, info};

use crate::error::PollError;
use crate::gateway::PollGateway;
use crate::identity::IdentityProvider;
use crate::models::Poll;

/// Vote progress within one poll-view session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    Idle,
    Voting,
    Voted,
}

/// Per-view reconciliation between the authoritative snapshot and the
/// caller's own vote.
///
/// The snapshot is two-layered: an authoritative base poll plus an optional
/// optimistic overlay naming the choice this session just voted for. The
/// overlay smooths the latency gap until the next authoritative fetch, which
/// replaces the base wholesale and clears the overlay. Counts are never
/// merged additively across the two layers.
pub struct PollSession {
    gateway: Arc<dyn PollGateway>,
    identity: Arc<dyn IdentityProvider>,
    base: Poll,
    overlay: Option<String>,
    state: VoteState,
    last_error: Option<PollError>,
}

impl PollSession {
    pub fn new(
        gateway: Arc<dyn PollGateway>,
        identity: Arc<dyn IdentityProvider>,
        baseline: Poll,
    ) -> Self {
        Self {
            gateway,
            identity,
            base: baseline,
            overlay: None,
            state: VoteState::Idle,
            last_error: None,
        }
    }

    pub fn vote_state(&self) -> VoteState {
        self.state
    }

    pub fn last_error(&self) -> Option<&PollError> {
        self.last_error.as_ref()
    }

    /// The poll as this session currently sees it: the authoritative base
    /// with the overlay vote applied on top.
    pub fn snapshot(&self) -> Poll {
        let mut poll = self.base.clone();
        if let Some(choice_id) = &self.overlay {
            if let Some(choice) = poll.choices.iter_mut().find(|c| c.id == *choice_id) {
                choice.count += 1;
            }
        }
        poll
    }

    /// Casts this session's vote.
    ///
    /// Rejected without a gateway call when the caller is unauthenticated;
    /// silently suppressed when this session already voted. On success the
    /// overlay shows the incremented count immediately. On failure the state
    /// rolls back to `Idle` and the snapshot stays unmodified, so the caller
    /// may retry.
    pub async fn submit_vote(&mut self, choice_id: &str) -> Result<(), PollError> {
        if self.state == VoteState::Voted {
            debug!("suppressing repeat vote on poll {}", self.base.id);
            return Ok(());
        }

        if self.identity.current_identity().is_none() {
            let err = PollError::Unauthorized;
            self.last_error = Some(err.clone());
            return Err(err);
        }

        self.state = VoteState::Voting;
        self.last_error = None;

        match self.gateway.cast_vote(&self.base.id, choice_id).await {
            Ok(()) => {
                self.overlay = Some(choice_id.to_string());
                self.state = VoteState::Voted;
                info!("vote recorded on poll {} choice {}", self.base.id, choice_id);
                Ok(())
            }
            Err(err) => {
                self.state = VoteState::Idle;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Replaces the snapshot with a freshly fetched authoritative poll.
    /// The fetch always wins: the overlay is discarded, never summed in.
    pub fn apply_authoritative(&mut self, poll: Poll) {
        self.base = poll;
        self.overlay = None;
    }
}
