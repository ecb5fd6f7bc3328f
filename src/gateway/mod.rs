mod http;
mod memory;
mod normalize;

pub use http::HttpGateway;
pub use memory::MemoryGateway;

use async_trait::async_trait;

use crate::error::PollError;
use crate::models::{Poll, PollDraft};

/// Typed operations against the poll persistence backend.
///
/// The backend exclusively owns the authoritative tallies. `cast_vote`
/// returns no tally payload; callers re-fetch to observe the new count.
#[async_trait]
pub trait PollGateway: Send + Sync {
    /// All polls, in whatever order the backend provides.
    async fn list_polls(&self) -> Result<Vec<Poll>, PollError>;

    async fn get_poll(&self, poll_id: &str) -> Result<Poll, PollError>;

    /// The backend assigns the poll and choice ids; the returned poll is
    /// fully materialized with every count at 0.
    async fn create_poll(&self, draft: &PollDraft) -> Result<Poll, PollError>;

    /// Requests incrementing one choice tally by one. Acknowledgement only.
    async fn cast_vote(&self, poll_id: &str, choice_id: &str) -> Result<(), PollError>;
}
