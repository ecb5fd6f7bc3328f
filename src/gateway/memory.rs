use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::PollError;
use crate::gateway::PollGateway;
use crate::identity::{Identity, IdentityProvider};
use crate::models::{Choice, Poll, PollDraft};

/// In-memory poll store with the same surface as the remote backend.
///
/// Backs the CLI's offline mode and stands in for the network in tests.
/// Votes contend on the store lock only; there is no durable state.
pub struct MemoryGateway {
    polls: Mutex<Vec<Poll>>,
    identity: Arc<dyn IdentityProvider>,
}

impl MemoryGateway {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            polls: Mutex::new(Vec::new()),
            identity,
        }
    }

    /// Store preloaded with a couple of polls that already carry votes.
    pub fn seeded(identity: Arc<dyn IdentityProvider>) -> Self {
        fn choice(id: &str, text: &str, count: u64) -> Choice {
            Choice {
                id: id.to_string(),
                text: text.to_string(),
                count,
            }
        }

        let gateway = Self::new(identity);
        {
            let mut polls = gateway.polls.lock().expect("poll store lock poisoned");
            polls.push(Poll {
                id: "1".to_string(),
                title: "What is your favorite programming language?".to_string(),
                creator_id: "user_123".to_string(),
                choices: vec![
                    choice("c1", "JavaScript", 5),
                    choice("c2", "Python", 10),
                    choice("c3", "Rust", 3),
                ],
            });
            polls.push(Poll {
                id: "2".to_string(),
                title: "Dark mode or light mode?".to_string(),
                creator_id: "user_456".to_string(),
                choices: vec![
                    choice("c4", "Dark Mode", 15),
                    choice("c5", "Light Mode", 2),
                ],
            });
        }
        gateway
    }

    fn require_identity(&self) -> Result<Identity, PollError> {
        self.identity.current_identity().ok_or(PollError::Unauthorized)
    }
}

#[async_trait]
impl PollGateway for MemoryGateway {
    async fn list_polls(&self) -> Result<Vec<Poll>, PollError> {
        Ok(self.polls.lock().expect("poll store lock poisoned").clone())
    }

    async fn get_poll(&self, poll_id: &str) -> Result<Poll, PollError> {
        self.polls
            .lock()
            .expect("poll store lock poisoned")
            .iter()
            .find(|p| p.id == poll_id)
            .cloned()
            .ok_or_else(|| PollError::NotFound(format!("poll '{poll_id}'")))
    }

    async fn create_poll(&self, draft: &PollDraft) -> Result<Poll, PollError> {
        let identity = self.require_identity()?;

        let poll = Poll {
            id: format!("poll_{}", Utc::now().timestamp_millis()),
            title: draft.title.clone(),
            creator_id: identity.user_id,
            choices: draft
                .choices
                .iter()
                .map(|text| Choice {
                    id: Uuid::new_v4().to_string(),
                    text: text.clone(),
                    count: 0,
                })
                .collect(),
        };

        let mut polls = self.polls.lock().expect("poll store lock poisoned");
        polls.insert(0, poll.clone());
        Ok(poll)
    }

    async fn cast_vote(&self, poll_id: &str, choice_id: &str) -> Result<(), PollError> {
        self.require_identity()?;

        let mut polls = self.polls.lock().expect("poll store lock poisoned");
        let poll = polls
            .iter_mut()
            .find(|p| p.id == poll_id)
            .ok_or_else(|| PollError::NotFound(format!("poll '{poll_id}'")))?;
        let choice = poll
            .choices
            .iter_mut()
            .find(|c| c.id == choice_id)
            .ok_or_else(|| PollError::NotFound(format!("choice '{choice_id}'")))?;

        choice.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentity;

    fn signed_in() -> MemoryGateway {
        MemoryGateway::seeded(Arc::new(StaticIdentity::signed_in("user_9")))
    }

    #[tokio::test]
    async fn list_returns_all_polls() {
        let gateway = signed_in();
        let polls = gateway.list_polls().await.unwrap();
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0].total_votes(), 18);
        assert_eq!(polls[1].total_votes(), 17);
    }

    #[tokio::test]
    async fn get_missing_poll_is_not_found() {
        let gateway = signed_in();
        let err = gateway.get_poll("missing").await.unwrap_err();
        assert!(matches!(err, PollError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_assigns_ids_and_zero_counts() {
        let gateway = signed_in();
        let draft = PollDraft::new("Lunch?", ["Pizza", "Salad"]).unwrap();
        let poll = gateway.create_poll(&draft).await.unwrap();

        assert!(poll.id.starts_with("poll_"));
        assert_eq!(poll.creator_id, "user_9");
        assert_eq!(poll.choices.len(), 2);
        assert!(poll.choices.iter().all(|c| c.count == 0));
        assert_ne!(poll.choices[0].id, poll.choices[1].id);

        // The created poll is immediately fetchable.
        let fetched = gateway.get_poll(&poll.id).await.unwrap();
        assert_eq!(fetched.title, "Lunch?");
    }

    #[tokio::test]
    async fn vote_then_fetch_observes_the_increment() {
        let gateway = signed_in();
        let before = gateway.get_poll("1").await.unwrap();
        let pre = before.choice("c3").unwrap().count;

        gateway.cast_vote("1", "c3").await.unwrap();

        let after = gateway.get_poll("1").await.unwrap();
        assert_eq!(after.choice("c3").unwrap().count, pre + 1);
        // Only the targeted choice moved.
        assert_eq!(after.choice("c1").unwrap().count, 5);
        assert_eq!(after.total_votes(), before.total_votes() + 1);
    }

    #[tokio::test]
    async fn vote_on_unknown_ids_is_not_found() {
        let gateway = signed_in();
        assert!(matches!(
            gateway.cast_vote("missing", "c1").await.unwrap_err(),
            PollError::NotFound(_)
        ));
        assert!(matches!(
            gateway.cast_vote("1", "nope").await.unwrap_err(),
            PollError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn writes_require_identity() {
        let gateway = MemoryGateway::seeded(Arc::new(StaticIdentity::anonymous()));

        let err = gateway.cast_vote("1", "c1").await.unwrap_err();
        assert!(matches!(err, PollError::Unauthorized));

        let draft = PollDraft::new("Lunch?", ["Pizza", "Salad"]).unwrap();
        let err = gateway.create_poll(&draft).await.unwrap_err();
        assert!(matches!(err, PollError::Unauthorized));

        // Reads stay open and the store is untouched.
        let polls = gateway.list_polls().await.unwrap();
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0].choice("c1").unwrap().count, 5);
    }
}
