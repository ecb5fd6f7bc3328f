use serde::{Deserialize, Serialize};

use crate::error::PollError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub title: String,
    pub creator_id: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
    pub count: u64,
}

impl Poll {
    /// Total votes cast, always derived from the choice tallies.
    pub fn total_votes(&self) -> u64 {
        self.choices.iter().map(|c| c.count).sum()
    }

    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

impl Choice {
    /// Share of the total as a percentage, 0.0 when no votes were cast.
    pub fn percentage(&self, total_votes: u64) -> f64 {
        if total_votes == 0 {
            0.0
        } else {
            self.count as f64 / total_votes as f64 * 100.0
        }
    }
}

/// A validated create request. Construction is the single gate that keeps
/// invalid drafts off the network: blank choice entries are dropped, the
/// survivors and the title are trimmed.
#[derive(Debug, Clone, Serialize)]
pub struct PollDraft {
    pub title: String,
    pub choices: Vec<String>,
}

impl PollDraft {
    pub fn new(
        title: &str,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, PollError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PollError::Validation("poll title is required".to_string()));
        }

        let choices: Vec<String> = choices
            .into_iter()
            .map(|c| c.into().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if choices.len() < 2 {
            return Err(PollError::Validation(
                "poll must have at least two choices".to_string(),
            ));
        }

        Ok(Self {
            title: title.to_string(),
            choices,
        })
    }
}
