use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{Value, json};

use crate::error::PollError;
use crate::gateway::{PollGateway, normalize};
use crate::identity::IdentityProvider;
use crate::models::{Poll, PollDraft};

const CONNECT_TIMEOUT_SECONDS: u64 = 10;

/// Gateway over the remote poll backend's REST surface.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpGateway {
    pub fn new(base_url: &str, identity: Arc<dyn IdentityProvider>) -> Result<Self, PollError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
        })
    }

    /// Builds a request with the session token attached when the caller is
    /// signed in. Reads go through unauthenticated.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(identity) = self.identity.current_identity() {
            builder = builder.bearer_auth(identity.token);
        }
        builder
    }
}

fn checked(response: Response, what: &str) -> Result<Response, PollError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(PollError::Unauthorized),
        StatusCode::NOT_FOUND => Err(PollError::NotFound(what.to_string())),
        status => Err(PollError::Transport(format!(
            "backend returned {status} for {what}"
        ))),
    }
}

#[async_trait]
impl PollGateway for HttpGateway {
    async fn list_polls(&self) -> Result<Vec<Poll>, PollError> {
        let response = self.request(Method::GET, "/polls").send().await?;
        let value: Value = checked(response, "poll list")?.json().await?;
        normalize::polls_from_value(&value)
    }

    async fn get_poll(&self, poll_id: &str) -> Result<Poll, PollError> {
        let response = self
            .request(Method::GET, &format!("/polls/{poll_id}"))
            .send()
            .await?;
        let value: Value = checked(response, &format!("poll '{poll_id}'"))?
            .json()
            .await?;
        normalize::poll_from_value(&value)
    }

    async fn create_poll(&self, draft: &PollDraft) -> Result<Poll, PollError> {
        let response = self
            .request(Method::POST, "/polls")
            .json(&json!({
                "title": draft.title,
                "choices": draft.choices,
            }))
            .send()
            .await?;
        let value: Value = checked(response, "poll creation")?.json().await?;
        normalize::poll_from_value(&value)
    }

    async fn cast_vote(&self, poll_id: &str, choice_id: &str) -> Result<(), PollError> {
        let response = self
            .request(Method::POST, &format!("/polls/{poll_id}/vote"))
            .json(&json!({ "choiceId": choice_id }))
            .send()
            .await?;
        // Acknowledgement only; the new tally is observed by re-fetching.
        checked(response, &format!("vote on poll '{poll_id}'"))?;
        Ok(())
    }
}
