mod poll;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::error::PollError;
use crate::gateway::PollGateway;
use crate::identity::IdentityProvider;

#[derive(Parser)]
#[command(name = "livepoll", about = "Create, share and watch live polls")]
pub struct Cli {
    /// Base URL of the poll backend
    #[arg(long, default_value = "http://localhost:3000")]
    pub backend: String,

    /// Origin used when printing share links
    #[arg(long, default_value = "http://localhost:3000")]
    pub origin: String,

    /// Run against a seeded in-memory backend instead of HTTP
    #[arg(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all polls
    List,
    /// Create a new poll
    Create {
        #[arg(long)]
        title: String,
        /// Repeat for each choice (at least two)
        #[arg(long = "choice")]
        choices: Vec<String>,
    },
    /// Cast a single vote and show the updated tallies
    Vote { poll_id: String, choice_id: String },
    /// Open a live-updating view of one poll
    Watch {
        poll_id: String,
        /// Submit this choice once the poll has loaded
        #[arg(long)]
        vote: Option<String>,
    },
    /// Print share links for a poll
    Share { poll_id: String },
}

pub async fn run(
    cli: Cli,
    gateway: Arc<dyn PollGateway>,
    identity: Arc<dyn IdentityProvider>,
) -> Result<(), PollError> {
    match cli.command {
        Command::List => poll::list(gateway.as_ref()).await,
        Command::Create { title, choices } => {
            poll::create(gateway.as_ref(), &cli.origin, &title, choices).await
        }
        Command::Vote { poll_id, choice_id } => {
            poll::vote(gateway.as_ref(), &poll_id, &choice_id).await
        }
        Command::Watch { poll_id, vote } => {
            poll::watch(gateway, identity, &poll_id, vote.as_deref()).await
        }
        Command::Share { poll_id } => poll::share(gateway.as_ref(), &cli.origin, &poll_id).await,
    }
}
