mod commands;
mod error;
mod gateway;
mod identity;
mod models;
mod session;
mod share;
mod tasks;
mod views;

use std::sync::Arc;

use clap::Parser;
use log::error;

use commands::Cli;
use error::PollError;
use gateway::{HttpGateway, MemoryGateway, PollGateway};
use identity::{EnvIdentity, IdentityProvider, StaticIdentity};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    // Offline mode runs signed-in against the seeded in-memory backend so
    // every command works without a server or credentials.
    let identity: Arc<dyn IdentityProvider> = if cli.offline {
        Arc::new(StaticIdentity::signed_in("local_user"))
    } else {
        Arc::new(EnvIdentity::from_env())
    };

    let gateway: Arc<dyn PollGateway> = if cli.offline {
        Arc::new(MemoryGateway::seeded(Arc::clone(&identity)))
    } else {
        match HttpGateway::new(&cli.backend, Arc::clone(&identity)) {
            Ok(gateway) => Arc::new(gateway),
            Err(e) => {
                error!("Failed to initialize backend gateway: {e}");
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = commands::run(cli, gateway, identity).await {
        error!("{e}");
        if matches!(e, PollError::Unauthorized) {
            error!("Set LIVEPOLL_USER and LIVEPOLL_TOKEN to authenticate.");
        }
        std::process::exit(1);
    }
}
