use std::env;

/// An authenticated caller: the identity string that goes into
/// `creator_id` plus the bearer token attached to write requests.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub token: String,
}

/// Identity collaborator contract. Must be callable at any time without
/// blocking; `None` means the caller is unauthenticated and writes are
/// rejected before they reach the backend.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Reads the identity from `LIVEPOLL_USER` and `LIVEPOLL_TOKEN`, resolved
/// once at startup after dotenv has run.
pub struct EnvIdentity {
    identity: Option<Identity>,
}

impl EnvIdentity {
    pub fn from_env() -> Self {
        let identity = match (env::var("LIVEPOLL_USER"), env::var("LIVEPOLL_TOKEN")) {
            (Ok(user_id), Ok(token)) if !user_id.is_empty() && !token.is_empty() => {
                Some(Identity { user_id, token })
            }
            _ => None,
        };
        Self { identity }
    }
}

impl IdentityProvider for EnvIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

/// Fixed identity, used by offline mode and tests.
pub struct StaticIdentity(pub Option<Identity>);

impl StaticIdentity {
    pub fn signed_in(user_id: &str) -> Self {
        Self(Some(Identity {
            user_id: user_id.to_string(),
            token: format!("token-{user_id}"),
        }))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}
