//! Session command - issues a session token from the command line
//!
//! Stands in for the identity provider's sign-in during development. With
//! in-memory storage the server must seed the same email through
//! `auth.dev_user_email` for the token to resolve.

use anyhow::Context;
use clap::Args;

use crate::infrastructure::auth::{SessionConfig, SessionTokenService, SessionTokens};
use crate::infrastructure::storage::{StorageConfig, StorageFactory};

#[derive(Args, Clone)]
pub struct SessionArgs {
    /// Email of the user to sign in
    #[arg(long)]
    pub email: String,

    /// Display name stored on first sign-in
    #[arg(long)]
    pub name: Option<String>,
}

pub async fn run(args: SessionArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let secret = config
        .auth
        .session_secret
        .as_deref()
        .context("SESSION_SECRET is not set; cannot sign session tokens")?;

    let storage = StorageConfig::resolve(
        config.storage.backend,
        config.storage.database_url.clone(),
        config.storage.max_connections,
        config.storage.run_migrations,
    );
    let repositories = StorageFactory::create(&storage).await?;

    let mut user = crate::seed_user(repositories.users.as_ref(), &args.email).await?;
    if user.name().is_none() {
        if let Some(name) = args.name {
            user = repositories.users.upsert(user.with_name(name)).await?;
        }
    }

    let sessions = SessionTokenService::new(SessionConfig::new(secret, config.auth.session_ttl_hours));
    println!("{}", sessions.issue(&user)?);

    Ok(())
}
