use anyhow::{bail, Result};
use tracing::warn;

use crate::provider::{
    auth::{AuthGateway, Session},
    entities::UserEntity,
    store::RecordStore,
};

/// Gate for the private commands: resolves the current session once and
/// treats a failed lookup identically to "no session".
pub async fn require_session(auth: &impl AuthGateway) -> Result<Session> {
    match auth.current_session().await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => bail!("No active session. Sign in with `tsumiage signin` first."),
        Err(e) => {
            warn!("Session lookup failed, treating as signed out: {e:?}");
            bail!("No active session. Sign in with `tsumiage signin` first.")
        }
    }
}

pub async fn sign_up(auth: &impl AuthGateway, email: &str, password: &str) -> Result<()> {
    auth.sign_up(email, password).await?;
    println!("Account created. Check your email to confirm it, then sign in with `tsumiage signin`.");
    Ok(())
}

pub async fn sign_in(
    auth: &impl AuthGateway,
    store: impl RecordStore,
    email: &str,
    password: &str,
) -> Result<()> {
    let session = auth.sign_in(email, password).await?;
    ensure_user_record(&store, &session).await?;
    println!("Signed in as {}", session.email);
    Ok(())
}

/// Lazily inserts the `users` record matching the auth account. Check then
/// insert, so repeated sign-ins stay idempotent.
pub async fn ensure_user_record(store: &impl RecordStore, session: &Session) -> Result<()> {
    if store.get_user(session.user_id).await?.is_none() {
        store
            .insert_user(UserEntity {
                id: session.user_id,
                email: session.email.clone(),
                goal_day: None,
            })
            .await?;
    }
    Ok(())
}

pub async fn sign_out(auth: &impl AuthGateway) -> Result<()> {
    auth.sign_out().await?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(auth: &impl AuthGateway, store: impl RecordStore) -> Result<()> {
    let session = require_session(auth).await?;
    println!("{} ({})", session.email, session.user_id);
    match store
        .get_user(session.user_id)
        .await?
        .and_then(|user| user.goal_day)
    {
        Some(goal) => println!("Today's goal: {goal}"),
        None => println!("Today's goal: not set"),
    }
    Ok(())
}

pub async fn set_goal(
    auth: &impl AuthGateway,
    store: impl RecordStore,
    text: Option<String>,
    clear: bool,
) -> Result<()> {
    let session = require_session(auth).await?;

    let goal = if clear {
        None
    } else {
        let goal = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if goal.is_none() {
            bail!("Provide the goal text, or pass --clear to remove it");
        }
        goal
    };

    ensure_user_record(&store, &session).await?;
    store.set_user_goal(session.user_id, goal.clone()).await?;
    match goal {
        Some(goal) => println!("Today's goal set: {goal}"),
        None => println!("Today's goal cleared."),
    }
    Ok(())
}
