use std::{io::ErrorKind, path::PathBuf};

use anyhow::{bail, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::{DateTime, Utc};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

use super::jsonl;

/// An authenticated context identifying the current user.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// Contract of the external auth provider: account creation, credential
/// sign-in, session retrieval and teardown. Session state is observed through
/// an explicit subscription instead of an ambient global.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Registers a new account. The account still has to be confirmed before
    /// first use, so no session is produced here.
    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    async fn current_session(&self) -> Result<Option<Session>>;

    async fn sign_out(&self) -> Result<()>;

    /// Session-change notifications for the lifetime of this process.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

const PBKDF2_ITERATIONS: u32 = 200_000;

#[derive(Serialize, Deserialize)]
struct AccountRecord {
    id: Uuid,
    email: String,
    salt: String,
    derived_key: String,
    created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    user_id: Uuid,
    email: String,
    signed_in_at: DateTime<Utc>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Session {
            user_id: stored.user_id,
            email: stored.email,
        }
    }
}

/// File-backed stand-in for the managed auth service. Accounts live in a
/// JSON-lines file, the active session in a single JSON file, both under the
/// auth directory. Passwords are stored as PBKDF2-HMAC-SHA256 derived keys
/// with a per-account salt.
pub struct LocalAuthGateway {
    auth_dir: PathBuf,
    sessions: watch::Sender<Option<Session>>,
}

impl LocalAuthGateway {
    pub fn new(auth_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&auth_dir)?;

        let initial = match std::fs::read_to_string(auth_dir.join("session.json")) {
            Ok(contents) => match serde_json::from_str::<StoredSession>(&contents) {
                Ok(stored) => Some(stored.into()),
                Err(e) => {
                    warn!("Stored session was corrupted, treating as signed out: {e}");
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let (sessions, _) = watch::channel(initial);

        Ok(Self { auth_dir, sessions })
    }

    fn accounts_path(&self) -> PathBuf {
        self.auth_dir.join("accounts.json")
    }

    fn session_path(&self) -> PathBuf {
        self.auth_dir.join("session.json")
    }
}

#[async_trait]
impl AuthGateway for LocalAuthGateway {
    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let email = email.trim().to_ascii_lowercase();
        if email.is_empty() || password.is_empty() {
            bail!("Email and password are required");
        }

        let salt = Uuid::new_v4().into_bytes();
        let key = derive_key(password, &salt, PBKDF2_ITERATIONS);
        let account = AccountRecord {
            id: Uuid::new_v4(),
            email: email.clone(),
            salt: B64.encode(salt),
            derived_key: B64.encode(key),
            created_at: Utc::now(),
        };

        jsonl::rewrite(
            &self.accounts_path(),
            |mut accounts: Vec<AccountRecord>| {
                if accounts.iter().any(|a| a.email == email) {
                    bail!("User already registered");
                }
                accounts.push(account);
                Ok(accounts)
            },
        )
        .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_ascii_lowercase();
        let accounts: Vec<AccountRecord> = jsonl::read_all(&self.accounts_path()).await?;

        let Some(account) = accounts.into_iter().find(|a| a.email == email) else {
            bail!("Invalid login credentials");
        };
        let salt = B64.decode(&account.salt)?;
        let key = derive_key(password, &salt, PBKDF2_ITERATIONS);
        if B64.encode(key) != account.derived_key {
            bail!("Invalid login credentials");
        }

        let session = Session {
            user_id: account.id,
            email: account.email,
        };
        let stored = StoredSession {
            user_id: session.user_id,
            email: session.email.clone(),
            signed_in_at: Utc::now(),
        };
        tokio::fs::write(self.session_path(), serde_json::to_vec(&stored)?).await?;
        self.sessions.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        match tokio::fs::read_to_string(self.session_path()).await {
            Ok(contents) => match serde_json::from_str::<StoredSession>(&contents) {
                Ok(stored) => Ok(Some(stored.into())),
                // A failed lookup is identical to "no session"
                Err(e) => {
                    warn!("Stored session was corrupted, treating as signed out: {e}");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        match tokio::fs::remove_file(self.session_path()).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.sessions.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}
