use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{TokenResponse, User};
use crate::error::MoodError;

/// Bearer token and cached profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

impl From<TokenResponse> for StoredSession {
    fn from(resp: TokenResponse) -> Self {
        Self {
            access_token: resp.access_token,
            token_type: resp.token_type,
            user: resp.user,
        }
    }
}

impl StoredSession {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        token_expiry(&self.access_token)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_token_expired(&self.access_token, now)
    }
}

/// Where the session lives between runs.
///
/// `load` never fails: unreadable or corrupted data is cleared and reported
/// as logged out.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<StoredSession>;
    fn save(&self, session: &StoredSession) -> Result<(), MoodError>;
    fn clear(&self) -> Result<(), MoodError>;
}

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<StoredSession> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Unreadable session file");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Corrupted session data, clearing");
                if let Err(e) = self.clear() {
                    tracing::warn!(error = %e, "Failed to remove corrupted session");
                }
                None
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), MoodError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), MoodError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<StoredSession> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), MoodError> {
        if let Ok(mut slot) = self.session.lock() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), MoodError> {
        if let Ok(mut slot) = self.session.lock() {
            *slot = None;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT. The signature is not checked; the
/// server stays authoritative.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Tokens without a readable expiry count as expired.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    token_expiry(token).map_or(true, |exp| exp <= now)
}

/// Client-side domain policy, checked before any credentials are sent.
pub fn validate_email_domain(email: &str, domain: &str) -> Result<(), MoodError> {
    let email = email.trim().to_ascii_lowercase();
    let suffix = format!("@{}", domain.trim_start_matches('@').to_ascii_lowercase());
    let local_len = email.len().saturating_sub(suffix.len());

    if email.ends_with(&suffix) && local_len > 0 {
        Ok(())
    } else {
        Err(MoodError::EmailDomain {
            domain: domain.trim_start_matches('@').to_string(),
        })
    }
}
