use chrono::Utc;

use crate::api::{
    AnalyzeRequest, MoodAnalysis, MoodEntry, MoodService, Playlist, RegisterRequest, User,
    WeeklySummary,
};
use crate::error::MoodError;
use crate::state::journal::{Journal, JournalEntry};
use crate::state::session::{validate_email_domain, SessionStore, StoredSession};

pub const MIN_ENTRY_CHARS: usize = 3;

/// Ties the remote service, the stored session and this run's journal
/// together.
pub struct App<S: MoodService, T: SessionStore> {
    service: S,
    sessions: T,
    allowed_domain: String,
    journal: Journal,
}

impl<S: MoodService, T: SessionStore> App<S, T> {
    pub fn new(service: S, sessions: T, allowed_domain: impl Into<String>) -> Self {
        Self {
            service,
            sessions,
            allowed_domain: allowed_domain.into(),
            journal: Journal::default(),
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Stored session, unless the token has expired (then it is cleared).
    pub fn session(&self) -> Option<StoredSession> {
        let session = self.sessions.load()?;
        if session.is_expired(Utc::now()) {
            tracing::info!(user = %session.user.username, "Stored token expired, logging out");
            self.drop_session();
            return None;
        }
        Some(session)
    }

    fn token(&self) -> Option<String> {
        self.session().map(|s| s.access_token)
    }

    fn drop_session(&self) {
        if let Err(e) = self.sessions.clear() {
            tracing::warn!(error = %e, "Failed to clear session");
        }
    }

    /// Clears the local session when the server rejects the token.
    fn check_auth<R>(&self, result: Result<R, MoodError>) -> Result<R, MoodError> {
        if let Err(MoodError::Unauthorized(_)) = &result {
            self.drop_session();
        }
        result
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, MoodError> {
        validate_email_domain(email, &self.allowed_domain)?;
        if password.is_empty() {
            return Err(MoodError::InvalidInput("Password must not be empty".into()));
        }

        let response = self.service.login(email.trim(), password).await?;
        let session = StoredSession::from(response);
        self.sessions.save(&session)?;
        tracing::info!(user = %session.user.username, "Logged in");
        Ok(session.user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, MoodError> {
        validate_email_domain(&request.email, &self.allowed_domain)?;
        if request.username.trim().is_empty() {
            return Err(MoodError::InvalidInput("Username must not be empty".into()));
        }
        self.service.register(&request).await
    }

    /// Always forgets the local session, even if the server call fails.
    pub async fn logout(&self) -> Result<(), MoodError> {
        let token = self.sessions.load().map(|s| s.access_token);
        if let Some(token) = token.as_deref() {
            if let Err(e) = self.service.logout(Some(token)).await {
                tracing::warn!(error = %e, "Server logout failed");
            }
        }
        self.sessions.clear()
    }

    pub async fn whoami(&self) -> Result<User, MoodError> {
        let token = self.token();
        let result = self.service.current_user(token.as_deref()).await;
        self.check_auth(result)
    }

    /// Saved to history when logged in, otherwise analysed anonymously. A
    /// rejected token falls back to the anonymous call.
    pub async fn analyze(
        &mut self,
        text: &str,
        include_music: bool,
    ) -> Result<MoodAnalysis, MoodError> {
        let text = text.trim();
        if text.chars().count() < MIN_ENTRY_CHARS {
            return Err(MoodError::InvalidInput(format!(
                "Text must be at least {} characters long",
                MIN_ENTRY_CHARS
            )));
        }

        let request = AnalyzeRequest::new(text, include_music);
        let (analysis, saved) = match self.token() {
            Some(token) => match self
                .service
                .analyze_and_save(Some(token.as_str()), &request)
                .await
            {
                Err(MoodError::Unauthorized(message)) => {
                    tracing::info!(%message, "Token rejected, analysing without saving");
                    self.drop_session();
                    (self.service.analyze(&request).await?, false)
                }
                result => (result?, true),
            },
            None => (self.service.analyze(&request).await?, false),
        };

        self.journal
            .push(JournalEntry::new(text.to_string(), analysis.clone(), saved));
        Ok(analysis)
    }

    pub async fn history(&self) -> Result<Vec<MoodEntry>, MoodError> {
        let token = self.token();
        let result = self.service.list_entries(token.as_deref()).await;
        self.check_auth(result)
    }

    pub async fn delete_entry(&self, entry_id: i64) -> Result<(), MoodError> {
        let token = self.token();
        let result = self.service.delete_entry(token.as_deref(), entry_id).await;
        self.check_auth(result)
    }

    pub async fn saved_playlist(&self, entry_id: i64) -> Result<Playlist, MoodError> {
        let token = self.token();
        let result = self.service.entry_playlist(token.as_deref(), entry_id).await;
        self.check_auth(result)
    }

    pub async fn weekly_summary(&self) -> Result<WeeklySummary, MoodError> {
        let token = self.token();
        let result = self.service.weekly_summary(token.as_deref()).await;
        self.check_auth(result)
    }
}
