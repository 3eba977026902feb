use async_trait::async_trait;

use crate::api::{
    AnalyzeRequest, HealthStatus, MoodAnalysis, MoodEntry, Playlist, RegisterRequest,
    TokenResponse, User, WeeklySummary,
};
use crate::error::MoodError;

/// Remote MoodBoard service.
///
/// Every method taking `token` fails with [`MoodError::AuthRequired`] when it
/// is `None`, without touching the network.
#[async_trait]
pub trait MoodService: Send + Sync {
    /// Stateless analysis; nothing is stored server-side.
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<MoodAnalysis, MoodError>;

    /// Analysis that is also saved to the user's history.
    async fn analyze_and_save(
        &self,
        token: Option<&str>,
        request: &AnalyzeRequest,
    ) -> Result<MoodAnalysis, MoodError>;

    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, MoodError>;

    async fn register(&self, request: &RegisterRequest) -> Result<User, MoodError>;

    async fn current_user(&self, token: Option<&str>) -> Result<User, MoodError>;

    async fn logout(&self, token: Option<&str>) -> Result<(), MoodError>;

    async fn list_entries(&self, token: Option<&str>) -> Result<Vec<MoodEntry>, MoodError>;

    async fn delete_entry(&self, token: Option<&str>, entry_id: i64) -> Result<(), MoodError>;

    async fn entry_playlist(
        &self,
        token: Option<&str>,
        entry_id: i64,
    ) -> Result<Playlist, MoodError>;

    async fn weekly_summary(&self, token: Option<&str>) -> Result<WeeklySummary, MoodError>;

    async fn health(&self) -> Result<HealthStatus, MoodError>;
}
