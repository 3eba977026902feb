use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::{
    AnalyzeRequest, HealthStatus, MoodAnalysis, MoodEntry, MoodService, Playlist,
    RegisterRequest, TokenResponse, User, WeeklySummary,
};
use crate::error::MoodError;

const ANALYZE_PATH: &str = "/api/moods/analyze";
const ENTRIES_PATH: &str = "/api/moods/entries";
const WEEKLY_SUMMARY_PATH: &str = "/api/moods/summary/weekly";
const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const ME_PATH: &str = "/api/auth/me";
const LOGOUT_PATH: &str = "/api/auth/logout";
const HEALTH_PATH: &str = "/health";

pub struct MoodboardClient {
    base_url: String,
    http: reqwest::Client,
}

/// FastAPI error body.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn require_token(token: Option<&str>) -> Result<&str, MoodError> {
    token.filter(|t| !t.is_empty()).ok_or(MoodError::AuthRequired)
}

impl MoodboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, MoodError> {
        tracing::debug!(operation, "API request started");
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "API request failed to send");
            MoodError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(operation, status = status.as_u16(), "API request successful");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(operation, status = status.as_u16(), %message, "API request rejected");

        if status == StatusCode::UNAUTHORIZED && operation != "login" {
            return Err(MoodError::Unauthorized(message));
        }
        Err(MoodError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, MoodError> {
        let response = self.send(request, operation).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Prefer the server's `detail`, otherwise a generic message.
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| match b.detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });

    detail.unwrap_or_else(|| match status.canonical_reason() {
        Some(reason) => format!("Request failed ({} {})", status.as_u16(), reason),
        None => format!("Request failed ({})", status.as_u16()),
    })
}

#[async_trait]
impl MoodService for MoodboardClient {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<MoodAnalysis, MoodError> {
        let req = self.http.post(self.url(ANALYZE_PATH)).json(request);
        self.send_json(req, "analyze").await
    }

    async fn analyze_and_save(
        &self,
        token: Option<&str>,
        request: &AnalyzeRequest,
    ) -> Result<MoodAnalysis, MoodError> {
        let token = require_token(token)?;
        let req = self
            .http
            .post(self.url(ENTRIES_PATH))
            .bearer_auth(token)
            .json(request);
        self.send_json(req, "analyze_and_save").await
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, MoodError> {
        let params = [("username", email), ("password", password)];
        let req = self.http.post(self.url(LOGIN_PATH)).form(&params);
        self.send_json(req, "login").await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<User, MoodError> {
        let req = self.http.post(self.url(REGISTER_PATH)).json(request);
        self.send_json(req, "register").await
    }

    async fn current_user(&self, token: Option<&str>) -> Result<User, MoodError> {
        let token = require_token(token)?;
        let req = self.http.get(self.url(ME_PATH)).bearer_auth(token);
        self.send_json(req, "current_user").await
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), MoodError> {
        let token = require_token(token)?;
        let req = self.http.post(self.url(LOGOUT_PATH)).bearer_auth(token);
        self.send(req, "logout").await.map(|_| ())
    }

    async fn list_entries(&self, token: Option<&str>) -> Result<Vec<MoodEntry>, MoodError> {
        let token = require_token(token)?;
        let req = self.http.get(self.url(ENTRIES_PATH)).bearer_auth(token);
        self.send_json(req, "list_entries").await
    }

    async fn delete_entry(&self, token: Option<&str>, entry_id: i64) -> Result<(), MoodError> {
        let token = require_token(token)?;
        let url = format!("{}/{}", self.url(ENTRIES_PATH), entry_id);
        let req = self.http.delete(url).bearer_auth(token);
        self.send(req, "delete_entry").await.map(|_| ())
    }

    async fn entry_playlist(
        &self,
        token: Option<&str>,
        entry_id: i64,
    ) -> Result<Playlist, MoodError> {
        let token = require_token(token)?;
        let url = format!("{}/{}/playlist", self.url(ENTRIES_PATH), entry_id);
        let req = self.http.get(url).bearer_auth(token);
        self.send_json(req, "entry_playlist").await
    }

    async fn weekly_summary(&self, token: Option<&str>) -> Result<WeeklySummary, MoodError> {
        let token = require_token(token)?;
        let req = self
            .http
            .get(self.url(WEEKLY_SUMMARY_PATH))
            .bearer_auth(token);
        self.send_json(req, "weekly_summary").await
    }

    async fn health(&self) -> Result<HealthStatus, MoodError> {
        let req = self.http.get(self.url(HEALTH_PATH));
        self.send_json(req, "health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port; reaching the network would yield
    // a transport error instead of AuthRequired.
    fn offline_client() -> MoodboardClient {
        MoodboardClient::new("http://127.0.0.1:9/")
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = offline_client();
        assert_eq!(client.url(ENTRIES_PATH), "http://127.0.0.1:9/api/moods/entries");
    }

    #[tokio::test]
    async fn history_without_token_fails_before_request() {
        let client = offline_client();
        let err = client.list_entries(None).await.unwrap_err();
        assert!(matches!(err, MoodError::AuthRequired));
    }

    #[tokio::test]
    async fn authenticated_calls_reject_empty_token() {
        let client = offline_client();
        let request = AnalyzeRequest::new("a long enough entry", true);

        assert!(matches!(
            client.analyze_and_save(Some(""), &request).await,
            Err(MoodError::AuthRequired)
        ));
        assert!(matches!(
            client.delete_entry(None, 3).await,
            Err(MoodError::AuthRequired)
        ));
        assert!(matches!(
            client.entry_playlist(None, 3).await,
            Err(MoodError::AuthRequired)
        ));
        assert!(matches!(
            client.weekly_summary(None).await,
            Err(MoodError::AuthRequired)
        ));
    }

    #[test]
    fn error_message_prefers_server_detail() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Text must be at least 3 characters long"}"#,
        );
        assert_eq!(msg, "Text must be at least 3 characters long");
    }

    #[test]
    fn error_message_falls_back_to_status() {
        let msg = error_message(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(msg, "Request failed (502 Bad Gateway)");
    }

    #[test]
    fn validation_detail_list_is_rendered() {
        let msg = error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","text"],"msg":"field required"}]}"#,
        );
        assert!(msg.contains("field required"));
    }
}
