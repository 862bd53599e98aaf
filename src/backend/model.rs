use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Value of the body's `status` field that marks application-level success.
pub const SUCCESS_MARKER: &str = "success";

/// Shown when the backend could not be reached at all.
pub const UNREACHABLE: &str = "Could not reach the server.";
/// Shown when the response body is missing or not a JSON object.
pub const MALFORMED: &str = "Unexpected response from the server.";

/// A mutating call against the account API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    CreateServer { server_id: String },
    DeleteServer,
    ResetServerCode,
    ResetAccessCode,
}

impl BackendRequest {
    pub const fn path(&self) -> &'static str {
        match self {
            Self::CreateServer { .. } => "/api/create_server",
            Self::DeleteServer => "/api/delete_server",
            Self::ResetServerCode => "/api/reset_server_code",
            Self::ResetAccessCode => "/api/reset_key",
        }
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            Self::CreateServer { server_id } => Some(json!({ "server_id": server_id })),
            _ => None,
        }
    }

    /// Message used when the backend fails without saying why.
    pub fn fallback_message(&self, status: StatusCode) -> String {
        match self {
            Self::CreateServer { .. } => format!("HTTP {}", status.as_u16()),
            Self::DeleteServer => "Unknown error".to_string(),
            Self::ResetServerCode => "Failed to reset".to_string(),
            Self::ResetAccessCode => "Error resetting code.".to_string(),
        }
    }

    pub const fn describe(&self) -> &'static str {
        match self {
            Self::CreateServer { .. } => "create server",
            Self::DeleteServer => "remove server",
            Self::ResetServerCode => "reset server code",
            Self::ResetAccessCode => "reset access code",
        }
    }
}

/// Decoded body of a successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// A one-time credential. Absent and empty values are both `None`.
    pub fn secret(&self, key: &str) -> Option<&str> {
        self.str(key).filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResult {
    Success(Payload),
    Failure(String),
}

impl BackendResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Classify an HTTP response.
///
/// Success needs both a 2xx status and `status == "success"` in the body.
/// `body` is `None` when the response was not valid JSON.
pub fn classify(
    status: StatusCode,
    body: Option<Value>,
    request: &BackendRequest,
) -> BackendResult {
    let Some(Value::Object(map)) = body else {
        return BackendResult::Failure(MALFORMED.to_string());
    };

    let marked = map.get("status").and_then(Value::as_str) == Some(SUCCESS_MARKER);
    if status.is_success() && marked {
        return BackendResult::Success(Payload(map));
    }

    let message = map
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map_or_else(|| request.fallback_message(status), str::to_string);
    BackendResult::Failure(message)
}

/// Labeled numeric series drawn on the analytics page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyticsSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl AnalyticsSeries {
    /// Chart points, truncated to the shorter of the two sequences.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .take(self.labels.len())
            .enumerate()
            .map(|(i, v)| (f64::from(u32::try_from(i).unwrap_or(u32::MAX)), *v))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len().min(self.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_value(&self) -> f64 {
        self.points().iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }
}

/// Account summary shown in the header and on the pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Account {
    pub username: String,
    pub owned_server: Option<String>,
    pub premium_user: bool,
    pub total_modern_auth_players: u64,
    pub total_players: u64,
    pub quota_percent: u8,
}

impl Account {
    /// Share of players authenticating through the service, in percent.
    pub fn adoption_percent(&self) -> u16 {
        if self.total_players == 0 {
            return 0;
        }
        let percent = self.total_modern_auth_players.saturating_mul(100) / self.total_players;
        u16::try_from(percent.min(100)).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> BackendRequest {
        BackendRequest::CreateServer {
            server_id: "test-box".into(),
        }
    }

    #[test]
    fn test_success_needs_status_and_marker() {
        let body = json!({
            "status": "success",
            "owned_server": "test-box",
            "secret_key": "abc123",
        });
        let BackendResult::Success(payload) =
            classify(StatusCode::OK, Some(body.clone()), &create())
        else {
            panic!("expected success");
        };
        assert_eq!(payload.str("secret_key"), Some("abc123"));

        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, Some(body), &create()),
            BackendResult::Failure("HTTP 500".into())
        );
    }

    #[test]
    fn test_app_failure_uses_message_verbatim() {
        let body = json!({"status": "error", "message": "id taken"});
        assert_eq!(
            classify(StatusCode::OK, Some(body), &create()),
            BackendResult::Failure("id taken".into())
        );
    }

    #[test]
    fn test_missing_marker_falls_back_per_request() {
        let body = json!({"owned_server": "test-box"});
        assert_eq!(
            classify(StatusCode::OK, Some(body.clone()), &create()),
            BackendResult::Failure("HTTP 200".into())
        );
        assert_eq!(
            classify(StatusCode::OK, Some(body.clone()), &BackendRequest::DeleteServer),
            BackendResult::Failure("Unknown error".into())
        );
        assert_eq!(
            classify(StatusCode::OK, Some(body), &BackendRequest::ResetServerCode),
            BackendResult::Failure("Failed to reset".into())
        );
    }

    #[test]
    fn test_malformed_body() {
        assert_eq!(
            classify(StatusCode::OK, None, &BackendRequest::DeleteServer),
            BackendResult::Failure(MALFORMED.into())
        );
        assert_eq!(
            classify(StatusCode::OK, Some(json!(["success"])), &BackendRequest::DeleteServer),
            BackendResult::Failure(MALFORMED.into())
        );
    }

    #[test]
    fn test_marker_must_be_exact() {
        let body = json!({"status": "Success"});
        assert!(!classify(StatusCode::OK, Some(body), &BackendRequest::DeleteServer).is_success());
    }

    #[test]
    fn test_series_truncates_to_shorter() {
        let series = AnalyticsSeries {
            labels: vec!["Jan 01".into(), "Jan 02".into(), "Jan 03".into()],
            values: vec![10.0, 42.0],
        };
        assert_eq!(series.points(), vec![(0.0, 10.0), (1.0, 42.0)]);
        assert_eq!(series.len(), 2);
        assert!((series.max_value() - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_account_defaults_and_adoption() {
        let account: Account = serde_json::from_value(json!({
            "username": "steve",
            "total_modern_auth_players": 278,
            "total_players": 750
        }))
        .unwrap();
        assert_eq!(account.owned_server, None);
        assert_eq!(account.quota_percent, 0);
        assert_eq!(account.adoption_percent(), 37);
        assert_eq!(Account::default().adoption_percent(), 0);
    }

    #[test]
    fn test_account_reads_quota() {
        let account: Account = serde_json::from_value(json!({
            "username": "steve",
            "owned_server": "test-box",
            "premium_user": true,
            "quota_percent": 42
        }))
        .unwrap();
        assert_eq!(account.quota_percent, 42);
        assert!(account.premium_user);
    }
}
