//! Wire models for login and error bodies

use serde::{Deserialize, Serialize};

use crate::config::Credentials;

/// Body of `POST Login`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    #[serde(rename = "CompanyDB")]
    pub company_db: String,
    pub user_name: String,
    pub password: String,
    pub language: i32,
}

impl From<Credentials> for LoginRequest {
    fn from(credentials: Credentials) -> Self {
        Self {
            company_db: credentials.company_db,
            user_name: credentials.user_name,
            password: credentials.password,
            language: credentials.language,
        }
    }
}

/// Body returned by a successful login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResponse {
    pub session_id: String,
    /// Minutes of inactivity before the session expires
    pub session_timeout: i64,
    #[serde(default)]
    pub version: Option<String>,
}

impl LoginResponse {
    /// Wire field names, used for case-insensitive decoding
    pub const FIELDS: &'static [&'static str] = &["SessionId", "SessionTimeout", "Version"];
}

/// Structured error body of a non-2xx response
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: ErrorMessage,
}

/// v2 sends the code as a string, v1 as a number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

/// v2 sends a plain message, v1 wraps it with its language
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    Localized { lang: Option<String>, value: String },
}

impl ErrorCode {
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

impl ErrorMessage {
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Localized { value, .. } => value,
        }
    }
}

impl ErrorResponse {
    /// Parse an error body, `None` when it does not have the expected shape
    pub fn parse(body: &str) -> Option<(String, String)> {
        let response: ErrorResponse = serde_json::from_str(body).ok()?;
        Some((
            response.error.code.into_string(),
            response.error.message.into_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_wire_names() {
        let request = LoginRequest::from(Credentials {
            company_db: "SBODEMO".to_string(),
            user_name: "manager".to_string(),
            password: "secret".to_string(),
            language: 25,
        });
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "CompanyDB": "SBODEMO",
                "UserName": "manager",
                "Password": "secret",
                "Language": 25,
            })
        );
    }

    #[test]
    fn test_parse_v2_error() {
        let body = r#"{"error":{"code":"-10","message":"Invalid item code"}}"#;
        assert_eq!(
            ErrorResponse::parse(body),
            Some(("-10".to_string(), "Invalid item code".to_string()))
        );
    }

    #[test]
    fn test_parse_v1_error() {
        let body = r#"{"error":{"code":-5002,"message":{"lang":"en-us","value":"Bad value"}}}"#;
        assert_eq!(
            ErrorResponse::parse(body),
            Some(("-5002".to_string(), "Bad value".to_string()))
        );
    }

    #[test]
    fn test_parse_malformed_error() {
        assert_eq!(ErrorResponse::parse("<html>Gateway Timeout</html>"), None);
        assert_eq!(ErrorResponse::parse(r#"{"message":"nope"}"#), None);
    }
}
