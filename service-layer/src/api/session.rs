//! Authenticated session value

use chrono::{DateTime, Duration, Utc};

use super::constants::{LOGIN_SKEW_SECS, ROUTE_COOKIE, SESSION_COOKIE};

/// A Service Layer session.
///
/// Replaced wholesale on every successful login and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub timeout_minutes: i64,
    pub last_login_at: DateTime<Utc>,
    /// Load-balancer route cookie, when the deployment sets one
    pub route_id: Option<String>,
}

/// Where the session manager stands in its login cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expired,
}

impl Session {
    /// Session stamped at `logged_in_at` plus the skew guard
    pub fn new(id: impl Into<String>, timeout_minutes: i64, logged_in_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timeout_minutes,
            last_login_at: logged_in_at + Duration::seconds(LOGIN_SKEW_SECS),
            route_id: None,
        }
    }

    pub fn with_route_id(mut self, route_id: Option<String>) -> Self {
        self.route_id = route_id;
        self
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.last_login_at + Duration::minutes(self.timeout_minutes)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// `Cookie` header value that authenticates a request
    pub fn cookie_header(&self) -> String {
        match &self.route_id {
            Some(route) => format!(
                "{}={}; {}={}",
                SESSION_COOKIE, self.id, ROUTE_COOKIE, route
            ),
            None => format!("{}={}", SESSION_COOKIE, self.id),
        }
    }
}

/// Extract a cookie value from `Set-Cookie` header values
pub fn find_cookie<'a>(set_cookies: impl IntoIterator<Item = &'a str>, name: &str) -> Option<String> {
    set_cookies.into_iter().find_map(|header| {
        let pair = header.split(';').next()?.trim();
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}
