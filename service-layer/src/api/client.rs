//! Session-aware request execution
//!
//! [`SessionManager`] owns the authenticated session and is the single path
//! every request goes through. Before dispatch it makes sure a valid session
//! exists, logging in when the session is absent or expired, then injects the
//! session cookie into the outgoing request and maps failures into
//! [`Error`].
//!
//! A manager is meant to be used sequentially by one logical unit of work.
//! The session check and the login that may follow it are not serialized,
//! so overlapping calls can each decide to log in.

use arc_swap::ArcSwapOption;
use chrono::Utc;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::constants::{LOGIN_PATH, LOGOUT_PATH, ROUTE_COOKIE, SESSION_COOKIE};
use super::json;
use super::models::{ErrorResponse, LoginRequest, LoginResponse};
use super::session::{Session, SessionState, find_cookie};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::config::ContextOptions;
use crate::error::{Error, Result};

/// Owns the session of one Service Layer context
pub struct SessionManager {
    options: ContextOptions,
    transport: Arc<dyn HttpTransport>,
    session: ArcSwapOption<Session>,
    authenticating: AtomicBool,
}

/// Marks a login in progress for as long as it is alive
struct AuthenticatingGuard<'a>(&'a AtomicBool);

impl<'a> AuthenticatingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for AuthenticatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionManager {
    /// Create a manager backed by a `reqwest` transport
    pub fn new(options: ContextOptions) -> Result<Self> {
        let options = options.normalized()?;
        let transport = Arc::new(ReqwestTransport::new(&options)?);
        Ok(Self::from_parts(options, transport))
    }

    /// Create a manager over a custom transport
    pub fn with_transport(
        options: ContextOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        Ok(Self::from_parts(options.normalized()?, transport))
    }

    fn from_parts(options: ContextOptions, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            options,
            transport,
            session: ArcSwapOption::empty(),
            authenticating: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Current session, if any, whether or not it has expired
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.load_full()
    }

    /// Replace the stored session, e.g. to resume one obtained elsewhere
    pub fn restore_session(&self, session: Session) {
        self.session.store(Some(Arc::new(session)));
    }

    pub fn state(&self) -> SessionState {
        if self.authenticating.load(Ordering::Acquire) {
            return SessionState::Authenticating;
        }
        match &*self.session.load() {
            None => SessionState::Unauthenticated,
            Some(session) if session.is_expired() => SessionState::Expired,
            Some(_) => SessionState::Authenticated,
        }
    }

    fn needs_login(&self) -> bool {
        matches!(
            self.state(),
            SessionState::Unauthenticated | SessionState::Expired
        )
    }

    /// Dispatch a request with a valid session, logging in first if needed
    pub async fn execute(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if self.needs_login() {
            self.login(false, cancel).await?;
        }

        let session = self.session.load_full();
        self.dispatch(request, session.as_deref(), cancel).await
    }

    /// Execute and decode the body, matching `names` case-insensitively
    pub async fn execute_json<T, N>(
        &self,
        request: HttpRequest,
        names: &[N],
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        N: AsRef<str>,
    {
        let response = self.execute(request, cancel).await?;
        json::decode(&response.body, names)
    }

    /// Log in, unless a valid session exists and `force` is false.
    ///
    /// Credentials are validated before anything is sent. A rejection by the
    /// API surfaces as [`Error::Authentication`]; a missing `Login` endpoint
    /// means the base URL is wrong and surfaces as [`Error::Configuration`].
    pub async fn login(&self, force: bool, cancel: &CancellationToken) -> Result<()> {
        if !force && self.state() == SessionState::Authenticated {
            return Ok(());
        }

        let credentials = self.options.credentials()?;
        let company = credentials.company_db.clone();
        let body = serde_json::to_value(LoginRequest::from(credentials))?;

        let _guard = AuthenticatingGuard::enter(&self.authenticating);
        info!("Logging into Service Layer company {}", company);

        let response = self
            .dispatch(HttpRequest::post(LOGIN_PATH).with_json(body), None, cancel)
            .await
            .map_err(|error| into_login_error(error, &self.options.base_url))?;

        let login: LoginResponse = json::decode(&response.body, LoginResponse::FIELDS)?;
        let cookies: Vec<&str> = response.header_values("set-cookie").collect();
        let id = find_cookie(cookies.iter().copied(), SESSION_COOKIE).unwrap_or(login.session_id);
        let route_id = find_cookie(cookies.iter().copied(), ROUTE_COOKIE);

        let session = Session::new(id, login.session_timeout, Utc::now()).with_route_id(route_id);
        debug!(
            "Session established, expires at {}",
            session.expires_at().to_rfc3339()
        );
        self.session.store(Some(Arc::new(session)));

        Ok(())
    }

    /// End the session on the server if one is live, then forget it.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn logout(&self, cancel: &CancellationToken) {
        let Some(session) = self.session.swap(None) else {
            return;
        };
        if session.is_expired() {
            debug!("Dropping expired session without calling Logout");
            return;
        }

        match self
            .dispatch(HttpRequest::post(LOGOUT_PATH), Some(session.as_ref()), cancel)
            .await
        {
            Ok(_) => info!("Logged out of Service Layer"),
            Err(e) => warn!("Logout failed, session discarded locally: {}", e),
        }
    }

    async fn dispatch(
        &self,
        mut request: HttpRequest,
        session: Option<&Session>,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        if let Some(session) = session {
            request
                .headers
                .push(("Cookie".to_string(), session.cookie_header()));
        }

        let method = request.method.clone();
        let path = request.path.clone();
        let started = Instant::now();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("{} {} cancelled", method, path);
                return Err(Error::Cancelled);
            }
            result = self.transport.send(request) => result.map_err(Error::Transport)?,
        };

        debug!(
            "{} {} -> {} ({} ms)",
            method,
            path,
            response.status,
            started.elapsed().as_millis()
        );

        if response.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(&response))
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.options.base_url)
            .field("state", &self.state())
            .finish()
    }
}

/// Map a non-2xx response into an error.
///
/// The structured `{error: {code, message}}` body is preferred; otherwise the
/// raw body becomes the message and the HTTP status the code.
pub fn error_from_response(response: &HttpResponse) -> Error {
    let parsed = ErrorResponse::parse(&response.body);
    if parsed.is_none() {
        warn!(
            "Service Layer returned HTTP {} without a structured error body",
            response.status
        );
    }

    if response.status == 404 {
        let message = parsed
            .map(|(_, message)| message)
            .unwrap_or_else(|| response.body.clone());
        return Error::NotFound { message };
    }

    match parsed {
        Some((code, message)) => Error::Api {
            status: response.status,
            code,
            message,
        },
        None => Error::Api {
            status: response.status,
            code: response.status.to_string(),
            message: response.body.clone(),
        },
    }
}

fn into_login_error(error: Error, base_url: &str) -> Error {
    match error {
        Error::Api { code, message, .. } => Error::Authentication { code, message },
        Error::NotFound { message } => Error::configuration(format!(
            "no Login endpoint under {}, check the base URL ({})",
            base_url, message
        )),
        other => other,
    }
}
