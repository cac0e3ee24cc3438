//! Recording transport used by the unit tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::config::ContextOptions;
use crate::error::BoxError;

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync>;

pub(crate) struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Answer every request with `handler`
    pub(crate) fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// Answer `Login` and `Logout` successfully, everything else with `handler`
    pub(crate) fn with_login(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::new(move |request| match request.path.as_str() {
            "Login" => Ok(login_ok()),
            "Logout" => Ok(HttpResponse::new(204, "")),
            _ => handler(request),
        })
    }

    /// Delay every response; only valid before the transport is shared
    pub(crate) fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        let mut inner = Arc::try_unwrap(self).unwrap_or_else(|_| panic!("transport already shared"));
        inner.delay = Some(delay);
        Arc::new(inner)
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub(crate) fn login_count(&self) -> usize {
        self.requests().iter().filter(|r| r.path == "Login").count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }
}

/// Successful login response with session and route cookies
pub(crate) fn login_ok() -> HttpResponse {
    HttpResponse::new(
        200,
        r#"{"odata.metadata":"$metadata#B1Sessions/@Element","SessionId":"sess-1","Version":"1000191","SessionTimeout":30}"#,
    )
    .with_header("Set-Cookie", "B1SESSION=sess-1; path=/b1s; secure; HttpOnly")
    .with_header("Set-Cookie", "ROUTEID=.node0; path=/b1s")
}

pub(crate) fn options() -> ContextOptions {
    ContextOptions::builder("https://sap.local:50000/b1s/v2")
        .company_db("SBODEMO")
        .user_name("manager")
        .password("secret")
        .build()
}
