//! Entry point tying a session manager to typed resource sets

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::client::SessionManager;
use super::metadata::Entity;
use super::session::{Session, SessionState};
use super::set::ResourceSet;
use super::transport::HttpTransport;
use crate::config::ContextOptions;
use crate::error::Result;

/// A connection to one Service Layer company database.
///
/// Cloning is cheap; clones share the same session.
#[derive(Debug, Clone)]
pub struct ServiceLayerContext {
    manager: Arc<SessionManager>,
}

impl ServiceLayerContext {
    pub fn new(options: ContextOptions) -> Result<Self> {
        Ok(Self {
            manager: Arc::new(SessionManager::new(options)?),
        })
    }

    pub fn with_transport(options: ContextOptions, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Ok(Self {
            manager: Arc::new(SessionManager::with_transport(options, transport)?),
        })
    }

    /// Resource set for `T` under its default resource name
    pub fn set<T: Entity>(&self) -> ResourceSet<T> {
        ResourceSet::new(Arc::clone(&self.manager), T::resource_name())
    }

    /// Resource set for `T` under an explicit resource name
    pub fn set_named<T: Entity>(&self, resource: &str) -> ResourceSet<T> {
        ResourceSet::new(Arc::clone(&self.manager), resource)
    }

    /// Log in unless a valid session already exists
    pub async fn login(&self, cancel: &CancellationToken) -> Result<()> {
        self.manager.login(false, cancel).await
    }

    pub async fn force_login(&self, cancel: &CancellationToken) -> Result<()> {
        self.manager.login(true, cancel).await
    }

    pub async fn logout(&self, cancel: &CancellationToken) {
        self.manager.logout(cancel).await
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.manager.session()
    }

    pub fn state(&self) -> SessionState {
        self.manager.state()
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }
}
