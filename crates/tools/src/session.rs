//! Browser session and tab lifecycle.

use browserd_core::{Error, Result, SessionConfig};
use browserd_engine::cdp::CdpLauncher;
use browserd_engine::{Engine, EngineLauncher, EnginePage};
use serde::Serialize;
use tracing::{debug, info, warn};

/// One open tab. Owns its engine page exclusively.
pub struct Tab {
    id: String,
    /// Creation-order index, used to promote the most recently created tab
    /// when the active one closes.
    index: u64,
    page: Box<dyn EnginePage>,
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Tab {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn page(&self) -> &dyn EnginePage {
        self.page.as_ref()
    }
}

/// Snapshot of a tab for listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TabInfo {
    pub id: String,
    pub title: String,
    pub url: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Closed,
}

/// The tab/session registry: at most one engine, any number of tabs, at most
/// one of them active. The engine is launched lazily on first use.
pub struct BrowserSession {
    config: SessionConfig,
    launcher: Box<dyn EngineLauncher>,
    engine: Option<Box<dyn Engine>>,
    tabs: Vec<Tab>,
    active: Option<String>,
    next_tab_id: u64,
    state: SessionState,
}

impl BrowserSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_launcher(config, Box::new(CdpLauncher))
    }

    /// Construct with an injected launcher. Tests use this to run against
    /// an in-memory engine.
    pub fn with_launcher(config: SessionConfig, launcher: Box<dyn EngineLauncher>) -> Self {
        Self {
            config,
            launcher,
            engine: None,
            tabs: Vec::new(),
            active: None,
            next_tab_id: 0,
            state: SessionState::Uninitialized,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Launch the engine and open the first tab if not done yet. Idempotent
    /// once the session is ready.
    pub async fn ensure_session(&mut self) -> Result<()> {
        match self.state {
            SessionState::Ready => return Ok(()),
            SessionState::Closed => {
                return Err(Error::Launch("session is closed".to_string()));
            }
            SessionState::Uninitialized => {}
        }
        if self.engine.is_none() {
            let engine = self.launcher.launch(&self.config).await.map_err(|e| match e {
                err @ Error::Launch(_) => err,
                other => Error::Launch(other.to_string()),
            })?;
            self.engine = Some(engine);
        }
        self.state = SessionState::Ready;
        if self.tabs.is_empty() {
            self.create_tab().await?;
        }
        info!(tab = ?self.active, "browser session ready");
        Ok(())
    }

    fn engine(&self) -> Result<&dyn Engine> {
        match (&self.state, &self.engine) {
            (SessionState::Ready, Some(engine)) => Ok(engine.as_ref()),
            _ => Err(Error::Internal("engine used before session launch".to_string())),
        }
    }

    async fn create_tab(&mut self) -> Result<String> {
        let page = self.engine()?.new_page().await?;
        self.next_tab_id += 1;
        let index = self.next_tab_id;
        let id = format!("tab_{index}");
        self.tabs.push(Tab {
            id: id.clone(),
            index,
            page,
        });
        self.active = Some(id.clone());
        debug!(tab = %id, tabs = self.tabs.len(), "opened tab");
        Ok(id)
    }

    /// Open a new tab, make it active, and optionally navigate it.
    pub async fn open_tab(&mut self, url: Option<&str>) -> Result<String> {
        let id = self.create_tab().await?;
        if let Some(url) = url {
            self.active_tab()?.page().navigate(url).await?;
        }
        Ok(id)
    }

    /// Close a tab by id. Closing the active tab promotes the most recently
    /// created remaining tab; closing the last tab leaves the session ready
    /// with no active tab.
    pub async fn close_tab(&mut self, id: &str) -> Result<()> {
        let position = self
            .tabs
            .iter()
            .position(|tab| tab.id == id)
            .ok_or_else(|| Error::UnknownTab(id.to_string()))?;
        let tab = self.tabs.remove(position);
        if let Err(e) = tab.page.close().await {
            warn!(tab = %id, error = %e, "page close failed");
        }
        if self.active.as_deref() == Some(id) {
            self.active = self
                .tabs
                .iter()
                .max_by_key(|tab| tab.index)
                .map(|tab| tab.id.clone());
        }
        debug!(tab = %id, active = ?self.active, tabs = self.tabs.len(), "closed tab");
        Ok(())
    }

    /// Make a tab active. Idempotent for the already-active tab.
    pub async fn switch_to(&mut self, id: &str) -> Result<()> {
        let tab = self
            .tabs
            .iter()
            .find(|tab| tab.id == id)
            .ok_or_else(|| Error::UnknownTab(id.to_string()))?;
        tab.page.bring_to_front().await?;
        self.active = Some(id.to_string());
        debug!(tab = %id, "switched tab");
        Ok(())
    }

    pub fn active_tab(&self) -> Result<&Tab> {
        let id = self.active.as_deref().ok_or(Error::NoActiveTab)?;
        self.tabs
            .iter()
            .find(|tab| tab.id == id)
            .ok_or(Error::NoActiveTab)
    }

    /// Tabs in creation order.
    pub async fn list_tabs(&self) -> Vec<TabInfo> {
        let mut infos = Vec::with_capacity(self.tabs.len());
        for tab in &self.tabs {
            let title = tab.page.title().await.unwrap_or_default();
            let url = tab.page.url().await.unwrap_or_default();
            infos.push(TabInfo {
                id: tab.id.clone(),
                title,
                url,
                active: self.active.as_deref() == Some(tab.id.as_str()),
            });
        }
        infos
    }

    /// Close all tabs and the engine. Idempotent; close failures are logged
    /// and do not block the transition.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        for tab in self.tabs.drain(..) {
            if let Err(e) = tab.page.close().await {
                warn!(tab = %tab.id, error = %e, "page close failed during shutdown");
            }
        }
        self.active = None;
        if let Some(mut engine) = self.engine.take() {
            if let Err(e) = engine.close().await {
                warn!(error = %e, "engine close failed during shutdown");
            }
        }
        self.state = SessionState::Closed;
        info!("browser session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLauncher;

    fn session() -> (BrowserSession, crate::testing::FakeHandle) {
        let (launcher, handle) = FakeLauncher::new();
        (
            BrowserSession::with_launcher(SessionConfig::default(), Box::new(launcher)),
            handle,
        )
    }

    #[tokio::test]
    async fn ensure_session_is_lazy_and_idempotent() {
        let (mut s, handle) = session();
        assert_eq!(s.state(), SessionState::Uninitialized);
        assert!(!handle.launched());

        s.ensure_session().await.unwrap();
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.tab_count(), 1);
        assert_eq!(s.active_tab_id(), Some("tab_1"));

        s.ensure_session().await.unwrap();
        assert_eq!(s.tab_count(), 1);
        assert_eq!(handle.pages_created(), 1);
    }

    #[tokio::test]
    async fn launch_failure_surfaces_and_leaves_session_uninitialized() {
        let (launcher, handle) = FakeLauncher::new();
        handle.fail_launch("no browser installed");
        let mut s =
            BrowserSession::with_launcher(SessionConfig::default(), Box::new(launcher));
        let err = s.ensure_session().await.unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
        assert_eq!(s.state(), SessionState::Uninitialized);
        assert_eq!(s.tab_count(), 0);
    }

    #[tokio::test]
    async fn tab_ids_are_never_reused() {
        let (mut s, _handle) = session();
        s.ensure_session().await.unwrap();
        let second = s.open_tab(None).await.unwrap();
        assert_eq!(second, "tab_2");
        s.close_tab("tab_2").await.unwrap();
        let third = s.open_tab(None).await.unwrap();
        assert_eq!(third, "tab_3");
    }

    #[tokio::test]
    async fn open_tab_becomes_active_and_navigates() {
        let (mut s, handle) = session();
        s.ensure_session().await.unwrap();
        let id = s.open_tab(Some("https://example.com")).await.unwrap();
        assert_eq!(s.active_tab_id(), Some(id.as_str()));
        assert_eq!(
            handle.page(1).navigations(),
            vec!["https://example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn closing_active_tab_promotes_most_recently_created() {
        let (mut s, _handle) = session();
        s.ensure_session().await.unwrap();
        s.open_tab(None).await.unwrap(); // tab_2
        s.open_tab(None).await.unwrap(); // tab_3
        s.switch_to("tab_2").await.unwrap();

        s.close_tab("tab_2").await.unwrap();
        assert_eq!(s.active_tab_id(), Some("tab_3"));
    }

    #[tokio::test]
    async fn closing_inactive_tab_keeps_active_pointer() {
        let (mut s, _handle) = session();
        s.ensure_session().await.unwrap();
        s.open_tab(None).await.unwrap(); // tab_2, active
        s.close_tab("tab_1").await.unwrap();
        assert_eq!(s.active_tab_id(), Some("tab_2"));
    }

    #[tokio::test]
    async fn closing_last_tab_leaves_ready_session_without_active_tab() {
        let (mut s, handle) = session();
        s.ensure_session().await.unwrap();
        s.close_tab("tab_1").await.unwrap();

        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.tab_count(), 0);
        assert!(s.active_tab_id().is_none());
        assert!(matches!(s.active_tab().unwrap_err(), Error::NoActiveTab));
        // No replacement tab was created behind our back.
        assert_eq!(handle.pages_created(), 1);

        let id = s.open_tab(None).await.unwrap();
        assert_eq!(s.active_tab_id(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn close_unknown_tab_fails() {
        let (mut s, _handle) = session();
        s.ensure_session().await.unwrap();
        let err = s.close_tab("tab_99").await.unwrap_err();
        assert!(matches!(err, Error::UnknownTab(_)));
        assert_eq!(s.tab_count(), 1);
    }

    #[tokio::test]
    async fn switch_is_idempotent_and_validates_id() {
        let (mut s, _handle) = session();
        s.ensure_session().await.unwrap();
        s.switch_to("tab_1").await.unwrap();
        s.switch_to("tab_1").await.unwrap();
        assert_eq!(s.active_tab_id(), Some("tab_1"));
        assert!(matches!(
            s.switch_to("tab_9").await.unwrap_err(),
            Error::UnknownTab(_)
        ));
    }

    #[tokio::test]
    async fn list_tabs_reports_creation_order_and_active_flag() {
        let (mut s, handle) = session();
        s.ensure_session().await.unwrap();
        s.open_tab(None).await.unwrap();
        handle.page(0).set_title("first");
        handle.page(1).set_title("second");

        let infos = s.list_tabs().await;
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, "tab_1");
        assert_eq!(infos[0].title, "first");
        assert!(!infos[0].active);
        assert_eq!(infos[1].id, "tab_2");
        assert!(infos[1].active);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_closes_everything() {
        let (mut s, handle) = session();
        s.ensure_session().await.unwrap();
        s.open_tab(None).await.unwrap();

        s.shutdown().await.unwrap();
        assert_eq!(s.state(), SessionState::Closed);
        assert_eq!(s.tab_count(), 0);
        assert!(s.active_tab_id().is_none());
        assert!(handle.page(0).closed());
        assert!(handle.page(1).closed());
        assert!(handle.engine_closed());

        s.shutdown().await.unwrap();
        assert_eq!(s.state(), SessionState::Closed);
    }
}
