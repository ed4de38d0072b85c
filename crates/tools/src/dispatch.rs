//! Tool dispatch: from a raw invocation to a [`ToolResult`].

use std::time::Duration;

use browserd_core::{Error, Result};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::schema::{self, ToolArgs};
use crate::session::{BrowserSession, Tab};
use crate::{capture, interaction, navigation, utility};
use crate::{Content, ToolRegistry, ToolResult};

/// Operations that act on the active tab. One variant per tool; the
/// `(tab, args)` calling contract is fixed by construction, so a handler
/// with the wrong shape cannot be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOp {
    Navigate,
    NavigateBack,
    NavigateForward,
    Click,
    TypeText,
    Fill,
    SelectOption,
    Screenshot,
    ScreenshotPages,
    GetText,
    GetHtml,
    ConsoleMessages,
    Wait,
    Reload,
    Scroll,
    Evaluate,
}

impl PageOp {
    pub async fn execute(&self, tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
        match self {
            PageOp::Navigate => navigation::navigate(tab, args).await,
            PageOp::NavigateBack => navigation::navigate_back(tab).await,
            PageOp::NavigateForward => navigation::navigate_forward(tab).await,
            PageOp::Click => interaction::click(tab, args).await,
            PageOp::TypeText => interaction::type_text(tab, args).await,
            PageOp::Fill => interaction::fill(tab, args).await,
            PageOp::SelectOption => interaction::select_option(tab, args).await,
            PageOp::Screenshot => capture::screenshot(tab, args).await,
            PageOp::ScreenshotPages => capture::screenshot_pages(tab, args).await,
            PageOp::GetText => capture::get_text(tab, args).await,
            PageOp::GetHtml => capture::get_html(tab, args).await,
            PageOp::ConsoleMessages => capture::console_messages(tab).await,
            PageOp::Wait => utility::wait(tab, args).await,
            PageOp::Reload => utility::reload(tab).await,
            PageOp::Scroll => utility::scroll(tab, args).await,
            PageOp::Evaluate => utility::evaluate(tab, args).await,
        }
    }

    /// Ops that enforce their own deadline (sleeps and condition polls) are
    /// not additionally bounded by the dispatcher.
    fn self_bounded(&self) -> bool {
        matches!(self, PageOp::Wait)
    }
}

/// Operations that act on the session itself (tab management).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOp {
    TabNew,
    TabClose,
    TabList,
    TabSwitch,
}

impl SessionOp {
    pub async fn execute(
        &self,
        session: &mut BrowserSession,
        args: &ToolArgs,
    ) -> Result<Vec<Content>> {
        match self {
            SessionOp::TabNew => utility::tab_new(session, args).await,
            SessionOp::TabClose => utility::tab_close(session, args).await,
            SessionOp::TabList => utility::tab_list(session).await,
            SessionOp::TabSwitch => utility::tab_switch(session, args).await,
        }
    }
}

/// The closed set of tool handlers.
#[derive(Debug)]
pub enum ToolHandler {
    Page(PageOp),
    Session(SessionOp),
}

/// Routes validated invocations to their operations. Owns the session; one
/// invocation runs at a time.
pub struct Dispatcher {
    registry: ToolRegistry,
    session: Mutex<BrowserSession>,
    default_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, session: BrowserSession) -> Self {
        let default_timeout = session.config().default_timeout();
        Self {
            registry,
            session: Mutex::new(session),
            default_timeout,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool invocation. Always yields a [`ToolResult`]; failures are
    /// structured, never panics or raw errors.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> ToolResult {
        match self.try_dispatch(name, arguments).await {
            Ok(content) => ToolResult::Success(content),
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                ToolResult::from(e)
            }
        }
    }

    async fn try_dispatch(&self, name: &str, arguments: &Value) -> Result<Vec<Content>> {
        let descriptor = self.registry.resolve(name)?;
        // Validation happens before the session is touched, so a bad call
        // never launches a browser.
        let args = schema::validate(descriptor.args, arguments)?;

        let mut session = self.session.lock().await;
        session.ensure_session().await?;
        debug!(tool = name, "executing tool");

        match &descriptor.handler {
            ToolHandler::Session(op) => op.execute(&mut session, &args).await,
            ToolHandler::Page(op) => {
                let tab = session.active_tab()?;
                if op.self_bounded() {
                    op.execute(tab, &args).await
                } else {
                    let budget =
                        Duration::from_millis(args.u64_or(
                            "timeout",
                            self.default_timeout.as_millis() as u64,
                        ));
                    tokio::time::timeout(budget, op.execute(tab, &args))
                        .await
                        .map_err(|_| {
                            Error::Timeout(format!(
                                "'{name}' exceeded {}ms",
                                budget.as_millis()
                            ))
                        })?
                }
            }
        }
    }

    /// Close the session. Used on server shutdown; idempotent.
    pub async fn shutdown(&self) -> Result<()> {
        self.session.lock().await.shutdown().await
    }
}
