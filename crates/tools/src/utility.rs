//! Utility tools: waiting, scrolling, script evaluation, tab management.

use std::time::Duration;

use browserd_core::{Error, Result};
use serde_json::Value;

use crate::dispatch::{PageOp, SessionOp, ToolHandler};
use crate::registry::ToolDescriptor;
use crate::schema::{ArgDefault, ArgKind, ArgSpec, ToolArgs};
use crate::session::{BrowserSession, Tab};
use crate::Content;

pub(crate) fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "browser_wait",
            description: "Wait for a fixed time, an element, or text to appear",
            args: &[
                ArgSpec {
                    name: "time",
                    kind: ArgKind::Number,
                    required: false,
                    default: None,
                    description: "Seconds to wait",
                },
                ArgSpec {
                    name: "selector",
                    kind: ArgKind::String,
                    required: false,
                    default: None,
                    description: "CSS selector to wait for",
                },
                ArgSpec {
                    name: "text",
                    kind: ArgKind::String,
                    required: false,
                    default: None,
                    description: "Text to wait for",
                },
                ArgSpec {
                    name: "timeout",
                    kind: ArgKind::Integer,
                    required: false,
                    default: Some(ArgDefault::Int(30_000)),
                    description: "Timeout for condition waits, in milliseconds",
                },
            ],
            handler: ToolHandler::Page(PageOp::Wait),
        },
        ToolDescriptor {
            name: "browser_reload",
            description: "Reload the current page",
            args: &[],
            handler: ToolHandler::Page(PageOp::Reload),
        },
        ToolDescriptor {
            name: "browser_scroll",
            description: "Scroll the page",
            args: &[
                ArgSpec {
                    name: "direction",
                    kind: ArgKind::Enum(&["up", "down", "left", "right"]),
                    required: true,
                    default: None,
                    description: "Scroll direction",
                },
                ArgSpec {
                    name: "amount",
                    kind: ArgKind::Integer,
                    required: false,
                    default: Some(ArgDefault::Int(500)),
                    description: "Scroll distance in pixels",
                },
            ],
            handler: ToolHandler::Page(PageOp::Scroll),
        },
        ToolDescriptor {
            name: "browser_evaluate",
            description: "Evaluate JavaScript on the page and return the result",
            args: &[ArgSpec {
                name: "code",
                kind: ArgKind::String,
                required: true,
                default: None,
                description: "JavaScript to evaluate",
            }],
            handler: ToolHandler::Page(PageOp::Evaluate),
        },
        ToolDescriptor {
            name: "browser_tab_new",
            description: "Open a new tab and make it active",
            args: &[ArgSpec {
                name: "url",
                kind: ArgKind::String,
                required: false,
                default: None,
                description: "URL to open in the new tab",
            }],
            handler: ToolHandler::Session(SessionOp::TabNew),
        },
        ToolDescriptor {
            name: "browser_tab_close",
            description: "Close a tab",
            args: &[ArgSpec {
                name: "tab_id",
                kind: ArgKind::String,
                required: false,
                default: None,
                description: "Tab to close (the active tab if omitted)",
            }],
            handler: ToolHandler::Session(SessionOp::TabClose),
        },
        ToolDescriptor {
            name: "browser_tab_list",
            description: "List open tabs",
            args: &[],
            handler: ToolHandler::Session(SessionOp::TabList),
        },
        ToolDescriptor {
            name: "browser_tab_switch",
            description: "Switch to another tab",
            args: &[ArgSpec {
                name: "tab_id",
                kind: ArgKind::String,
                required: true,
                default: None,
                description: "Tab to activate",
            }],
            handler: ToolHandler::Session(SessionOp::TabSwitch),
        },
    ]
}

pub(crate) async fn wait(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let timeout = Duration::from_millis(args.u64_or("timeout", 30_000));
    if let Some(seconds) = args.opt_f64("time") {
        tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0))).await;
        return Ok(vec![Content::text(format!("Waited {seconds} second(s)"))]);
    }
    if let Some(selector) = args.opt_str("selector") {
        tab.page().wait_for_selector(selector, timeout).await?;
        return Ok(vec![Content::text(format!(
            "Element appeared: {selector}"
        ))]);
    }
    if let Some(text) = args.opt_str("text") {
        tab.page().wait_for_text(text, timeout).await?;
        return Ok(vec![Content::text(format!("Text appeared: {text}"))]);
    }
    Err(Error::InvalidArguments(
        "no wait condition given; provide time, selector, or text".to_string(),
    ))
}

pub(crate) async fn reload(tab: &Tab) -> Result<Vec<Content>> {
    tab.page().reload().await?;
    let current = tab.page().url().await.unwrap_or_default();
    Ok(vec![Content::text(format!("Reloaded: {current}"))])
}

pub(crate) async fn scroll(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let direction = args.str("direction")?;
    let amount = args.i64_or("amount", 500);
    let (dx, dy) = match direction {
        "up" => (0, -amount),
        "down" => (0, amount),
        "left" => (-amount, 0),
        "right" => (amount, 0),
        other => {
            return Err(Error::Internal(format!(
                "direction '{other}' escaped validation"
            )))
        }
    };
    tab.page().scroll_by(dx, dy).await?;
    Ok(vec![Content::text(format!(
        "Scrolled {direction} by {amount}px"
    ))])
}

pub(crate) async fn evaluate(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let code = args.str("code")?;
    let value = tab.page().evaluate(code).await?;
    match value {
        Value::Null => Ok(vec![Content::text("undefined")]),
        Value::String(s) => Ok(vec![Content::text(s)]),
        other => Ok(vec![Content::Json(other)]),
    }
}

pub(crate) async fn tab_new(
    session: &mut BrowserSession,
    args: &ToolArgs,
) -> Result<Vec<Content>> {
    let id = session.open_tab(args.opt_str("url")).await?;
    Ok(vec![Content::text(format!("New tab opened: {id}"))])
}

pub(crate) async fn tab_close(
    session: &mut BrowserSession,
    args: &ToolArgs,
) -> Result<Vec<Content>> {
    let id = match args.opt_str("tab_id") {
        Some(id) => id.to_string(),
        None => session
            .active_tab_id()
            .ok_or(Error::NoActiveTab)?
            .to_string(),
    };
    session.close_tab(&id).await?;
    Ok(vec![Content::text(format!("Tab closed: {id}"))])
}

pub(crate) async fn tab_list(session: &mut BrowserSession) -> Result<Vec<Content>> {
    let infos = session.list_tabs().await;
    if infos.is_empty() {
        return Ok(vec![Content::text("No open tabs")]);
    }
    Ok(vec![Content::Json(serde_json::to_value(infos)?)])
}

pub(crate) async fn tab_switch(
    session: &mut BrowserSession,
    args: &ToolArgs,
) -> Result<Vec<Content>> {
    let id = args.str("tab_id")?;
    session.switch_to(id).await?;
    Ok(vec![Content::text(format!("Switched to tab: {id}"))])
}
