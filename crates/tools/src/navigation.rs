//! Page navigation tools.

use browserd_core::Result;

use crate::dispatch::{PageOp, ToolHandler};
use crate::registry::ToolDescriptor;
use crate::schema::{ArgKind, ArgSpec, ToolArgs};
use crate::session::Tab;
use crate::Content;

pub(crate) fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "browser_navigate",
            description: "Navigate to a URL",
            args: &[ArgSpec {
                name: "url",
                kind: ArgKind::String,
                required: true,
                default: None,
                description: "The URL to navigate to",
            }],
            handler: ToolHandler::Page(PageOp::Navigate),
        },
        ToolDescriptor {
            name: "browser_navigate_back",
            description: "Go back to the previous page in history",
            args: &[],
            handler: ToolHandler::Page(PageOp::NavigateBack),
        },
        ToolDescriptor {
            name: "browser_navigate_forward",
            description: "Go forward to the next page in history",
            args: &[],
            handler: ToolHandler::Page(PageOp::NavigateForward),
        },
    ]
}

pub(crate) async fn navigate(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let url = args.str("url")?;
    tab.page().navigate(url).await?;
    let title = tab.page().title().await.unwrap_or_default();
    let current = tab.page().url().await.unwrap_or_default();
    Ok(vec![Content::text(format!(
        "Navigated to: {url}\nPage title: {title}\nCurrent URL: {current}"
    ))])
}

pub(crate) async fn navigate_back(tab: &Tab) -> Result<Vec<Content>> {
    tab.page().go_back().await?;
    let current = tab.page().url().await.unwrap_or_default();
    Ok(vec![Content::text(format!("Navigated back to: {current}"))])
}

pub(crate) async fn navigate_forward(tab: &Tab) -> Result<Vec<Content>> {
    tab.page().go_forward().await?;
    let current = tab.page().url().await.unwrap_or_default();
    Ok(vec![Content::text(format!(
        "Navigated forward to: {current}"
    ))])
}
