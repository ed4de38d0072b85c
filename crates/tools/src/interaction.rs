//! Element interaction tools.

use browserd_core::Result;

use crate::dispatch::{PageOp, ToolHandler};
use crate::registry::ToolDescriptor;
use crate::schema::{ArgDefault, ArgKind, ArgSpec, ToolArgs};
use crate::session::Tab;
use crate::Content;

const SELECTOR: ArgSpec = ArgSpec {
    name: "selector",
    kind: ArgKind::String,
    required: true,
    default: None,
    description: "CSS selector of the target element",
};

pub(crate) fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "browser_click",
            description: "Click an element on the page",
            args: &[
                SELECTOR,
                ArgSpec {
                    name: "timeout",
                    kind: ArgKind::Integer,
                    required: false,
                    default: None,
                    description: "Timeout in milliseconds (defaults to the configured timeout)",
                },
            ],
            handler: ToolHandler::Page(PageOp::Click),
        },
        ToolDescriptor {
            name: "browser_type",
            description: "Type text into an element, key by key",
            args: &[
                SELECTOR,
                ArgSpec {
                    name: "text",
                    kind: ArgKind::String,
                    required: true,
                    default: None,
                    description: "Text to type",
                },
                ArgSpec {
                    name: "clear",
                    kind: ArgKind::Bool,
                    required: false,
                    default: Some(ArgDefault::Bool(true)),
                    description: "Clear the existing value first",
                },
            ],
            handler: ToolHandler::Page(PageOp::TypeText),
        },
        ToolDescriptor {
            name: "browser_fill",
            description: "Set the value of an input element directly",
            args: &[
                SELECTOR,
                ArgSpec {
                    name: "value",
                    kind: ArgKind::String,
                    required: true,
                    default: None,
                    description: "Value to set",
                },
            ],
            handler: ToolHandler::Page(PageOp::Fill),
        },
        ToolDescriptor {
            name: "browser_select_option",
            description: "Select an option in a select element by value",
            args: &[
                SELECTOR,
                ArgSpec {
                    name: "value",
                    kind: ArgKind::String,
                    required: true,
                    default: None,
                    description: "Option value to select",
                },
            ],
            handler: ToolHandler::Page(PageOp::SelectOption),
        },
    ]
}

pub(crate) async fn click(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let selector = args.str("selector")?;
    tab.page().click(selector).await?;
    Ok(vec![Content::text(format!("Clicked element: {selector}"))])
}

pub(crate) async fn type_text(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let selector = args.str("selector")?;
    let text = args.str("text")?;
    let clear = args.bool_or("clear", true);
    tab.page().type_text(selector, text, clear).await?;
    Ok(vec![Content::text(format!(
        "Typed '{text}' into element: {selector}"
    ))])
}

pub(crate) async fn fill(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let selector = args.str("selector")?;
    let value = args.str("value")?;
    tab.page().fill(selector, value).await?;
    Ok(vec![Content::text(format!(
        "Filled element {selector} with: {value}"
    ))])
}

pub(crate) async fn select_option(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let selector = args.str("selector")?;
    let value = args.str("value")?;
    tab.page().select_option(selector, value).await?;
    Ok(vec![Content::text(format!(
        "Selected option '{value}' in element: {selector}"
    ))])
}
