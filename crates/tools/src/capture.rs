//! Content capture tools: screenshots, text, HTML, console output.

use std::path::Path;
use std::time::Duration;

use browserd_core::Result;
use browserd_engine::{ImageFormat, ScreenshotOpts};
use serde_json::Value;
use tracing::debug;

use crate::dispatch::{PageOp, ToolHandler};
use crate::registry::ToolDescriptor;
use crate::schema::{ArgDefault, ArgKind, ArgSpec, ToolArgs};
use crate::session::Tab;
use crate::Content;

/// How many paged captures are echoed back inline as image blocks.
const INLINE_PAGE_LIMIT: usize = 3;

pub(crate) fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "browser_screenshot",
            description: "Take a screenshot of the page or a single element",
            args: &[
                ArgSpec {
                    name: "filename",
                    kind: ArgKind::String,
                    required: false,
                    default: None,
                    description: "Also save the image to this file",
                },
                ArgSpec {
                    name: "full_page",
                    kind: ArgKind::Bool,
                    required: false,
                    default: Some(ArgDefault::Bool(false)),
                    description: "Capture the full scrollable page",
                },
                ArgSpec {
                    name: "element_selector",
                    kind: ArgKind::String,
                    required: false,
                    default: None,
                    description: "Capture just this element",
                },
            ],
            handler: ToolHandler::Page(PageOp::Screenshot),
        },
        ToolDescriptor {
            name: "browser_screenshot_pages",
            description: "Capture a long page as a series of viewport-sized screenshots",
            args: &[
                ArgSpec {
                    name: "folder",
                    kind: ArgKind::String,
                    required: false,
                    default: Some(ArgDefault::Str("screenshots")),
                    description: "Directory the captures are written to",
                },
                ArgSpec {
                    name: "filename_prefix",
                    kind: ArgKind::String,
                    required: false,
                    default: Some(ArgDefault::Str("page")),
                    description: "Prefix for the numbered capture files",
                },
                ArgSpec {
                    name: "viewport_height",
                    kind: ArgKind::Integer,
                    required: false,
                    default: Some(ArgDefault::Int(800)),
                    description: "Height of one capture step in pixels",
                },
                ArgSpec {
                    name: "overlap",
                    kind: ArgKind::Integer,
                    required: false,
                    default: Some(ArgDefault::Int(50)),
                    description: "Vertical overlap between consecutive captures in pixels",
                },
                ArgSpec {
                    name: "max_pages",
                    kind: ArgKind::Integer,
                    required: false,
                    default: Some(ArgDefault::Int(20)),
                    description: "Upper bound on the number of captures",
                },
                ArgSpec {
                    name: "format",
                    kind: ArgKind::Enum(&["png", "jpeg"]),
                    required: false,
                    default: Some(ArgDefault::Str("png")),
                    description: "Image format",
                },
                ArgSpec {
                    name: "quality",
                    kind: ArgKind::Integer,
                    required: false,
                    default: Some(ArgDefault::Int(90)),
                    description: "JPEG quality (ignored for PNG)",
                },
            ],
            handler: ToolHandler::Page(PageOp::ScreenshotPages),
        },
        ToolDescriptor {
            name: "browser_get_text",
            description: "Get the visible text of the page or an element",
            args: &[ArgSpec {
                name: "selector",
                kind: ArgKind::String,
                required: false,
                default: None,
                description: "CSS selector (whole page if omitted)",
            }],
            handler: ToolHandler::Page(PageOp::GetText),
        },
        ToolDescriptor {
            name: "browser_get_html",
            description: "Get the HTML of the page or an element",
            args: &[ArgSpec {
                name: "selector",
                kind: ArgKind::String,
                required: false,
                default: None,
                description: "CSS selector (whole document if omitted)",
            }],
            handler: ToolHandler::Page(PageOp::GetHtml),
        },
        ToolDescriptor {
            name: "browser_console_messages",
            description: "Get the console messages captured on the active tab",
            args: &[],
            handler: ToolHandler::Page(PageOp::ConsoleMessages),
        },
    ]
}

pub(crate) async fn screenshot(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let element = args.opt_str("element_selector");
    let opts = ScreenshotOpts {
        full_page: args.bool_or("full_page", false),
        element: element.map(str::to_string),
        ..ScreenshotOpts::default()
    };
    let bytes = tab.page().screenshot(opts).await?;

    let mut note = match element {
        Some(selector) => format!("Screenshot of element: {selector}"),
        None => "Screenshot of page".to_string(),
    };
    if let Some(filename) = args.opt_str("filename") {
        std::fs::write(filename, &bytes)?;
        note.push_str(&format!(" (saved to {filename})"));
    }
    Ok(vec![
        Content::Image {
            data: bytes,
            media_type: ImageFormat::Png.media_type().to_string(),
        },
        Content::text(note),
    ])
}

pub(crate) async fn screenshot_pages(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let folder = args.str("folder")?.to_string();
    let prefix = args.str("filename_prefix")?.to_string();
    let viewport_height = args.i64_or("viewport_height", 800).max(1);
    let overlap = args.i64_or("overlap", 50).max(0);
    let max_pages = args.i64_or("max_pages", 20).max(1);
    let format = match args.str("format")? {
        "jpeg" => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    };
    let quality = match format {
        ImageFormat::Jpeg => Some(args.i64_or("quality", 90)),
        ImageFormat::Png => None,
    };

    std::fs::create_dir_all(&folder)?;

    let page = tab.page();
    let total_height = page
        .evaluate("document.documentElement.scrollHeight")
        .await?
        .as_i64()
        .unwrap_or(0);
    let original_offset = page
        .evaluate("window.pageYOffset")
        .await?
        .as_i64()
        .unwrap_or(0);

    let step = (viewport_height - overlap).max(1);
    let count = ((total_height + step - 1) / step).clamp(1, max_pages);
    debug!(total_height, step, count, "capturing page in segments");

    let mut blocks = Vec::new();
    let mut saved = Vec::new();
    for n in 0..count {
        page.evaluate(&format!("window.scrollTo(0, {})", n * step))
            .await?;
        // Give lazy-loaded content a moment to settle.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let bytes = page
            .screenshot(ScreenshotOpts {
                format,
                quality,
                ..ScreenshotOpts::default()
            })
            .await?;
        let filename = format!("{prefix}_{:03}.{}", n + 1, format.extension());
        let path = Path::new(&folder).join(&filename);
        std::fs::write(&path, &bytes)?;
        saved.push(path.display().to_string());

        if blocks.len() < INLINE_PAGE_LIMIT {
            blocks.push(Content::Image {
                data: bytes,
                media_type: format.media_type().to_string(),
            });
        }
    }
    page.evaluate(&format!("window.scrollTo(0, {original_offset})"))
        .await?;

    blocks.push(Content::text(format!(
        "Captured {count} screenshot(s) of a {total_height}px page:\n{}",
        saved.join("\n")
    )));
    Ok(blocks)
}

pub(crate) async fn get_text(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let text = tab.page().text_content(args.opt_str("selector")).await?;
    Ok(vec![Content::text(text)])
}

pub(crate) async fn get_html(tab: &Tab, args: &ToolArgs) -> Result<Vec<Content>> {
    let html = tab.page().html(args.opt_str("selector")).await?;
    Ok(vec![Content::text(html)])
}

pub(crate) async fn console_messages(tab: &Tab) -> Result<Vec<Content>> {
    let messages = tab.page().console_messages().await;
    if messages.is_empty() {
        return Ok(vec![Content::text("No console messages")]);
    }
    Ok(vec![Content::Json(Value::from(messages))])
}
