//! Browser engine boundary.
//!
//! The rest of the workspace talks to the browser exclusively through the
//! [`Engine`] and [`EnginePage`] traits. The production implementation in
//! [`cdp`] drives a Chromium-family browser over the DevTools protocol;
//! tests substitute in-memory doubles.

pub mod cdp;
pub mod find;

use std::time::Duration;

use async_trait::async_trait;
use browserd_core::{Result, SessionConfig};
use serde_json::Value;

/// Encoding for screenshot captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// What a screenshot should cover and how it should be encoded.
#[derive(Debug, Clone, Default)]
pub struct ScreenshotOpts {
    pub full_page: bool,
    /// Capture just this element instead of the page.
    pub element: Option<String>,
    pub format: ImageFormat,
    /// JPEG compression quality (ignored for PNG).
    pub quality: Option<i64>,
}

/// Launches browsers. Injected into the session layer so tests can swap
/// the real engine for a scripted double.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self, config: &SessionConfig) -> Result<Box<dyn Engine>>;
}

/// A running browser process.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Open a fresh blank page.
    async fn new_page(&self) -> Result<Box<dyn EnginePage>>;

    /// Tear the browser down. Pages are expected to be closed first.
    async fn close(&mut self) -> Result<()>;
}

/// One open page, owned exclusively by a tab.
#[async_trait]
pub trait EnginePage: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn go_back(&self) -> Result<()>;
    async fn go_forward(&self) -> Result<()>;
    async fn reload(&self) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;
    async fn type_text(&self, selector: &str, text: &str, clear: bool) -> Result<()>;
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;
    async fn select_option(&self, selector: &str, value: &str) -> Result<()>;

    async fn screenshot(&self, opts: ScreenshotOpts) -> Result<Vec<u8>>;
    /// Visible text of the matched element, or of the whole body when
    /// `selector` is `None`.
    async fn text_content(&self, selector: Option<&str>) -> Result<String>;
    /// Inner HTML of the matched element, or the full document when
    /// `selector` is `None`.
    async fn html(&self, selector: Option<&str>) -> Result<String>;
    /// Console output captured since the page opened, oldest first.
    async fn console_messages(&self) -> Vec<String>;

    async fn evaluate(&self, code: &str) -> Result<Value>;
    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()>;
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;
    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<()>;

    async fn title(&self) -> Result<String>;
    async fn url(&self) -> Result<String>;
    async fn bring_to_front(&self) -> Result<()>;
    async fn close(&self) -> Result<()>;
}
