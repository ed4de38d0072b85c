//! Production engine backed by chromiumoxide over the Chrome DevTools
//! Protocol.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use browserd_core::{BrowserKind, Error, Result, SessionConfig};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{find, Engine, EngineLauncher, EnginePage, ImageFormat, ScreenshotOpts};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn engine_err(e: impl std::fmt::Display) -> Error {
    Error::Engine(e.to_string())
}

/// Launches [`CdpEngine`] instances. This is the production
/// [`EngineLauncher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CdpLauncher;

#[async_trait]
impl EngineLauncher for CdpLauncher {
    async fn launch(&self, config: &SessionConfig) -> Result<Box<dyn Engine>> {
        let engine = CdpEngine::launch(config).await?;
        Ok(Box::new(engine))
    }
}

/// A running Chromium-family browser plus the task draining its CDP event
/// loop.
pub struct CdpEngine {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl CdpEngine {
    pub async fn launch(config: &SessionConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        match find::find_browser_binary(config.browser) {
            Some(path) => {
                debug!(browser = %config.browser, path = %path, "found browser binary");
                builder = builder.chrome_executable(path);
            }
            None if config.browser == BrowserKind::Chromium => {
                // Fall back to chromiumoxide's own executable detection.
                debug!("no chromium binary on known paths, using default detection");
            }
            None => {
                return Err(Error::Launch(format!(
                    "{} not found. Please install it.",
                    config.browser
                )));
            }
        }
        let browser_config = builder.build().map_err(Error::Launch)?;

        info!(
            browser = %config.browser,
            headless = config.headless,
            width = config.viewport_width,
            height = config.viewport_height,
            "launching browser"
        );
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;

        // The handler must be polled for the lifetime of the browser.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "cdp handler event error");
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }
}

#[async_trait]
impl Engine for CdpEngine {
    async fn new_page(&self) -> Result<Box<dyn EnginePage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(engine_err)?;
        let page = CdpPage::attach(page).await?;
        Ok(Box::new(page))
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser close failed");
        }
        self.handler_task.abort();
        Ok(())
    }
}

/// One CDP page with a console capture task attached.
pub struct CdpPage {
    page: Page,
    console: Arc<Mutex<Vec<String>>>,
    listener_task: JoinHandle<()>,
}

impl CdpPage {
    async fn attach(page: Page) -> Result<Self> {
        let console = Arc::new(Mutex::new(Vec::new()));
        let sink = console.clone();
        let mut events = page
            .event_listener::<EventConsoleApiCalled>()
            .await
            .map_err(engine_err)?;
        let listener_task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                sink.lock().await.push(format_console_event(&event));
            }
        });
        Ok(Self {
            page,
            console,
            listener_task,
        })
    }

    async fn find(&self, selector: &str) -> Result<chromiumoxide::element::Element> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| Error::Engine(format!("element '{selector}' not found: {e}")))
    }

    /// Evaluate a boolean predicate repeatedly until it holds or the
    /// deadline passes.
    async fn poll_until(&self, predicate: &str, timeout: Duration, what: &str) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let holds = self
                .page
                .evaluate(predicate)
                .await
                .map_err(engine_err)?
                .value()
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if holds {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!(
                    "{what} did not appear within {}ms",
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

fn format_console_event(event: &EventConsoleApiCalled) -> String {
    let level = serde_json::to_value(&event.r#type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_uppercase))
        .unwrap_or_else(|| "LOG".to_string());
    let text = event
        .args
        .iter()
        .filter_map(|arg| arg.value.as_ref())
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{level}] {text}")
}

#[async_trait]
impl EnginePage for CdpPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(engine_err)?;
        let _ = self.page.wait_for_navigation().await;
        debug!(url, "navigated");
        Ok(())
    }

    async fn go_back(&self) -> Result<()> {
        self.page
            .evaluate("history.back()")
            .await
            .map_err(engine_err)?;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    async fn go_forward(&self) -> Result<()> {
        self.page
            .evaluate("history.forward()")
            .await
            .map_err(engine_err)?;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.page.reload().await.map_err(engine_err)?;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.find(selector).await?;
        element.scroll_into_view().await.map_err(engine_err)?;
        element.click().await.map_err(engine_err)?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str, clear: bool) -> Result<()> {
        let element = self.find(selector).await?;
        if clear {
            element
                .call_js_fn("function() { this.value = ''; }", false)
                .await
                .map_err(engine_err)?;
        }
        element.click().await.map_err(engine_err)?;
        element.type_str(text).await.map_err(engine_err)?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.find(selector).await?;
        element.focus().await.map_err(engine_err)?;
        let assign = format!(
            "function() {{ this.value = {}; \
             this.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             this.dispatchEvent(new Event('change', {{ bubbles: true }})); }}",
            serde_json::to_string(value)?
        );
        element.call_js_fn(assign, false).await.map_err(engine_err)?;
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.find(selector).await?;
        let select = format!(
            "function() {{ this.value = {}; \
             this.dispatchEvent(new Event('change', {{ bubbles: true }})); }}",
            serde_json::to_string(value)?
        );
        element.call_js_fn(select, false).await.map_err(engine_err)?;
        Ok(())
    }

    async fn screenshot(&self, opts: ScreenshotOpts) -> Result<Vec<u8>> {
        let format = match opts.format {
            ImageFormat::Png => CaptureScreenshotFormat::Png,
            ImageFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
        };
        if let Some(selector) = &opts.element {
            let element = self.find(selector).await?;
            element.scroll_into_view().await.map_err(engine_err)?;
            return element.screenshot(format).await.map_err(engine_err);
        }
        let mut params = ScreenshotParams::builder()
            .format(format)
            .full_page(opts.full_page);
        if let Some(quality) = opts.quality {
            params = params.quality(quality);
        }
        self.page
            .screenshot(params.build())
            .await
            .map_err(engine_err)
    }

    async fn text_content(&self, selector: Option<&str>) -> Result<String> {
        let element = self.find(selector.unwrap_or("body")).await?;
        let text = element.inner_text().await.map_err(engine_err)?;
        Ok(text.unwrap_or_default())
    }

    async fn html(&self, selector: Option<&str>) -> Result<String> {
        match selector {
            Some(selector) => {
                let element = self.find(selector).await?;
                let html = element.inner_html().await.map_err(engine_err)?;
                Ok(html.unwrap_or_default())
            }
            None => self.page.content().await.map_err(engine_err),
        }
    }

    async fn console_messages(&self) -> Vec<String> {
        self.console.lock().await.clone()
    }

    async fn evaluate(&self, code: &str) -> Result<Value> {
        let result = self.page.evaluate(code).await.map_err(engine_err)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()> {
        self.page
            .evaluate(format!("window.scrollBy({dx}, {dy})"))
            .await
            .map_err(engine_err)?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let predicate = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        self.poll_until(&predicate, timeout, &format!("element '{selector}'"))
            .await
    }

    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<()> {
        let predicate = format!(
            "document.body && document.body.innerText.includes({})",
            serde_json::to_string(text)?
        );
        self.poll_until(&predicate, timeout, &format!("text '{text}'"))
            .await
    }

    async fn title(&self) -> Result<String> {
        let title = self.page.get_title().await.map_err(engine_err)?;
        Ok(title.unwrap_or_default())
    }

    async fn url(&self) -> Result<String> {
        let url = self.page.url().await.map_err(engine_err)?;
        Ok(url.unwrap_or_default())
    }

    async fn bring_to_front(&self) -> Result<()> {
        self.page.bring_to_front().await.map_err(engine_err)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.listener_task.abort();
        self.page.clone().close().await.map_err(engine_err)?;
        Ok(())
    }
}

impl Drop for CdpPage {
    fn drop(&mut self) {
        self.listener_task.abort();
    }
}
