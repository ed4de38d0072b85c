//! In-memory engine doubles for session and dispatch tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use browserd_core::{Error, Result, SessionConfig};
use browserd_engine::{Engine, EngineLauncher, EnginePage, ScreenshotOpts};
use serde_json::Value;

pub(crate) const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G'];

#[derive(Default)]
struct PageState {
    navigations: Mutex<Vec<String>>,
    clicks: Mutex<Vec<String>>,
    typed: Mutex<Vec<(String, String, bool)>>,
    filled: Mutex<Vec<(String, String)>>,
    selected: Mutex<Vec<(String, String)>>,
    scrolls: Mutex<Vec<(i64, i64)>>,
    evaluated: Mutex<Vec<String>>,
    eval_results: Mutex<VecDeque<Value>>,
    console: Mutex<Vec<String>>,
    title: Mutex<String>,
    url: Mutex<String>,
    text: Mutex<String>,
    html: Mutex<String>,
    reloads: AtomicUsize,
    backs: AtomicUsize,
    forwards: AtomicUsize,
    brings: AtomicUsize,
    closed: AtomicBool,
    fail_next: Mutex<Option<String>>,
    delay_next: Mutex<Option<Duration>>,
}

/// Test-side view of one fake page.
#[derive(Clone)]
pub(crate) struct PageHandle(Arc<PageState>);

#[allow(dead_code)]
impl PageHandle {
    pub fn navigations(&self) -> Vec<String> {
        self.0.navigations.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.0.clicks.lock().unwrap().clone()
    }

    pub fn typed(&self) -> Vec<(String, String, bool)> {
        self.0.typed.lock().unwrap().clone()
    }

    pub fn filled(&self) -> Vec<(String, String)> {
        self.0.filled.lock().unwrap().clone()
    }

    pub fn selected(&self) -> Vec<(String, String)> {
        self.0.selected.lock().unwrap().clone()
    }

    pub fn scrolls(&self) -> Vec<(i64, i64)> {
        self.0.scrolls.lock().unwrap().clone()
    }

    pub fn evaluated(&self) -> Vec<String> {
        self.0.evaluated.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> usize {
        self.0.reloads.load(Ordering::SeqCst)
    }

    pub fn backs(&self) -> usize {
        self.0.backs.load(Ordering::SeqCst)
    }

    pub fn forwards(&self) -> usize {
        self.0.forwards.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> bool {
        self.0.closed.load(Ordering::SeqCst)
    }

    pub fn set_title(&self, title: &str) {
        *self.0.title.lock().unwrap() = title.to_string();
    }

    pub fn set_url(&self, url: &str) {
        *self.0.url.lock().unwrap() = url.to_string();
    }

    pub fn set_text(&self, text: &str) {
        *self.0.text.lock().unwrap() = text.to_string();
    }

    pub fn set_html(&self, html: &str) {
        *self.0.html.lock().unwrap() = html.to_string();
    }

    pub fn push_console(&self, line: &str) {
        self.0.console.lock().unwrap().push(line.to_string());
    }

    /// Queue the value returned by the next `evaluate` call.
    pub fn push_eval_result(&self, value: Value) {
        self.0.eval_results.lock().unwrap().push_back(value);
    }

    /// Make the next page operation fail with an engine error.
    pub fn fail_next(&self, message: &str) {
        *self.0.fail_next.lock().unwrap() = Some(message.to_string());
    }

    /// Make the next page operation stall for `delay` before completing.
    pub fn delay_next(&self, delay: Duration) {
        *self.0.delay_next.lock().unwrap() = Some(delay);
    }
}

struct FakePage(Arc<PageState>);

impl FakePage {
    /// Applies the scripted delay/failure, each consumed once.
    async fn gate(&self) -> Result<()> {
        let delay = self.0.delay_next.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let fail = self.0.fail_next.lock().unwrap().take();
        if let Some(message) = fail {
            return Err(Error::Engine(message));
        }
        Ok(())
    }
}

#[async_trait]
impl EnginePage for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.gate().await?;
        self.0.navigations.lock().unwrap().push(url.to_string());
        *self.0.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn go_back(&self) -> Result<()> {
        self.gate().await?;
        self.0.backs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn go_forward(&self) -> Result<()> {
        self.gate().await?;
        self.0.forwards.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.gate().await?;
        self.0.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.gate().await?;
        self.0.clicks.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str, clear: bool) -> Result<()> {
        self.gate().await?;
        self.0
            .typed
            .lock()
            .unwrap()
            .push((selector.to_string(), text.to_string(), clear));
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.gate().await?;
        self.0
            .filled
            .lock()
            .unwrap()
            .push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        self.gate().await?;
        self.0
            .selected
            .lock()
            .unwrap()
            .push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn screenshot(&self, _opts: ScreenshotOpts) -> Result<Vec<u8>> {
        self.gate().await?;
        Ok(FAKE_PNG.to_vec())
    }

    async fn text_content(&self, _selector: Option<&str>) -> Result<String> {
        self.gate().await?;
        Ok(self.0.text.lock().unwrap().clone())
    }

    async fn html(&self, _selector: Option<&str>) -> Result<String> {
        self.gate().await?;
        Ok(self.0.html.lock().unwrap().clone())
    }

    async fn console_messages(&self) -> Vec<String> {
        self.0.console.lock().unwrap().clone()
    }

    async fn evaluate(&self, code: &str) -> Result<Value> {
        self.gate().await?;
        self.0.evaluated.lock().unwrap().push(code.to_string());
        Ok(self
            .0
            .eval_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Value::Null))
    }

    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()> {
        self.gate().await?;
        self.0.scrolls.lock().unwrap().push((dx, dy));
        Ok(())
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> Result<()> {
        self.gate().await
    }

    async fn wait_for_text(&self, _text: &str, _timeout: Duration) -> Result<()> {
        self.gate().await
    }

    async fn title(&self) -> Result<String> {
        Ok(self.0.title.lock().unwrap().clone())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.0.url.lock().unwrap().clone())
    }

    async fn bring_to_front(&self) -> Result<()> {
        self.gate().await?;
        self.0.brings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.0.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct FakeState {
    launched: AtomicBool,
    engine_closed: AtomicBool,
    fail_launch: Mutex<Option<String>>,
    pages: Mutex<Vec<Arc<PageState>>>,
}

/// Test-side view of the fake engine: what got launched, opened, closed.
#[derive(Clone)]
pub(crate) struct FakeHandle(Arc<FakeState>);

#[allow(dead_code)]
impl FakeHandle {
    pub fn launched(&self) -> bool {
        self.0.launched.load(Ordering::SeqCst)
    }

    pub fn engine_closed(&self) -> bool {
        self.0.engine_closed.load(Ordering::SeqCst)
    }

    pub fn fail_launch(&self, message: &str) {
        *self.0.fail_launch.lock().unwrap() = Some(message.to_string());
    }

    pub fn pages_created(&self) -> usize {
        self.0.pages.lock().unwrap().len()
    }

    /// Handle to the n-th page ever created (creation order).
    pub fn page(&self, index: usize) -> PageHandle {
        PageHandle(self.0.pages.lock().unwrap()[index].clone())
    }
}

struct FakeEngine(Arc<FakeState>);

#[async_trait]
impl Engine for FakeEngine {
    async fn new_page(&self) -> Result<Box<dyn EnginePage>> {
        let state = Arc::new(PageState::default());
        self.0.pages.lock().unwrap().push(state.clone());
        Ok(Box::new(FakePage(state)))
    }

    async fn close(&mut self) -> Result<()> {
        self.0.engine_closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// An [`EngineLauncher`] producing in-memory engines.
pub(crate) struct FakeLauncher(Arc<FakeState>);

impl FakeLauncher {
    pub fn new() -> (Self, FakeHandle) {
        let state = Arc::new(FakeState::default());
        (Self(state.clone()), FakeHandle(state))
    }
}

#[async_trait]
impl EngineLauncher for FakeLauncher {
    async fn launch(&self, _config: &SessionConfig) -> Result<Box<dyn Engine>> {
        if let Some(message) = self.0.fail_launch.lock().unwrap().take() {
            return Err(Error::Launch(message));
        }
        self.0.launched.store(true, Ordering::SeqCst);
        Ok(Box::new(FakeEngine(self.0.clone())))
    }
}
