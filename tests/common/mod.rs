// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scripted in-memory browser for driving the crawler in tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use apiscout::browser::{
    BrowserContext, BrowserLauncher, BrowserPage, BrowserSession, ContextOptions, ElementHandle,
    LaunchOptions, NavigationResponse, WaitStrategy,
};
use apiscout::crawl::{CLICKABLE_SELECTOR, LINK_HARVEST_SCRIPT, TEXT_INPUT_SELECTOR};
use apiscout::network::{BrowserEvent, EventSink, RawRequest, RawResponse};
use apiscout::{Error, Result};

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// One request/response pair a page or element produces
#[derive(Debug, Clone)]
pub struct Traffic {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub resource_type: String,
}

impl Traffic {
    pub fn fetch(method: &str, url: &str, status: u16) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            status,
            resource_type: "fetch".to_string(),
        }
    }

    pub fn xhr(method: &str, url: &str, status: u16) -> Self {
        Self {
            resource_type: "xhr".to_string(),
            ..Self::fetch(method, url, status)
        }
    }

    pub fn image(url: &str) -> Self {
        Self {
            resource_type: "image".to_string(),
            ..Self::fetch("GET", url, 200)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub visible: bool,
    pub fails: bool,
    pub traffic: Vec<Traffic>,
}

impl FakeElement {
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            visible: true,
            fails: true,
            ..Self::default()
        }
    }

    pub fn triggering(traffic: Traffic) -> Self {
        Self {
            visible: true,
            traffic: vec![traffic],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub status: Option<u16>,
    pub links: Vec<String>,
    pub traffic: Vec<Traffic>,
    pub load_delay: Duration,
    pub script_error: bool,
    pub scroll_height: u64,
    pub buttons: Vec<FakeElement>,
    pub inputs: Vec<FakeElement>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            status: Some(200),
            links: Vec::new(),
            traffic: Vec::new(),
            load_delay: Duration::ZERO,
            script_error: false,
            scroll_height: 0,
            buttons: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

impl FakePage {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn links(mut self, links: &[&str]) -> Self {
        self.links = links.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn traffic(mut self, traffic: Traffic) -> Self {
        self.traffic.push(traffic);
        self
    }

    pub fn load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn script_error(mut self) -> Self {
        self.script_error = true;
        self
    }

    pub fn scroll_height(mut self, height: u64) -> Self {
        self.scroll_height = height;
        self
    }

    pub fn buttons(mut self, buttons: Vec<FakeElement>) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn inputs(mut self, inputs: Vec<FakeElement>) -> Self {
        self.inputs = inputs;
        self
    }
}

/// Everything the fake browser was asked to do
#[derive(Debug, Default)]
pub struct Recorder {
    pub launches: Mutex<Vec<LaunchOptions>>,
    pub contexts: Mutex<Vec<ContextOptions>>,
    pub navigations: Mutex<Vec<String>>,
    pub evaluations: Mutex<Vec<String>>,
    pub fills: Mutex<Vec<String>>,
    pub clicks: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub contexts_closed: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    in_flight: AtomicUsize,
    next_request_id: AtomicU64,
}

impl Recorder {
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub fn evaluations_matching(&self, needle: &str) -> usize {
        self.evaluations
            .lock()
            .iter()
            .filter(|script| script.contains(needle))
            .count()
    }
}

#[derive(Clone)]
struct Wire {
    recorder: Arc<Recorder>,
    sink: Arc<Mutex<Option<EventSink>>>,
}

impl Wire {
    async fn emit(&self, traffic: &[Traffic]) {
        let Some(sink) = self.sink.lock().clone() else {
            return;
        };
        for t in traffic {
            let id = self.recorder.next_request_id.fetch_add(1, Ordering::SeqCst).to_string();
            let request = RawRequest::new(&t.url, &t.method, &t.resource_type).with_request_id(&id);
            let response = RawResponse::new(&t.url, t.status)
                .with_request_id(&id)
                .with_header("Content-Type", "application/json");
            let _ = sink.send(BrowserEvent::Request(request)).await;
            let _ = sink.send(BrowserEvent::Response(response)).await;
        }
    }
}

/// URL -> page script
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }
}

pub struct FakeLauncher {
    site: Arc<FakeSite>,
    recorder: Arc<Recorder>,
    fail_launch: bool,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            recorder: Arc::new(Recorder::default()),
            fail_launch: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(FakeSite::new())
        }
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        Arc::clone(&self.recorder)
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>> {
        self.recorder.launches.lock().push(options.clone());
        if self.fail_launch {
            return Err(Error::launch("chromium", "executable not found"));
        }
        Ok(Box::new(FakeSession {
            site: Arc::clone(&self.site),
            recorder: Arc::clone(&self.recorder),
        }))
    }
}

struct FakeSession {
    site: Arc<FakeSite>,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserContext>> {
        self.recorder.contexts.lock().push(options.clone());
        Ok(Box::new(FakeContext {
            site: Arc::clone(&self.site),
            wire: Wire {
                recorder: Arc::clone(&self.recorder),
                sink: Arc::new(Mutex::new(None)),
            },
        }))
    }

    async fn close(&self) -> Result<()> {
        self.recorder.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeContext {
    site: Arc<FakeSite>,
    wire: Wire,
}

#[async_trait]
impl BrowserContext for FakeContext {
    fn subscribe(&self, sink: EventSink) {
        *self.wire.sink.lock() = Some(sink);
    }

    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        self.wire.recorder.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePageHandle {
            site: Arc::clone(&self.site),
            wire: self.wire.clone(),
            current: Mutex::new(None),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.wire.recorder.contexts_closed.fetch_add(1, Ordering::SeqCst);
        self.wire.sink.lock().take();
        Ok(())
    }
}

pub struct FakePageHandle {
    site: Arc<FakeSite>,
    wire: Wire,
    current: Mutex<Option<FakePage>>,
}

impl FakePageHandle {
    /// A page that is already "loaded", for driving components directly
    pub fn loaded(page: FakePage) -> (Self, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let handle = Self {
            site: Arc::new(FakeSite::new()),
            wire: Wire {
                recorder: Arc::clone(&recorder),
                sink: Arc::new(Mutex::new(None)),
            },
            current: Mutex::new(Some(page)),
        };
        (handle, recorder)
    }

    fn loaded_page(&self) -> FakePage {
        self.current.lock().clone().unwrap_or_default()
    }
}

#[async_trait]
impl BrowserPage for FakePageHandle {
    async fn navigate(
        &self,
        url: &str,
        _wait: WaitStrategy,
        timeout: Duration,
    ) -> Result<NavigationResponse> {
        let recorder = &self.wire.recorder;
        recorder.navigations.lock().push(url.to_string());

        let Some(script) = self.site.pages.get(url).cloned() else {
            return Err(Error::navigation_failed(url, None, "net::ERR_NAME_NOT_RESOLVED"));
        };

        let in_flight = recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        recorder.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let load = async {
            tokio::time::sleep(script.load_delay).await;
            self.wire.emit(&script.traffic).await;
        };
        let finished = tokio::time::timeout(timeout, load).await;
        recorder.in_flight.fetch_sub(1, Ordering::SeqCst);

        if finished.is_err() {
            return Err(Error::timeout_with_url(
                "navigation",
                timeout.as_millis() as u64,
                url,
            ));
        }

        let status = script.status;
        *self.current.lock() = Some(script);
        Ok(NavigationResponse::new(url, status))
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        self.wire.recorder.evaluations.lock().push(script.to_string());
        let page = self.loaded_page();
        if page.script_error {
            return Err(Error::script("ReferenceError: document is not defined"));
        }
        if script == LINK_HARVEST_SCRIPT {
            return Ok(json!(page.links));
        }
        if script.contains("scrollHeight") {
            return Ok(json!(page.scroll_height));
        }
        Ok(Value::Null)
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>> {
        let page = self.loaded_page();
        if page.script_error {
            return Err(Error::script("execution context was destroyed"));
        }
        let elements = match selector {
            CLICKABLE_SELECTOR => page.buttons,
            TEXT_INPUT_SELECTOR => page.inputs,
            _ => Vec::new(),
        };
        Ok(elements
            .into_iter()
            .map(|behaviour| {
                Box::new(FakeElementHandle {
                    behaviour,
                    wire: self.wire.clone(),
                }) as Box<dyn ElementHandle>
            })
            .collect())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(FAKE_PNG.to_vec())
    }

    async fn close(&self) -> Result<()> {
        self.wire.recorder.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeElementHandle {
    behaviour: FakeElement,
    wire: Wire,
}

#[async_trait]
impl ElementHandle for FakeElementHandle {
    async fn is_visible(&self) -> Result<bool> {
        Ok(self.behaviour.visible)
    }

    async fn click(&self, _timeout: Duration) -> Result<()> {
        if self.behaviour.fails {
            return Err(Error::element("element is detached from the DOM"));
        }
        self.wire.recorder.clicks.fetch_add(1, Ordering::SeqCst);
        self.wire.emit(&self.behaviour.traffic).await;
        Ok(())
    }

    async fn fill(&self, text: &str) -> Result<()> {
        if self.behaviour.fails {
            return Err(Error::element("element is not an input"));
        }
        self.wire.recorder.fills.lock().push(text.to_string());
        self.wire.emit(&self.behaviour.traffic).await;
        Ok(())
    }
}
