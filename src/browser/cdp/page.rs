// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! chromiumoxide-backed pages and element handles

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventLifecycleEvent, NavigateParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use futures::{FutureExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::browser::config::{NavigationResponse, WaitStrategy};
use crate::browser::driver::{BrowserPage, ElementHandle};
use crate::error::{Error, Result};

const VISIBLE_FN: &str = "function() {
    if (!this.isConnected) return false;
    const style = window.getComputedStyle(this);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}";

/// Set an input's value and fire the events frameworks listen for
pub(crate) fn fill_fn(text: &str) -> Result<String> {
    Ok(format!(
        "function() {{
    this.focus();
    this.value = {};
    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
}}",
        serde_json::to_string(text)?
    ))
}

fn element_error(e: CdpError) -> Error {
    Error::element(e.to_string())
}

/// Tracks the main document of one navigation and its lifecycle
#[derive(Debug)]
pub(crate) struct NavigationWatch {
    wait: WaitStrategy,
    loader_id: Option<String>,
    idle_loaders: Vec<String>,
    pub(crate) status: Option<u16>,
    pub(crate) url: Option<String>,
}

impl NavigationWatch {
    pub(crate) fn new(wait: WaitStrategy) -> Self {
        Self {
            wait,
            loader_id: None,
            idle_loaders: Vec::new(),
            status: None,
            url: None,
        }
    }

    /// Main documents are the responses whose request id is the loader id.
    /// The first one belongs to the top frame; iframes load later.
    pub(crate) fn on_response(&mut self, request_id: &str, loader_id: &str, url: &str, status: i64) {
        if request_id != loader_id || self.loader_id.is_some() {
            return;
        }
        self.loader_id = Some(loader_id.to_string());
        self.status = u16::try_from(status).ok();
        self.url = Some(url.to_string());
    }

    pub(crate) fn on_lifecycle(&mut self, loader_id: &str, name: &str) {
        if name == "networkIdle" {
            self.idle_loaders.push(loader_id.to_string());
        }
    }

    /// `goto` returns after the load event, which covers the other strategies
    pub(crate) fn is_settled(&self) -> bool {
        if self.wait != WaitStrategy::NetworkIdle {
            return true;
        }
        match &self.loader_id {
            Some(loader) => self.idle_loaders.iter().any(|l| l == loader),
            None => !self.idle_loaders.is_empty(),
        }
    }

    pub(crate) fn into_response(self, requested: &str) -> NavigationResponse {
        NavigationResponse::new(self.url.unwrap_or_else(|| requested.to_string()), self.status)
    }
}

/// Network pump attached to a page
pub(crate) struct PumpHandle {
    pub(crate) shutdown: CancellationToken,
    pub(crate) task: JoinHandle<()>,
}

/// A page of a chromiumoxide browser context
pub struct CdpPage {
    page: Page,
    pump: Mutex<Option<PumpHandle>>,
}

impl CdpPage {
    pub(crate) fn new(page: Page, pump: Option<PumpHandle>) -> Self {
        Self {
            page,
            pump: Mutex::new(pump),
        }
    }

    async fn navigate_inner(&self, url: &str, wait: WaitStrategy) -> Result<NavigationResponse> {
        let mut documents = self.page.event_listener::<EventResponseReceived>().await?;
        let mut lifecycle = self.page.event_listener::<EventLifecycleEvent>().await?;

        self.page
            .goto(NavigateParams::new(url))
            .await
            .map_err(|e| Error::navigation_failed(url, None, e.to_string()))?;

        let mut watch = NavigationWatch::new(wait);
        while let Some(Some(event)) = documents.next().now_or_never() {
            watch.on_response(
                event.request_id.inner(),
                event.loader_id.inner(),
                &event.response.url,
                event.response.status,
            );
        }

        while !watch.is_settled() {
            match lifecycle.next().await {
                Some(event) => watch.on_lifecycle(event.loader_id.inner(), &event.name),
                None => return Err(Error::BrowserClosed),
            }
        }

        Ok(watch.into_response(url))
    }
}

#[async_trait]
impl BrowserPage for CdpPage {
    async fn navigate(
        &self,
        url: &str,
        wait: WaitStrategy,
        timeout: Duration,
    ) -> Result<NavigationResponse> {
        debug!(url = %url, wait = wait.as_str(), "Navigating");
        match tokio::time::timeout(timeout, self.navigate_inner(url, wait)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout_with_url(
                "navigation",
                timeout.as_millis() as u64,
                url,
            )),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .page
            .evaluate_expression(EvaluateParams::new(script))
            .await
            .map_err(|e| Error::script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| Error::script(e.to_string()))?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(CdpElement { element }) as Box<dyn ElementHandle>)
            .collect())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn close(&self) -> Result<()> {
        let closed = self.page.clone().close().await;

        let pump = self.pump.lock().take();
        if let Some(pump) = pump {
            pump.shutdown.cancel();
            if let Err(e) = pump.task.await {
                debug!("Network pump failed: {}", e);
            }
        }

        Ok(closed?)
    }
}

impl Drop for CdpPage {
    fn drop(&mut self) {
        // The pump drains what it already has and exits
        if let Some(pump) = self.pump.get_mut().take() {
            pump.shutdown.cancel();
        }
    }
}

/// Remote DOM element
pub struct CdpElement {
    element: Element,
}

#[async_trait]
impl ElementHandle for CdpElement {
    async fn is_visible(&self) -> Result<bool> {
        let returns = self
            .element
            .call_js_fn(VISIBLE_FN, false)
            .await
            .map_err(element_error)?;
        Ok(returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn click(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.element.click()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(element_error(e)),
            Err(_) => Err(Error::timeout("click", timeout.as_millis() as u64)),
        }
    }

    async fn fill(&self, text: &str) -> Result<()> {
        let returns = self
            .element
            .call_js_fn(fill_fn(text)?, false)
            .await
            .map_err(element_error)?;
        match returns.exception_details {
            Some(details) => Err(Error::element(details.text)),
            None => Ok(()),
        }
    }
}
