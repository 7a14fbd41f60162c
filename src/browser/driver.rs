// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser-layer contract
//!
//! The crawl engine never renders anything itself. It launches a session,
//! opens one context, subscribes to the context's network events and drives
//! pages through these traits. Any engine that can honour them (the bundled
//! DevTools driver, a remote grid, a scripted test double) can be plugged in.
//!
//! # Example
//!
//! ```rust,no_run
//! use apiscout::browser::{BrowserLauncher, ContextOptions, LaunchOptions, WaitStrategy};
//! use apiscout::network::event_channel;
//! use std::time::Duration;
//!
//! async fn visit_once(launcher: &dyn BrowserLauncher) -> apiscout::Result<()> {
//!     let session = launcher.launch(&LaunchOptions::default()).await?;
//!     let context = session.new_context(&ContextOptions::default()).await?;
//!
//!     let (sink, _events) = event_channel(64);
//!     context.subscribe(sink);
//!
//!     let page = context.new_page().await?;
//!     page.navigate("https://example.com", WaitStrategy::Load, Duration::from_secs(30))
//!         .await?;
//!     page.close().await?;
//!     context.close().await?;
//!     session.close().await
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::config::{ContextOptions, LaunchOptions, NavigationResponse, WaitStrategy};
use crate::error::Result;
use crate::network::EventSink;

/// Starts browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser. Failure here is fatal for a crawl.
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>>;
}

/// A running browser
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Create an isolated context (cookies, headers, viewport)
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserContext>>;

    /// Shut the browser down
    async fn close(&self) -> Result<()>;
}

/// Isolated browsing context shared by all pages of a crawl
#[async_trait]
pub trait BrowserContext: Send + Sync {
    /// Deliver request/response events of every page in this context to `sink`.
    /// Only one sink is active; subscribing again replaces it.
    fn subscribe(&self, sink: EventSink);

    /// Open a new page
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>>;

    /// Close the context and stop event delivery
    async fn close(&self) -> Result<()>;
}

/// A single tab
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait according to `wait`, bounded by `timeout`
    async fn navigate(
        &self,
        url: &str,
        wait: WaitStrategy,
        timeout: Duration,
    ) -> Result<NavigationResponse>;

    /// Evaluate a script in the page and return its JSON value.
    /// Promises are awaited.
    async fn evaluate(&self, script: &str) -> Result<Value>;

    /// All elements matching a CSS selector, in document order
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Close the page
    async fn close(&self) -> Result<()>;
}

/// Handle to a DOM element inside a page
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Attached, rendered and not hidden
    async fn is_visible(&self) -> Result<bool>;

    /// Click, failing if it does not complete within `timeout`
    async fn click(&self, timeout: Duration) -> Result<()>;

    /// Replace the element's value and fire input events
    async fn fill(&self, text: &str) -> Result<()>;
}
