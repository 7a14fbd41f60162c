// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Chrome DevTools Protocol driver
//!
//! Drives a locally spawned Chromium through `chromiumoxide`:
//! - [`CdpLauncher`] builds the launch config and runs the protocol handler
//! - [`CdpBrowser`] maps contexts to `Target.createBrowserContext`
//! - [`CdpContext`] opens pages and pumps their `Network.*` events into the
//!   subscribed capture channel

mod events;
mod launch;
mod page;

pub use events::{headers_from_json, network_events, pump};
pub use launch::{
    browser_config, find_executable, launch_args, profile_dir, CHROMIUM_CANDIDATES,
    CHROME_PATH_ENV,
};
pub use page::{CdpElement, CdpPage};

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, Headers as CdpHeaders, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::security::SetIgnoreCertificateErrorsParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use self::page::PumpHandle;
use super::config::{BrowserType, ContextOptions, Cookie, LaunchOptions};
use super::driver::{BrowserContext, BrowserLauncher, BrowserPage, BrowserSession};
use crate::error::{Error, ErrorContext, Result};
use crate::network::EventSink;

type SharedBrowser = Arc<AsyncMutex<Option<Browser>>>;

/// Launches Chromium with remote debugging enabled
#[derive(Debug, Clone, Default)]
pub struct CdpLauncher;

impl CdpLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>> {
        if options.browser_type != BrowserType::Chromium {
            return Err(Error::launch(
                options.browser_type.as_str(),
                "the DevTools driver only supports chromium",
            ));
        }

        let profile = profile_dir();
        let config = browser_config(options, &profile)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("starting chromium")
            .map_err(|e| Error::launch("chromium", e.to_string()))?;

        // The handler drives the websocket; it must be polled for the browser to work
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("DevTools handler: {}", e);
                }
            }
        });

        info!(headless = options.headless, profile = %profile.display(), "Browser launched");
        Ok(Box::new(CdpBrowser {
            browser: Arc::new(AsyncMutex::new(Some(browser))),
            handler,
            profile,
        }))
    }
}

/// A running Chromium instance
pub struct CdpBrowser {
    browser: SharedBrowser,
    handler: JoinHandle<()>,
    profile: PathBuf,
}

#[async_trait]
impl BrowserSession for CdpBrowser {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserContext>> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().ok_or(Error::BrowserClosed)?;

        let context_id = browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;

        if options.ignore_https_errors {
            if let Err(e) = browser
                .execute(SetIgnoreCertificateErrorsParams::new(true))
                .await
            {
                warn!("Could not disable certificate checks: {}", e);
            }
        }
        drop(guard);

        Ok(Box::new(CdpContext {
            browser: Arc::clone(&self.browser),
            context_id,
            options: options.clone(),
            sink: Mutex::new(None),
            cookies_installed: AtomicBool::new(false),
        }))
    }

    async fn close(&self) -> Result<()> {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            if let Err(e) = browser.close().await {
                debug!("Browser.close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("Browser process wait failed: {}", e);
            }
        }
        self.handler.abort();
        if let Err(e) = tokio::fs::remove_dir_all(&self.profile).await {
            debug!(dir = %self.profile.display(), "Could not remove profile: {}", e);
        }
        Ok(())
    }
}

impl Drop for CdpBrowser {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Protocol cookie for a configured cookie; `None` when it has no scope
pub fn cookie_param(cookie: &Cookie) -> Option<CookieParam> {
    if cookie.domain.is_none() && cookie.url.is_none() {
        return None;
    }
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    param.domain = cookie.domain.clone();
    param.path = cookie.path.clone();
    param.url = cookie.url.clone();
    param.secure = Some(cookie.secure);
    param.http_only = Some(cookie.http_only);
    Some(param)
}

/// Browser context; all its pages report to one event sink
pub struct CdpContext {
    browser: SharedBrowser,
    context_id: BrowserContextId,
    options: ContextOptions,
    sink: Mutex<Option<EventSink>>,
    cookies_installed: AtomicBool,
}

impl CdpContext {
    async fn prepare_page(&self, page: &Page) -> Result<()> {
        let viewport = self.options.viewport;
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        ))
        .await?;

        if let Some(user_agent) = &self.options.user_agent {
            page.execute(SetUserAgentOverrideParams::new(user_agent.clone()))
                .await?;
        }

        if !self.options.extra_headers.is_empty() {
            let headers: Map<String, Value> = self
                .options
                .extra_headers
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            page.execute(SetExtraHttpHeadersParams::new(CdpHeaders::new(
                Value::Object(headers),
            )))
            .await?;
        }

        // Cookies live in the context; the first page installs them
        if !self.cookies_installed.swap(true, Ordering::SeqCst) {
            let cookies: Vec<CookieParam> =
                self.options.cookies.iter().filter_map(cookie_param).collect();
            if cookies.len() < self.options.cookies.len() {
                warn!(
                    skipped = self.options.cookies.len() - cookies.len(),
                    "Cookies without domain or url were skipped"
                );
            }
            if !cookies.is_empty() {
                let count = cookies.len();
                page.set_cookies(cookies).await?;
                info!(count, "Installed session cookies");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserContext for CdpContext {
    fn subscribe(&self, sink: EventSink) {
        *self.sink.lock() = Some(sink);
    }

    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.context_id.clone())
            .build()
            .map_err(|e| Error::protocol("Target.createTarget", e))?;

        let page = {
            let guard = self.browser.lock().await;
            let browser = guard.as_ref().ok_or(Error::BrowserClosed)?;
            browser.new_page(params).await?
        };
        self.prepare_page(&page).await?;

        let sink = self.sink.lock().clone();
        let pump_handle = match sink {
            Some(sink) => {
                let events = network_events(&page).await?;
                let shutdown = CancellationToken::new();
                let task = tokio::spawn(pump(events, sink, shutdown.clone()));
                Some(PumpHandle { shutdown, task })
            }
            None => None,
        };
        debug!(captured = pump_handle.is_some(), "Page opened");

        Ok(Box::new(CdpPage::new(page, pump_handle)))
    }

    async fn close(&self) -> Result<()> {
        self.sink.lock().take();
        let guard = self.browser.lock().await;
        let Some(browser) = guard.as_ref() else {
            return Ok(());
        };
        browser
            .execute(DisposeBrowserContextParams::new(self.context_id.clone()))
            .await?;
        Ok(())
    }
}
