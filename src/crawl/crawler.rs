// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Crawl scheduler
//!
//! Breadth-first traversal under hard budgets. One browser session and one
//! context serve the whole run; every page in the context reports its traffic
//! to a single [`NetworkCapturer`]. Per-page failures are logged and cost only
//! that page's links. Only browser initialization errors reach the caller.

use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::CrawlConfig;
use super::frontier::{Frontier, FrontierEntry, VisitedSet};
use super::interaction::InteractionSimulator;
use super::links::LinkExtractor;
use super::result::{CrawlResult, CrawlStatistics, PageScreenshot};
use crate::browser::{BrowserContext, BrowserLauncher, BrowserPage};
use crate::endpoint::EndpointNormalizer;
use crate::error::{Error, Result};
use crate::network::{event_channel, NetworkCapturer, EVENT_CHANNEL_CAPACITY};

/// What one page visit produced
#[derive(Debug, Default)]
struct PageOutcome {
    links: Vec<String>,
    failed: bool,
    screenshot: Option<PageScreenshot>,
}

impl PageOutcome {
    fn failed() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }
}

/// State accumulated by the traversal loop
#[derive(Debug, Default)]
struct Traversal {
    visited: VisitedSet,
    pages_failed: usize,
    screenshots: Vec<PageScreenshot>,
    cancelled: bool,
}

/// Why the traversal stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    PageLimit,
    TimeBudget,
    Cancelled,
}

impl StopReason {
    fn as_str(self) -> &'static str {
        match self {
            StopReason::PageLimit => "page limit reached",
            StopReason::TimeBudget => "time budget exhausted",
            StopReason::Cancelled => "cancelled",
        }
    }
}

/// Runtime endpoint discovery crawler
pub struct Crawler {
    launcher: Arc<dyn BrowserLauncher>,
    config: CrawlConfig,
    simulator: InteractionSimulator,
    links: LinkExtractor,
    normalizer: EndpointNormalizer,
    cancel: CancellationToken,
}

impl Crawler {
    /// Create a crawler driving browsers from `launcher`
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: CrawlConfig) -> Self {
        let simulator = InteractionSimulator::new(config.simulation.clone());
        Self {
            launcher,
            config,
            simulator,
            links: LinkExtractor::new(),
            normalizer: EndpointNormalizer::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop cooperatively when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Run the crawl.
    ///
    /// Fails only on invalid configuration or when the browser cannot be
    /// brought up; otherwise a result is always produced, possibly empty.
    pub async fn run(&self) -> Result<CrawlResult> {
        let seed = self.config.validate()?;
        let started = Instant::now();
        let started_at = Utc::now();
        let browser = self.config.browser_type;

        info!(
            target = %seed,
            max_pages = self.config.max_pages,
            max_depth = self.config.max_depth,
            concurrency = self.config.max_concurrent_pages,
            "Starting crawl"
        );
        if self.config.respect_robots_txt {
            debug!("robots.txt compliance is advisory and not enforced by the crawler");
        }

        let session = self
            .launcher
            .launch(&self.config.launch_options())
            .await
            .map_err(|e| {
                error!(browser = %browser, "Browser launch failed: {}", e);
                if e.is_fatal() {
                    e
                } else {
                    Error::launch(browser.as_str(), e.to_string())
                }
            })?;
        info!(browser = %browser, headless = self.config.headless, "Browser ready");

        let context = match session
            .new_context(&self.config.context_options(&seed))
            .await
        {
            Ok(context) => context,
            Err(e) => {
                error!("Browser context creation failed: {}", e);
                if let Err(close_err) = session.close().await {
                    warn!("Browser close failed: {}", close_err);
                }
                return Err(Error::launch(browser.as_str(), e.to_string()));
            }
        };
        if !self.config.cookies.is_empty() {
            info!(count = self.config.cookies.len(), "Using authentication cookies");
        }

        let (sink, events) = event_channel(EVENT_CHANNEL_CAPACITY);
        context.subscribe(sink);
        let capture = NetworkCapturer::new(events, CancellationToken::new()).spawn();

        let traversal = self.traverse(context.as_ref(), seed.as_str(), started).await;

        if let Err(e) = context.close().await {
            warn!("Browser context close failed: {}", e);
        }
        if let Err(e) = session.close().await {
            warn!("Browser close failed: {}", e);
        }

        let network_log = capture.finish().await.into_events();
        let endpoints = self.normalizer.normalize(&network_log);

        let statistics = CrawlStatistics {
            pages_crawled: traversal.visited.len(),
            pages_failed: traversal.pages_failed,
            network_requests: network_log.len(),
            unique_endpoints: endpoints.len(),
            screenshots_captured: traversal.screenshots.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            pages = statistics.pages_crawled,
            failed = statistics.pages_failed,
            requests = statistics.network_requests,
            endpoints = statistics.unique_endpoints,
            duration_ms = statistics.duration_ms,
            "Crawl finished"
        );

        Ok(CrawlResult {
            target_url: seed.to_string(),
            started_at,
            endpoints,
            network_log,
            visited_urls: traversal.visited.into_vec(),
            screenshots: traversal.screenshots,
            cancelled: traversal.cancelled,
            statistics,
        })
    }

    fn stop_reason(&self, visited: &VisitedSet, started: Instant) -> Option<StopReason> {
        if self.cancel.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        if visited.len() >= self.config.max_pages {
            return Some(StopReason::PageLimit);
        }
        match self.config.max_duration {
            Some(budget) if started.elapsed() >= budget => Some(StopReason::TimeBudget),
            _ => None,
        }
    }

    /// Breadth-first loop. Accepts up to `max_concurrent_pages` entries per
    /// round and merges their links back in acceptance order.
    async fn traverse(
        &self,
        context: &dyn BrowserContext,
        seed: &str,
        started: Instant,
    ) -> Traversal {
        let mut frontier = Frontier::seeded(seed);
        let mut state = Traversal::default();
        let concurrency = self.config.max_concurrent_pages.max(1);

        loop {
            let mut batch: Vec<FrontierEntry> = Vec::with_capacity(concurrency);
            let mut stop = None;

            while batch.len() < concurrency {
                if let Some(reason) = self.stop_reason(&state.visited, started) {
                    stop = Some(reason);
                    break;
                }
                let Some(entry) = frontier.pop() else {
                    break;
                };
                if state.visited.contains(&entry.url) {
                    continue;
                }
                if entry.depth > self.config.max_depth {
                    debug!(url = %entry.url, depth = entry.depth, "Skipping, max depth exceeded");
                    continue;
                }
                state.visited.insert(&entry.url);
                batch.push(entry);
            }

            if !batch.is_empty() {
                let visits = async {
                    if batch.len() == 1 {
                        vec![self.visit(context, &batch[0]).await]
                    } else {
                        stream::iter(batch.iter())
                            .map(|entry| self.visit(context, entry))
                            .buffered(concurrency)
                            .collect::<Vec<_>>()
                            .await
                    }
                };

                let outcomes = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    outcomes = visits => Some(outcomes),
                };
                let Some(outcomes) = outcomes else {
                    info!(in_flight = batch.len(), "Crawl cancelled, abandoning in-flight pages");
                    state.cancelled = true;
                    break;
                };

                for (entry, outcome) in batch.iter().zip(outcomes) {
                    if outcome.failed {
                        state.pages_failed += 1;
                    }
                    if let Some(screenshot) = outcome.screenshot {
                        state.screenshots.push(screenshot);
                    }
                    if entry.depth < self.config.max_depth {
                        let added = frontier.enqueue_links(
                            outcome.links,
                            entry.depth + 1,
                            &state.visited,
                            self.config.max_child_links_per_page,
                        );
                        debug!(url = %entry.url, added, queued = frontier.len(), "Frontier updated");
                    }
                }
            }

            if let Some(reason) = stop {
                info!(reason = reason.as_str(), "Stopping crawl");
                state.cancelled = reason == StopReason::Cancelled;
                break;
            }
            if batch.is_empty() {
                break;
            }
        }

        state
    }

    /// Open a page, process it and always close it
    async fn visit(&self, context: &dyn BrowserContext, entry: &FrontierEntry) -> PageOutcome {
        info!(url = %entry.url, depth = entry.depth, "Crawling");

        let page = match context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %entry.url, "Could not open page: {}", e);
                return PageOutcome::failed();
            }
        };

        let outcome = self.process_page(page.as_ref(), entry).await;

        if let Err(e) = page.close().await {
            debug!(url = %entry.url, "Page close failed: {}", e);
        }
        outcome
    }

    async fn process_page(&self, page: &dyn BrowserPage, entry: &FrontierEntry) -> PageOutcome {
        let response = match page
            .navigate(&entry.url, self.config.wait_strategy(), self.config.timeout)
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(url = %entry.url, "Timeout loading page");
                return PageOutcome::failed();
            }
            Err(e) => {
                warn!(url = %entry.url, "Navigation failed: {}", e);
                return PageOutcome::failed();
            }
        };

        if !response.is_success() {
            warn!(url = %entry.url, status = ?response.status, "Page load failed");
            return PageOutcome::failed();
        }

        match tokio::time::timeout(self.config.timeout, self.after_load(page, entry)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    url = %entry.url,
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Post-load processing timed out"
                );
                PageOutcome::default()
            }
        }
    }

    /// Settle, screenshot, simulate, harvest links
    async fn after_load(&self, page: &dyn BrowserPage, entry: &FrontierEntry) -> PageOutcome {
        let mut outcome = PageOutcome::default();

        tokio::time::sleep(self.config.simulation.post_load_settle).await;

        if self.config.capture_screenshots {
            match page.screenshot().await {
                Ok(png) => {
                    outcome.screenshot = Some(PageScreenshot {
                        url: entry.url.clone(),
                        captured_at: Utc::now(),
                        data_base64: BASE64.encode(png),
                    });
                }
                Err(e) => debug!(url = %entry.url, "Screenshot failed: {}", e),
            }
        }

        if self.config.simulate_user {
            self.simulator.simulate(page).await;
        }

        if entry.depth < self.config.max_depth {
            outcome.links = self.links.extract(page, &entry.url).await;
        }

        outcome
    }
}
