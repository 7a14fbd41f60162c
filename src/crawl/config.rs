// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Crawl configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::browser::{
    BrowserType, ContextOptions, Cookie, LaunchOptions, Viewport, WaitStrategy,
    DEFAULT_BROWSER_ARGS,
};
use crate::error::{Error, Result};

/// Durations serialized as integer milliseconds
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
        }
    }
}

/// User-interaction simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Pixels per scroll step
    pub scroll_step_px: u32,
    /// Pause between scroll steps
    #[serde(rename = "scroll_interval_ms", with = "duration_ms")]
    pub scroll_interval: Duration,
    /// Pause after scrolling finished
    #[serde(rename = "scroll_settle_ms", with = "duration_ms")]
    pub scroll_settle: Duration,
    /// Clickable elements considered per page
    pub max_clicks: usize,
    #[serde(rename = "click_timeout_ms", with = "duration_ms")]
    pub click_timeout: Duration,
    /// Text inputs filled per page
    pub max_inputs: usize,
    /// Pause after each click or fill
    #[serde(rename = "settle_delay_ms", with = "duration_ms")]
    pub settle_delay: Duration,
    /// Value typed into inputs
    pub sentinel_text: String,
    /// Pause after a successful navigation before anything else happens
    #[serde(rename = "post_load_settle_ms", with = "duration_ms")]
    pub post_load_settle: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scroll_step_px: 100,
            scroll_interval: Duration::from_millis(100),
            scroll_settle: Duration::from_secs(1),
            max_clicks: 5,
            click_timeout: Duration::from_secs(2),
            max_inputs: 3,
            settle_delay: Duration::from_millis(500),
            sentinel_text: "test".to_string(),
            post_load_settle: Duration::from_secs(1),
        }
    }
}

impl SimulationConfig {
    /// All pauses set to zero; useful against fast local targets
    pub fn instant() -> Self {
        Self {
            scroll_interval: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            settle_delay: Duration::ZERO,
            post_load_settle: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Crawl configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seed URL (absolute http/https)
    pub target_url: String,
    /// Maximum pages to visit
    pub max_pages: usize,
    /// Maximum link depth from the seed
    pub max_depth: u32,
    /// Per-page budget for navigation and for post-load work
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Duration,
    /// Optional wall-clock budget for the whole run
    #[serde(rename = "max_duration_ms", with = "duration_ms::option")]
    pub max_duration: Option<Duration>,
    /// Child links enqueued per page
    pub max_child_links_per_page: usize,
    pub headless: bool,
    pub browser_type: BrowserType,
    pub browser_args: Vec<String>,
    /// Explicit browser executable
    pub browser_executable: Option<PathBuf>,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub cookies: Vec<Cookie>,
    /// Sent as the `Authorization` header on every request
    pub auth_header: Option<String>,
    pub ignore_https_errors: bool,
    /// Scroll, click and type on every loaded page
    pub simulate_user: bool,
    /// Wait for network idle instead of DOMContentLoaded
    pub wait_for_network_idle: bool,
    pub capture_screenshots: bool,
    /// Pages visited concurrently
    pub max_concurrent_pages: usize,
    /// Advisory only; robots.txt is not fetched
    pub respect_robots_txt: bool,
    pub simulation: SimulationConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            max_pages: 10,
            max_depth: 3,
            timeout: Duration::from_millis(300_000),
            max_duration: None,
            max_child_links_per_page: 5,
            headless: true,
            browser_type: BrowserType::Chromium,
            browser_args: DEFAULT_BROWSER_ARGS.iter().map(|s| s.to_string()).collect(),
            browser_executable: None,
            viewport: Viewport::default(),
            user_agent: None,
            cookies: Vec::new(),
            auth_header: None,
            ignore_https_errors: true,
            simulate_user: true,
            wait_for_network_idle: true,
            capture_screenshots: false,
            max_concurrent_pages: 1,
            respect_robots_txt: true,
            simulation: SimulationConfig::default(),
        }
    }
}

impl CrawlConfig {
    /// Configuration for a seed URL with default budgets
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Self::default()
        }
    }

    /// Set max pages
    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set max depth
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set per-page timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set wall-clock budget
    pub fn max_duration(mut self, budget: Duration) -> Self {
        self.max_duration = Some(budget);
        self
    }

    pub fn max_child_links_per_page(mut self, cap: usize) -> Self {
        self.max_child_links_per_page = cap;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn browser_type(mut self, browser_type: BrowserType) -> Self {
        self.browser_type = browser_type;
        self
    }

    pub fn browser_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.browser_executable = Some(path.into());
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a session cookie
    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn auth_header(mut self, value: impl Into<String>) -> Self {
        self.auth_header = Some(value.into());
        self
    }

    pub fn simulate_user(mut self, enabled: bool) -> Self {
        self.simulate_user = enabled;
        self
    }

    pub fn wait_for_network_idle(mut self, enabled: bool) -> Self {
        self.wait_for_network_idle = enabled;
        self
    }

    pub fn capture_screenshots(mut self, enabled: bool) -> Self {
        self.capture_screenshots = enabled;
        self
    }

    pub fn max_concurrent_pages(mut self, n: usize) -> Self {
        self.max_concurrent_pages = n;
        self
    }

    pub fn simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    /// Check budgets and parse the seed URL
    pub fn validate(&self) -> Result<Url> {
        let seed = Url::parse(&self.target_url).map_err(|e| {
            Error::config(format!("invalid target url '{}': {}", self.target_url, e))
        })?;
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "target url must be http or https, got '{}'",
                seed.scheme()
            )));
        }
        if self.max_pages == 0 {
            return Err(Error::config("max_pages must be at least 1"));
        }
        if self.max_concurrent_pages == 0 {
            return Err(Error::config("max_concurrent_pages must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        Ok(seed)
    }

    /// How navigations are awaited
    pub fn wait_strategy(&self) -> WaitStrategy {
        if self.wait_for_network_idle {
            WaitStrategy::NetworkIdle
        } else {
            WaitStrategy::DomContentLoaded
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            browser_type: self.browser_type,
            headless: self.headless,
            args: self.browser_args.clone(),
            executable: self.browser_executable.clone(),
            command_timeout: self.timeout,
        }
    }

    /// Context options; cookies without a domain are scoped to the seed
    pub fn context_options(&self, seed: &Url) -> ContextOptions {
        let cookies = self
            .cookies
            .iter()
            .cloned()
            .map(|cookie| {
                if cookie.domain.is_none() && cookie.url.is_none() {
                    cookie.url(seed.as_str())
                } else {
                    cookie
                }
            })
            .collect();

        let extra_headers = self
            .auth_header
            .iter()
            .map(|value| ("Authorization".to_string(), value.clone()))
            .collect();

        ContextOptions {
            viewport: self.viewport,
            user_agent: self.user_agent.clone(),
            cookies,
            extra_headers,
            ignore_https_errors: self.ignore_https_errors,
        }
    }
}
