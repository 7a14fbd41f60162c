// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # apiscout - Runtime API Endpoint Discovery
//!
//! Drives a real browser through a target site, records the API traffic the
//! pages generate and collapses it into a normalized endpoint catalog.
//!
//! ## Features
//!
//! - Breadth-first crawl with page, depth, per-page time and wall-clock budgets
//! - Passive capture of fetch/xhr/websocket traffic across the whole session
//! - Scroll, click and input simulation to trigger lazy endpoints
//! - Same-origin link harvesting
//! - Endpoint normalization: `/users/123` and `/users/456` become `/users/{userId}`
//! - Authenticated scans via cookies and an `Authorization` header
//! - Chrome DevTools Protocol driver (feature `cdp`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use apiscout::{CdpLauncher, CrawlConfig, Crawler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlConfig::new("https://example.com")
//!         .max_pages(20)
//!         .max_depth(2);
//!
//!     let crawler = Crawler::new(Arc::new(CdpLauncher::new()), config);
//!     let result = crawler.run().await?;
//!
//!     for endpoint in &result.endpoints {
//!         println!("{} {}", endpoint.method, endpoint.url_template);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod crawl;
pub mod endpoint;
pub mod error;
pub mod network;

// Re-exports for convenience

// Browser layer
pub use browser::{
    BrowserContext, BrowserLauncher, BrowserPage, BrowserSession, BrowserType, ContextOptions,
    Cookie, ElementHandle, LaunchOptions, NavigationResponse, Viewport, WaitStrategy,
};
#[cfg(feature = "cdp")]
pub use browser::cdp::CdpLauncher;

// Crawl engine
pub use crawl::{
    CrawlConfig, CrawlResult, CrawlStatistics, Crawler, InteractionSimulator, LinkExtractor,
    PageScreenshot, SimulationConfig,
};

// Endpoints
pub use endpoint::{EndpointNormalizer, EndpointRecord, Parameter, RuntimeObservations};

// Errors
pub use error::{Error, ErrorContext, Result};

// Network capture
pub use network::{NetworkCapturer, NetworkEvent, NetworkLog, ResourceType};

/// apiscout version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
