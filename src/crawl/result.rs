// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Crawl output handed to downstream analysis

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointRecord;
use crate::error::Result;
use crate::network::NetworkEvent;

/// PNG screenshot of a crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageScreenshot {
    pub url: String,
    pub captured_at: DateTime<Utc>,
    /// Base64-encoded PNG
    pub data_base64: String,
}

/// Run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStatistics {
    /// Pages accepted from the frontier
    pub pages_crawled: usize,
    /// Accepted pages whose navigation failed
    pub pages_failed: usize,
    /// Captured network events
    pub network_requests: usize,
    pub unique_endpoints: usize,
    pub screenshots_captured: usize,
    pub duration_ms: u64,
}

/// Result of a crawl run. Field names are stable across versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub target_url: String,
    pub started_at: DateTime<Utc>,
    /// Endpoint catalog ordered by first appearance
    pub endpoints: Vec<EndpointRecord>,
    /// Captured traffic in arrival order
    pub network_log: Vec<NetworkEvent>,
    /// Visited URLs in visit order
    pub visited_urls: Vec<String>,
    #[serde(default)]
    pub screenshots: Vec<PageScreenshot>,
    /// The run was cut short by cancellation
    #[serde(default)]
    pub cancelled: bool,
    pub statistics: CrawlStatistics,
}

impl CrawlResult {
    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty JSON to `path`
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
