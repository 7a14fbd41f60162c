// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Crawl engine: scheduler, frontier, interaction and link harvesting

mod config;
mod crawler;
mod frontier;
mod interaction;
mod links;
mod result;

pub use config::{CrawlConfig, SimulationConfig};
pub use crawler::Crawler;
pub use frontier::{Frontier, FrontierEntry, VisitedSet};
pub use interaction::{
    InteractionSimulator, SimulationReport, CLICKABLE_SELECTOR, TEXT_INPUT_SELECTOR,
};
pub use links::{filter_same_origin, same_authority, LinkExtractor, LINK_HARVEST_SCRIPT};
pub use result::{CrawlResult, CrawlStatistics, PageScreenshot};
