// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! User-interaction simulation
//!
//! Provokes traffic that only happens on user input. Three steps run in a
//! fixed order (scroll, click, fill). Every step absorbs its own failures, so
//! nothing here ever returns an error.

use serde_json::Value;
use tracing::debug;

use super::config::SimulationConfig;
use crate::browser::BrowserPage;
use crate::error::Result;

/// Elements that usually react to clicks
pub const CLICKABLE_SELECTOR: &str = r#"button, a[role="button"], [onclick]"#;

/// Inputs that usually drive autocomplete or search calls
pub const TEXT_INPUT_SELECTOR: &str = r#"input[type="text"], input[type="search"]"#;

const SCROLL_HEIGHT_SCRIPT: &str = "document.body ? document.body.scrollHeight : 0";

/// What the simulator managed to do on a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub scroll_steps: u32,
    pub clicked: usize,
    pub filled: usize,
    /// Steps or elements that failed and were skipped
    pub failures: usize,
}

/// Drives scroll/click/fill on a loaded page
#[derive(Debug, Clone, Default)]
pub struct InteractionSimulator {
    config: SimulationConfig,
}

impl InteractionSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run all steps against `page`
    pub async fn simulate(&self, page: &dyn BrowserPage) -> SimulationReport {
        let mut report = SimulationReport::default();

        match self.scroll(page).await {
            Ok(steps) => report.scroll_steps = steps,
            Err(e) => {
                debug!("Scroll simulation failed: {}", e);
                report.failures += 1;
            }
        }

        self.click(page, &mut report).await;
        self.fill(page, &mut report).await;

        debug!(
            scroll_steps = report.scroll_steps,
            clicked = report.clicked,
            filled = report.filled,
            failures = report.failures,
            "Interaction simulation finished"
        );
        report
    }

    /// Scroll in fixed steps until the height measured at the start is covered
    async fn scroll(&self, page: &dyn BrowserPage) -> Result<u32> {
        let height = match page.evaluate(SCROLL_HEIGHT_SCRIPT).await? {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        };
        let step = self.config.scroll_step_px.max(1);
        let script = format!("window.scrollBy(0, {})", step);

        let mut scrolled: u64 = 0;
        let mut steps: u32 = 0;
        loop {
            page.evaluate(&script).await?;
            scrolled += u64::from(step);
            steps += 1;
            if scrolled as f64 >= height {
                break;
            }
            tokio::time::sleep(self.config.scroll_interval).await;
        }

        tokio::time::sleep(self.config.scroll_settle).await;
        Ok(steps)
    }

    async fn click(&self, page: &dyn BrowserPage, report: &mut SimulationReport) {
        let candidates = match page.query_selector_all(CLICKABLE_SELECTOR).await {
            Ok(elements) => elements,
            Err(e) => {
                debug!("Click simulation failed: {}", e);
                report.failures += 1;
                return;
            }
        };

        for element in candidates.iter().take(self.config.max_clicks) {
            match element.is_visible().await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Visibility check failed: {}", e);
                    report.failures += 1;
                    continue;
                }
            }

            match element.click(self.config.click_timeout).await {
                Ok(()) => {
                    report.clicked += 1;
                    tokio::time::sleep(self.config.settle_delay).await;
                }
                Err(e) => {
                    debug!("Click failed: {}", e);
                    report.failures += 1;
                }
            }
        }
    }

    async fn fill(&self, page: &dyn BrowserPage, report: &mut SimulationReport) {
        let inputs = match page.query_selector_all(TEXT_INPUT_SELECTOR).await {
            Ok(elements) => elements,
            Err(e) => {
                debug!("Form fill simulation failed: {}", e);
                report.failures += 1;
                return;
            }
        };

        for input in inputs.iter().take(self.config.max_inputs) {
            match input.fill(&self.config.sentinel_text).await {
                Ok(()) => {
                    report.filled += 1;
                    tokio::time::sleep(self.config.settle_delay).await;
                }
                Err(e) => {
                    debug!("Fill failed: {}", e);
                    report.failures += 1;
                }
            }
        }
    }
}
