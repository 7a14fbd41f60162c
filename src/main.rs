// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! apiscout CLI
//!
//! Crawls a target with a local Chromium and writes the endpoint catalog as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use apiscout::{BrowserType, CdpLauncher, Cookie, CrawlConfig, CrawlResult, Crawler};

const ENDPOINTS_SHOWN: usize = 30;
const PARAMETERS_SHOWN: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "apiscout", version, about = "Discover API endpoints by crawling a site in a real browser")]
struct Cli {
    /// Target URL (http or https)
    url: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum pages to crawl
    #[arg(long)]
    pages: Option<usize>,

    /// Maximum link depth
    #[arg(long)]
    depth: Option<u32>,

    /// Per-page timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Wall-clock budget for the whole crawl, in seconds
    #[arg(long)]
    max_duration: Option<u64>,

    /// Pages visited concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<BrowserType>,

    /// Browser executable
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Wait for DOMContentLoaded instead of network idle
    #[arg(long)]
    no_network_idle: bool,

    /// Skip scroll/click/input simulation
    #[arg(long)]
    no_simulate: bool,

    /// Capture a screenshot of every page
    #[arg(long)]
    screenshots: bool,

    /// User-Agent override
    #[arg(long)]
    user_agent: Option<String>,

    /// Session cookie as name=value (repeatable)
    #[arg(long = "cookie", value_name = "NAME=VALUE")]
    cookies: Vec<String>,

    /// Authorization header value
    #[arg(long)]
    auth_header: Option<String>,

    /// Output file (default: scan-<target>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(CrawlConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<CrawlConfig>(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => CrawlConfig::default(),
        };

        if let Some(url) = self.url {
            config.target_url = url;
        }
        if config.target_url.is_empty() {
            bail!("no target URL given");
        }
        if let Some(pages) = self.pages {
            config.max_pages = pages;
        }
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = self.max_duration {
            config.max_duration = Some(Duration::from_secs(secs));
        }
        if let Some(n) = self.concurrency {
            config.max_concurrent_pages = n;
        }
        if let Some(browser) = self.browser {
            config.browser_type = browser;
        }
        if let Some(path) = self.chrome {
            config.browser_executable = Some(path);
        }
        if self.headed {
            config.headless = false;
        }
        if self.no_network_idle {
            config.wait_for_network_idle = false;
        }
        if self.no_simulate {
            config.simulate_user = false;
        }
        if self.screenshots {
            config.capture_screenshots = true;
        }
        if let Some(ua) = self.user_agent {
            config.user_agent = Some(ua);
        }
        for pair in &self.cookies {
            match Cookie::parse_pair(pair) {
                Some(cookie) => config.cookies.push(cookie),
                None => bail!("invalid cookie '{}', expected NAME=VALUE", pair),
            }
        }
        if let Some(header) = self.auth_header {
            config.auth_header = Some(header);
        }

        Ok((config, self.output))
    }
}

/// `scan-<target>.json` with scheme stripped and separators replaced
fn default_output(target: &str) -> PathBuf {
    let stripped = target
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let name: String = stripped
        .chars()
        .map(|c| match c {
            '/' | ':' | '\\' | '?' | '*' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect();
    PathBuf::from(format!("scan-{}.json", name))
}

fn print_summary(result: &CrawlResult) {
    let stats = &result.statistics;
    println!("\n=== Scan Results ===");
    println!("Target:            {}", result.target_url);
    println!("Pages crawled:     {} ({} failed)", stats.pages_crawled, stats.pages_failed);
    println!("Network requests:  {}", stats.network_requests);
    println!("Unique endpoints:  {}", stats.unique_endpoints);
    println!("Screenshots:       {}", stats.screenshots_captured);
    println!("Duration:          {}ms", stats.duration_ms);
    if result.cancelled {
        println!("(crawl was interrupted; results are partial)");
    }

    if result.endpoints.is_empty() {
        return;
    }

    println!("\n=== Endpoints ===");
    for (idx, endpoint) in result.endpoints.iter().take(ENDPOINTS_SHOWN).enumerate() {
        println!("{:>3}. {:6} {}", idx + 1, endpoint.method, endpoint.url_template);
        if !endpoint.parameters.is_empty() {
            let mut names = endpoint
                .parameters
                .iter()
                .take(PARAMETERS_SHOWN)
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let extra = endpoint.parameters.len().saturating_sub(PARAMETERS_SHOWN);
            if extra > 0 {
                names.push_str(&format!(" ... (+{} more)", extra));
            }
            println!("     Parameters: {}", names);
        }
    }
    if result.endpoints.len() > ENDPOINTS_SHOWN {
        println!("  ... and {} more", result.endpoints.len() - ENDPOINTS_SHOWN);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, output) = cli.into_config()?;
    let output = output.unwrap_or_else(|| default_output(&config.target_url));

    println!("Target:    {}", config.target_url);
    println!("Max pages: {}", config.max_pages);
    println!("Max depth: {}", config.max_depth);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with data collected so far");
            on_signal.cancel();
        }
    });

    let crawler = Crawler::new(Arc::new(CdpLauncher::new()), config).with_cancellation(cancel);
    let result = crawler.run().await.context("crawl failed")?;

    print_summary(&result);

    result
        .write_json(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("\nFull results saved to: {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let directive = if cli.verbose { "apiscout=debug" } else { "apiscout=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_name() {
        assert_eq!(
            default_output("https://shop.example.com:8443/app/"),
            PathBuf::from("scan-shop.example.com-8443-app-.json")
        );
        assert_eq!(default_output("http://localhost"), PathBuf::from("scan-localhost.json"));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "apiscout",
            "https://a.com",
            "--pages",
            "3",
            "--cookie",
            "sid=1",
            "--no-network-idle",
            "--browser",
            "chromium",
        ]);
        let (config, output) = cli.into_config().unwrap();
        assert_eq!(config.target_url, "https://a.com");
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.max_depth, 3);
        assert!(!config.wait_for_network_idle);
        assert_eq!(config.cookies[0].name, "sid");
        assert!(output.is_none());
    }

    #[test]
    fn test_config_file_with_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        std::fs::write(&path, r#"{ "target_url": "https://a.com", "max_pages": 40, "max_depth": 1 }"#)
            .unwrap();

        let cli = Cli::parse_from(["apiscout", "--config", path.to_str().unwrap(), "--depth", "2"]);
        let (config, _) = cli.into_config().unwrap();
        assert_eq!(config.max_pages, 40);
        assert_eq!(config.max_depth, 2);
    }

    #[test]
    fn test_missing_target() {
        let cli = Cli::parse_from(["apiscout"]);
        assert!(cli.into_config().is_err());
    }
}
