// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Options passed across the browser-layer boundary

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Launch arguments used by default (automation flag hidden, container friendly)
pub const DEFAULT_BROWSER_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--no-sandbox",
];

/// Rendering engine to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    pub fn as_str(self) -> &'static str {
        match self {
            BrowserType::Chromium => "chromium",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "webkit",
        }
    }
}

impl fmt::Display for BrowserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserType::Chromium),
            "firefox" => Ok(BrowserType::Firefox),
            "webkit" => Ok(BrowserType::Webkit),
            other => Err(Error::config(format!("unknown browser type '{}'", other))),
        }
    }
}

/// Viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Session cookie handed to the browser unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// URL the cookie is scoped to when no domain is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            url: None,
            secure: false,
            http_only: false,
        }
    }

    /// Parse `name=value`
    pub fn parse_pair(pair: &str) -> Option<Self> {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }

    /// Set domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Scope cookie to a URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// When a navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    /// DOMContentLoaded fired
    DomContentLoaded,
    /// load event fired
    Load,
    /// No network activity for a short period
    NetworkIdle,
}

impl WaitStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            WaitStrategy::DomContentLoaded => "domcontentloaded",
            WaitStrategy::Load => "load",
            WaitStrategy::NetworkIdle => "networkidle",
        }
    }
}

/// Browser launch options
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub browser_type: BrowserType,
    pub headless: bool,
    /// Extra command-line arguments
    pub args: Vec<String>,
    /// Explicit executable path (otherwise discovered)
    pub executable: Option<PathBuf>,
    /// Upper bound for a single browser command, navigations included
    pub command_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Chromium,
            headless: true,
            args: DEFAULT_BROWSER_ARGS.iter().map(|s| s.to_string()).collect(),
            executable: None,
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Isolated browsing context options
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub cookies: Vec<Cookie>,
    /// Headers added to every request of the context
    pub extra_headers: Vec<(String, String)>,
    /// Accept self-signed certificates
    pub ignore_https_errors: bool,
}

/// Outcome of a top-level navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResponse {
    /// Final URL after redirects
    pub url: String,
    /// Main document status, `None` if the browser reported no response
    pub status: Option<u16>,
}

impl NavigationResponse {
    pub fn new(url: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }

    /// 2xx or 3xx main document response
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(s) if (200..400).contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_type_parsing() {
        assert_eq!("Chromium".parse::<BrowserType>().unwrap(), BrowserType::Chromium);
        assert_eq!("webkit".parse::<BrowserType>().unwrap(), BrowserType::Webkit);
        assert!("lynx".parse::<BrowserType>().is_err());
        assert_eq!(
            serde_json::to_value(BrowserType::Firefox).unwrap(),
            serde_json::json!("firefox")
        );
    }

    #[test]
    fn test_cookie_pair() {
        let cookie = Cookie::parse_pair("session=abc=123").unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc=123");
        assert!(Cookie::parse_pair("novalue").is_none());
        assert!(Cookie::parse_pair("=x").is_none());
    }

    #[test]
    fn test_navigation_success() {
        assert!(NavigationResponse::new("https://a.com", Some(200)).is_success());
        assert!(NavigationResponse::new("https://a.com", Some(304)).is_success());
        assert!(!NavigationResponse::new("https://a.com", Some(404)).is_success());
        assert!(!NavigationResponse::new("https://a.com", None).is_success());
    }

    #[test]
    fn test_launch_defaults() {
        let options = LaunchOptions::default();
        assert!(options.headless);
        assert!(options.args.iter().any(|a| a == "--no-sandbox"));
    }
}
