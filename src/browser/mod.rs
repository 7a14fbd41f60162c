// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser layer
//!
//! Async traits the crawler drives, the options passed across them, and a
//! Chrome DevTools Protocol implementation.

mod config;
mod driver;

#[cfg(feature = "cdp")]
pub mod cdp;

pub use config::{
    BrowserType, ContextOptions, Cookie, LaunchOptions, NavigationResponse, Viewport,
    WaitStrategy, DEFAULT_BROWSER_ARGS,
};
pub use driver::{BrowserContext, BrowserLauncher, BrowserPage, BrowserSession, ElementHandle};
