// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Chromium discovery and launch configuration

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chromiumoxide::browser::BrowserConfig;
use tracing::debug;

use crate::browser::config::LaunchOptions;
use crate::error::{Error, Result};

/// Executable names searched on `PATH`, in order
pub const CHROMIUM_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Environment variable overriding executable discovery
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

static PROFILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Locate the Chromium executable.
///
/// An explicit path must exist. `Ok(None)` leaves detection to chromiumoxide,
/// which also knows the platform install locations.
pub fn find_executable(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(Error::launch(
            "chromium",
            format!("executable not found: {}", path.display()),
        ));
    }

    if let Some(path) = std::env::var_os(CHROME_PATH_ENV).map(PathBuf::from) {
        if path.is_file() {
            return Ok(Some(path));
        }
        debug!(path = %path.display(), "{} does not point to a file", CHROME_PATH_ENV);
    }

    let search_path = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&search_path) {
        for name in CHROMIUM_CANDIDATES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }
    }

    Ok(None)
}

/// Fresh private profile directory for one browser instance
pub fn profile_dir() -> PathBuf {
    let n = PROFILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("apiscout-{}-{}", std::process::id(), n))
}

/// Command-line arguments on top of chromiumoxide's defaults
pub fn launch_args(options: &LaunchOptions) -> Vec<String> {
    let mut args = vec![
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
    ];
    args.extend(options.args.iter().cloned());
    args
}

/// Build the chromiumoxide launch configuration
pub fn browser_config(options: &LaunchOptions, profile: &Path) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .user_data_dir(profile)
        .request_timeout(options.command_timeout)
        .args(launch_args(options));

    if !options.headless {
        builder = builder.with_head();
    }
    if let Some(executable) = find_executable(options.executable.as_deref())? {
        debug!(executable = %executable.display(), "Using browser executable");
        builder = builder.chrome_executable(executable);
    }

    builder.build().map_err(|e| Error::launch("chromium", e))
}
