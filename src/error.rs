// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for apiscout
//!
//! Only launch and configuration failures ever leave [`crate::Crawler::run`].
//! Everything else (navigation, interaction, capture) is absorbed by the
//! crawl engine and reported through `tracing`, but the variants still carry
//! enough context (URL, status, operation) to produce a useful log line.

use thiserror::Error;

/// Result type alias for apiscout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// Browser could not be launched or initialized
    #[error("Failed to launch {browser}: {reason}")]
    Launch { browser: String, reason: String },

    /// Invalid crawl configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Navigation error with context
    #[error("Navigation failed to {url}: {reason}")]
    NavigationFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// Script evaluation raised inside the page
    #[error("Script error: {message}")]
    Script { message: String },

    /// Element is detached, hidden or otherwise not actionable
    #[error("Element error: {0}")]
    Element(String),

    /// DevTools protocol returned an error for a command
    #[error("Protocol error in {method}: {message}")]
    Protocol { method: String, message: String },

    /// Page, context or session has already been closed
    #[error("Browser has been closed")]
    BrowserClosed,

    /// DevTools client error
    #[cfg(feature = "cdp")]
    #[error("DevTools error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a launch error
    pub fn launch(browser: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Launch {
            browser: browser.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a navigation error with full context
    pub fn navigation_failed(
        url: impl Into<String>,
        status: Option<u16>,
        reason: impl Into<String>,
    ) -> Self {
        Error::NavigationFailed {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: None,
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a script error
    pub fn script<S: Into<String>>(msg: S) -> Self {
        Error::Script {
            message: msg.into(),
        }
    }

    /// Create an element error
    pub fn element<S: Into<String>>(msg: S) -> Self {
        Error::Element(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(method: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Protocol {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this error must abort a whole crawl run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Launch { .. } | Error::Config(_))
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::NavigationFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::NavigationFailed { url, .. } => Some(url),
            Error::Timeout { url: Some(u), .. } => Some(u),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to timeout errors
    fn with_url(self, url: &str) -> Result<T>;

    /// Prefix the error message with an operation description
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Timeout {
                operation,
                duration_ms,
                ..
            } => Error::Timeout {
                operation,
                duration_ms,
                url: Some(url.to_string()),
            },
            other => other,
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}
