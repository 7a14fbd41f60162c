// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Header map with lowercased names
pub type Headers = BTreeMap<String, String>;

/// Sending half of the browser-layer event channel
pub type EventSink = mpsc::Sender<BrowserEvent>;

/// Lowercase header names so lookups are case-insensitive
pub fn normalize_headers<I, K, V>(headers: I) -> Headers
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    headers
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
        .collect()
}

/// Resource classification assigned by the browser layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Fetch API
    Fetch,
    /// XMLHttpRequest
    Xhr,
    /// WebSocket handshake
    WebSocket,
    /// Documents, scripts, images, fonts...
    Other,
}

impl ResourceType {
    /// Classify a browser-reported resource type name (case-insensitive)
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "fetch" => ResourceType::Fetch,
            "xhr" => ResourceType::Xhr,
            "websocket" => ResourceType::WebSocket,
            _ => ResourceType::Other,
        }
    }

    /// Only fetch, xhr and websocket traffic is retained
    pub fn is_captured(self) -> bool {
        !matches!(self, ResourceType::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Fetch => "fetch",
            ResourceType::Xhr => "xhr",
            ResourceType::WebSocket => "websocket",
            ResourceType::Other => "other",
        }
    }
}

/// Request as reported by the browser layer when it starts
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// Browser-assigned request ID, if the browser layer has one
    pub request_id: Option<String>,
    pub url: String,
    pub method: String,
    pub headers: Headers,
    /// Raw body bytes; non-UTF-8 payloads are dropped on capture
    pub body: Option<Vec<u8>>,
    /// Resource type name as the browser reports it ("fetch", "XHR", ...)
    pub resource_type: String,
}

impl RawRequest {
    /// Create a new raw request
    pub fn new(
        url: impl Into<String>,
        method: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            request_id: None,
            url: url.into(),
            method: method.into(),
            headers: Headers::new(),
            body: None,
            resource_type: resource_type.into(),
        }
    }

    /// Set request ID
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Response as reported by the browser layer
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// ID of the originating request, if the browser layer has one
    pub request_id: Option<String>,
    pub url: String,
    pub status: u16,
    pub headers: Headers,
}

impl RawResponse {
    /// Create a new raw response
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            request_id: None,
            url: url.into(),
            status,
            headers: Headers::new(),
        }
    }

    /// Set request ID
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }
}

/// Message pushed by the browser layer into the capture channel
#[derive(Debug, Clone)]
pub enum BrowserEvent {
    Request(RawRequest),
    Response(RawResponse),
}

/// One observed request/response pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEvent {
    /// Browser-assigned request ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Absolute request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Request headers (lowercased names)
    pub headers: Headers,
    /// Request body, absent when binary or undecodable
    pub post_data: Option<String>,
    /// Resource classification
    pub resource_type: ResourceType,
    /// Capture timestamp
    pub timestamp: DateTime<Utc>,
    /// Status code, set once the response arrives
    pub status_code: Option<u16>,
    /// Response headers, set once the response arrives
    pub response_headers: Option<Headers>,
    /// Latency between request start and response arrival
    pub response_time_ms: Option<f64>,
    /// Position of this event's response among all responses of its log
    #[serde(skip)]
    pub response_order: Option<u64>,
}

impl NetworkEvent {
    /// Build an event from a raw request, or `None` for uncaptured resource types
    pub fn from_request(raw: RawRequest, timestamp: DateTime<Utc>) -> Option<Self> {
        let resource_type = ResourceType::from_raw(&raw.resource_type);
        if !resource_type.is_captured() {
            return None;
        }

        let post_data = raw.body.and_then(|bytes| String::from_utf8(bytes).ok());

        Some(Self {
            request_id: raw.request_id,
            url: raw.url,
            method: raw.method,
            headers: raw.headers,
            post_data,
            resource_type,
            timestamp,
            status_code: None,
            response_headers: None,
            response_time_ms: None,
            response_order: None,
        })
    }

    /// Whether a response has been reconciled to this event
    pub fn is_matched(&self) -> bool {
        self.status_code.is_some()
    }

    /// Fill in response data
    pub fn apply_response(&mut self, response: RawResponse, received_at: DateTime<Utc>) {
        let latency = received_at.signed_duration_since(self.timestamp);
        self.status_code = Some(response.status);
        self.response_headers = Some(response.headers);
        self.response_time_ms = latency
            .num_microseconds()
            .map(|us| us.max(0) as f64 / 1000.0);
    }

    /// Response content type, if any
    pub fn content_type(&self) -> Option<&str> {
        self.response_headers
            .as_ref()
            .and_then(|h| h.get("content-type"))
            .map(String::as_str)
    }
}
