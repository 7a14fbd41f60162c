// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event capture
//!
//! The browser layer pushes [`BrowserEvent`]s into a bounded channel. A single
//! [`NetworkCapturer`] task drains it into a [`NetworkLog`], so the log has
//! exactly one writer and needs no locking.
//!
//! The log is mutated in two phases:
//!
//! 1. **Append** (`on_request_start`): every fetch/xhr/websocket request start
//!    appends a new event. Nothing is ever removed.
//! 2. **Match** (`on_response`): a response is reconciled to an existing
//!    event. If the response carries a request ID that belongs to an
//!    unmatched event, that event wins. Otherwise the log is scanned
//!    backwards and the most recent unmatched event with the same URL is
//!    updated. The backward scan is a heuristic: under request replay two
//!    identical URLs can be in flight and the pairing may be swapped. A
//!    response that matches nothing is dropped.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::event::{BrowserEvent, EventSink, NetworkEvent, RawRequest, RawResponse};

/// Default capacity of the browser event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Create the bounded channel between the browser layer and the capturer
pub fn event_channel(capacity: usize) -> (EventSink, mpsc::Receiver<BrowserEvent>) {
    mpsc::channel(capacity.max(1))
}

/// Append-only log of captured network events
#[derive(Debug, Clone, Default)]
pub struct NetworkLog {
    events: Vec<NetworkEvent>,
    responses: u64,
}

impl NetworkLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append phase. Returns `true` if the request was retained.
    pub fn on_request_start(&mut self, request: RawRequest) -> bool {
        self.on_request_start_at(request, Utc::now())
    }

    /// Append phase with an explicit capture time
    pub fn on_request_start_at(&mut self, request: RawRequest, at: DateTime<Utc>) -> bool {
        match NetworkEvent::from_request(request, at) {
            Some(event) => {
                debug!(
                    method = %event.method,
                    url = %event.url,
                    resource_type = event.resource_type.as_str(),
                    "[Network] request"
                );
                self.events.push(event);
                true
            }
            None => false,
        }
    }

    /// Match phase. Returns `true` if an event was updated.
    pub fn on_response(&mut self, response: RawResponse) -> bool {
        self.on_response_at(response, Utc::now())
    }

    /// Match phase with an explicit arrival time
    pub fn on_response_at(&mut self, response: RawResponse, at: DateTime<Utc>) -> bool {
        match self.find_match(&response) {
            Some(index) => {
                debug!(
                    url = %response.url,
                    status = response.status,
                    "[Network] response"
                );
                let event = &mut self.events[index];
                event.apply_response(response, at);
                event.response_order = Some(self.responses);
                self.responses += 1;
                true
            }
            None => false,
        }
    }

    /// Locate the event a response belongs to
    fn find_match(&self, response: &RawResponse) -> Option<usize> {
        if let Some(ref id) = response.request_id {
            let by_id = self.events.iter().rposition(|e| {
                !e.is_matched() && e.request_id.as_deref() == Some(id.as_str())
            });
            if by_id.is_some() {
                return by_id;
            }
        }

        self.events
            .iter()
            .rposition(|e| !e.is_matched() && e.url == response.url)
    }

    /// Captured events in arrival order
    pub fn events(&self) -> &[NetworkEvent] {
        &self.events
    }

    /// Consume the log
    pub fn into_events(self) -> Vec<NetworkEvent> {
        self.events
    }

    /// Number of captured events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been captured
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events still waiting for a response
    pub fn unmatched_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_matched()).count()
    }
}

/// Single consumer of the browser event channel
pub struct NetworkCapturer {
    receiver: mpsc::Receiver<BrowserEvent>,
    log: NetworkLog,
    shutdown: CancellationToken,
}

impl NetworkCapturer {
    /// Create a capturer over the receiving half of the event channel
    pub fn new(receiver: mpsc::Receiver<BrowserEvent>, shutdown: CancellationToken) -> Self {
        Self {
            receiver,
            log: NetworkLog::new(),
            shutdown,
        }
    }

    /// Run on a background task
    pub fn spawn(self) -> CaptureHandle {
        let shutdown = self.shutdown.clone();
        let task = tokio::spawn(self.run());
        CaptureHandle { shutdown, task }
    }

    /// Consume events until the channel closes or shutdown is requested.
    /// Events already buffered when shutdown fires are still recorded.
    pub async fn run(mut self) -> NetworkLog {
        loop {
            tokio::select! {
                biased;
                event = self.receiver.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                _ = self.shutdown.cancelled() => {
                    while let Ok(event) = self.receiver.try_recv() {
                        self.handle(event);
                    }
                    break;
                }
            }
        }

        debug!(
            events = self.log.len(),
            unmatched = self.log.unmatched_count(),
            "Network capture finished"
        );
        self.log
    }

    fn handle(&mut self, event: BrowserEvent) {
        match event {
            BrowserEvent::Request(request) => {
                self.log.on_request_start(request);
            }
            BrowserEvent::Response(response) => {
                self.log.on_response(response);
            }
        }
    }
}

/// Handle to a running capturer task
pub struct CaptureHandle {
    shutdown: CancellationToken,
    task: JoinHandle<NetworkLog>,
}

impl CaptureHandle {
    /// Stop capturing and return the log
    pub async fn finish(self) -> NetworkLog {
        self.shutdown.cancel();
        match self.task.await {
            Ok(log) => log,
            Err(e) => {
                error!("Network capture task failed: {}", e);
                NetworkLog::new()
            }
        }
    }
}
