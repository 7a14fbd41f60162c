// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page network events into the capture channel
//!
//! Every page gets one pump task. Its input merges chromiumoxide's typed
//! `Network.*` listeners, which are unbounded, so nothing is dropped while
//! the capture channel applies backpressure. Request streams are polled
//! before response streams: the handler fills listeners in protocol order,
//! so a request is always forwarded before its response.

use chromiumoxide::cdp::browser_protocol::network::{
    EventRequestWillBeSent, EventResponseReceived, EventWebSocketCreated,
    EventWebSocketHandshakeResponseReceived, Headers as CdpHeaders, ResourceType as CdpResourceType,
};
use chromiumoxide::Page;
use futures::future;
use futures::stream::{self, select_with_strategy, BoxStream, PollNext};
use futures::{FutureExt, Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;
use crate::network::{BrowserEvent, EventSink, Headers, RawRequest, RawResponse};

/// Lowercased string headers from a protocol header object
pub fn headers_from_json(value: &Value) -> Headers {
    let Value::Object(map) = value else {
        return Headers::new();
    };
    map.iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.to_ascii_lowercase(), value)
        })
        .collect()
}

fn headers_of(headers: &CdpHeaders) -> Headers {
    headers_from_json(headers.inner())
}

fn resource_name(kind: &CdpResourceType) -> &str {
    kind.as_ref()
}

fn status_of(status: i64) -> Option<u16> {
    u16::try_from(status).ok()
}

/// A request start; a redirect first yields the response that caused it
pub fn request_events(event: &EventRequestWillBeSent) -> Vec<BrowserEvent> {
    let request_id = event.request_id.inner();
    let mut out = Vec::with_capacity(2);

    if let Some(redirect) = &event.redirect_response {
        if let Some(status) = status_of(redirect.status) {
            let mut response = RawResponse::new(&redirect.url, status).with_request_id(request_id);
            response.headers = headers_of(&redirect.headers);
            out.push(BrowserEvent::Response(response));
        }
    }

    let resource_type = event.r#type.as_ref().map(resource_name).unwrap_or("Other");
    let mut request = RawRequest::new(&event.request.url, &event.request.method, resource_type)
        .with_request_id(request_id);
    request.headers = headers_of(&event.request.headers);
    if let Some(body) = &event.request.post_data {
        request = request.with_body(body.as_bytes().to_vec());
    }
    out.push(BrowserEvent::Request(request));
    out
}

pub fn websocket_request(event: &EventWebSocketCreated) -> BrowserEvent {
    BrowserEvent::Request(
        RawRequest::new(&event.url, "GET", "websocket").with_request_id(event.request_id.inner()),
    )
}

pub fn response_event(event: &EventResponseReceived) -> Option<BrowserEvent> {
    let status = status_of(event.response.status)?;
    let mut response =
        RawResponse::new(&event.response.url, status).with_request_id(event.request_id.inner());
    response.headers = headers_of(&event.response.headers);
    Some(BrowserEvent::Response(response))
}

/// The handshake event carries no URL; capture pairs it by request id
pub fn handshake_event(event: &EventWebSocketHandshakeResponseReceived) -> Option<BrowserEvent> {
    let status = status_of(event.response.status)?;
    let mut response = RawResponse::new("", status).with_request_id(event.request_id.inner());
    response.headers = headers_of(&event.response.headers);
    Some(BrowserEvent::Response(response))
}

fn prefer_left(_: &mut ()) -> PollNext {
    PollNext::Left
}

/// Merged, translated network events of one page
pub async fn network_events(page: &Page) -> Result<BoxStream<'static, BrowserEvent>> {
    let requests = page
        .event_listener::<EventRequestWillBeSent>()
        .await?
        .flat_map(|event| stream::iter(request_events(&event)));
    let sockets = page
        .event_listener::<EventWebSocketCreated>()
        .await?
        .map(|event| websocket_request(&event));
    let responses = page
        .event_listener::<EventResponseReceived>()
        .await?
        .filter_map(|event| future::ready(response_event(&event)));
    let handshakes = page
        .event_listener::<EventWebSocketHandshakeResponseReceived>()
        .await?
        .filter_map(|event| future::ready(handshake_event(&event)));

    let starts = select_with_strategy(requests, sockets, prefer_left);
    let ends = stream::select(responses, handshakes);
    Ok(select_with_strategy(starts, ends, prefer_left).boxed())
}

/// Forward events into the capture sink until the stream ends or shutdown
/// fires. Events already buffered at shutdown are still forwarded.
pub async fn pump<S>(mut events: S, sink: EventSink, shutdown: CancellationToken)
where
    S: Stream<Item = BrowserEvent> + Unpin,
{
    loop {
        tokio::select! {
            biased;
            event = events.next() => match event {
                Some(event) => {
                    if sink.send(event).await.is_err() {
                        debug!("Capture channel closed");
                        return;
                    }
                }
                None => return,
            },
            _ = shutdown.cancelled() => break,
        }
    }

    while let Some(Some(event)) = events.next().now_or_never() {
        if sink.send(event).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::event_channel;
    use serde_json::json;
    use std::time::Duration;

    fn request(n: usize) -> BrowserEvent {
        BrowserEvent::Request(
            RawRequest::new(format!("https://a.com/api/{}", n), "GET", "Fetch")
                .with_request_id(n.to_string()),
        )
    }

    #[test]
    fn test_headers_from_json() {
        let headers = headers_from_json(&json!({ "Content-Type": "application/json", "X-Count": 3 }));
        assert_eq!(headers.get("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(headers.get("x-count").map(String::as_str), Some("3"));
        assert!(headers_from_json(&Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_slow_capture_loses_nothing() {
        let (sink, mut receiver) = event_channel(2);
        let events = stream::iter((0..50).map(request));
        let task = tokio::spawn(pump(events, sink, CancellationToken::new()));

        let mut received = 0usize;
        while let Some(event) = receiver.recv().await {
            tokio::time::sleep(Duration::from_millis(1)).await;
            let BrowserEvent::Request(request) = event else {
                panic!("expected request");
            };
            // arrival order is preserved
            assert_eq!(request.request_id, Some(received.to_string()));
            received += 1;
        }
        task.await.unwrap();
        assert_eq!(received, 50);
    }

    #[tokio::test]
    async fn test_buffered_events_survive_shutdown() {
        let (sink, mut receiver) = event_channel(16);
        // never ends on its own, like a live page listener
        let events = stream::iter((0..5).map(request)).chain(stream::pending());
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        pump(events, sink, shutdown).await;

        let mut received = 0;
        while receiver.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 5);
    }
}
