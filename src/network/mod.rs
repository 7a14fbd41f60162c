// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event capture and reconciliation

mod capture;
mod event;

pub use capture::{event_channel, CaptureHandle, NetworkCapturer, NetworkLog, EVENT_CHANNEL_CAPACITY};
pub use event::{
    normalize_headers, BrowserEvent, EventSink, Headers, NetworkEvent, RawRequest, RawResponse,
    ResourceType,
};
