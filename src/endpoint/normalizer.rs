// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Endpoint normalization
//!
//! Collapses the captured network log into one record per
//! (method, parameterized path). The first event for a key becomes the
//! canonical record; later events only add observation metadata.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use super::query::extract_query_params;
use super::record::{dedup_key, endpoint_id, EndpointRecord, RuntimeObservations, DISCOVERY_SOURCE};
use super::template::parameterize_path;
use crate::network::NetworkEvent;

/// Builds the endpoint catalog from a network log
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointNormalizer;

impl EndpointNormalizer {
    /// Create a normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize events into records ordered by first appearance.
    /// Status codes and content types follow response arrival order.
    pub fn normalize(&self, events: &[NetworkEvent]) -> Vec<EndpointRecord> {
        let mut records: Vec<EndpointRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut answered: Vec<(usize, &NetworkEvent)> = Vec::new();

        for event in events {
            let parsed = match Url::parse(&event.url) {
                Ok(url) => url,
                Err(e) => {
                    debug!(url = %event.url, "Skipping unparseable URL: {}", e);
                    continue;
                }
            };

            let template = parameterize_path(parsed.path());
            let key = dedup_key(&event.method, &template);

            let slot = match index.get(&key) {
                Some(&i) => i,
                None => {
                    records.push(EndpointRecord {
                        id: endpoint_id(&event.method, &template),
                        url_template: template,
                        url_raw: event.url.clone(),
                        method: event.method.clone(),
                        protocol: parsed.scheme().to_string(),
                        discovery_source: DISCOVERY_SOURCE.to_string(),
                        runtime_observed: true,
                        runtime_observations: RuntimeObservations {
                            first_seen: event.timestamp,
                            call_count: 0,
                            status_codes: Vec::new(),
                            content_types: Vec::new(),
                        },
                        parameters: extract_query_params(parsed.query()),
                        request_headers: event.headers.clone(),
                    });
                    index.insert(key, records.len() - 1);
                    records.len() - 1
                }
            };

            records[slot].runtime_observations.call_count += 1;
            if event.status_code.is_some() {
                answered.push((slot, event));
            }
        }

        // Stable: responses without a recorded position keep request order
        answered.sort_by_key(|(_, event)| event.response_order);
        for (slot, event) in answered {
            if let Some(status) = event.status_code {
                records[slot].observe_response(status, event.content_type());
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::network::{NetworkLog, RawRequest, RawResponse};

    fn log_of(entries: &[(&str, &str, Option<u16>)]) -> Vec<NetworkEvent> {
        let mut log = NetworkLog::new();
        let start = Utc::now();
        for (i, (method, url, status)) in entries.iter().enumerate() {
            let at = start + Duration::milliseconds(i as i64);
            log.on_request_start_at(RawRequest::new(*url, *method, "fetch"), at);
            if let Some(status) = status {
                log.on_response_at(
                    RawResponse::new(*url, *status).with_header("Content-Type", "application/json"),
                    at,
                );
            }
        }
        log.into_events()
    }

    #[test]
    fn test_ids_collapse_to_one_template() {
        let events = log_of(&[
            ("GET", "https://a.com/users/123", Some(200)),
            ("GET", "https://a.com/users/456", Some(404)),
        ]);
        let records = EndpointNormalizer::new().normalize(&events);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.url_template, "/users/{userId}");
        assert_eq!(record.url_raw, "https://a.com/users/123");
        assert_eq!(record.runtime_observations.call_count, 2);
        assert_eq!(record.runtime_observations.status_codes, vec![200, 404]);
        assert_eq!(record.runtime_observations.content_types, vec!["application/json"]);
        assert_eq!(record.runtime_observations.first_seen, events[0].timestamp);
    }

    #[test]
    fn test_status_codes_follow_response_arrival() {
        let start = Utc::now();
        let mut log = NetworkLog::new();
        log.on_request_start_at(RawRequest::new("https://a.com/orders/1", "GET", "fetch"), start);
        log.on_request_start_at(RawRequest::new("https://a.com/orders/2", "GET", "fetch"), start);
        // the second request is answered first
        log.on_response_at(
            RawResponse::new("https://a.com/orders/2", 500).with_header("Content-Type", "text/html"),
            start + Duration::milliseconds(5),
        );
        log.on_response_at(
            RawResponse::new("https://a.com/orders/1", 200)
                .with_header("Content-Type", "application/json"),
            start + Duration::milliseconds(9),
        );

        let records = EndpointNormalizer::new().normalize(&log.into_events());
        let observations = &records[0].runtime_observations;
        assert_eq!(records[0].url_raw, "https://a.com/orders/1");
        assert_eq!(observations.call_count, 2);
        assert_eq!(observations.status_codes, vec![500, 200]);
        assert_eq!(observations.content_types, vec!["text/html", "application/json"]);
    }

    #[test]
    fn test_method_splits_records() {
        let events = log_of(&[
            ("GET", "https://a.com/api/cart", None),
            ("POST", "https://a.com/api/cart", None),
        ]);
        let records = EndpointNormalizer::new().normalize(&events);
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn test_record_fields() {
        let events = log_of(&[("GET", "https://a.com/search?q=x&page=1", Some(200))]);
        let record = &EndpointNormalizer::new().normalize(&events)[0];

        assert_eq!(record.protocol, "https");
        assert_eq!(record.discovery_source, "runtime_network");
        assert!(record.runtime_observed);
        assert_eq!(record.id, endpoint_id("GET", "/search"));
        let names: Vec<_> = record.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["q", "page"]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let events = log_of(&[
            ("GET", "https://a.com/users/1", Some(200)),
            ("GET", "https://a.com/users/550e8400-e29b-41d4-a716-446655440000", Some(200)),
            ("PUT", "https://a.com/users/2/settings", Some(204)),
            ("GET", "wss://a.com/live", None),
        ]);
        let normalizer = EndpointNormalizer::new();
        let first = normalizer.normalize(&events);
        let second = normalizer.normalize(&events);

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(first.len() <= events.len());
    }

    #[test]
    fn test_identifier_is_order_independent() {
        let forward = log_of(&[
            ("GET", "https://a.com/users/123", None),
            ("GET", "https://a.com/users/456", None),
        ]);
        let reverse = log_of(&[
            ("GET", "https://a.com/users/456", None),
            ("GET", "https://a.com/users/123", None),
        ]);
        let normalizer = EndpointNormalizer::new();
        assert_eq!(normalizer.normalize(&forward)[0].id, normalizer.normalize(&reverse)[0].id);
    }

    #[test]
    fn test_unparseable_url_is_skipped() {
        let mut events = log_of(&[("GET", "https://a.com/ok", None)]);
        events[0].url = "not a url".to_string();
        assert!(EndpointNormalizer::new().normalize(&events).is_empty());
    }

    #[test]
    fn test_empty_log() {
        assert!(EndpointNormalizer::new().normalize(&[]).is_empty());
    }
}
