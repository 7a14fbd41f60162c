// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Endpoint catalog records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::query::Parameter;
use crate::network::Headers;

/// Provenance tag for endpoints observed in live traffic
pub const DISCOVERY_SOURCE: &str = "runtime_network";

/// Hex characters kept from the SHA-256 digest
pub const ENDPOINT_ID_LENGTH: usize = 16;

/// Deduplication key for a method and path template
pub fn dedup_key(method: &str, template: &str) -> String {
    format!("{}:{}", method, template)
}

/// Stable identifier: hex SHA-256 prefix of the dedup key
pub fn endpoint_id(method: &str, template: &str) -> String {
    let digest = Sha256::digest(dedup_key(method, template).as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(ENDPOINT_ID_LENGTH);
    id
}

/// What was observed for an endpoint across the crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeObservations {
    /// Capture time of the first event collapsed into the record
    pub first_seen: DateTime<Utc>,
    /// Number of events collapsed into the record
    pub call_count: u64,
    /// Status codes in response arrival order (duplicates kept)
    pub status_codes: Vec<u16>,
    /// Distinct response content types in response arrival order
    pub content_types: Vec<String>,
}

/// Normalized endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Stable identifier derived from method and template
    pub id: String,
    /// Parameterized path template
    pub url_template: String,
    /// First raw URL seen for this endpoint
    pub url_raw: String,
    /// HTTP method
    pub method: String,
    /// URL scheme (http, https, ws, wss)
    pub protocol: String,
    /// Always [`DISCOVERY_SOURCE`]
    pub discovery_source: String,
    pub runtime_observed: bool,
    pub runtime_observations: RuntimeObservations,
    /// Query parameters of the first raw URL
    pub parameters: Vec<Parameter>,
    /// Request headers of the first raw request
    pub request_headers: Headers,
}

impl EndpointRecord {
    /// Dedup key of this record
    pub fn key(&self) -> String {
        dedup_key(&self.method, &self.url_template)
    }

    /// Fold a response into the record; responses must come in arrival order
    pub(crate) fn observe_response(&mut self, status: u16, content_type: Option<&str>) {
        let observations = &mut self.runtime_observations;
        observations.status_codes.push(status);
        if let Some(ct) = content_type {
            if !observations.content_types.iter().any(|c| c == ct) {
                observations.content_types.push(ct.to_string());
            }
        }
    }
}
