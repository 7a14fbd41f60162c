// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Endpoint normalization
//!
//! Turns raw captured traffic into a deduplicated, parameterized catalog.

mod normalizer;
mod query;
mod record;
mod template;

pub use normalizer::EndpointNormalizer;
pub use query::{extract_query_params, Parameter, ParameterLocation, ParameterType};
pub use record::{
    dedup_key, endpoint_id, EndpointRecord, RuntimeObservations, DISCOVERY_SOURCE,
    ENDPOINT_ID_LENGTH,
};
pub use template::{classify_segment, parameterize_path, placeholder_name, SegmentKind, UUID_LENGTH};
