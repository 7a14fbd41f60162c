// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Query parameter extraction

use serde::{Deserialize, Serialize};

/// Where a parameter was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
}

/// Inferred parameter type. A single runtime sample never proves more than a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
}

/// A parameter observed on an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub param_type: ParameterType,
    pub required: bool,
}

impl Parameter {
    /// Optional, string-typed query parameter
    pub fn query(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Query,
            param_type: ParameterType::String,
            required: false,
        }
    }
}

/// Split a raw query string on `&`, then each pair on its first `=`.
/// Pairs without `=` are ignored. Names are kept raw, so `=v` yields an
/// empty name.
pub fn extract_query_params(query: Option<&str>) -> Vec<Parameter> {
    let Some(query) = query else {
        return Vec::new();
    };

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, _)| Parameter::query(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(params: &[Parameter]) -> Vec<&str> {
        params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_extract_query_params() {
        let params = extract_query_params(Some("q=shoes&page=2&sort=price%20asc"));
        assert_eq!(names(&params), vec!["q", "page", "sort"]);
        assert!(params.iter().all(|p| !p.required));
        assert!(params.iter().all(|p| p.param_type == ParameterType::String));
        assert!(params.iter().all(|p| p.location == ParameterLocation::Query));
    }

    #[test]
    fn test_split_on_first_equals() {
        let params = extract_query_params(Some("filter=a=b&token=x=="));
        assert_eq!(names(&params), vec!["filter", "token"]);
    }

    #[test]
    fn test_flags_without_value_are_skipped() {
        let params = extract_query_params(Some("debug&lang=en&&page=2"));
        assert_eq!(names(&params), vec!["lang", "page"]);
    }

    #[test]
    fn test_value_without_name_keeps_empty_name() {
        let params = extract_query_params(Some("=orphan&lang=en"));
        assert_eq!(names(&params), vec!["", "lang"]);
    }

    #[test]
    fn test_empty_query() {
        assert!(extract_query_params(None).is_empty());
        assert!(extract_query_params(Some("")).is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Parameter::query("id")).unwrap();
        assert_eq!(json["location"], "query");
        assert_eq!(json["param_type"], "string");
        assert_eq!(json["required"], false);
    }
}
