// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Path parameterization
//!
//! Converts `/users/123/orders/456` into `/users/{userId}/orders/{orderId}`.
//!
//! Segments are classified in a fixed order: numeric first, then UUID shape,
//! everything else is literal. Any purely numeric segment is treated as an
//! identifier, so `/reports/2024` becomes `/reports/{reportId}` even when
//! `2024` is a year. That over-parameterization is a known limitation.

/// Length of a canonical hyphenated UUID
pub const UUID_LENGTH: usize = 36;

/// Placeholder base used when there is no usable preceding segment
const DEFAULT_PLACEHOLDER: &str = "item";

/// Shape of a single path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Kept verbatim
    Literal,
    /// ASCII digits only
    Numeric,
    /// 36 characters containing a hyphen
    Uuid,
}

impl SegmentKind {
    /// Whether the segment is replaced by a placeholder
    pub fn is_identifier(self) -> bool {
        !matches!(self, SegmentKind::Literal)
    }
}

/// Classify a path segment
pub fn classify_segment(segment: &str) -> SegmentKind {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        SegmentKind::Numeric
    } else if segment.len() == UUID_LENGTH && segment.contains('-') {
        SegmentKind::Uuid
    } else {
        SegmentKind::Literal
    }
}

/// Placeholder name derived from the segment before an identifier
pub fn placeholder_name(preceding: Option<&str>) -> String {
    let base = match preceding {
        Some(segment) if !segment.is_empty() => singularize(segment),
        _ => DEFAULT_PLACEHOLDER,
    };
    format!("{}Id", base)
}

/// Drop one trailing `s` (`users` -> `user`), leaving `ss` endings alone
fn singularize(word: &str) -> &str {
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem,
        _ => word,
    }
}

/// Replace identifier segments of a URL path with named placeholders
pub fn parameterize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if classify_segment(segment).is_identifier() {
                let preceding = i.checked_sub(1).map(|j| segments[j]);
                format!("{{{}}}", placeholder_name(preceding))
            } else {
                (*segment).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
