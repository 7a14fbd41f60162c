// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Same-origin link harvesting

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::browser::BrowserPage;

/// Resolved `href` of every anchor, restricted to http(s), in document order
pub const LINK_HARVEST_SCRIPT: &str = "Array.from(document.querySelectorAll('a[href]'))\
    .map(a => a.href)\
    .filter(href => href.startsWith('http'))";

/// Host and effective port are equal
pub fn same_authority(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Keep http(s) links sharing the page's authority. Order is preserved and
/// duplicates are kept.
pub fn filter_same_origin<I>(page_url: &str, hrefs: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };

    hrefs
        .into_iter()
        .filter(|href| match Url::parse(href) {
            Ok(link) => matches!(link.scheme(), "http" | "https") && same_authority(&base, &link),
            Err(_) => false,
        })
        .collect()
}

/// Harvests candidate child URLs from a loaded page
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkExtractor;

impl LinkExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Same-origin links of `page`, judged against `page_url`.
    /// Script failures yield no links.
    pub async fn extract(&self, page: &dyn BrowserPage, page_url: &str) -> Vec<String> {
        let value = match page.evaluate(LINK_HARVEST_SCRIPT).await {
            Ok(value) => value,
            Err(e) => {
                debug!(url = %page_url, "Link extraction failed: {}", e);
                return Vec::new();
            }
        };

        let hrefs: Vec<String> = match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(href) => Some(href),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let total = hrefs.len();
        let links = filter_same_origin(page_url, hrefs);
        debug!(url = %page_url, total, same_origin = links.len(), "Links harvested");
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hrefs(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_cross_origin_excluded() {
        let links = filter_same_origin(
            "https://a.com",
            hrefs(&["https://a.com/x", "https://b.com/y"]),
        );
        assert_eq!(links, vec!["https://a.com/x"]);
    }

    #[test]
    fn test_port_is_part_of_authority() {
        let links = filter_same_origin(
            "https://a.com/",
            hrefs(&[
                "https://a.com:443/default-port",
                "https://a.com:8443/other-port",
                "http://a.com/other-scheme-port",
                "https://api.a.com/subdomain",
            ]),
        );
        assert_eq!(links, vec!["https://a.com:443/default-port"]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let links = filter_same_origin(
            "http://localhost:3000/",
            hrefs(&[
                "http://localhost:3000/b",
                "http://localhost:3000/a#top",
                "http://localhost:3000/b",
                "mailto:x@localhost",
            ]),
        );
        assert_eq!(
            links,
            vec![
                "http://localhost:3000/b",
                "http://localhost:3000/a#top",
                "http://localhost:3000/b"
            ]
        );
    }

    #[test]
    fn test_unparseable_page_url() {
        assert!(filter_same_origin("not a url", hrefs(&["https://a.com/"])).is_empty());
    }
}
