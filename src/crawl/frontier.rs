// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Breadth-first frontier and visited set

use std::collections::{HashSet, VecDeque};

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// URLs already accepted for crawling, in acceptance order.
/// String-exact; no URL normalization is applied.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a URL. Returns `false` if it was already present.
    pub fn insert(&mut self, url: &str) -> bool {
        if !self.members.insert(url.to_string()) {
            return false;
        }
        self.order.push(url.to_string());
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.members.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// FIFO queue of frontier entries
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
}

impl Frontier {
    /// Frontier holding only the seed at depth 0
    pub fn seeded(seed: impl Into<String>) -> Self {
        let mut frontier = Self::default();
        frontier.push(FrontierEntry::new(seed, 0));
        frontier
    }

    fn push(&mut self, entry: FrontierEntry) -> bool {
        if !self.queued.insert(entry.url.clone()) {
            return false;
        }
        self.queue.push_back(entry);
        true
    }

    /// Next entry in enqueue order
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&entry.url);
        Some(entry)
    }

    /// Enqueue up to `cap` links at `depth`, skipping visited and already-queued
    /// URLs. Returns how many were added.
    pub fn enqueue_links<I>(&mut self, links: I, depth: u32, visited: &VisitedSet, cap: usize) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for link in links {
            if added >= cap {
                break;
            }
            if visited.contains(&link) {
                continue;
            }
            if self.push(FrontierEntry::new(link, depth)) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
