//! Per-session memo of search suggestions.
use super::SearchSuggestion;
use std::collections::{HashMap, VecDeque};

/// Bounded memo of suggestions keyed by raw query text.
///
/// Eviction is first-in first-out: once `capacity` queries are held, the
/// oldest inserted query is dropped. Re-inserting a held query replaces its
/// value without refreshing its position.
#[derive(Debug)]
pub struct SuggestionCache {
    capacity: usize,
    entries: HashMap<String, Vec<SearchSuggestion>>,
    order: VecDeque<String>,
}

impl SuggestionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, query: &str) -> Option<&[SearchSuggestion]> {
        self.entries.get(query).map(Vec::as_slice)
    }

    pub fn insert(&mut self, query: String, suggestions: Vec<SearchSuggestion>) {
        if self.capacity == 0 {
            return;
        }
        if let Some(existing) = self.entries.get_mut(&query) {
            *existing = suggestions;
            return;
        }
        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(query.clone());
        self.entries.insert(query, suggestions);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
