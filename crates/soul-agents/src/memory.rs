//! Agent memory: a short-term ring buffer plus long-term daily summaries.
//!
//! - **Short-term**: the last N notes (thoughts, actions, events), oldest
//!   silently dropped beyond capacity. Concatenated into the memory context
//!   handed to the brain.
//! - **Long-term**: one [`MemorySummary`] per in-world day, written by the
//!   nightly consolidation. Queried by [`MemoryStore::recall`].
//!
//! ## Recall ranking
//!
//! [`RingMemory`] ranks summaries by how many distinct query words they
//! contain (case-insensitive), ties broken most-recent-first. A query that
//! matches nothing therefore returns the most recent summaries.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use chrono::Utc;
use soul_types::{GameTime, MemoryId, MemorySummary};
use tracing::debug;

use crate::config::MemoryConfig;

/// Storage for one agent's memories.
///
/// Implementations are owned by a single agent controller and only touched
/// from the engine's sequential phases.
pub trait MemoryStore: Send + fmt::Debug {
    /// Append a note to short-term memory.
    fn add_short_term(&mut self, text: &str);

    /// Short-term notes, oldest first.
    fn short_term(&self) -> Vec<String>;

    /// Short-term notes joined with newlines, oldest first.
    fn recent_context(&self) -> String {
        self.short_term().join("\n")
    }

    /// Up to `k` long-term summaries relevant to `query`.
    fn recall(&self, query: &str, k: usize) -> Vec<MemorySummary>;

    /// Archive `summary` into long-term memory and clear short-term memory.
    fn consolidate_daily(&mut self, summary: &str, at: GameTime) -> MemoryId;
}

/// In-process [`MemoryStore`] with a fixed-capacity ring buffer.
#[derive(Debug, Clone)]
pub struct RingMemory {
    capacity: usize,
    short_term: VecDeque<String>,
    long_term: Vec<MemorySummary>,
}

impl RingMemory {
    /// Create an empty store. A capacity of 0 is raised to 1.
    pub fn new(config: MemoryConfig) -> Self {
        let capacity = config.short_term_capacity.max(1);
        Self {
            capacity,
            short_term: VecDeque::with_capacity(capacity),
            long_term: Vec::new(),
        }
    }

    /// Number of archived summaries.
    pub fn long_term_len(&self) -> usize {
        self.long_term.len()
    }
}

impl Default for RingMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl MemoryStore for RingMemory {
    fn add_short_term(&mut self, text: &str) {
        while self.short_term.len() >= self.capacity {
            self.short_term.pop_front();
        }
        self.short_term.push_back(text.to_owned());
    }

    fn short_term(&self) -> Vec<String> {
        self.short_term.iter().cloned().collect()
    }

    fn recall(&self, query: &str, k: usize) -> Vec<MemorySummary> {
        let words: BTreeSet<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut scored: Vec<(usize, usize, &MemorySummary)> = self
            .long_term
            .iter()
            .enumerate()
            .map(|(position, summary)| {
                let text = summary.text.to_lowercase();
                let score = words.iter().filter(|word| text.contains(word.as_str())).count();
                (score, position, summary)
            })
            .collect();

        // Highest score first, then newest first.
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        scored
            .into_iter()
            .take(k)
            .map(|(_, _, summary)| summary.clone())
            .collect()
    }

    fn consolidate_daily(&mut self, summary: &str, at: GameTime) -> MemoryId {
        let id = MemoryId::new();
        self.long_term.push(MemorySummary {
            id,
            game_time: at,
            recorded_at: Utc::now(),
            text: summary.to_owned(),
        });
        debug!(
            memory_id = %id,
            dropped_notes = self.short_term.len(),
            "daily memory consolidated"
        );
        self.short_term.clear();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize) -> RingMemory {
        RingMemory::new(MemoryConfig {
            short_term_capacity: capacity,
        })
    }

    #[test]
    fn ring_drops_oldest_beyond_capacity() {
        let mut memory = store(3);
        for note in ["one", "two", "three", "four"] {
            memory.add_short_term(note);
        }
        assert_eq!(memory.recent_context(), "two\nthree\nfour");
    }

    #[test]
    fn default_capacity_is_twenty() {
        let mut memory = RingMemory::default();
        for i in 0..25 {
            memory.add_short_term(&format!("note {i}"));
        }
        let notes = memory.short_term();
        assert_eq!(notes.len(), 20);
        assert_eq!(notes.first().map(String::as_str), Some("note 5"));
    }

    #[test]
    fn consolidation_archives_and_clears() {
        let mut memory = store(5);
        memory.add_short_term("worked all day");
        memory.consolidate_daily("Day one. Health is wealth.", GameTime::default());
        assert!(memory.short_term().is_empty());
        assert_eq!(memory.long_term_len(), 1);
        let recalled = memory.recall("anything", 3);
        assert_eq!(recalled.len(), 1);
        assert_eq!(recalled.first().map(|s| s.text.as_str()), Some("Day one. Health is wealth."));
    }

    #[test]
    fn recall_prefers_matches_then_recency() {
        let mut memory = store(5);
        let day = GameTime::default();
        memory.consolidate_daily("went to the park", day);
        memory.consolidate_daily("worked overtime again", day);
        memory.consolidate_daily("slept badly", day);

        let park: Vec<String> = memory
            .recall("Park", 2)
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(park, vec!["went to the park", "slept badly"]);

        let recent: Vec<String> = memory
            .recall("diary summary", 10)
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(
            recent,
            vec!["slept badly", "worked overtime again", "went to the park"]
        );
    }
}
