//! Experience Store: append-only experience log
//!
//! Bounded FIFO buffer of experiences with an id index. When a capacity is
//! configured the oldest entry is evicted before a new one is appended.

use crate::memory::types::{Experience, ExperienceId};
use std::collections::{HashMap, VecDeque};

/// Default maximum number of stored experiences
pub const DEFAULT_MAX_EXPERIENCES: usize = 10_000;

/// Append-only experience log
#[derive(Debug)]
pub struct ExperienceStore {
    /// Log in recording order (oldest first)
    experiences: VecDeque<Experience>,
    /// Sequence number of each id currently held in the log
    index: HashMap<ExperienceId, u64>,
    /// Retention cap, `None` for unbounded
    capacity: Option<usize>,
    /// Every experience ever appended
    total_recorded: u64,
    /// Experiences dropped by retention
    evicted: u64,
}

impl ExperienceStore {
    /// Create a store with the given retention cap
    pub fn new(capacity: Option<usize>) -> Self {
        let initial = capacity.unwrap_or(0).min(1024);
        Self {
            experiences: VecDeque::with_capacity(initial),
            index: HashMap::with_capacity(initial),
            capacity,
            total_recorded: 0,
            evicted: 0,
        }
    }

    /// Append an experience, returning the evicted entry if the log was full
    /// Complexity: O(1)
    pub fn append(&mut self, experience: Experience) -> Option<Experience> {
        let evicted = match self.capacity {
            Some(cap) if self.experiences.len() >= cap => {
                let old = self.experiences.pop_front();
                if let Some(old) = &old {
                    self.index.remove(&old.id);
                    self.evicted += 1;
                }
                old
            }
            _ => None,
        };

        self.index.insert(experience.id, self.total_recorded);
        self.experiences.push_back(experience);
        self.total_recorded += 1;

        evicted
    }

    /// Look up a stored experience
    /// Complexity: O(1)
    pub fn get(&self, id: &ExperienceId) -> Option<&Experience> {
        // Evictions only pop the front, so position = sequence - evicted
        let sequence = *self.index.get(id)?;
        let position = usize::try_from(sequence.checked_sub(self.evicted)?).ok()?;
        self.experiences.get(position)
    }

    /// Most recent experiences, oldest first
    pub fn recent(&self, limit: usize) -> Vec<Experience> {
        let start = self.experiences.len().saturating_sub(limit);
        self.experiences.iter().skip(start).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.experiences.iter()
    }

    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Drop everything, counters included
    pub fn clear(&mut self) {
        self.experiences.clear();
        self.index.clear();
        self.total_recorded = 0;
        self.evicted = 0;
    }
}

impl Default for ExperienceStore {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_EXPERIENCES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::{Context, Decision, NewExperience, Outcome};

    fn experience(task: &str) -> Experience {
        Experience::stamp(NewExperience::new(
            Context::new(task, 4),
            Decision::new("monolith"),
            Outcome::new(true, 80.0, 100.0),
        ))
    }

    #[test]
    fn test_append_and_lookup() {
        let mut store = ExperienceStore::new(None);
        let exp = experience("a");
        let id = exp.id;

        assert!(store.append(exp).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).map(|e| e.context.task.as_str()), Some("a"));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut store = ExperienceStore::new(Some(2));
        let first = experience("first");
        let first_id = first.id;
        store.append(first);
        store.append(experience("second"));

        let evicted = store.append(experience("third")).expect("oldest evicted");
        assert_eq!(evicted.id, first_id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_recorded(), 3);
        assert_eq!(store.evicted(), 1);
        assert!(store.get(&first_id).is_none());

        let tasks: Vec<_> = store.iter().map(|e| e.context.task.clone()).collect();
        assert_eq!(tasks, vec!["second", "third"]);
    }

    #[test]
    fn test_lookup_after_repeated_eviction() {
        let mut store = ExperienceStore::new(Some(3));
        let mut ids = Vec::new();
        for task in ["a", "b", "c", "d", "e", "f", "g"] {
            let exp = experience(task);
            ids.push((exp.id, task));
            store.append(exp);
        }

        for (id, task) in &ids[..4] {
            assert!(store.get(id).is_none(), "{} should have been evicted", task);
        }
        for (id, task) in &ids[4..] {
            assert_eq!(store.get(id).map(|e| e.context.task.as_str()), Some(*task));
        }

        store.clear();
        assert!(store.get(&ids[6].0).is_none());
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let mut store = ExperienceStore::default();
        for task in ["a", "b", "c", "d"] {
            store.append(experience(task));
        }

        let recent: Vec<_> = store.recent(2).into_iter().map(|e| e.context.task).collect();
        assert_eq!(recent, vec!["c", "d"]);
        assert_eq!(store.recent(10).len(), 4);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut store = ExperienceStore::new(Some(1));
        store.append(experience("a"));
        store.append(experience("b"));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.total_recorded(), 0);
        assert_eq!(store.evicted(), 0);
    }
}
