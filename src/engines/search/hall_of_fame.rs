use crate::types::{Composition, SearchOutcome};

use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct EliteComposition {
    pub composition: Composition,
    pub fitness: f64,
    pub canonical_key: String, // For deduplication
}

/// Best distinct compositions seen during a search, fitness descending
pub struct HallOfFame {
    entries: Vec<EliteComposition>,
    max_size: usize,
    seen_keys: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            seen_keys: HashSet::new(),
        }
    }

    /// Attempt to add an outcome; rejects duplicates and outcomes that
    /// found nothing
    pub fn try_add(&mut self, outcome: &SearchOutcome) -> bool {
        if !outcome.is_found() || outcome.fitness.is_nan() {
            return false;
        }

        let canonical_key = outcome.composition.canonical_key();
        if self.seen_keys.contains(&canonical_key) {
            return false;
        }

        self.seen_keys.insert(canonical_key.clone());
        self.entries.push(EliteComposition {
            composition: outcome.composition.clone(),
            fitness: outcome.fitness,
            canonical_key,
        });

        // Stable: equal fitness keeps insertion order
        self.entries.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen_keys.remove(&removed.canonical_key);
            }
        }

        true
    }

    pub fn best(&self) -> Option<&EliteComposition> {
        self.entries.first()
    }

    pub fn get_all(&self) -> &[EliteComposition] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<EliteComposition> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
