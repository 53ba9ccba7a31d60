//! External lookup capabilities consumed by the engine.
//!
//! The engine only needs two read-only questions answered:
//!
//! - [`Lexicon::find_entry`]: is this surface string an attested form?
//! - [`FrequencySource`]: how often is a surface attested in a given period?
//!
//! Both are synchronous and bounded from the engine's point of view. The
//! in-memory implementations here back the tests and the CLI bundle loader.

use crate::error::InitError;
use crate::tables::FrequencyRecord;
use crate::{ChronologicalLayer, MorphEntry};
use std::collections::{BTreeMap, HashMap};

pub trait Lexicon: Send + Sync {
    fn find_entry(&self, surface: &str) -> Option<MorphEntry>;
}

pub trait FrequencySource: Send + Sync {
    /// Frequency of `surface` within `layer`, `None` when unattested there.
    fn frequency(&self, surface: &str, layer: ChronologicalLayer) -> Option<f64>;

    /// Earliest layer in which `surface` is attested.
    fn earliest_layer(&self, surface: &str) -> Option<ChronologicalLayer>;
}

/// Surface-keyed lexicon of attested entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryLexicon {
    entries: HashMap<String, MorphEntry>,
}

impl MemoryLexicon {
    pub fn new(entries: Vec<MorphEntry>) -> Result<Self, InitError> {
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            entry
                .validate()
                .map_err(|reason| InitError::MalformedEntry { surface: entry.surface.clone(), reason })?;
            if entry.is_virtual {
                return Err(InitError::MalformedEntry {
                    surface: entry.surface,
                    reason: "lexicon entries must be attested (non-virtual)",
                });
            }
            if map.contains_key(&entry.surface) {
                return Err(InitError::DuplicateEntry { surface: entry.surface });
            }
            map.insert(entry.surface.clone(), entry);
        }
        Ok(MemoryLexicon { entries: map })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lexicon for MemoryLexicon {
    fn find_entry(&self, surface: &str) -> Option<MorphEntry> {
        self.entries.get(surface).cloned()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryFrequencies {
    by_surface: HashMap<String, BTreeMap<ChronologicalLayer, f64>>,
}

impl MemoryFrequencies {
    /// Repeated `(surface, layer)` records accumulate.
    pub fn new(records: Vec<FrequencyRecord>) -> Result<Self, InitError> {
        let mut by_surface: HashMap<String, BTreeMap<ChronologicalLayer, f64>> = HashMap::new();
        for record in records {
            if !record.frequency.is_finite() || record.frequency < 0.0 {
                return Err(InitError::InvalidFrequency { surface: record.surface, layer: record.layer.0 });
            }
            *by_surface.entry(record.surface).or_default().entry(record.layer).or_insert(0.0) += record.frequency;
        }
        Ok(MemoryFrequencies { by_surface })
    }
}

impl FrequencySource for MemoryFrequencies {
    fn frequency(&self, surface: &str, layer: ChronologicalLayer) -> Option<f64> {
        self.by_surface.get(surface)?.get(&layer).copied()
    }

    fn earliest_layer(&self, surface: &str) -> Option<ChronologicalLayer> {
        self.by_surface.get(surface)?.keys().next().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BaseKind, ParameterVector};

    fn record(surface: &str, layer: u32, frequency: f64) -> FrequencyRecord {
        FrequencyRecord { surface: surface.to_string(), layer: ChronologicalLayer(layer), frequency }
    }

    #[test]
    fn lexicon_rejects_duplicates_and_virtual_entries() {
        let a = MorphEntry::lexical(1, "iti", ParameterVector::wildcard(), BaseKind::Indeclinable, "");
        assert!(matches!(
            MemoryLexicon::new(vec![a.clone(), a.clone()]),
            Err(InitError::DuplicateEntry { .. })
        ));

        let mut v = a.clone();
        v.is_virtual = true;
        assert!(matches!(MemoryLexicon::new(vec![v]), Err(InitError::MalformedEntry { .. })));

        let lexicon = MemoryLexicon::new(vec![a]).unwrap();
        assert_eq!(lexicon.find_entry("iti").map(|e| e.id), Some(1));
        assert!(lexicon.find_entry("na").is_none());
    }

    #[test]
    fn frequencies_track_earliest_layer() {
        let freqs = MemoryFrequencies::new(vec![record("iti", 3, 2.0), record("iti", 1, 5.0), record("iti", 1, 1.0)])
            .unwrap();
        assert_eq!(freqs.earliest_layer("iti"), Some(ChronologicalLayer(1)));
        assert_eq!(freqs.frequency("iti", ChronologicalLayer(1)), Some(6.0));
        assert_eq!(freqs.frequency("iti", ChronologicalLayer(2)), None);
        assert_eq!(freqs.earliest_layer("na"), None);
    }

    #[test]
    fn negative_frequencies_are_rejected() {
        assert!(matches!(
            MemoryFrequencies::new(vec![record("iti", 1, -1.0)]),
            Err(InitError::InvalidFrequency { .. })
        ));
        assert!(MemoryFrequencies::new(vec![record("iti", 1, f64::NAN)]).is_err());
    }
}
