//! Frequency rating keyed by chronological layer.
//!
//! The active layer is an explicit value ([`LayerContext`]) owned by the
//! caller's session and passed into every rating call. The service itself only
//! holds the read-only frequency source and a memo of computed ratings, so two
//! sessions rating under different layers never interfere.
//!
//! Rating of an entry under layer `L`:
//!
//! ```text
//! rating = ln(1 + f)      f = frequency of entry in L, 0 when unattested
//! ```

use crate::error::RatingError;
use crate::lexicon::FrequencySource;
use crate::ChronologicalLayer;
use dashmap::DashMap;
use std::sync::Arc;

/// The chronological layer a session rates under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerContext {
    layer: Option<ChronologicalLayer>,
}

impl LayerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(layer: ChronologicalLayer) -> Self {
        LayerContext { layer: Some(layer) }
    }

    pub fn layer(&self) -> Option<ChronologicalLayer> {
        self.layer
    }

    pub fn set_layer(&mut self, layer: ChronologicalLayer) {
        self.layer = Some(layer);
    }

    /// Use the earliest period in which `entry` is attested.
    ///
    /// An unattested entry leaves the current layer untouched.
    pub fn set_layer_by_entry(
        &mut self,
        ratings: &RatingService,
        entry: &str,
    ) -> Result<ChronologicalLayer, RatingError> {
        let layer = ratings
            .earliest_layer(entry)
            .ok_or_else(|| RatingError::LayerNotFound { entry: entry.to_string() })?;
        self.layer = Some(layer);
        Ok(layer)
    }
}

pub struct RatingService {
    source: Arc<dyn FrequencySource>,
    memo: DashMap<(String, ChronologicalLayer), f64>,
}

impl std::fmt::Debug for RatingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingService").field("source", &"<frequency source>").field("memo", &self.memo.len()).finish()
    }
}

impl RatingService {
    pub fn new(source: Arc<dyn FrequencySource>) -> Self {
        RatingService { source, memo: DashMap::new() }
    }

    /// Non-negative plausibility of `entry` under the context's layer.
    ///
    /// Fails with [`RatingError::LayerUnset`] when no layer was ever set.
    pub fn rating(&self, context: &LayerContext, entry: &str) -> Result<f64, RatingError> {
        let layer = context.layer().ok_or(RatingError::LayerUnset)?;
        let rating = *self.memo.entry((entry.to_string(), layer)).or_insert_with(|| {
            let frequency = self.source.frequency(entry, layer).unwrap_or(0.0);
            frequency.max(0.0).ln_1p()
        });
        Ok(rating)
    }

    pub fn earliest_layer(&self, entry: &str) -> Option<ChronologicalLayer> {
        self.source.earliest_layer(entry)
    }

    /// Drop memoized ratings. Callers' layers are theirs and stay as they are.
    pub fn clear(&self) {
        self.memo.clear();
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::MemoryFrequencies;
    use crate::tables::FrequencyRecord;

    fn service() -> RatingService {
        let records = vec![
            FrequencyRecord { surface: "iti".into(), layer: ChronologicalLayer(2), frequency: 9.0 },
            FrequencyRecord { surface: "iti".into(), layer: ChronologicalLayer(1), frequency: 3.0 },
        ];
        RatingService::new(Arc::new(MemoryFrequencies::new(records).unwrap()))
    }

    #[test]
    fn rating_requires_a_layer() {
        let s = service();
        assert_eq!(s.rating(&LayerContext::new(), "iti"), Err(RatingError::LayerUnset));
    }

    #[test]
    fn rating_is_stable_under_the_same_layer() {
        let s = service();
        let ctx = LayerContext::with_layer(ChronologicalLayer(2));
        let first = s.rating(&ctx, "iti").unwrap();
        let second = s.rating(&ctx, "iti").unwrap();
        assert_eq!(first, second);
        assert!((first - 10f64.ln()).abs() < 1e-12);
        assert_eq!(s.rating(&ctx, "na").unwrap(), 0.0);
    }

    #[test]
    fn layers_are_per_context() {
        let s = service();
        let early = LayerContext::with_layer(ChronologicalLayer(1));
        let late = LayerContext::with_layer(ChronologicalLayer(2));
        assert!(s.rating(&early, "iti").unwrap() < s.rating(&late, "iti").unwrap());
    }

    #[test]
    fn layer_by_entry_uses_earliest_attestation() {
        let s = service();
        let mut ctx = LayerContext::with_layer(ChronologicalLayer(7));
        assert_eq!(ctx.set_layer_by_entry(&s, "iti"), Ok(ChronologicalLayer(1)));
        assert_eq!(ctx.layer(), Some(ChronologicalLayer(1)));

        let err = ctx.set_layer_by_entry(&s, "na").unwrap_err();
        assert_eq!(err, RatingError::LayerNotFound { entry: "na".into() });
        assert_eq!(ctx.layer(), Some(ChronologicalLayer(1)));
    }

    #[test]
    fn clear_keeps_layer_and_values() {
        let s = service();
        let ctx = LayerContext::with_layer(ChronologicalLayer(1));
        let before = s.rating(&ctx, "iti").unwrap();
        assert_eq!(s.memo_len(), 1);
        s.clear();
        assert_eq!(s.memo_len(), 0);
        assert_eq!(ctx.layer(), Some(ChronologicalLayer(1)));
        assert_eq!(s.rating(&ctx, "iti").unwrap(), before);
    }
}
