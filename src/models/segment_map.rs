//! Ordered map of segment upper bounds to Beta parameters.

use serde::{Deserialize, Serialize};

use crate::models::beta::BetaParam;

/// One segment: `param` governs scores up to and including `key`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub key: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Segment {
    pub fn param(&self) -> BetaParam {
        BetaParam::new(self.alpha, self.beta)
    }
}

/// Piecewise Beta model over [0, 1].
///
/// Keys are strictly increasing right-closed upper bounds. A fitted map
/// always ends with the sentinel key 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct SegmentMap {
    segments: Vec<Segment>,
}

impl SegmentMap {
    pub fn new() -> Self {
        SegmentMap::default()
    }

    /// Inserts `param` at `key` unless the key is already present.
    /// Returns whether the map changed.
    pub fn insert(&mut self, key: f64, param: BetaParam) -> bool {
        let idx = self.segments.partition_point(|s| s.key < key);
        if self.segments.get(idx).is_some_and(|s| s.key == key) {
            return false;
        }
        self.segments.insert(
            idx,
            Segment {
                key,
                alpha: param.alpha,
                beta: param.beta,
            },
        );
        true
    }

    /// Parameters of the first segment whose key is `>= rv`.
    pub fn lookup(&self, rv: f64) -> Option<BetaParam> {
        let idx = self.segments.partition_point(|s| s.key < rv);
        self.segments.get(idx).map(Segment::param)
    }

    /// Beta CDF of the covering segment at `rv`, with `rv` clamped to
    /// [0, 1]. `None` for an empty map.
    pub fn probability(&self, rv: f64) -> Option<f64> {
        let rv = if rv.is_nan() { 0.0 } else { rv.clamp(0.0, 1.0) };
        self.lookup(rv).map(|bp| bp.cdf(rv))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn keys(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.key).collect()
    }

    /// Whether the map satisfies the fitted-map invariants.
    pub fn is_valid(&self) -> bool {
        self.segments.windows(2).all(|w| w[0].key < w[1].key)
            && self.segments.last().is_some_and(|s| s.key == 1.0)
    }
}

impl TryFrom<Vec<Segment>> for SegmentMap {
    type Error = String;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        let map = SegmentMap { segments };
        if !map.is_valid() {
            return Err("segment keys must strictly increase and end at 1.0".to_string());
        }
        Ok(map)
    }
}

impl From<SegmentMap> for Vec<Segment> {
    fn from(map: SegmentMap) -> Self {
        map.segments
    }
}
