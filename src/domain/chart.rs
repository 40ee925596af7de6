// Chart domain models - raw observations in, fixed-cardinality points out
use serde::{Deserialize, Serialize};

/// A raw `(timestamp, value)` reading. Accepts either `{"timestamp": t, "value": v}`
/// or `[t, v]` when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "ObservationRepr<Y>")]
pub struct Observation<Y> {
    pub timestamp: i64,
    pub value: Y,
}

impl<Y> Observation<Y> {
    pub fn new(timestamp: i64, value: Y) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObservationRepr<Y> {
    Pair(i64, Y),
    Object { timestamp: i64, value: Y },
}

impl<Y> From<ObservationRepr<Y>> for Observation<Y> {
    fn from(repr: ObservationRepr<Y>) -> Self {
        match repr {
            ObservationRepr::Pair(timestamp, value) => Self::new(timestamp, value),
            ObservationRepr::Object { timestamp, value } => Self::new(timestamp, value),
        }
    }
}

impl<Y> From<(i64, Y)> for Observation<Y> {
    fn from((timestamp, value): (i64, Y)) -> Self {
        Self::new(timestamp, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Point<Y> {
    pub timestamp: i64,
    pub min: Y,
    pub max: Y,
    pub value: Y,
}

impl<Y: Copy> Point<Y> {
    pub fn new(timestamp: i64, min: Y, max: Y, value: Y) -> Self {
        Self {
            timestamp,
            min,
            max,
            value,
        }
    }

    /// Point for a slot that received no observations.
    pub fn filled(timestamp: i64, default: Y) -> Self {
        Self::new(timestamp, default, default, default)
    }
}

/// One point per window slot, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart<Y> {
    pub points: Vec<Point<Y>>,
}

impl<Y> Chart<Y> {
    pub fn new(points: Vec<Point<Y>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}
