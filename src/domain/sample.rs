// Numeric sample capabilities and per-slot reduction strategies
use crate::domain::error::ConfigurationError;
use serde::Deserialize;
use std::cmp::Ordering;

/// Numeric type that can be charted.
///
/// Integer sums saturate at the type's bounds and integer means truncate
/// toward zero. Floating point follows IEEE arithmetic. `total_cmp` is a
/// total order over every value, NaN included.
pub trait Sample: Copy + PartialOrd + Send + Sync + 'static {
    fn sum(values: &[Self]) -> Self;

    fn mean(values: &[Self]) -> Self;

    fn total_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! impl_integer_sample {
    ($($ty:ty => $wide:ty),* $(,)?) => {
        $(
            impl Sample for $ty {
                fn sum(values: &[Self]) -> Self {
                    let total: $wide = values.iter().map(|&v| v as $wide).sum();
                    total.clamp(<$ty>::MIN as $wide, <$ty>::MAX as $wide) as $ty
                }

                fn mean(values: &[Self]) -> Self {
                    let total: $wide = values.iter().map(|&v| v as $wide).sum();
                    (total / values.len() as $wide) as $ty
                }

                fn total_cmp(&self, other: &Self) -> Ordering {
                    Ord::cmp(self, other)
                }
            }
        )*
    };
}

macro_rules! impl_float_sample {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sample for $ty {
                fn sum(values: &[Self]) -> Self {
                    values.iter().sum()
                }

                fn mean(values: &[Self]) -> Self {
                    Self::sum(values) / values.len() as $ty
                }

                fn total_cmp(&self, other: &Self) -> Ordering {
                    <$ty>::total_cmp(self, other)
                }
            }
        )*
    };
}

impl_integer_sample!(i32 => i128, i64 => i128, u64 => u128);
impl_float_sample!(f32, f64);

/// The three values a chart point carries for a populated slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary<Y> {
    pub min: Y,
    pub max: Y,
    pub value: Y,
}

/// Reduces the values of one slot. `values` is never empty and keeps the
/// order in which observations were ingested.
pub trait Reducer<Y>: Send + Sync {
    fn reduce(&self, values: &[Y]) -> Summary<Y>;
}

impl<Y, F> Reducer<Y> for F
where
    F: Fn(&[Y]) -> Summary<Y> + Send + Sync,
{
    fn reduce(&self, values: &[Y]) -> Summary<Y> {
        self(values)
    }
}

fn min_max<Y: Sample>(values: &[Y]) -> (Y, Y) {
    let first = values[0];
    values[1..].iter().fold((first, first), |(min, max), &v| {
        (
            if v < min { v } else { min },
            if v > max { v } else { max },
        )
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxAvg;

impl<Y: Sample> Reducer<Y> for MinMaxAvg {
    fn reduce(&self, values: &[Y]) -> Summary<Y> {
        let (min, max) = min_max(values);
        Summary {
            min,
            max,
            value: Y::mean(values),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxSum;

impl<Y: Sample> Reducer<Y> for MinMaxSum {
    fn reduce(&self, values: &[Y]) -> Summary<Y> {
        let (min, max) = min_max(values);
        Summary {
            min,
            max,
            value: Y::sum(values),
        }
    }
}

/// Keeps the most recently ingested value, useful for state-like metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxLast;

impl<Y: Sample> Reducer<Y> for MinMaxLast {
    fn reduce(&self, values: &[Y]) -> Summary<Y> {
        let (min, max) = min_max(values);
        Summary {
            min,
            max,
            value: values[values.len() - 1],
        }
    }
}

/// Nearest-rank percentile.
#[derive(Debug, Clone, Copy)]
pub struct Percentile(f64);

impl Percentile {
    pub fn new(percentile: f64) -> Result<Self, ConfigurationError> {
        if !(percentile > 0.0 && percentile <= 100.0) {
            return Err(ConfigurationError::InvalidPercentile(percentile));
        }
        Ok(Self(percentile))
    }
}

impl<Y: Sample> Reducer<Y> for Percentile {
    fn reduce(&self, values: &[Y]) -> Summary<Y> {
        let mut sorted = values.to_vec();
        sorted.sort_by(Sample::total_cmp);

        let rank = (self.0 / 100.0 * sorted.len() as f64).ceil() as usize;
        let idx = rank.clamp(1, sorted.len()) - 1;
        let (min, max) = min_max(values);
        Summary {
            min,
            max,
            value: sorted[idx],
        }
    }
}

/// Reduction selected by name, e.g. from a chart request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reduction {
    #[default]
    Avg,
    Sum,
    Last,
    Percentile(f64),
}

impl Reduction {
    pub fn validate(self) -> Result<Self, ConfigurationError> {
        if let Reduction::Percentile(p) = self {
            Percentile::new(p)?;
        }
        Ok(self)
    }
}

impl<Y: Sample> Reducer<Y> for Reduction {
    fn reduce(&self, values: &[Y]) -> Summary<Y> {
        match *self {
            Reduction::Avg => MinMaxAvg.reduce(values),
            Reduction::Sum => MinMaxSum.reduce(values),
            Reduction::Last => MinMaxLast.reduce(values),
            Reduction::Percentile(p) => Percentile(p).reduce(values),
        }
    }
}
