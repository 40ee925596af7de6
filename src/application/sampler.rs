// Sampled chart builder - buckets raw observations into window slots and reduces each slot
use crate::domain::chart::{Chart, Observation, Point};
use crate::domain::error::ConfigurationError;
use crate::domain::sample::{Reducer, Sample};
use crate::domain::time_window::TimeWindow;

/// Largest number of slot buffers a `Vec` can address.
pub fn max_slot_buffers<Y>() -> usize {
    isize::MAX as usize / std::mem::size_of::<Vec<Y>>()
}

/// Observations dropped during ingestion, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discarded {
    pub before: usize,
    pub after: usize,
    pub unmapped: usize,
}

impl Discarded {
    pub fn total(&self) -> usize {
        self.before + self.after + self.unmapped
    }
}

pub struct SampledTimeSeriesChartBuilder<'w, W, Y, R> {
    window: &'w W,
    default: Y,
    reducer: R,
    slot_count: usize,
}

impl<'w, W, Y, R> SampledTimeSeriesChartBuilder<'w, W, Y, R>
where
    W: TimeWindow,
    Y: Sample,
    R: Reducer<Y>,
{
    /// Fails before allocating anything if the window has more slots than
    /// can be held in memory.
    pub fn new(window: &'w W, default: Y, reducer: R) -> Result<Self, ConfigurationError> {
        let slots = window.slot_count();
        let slot_count = usize::try_from(slots)
            .ok()
            .filter(|&count| count <= max_slot_buffers::<Y>())
            .ok_or(ConfigurationError::TooManyTimeslots { slots })?;

        Ok(Self {
            window,
            default,
            reducer,
            slot_count,
        })
    }

    /// Produces exactly one point per slot, in window order. Observations may
    /// arrive in any order; those outside the window are dropped.
    pub fn build<I>(&self, observations: I) -> Chart<Y>
    where
        I: IntoIterator<Item = Observation<Y>>,
    {
        let (slots, discarded) = self.ingest(observations);

        if discarded.total() > 0 {
            tracing::debug!(
                "Discarded {} observations outside the window ({} before, {} after, {} without slot)",
                discarded.total(),
                discarded.before,
                discarded.after,
                discarded.unmapped
            );
        }

        self.reduce(slots)
    }

    fn ingest<I>(&self, observations: I) -> (Vec<Vec<Y>>, Discarded)
    where
        I: IntoIterator<Item = Observation<Y>>,
    {
        let mut slots: Vec<Vec<Y>> = Vec::with_capacity(self.slot_count);
        slots.resize_with(self.slot_count, Vec::new);
        let mut discarded = Discarded::default();

        for observation in observations {
            match self.window.window_index(observation.timestamp) {
                None => discarded.unmapped += 1,
                Some(index) if index < 0 => discarded.before += 1,
                Some(index) => match usize::try_from(index).ok().and_then(|i| slots.get_mut(i)) {
                    Some(slot) => slot.push(observation.value),
                    None => discarded.after += 1,
                },
            }
        }

        (slots, discarded)
    }

    fn reduce(&self, slots: Vec<Vec<Y>>) -> Chart<Y> {
        let mut points = Vec::with_capacity(self.slot_count);

        for (timestamp, values) in self.window.timestamps().zip(slots) {
            let point = if values.is_empty() {
                Point::filled(timestamp, self.default)
            } else {
                let summary = self.reducer.reduce(&values);
                Point::new(timestamp, summary.min, summary.max, summary.value)
            };
            points.push(point);
        }

        debug_assert_eq!(points.len(), self.slot_count);
        Chart::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::{MinMaxAvg, MinMaxLast, MinMaxSum, Summary};
    use crate::domain::time_window::{FixedTimeWindow, Range};

    fn four_second_window() -> FixedTimeWindow {
        FixedTimeWindow::new(Range::new(0, 4_000).unwrap(), 1_000).unwrap()
    }

    fn obs(items: &[(i64, i64)]) -> Vec<Observation<i64>> {
        items.iter().copied().map(Observation::from).collect()
    }

    /// Window with hand-picked representative timestamps and an explicit index map.
    struct ListedWindow {
        timestamps: Vec<i64>,
    }

    impl TimeWindow for ListedWindow {
        fn slot_count(&self) -> u64 {
            self.timestamps.len() as u64
        }

        fn window_index(&self, timestamp: i64) -> Option<i64> {
            if timestamp == 42 {
                return None;
            }
            Some(self.timestamps.iter().take_while(|&&t| t <= timestamp).count() as i64 - 1)
        }

        fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
            self.timestamps.iter().copied()
        }
    }

    struct HugeWindow(u64);

    impl TimeWindow for HugeWindow {
        fn slot_count(&self) -> u64 {
            self.0
        }

        fn window_index(&self, _timestamp: i64) -> Option<i64> {
            None
        }

        fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
            std::iter::empty()
        }
    }

    #[test]
    fn test_populated_and_empty_slots() {
        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, -1i64, MinMaxAvg).unwrap();
        let chart = builder.build(obs(&[(500, 10), (500, 20), (3_500, 100)]));

        assert_eq!(
            chart.points,
            vec![
                Point::new(0, 10, 20, 15),
                Point::new(1_000, -1, -1, -1),
                Point::new(2_000, -1, -1, -1),
                Point::new(3_000, 100, 100, 100),
            ]
        );
    }

    #[test]
    fn test_no_observations_fills_every_slot() {
        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, -1i64, MinMaxAvg).unwrap();
        let chart = builder.build(Vec::new());

        assert_eq!(
            chart.points,
            vec![
                Point::filled(0, -1),
                Point::filled(1_000, -1),
                Point::filled(2_000, -1),
                Point::filled(3_000, -1),
            ]
        );
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let window = FixedTimeWindow::new(Range::new(0, i64::MAX).unwrap(), 1).unwrap();
        let result = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxAvg);

        match result {
            Err(ConfigurationError::TooManyTimeslots { slots }) => {
                assert_eq!(slots, i64::MAX as u64)
            }
            _ => panic!("expected too many timeslots"),
        }
    }

    #[test]
    fn test_slot_limit_boundary() {
        let limit = max_slot_buffers::<f64>() as u64;
        let over = HugeWindow(limit + 1);
        assert!(SampledTimeSeriesChartBuilder::new(&over, 0.0f64, MinMaxAvg).is_err());

        // at the limit nothing is allocated until build
        let at_limit = HugeWindow(limit);
        assert!(SampledTimeSeriesChartBuilder::new(&at_limit, 0.0f64, MinMaxAvg).is_ok());
    }

    #[test]
    fn test_out_of_range_observations_are_ignored() {
        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxAvg).unwrap();

        let baseline = builder.build(obs(&[(1_200, 7)]));
        let noisy = builder.build(obs(&[(-1, 99), (1_200, 7), (4_000, 99), (i64::MAX, 99)]));
        assert_eq!(baseline, noisy);
        assert_eq!(noisy.points[1], Point::new(1_000, 7, 7, 7));
    }

    #[test]
    fn test_unsorted_input_lands_in_earlier_slots() {
        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxSum).unwrap();
        let chart = builder.build(obs(&[(3_100, 1), (100, 2), (3_900, 3), (200, 4)]));

        assert_eq!(chart.points[0], Point::new(0, 2, 4, 6));
        assert_eq!(chart.points[3], Point::new(3_000, 1, 3, 4));
    }

    #[test]
    fn test_insertion_order_is_kept_within_slot() {
        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxLast).unwrap();
        let chart = builder.build(obs(&[(900, 5), (100, 8), (500, 3)]));

        assert_eq!(chart.points[0], Point::new(0, 3, 8, 3));
    }

    #[test]
    fn test_float_average() {
        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, f64::NAN, MinMaxAvg).unwrap();
        let chart = builder.build(vec![
            Observation::new(2_000, 1.0),
            Observation::new(2_999, 2.0),
        ]);

        assert_eq!(chart.points[2], Point::new(2_000, 1.0, 2.0, 1.5));
        assert!(chart.points[0].value.is_nan());
        assert_eq!(chart.len(), 4);
    }

    #[test]
    fn test_integer_average_truncates() {
        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxAvg).unwrap();
        let chart = builder.build(obs(&[(0, 1), (1, 2), (1_000, -1), (1_001, -2)]));

        assert_eq!(chart.points[0].value, 1);
        assert_eq!(chart.points[1].value, -1);
    }

    #[test]
    fn test_custom_window_and_closure_reducer() {
        let window = ListedWindow {
            timestamps: vec![10, 20, 30],
        };
        let count = |values: &[i64]| Summary {
            min: values.len() as i64,
            max: values.len() as i64,
            value: values.len() as i64,
        };
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, count).unwrap();
        let chart = builder.build(obs(&[(5, 1), (10, 1), (15, 1), (25, 1), (42, 1), (99, 1)]));

        let timestamps: Vec<i64> = chart.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
        let counts: Vec<i64> = chart.points.iter().map(|p| p.value).collect();
        assert_eq!(counts, vec![2, 1, 1]);
    }

    #[test]
    fn test_ingest_reports_discard_reasons() {
        let window = ListedWindow {
            timestamps: vec![10, 20],
        };
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxAvg).unwrap();
        let (slots, discarded) = builder.ingest(obs(&[(1, 1), (42, 1), (15, 1)]));

        assert_eq!(slots, vec![vec![1], vec![]]);
        assert_eq!(
            discarded,
            Discarded {
                before: 1,
                after: 0,
                unmapped: 1
            }
        );

        let window = four_second_window();
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxAvg).unwrap();
        let (_, discarded) = builder.ingest(obs(&[(4_000, 1), (9_999, 1)]));
        assert_eq!(discarded.after, 2);
    }

    #[test]
    fn test_cardinality_holds_for_many_inputs() {
        let window = FixedTimeWindow::new(Range::new(0, 60_000).unwrap(), 7_000).unwrap();
        let builder = SampledTimeSeriesChartBuilder::new(&window, 0i64, MinMaxAvg).unwrap();

        for n in [0usize, 1, 3, 50, 500] {
            let observations = (0..n).map(|i| Observation::new((i as i64 * 7_919) % 70_000 - 5_000, i as i64));
            let chart = builder.build(observations);
            assert_eq!(chart.len() as u64, window.slot_count());
            assert!(chart.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
    }
}
