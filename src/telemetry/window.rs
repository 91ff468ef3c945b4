use crate::telemetry::sample::{is_sorted_by_time, Reading, Sample};
use serde::{Deserialize, Serialize};

use std::borrow::Cow;

/// Seconds of trailing history shown when the caller doesn't say otherwise.
pub const DEFAULT_TIME_WINDOW: f64 = 60.0;

/// How much trailing history is visible at once, in simulation time units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeWindow<T = f64>(pub T);

impl<T: Reading> Default for TimeWindow<T> {
    fn default() -> Self {
        Self(T::from(DEFAULT_TIME_WINDOW).unwrap_or_else(T::infinity))
    }
}

/// The closed interval `[start, end]` of times that should be on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowBounds<T = f64> {
    pub start: T,
    pub end: T,
}

impl<T: Reading> WindowBounds<T> {
    /// `[max(0, current_time - window), current_time]`.
    pub fn trailing(current_time: T, window: TimeWindow<T>) -> Self {
        let start = current_time - window.0;
        Self {
            // A NaN start stays NaN so the interval stays empty.
            start: if start.is_nan() { start } else { start.max(T::zero()) },
            end: current_time,
        }
    }

    /// Inverted (or NaN) intervals contain nothing.
    pub fn is_empty(&self) -> bool {
        !(self.start <= self.end)
    }

    pub fn contains(&self, time: T) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Every sample whose time falls inside the trailing window, in dataset order.
///
/// This is a plain membership test per sample, so it holds for unsorted
/// datasets too.
pub fn select_window<T: Reading>(
    data: &[Sample<T>],
    current_time: T,
    window: TimeWindow<T>,
) -> Vec<Sample<T>> {
    filter_bounds(data, WindowBounds::trailing(current_time, window))
}

fn filter_bounds<T: Reading>(data: &[Sample<T>], bounds: WindowBounds<T>) -> Vec<Sample<T>> {
    data.iter()
        .filter(|sample| bounds.contains(sample.time))
        .copied()
        .collect()
}

/// Incremental window selection over an append-only dataset.
///
/// While the dataset stays sorted the visible slice is found with a start
/// index that only moves forward as the cursor advances, and a binary search
/// for the end. Seeking backwards re-searches from scratch. The moment the
/// dataset turns out to be unsorted every call falls back to the plain filter,
/// so results are always the same as [`select_window`].
#[derive(Clone, Debug)]
pub struct WindowCursor<T = f64> {
    start_index: usize,
    last_start: Option<T>,
    checked: usize,
    sorted: bool,
}

impl<T: Reading> Default for WindowCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reading> WindowCursor<T> {
    pub fn new() -> Self {
        Self {
            start_index: 0,
            last_start: None,
            checked: 0,
            sorted: true,
        }
    }

    pub fn select<'a>(
        &mut self,
        data: &'a [Sample<T>],
        current_time: T,
        window: TimeWindow<T>,
    ) -> Cow<'a, [Sample<T>]> {
        let bounds = WindowBounds::trailing(current_time, window);
        self.observe(data);

        if !self.sorted {
            return Cow::Owned(filter_bounds(data, bounds));
        }
        if bounds.is_empty() {
            return Cow::Borrowed(&[]);
        }

        let start = self.seek_start(data, bounds.start);
        let end = start + data[start..].partition_point(|s| s.time <= bounds.end);

        Cow::Borrowed(&data[start..end])
    }

    /// Whether the dataset seen so far is sorted, i.e. the fast path applies.
    pub fn is_incremental(&self) -> bool {
        self.sorted
    }

    // Only the samples appended since the last call need checking.
    fn observe(&mut self, data: &[Sample<T>]) {
        if data.len() < self.checked {
            // Not the dataset we were following any more.
            *self = Self::new();
        }

        let from = self.checked.saturating_sub(1);
        if self.sorted && !is_sorted_by_time(&data[from..]) {
            self.sorted = false;
        }
        self.checked = data.len();
    }

    fn seek_start(&mut self, data: &[Sample<T>], start: T) -> usize {
        let index = match self.last_start {
            // Everything before `start_index` is earlier than the previous
            // start, hence earlier than this one too.
            Some(previous) if start >= previous && self.start_index <= data.len() => {
                let from = self.start_index;
                from + data[from..].partition_point(|s| s.time < start)
            }
            _ => data.partition_point(|s| s.time < start),
        };

        self.start_index = index;
        self.last_start = Some(start);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(f64, f64)]) -> Vec<Sample> {
        points.iter().map(|&(t, v)| Sample::new(t, v)).collect()
    }

    fn window(w: f64) -> TimeWindow {
        TimeWindow(w)
    }

    #[test]
    fn default_window_is_sixty() {
        assert_eq!(TimeWindow::<f64>::default(), TimeWindow(60.0));
        assert_eq!(TimeWindow::<f32>::default(), TimeWindow(60.0f32));
    }

    #[test]
    fn selects_inside_closed_interval() {
        let data = samples(&[(0.0, 1.0), (10.0, 2.0), (20.0, 3.0), (30.0, 4.0)]);
        let visible = select_window(&data, 25.0, window(15.0));
        assert_eq!(visible, samples(&[(10.0, 2.0), (20.0, 3.0)]));
    }

    #[test]
    fn window_past_the_data_is_empty() {
        let data = samples(&[(0.0, 1.0), (5.0, 2.0)]);
        assert!(select_window(&data, 100.0, window(60.0)).is_empty());
    }

    #[test]
    fn empty_dataset_is_empty() {
        assert!(select_window(&[], 10.0, TimeWindow::default()).is_empty());
        assert!(select_window(&[], -10.0, window(0.0)).is_empty());
    }

    #[test]
    fn cursor_at_zero_only_shows_time_zero() {
        let data = samples(&[(0.0, 1.0), (0.0, 2.0), (0.5, 3.0)]);
        assert_eq!(select_window(&data, 0.0, window(30.0)), samples(&[(0.0, 1.0), (0.0, 2.0)]));
    }

    #[test]
    fn negative_cursor_is_empty() {
        let data = samples(&[(0.0, 1.0), (1.0, 2.0)]);
        let bounds = WindowBounds::trailing(-5.0, window(60.0));
        assert_eq!(bounds.start, 0.0);
        assert!(bounds.is_empty());
        assert!(select_window(&data, -5.0, window(60.0)).is_empty());
    }

    #[test]
    fn non_positive_window() {
        let data = samples(&[(4.0, 1.0), (5.0, 2.0), (5.0, 3.0), (6.0, 4.0)]);
        // Zero width still contains samples exactly at the cursor.
        assert_eq!(select_window(&data, 5.0, window(0.0)), samples(&[(5.0, 2.0), (5.0, 3.0)]));
        assert!(select_window(&data, 5.0, window(-1.0)).is_empty());
    }

    #[test]
    fn wide_window_shows_everything() {
        let data = samples(&[(0.0, 1.0), (3.0, 2.0), (9.5, 3.0)]);
        assert_eq!(select_window(&data, 9.5, window(1_000.0)), data);
        assert_eq!(select_window(&data, 50.0, window(1_000.0)), data);
    }

    #[test]
    fn unsorted_data_is_filtered_pointwise() {
        let data = samples(&[(20.0, 1.0), (5.0, 2.0), (12.0, 3.0), (40.0, 4.0), (11.0, 5.0)]);
        assert_eq!(
            select_window(&data, 20.0, window(10.0)),
            samples(&[(20.0, 1.0), (12.0, 3.0), (11.0, 5.0)])
        );
    }

    #[test]
    fn nan_window_is_empty() {
        let data = samples(&[(0.0, 1.0), (1.0, 2.0)]);
        assert!(select_window(&data, 1.0, window(f64::NAN)).is_empty());
    }

    #[test]
    fn nan_cursor_is_empty() {
        let data = samples(&[(0.0, 1.0)]);
        assert!(select_window(&data, f64::NAN, window(10.0)).is_empty());

        let mut cursor = WindowCursor::new();
        assert!(cursor.select(&data, f64::NAN, window(10.0)).is_empty());
    }

    #[test]
    fn selection_is_idempotent() {
        let data = samples(&[(0.0, 1.0), (10.0, 2.0), (20.0, 3.0)]);
        let mut cursor = WindowCursor::new();

        let first = cursor.select(&data, 15.0, window(10.0)).into_owned();
        let second = cursor.select(&data, 15.0, window(10.0)).into_owned();
        assert_eq!(first, second);
        assert_eq!(select_window(&data, 15.0, window(10.0)), select_window(&data, 15.0, window(10.0)));
    }

    #[test]
    fn cursor_matches_filter_while_advancing_and_seeking() {
        let data: Vec<Sample> = (0..500)
            .map(|i| Sample::new((i / 2) as f64 * 0.5, i as f64))
            .collect();
        let mut cursor = WindowCursor::new();

        let mut times: Vec<f64> = (0..300).map(|i| i as f64 * 0.4 - 5.0).collect();
        // Scrub backwards and forwards again.
        times.extend([60.0, 3.0, 3.0, 90.0, 0.0, 125.0, 200.0, -1.0, 10.0]);

        for &now in &times {
            for &w in &[0.0, 0.5, 7.25, 60.0, 1e6, -2.0] {
                let expected = select_window(&data, now, window(w));
                let got = cursor.select(&data, now, window(w));
                assert_eq!(&*got, expected.as_slice(), "t={now} w={w}");
            }
        }
        assert!(cursor.is_incremental());
    }

    #[test]
    fn cursor_follows_a_growing_dataset() {
        let mut data = Vec::new();
        let mut cursor = WindowCursor::new();

        for tick in 0..200 {
            let now = tick as f64 * 0.25;
            data.push(Sample::new(now, (tick * 3) as f64));

            let got = cursor.select(&data, now, window(5.0)).into_owned();
            assert_eq!(got, select_window(&data, now, window(5.0)));
            assert!(matches!(cursor.select(&data, now, window(5.0)), Cow::Borrowed(_)));
        }
    }

    #[test]
    fn cursor_falls_back_when_data_is_unsorted() {
        let mut data = samples(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        let mut cursor = WindowCursor::new();
        assert_eq!(&*cursor.select(&data, 2.0, window(1.0)), &data[1..]);

        data.push(Sample::new(1.5, 4.0));
        data.push(Sample::new(3.0, 5.0));

        let got = cursor.select(&data, 3.0, window(1.6));
        assert!(!cursor.is_incremental());
        assert_eq!(got.into_owned(), samples(&[(2.0, 3.0), (1.5, 4.0), (3.0, 5.0)]));
    }

    #[test]
    fn cursor_resets_when_dataset_shrinks() {
        let long = samples(&[(5.0, 0.0), (0.0, 1.0), (6.0, 2.0)]);
        let short = samples(&[(1.0, 7.0), (2.0, 8.0)]);
        let mut cursor = WindowCursor::new();

        cursor.select(&long, 6.0, window(10.0));
        assert!(!cursor.is_incremental());

        let got = cursor.select(&short, 2.0, window(10.0));
        assert!(cursor.is_incremental());
        assert_eq!(&*got, short.as_slice());
    }

    #[test]
    fn works_with_f32_readings() {
        let data = vec![Sample::new(0.0f32, 1.0), Sample::new(1.5, 2.0), Sample::new(3.0, 3.0)];
        let mut cursor = WindowCursor::new();
        let got = cursor.select(&data, 3.0, TimeWindow(1.5f32));
        assert_eq!(&*got, &data[1..]);
    }
}
