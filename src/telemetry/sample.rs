use num_traits::Float;
use serde::{Deserialize, Serialize};

use std::fmt::{Debug, Display};

// Any float the sensors can hand us, as long as we can print it on an axis.
pub trait Reading: Float + Display + Debug + Send + Sync + 'static {}

impl<T> Reading for T where T: Float + Display + Debug + Send + Sync + 'static {}

/// One measurement at a simulation timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample<T = f64> {
    pub time: T,
    pub value: T,
}

impl<T: Reading> Sample<T> {
    pub fn new(time: T, value: T) -> Self {
        Self { time, value }
    }

    /// The x-axis label for this sample: its time with one decimal place.
    ///
    /// Exact halfway times round away from zero and negative zero prints as
    /// `0.0`, so labels match what a browser's `toFixed(1)` shows.
    pub fn time_label(&self) -> String {
        match self.time.to_f64() {
            Some(time) => one_decimal(time),
            None => format!("{:.1}", self.time),
        }
    }
}

fn one_decimal(time: f64) -> String {
    if time == 0.0 {
        return "0.0".to_owned();
    }

    // Only odd multiples of 0.25 sit exactly between two tenths.
    let quarters = time * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        format!("{:.1}", (time * 10.0).round() / 10.0)
    } else {
        format!("{:.1}", time)
    }
}

/// Whether `samples` is ordered non-decreasing by time.
///
/// A NaN time anywhere breaks the ordering.
pub fn is_sorted_by_time<T: Reading>(samples: &[Sample<T>]) -> bool {
    samples.windows(2).all(|pair| pair[0].time <= pair[1].time)
        && samples.iter().all(|s| !s.time.is_nan())
}

/// The full, append-only history of one series.
///
/// Ordering by time is expected but not enforced; the dataset just remembers
/// whether every append so far kept it sorted.
#[derive(Clone, Debug)]
pub struct Dataset<T = f64> {
    samples: Vec<Sample<T>>,
    sorted: bool,
}

impl<T: Reading> Default for Dataset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reading> Dataset<T> {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            sorted: true,
        }
    }

    pub fn push(&mut self, sample: Sample<T>) {
        if sample.time.is_nan() {
            self.sorted = false;
        } else if let Some(last) = self.samples.last() {
            // Still fine after a NaN was seen: `sorted` is already false.
            self.sorted &= last.time <= sample.time;
        }

        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample<T>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }
}

impl<T: Reading> Extend<Sample<T>> for Dataset<T> {
    fn extend<I: IntoIterator<Item = Sample<T>>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

impl<T: Reading> FromIterator<Sample<T>> for Dataset<T> {
    fn from_iter<I: IntoIterator<Item = Sample<T>>>(iter: I) -> Self {
        let mut dataset = Self::new();
        dataset.extend(iter);
        dataset
    }
}
