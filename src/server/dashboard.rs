use crate::chart::{create_metric_chart, ChartError, ChartFrame, LiveChart, MetricChart, Page};
use crate::config::{ChartConfig, PlaybackConfig};
use crate::server::clock::{ClockCommand, ClockError, ClockState, SimClock};
use crate::server::db::{DatabaseCtx, StoreError};
use crate::telemetry::{Dataset, Sample, TimeWindow};
use tracing::{debug, info, warn};

use std::collections::HashMap;
use std::time::Duration;

struct Panel {
    series: String,
    live: LiveChart,
}

/// Everything the page shows: its surfaces, the charts on them, the datasets
/// they plot and the simulation clock driving them all.
pub struct Dashboard {
    page: Page,
    panels: Vec<Panel>,
    datasets: HashMap<String, Dataset>,
    clock: SimClock,
    // Something changed that the browser hasn't seen yet.
    dirty: bool,
}

impl Dashboard {
    pub fn new(charts: &[ChartConfig], playback: &PlaybackConfig) -> Result<Self, ChartError> {
        let mut page = Page::new();
        for chart in charts {
            page.declare(chart.options.surface.as_str())?;
        }

        let mut panels = Vec::with_capacity(charts.len());
        for chart in charts {
            let window = TimeWindow(chart.time_window.unwrap_or(playback.time_window));
            let metric = create_metric_chart(&mut page, chart.options.clone())?;

            panels.push(Panel {
                series: chart.series.clone(),
                live: LiveChart::new(metric, window),
            });
        }

        Ok(Self {
            page,
            panels,
            datasets: HashMap::new(),
            clock: SimClock::new(playback.rate, playback.autoplay),
            dirty: true,
        })
    }

    pub fn charts(&self) -> impl Iterator<Item = &MetricChart> {
        self.panels.iter().map(|panel| panel.live.chart())
    }

    pub fn chart(&self, surface: &str) -> Option<&MetricChart> {
        self.charts().find(|chart| chart.surface_id() == surface)
    }

    pub fn dataset(&self, series: &str) -> Option<&Dataset> {
        self.datasets.get(series)
    }

    pub fn clock(&self) -> ClockState {
        self.clock.state()
    }

    /// Appends to `series`, returning its new length.
    pub fn append(&mut self, series: &str, samples: &[Sample]) -> usize {
        let dataset = self.datasets.entry(series.to_owned()).or_default();
        let was_sorted = dataset.is_sorted();
        dataset.extend(samples.iter().copied());

        if was_sorted && !dataset.is_sorted() {
            warn!(series, "samples arrived out of time order; windowing falls back to a full scan");
        }

        self.dirty = true;
        dataset.len()
    }

    /// Reloads every stored series, once each, no matter how many charts
    /// plot it. Returns the number of samples restored.
    pub fn restore(&mut self, db: &DatabaseCtx) -> Result<usize, StoreError> {
        let mut restored = 0;
        for series in db.series_names()? {
            let samples = db.get_series(&series)?;
            info!(%series, samples = samples.len(), "restored dataset");

            self.append(&series, &samples);
            restored += samples.len();
        }
        Ok(restored)
    }

    pub fn apply(&mut self, command: ClockCommand) -> Result<ClockState, ClockError> {
        let state = self.clock.apply(command)?;
        debug!(?command, time = state.time, "clock command");
        self.dirty = true;
        Ok(state)
    }

    /// One playback step: moves the clock and redraws whatever needs it.
    ///
    /// A paused dashboard with no new data produces no frames.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<ChartFrame> {
        if !self.clock.is_playing() && !self.dirty {
            return Vec::new();
        }

        self.clock.advance(elapsed);
        self.redraw()
    }

    /// Re-windows every chart at the current clock time.
    pub fn redraw(&mut self) -> Vec<ChartFrame> {
        let now = self.clock.time();
        let empty = Dataset::new();

        let frames = self
            .panels
            .iter_mut()
            .map(|panel| {
                let data = self.datasets.get(&panel.series).unwrap_or(&empty);
                panel.live.update(data.samples(), now)
            })
            .collect();

        self.dirty = false;
        frames
    }

    /// Takes every chart off the page.
    pub fn teardown(self) -> Page {
        let mut page = self.page;
        for panel in self.panels {
            panel.live.into_chart().destroy(&mut page);
        }
        page
    }
}
