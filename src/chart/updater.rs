use crate::chart::widget::{ChartFrame, MetricChart};
use crate::telemetry::{select_window, Sample, TimeWindow, WindowCursor};

/// Shows the trailing `window` of `data` ending at `current_time`, then
/// redraws.
///
/// Visible samples are those with time in
/// `[max(0, current_time - window), current_time]`, in dataset order.
pub fn update_chart_data(chart: &mut MetricChart, data: &[Sample], current_time: f64, window: TimeWindow) {
    let visible = select_window(data, current_time, window);
    show(chart, &visible);
}

fn show(chart: &mut MetricChart, visible: &[Sample]) -> ChartFrame {
    chart.set_labels(visible.iter().map(Sample::time_label).collect());
    chart.set_values(visible.iter().map(|s| s.value).collect());
    chart.redraw()
}

/// A chart fed every tick from one growing dataset.
///
/// Same output as calling [`update_chart_data`] each tick, but keeps a
/// [`WindowCursor`] so the visible slice is found without rescanning.
#[derive(Debug)]
pub struct LiveChart {
    chart: MetricChart,
    cursor: WindowCursor,
    window: TimeWindow,
}

impl LiveChart {
    pub fn new(chart: MetricChart, window: TimeWindow) -> Self {
        Self {
            chart,
            cursor: WindowCursor::new(),
            window,
        }
    }

    pub fn update(&mut self, data: &[Sample], current_time: f64) -> ChartFrame {
        let visible = self.cursor.select(data, current_time, self.window);
        show(&mut self.chart, &visible)
    }

    pub fn chart(&self) -> &MetricChart {
        &self.chart
    }

    pub fn into_chart(self) -> MetricChart {
        self.chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{create_metric_chart, ChartOptions, Page, Rgba};

    fn new_chart(page: &mut Page) -> MetricChart {
        create_metric_chart(
            page,
            ChartOptions::new("alt", "Altitude", Rgba::opaque(0, 200, 255), "km"),
        )
        .unwrap()
    }

    fn dataset() -> Vec<Sample> {
        [(0.0, 1.0), (10.0, 2.0), (20.0, 3.0), (30.0, 4.0)]
            .into_iter()
            .map(|(t, v)| Sample::new(t, v))
            .collect()
    }

    #[test]
    fn shows_the_trailing_window() {
        let mut page = Page::with_surfaces(["alt"]).unwrap();
        let mut chart = new_chart(&mut page);

        update_chart_data(&mut chart, &dataset(), 25.0, TimeWindow(15.0));

        assert_eq!(chart.labels(), ["10.0", "20.0"]);
        assert_eq!(chart.values(), [2.0, 3.0]);
        assert_eq!(chart.revision(), 1);
    }

    #[test]
    fn clears_the_chart_when_nothing_is_visible() {
        let mut page = Page::with_surfaces(["alt"]).unwrap();
        let mut chart = new_chart(&mut page);

        update_chart_data(&mut chart, &dataset(), 25.0, TimeWindow(15.0));
        update_chart_data(&mut chart, &dataset(), 100.0, TimeWindow::default());
        assert!(chart.labels().is_empty());
        assert!(chart.values().is_empty());

        update_chart_data(&mut chart, &[], 5.0, TimeWindow::default());
        assert!(chart.values().is_empty());
        assert_eq!(chart.revision(), 3);
    }

    #[test]
    fn repeated_updates_show_the_same_slice() {
        let mut page = Page::with_surfaces(["alt"]).unwrap();
        let mut chart = new_chart(&mut page);

        update_chart_data(&mut chart, &dataset(), 30.0, TimeWindow(20.0));
        let first = (chart.labels().to_vec(), chart.values().to_vec());
        update_chart_data(&mut chart, &dataset(), 30.0, TimeWindow(20.0));
        assert_eq!(first, (chart.labels().to_vec(), chart.values().to_vec()));
    }

    #[test]
    fn live_chart_matches_plain_updates() {
        let mut page = Page::with_surfaces(["alt", "plain"]).unwrap();
        let mut live = LiveChart::new(new_chart(&mut page), TimeWindow(12.5));
        let mut plain = create_metric_chart(
            &mut page,
            ChartOptions::new("plain", "Altitude", Rgba::opaque(0, 200, 255), "km"),
        )
        .unwrap();

        let mut data = Vec::new();
        for tick in 0..120 {
            let now = tick as f64 * 0.5;
            data.push(Sample::new(now, (tick % 7) as f64));

            // Scrub back every so often.
            let cursor = if tick % 25 == 24 { now - 30.0 } else { now };
            let frame = live.update(&data, cursor);
            update_chart_data(&mut plain, &data, cursor, TimeWindow(12.5));

            assert_eq!(frame.labels, plain.labels());
            assert_eq!(frame.values, plain.values());
        }
        assert_eq!(live.chart().revision(), 120);
    }
}
