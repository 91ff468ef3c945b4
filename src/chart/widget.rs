use crate::chart::factory::{self, ChartOptions, LINE_WIDTH};
use crate::chart::surface::{Page, Surface};

use plotly::common::{Fill, Line, LineShape, Mode};
use plotly::{Configuration, Plot, Scatter};
use serde::Serialize;

/// One redraw of a chart, as pushed to the browser.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartFrame {
    pub surface: String,
    pub revision: u64,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Fixed y range for these values; `None` means autoscale.
    pub y_range: Option<[f64; 2]>,
}

/// A line chart bound to one page surface.
///
/// Holds what is currently displayed. Data changes only become visible on
/// the next [`redraw`](MetricChart::redraw).
#[derive(Debug)]
pub struct MetricChart {
    surface: Surface,
    options: ChartOptions,
    config: Configuration,
    labels: Vec<String>,
    values: Vec<f64>,
    revision: u64,
}

impl MetricChart {
    pub(crate) fn new(surface: Surface, options: ChartOptions, config: Configuration) -> Self {
        Self {
            surface,
            options,
            config,
            labels: Vec::new(),
            values: Vec::new(),
            revision: 0,
        }
    }

    pub fn surface_id(&self) -> &str {
        self.surface.id()
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }

    pub fn set_values(&mut self, values: Vec<f64>) {
        self.values = values;
    }

    /// Publishes the current labels and values. Redraws are immediate; there
    /// is no transition between revisions.
    pub fn redraw(&mut self) -> ChartFrame {
        self.revision += 1;
        self.frame()
    }

    pub fn frame(&self) -> ChartFrame {
        ChartFrame {
            surface: self.surface.id().to_owned(),
            revision: self.revision,
            labels: self.labels.clone(),
            values: self.values.clone(),
            y_range: self.y_range(),
        }
    }

    /// The y range the current values are drawn with. A half-bounded axis
    /// takes its open end from the visible data.
    pub fn y_range(&self) -> Option<[f64; 2]> {
        factory::y_range(self.options.y_min, self.options.y_max, &self.values)
    }

    /// The full figure as displayed right now.
    pub fn plot(&self) -> Plot {
        let color = self.options.color;

        let trace = Scatter::new(self.labels.clone(), self.values.clone())
            .name(self.options.label.as_str())
            .mode(Mode::Lines)
            .line(
                Line::new()
                    .color(plotly::color::Rgba::from(color))
                    .width(LINE_WIDTH)
                    .shape(LineShape::Spline),
            )
            .fill(Fill::ToZeroY)
            .fill_color(plotly::color::Rgba::from(color.fill()));

        let mut plot = Plot::new();
        plot.add_trace(trace);
        plot.set_layout(factory::layout(&self.options, &self.values));
        plot.set_configuration(self.config.clone());
        plot
    }

    /// A `<div>` for the chart's surface plus the script that draws it.
    pub fn to_inline_html(&self) -> String {
        self.plot().to_inline_html(Some(self.surface.id()))
    }

    /// A standalone page containing only this chart.
    pub fn to_html(&self) -> String {
        self.plot().to_html()
    }

    /// Tears the chart down and hands its surface back to the page.
    pub fn destroy(self, page: &mut Page) {
        tracing::debug!(surface = self.surface.id(), "destroying metric chart");
        page.release(self.surface);
    }
}
