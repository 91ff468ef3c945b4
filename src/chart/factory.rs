use crate::chart::color::Rgba;
use crate::chart::surface::Page;
use crate::chart::widget::MetricChart;
use crate::chart::ChartError;

use plotly::common::{Font, Title};
use plotly::layout::{Axis, HoverMode, Layout, Margin};
use plotly::Configuration;
use serde::{Deserialize, Serialize};

pub(crate) const AXIS_TEXT: &str = "#aaa";
pub(crate) const AXIS_FONT_SIZE: usize = 10;
pub(crate) const LINE_WIDTH: f64 = 2.0;
const X_GRID: Rgba = Rgba::new(255, 255, 255, 0.05);
const Y_GRID: Rgba = Rgba::new(255, 255, 255, 0.1);
const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

/// Everything needed to build one metric chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Id of the page element the chart is drawn into.
    pub surface: String,
    /// Series name, shown in the hover box.
    pub label: String,
    pub color: Rgba,
    pub y_axis_label: String,
    #[serde(default)]
    pub y_min: Option<f64>,
    #[serde(default)]
    pub y_max: Option<f64>,
}

impl ChartOptions {
    pub fn new(
        surface: impl Into<String>,
        label: impl Into<String>,
        color: Rgba,
        y_axis_label: impl Into<String>,
    ) -> Self {
        Self {
            surface: surface.into(),
            label: label.into(),
            color,
            y_axis_label: y_axis_label.into(),
            y_min: None,
            y_max: None,
        }
    }

    pub fn y_bounds(mut self, y_min: Option<f64>, y_max: Option<f64>) -> Self {
        self.y_min = y_min;
        self.y_max = y_max;
        self
    }
}

/// Builds a live line chart on `options.surface`.
///
/// The surface must be declared on `page` and not already hosting a chart.
/// The chart starts empty; feed it with
/// [`update_chart_data`](crate::chart::update_chart_data).
pub fn create_metric_chart(page: &mut Page, options: ChartOptions) -> Result<MetricChart, ChartError> {
    let surface = page.claim(&options.surface)?;

    tracing::debug!(surface = surface.id(), label = %options.label, "created metric chart");

    Ok(MetricChart::new(surface, options, configuration()))
}

/// Layout for a chart currently showing `values`.
///
/// Only a half-bounded y axis depends on the data: the open end follows the
/// visible values.
pub(crate) fn layout(options: &ChartOptions, values: &[f64]) -> Layout {
    let axis_font = || Font::new().size(AXIS_FONT_SIZE).color(AXIS_TEXT);

    // Time labels are hidden to keep the view compact.
    let x_axis = Axis::new()
        .show_tick_labels(false)
        .show_grid(true)
        .grid_color(plotly::color::Rgba::from(X_GRID))
        .zero_line(false);

    let y_axis = Axis::new()
        .title(Title::from(options.y_axis_label.as_str()).font(axis_font()))
        .tick_font(axis_font())
        .color(AXIS_TEXT)
        .show_grid(true)
        .grid_color(plotly::color::Rgba::from(Y_GRID))
        .zero_line(false);

    let y_axis = match y_range(options.y_min, options.y_max, values) {
        Some([min, max]) => y_axis.range(vec![min, max]),
        None => y_axis.auto_range(true),
    };

    Layout::new()
        .show_legend(false)
        .hover_mode(HoverMode::XUnified)
        .auto_size(true)
        .paper_background_color(plotly::color::Rgba::from(TRANSPARENT))
        .plot_background_color(plotly::color::Rgba::from(TRANSPARENT))
        .margin(Margin::new().left(48).right(8).top(8).bottom(8))
        .x_axis(x_axis)
        .y_axis(y_axis)
}

pub(crate) fn y_range(y_min: Option<f64>, y_max: Option<f64>, values: &[f64]) -> Option<[f64; 2]> {
    match (y_min, y_max) {
        (None, None) => None,
        (Some(min), Some(max)) => Some([min, max]),
        (min, max) => {
            let (lo, hi) = values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })?;

            let (lo, hi) = (min.unwrap_or(lo), max.unwrap_or(hi));
            (lo < hi).then_some([lo, hi])
        }
    }
}

fn configuration() -> Configuration {
    Configuration::new().responsive(true)
}
