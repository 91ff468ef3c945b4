pub mod color;
pub mod factory;
pub mod surface;
pub mod updater;
pub mod widget;

use thiserror::Error;

pub use color::Rgba;
pub use factory::{create_metric_chart, ChartOptions};
pub use surface::{Page, Surface};
pub use updater::{update_chart_data, LiveChart};
pub use widget::{ChartFrame, MetricChart};

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("no drawable surface with id {0:?} on the page")]
    SurfaceNotFound(String),
    #[error("surface {0:?} already has a chart; destroy it first")]
    SurfaceInUse(String),
    #[error("{0:?} is not a valid surface id")]
    InvalidSurfaceId(String),
}
