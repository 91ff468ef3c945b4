pub mod parsing;
pub mod sample;
pub mod window;

pub use sample::{Dataset, Reading, Sample};
pub use window::{select_window, TimeWindow, WindowBounds, WindowCursor};
