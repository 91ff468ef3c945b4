use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::time::Duration;

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("{what} must be a finite number, got {value}")]
    NonFinite { what: &'static str, value: f64 },
}

/// Commands accepted by `POST /clock`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClockCommand {
    Play,
    Pause,
    Seek { time: f64 },
    Rate { rate: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClockState {
    pub time: f64,
    pub rate: f64,
    pub playing: bool,
}

/// The simulation time cursor.
///
/// While playing, every tick moves it forward by wall-clock time scaled by
/// `rate`. Seeking may move it anywhere, including backwards.
#[derive(Clone, Debug)]
pub struct SimClock {
    state: ClockState,
}

impl SimClock {
    pub fn new(rate: f64, playing: bool) -> Self {
        Self {
            state: ClockState {
                time: 0.0,
                rate,
                playing,
            },
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    /// Moves the cursor for `elapsed` wall time. Paused clocks don't move.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.state.playing {
            self.state.time += elapsed.as_secs_f64() * self.state.rate;
        }
    }

    pub fn apply(&mut self, command: ClockCommand) -> Result<ClockState, ClockError> {
        match command {
            ClockCommand::Play => self.state.playing = true,
            ClockCommand::Pause => self.state.playing = false,
            ClockCommand::Seek { time } => self.state.time = finite("time", time)?,
            ClockCommand::Rate { rate } => self.state.rate = finite("rate", rate)?,
        }

        Ok(self.state)
    }
}

fn finite(what: &'static str, value: f64) -> Result<f64, ClockError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ClockError::NonFinite { what, value })
    }
}
