//! Per-side countdown clocks with increment-on-move semantics.
//!
//! The pair is driven externally: the owner calls `tick` once per second
//! for the side to move and `add_increment` after each completed move.
//! Reaching zero carries no forced-loss behavior; callers observe the
//! counters and may layer flag-fall on top.

use crate::board::Side;
use serde::{Deserialize, Serialize};

/// A named time control: base seconds plus per-move increment seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    pub name: String,
    pub base: u32,
    pub increment: u32,
}

impl TimeControl {
    pub fn new(name: &str, base: u32, increment: u32) -> Self {
        TimeControl {
            name: name.to_string(),
            base,
            increment,
        }
    }

    /// The standard preset list, bullet through classical.
    pub fn presets() -> Vec<TimeControl> {
        vec![
            TimeControl::new("Bullet 1+0", 60, 0),
            TimeControl::new("Bullet 2+1", 120, 1),
            TimeControl::new("Blitz 3+0", 180, 0),
            TimeControl::new("Blitz 5+3", 300, 3),
            TimeControl::new("Rapid 10+0", 600, 0),
            TimeControl::new("Rapid 15+10", 900, 10),
            TimeControl::new("Classical 30+0", 1800, 0),
        ]
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl::new("Blitz 5+3", 300, 3)
    }
}

/// Two independent second counters sharing one running flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockPair {
    white: u32,
    black: u32,
    increment: u32,
    running: bool,
}

impl ClockPair {
    pub fn new(base: u32, increment: u32) -> Self {
        ClockPair {
            white: base,
            black: base,
            increment,
            running: false,
        }
    }

    pub fn time(&self, side: Side) -> u32 {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Removes one second from `side`, clamped at zero. No effect while
    /// paused.
    pub fn tick(&mut self, side: Side) {
        if !self.running {
            return;
        }
        let counter = match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        };
        *counter = counter.saturating_sub(1);
    }

    /// Credits the configured increment to the side that just moved.
    pub fn add_increment(&mut self, side: Side) {
        match side {
            Side::White => self.white += self.increment,
            Side::Black => self.black += self.increment,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Reloads both counters and stops the clock.
    pub fn reset(&mut self, base: u32, increment: u32) {
        self.white = base;
        self.black = base;
        self.increment = increment;
        self.running = false;
    }
}
