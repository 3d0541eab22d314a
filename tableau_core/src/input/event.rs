// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer and touch samples.

use kurbo::Point;

/// The phase of a gesture that an [`InputEvent`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A pointer went down or a touch began.
    Start,
    /// The pointer or touch moved.
    Move,
    /// The pointer went up or the touch ended.
    End,
    /// The platform or a listener aborted the gesture.
    Cancel,
}

impl EventKind {
    /// Returns whether this kind ends a gesture.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

/// One pointer or touch sample, in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputEvent {
    /// Gesture identifier; samples with the same id belong to one gesture.
    pub id: u32,
    /// Timestamp in milliseconds.
    pub time: f64,
    /// Screen x coordinate.
    pub x: f64,
    /// Screen y coordinate.
    pub y: f64,
    /// Gesture phase.
    pub kind: EventKind,
    /// Contact pressure, if the device reports it.
    pub pressure: Option<f32>,
    /// Contact size, if the device reports it.
    pub size: Option<f32>,
}

impl InputEvent {
    /// Creates a sample without pressure or size.
    #[must_use]
    pub const fn new(id: u32, time: f64, x: f64, y: f64, kind: EventKind) -> Self {
        Self {
            id,
            time,
            x,
            y,
            kind,
            pressure: None,
            size: None,
        }
    }

    /// Sets the contact pressure.
    #[must_use]
    pub const fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    /// Sets the contact size.
    #[must_use]
    pub const fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// Returns the sample position.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns a cancel sample at the same place and time.
    #[must_use]
    pub const fn to_cancel(self) -> Self {
        Self {
            kind: EventKind::Cancel,
            ..self
        }
    }
}
