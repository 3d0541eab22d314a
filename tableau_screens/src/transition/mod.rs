// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated hand-over from one screen to the next.

mod fade;
mod flip;
mod noop;
mod page_turn;
mod slide;

use alloc::boxed::Box;
use core::fmt;

use tableau_anim::Interpolator;
use tableau_core::layer::LayerTree;

use crate::screen::ScreenView;

pub use fade::{FADE_DURATION, Fade};
pub use flip::{FLIP_DURATION, Flip};
pub use noop::Noop;
pub use page_turn::{PAGE_TURN_DURATION, PageTurn};
pub use slide::{Dir, SLIDE_DURATION, Slide};

/// Moves the outgoing screen out of view and the incoming one into view.
///
/// The stack calls [`init`](Self::init) once both screens are attached,
/// then [`update`](Self::update) with elapsed time `0` and again on every
/// tick until it returns `true`. [`complete`](Self::complete) runs exactly
/// once afterwards; it may also run early when another transition starts.
pub trait Transition {
    /// Prepares both screens.
    fn init(&mut self, tree: &mut LayerTree, old: ScreenView, new: ScreenView) {
        _ = (tree, old, new);
    }

    /// Applies the state at `elapsed` milliseconds. Returns `true` once done.
    fn update(
        &mut self,
        tree: &mut LayerTree,
        old: ScreenView,
        new: ScreenView,
        elapsed: f64,
    ) -> bool;

    /// Restores anything `init` or `update` changed on the screens.
    fn complete(&mut self, tree: &mut LayerTree, old: ScreenView, new: ScreenView) {
        _ = (tree, old, new);
    }

    /// Returns whether the transition finishes without ever being updated.
    fn is_noop(&self) -> bool {
        false
    }
}

/// A callback run when a transition starts or completes.
pub type TransitionAction = Box<dyn FnMut(&mut LayerTree)>;

/// Length, easing, and callbacks shared by the built-in transitions.
pub struct Timing {
    duration: f64,
    interp: Interpolator,
    on_start: Option<TransitionAction>,
    on_complete: Option<TransitionAction>,
}

impl fmt::Debug for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timing")
            .field("duration", &self.duration)
            .field("interp", &self.interp)
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Timing {
    pub(crate) fn new(duration: f64, interp: Interpolator) -> Self {
        Self {
            duration,
            interp,
            on_start: None,
            on_complete: None,
        }
    }

    /// Returns the length in milliseconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns the easing curve.
    #[must_use]
    pub fn interp(&self) -> Interpolator {
        self.interp
    }

    pub(crate) fn start(&mut self, tree: &mut LayerTree) {
        if let Some(action) = &mut self.on_start {
            action(tree);
        }
    }

    pub(crate) fn finish(&mut self, tree: &mut LayerTree) {
        if let Some(action) = &mut self.on_complete {
            action(tree);
        }
    }

    /// Eases from `start` by `range` at `elapsed`.
    pub(crate) fn at(&self, start: f64, range: f64, elapsed: f64) -> f64 {
        self.interp.apply_clamp(start, range, elapsed, self.duration)
    }

    pub(crate) fn is_done(&self, elapsed: f64) -> bool {
        elapsed >= self.duration
    }
}

/// Builder methods for transitions that run over a [`Timing`].
pub trait Timed: Sized {
    /// Returns the timing to configure.
    fn timing_mut(&mut self) -> &mut Timing;

    /// Sets the length in milliseconds.
    #[must_use]
    fn duration(mut self, duration: f64) -> Self {
        self.timing_mut().duration = duration;
        self
    }

    /// Sets the easing curve.
    #[must_use]
    fn easing(mut self, interp: Interpolator) -> Self {
        self.timing_mut().interp = interp;
        self
    }

    /// Runs `action` when the transition starts.
    #[must_use]
    fn on_start(mut self, action: impl FnMut(&mut LayerTree) + 'static) -> Self {
        self.timing_mut().on_start = Some(Box::new(action));
        self
    }

    /// Runs `action` when the transition completes.
    #[must_use]
    fn on_complete(mut self, action: impl FnMut(&mut LayerTree) + 'static) -> Self {
        self.timing_mut().on_complete = Some(Box::new(action));
        self
    }
}
