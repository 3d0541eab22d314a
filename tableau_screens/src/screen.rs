// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The screen trait and the view transitions get of a screen.

use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Size;
use tableau_core::Error;
use tableau_core::frame::Clock;
use tableau_core::layer::{LayerId, LayerTree};
use tableau_core::signal::Connections;

/// A shared, identity-compared screen as held by a
/// [`ScreenStack`](crate::ScreenStack).
pub type ScreenRef = Rc<RefCell<dyn Screen>>;

/// Wraps `screen` for use with a [`ScreenStack`](crate::ScreenStack).
pub fn screen_ref(screen: impl Screen + 'static) -> ScreenRef {
    Rc::new(RefCell::new(screen))
}

/// One full-view page of an app, such as a menu or a level.
///
/// A screen's visibility lifecycle is
/// `added -> shown -> { hidden -> shown -> ... } -> hidden -> removed`.
/// Hooks run with the screen's layer already attached (`was_shown`) or
/// already detached (`was_hidden`). Errors returned by hooks are logged and
/// otherwise ignored, so a failing screen cannot break the stack.
pub trait Screen {
    /// The group layer that holds the screen's content.
    fn layer(&self) -> LayerId;

    /// The size of the screen, used by transitions.
    fn size(&self) -> Size;

    /// Called when the screen enters the stack.
    ///
    /// # Errors
    ///
    /// Logged by the stack.
    fn was_added(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        _ = tree;
        Ok(())
    }

    /// Called when the screen becomes visible, before any transition into
    /// view starts.
    ///
    /// # Errors
    ///
    /// Logged by the stack.
    fn was_shown(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        _ = tree;
        Ok(())
    }

    /// Called when the screen stops being visible.
    ///
    /// # Errors
    ///
    /// Logged by the stack.
    fn was_hidden(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        _ = tree;
        Ok(())
    }

    /// Connections the stack closes right after each
    /// [`was_hidden`](Self::was_hidden).
    ///
    /// Lets a screen tie listeners made in [`was_shown`](Self::was_shown) to
    /// the time it is visible.
    fn close_on_hide(&mut self) -> Option<&mut Connections> {
        None
    }

    /// Called when the screen leaves the stack. Always preceded by
    /// [`was_hidden`](Self::was_hidden), though not always immediately.
    ///
    /// # Errors
    ///
    /// Logged by the stack.
    fn was_removed(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        _ = tree;
        Ok(())
    }

    /// Called when the transition into view has finished.
    ///
    /// # Errors
    ///
    /// Logged by the stack.
    fn show_transition_completed(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        _ = tree;
        Ok(())
    }

    /// Called when a transition out of view begins.
    ///
    /// # Errors
    ///
    /// Logged by the stack.
    fn hide_transition_started(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        _ = tree;
        Ok(())
    }

    /// Called on every stack tick while the screen is shown.
    ///
    /// # Errors
    ///
    /// Logged by the stack.
    fn paint(&mut self, tree: &mut LayerTree, clock: &Clock) -> Result<(), Error> {
        _ = (tree, clock);
        Ok(())
    }
}

/// What a [`Transition`](crate::Transition) sees of a screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenView {
    /// The screen's layer.
    pub layer: LayerId,
    /// The screen's size.
    pub size: Size,
}

impl ScreenView {
    pub(crate) fn of(screen: &ScreenRef) -> Self {
        let screen = screen.borrow();
        Self {
            layer: screen.layer(),
            size: screen.size(),
        }
    }
}
