// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer interaction listeners.

use alloc::rc::Rc;
use core::cell::RefCell;

use super::event::EventKind;
use super::interaction::Interaction;
use crate::error::Error;
use crate::layer::LayerTree;

/// A shared handle to a listener, as attached with
/// [`LayerTree::add_listener`].
pub type ListenerRef = Rc<RefCell<dyn InteractionListener>>;

/// Receives the interactions that reach a layer.
///
/// [`on_interaction`](Self::on_interaction) routes by event kind to the
/// per-kind methods, all of which default to doing nothing. Override either
/// the router or the kinds you care about.
pub trait InteractionListener {
    /// Handles one event of an interaction.
    ///
    /// # Errors
    ///
    /// Errors stop the dispatch of this event and propagate to the caller of
    /// [`Dispatcher::dispatch`](super::Dispatcher::dispatch).
    fn on_interaction(
        &mut self,
        tree: &mut LayerTree,
        iact: &mut Interaction,
    ) -> Result<(), Error> {
        match iact.event().kind {
            EventKind::Start => self.on_start(tree, iact),
            EventKind::Move => self.on_move(tree, iact),
            EventKind::End => self.on_end(tree, iact),
            EventKind::Cancel => self.on_cancel(tree, iact),
        }
    }

    /// A gesture started on or under this layer.
    fn on_start(&mut self, tree: &mut LayerTree, iact: &mut Interaction) -> Result<(), Error> {
        _ = (tree, iact);
        Ok(())
    }

    /// The gesture moved.
    fn on_move(&mut self, tree: &mut LayerTree, iact: &mut Interaction) -> Result<(), Error> {
        _ = (tree, iact);
        Ok(())
    }

    /// The gesture ended.
    fn on_end(&mut self, tree: &mut LayerTree, iact: &mut Interaction) -> Result<(), Error> {
        _ = (tree, iact);
        Ok(())
    }

    /// The gesture was canceled, or captured by another layer.
    fn on_cancel(&mut self, tree: &mut LayerTree, iact: &mut Interaction) -> Result<(), Error> {
        _ = (tree, iact);
        Ok(())
    }
}
