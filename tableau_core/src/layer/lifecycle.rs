// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Added/removed lifecycle propagation.
//!
//! A layer is [`Added`](LayerState::Added) while it is connected to the root
//! and [`Removed`](LayerState::Removed) otherwise. Attaching a subtree under
//! an added parent walks it in pre-order, flipping each layer to `Added` and
//! calling its [`Lifecycle::was_added`] hook; detaching walks it the same way
//! with [`Lifecycle::was_removed`].
//!
//! Hooks receive `&mut LayerTree` and may restructure the tree, including the
//! subtree being walked. The walk snapshots each child list before recursing
//! and only visits a child that is still attached to the node being walked
//! and still needs the transition. Because a hook only runs on an actual
//! state change, added-minus-removed calls per layer is always 0 or 1.

use alloc::vec::Vec;

use super::id::LayerId;
use super::props::LayerState;
use super::tree::LayerTree;
use crate::error::Error;

/// Hooks invoked when a layer joins or leaves the root's tree.
pub trait Lifecycle {
    /// Called after `id` became connected to the root, before its children.
    ///
    /// # Errors
    ///
    /// Errors abort the walk and propagate to the caller of the triggering
    /// tree operation.
    fn was_added(&mut self, tree: &mut LayerTree, id: LayerId) -> Result<(), Error> {
        _ = (tree, id);
        Ok(())
    }

    /// Called after `id` was disconnected from the root, before its children.
    ///
    /// # Errors
    ///
    /// Errors abort the walk and propagate to the caller of the triggering
    /// tree operation.
    fn was_removed(&mut self, tree: &mut LayerTree, id: LayerId) -> Result<(), Error> {
        _ = (tree, id);
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Added,
    Removed,
}

impl LayerTree {
    /// Flips `idx` and its attached descendants from `Removed` to `Added`.
    pub(crate) fn enter_added(&mut self, idx: u32) -> Result<(), Error> {
        self.enter(idx, Phase::Added)
    }

    /// Flips `idx` and its attached descendants from `Added` to `Removed`.
    pub(crate) fn enter_removed(&mut self, idx: u32) -> Result<(), Error> {
        self.enter(idx, Phase::Removed)
    }

    fn enter(&mut self, idx: u32, phase: Phase) -> Result<(), Error> {
        let (from, to) = match phase {
            Phase::Added => (LayerState::Removed, LayerState::Added),
            Phase::Removed => (LayerState::Added, LayerState::Removed),
        };
        let i = idx as usize;
        if self.state[i] != from {
            return Ok(());
        }
        self.state[i] = to;
        match phase {
            Phase::Added => self.pending_added.push(idx),
            Phase::Removed => self.pending_removed.push(idx),
        }
        let id = self.id_at(idx);
        self.run_hook(id, phase)?;

        let snapshot: Vec<u32> = self.children[i].clone();
        for child in snapshot {
            // The hook may have moved, disposed or re-added anything.
            if self.generation[i] == id.generation
                && self.state[i] == to
                && self.parent[child as usize] == idx
                && self.state[child as usize] == from
            {
                self.enter(child, phase)?;
            }
        }
        Ok(())
    }

    fn run_hook(&mut self, id: LayerId, phase: Phase) -> Result<(), Error> {
        let i = id.idx as usize;
        let Some(mut hook) = self.hooks[i].take() else {
            return Ok(());
        };
        let result = match phase {
            Phase::Added => hook.was_added(self, id),
            Phase::Removed => hook.was_removed(self, id),
        };
        // Put the hook back unless the layer died or installed a new one.
        if self.is_alive(id) && self.hooks[i].is_none() {
            self.hooks[i] = Some(hook);
        }
        result
    }
}
