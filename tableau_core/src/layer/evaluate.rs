// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **TRANSFORM**: drain dirty indices, recompute each layer's
//!    `world_transform` as `parent_world * local * T(-origin)` and
//!    `effective_visible` as `parent_visible && visible`.
//! 2. **VISUAL**: drain dirty indices, recompute `effective_alpha` as
//!    `parent_alpha * alpha`.
//! 3. **CONTENT**: drain dirty indices (no recomputation; backends read the
//!    current values directly from the tree).
//! 4. **TOPOLOGY**: drain and discard (the traversal order was already
//!    rebuilt at the start of evaluation if needed).
//!
//! [`FrameChanges`] uses raw slot indices (`u32`) rather than [`LayerId`]
//! handles so that backends can index directly into the tree's SoA arrays
//! via the `*_at()` accessors without paying for generation checks.
//!
//! [`LayerId`]: super::LayerId

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::{INVALID, ResourceKey};
use super::tree::{LayerTree, ROOT};
use crate::dirty;

/// The set of changes produced by a single [`LayerTree::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Layers whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Layers whose effective alpha was recomputed.
    pub visuals: Vec<u32>,
    /// Layers whose content, batch or size changed.
    pub contents: Vec<u32>,
    /// Layers that became effectively hidden.
    pub hidden: Vec<u32>,
    /// Layers that became effectively visible again.
    pub unhidden: Vec<u32>,
    /// Layers that entered the added state, in order.
    pub added: Vec<u32>,
    /// Layers that left the added state, in order.
    pub removed: Vec<u32>,
    /// Backend resources owned by layers disposed since the last evaluate.
    pub released: Vec<ResourceKey>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.visuals.clear();
        self.contents.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.released.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.visuals.is_empty()
            && self.contents.is_empty()
            && self.hidden.is_empty()
            && self.unhidden.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.released.is_empty()
            && !self.topology_changed
    }
}

impl LayerTree {
    /// Evaluates the tree, recomputing dirty inherited properties and
    /// returning the set of changes.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let i = idx as usize;
            let parent_idx = self.parent[i];
            let (parent_world, parent_visible) = if parent_idx != INVALID {
                (
                    self.world_transform[parent_idx as usize],
                    self.effective_visible[parent_idx as usize],
                )
            } else {
                (Affine::IDENTITY, true)
            };
            self.world_transform[i] = parent_world * self.layer_to_parent_at(idx);

            let visible = parent_visible && self.flags[i].visible;
            if visible != self.effective_visible[i] {
                if visible {
                    changes.unhidden.push(idx);
                } else {
                    changes.hidden.push(idx);
                }
                self.effective_visible[i] = visible;
            }
        }
        changes.transforms = dirty_transforms;

        let dirty_visuals: Vec<u32> = self
            .dirty
            .drain(dirty::VISUAL)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_visuals {
            let parent_idx = self.parent[idx as usize];
            let parent_alpha = if parent_idx != INVALID {
                self.effective_alpha[parent_idx as usize]
            } else {
                1.0
            };
            self.effective_alpha[idx as usize] = parent_alpha * self.alpha[idx as usize];
        }
        changes.visuals = dirty_visuals;

        changes.contents = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        core::mem::swap(&mut self.pending_released, &mut changes.released);
    }

    /// Returns the depth-first pre-order traversal of the root's tree,
    /// lowest depth first among siblings.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        let mut stack = Vec::from([ROOT]);
        while let Some(idx) = stack.pop() {
            self.traversal_order.push(idx);
            stack.extend(self.children[idx as usize].iter().rev());
        }
    }
}
