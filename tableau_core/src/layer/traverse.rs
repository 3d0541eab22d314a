// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::LayerId;
use super::tree::LayerTree;

/// An iterator over the direct children of a layer, lowest depth first.
///
/// Created by [`LayerTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a LayerTree,
    slots: core::slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a LayerTree, slots: &'a [u32]) -> Self {
        Self {
            tree,
            slots: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        self.slots.next().map(|&idx| self.tree.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<LayerId> {
        self.slots.next_back().map(|&idx| self.tree.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}
