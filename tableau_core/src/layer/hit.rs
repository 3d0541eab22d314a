// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing and coordinate conversion.
//!
//! These queries walk the live tree rather than the cached transforms from
//! [`evaluate`](LayerTree::evaluate), so input dispatch sees structural
//! changes made earlier in the same frame.

use kurbo::{Affine, Point};

use super::id::{INVALID, LayerId};
use super::tree::{LayerTree, ROOT};
use crate::error::Error;

impl LayerTree {
    /// Returns the topmost interactive layer under `point`, in screen
    /// coordinates.
    ///
    /// The search descends from the root, visiting children highest depth
    /// first. Invisible subtrees and subtrees with a singular transform are
    /// skipped. A layer's children are searched before the layer itself. A
    /// layer hits if it is interactive and either contains the point in
    /// `(0, 0)..(width, height)` or absorbs hits. Non-interactive layers never
    /// hit but their children are still searched.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<LayerId> {
        if !self.flags[ROOT as usize].visible {
            return None;
        }
        let local = self.parent_to_layer(ROOT, point)?;
        self.hit_layer(ROOT, local).map(|idx| self.id_at(idx))
    }

    /// Like [`hit_test`](Self::hit_test), but starts at `id` with `point` in
    /// `id`'s parent space.
    #[must_use]
    pub fn hit_test_from(&self, id: LayerId, point: Point) -> Option<LayerId> {
        self.validate(id);
        if !self.flags[id.idx as usize].visible {
            return None;
        }
        let local = self.parent_to_layer(id.idx, point)?;
        self.hit_layer(id.idx, local).map(|idx| self.id_at(idx))
    }

    /// Maps a point from `id`'s layer space into its parent's space.
    #[must_use]
    pub fn layer_to_parent(&self, id: LayerId, point: Point) -> Point {
        self.validate(id);
        self.layer_to_parent_at(id.idx) * point
    }

    /// Maps a point from `id`'s layer space into screen space.
    #[must_use]
    pub fn layer_to_screen(&self, id: LayerId, point: Point) -> Point {
        self.screen_transform(id) * point
    }

    /// Maps a screen point into `id`'s layer space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonInvertible`] naming the first layer on the path
    /// from the top of `id`'s tree whose transform is singular.
    pub fn screen_to_layer(&self, id: LayerId, point: Point) -> Result<Point, Error> {
        self.validate(id);
        let mut chain = alloc::vec::Vec::new();
        let mut idx = id.idx;
        while idx != INVALID {
            chain.push(idx);
            idx = self.parent[idx as usize];
        }
        let mut p = point;
        for &idx in chain.iter().rev() {
            p = self
                .parent_to_layer(idx, p)
                .ok_or_else(|| Error::NonInvertible(self.id_at(idx)))?;
        }
        Ok(p)
    }

    /// Returns the live layer-to-screen transform of `id`, the transform
    /// [`paint`](Self::paint) would draw its content with.
    #[must_use]
    pub fn screen_transform(&self, id: LayerId) -> Affine {
        self.validate(id);
        let mut tx = Affine::IDENTITY;
        let mut idx = id.idx;
        while idx != INVALID {
            tx = self.layer_to_parent_at(idx) * tx;
            idx = self.parent[idx as usize];
        }
        tx
    }

    /// Maps a point from `idx`'s parent space into its layer space, or
    /// `None` if the local transform is singular.
    fn parent_to_layer(&self, idx: u32, point: Point) -> Option<Point> {
        let local = self.local_transform_at(idx);
        let det = local.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(local.inverse() * point + self.origin_at(idx).to_vec2())
    }

    fn hit_layer(&self, idx: u32, point: Point) -> Option<u32> {
        let i = idx as usize;
        for &child in self.children[i].iter().rev() {
            if !self.flags[child as usize].visible {
                continue;
            }
            let Some(local) = self.parent_to_layer(child, point) else {
                continue;
            };
            if let Some(hit) = self.hit_layer(child, local) {
                return Some(hit);
            }
        }
        let flags = self.flags[i];
        if !flags.interactive {
            return None;
        }
        let size = self.size[i];
        let inside =
            point.x >= 0.0 && point.y >= 0.0 && point.x < size.width && point.y < size.height;
        (flags.absorb_hits || inside).then_some(idx)
    }
}
