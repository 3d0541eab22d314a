// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting the tree into a [`Surface`].

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use super::props::{Content, LayerKind};
use super::tree::{LayerTree, ROOT};
use crate::error::Error;
use crate::surface::{ClipScope, Surface};
use crate::tint;

impl LayerTree {
    /// Paints the root's tree into `surf`, pre-order, lowest depth first.
    ///
    /// Invisible layers and their subtrees are skipped. Each visible layer
    /// saves the surface transform, folds its alpha and tint into the
    /// surface tint, activates its batch and concatenates
    /// `local * T(-origin)`. It then paints its content and its children and
    /// restores everything it changed.
    ///
    /// Clipped groups open a clip region from their bounds mapped through the
    /// accumulated transform (position truncated, extent rounded) and paint
    /// nothing inside it when the region or extent is empty. The region is
    /// always closed, even when a painter fails. Clipping assumes an
    /// axis-aligned transform; under rotation the region is the degenerate
    /// mapping of the width and height vector, not a bounding box.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a [`Painter`](crate::surface::Painter).
    /// Surface state is unwound before returning.
    pub fn paint(&mut self, surf: &mut dyn Surface) -> Result<(), Error> {
        self.paint_layer(ROOT, surf)
    }

    fn paint_layer(&mut self, idx: u32, surf: &mut dyn Surface) -> Result<(), Error> {
        let i = idx as usize;
        if !self.flags[i].visible {
            return Ok(());
        }
        surf.save_tx();
        let old_tint = surf.tint();
        surf.set_tint(tint::combine(
            old_tint,
            tint::with_alpha(self.tint[i], self.alpha[i]),
        ));
        let old_batch = surf.push_batch(self.batch[i].as_ref());
        surf.concatenate(self.layer_to_parent_at(idx));

        let result = match self.kind[i] {
            LayerKind::Group { clip: true } => self.paint_clipped(idx, surf),
            _ => self
                .paint_content(idx, surf)
                .and_then(|()| self.paint_children(idx, surf)),
        };

        surf.pop_batch(old_batch);
        surf.set_tint(old_tint);
        surf.restore_tx();
        result
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "clip rectangles are in device pixels, well within i32"
    )]
    fn paint_clipped(&mut self, idx: u32, surf: &mut dyn Surface) -> Result<(), Error> {
        let size = self.size[idx as usize];
        let tx = surf.tx();
        let pos = tx * Point::ORIGIN;
        let [a, b, c, d, _, _] = tx.as_coeffs();
        let ext_w = (a * size.width + c * size.height).abs().round() as i32;
        let ext_h = (b * size.width + d * size.height).abs().round() as i32;

        let mut scope = ClipScope::open(surf, pos.x as i32, pos.y as i32, ext_w, ext_h);
        if !scope.non_empty() || ext_w <= 0 || ext_h <= 0 {
            return Ok(());
        }
        self.paint_content(idx, scope.surface())?;
        self.paint_children(idx, scope.surface())
    }

    fn paint_content(&mut self, idx: u32, surf: &mut dyn Surface) -> Result<(), Error> {
        let i = idx as usize;
        let size = self.size[i];
        match &mut self.content[i] {
            Content::None => Ok(()),
            Content::Texture(key) => {
                surf.draw(*key, 0.0, 0.0, size.width, size.height);
                Ok(())
            }
            Content::Painter(painter) => painter.paint(surf, size),
        }
    }

    fn paint_children(&mut self, idx: u32, surf: &mut dyn Surface) -> Result<(), Error> {
        // Painters cannot reach the tree, so the child list is stable here.
        for k in 0..self.children[idx as usize].len() {
            let child = self.children[idx as usize][k];
            self.paint_layer(child, surf)?;
        }
        Ok(())
    }
}
