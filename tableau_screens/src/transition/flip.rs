// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::PI;

use tableau_anim::Interpolator;
use tableau_core::layer::{LayerId, LayerTree};
use tableau_core::surface::Batch;

use super::{Timed, Timing, Transition};
use crate::screen::ScreenView;

/// Default flip length in milliseconds.
pub const FLIP_DURATION: f64 = 1000.0;

const FLIP_BATCH: Batch = Batch::rotate_y(0.5, 0.5, 1.0);

/// Flips the old screen over, revealing the new screen on its back.
///
/// Both screens are drawn through a [`Batch::RotateY`]. The new screen starts
/// behind the old one and swaps in front halfway through.
#[derive(Debug)]
pub struct Flip {
    timing: Timing,
    unflip: bool,
    flipped: bool,
}

impl Default for Flip {
    fn default() -> Self {
        Self::new()
    }
}

impl Flip {
    /// Creates a flip over [`FLIP_DURATION`] with [`Interpolator::Linear`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            timing: Timing::new(FLIP_DURATION, Interpolator::Linear),
            unflip: false,
            flipped: false,
        }
    }

    /// Flips in the opposite direction.
    #[must_use]
    pub fn unflip(mut self) -> Self {
        self.unflip = true;
        self
    }
}

#[expect(clippy::cast_possible_truncation, reason = "batch angles are f32")]
fn set_angle(tree: &mut LayerTree, layer: LayerId, angle: f64) {
    tree.set_batch(layer, Some(FLIP_BATCH.with_angle(angle as f32)));
}

impl Timed for Flip {
    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }
}

impl Transition for Flip {
    fn init(&mut self, tree: &mut LayerTree, old: ScreenView, new: ScreenView) {
        self.timing.start(tree);
        self.flipped = false;
        tree.set_depth(new.layer, -1.0);
        tree.set_batch(old.layer, Some(FLIP_BATCH));
        tree.set_batch(new.layer, Some(FLIP_BATCH));
    }

    fn update(
        &mut self,
        tree: &mut LayerTree,
        old: ScreenView,
        new: ScreenView,
        elapsed: f64,
    ) -> bool {
        let mut pct = self.timing.at(0.0, 1.0, elapsed);
        if pct >= 0.5 && !self.flipped {
            tree.set_depth(new.layer, 0.0);
            tree.set_depth(old.layer, -1.0);
            self.flipped = true;
        }
        if self.unflip {
            pct = -pct;
        }
        set_angle(tree, old.layer, PI * pct);
        set_angle(tree, new.layer, PI * (pct - 1.0));
        self.timing.is_done(elapsed)
    }

    fn complete(&mut self, tree: &mut LayerTree, old: ScreenView, new: ScreenView) {
        self.timing.finish(tree);
        tree.set_depth(old.layer, 0.0);
        tree.set_batch(old.layer, None);
        tree.set_depth(new.layer, 0.0);
        tree.set_batch(new.layer, None);
    }
}
