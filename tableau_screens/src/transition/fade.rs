// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use tableau_anim::Interpolator;
use tableau_core::layer::LayerTree;

use super::{Timed, Timing, Transition};
use crate::screen::ScreenView;

/// Default fade length in milliseconds.
pub const FADE_DURATION: f64 = 1000.0;

/// Fades the new screen in over the old one.
#[derive(Debug)]
pub struct Fade {
    timing: Timing,
}

impl Default for Fade {
    fn default() -> Self {
        Self::new()
    }
}

impl Fade {
    /// Creates a fade over [`FADE_DURATION`] with
    /// [`Interpolator::EaseInOut`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            timing: Timing::new(FADE_DURATION, Interpolator::EaseInOut),
        }
    }
}

impl Timed for Fade {
    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }
}

impl Transition for Fade {
    fn init(&mut self, tree: &mut LayerTree, _: ScreenView, new: ScreenView) {
        self.timing.start(tree);
        tree.set_alpha(new.layer, 0.0);
    }

    #[expect(clippy::cast_possible_truncation, reason = "alpha is stored as f32")]
    fn update(
        &mut self,
        tree: &mut LayerTree,
        _: ScreenView,
        new: ScreenView,
        elapsed: f64,
    ) -> bool {
        let alpha = self.timing.at(0.0, 1.0, elapsed);
        tree.set_alpha(new.layer, alpha as f32);
        self.timing.is_done(elapsed)
    }

    fn complete(&mut self, tree: &mut LayerTree, _: ScreenView, new: ScreenView) {
        self.timing.finish(tree);
        tree.set_alpha(new.layer, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    #[test]
    fn fades_new_screen_in() {
        let mut tree = LayerTree::new();
        let size = Size::new(10.0, 10.0);
        let old = ScreenView {
            layer: tree.create_group(),
            size,
        };
        let new = ScreenView {
            layer: tree.create_group(),
            size,
        };
        let mut fade = Fade::new();
        fade.init(&mut tree, old, new);
        assert!(!fade.update(&mut tree, old, new, 0.0));
        assert_eq!(tree.alpha(new.layer), 0.0);
        assert!(!fade.update(&mut tree, old, new, 500.0));
        assert!((tree.alpha(new.layer) - 0.5).abs() < 1e-6);
        assert!(fade.update(&mut tree, old, new, 1000.0));
        fade.complete(&mut tree, old, new);
        assert_eq!(tree.alpha(new.layer), 1.0);
        assert_eq!(tree.alpha(old.layer), 1.0);
    }
}
