// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::f64::consts::PI;

use kurbo::Size;
use tableau_anim::Interpolator;
use tableau_core::Error;
use tableau_core::layer::{Content, LayerId, LayerTree};
use tableau_core::surface::{Batch, Surface};

use super::{Timed, Timing, Transition};
use crate::screen::ScreenView;

/// Default page turn length in milliseconds.
pub const PAGE_TURN_DURATION: f64 = 1500.0;

const PAGE_BATCH: Batch = Batch::rotate_y(0.0, 0.5, 1.5);
const SHADOW: u32 = 0xFF00_0000;

/// Opens the old screen like a book page, revealing the new screen beneath.
///
/// The turning page is hinged on its left edge and drawn through a
/// [`Batch::RotateY`]. A shadow strip a quarter of the page wide darkens as
/// the page opens.
#[derive(Debug)]
pub struct PageTurn {
    timing: Timing,
    close: bool,
    page: Option<LayerId>,
    shadow: Option<LayerId>,
}

impl Default for PageTurn {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTurn {
    /// Creates a page turn over [`PAGE_TURN_DURATION`] with
    /// [`Interpolator::EaseIn`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            timing: Timing::new(PAGE_TURN_DURATION, Interpolator::EaseIn),
            close: false,
            page: None,
            shadow: None,
        }
    }

    /// Closes the new screen over the old one instead of opening the old one.
    ///
    /// Switches the easing to [`Interpolator::EaseInOut`]; set a custom
    /// easing after calling this.
    #[must_use]
    pub fn close(mut self) -> Self {
        self.close = true;
        self.timing_mut().interp = Interpolator::EaseInOut;
        self
    }

    #[expect(clippy::cast_possible_truncation, reason = "alpha and angles are f32")]
    fn set_angle(&self, tree: &mut LayerTree, elapsed: f64) {
        let mut pct = self.timing.at(0.0, 0.5, elapsed);
        if self.close {
            pct = 0.5 - pct;
        }
        if let Some(shadow) = self.shadow {
            tree.set_alpha(shadow, pct as f32);
        }
        if let Some(page) = self.page {
            tree.set_batch(page, Some(PAGE_BATCH.with_angle((PI * pct) as f32)));
        }
    }
}

impl Timed for PageTurn {
    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }
}

impl Transition for PageTurn {
    fn init(&mut self, tree: &mut LayerTree, old: ScreenView, new: ScreenView) {
        self.timing.start(tree);
        tree.set_depth(new.layer, if self.close { 1.0 } else { -1.0 });
        let page = if self.close { new } else { old };
        tree.set_batch(page.layer, Some(PAGE_BATCH));

        let Size { width, height } = page.size;
        let shadow = tree.create_layer();
        tree.set_name(shadow, "page shadow");
        tree.set_size(shadow, Size::new(width / 4.0, height));
        tree.set_content(
            shadow,
            Content::Painter(Box::new(
                |surf: &mut dyn Surface, size: Size| -> Result<(), Error> {
                    surf.fill_rect(0.0, 0.0, size.width, size.height, SHADOW);
                    Ok(())
                },
            )),
        );
        if let Err(err) = tree.add_child_at(page.layer, shadow, width, 0.0) {
            log::warn!("page turn shadow not attached: {err}");
        }
        self.page = Some(page.layer);
        self.shadow = Some(shadow);
        self.set_angle(tree, 0.0);
    }

    fn update(
        &mut self,
        tree: &mut LayerTree,
        _: ScreenView,
        _: ScreenView,
        elapsed: f64,
    ) -> bool {
        self.set_angle(tree, elapsed);
        self.timing.is_done(elapsed)
    }

    fn complete(&mut self, tree: &mut LayerTree, _: ScreenView, new: ScreenView) {
        self.timing.finish(tree);
        if let Some(shadow) = self.shadow.take()
            && let Err(err) = tree.dispose(shadow)
        {
            log::warn!("page turn shadow dispose failed: {err}");
        }
        tree.set_depth(new.layer, 0.0);
        if let Some(page) = self.page.take() {
            tree.set_batch(page, None);
        }
    }
}
