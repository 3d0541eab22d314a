// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing contract between the layer tree and graphics backends.
//!
//! The tree never talks to a GPU or canvas directly. [`LayerTree::paint`]
//! walks the layers and issues [`Surface`] calls; a backend turns them into
//! draw commands. Implementations must treat [`start_clipped`] and
//! [`end_clipped`] as a strictly nested bracket.
//!
//! [`LayerTree::paint`]: crate::layer::LayerTree::paint
//! [`start_clipped`]: Surface::start_clipped
//! [`end_clipped`]: Surface::end_clipped

use kurbo::{Affine, Size, Vec2};

use crate::error::Error;
use crate::layer::ResourceKey;

/// A render batch override attached to a layer.
///
/// Batches select how a layer subtree is submitted. `RotateY` carries the
/// parameters of a perspective rotation around the vertical axis (used by
/// flip and page-turn transitions); `Custom` names a backend-managed batch
/// that the owning layer releases on disposal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Batch {
    /// Perspective rotation about the Y axis.
    RotateY {
        /// Eye position as a fraction of the viewport width.
        eye_x: f32,
        /// Eye position as a fraction of the viewport height.
        eye_y: f32,
        /// Depth scale applied to the rotated geometry.
        z_scale: f32,
        /// Rotation angle in radians.
        angle: f32,
    },
    /// A backend-defined batch.
    Custom(ResourceKey),
}

impl Batch {
    /// Creates a `RotateY` batch at angle zero.
    #[must_use]
    pub const fn rotate_y(eye_x: f32, eye_y: f32, z_scale: f32) -> Self {
        Self::RotateY {
            eye_x,
            eye_y,
            z_scale,
            angle: 0.0,
        }
    }

    /// Returns a copy with the rotation angle replaced. `Custom` batches are
    /// returned unchanged.
    #[must_use]
    pub const fn with_angle(self, angle: f32) -> Self {
        match self {
            Self::RotateY {
                eye_x,
                eye_y,
                z_scale,
                ..
            } => Self::RotateY {
                eye_x,
                eye_y,
                z_scale,
                angle,
            },
            other => other,
        }
    }
}

/// A graphics target the layer tree paints into.
pub trait Surface {
    /// Pushes the current transform.
    fn save_tx(&mut self);

    /// Pops the transform pushed by the matching [`save_tx`](Self::save_tx).
    fn restore_tx(&mut self);

    /// Returns the current transform.
    fn tx(&self) -> Affine;

    /// Replaces the current transform.
    fn set_tx(&mut self, tx: Affine);

    /// Post-multiplies the current transform by `xf`.
    fn concatenate(&mut self, xf: Affine) {
        let tx = self.tx() * xf;
        self.set_tx(tx);
    }

    /// Translates the current transform.
    fn translate(&mut self, dx: f64, dy: f64) {
        self.concatenate(Affine::translate(Vec2::new(dx, dy)));
    }

    /// Scales the current transform.
    fn scale(&mut self, sx: f64, sy: f64) {
        self.concatenate(Affine::scale_non_uniform(sx, sy));
    }

    /// Opens a clip region in device coordinates, intersected with any
    /// enclosing region. Returns `false` if the result is empty.
    ///
    /// Every call must be balanced by exactly one
    /// [`end_clipped`](Self::end_clipped), whatever the return value.
    fn start_clipped(&mut self, x: i32, y: i32, width: i32, height: i32) -> bool;

    /// Closes the innermost clip region.
    fn end_clipped(&mut self);

    /// Returns the current tint.
    fn tint(&self) -> u32;

    /// Replaces the current tint.
    fn set_tint(&mut self, tint: u32);

    /// Sets the alpha of the current tint, keeping its color.
    fn set_alpha(&mut self, alpha: f32) {
        let tint = crate::tint::with_alpha(self.tint() | 0xFF00_0000, alpha);
        self.set_tint(tint);
    }

    /// Activates `batch` (or the default batch for `None`) and returns the
    /// previously active batch, to be handed back to
    /// [`pop_batch`](Self::pop_batch).
    fn push_batch(&mut self, batch: Option<&Batch>) -> Option<Batch>;

    /// Restores the batch returned by the matching
    /// [`push_batch`](Self::push_batch).
    fn pop_batch(&mut self, previous: Option<Batch>);

    /// Draws a texture into `(x, y, width, height)` in the current transform.
    fn draw(&mut self, texture: ResourceKey, x: f64, y: f64, width: f64, height: f64);

    /// Fills a rectangle with an ARGB color, multiplied by the current tint.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: u32);
}

/// Custom content drawn by a layer before its children.
pub trait Painter {
    /// Paints into `surf` in layer space, where the layer occupies
    /// `(0, 0)..size`.
    ///
    /// # Errors
    ///
    /// Implementations return an error to abort the paint pass. Any clip
    /// region opened around the painter is still closed.
    fn paint(&mut self, surf: &mut dyn Surface, size: Size) -> Result<(), Error>;
}

impl<F> Painter for F
where
    F: FnMut(&mut dyn Surface, Size) -> Result<(), Error>,
{
    fn paint(&mut self, surf: &mut dyn Surface, size: Size) -> Result<(), Error> {
        self(surf, size)
    }
}

/// A clip region that is closed when the scope ends.
///
/// Created by [`ClipScope::open`], which calls
/// [`Surface::start_clipped`]. Dropping the scope calls
/// [`Surface::end_clipped`], including on early return and unwinding, so
/// the bracket stays balanced when bracketed painting fails.
pub struct ClipScope<'a> {
    surf: &'a mut dyn Surface,
    non_empty: bool,
}

impl core::fmt::Debug for ClipScope<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClipScope")
            .field("non_empty", &self.non_empty)
            .finish_non_exhaustive()
    }
}

impl<'a> ClipScope<'a> {
    /// Opens a clip region on `surf`.
    pub fn open(surf: &'a mut dyn Surface, x: i32, y: i32, width: i32, height: i32) -> Self {
        let non_empty = surf.start_clipped(x, y, width, height);
        Self { surf, non_empty }
    }

    /// Returns whether the surface reported a non-empty region.
    #[must_use]
    pub fn non_empty(&self) -> bool {
        self.non_empty
    }

    /// Returns the clipped surface.
    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surf
    }
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        self.surf.end_clipped();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Op, TestSurface};
    use super::*;

    #[test]
    fn clip_scope_closes_on_drop() {
        let mut surf = TestSurface::new();
        {
            let scope = ClipScope::open(&mut surf, 0, 0, 10, 10);
            assert!(scope.non_empty());
        }
        assert_eq!(surf.clip_depth, 0);
        assert_eq!(surf.ops.last(), Some(&Op::EndClip));
    }

    #[test]
    fn clip_scope_closes_on_error() {
        fn failing(surf: &mut dyn Surface) -> Result<(), Error> {
            let mut scope = ClipScope::open(surf, 0, 0, 5, 5);
            scope.surface().fill_rect(0.0, 0.0, 1.0, 1.0, 0xFF00_0000);
            Err(Error::Painter("boom"))
        }
        let mut surf = TestSurface::new();
        assert!(failing(&mut surf).is_err());
        assert_eq!(surf.clip_depth, 0, "bracket stays balanced");
    }

    #[test]
    fn rotate_y_with_angle() {
        let b = Batch::rotate_y(0.5, 0.5, 1.0).with_angle(1.25);
        assert_eq!(
            b,
            Batch::RotateY {
                eye_x: 0.5,
                eye_y: 0.5,
                z_scale: 1.0,
                angle: 1.25
            }
        );
        let custom = Batch::Custom(ResourceKey(3));
        assert_eq!(custom.with_angle(1.0), custom);
    }
}
