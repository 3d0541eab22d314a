// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`Surface`] that records what was painted.
//!
//! [`RecordingSurface`] keeps the transform, tint and batch state a real
//! backend would, and logs every draw with that state applied. Use it to
//! inspect a frame without a graphics device, or to assert on painting in
//! tests.

use kurbo::{Affine, Rect};
use tableau_core::layer::ResourceKey;
use tableau_core::surface::{Batch, Surface};
use tableau_core::tint::NO_TINT;

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    /// A clip region was opened.
    StartClip {
        /// The clip rectangle in surface coordinates.
        rect: Rect,
        /// Whether the clip was non-empty.
        visible: bool,
    },
    /// The innermost clip region was closed.
    EndClip,
    /// A batch became active.
    PushBatch(Batch),
    /// The batch pushed last was deactivated.
    PopBatch,
    /// A texture was drawn.
    Draw {
        /// The texture.
        texture: ResourceKey,
        /// Destination in local coordinates.
        rect: Rect,
        /// The transform in effect.
        tx: Affine,
        /// The tint in effect.
        tint: u32,
        /// The batch in effect.
        batch: Option<Batch>,
    },
    /// A rectangle was filled.
    FillRect {
        /// Destination in local coordinates.
        rect: Rect,
        /// The fill color as ARGB.
        color: u32,
        /// The transform in effect.
        tx: Affine,
        /// The tint in effect.
        tint: u32,
        /// The batch in effect.
        batch: Option<Batch>,
    },
}

/// A [`Surface`] that appends every draw call to a list of [`SurfaceOp`]s.
#[derive(Debug)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    tx: Affine,
    tx_stack: Vec<Affine>,
    tint: u32,
    batch: Option<Batch>,
    /// Whether each open batch scope pushed a batch.
    batch_scopes: Vec<bool>,
    clip_depth: usize,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Creates an empty recording with identity transform and no tint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            tx: Affine::IDENTITY,
            tx_stack: Vec::new(),
            tint: NO_TINT,
            batch: None,
            batch_scopes: Vec::new(),
            clip_depth: 0,
        }
    }

    /// Returns the recorded operations.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Returns the recorded operations and starts a new recording.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Discards the recorded operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Counts the recorded operations matching `pred`.
    pub fn count(&self, pred: impl Fn(&SurfaceOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Returns the textures drawn, in order.
    #[must_use]
    pub fn textures(&self) -> Vec<ResourceKey> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Draw { texture, .. } => Some(*texture),
                _ => None,
            })
            .collect()
    }

    /// Returns whether every save, clip and batch scope was closed and the
    /// tint restored.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.tx_stack.is_empty()
            && self.clip_depth == 0
            && self.batch_scopes.is_empty()
            && self.batch.is_none()
            && self.tint == NO_TINT
    }
}

impl Surface for RecordingSurface {
    fn save_tx(&mut self) {
        self.tx_stack.push(self.tx);
    }

    fn restore_tx(&mut self) {
        match self.tx_stack.pop() {
            Some(tx) => self.tx = tx,
            None => log::warn!("restore_tx without a matching save_tx"),
        }
    }

    fn tx(&self) -> Affine {
        self.tx
    }

    fn set_tx(&mut self, tx: Affine) {
        self.tx = tx;
    }

    fn start_clipped(&mut self, x: i32, y: i32, width: i32, height: i32) -> bool {
        let visible = width > 0 && height > 0;
        self.clip_depth += 1;
        self.ops.push(SurfaceOp::StartClip {
            rect: Rect::new(
                f64::from(x),
                f64::from(y),
                f64::from(x) + f64::from(width),
                f64::from(y) + f64::from(height),
            ),
            visible,
        });
        visible
    }

    fn end_clipped(&mut self) {
        self.clip_depth = self.clip_depth.saturating_sub(1);
        self.ops.push(SurfaceOp::EndClip);
    }

    fn tint(&self) -> u32 {
        self.tint
    }

    fn set_tint(&mut self, tint: u32) {
        self.tint = tint;
    }

    fn push_batch(&mut self, batch: Option<&Batch>) -> Option<Batch> {
        let previous = self.batch;
        self.batch_scopes.push(batch.is_some());
        if let Some(b) = batch {
            self.batch = Some(*b);
            self.ops.push(SurfaceOp::PushBatch(*b));
        }
        previous
    }

    fn pop_batch(&mut self, previous: Option<Batch>) {
        if self.batch_scopes.pop() == Some(true) {
            self.ops.push(SurfaceOp::PopBatch);
        }
        self.batch = previous;
    }

    fn draw(&mut self, texture: ResourceKey, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(SurfaceOp::Draw {
            texture,
            rect: Rect::new(x, y, x + width, y + height),
            tx: self.tx,
            tint: self.tint,
            batch: self.batch,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: u32) {
        self.ops.push(SurfaceOp::FillRect {
            rect: Rect::new(x, y, x + width, y + height),
            color,
            tx: self.tx,
            tint: self.tint,
            batch: self.batch,
        });
    }
}
