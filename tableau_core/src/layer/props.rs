// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer property types.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Point, Size};

use super::id::ResourceKey;
use crate::surface::Painter;

/// Where a layer's origin sits within its bounds.
///
/// The origin is the point that the layer's translation places in its
/// parent's space, and the pivot for rotation and scale.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Origin {
    /// An explicit point in layer space.
    Fixed(f64, f64),
    /// Upper left corner.
    #[default]
    TopLeft,
    /// Middle of the top edge.
    TopCenter,
    /// Upper right corner.
    TopRight,
    /// Middle of the left edge.
    LeftCenter,
    /// Center of the layer.
    Center,
    /// Middle of the right edge.
    RightCenter,
    /// Lower left corner.
    BottomLeft,
    /// Middle of the bottom edge.
    BottomCenter,
    /// Lower right corner.
    BottomRight,
}

impl Origin {
    /// Resolves the origin against a layer size.
    #[must_use]
    pub fn resolve(self, size: Size) -> Point {
        let (w, h) = (size.width, size.height);
        match self {
            Self::Fixed(x, y) => Point::new(x, y),
            Self::TopLeft => Point::new(0.0, 0.0),
            Self::TopCenter => Point::new(w / 2.0, 0.0),
            Self::TopRight => Point::new(w, 0.0),
            Self::LeftCenter => Point::new(0.0, h / 2.0),
            Self::Center => Point::new(w / 2.0, h / 2.0),
            Self::RightCenter => Point::new(w, h / 2.0),
            Self::BottomLeft => Point::new(0.0, h),
            Self::BottomCenter => Point::new(w / 2.0, h),
            Self::BottomRight => Point::new(w, h),
        }
    }
}

/// Whether a layer can hold children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// A layer without children.
    Leaf,
    /// A layer with depth-sorted children.
    Group {
        /// Whether painting of children is restricted to the layer bounds.
        clip: bool,
    },
}

impl LayerKind {
    /// Returns whether this kind can hold children.
    #[inline]
    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::Group { .. })
    }
}

/// A layer's attachment state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayerState {
    /// Not connected to the root.
    #[default]
    Removed,
    /// Connected to the root.
    Added,
    /// Disposed; the handle is stale.
    Disposed,
}

/// Per-layer boolean flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerFlags {
    /// Whether the layer and its subtree are painted and hit-tested.
    pub visible: bool,
    /// Whether the layer itself can be returned by hit testing.
    pub interactive: bool,
    /// Whether an interactive layer claims every point tested against it,
    /// regardless of its bounds.
    pub absorb_hits: bool,
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self {
            visible: true,
            interactive: false,
            absorb_hits: false,
        }
    }
}

/// What a layer draws before its children.
#[derive(Default)]
pub enum Content {
    /// Nothing.
    #[default]
    None,
    /// A backend texture stretched over the layer bounds.
    Texture(ResourceKey),
    /// Custom drawing.
    Painter(Box<dyn Painter>),
}

impl Content {
    /// Returns the texture key, if any.
    #[must_use]
    pub fn texture(&self) -> Option<ResourceKey> {
        match self {
            Self::Texture(key) => Some(*key),
            _ => None,
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Texture(key) => f.debug_tuple("Texture").field(key).finish(),
            Self::Painter(_) => f.write_str("Painter(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_resolves_against_size() {
        let size = Size::new(100.0, 40.0);
        assert_eq!(Origin::TopLeft.resolve(size), Point::ORIGIN);
        assert_eq!(Origin::Center.resolve(size), Point::new(50.0, 20.0));
        assert_eq!(Origin::BottomRight.resolve(size), Point::new(100.0, 40.0));
        assert_eq!(Origin::Fixed(3.0, 4.0).resolve(size), Point::new(3.0, 4.0));
    }
}
