// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};
use tableau_anim::Interpolator;
use tableau_core::layer::LayerTree;

use super::{Timed, Timing, Transition};
use crate::screen::ScreenView;

/// Default slide length in milliseconds.
pub const SLIDE_DURATION: f64 = 500.0;

/// The direction a [`Slide`] moves the screens in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dir {
    /// Towards negative y.
    Up,
    /// Towards positive y.
    Down,
    /// Towards negative x.
    #[default]
    Left,
    /// Towards positive x.
    Right,
}

/// Slides the old screen off and the new screen on right behind it.
#[derive(Debug)]
pub struct Slide {
    timing: Timing,
    dir: Dir,
    origin: Point,
    old_home: Vec2,
    old_end: Point,
    new_start: Point,
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

impl Slide {
    /// Creates a leftward slide over [`SLIDE_DURATION`] with
    /// [`Interpolator::EaseInOut`], for screens placed at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timing: Timing::new(SLIDE_DURATION, Interpolator::EaseInOut),
            dir: Dir::Left,
            origin: Point::ORIGIN,
            old_home: Vec2::ZERO,
            old_end: Point::ORIGIN,
            new_start: Point::ORIGIN,
        }
    }

    /// Sets where the stack places its screens.
    #[must_use]
    pub fn origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the direction.
    #[must_use]
    pub fn dir(mut self, dir: Dir) -> Self {
        self.dir = dir;
        self
    }

    /// Slides upwards.
    #[must_use]
    pub fn up(self) -> Self {
        self.dir(Dir::Up)
    }

    /// Slides downwards.
    #[must_use]
    pub fn down(self) -> Self {
        self.dir(Dir::Down)
    }

    /// Slides to the left.
    #[must_use]
    pub fn left(self) -> Self {
        self.dir(Dir::Left)
    }

    /// Slides to the right.
    #[must_use]
    pub fn right(self) -> Self {
        self.dir(Dir::Right)
    }
}

impl Timed for Slide {
    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }
}

impl Transition for Slide {
    fn init(&mut self, tree: &mut LayerTree, old: ScreenView, new: ScreenView) {
        self.timing.start(tree);
        let o = self.origin;
        let (old_off, new_off) = match self.dir {
            Dir::Up => (Vec2::new(0.0, -old.size.height), Vec2::new(0.0, new.size.height)),
            Dir::Down => (Vec2::new(0.0, old.size.height), Vec2::new(0.0, -new.size.height)),
            Dir::Left => (Vec2::new(-old.size.width, 0.0), Vec2::new(new.size.width, 0.0)),
            Dir::Right => (Vec2::new(old.size.width, 0.0), Vec2::new(-new.size.width, 0.0)),
        };
        self.old_end = o + old_off;
        self.new_start = o + new_off;
        self.old_home = tree.translation(old.layer);
        tree.set_translation(new.layer, self.new_start.to_vec2());
    }

    fn update(
        &mut self,
        tree: &mut LayerTree,
        old: ScreenView,
        new: ScreenView,
        elapsed: f64,
    ) -> bool {
        let (o, t) = (self.origin, &self.timing);
        let ox = t.at(o.x, self.old_end.x - o.x, elapsed);
        let oy = t.at(o.y, self.old_end.y - o.y, elapsed);
        tree.set_translation(old.layer, Vec2::new(ox, oy));
        let nx = t.at(self.new_start.x, o.x - self.new_start.x, elapsed);
        let ny = t.at(self.new_start.y, o.y - self.new_start.y, elapsed);
        tree.set_translation(new.layer, Vec2::new(nx, ny));
        t.is_done(elapsed)
    }

    fn complete(&mut self, tree: &mut LayerTree, old: ScreenView, _: ScreenView) {
        self.timing.finish(tree);
        tree.set_translation(old.layer, self.old_home);
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use kurbo::Size;
    use tableau_core::layer::LayerId;

    use super::*;

    fn views(tree: &mut LayerTree) -> (ScreenView, ScreenView) {
        let size = Size::new(100.0, 50.0);
        let mut view = || {
            let layer: LayerId = tree.create_group();
            ScreenView { layer, size }
        };
        (view(), view())
    }

    #[test]
    fn slides_left_by_default() {
        let mut tree = LayerTree::new();
        let (old, new) = views(&mut tree);
        let mut slide = Slide::new().easing(Interpolator::Linear);
        slide.init(&mut tree, old, new);
        assert_eq!(tree.translation(new.layer), Vec2::new(100.0, 0.0));

        assert!(!slide.update(&mut tree, old, new, 250.0));
        assert!((tree.translation(old.layer).x + 50.0).abs() < 1e-9);
        assert!((tree.translation(new.layer).x - 50.0).abs() < 1e-9);

        assert!(slide.update(&mut tree, old, new, 500.0));
        assert_eq!(tree.translation(old.layer), Vec2::new(-100.0, 0.0));
        assert_eq!(tree.translation(new.layer), Vec2::ZERO);

        slide.complete(&mut tree, old, new);
        assert_eq!(tree.translation(old.layer), Vec2::ZERO);
    }

    #[test]
    fn slide_down_from_origin() {
        let mut tree = LayerTree::new();
        let (old, new) = views(&mut tree);
        let origin = Point::new(10.0, 20.0);
        tree.set_translation(old.layer, origin.to_vec2());
        let mut slide = Slide::new().origin(origin).down().duration(100.0);
        slide.init(&mut tree, old, new);
        assert_eq!(tree.translation(new.layer), Vec2::new(10.0, -30.0));
        assert!(slide.update(&mut tree, old, new, 100.0));
        assert_eq!(tree.translation(old.layer), Vec2::new(10.0, 70.0));
        assert_eq!(tree.translation(new.layer), origin.to_vec2());
    }

    #[test]
    fn callbacks_run_at_start_and_completion() {
        let mut tree = LayerTree::new();
        let (old, new) = views(&mut tree);
        let calls = Rc::new(Cell::new(0));
        let (s, c) = (calls.clone(), calls.clone());
        let mut slide = Slide::new()
            .on_start(move |_| s.set(s.get() + 1))
            .on_complete(move |_| c.set(c.get() + 10));
        slide.init(&mut tree, old, new);
        assert_eq!(calls.get(), 1);
        slide.complete(&mut tree, old, new);
        assert_eq!(calls.get(), 11);
    }
}
