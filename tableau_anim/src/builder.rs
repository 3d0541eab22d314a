// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fluent construction shared by the animator, groups, and chains.

use kurbo::Vec2;
use tableau_core::Error;
use tableau_core::layer::{LayerId, LayerTree};
use tableau_core::signal::{Signal, Value};

use crate::animation::{
    Action, Animation, Delay, Repeat, Shake, Target, TargetXy, Tween, TweenXy,
};

/// Creates animations and hands them to an owner.
///
/// [`Animator`](crate::Animator) starts what it is given on its next tick,
/// [`AnimGroup`](crate::AnimGroup) collects parallel chains, and
/// [`Then`](crate::Then) appends to an existing chain. Chains built through
/// `Then` can fail, so its [`Added`](Self::Added) type is a `Result`.
pub trait AnimBuilder {
    /// What adding an animation returns.
    type Added<A: Animation + 'static>;

    /// Adds `anim`.
    fn add<A: Animation + 'static>(&self, anim: A) -> Self::Added<A>;

    /// Tweens a scalar target.
    fn tween(&self, target: Target) -> Self::Added<Tween> {
        self.add(Tween::new(target))
    }

    /// Tweens the x translation of `layer`.
    fn tween_x(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::X(layer))
    }

    /// Tweens the y translation of `layer`.
    fn tween_y(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::Y(layer))
    }

    /// Tweens the rotation of `layer`, in radians.
    fn tween_rotation(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::Rotation(layer))
    }

    /// Tweens the uniform scale of `layer`.
    fn tween_scale(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::Scale(layer))
    }

    /// Tweens the x scale of `layer`.
    fn tween_scale_x(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::ScaleX(layer))
    }

    /// Tweens the y scale of `layer`.
    fn tween_scale_y(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::ScaleY(layer))
    }

    /// Tweens the alpha of `layer`.
    fn tween_alpha(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::Alpha(layer))
    }

    /// Tweens the depth of `layer`.
    fn tween_depth(&self, layer: LayerId) -> Self::Added<Tween> {
        self.tween(Target::Depth(layer))
    }

    /// Tweens a two-axis target.
    fn tween_xy(&self, target: TargetXy) -> Self::Added<TweenXy> {
        self.add(TweenXy::new(target))
    }

    /// Tweens the translation of `layer`.
    fn tween_translation(&self, layer: LayerId) -> Self::Added<TweenXy> {
        self.tween_xy(TargetXy::Translation(layer))
    }

    /// Tweens both scale axes of `layer`.
    fn tween_scale_xy(&self, layer: LayerId) -> Self::Added<TweenXy> {
        self.tween_xy(TargetXy::Scale(layer))
    }

    /// Shakes `layer` around its current translation.
    fn shake(&self, layer: LayerId) -> Self::Added<Shake> {
        self.add(Shake::new(layer))
    }

    /// Waits `duration` milliseconds.
    fn delay(&self, duration: f64) -> Self::Added<Delay> {
        self.add(Delay::new(duration))
    }

    /// Runs `action` once.
    fn action(
        &self,
        action: impl FnMut(&mut LayerTree) -> Result<(), Error> + 'static,
    ) -> Self::Added<Action> {
        self.add(Action::new(action))
    }

    /// Loops the animations chained after this point.
    ///
    /// With `guard`, the loop ends once the guard layer has no parent.
    fn repeat(&self, guard: Option<LayerId>) -> Self::Added<Repeat> {
        self.add(guard.map_or_else(Repeat::new, Repeat::guarded))
    }

    /// Adds `child` under `parent`.
    fn add_child(&self, parent: LayerId, child: LayerId) -> Self::Added<Action> {
        self.action(move |tree| {
            if tree.is_alive(parent) && tree.is_alive(child) {
                tree.add_child(parent, child)
            } else {
                log::debug!("add_child on disposed layer skipped");
                Ok(())
            }
        })
    }

    /// Moves `child` to `pos` and adds it under `parent`.
    fn add_child_at(&self, parent: LayerId, child: LayerId, pos: Vec2) -> Self::Added<Action> {
        self.action(move |tree| {
            if tree.is_alive(parent) && tree.is_alive(child) {
                tree.add_child_at(parent, child, pos.x, pos.y)
            } else {
                log::debug!("add_child_at on disposed layer skipped");
                Ok(())
            }
        })
    }

    /// Moves `layer` under `parent` without moving it on screen.
    ///
    /// The layer's translation is rewritten so its origin lands on the same
    /// screen point under the new parent. A layer with no parent keeps its
    /// translation as the screen point.
    fn reparent(&self, layer: LayerId, parent: LayerId) -> Self::Added<Action> {
        self.action(move |tree| {
            if !tree.is_alive(parent) || !tree.is_alive(layer) {
                log::debug!("reparent on disposed layer skipped");
                return Ok(());
            }
            let pos = tree.translation(layer).to_point();
            let screen = match tree.parent(layer) {
                Some(old) => tree.layer_to_screen(old, pos),
                None => pos,
            };
            tree.add_child(parent, layer)?;
            // A lifecycle hook may have moved or disposed it.
            if !tree.is_alive(layer) {
                return Ok(());
            }
            let local = match tree.parent(layer) {
                Some(now) => tree.screen_to_layer(now, screen)?,
                None => screen,
            };
            tree.set_translation(layer, local.to_vec2());
            Ok(())
        })
    }

    /// Disposes `layer` and its subtree.
    fn dispose(&self, layer: LayerId) -> Self::Added<Action> {
        self.action(move |tree| tree.dispose(layer))
    }

    /// Sets the depth of `layer`.
    fn set_depth(&self, layer: LayerId, depth: f32) -> Self::Added<Action> {
        self.action(move |tree| {
            if tree.is_alive(layer) {
                tree.set_depth(layer, depth);
            }
            Ok(())
        })
    }

    /// Shows or hides `layer`.
    fn set_visible(&self, layer: LayerId, visible: bool) -> Self::Added<Action> {
        self.action(move |tree| {
            if tree.is_alive(layer) {
                tree.set_visible(layer, visible);
            }
            Ok(())
        })
    }

    /// Emits `value` on `signal`.
    fn emit<T: 'static>(&self, signal: Signal<T>, value: T) -> Self::Added<Action> {
        self.action(move |_| {
            signal.emit(&value);
            Ok(())
        })
    }

    /// Stores `value` into `cell`.
    fn set_value<T: Clone + PartialEq + 'static>(
        &self,
        cell: Value<T>,
        value: T,
    ) -> Self::Added<Action> {
        let mut value = Some(value);
        self.action(move |_| {
            if let Some(value) = value.take() {
                cell.update(value);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use tableau_core::frame::Clock;

    use super::*;
    use crate::Animator;

    fn at(tick: f64) -> Clock {
        Clock::new(tick, 16.0)
    }

    #[test]
    fn reparent_keeps_screen_position() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let from = tree.create_group();
        let to = tree.create_group();
        let card = tree.create_layer();
        tree.add_child(root, from).unwrap();
        tree.add_child(root, to).unwrap();
        tree.set_translation(from, Vec2::new(100.0, 50.0));
        tree.set_translation(to, Vec2::new(-20.0, 10.0));
        tree.set_scale(to, Vec2::new(2.0, 2.0));
        tree.add_child_at(from, card, 5.0, 5.0).unwrap();
        let before = tree.layer_to_screen(card, Point::ZERO);

        let anim = Animator::new();
        anim.reparent(card, to);
        anim.tick(&mut tree, &at(0.0)).unwrap();

        assert_eq!(tree.parent(card), Some(to));
        let after = tree.layer_to_screen(card, Point::ZERO);
        assert!((after - before).hypot() < 1e-9, "{before:?} vs {after:?}");
        assert_eq!(tree.translation(card), Vec2::new(62.5, 22.5));
    }

    #[test]
    fn reparent_of_disposed_layer_is_skipped() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let card = tree.create_layer();
        tree.add_child(root, card).unwrap();
        let anim = Animator::new();
        anim.reparent(card, root);
        tree.dispose(card).unwrap();
        anim.tick(&mut tree, &at(0.0)).unwrap();
        assert!(!anim.has_active());
    }

    #[test]
    fn shake_runs_for_its_duration() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let id = tree.create_layer();
        tree.add_child_at(root, id, 10.0, 10.0).unwrap();

        let anim = Animator::new();
        anim.shake(id)
            .bounds(-1.0, 1.0, -1.0, 1.0)
            .cycle_time(20.0)
            .duration(100.0)
            .seed(3);
        anim.tick(&mut tree, &at(0.0)).unwrap();
        anim.tick(&mut tree, &at(30.0)).unwrap();
        let t = tree.translation(id);
        assert!((9.0..=11.0).contains(&t.x) && (9.0..=11.0).contains(&t.y));
        assert!(anim.has_active());
        anim.tick(&mut tree, &at(120.0)).unwrap();
        assert_eq!(tree.translation(id), Vec2::new(10.0, 10.0));
        assert!(!anim.has_active());
    }
}
