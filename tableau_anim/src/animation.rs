// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation primitives and the layer properties they drive.

use alloc::boxed::Box;
use core::fmt;

use kurbo::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tableau_core::Error;
use tableau_core::layer::{LayerId, LayerTree};

use crate::interp::Interpolator;

/// Default tween length in milliseconds.
pub const DEFAULT_DURATION: f64 = 1000.0;

/// One time-consuming step of an animation chain.
///
/// The animator calls [`init`](Self::init) when the step becomes current and
/// then [`apply`](Self::apply) once per tick until the step reports
/// completion. Times are absolute clock ticks in milliseconds.
pub trait Animation {
    /// Starts the step at `time`.
    fn init(&mut self, tree: &mut LayerTree, time: f64);

    /// Advances the step to `time` and returns the time it still needs.
    ///
    /// A result `<= 0` means the step is complete; its magnitude is the time
    /// overshot, which the chain carries into the next step.
    ///
    /// # Errors
    ///
    /// Errors from user callbacks propagate to the animator's caller and
    /// retire the chain.
    fn apply(&mut self, tree: &mut LayerTree, time: f64) -> Result<f64, Error>;

    /// Moves the step to its final state.
    ///
    /// Called when a chain is completed early. Must be idempotent: it may run
    /// after the step already finished naturally.
    ///
    /// # Errors
    ///
    /// Propagates user callback errors.
    fn make_complete(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        _ = tree;
        Ok(())
    }

    /// Returns whether animations chained after this one loop back to it.
    fn is_repeat(&self) -> bool {
        false
    }

    /// Returns whether the chain continues past this step once it completes.
    fn has_next(&self, tree: &LayerTree) -> bool {
        _ = tree;
        true
    }
}

/// A scalar property driven by a [`Tween`].
///
/// Writes to a layer that has been disposed are dropped; tweens are not
/// canceled when their layer goes away.
pub enum Target {
    /// Horizontal translation.
    X(LayerId),
    /// Vertical translation.
    Y(LayerId),
    /// Rotation in radians.
    Rotation(LayerId),
    /// Uniform scale. Reads the x scale.
    Scale(LayerId),
    /// Horizontal scale.
    ScaleX(LayerId),
    /// Vertical scale.
    ScaleY(LayerId),
    /// Layer alpha.
    Alpha(LayerId),
    /// Paint depth among siblings.
    Depth(LayerId),
    /// Any other value.
    Custom {
        /// Reads the current value.
        get: Box<dyn Fn(&LayerTree) -> f64>,
        /// Writes a new value.
        set: Box<dyn FnMut(&mut LayerTree, f64)>,
    },
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X(id) => f.debug_tuple("X").field(id).finish(),
            Self::Y(id) => f.debug_tuple("Y").field(id).finish(),
            Self::Rotation(id) => f.debug_tuple("Rotation").field(id).finish(),
            Self::Scale(id) => f.debug_tuple("Scale").field(id).finish(),
            Self::ScaleX(id) => f.debug_tuple("ScaleX").field(id).finish(),
            Self::ScaleY(id) => f.debug_tuple("ScaleY").field(id).finish(),
            Self::Alpha(id) => f.debug_tuple("Alpha").field(id).finish(),
            Self::Depth(id) => f.debug_tuple("Depth").field(id).finish(),
            Self::Custom { .. } => f.write_str("Custom"),
        }
    }
}

impl Target {
    /// Creates a custom target from a getter and a setter.
    pub fn custom(
        get: impl Fn(&LayerTree) -> f64 + 'static,
        set: impl FnMut(&mut LayerTree, f64) + 'static,
    ) -> Self {
        Self::Custom {
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    fn layer(&self) -> Option<LayerId> {
        match *self {
            Self::X(id)
            | Self::Y(id)
            | Self::Rotation(id)
            | Self::Scale(id)
            | Self::ScaleX(id)
            | Self::ScaleY(id)
            | Self::Alpha(id)
            | Self::Depth(id) => Some(id),
            Self::Custom { .. } => None,
        }
    }

    /// Reads the current value, or `0` for a disposed layer.
    pub fn get(&self, tree: &LayerTree) -> f64 {
        if self.layer().is_some_and(|id| !tree.is_alive(id)) {
            return 0.0;
        }
        match self {
            Self::X(id) => tree.translation(*id).x,
            Self::Y(id) => tree.translation(*id).y,
            Self::Rotation(id) => tree.rotation(*id),
            Self::Scale(id) | Self::ScaleX(id) => tree.scale(*id).x,
            Self::ScaleY(id) => tree.scale(*id).y,
            Self::Alpha(id) => f64::from(tree.alpha(*id)),
            Self::Depth(id) => f64::from(tree.depth(*id)),
            Self::Custom { get, .. } => get(tree),
        }
    }

    /// Writes `value`. Writes to a disposed layer are dropped.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "alpha and depth are stored as f32"
    )]
    pub fn set(&mut self, tree: &mut LayerTree, value: f64) {
        if let Some(id) = self.layer()
            && !tree.is_alive(id)
        {
            log::debug!("tween write to disposed layer {id:?} dropped");
            return;
        }
        match self {
            Self::X(id) => {
                let t = tree.translation(*id);
                tree.set_translation(*id, Vec2::new(value, t.y));
            }
            Self::Y(id) => {
                let t = tree.translation(*id);
                tree.set_translation(*id, Vec2::new(t.x, value));
            }
            Self::Rotation(id) => tree.set_rotation(*id, value),
            Self::Scale(id) => tree.set_scale(*id, Vec2::new(value, value)),
            Self::ScaleX(id) => {
                let s = tree.scale(*id);
                tree.set_scale(*id, Vec2::new(value, s.y));
            }
            Self::ScaleY(id) => {
                let s = tree.scale(*id);
                tree.set_scale(*id, Vec2::new(s.x, value));
            }
            Self::Alpha(id) => tree.set_alpha(*id, value as f32),
            Self::Depth(id) => tree.set_depth(*id, value as f32),
            Self::Custom { set, .. } => set(tree, value),
        }
    }
}

/// A two-axis property driven by a [`TweenXy`].
pub enum TargetXy {
    /// Translation.
    Translation(LayerId),
    /// Scale on both axes.
    Scale(LayerId),
    /// Any other pair of values.
    Custom {
        /// Reads the current values.
        get: Box<dyn Fn(&LayerTree) -> Vec2>,
        /// Writes new values.
        set: Box<dyn FnMut(&mut LayerTree, Vec2)>,
    },
}

impl fmt::Debug for TargetXy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation(id) => f.debug_tuple("Translation").field(id).finish(),
            Self::Scale(id) => f.debug_tuple("Scale").field(id).finish(),
            Self::Custom { .. } => f.write_str("Custom"),
        }
    }
}

impl TargetXy {
    /// Reads the current values, or zero for a disposed layer.
    pub fn get(&self, tree: &LayerTree) -> Vec2 {
        match self {
            Self::Translation(id) if tree.is_alive(*id) => tree.translation(*id),
            Self::Scale(id) if tree.is_alive(*id) => tree.scale(*id),
            Self::Translation(_) | Self::Scale(_) => Vec2::ZERO,
            Self::Custom { get, .. } => get(tree),
        }
    }

    /// Writes `value`. Writes to a disposed layer are dropped.
    pub fn set(&mut self, tree: &mut LayerTree, value: Vec2) {
        match self {
            Self::Translation(id) | Self::Scale(id) if !tree.is_alive(*id) => {
                log::debug!("tween write to disposed layer {id:?} dropped");
            }
            Self::Translation(id) => tree.set_translation(*id, value),
            Self::Scale(id) => tree.set_scale(*id, value),
            Self::Custom { set, .. } => set(tree, value),
        }
    }
}

/// Access to the easing and length shared by interpolating animations.
pub trait Interped {
    /// Sets the easing curve.
    fn set_easing(&mut self, interp: Interpolator);
    /// Sets the length in milliseconds.
    fn set_duration(&mut self, duration: f64);
}

/// Interpolates one scalar [`Target`].
#[derive(Debug)]
pub struct Tween {
    target: Target,
    from: Option<f64>,
    to: f64,
    duration: f64,
    interp: Interpolator,
    start: f64,
    origin: f64,
}

impl Tween {
    /// Creates a linear tween of `target` to `0` over
    /// [`DEFAULT_DURATION`], starting from the value at init.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            from: None,
            to: 0.0,
            duration: DEFAULT_DURATION,
            interp: Interpolator::Linear,
            start: 0.0,
            origin: 0.0,
        }
    }

    /// Sets the starting value.
    pub fn set_from(&mut self, from: f64) {
        self.from = Some(from);
    }

    /// Sets the final value.
    pub fn set_to(&mut self, to: f64) {
        self.to = to;
    }
}

impl Interped for Tween {
    fn set_easing(&mut self, interp: Interpolator) {
        self.interp = interp;
    }

    fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }
}

impl Animation for Tween {
    fn init(&mut self, tree: &mut LayerTree, time: f64) {
        self.start = time;
        self.origin = match self.from {
            Some(from) => from,
            None => self.target.get(tree),
        };
    }

    fn apply(&mut self, tree: &mut LayerTree, time: f64) -> Result<f64, Error> {
        let dt = time - self.start;
        let value = if dt < self.duration {
            self.interp
                .apply_clamp(self.origin, self.to - self.origin, dt, self.duration)
        } else {
            self.to
        };
        self.target.set(tree, value);
        Ok(self.duration - dt)
    }

    fn make_complete(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        self.target.set(tree, self.to);
        Ok(())
    }
}

/// Interpolates a [`TargetXy`] on both axes with one curve.
#[derive(Debug)]
pub struct TweenXy {
    target: TargetXy,
    from: Option<Vec2>,
    to: Vec2,
    duration: f64,
    interp: Interpolator,
    start: f64,
    origin: Vec2,
}

impl TweenXy {
    /// Creates a linear tween of `target` to `(0, 0)` over
    /// [`DEFAULT_DURATION`], starting from the values at init.
    #[must_use]
    pub fn new(target: TargetXy) -> Self {
        Self {
            target,
            from: None,
            to: Vec2::ZERO,
            duration: DEFAULT_DURATION,
            interp: Interpolator::Linear,
            start: 0.0,
            origin: Vec2::ZERO,
        }
    }

    /// Sets the starting values.
    pub fn set_from(&mut self, from: Vec2) {
        self.from = Some(from);
    }

    /// Sets the final values.
    pub fn set_to(&mut self, to: Vec2) {
        self.to = to;
    }
}

impl Interped for TweenXy {
    fn set_easing(&mut self, interp: Interpolator) {
        self.interp = interp;
    }

    fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }
}

impl Animation for TweenXy {
    fn init(&mut self, tree: &mut LayerTree, time: f64) {
        self.start = time;
        self.origin = self.from.unwrap_or_else(|| self.target.get(tree));
    }

    fn apply(&mut self, tree: &mut LayerTree, time: f64) -> Result<f64, Error> {
        let dt = time - self.start;
        let value = if dt < self.duration {
            let range = self.to - self.origin;
            Vec2::new(
                self.interp
                    .apply_clamp(self.origin.x, range.x, dt, self.duration),
                self.interp
                    .apply_clamp(self.origin.y, range.y, dt, self.duration),
            )
        } else {
            self.to
        };
        self.target.set(tree, value);
        Ok(self.duration - dt)
    }

    fn make_complete(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        self.target.set(tree, self.to);
        Ok(())
    }
}

/// Seed used by a [`Shake`] unless one is configured.
pub const DEFAULT_SHAKE_SEED: u64 = 0x5EED_5A4E;

/// Jitters a layer's translation around where it started.
///
/// Each axis swings between random points inside its bounds, one swing per
/// cycle, until the duration runs out. The layer then rests at its starting
/// translation. Jitter comes from a seeded generator, so a shake with a given
/// seed always takes the same path.
#[derive(Debug)]
pub struct Shake {
    layer: LayerId,
    under: Vec2,
    over: Vec2,
    cycle: Vec2,
    duration: f64,
    interp: Interpolator,
    start: f64,
    origin: Vec2,
    x: Swing,
    y: Swing,
    rng: SmallRng,
}

/// One axis of a [`Shake`]: the current swing from `min` by `range`,
/// started at `time`.
#[derive(Clone, Copy, Debug, Default)]
struct Swing {
    time: f64,
    min: f64,
    range: f64,
}

impl Swing {
    fn begin(time: f64, origin: f64, under: f64, over: f64, rng: &mut SmallRng) -> Self {
        let range = if over == 0.0 {
            under
        } else if under == 0.0 || rng.r#gen::<bool>() {
            over
        } else {
            under
        };
        Self {
            time,
            min: origin,
            range,
        }
    }

    fn advance(
        &mut self,
        time: f64,
        cycle: f64,
        origin: f64,
        under: f64,
        over: f64,
        interp: Interpolator,
        rng: &mut SmallRng,
    ) -> f64 {
        let dt = time - self.time;
        if dt < cycle {
            return interp.apply_clamp(self.min, self.range, dt, cycle);
        }
        // Land on the end of this swing and head back the other way.
        let value = self.min + self.range;
        let limit = origin + if self.range < 0.0 { over } else { under };
        let span = limit - value;
        self.min = value;
        self.range = span / 2.0 + rng.r#gen::<f64>() * span / 2.0;
        self.time = time;
        value
    }
}

impl Shake {
    /// Creates a shake of `layer` by up to two units either way on each
    /// axis, with 100 ms swings, lasting [`DEFAULT_DURATION`].
    #[must_use]
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            under: Vec2::new(-2.0, -2.0),
            over: Vec2::new(2.0, 2.0),
            cycle: Vec2::new(100.0, 100.0),
            duration: DEFAULT_DURATION,
            interp: Interpolator::Linear,
            start: 0.0,
            origin: Vec2::ZERO,
            x: Swing::default(),
            y: Swing::default(),
            rng: SmallRng::seed_from_u64(DEFAULT_SHAKE_SEED),
        }
    }

    /// Limits the shake to `origin + under ..= origin + over` on each axis.
    ///
    /// `under` should be negative or zero on both axes and `over` positive
    /// or zero.
    pub fn set_bounds(&mut self, under: Vec2, over: Vec2) {
        self.under = under;
        self.over = over;
    }

    /// Sets the length of one swing in milliseconds on each axis.
    pub fn set_cycle_time(&mut self, cycle: Vec2) {
        self.cycle = cycle;
    }

    /// Reseeds the jitter.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    fn write(&self, tree: &mut LayerTree, value: Vec2) {
        if tree.is_alive(self.layer) {
            tree.set_translation(self.layer, value);
        } else {
            log::debug!("shake of disposed layer {:?} dropped", self.layer);
        }
    }
}

impl Interped for Shake {
    fn set_easing(&mut self, interp: Interpolator) {
        self.interp = interp;
    }

    fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }
}

impl Animation for Shake {
    fn init(&mut self, tree: &mut LayerTree, time: f64) {
        self.start = time;
        self.origin = if tree.is_alive(self.layer) {
            tree.translation(self.layer)
        } else {
            Vec2::ZERO
        };
        self.x = Swing::begin(time, self.origin.x, self.under.x, self.over.x, &mut self.rng);
        self.y = Swing::begin(time, self.origin.y, self.under.y, self.over.y, &mut self.rng);
    }

    fn apply(&mut self, tree: &mut LayerTree, time: f64) -> Result<f64, Error> {
        let dt = time - self.start;
        let value = if dt < self.duration {
            Vec2::new(
                self.x.advance(
                    time,
                    self.cycle.x,
                    self.origin.x,
                    self.under.x,
                    self.over.x,
                    self.interp,
                    &mut self.rng,
                ),
                self.y.advance(
                    time,
                    self.cycle.y,
                    self.origin.y,
                    self.under.y,
                    self.over.y,
                    self.interp,
                    &mut self.rng,
                ),
            )
        } else {
            self.origin
        };
        self.write(tree, value);
        Ok(self.duration - dt)
    }

    fn make_complete(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        self.write(tree, self.origin);
        Ok(())
    }
}

/// Waits a fixed number of milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct Delay {
    duration: f64,
    start: f64,
}

impl Delay {
    /// Creates a delay of `duration` milliseconds.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            start: 0.0,
        }
    }
}

impl Animation for Delay {
    fn init(&mut self, _: &mut LayerTree, time: f64) {
        self.start = time;
    }

    fn apply(&mut self, _: &mut LayerTree, time: f64) -> Result<f64, Error> {
        Ok(self.start + self.duration - time)
    }
}

/// The callback type run by an [`Action`].
pub type ActionFn = Box<dyn FnMut(&mut LayerTree) -> Result<(), Error>>;

/// Runs a callback once and completes immediately.
pub struct Action {
    action: ActionFn,
    start: f64,
    done: bool,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Wraps `action`.
    pub fn new(action: impl FnMut(&mut LayerTree) -> Result<(), Error> + 'static) -> Self {
        Self {
            action: Box::new(action),
            start: 0.0,
            done: false,
        }
    }
}

impl Animation for Action {
    fn init(&mut self, _: &mut LayerTree, time: f64) {
        self.start = time;
        self.done = false;
    }

    fn apply(&mut self, tree: &mut LayerTree, time: f64) -> Result<f64, Error> {
        self.make_complete(tree)?;
        Ok(self.start - time)
    }

    fn make_complete(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        if !self.done {
            self.done = true;
            (self.action)(tree)?;
        }
        Ok(())
    }
}

/// Loops the animations chained after it.
///
/// A repeat never completes on its own. With a guard layer, the loop ends
/// the first time it comes around after the guard was detached from its
/// parent or disposed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Repeat {
    guard: Option<LayerId>,
    start: f64,
}

impl Repeat {
    /// Creates a loop that runs until canceled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loop that ends once `guard` has no parent.
    #[must_use]
    pub fn guarded(guard: LayerId) -> Self {
        Self {
            guard: Some(guard),
            start: 0.0,
        }
    }
}

impl Animation for Repeat {
    fn init(&mut self, _: &mut LayerTree, time: f64) {
        self.start = time;
    }

    fn apply(&mut self, _: &mut LayerTree, time: f64) -> Result<f64, Error> {
        Ok(self.start - time)
    }

    fn is_repeat(&self) -> bool {
        true
    }

    fn has_next(&self, tree: &LayerTree) -> bool {
        self.guard
            .is_none_or(|id| tree.is_alive(id) && tree.parent(id).is_some())
    }
}
