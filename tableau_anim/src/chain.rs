// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation chains.
//!
//! Every animation added to a builder becomes a node. [`Anim::then`] links a
//! follow-up node after it. A node may be extended once.
//!
//! Nodes after a [`Repeat`](crate::Repeat) link back to it instead of to the
//! end of the chain. Back links are weak, so a chain never keeps itself
//! alive: the [`Animator`](crate::Animator) or an enclosing
//! [`AnimGroup`](crate::AnimGroup) owns each chain root.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use tableau_core::Error;
use tableau_core::layer::LayerTree;

use crate::animation::{Animation, Interped, Shake, Tween, TweenXy};
use crate::builder::AnimBuilder;
use crate::interp::Interpolator;

/// Errors raised while building chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// `then()` was used twice on the same animation.
    #[error("animation already has a follow-up; then() may only be extended once")]
    AlreadyExtended,
}

pub(crate) enum Link {
    End,
    Next(Rc<Node>),
    Loop(Weak<Node>),
}

pub(crate) struct ChainState {
    root: Weak<Node>,
    canceled: Cell<bool>,
}

pub(crate) struct Node {
    anim: Rc<RefCell<dyn Animation>>,
    next: RefCell<Link>,
    extended: Cell<bool>,
    repeat: bool,
    state: Rc<ChainState>,
}

impl Node {
    /// Creates the first node of a new chain.
    pub(crate) fn root(anim: Rc<RefCell<dyn Animation>>) -> Rc<Self> {
        let repeat = anim.borrow().is_repeat();
        Rc::new_cyclic(|weak| Self {
            anim,
            next: RefCell::new(Link::End),
            extended: Cell::new(false),
            repeat,
            state: Rc::new(ChainState {
                root: weak.clone(),
                canceled: Cell::new(false),
            }),
        })
    }

    fn is_canceled(&self) -> bool {
        self.state.canceled.get()
    }

    /// Returns the node that runs once this one completes.
    fn successor(&self, tree: &LayerTree) -> Option<Rc<Self>> {
        if !self.anim.borrow().has_next(tree) {
            return None;
        }
        match &*self.next.borrow() {
            Link::End => None,
            Link::Next(node) => Some(node.clone()),
            Link::Loop(node) => node.upgrade(),
        }
    }
}

/// Drives one chain from its root to its end.
pub(crate) struct Runner {
    root: Rc<Node>,
    current: Option<Rc<Node>>,
}

impl Runner {
    /// Starts `root` at `time`.
    pub(crate) fn start(root: Rc<Node>, tree: &mut LayerTree, time: f64) -> Self {
        root.anim.borrow_mut().init(tree, time);
        Self {
            current: Some(root.clone()),
            root,
        }
    }

    /// Advances the chain to `time`, moving through as many nodes as the
    /// elapsed time covers. Returns the time the current node still needs;
    /// `<= 0` once the chain is done.
    pub(crate) fn apply(&mut self, tree: &mut LayerTree, time: f64) -> Result<f64, Error> {
        if self.root.is_canceled() {
            self.current = None;
            return Ok(0.0);
        }
        let Some(mut node) = self.current.take() else {
            return Ok(0.0);
        };
        let mut remain = node.anim.borrow_mut().apply(tree, time)?;
        // The repeat node last passed and the overshoot at that point. Coming
        // back to it without consuming time means the loop body is empty.
        let mut lap = node.repeat.then(|| (Rc::as_ptr(&node), remain));
        while remain <= 0.0 {
            if self.root.is_canceled() {
                return Ok(0.0);
            }
            let Some(next) = node.successor(tree) else {
                return Ok(remain);
            };
            if next.repeat {
                match lap {
                    Some((ptr, at)) if ptr == Rc::as_ptr(&next) && remain - at < 1e-9 => {
                        next.anim.borrow_mut().init(tree, time);
                        self.current = Some(next);
                        return Ok(f64::MIN_POSITIVE);
                    }
                    _ => lap = Some((Rc::as_ptr(&next), remain)),
                }
            }
            next.anim.borrow_mut().init(tree, time + remain);
            remain = next.anim.borrow_mut().apply(tree, time)?;
            node = next;
        }
        self.current = Some(node);
        Ok(remain)
    }
}

/// Completes every animation in the chain rooted at `root`, in chain order.
fn complete_chain(root: &Rc<Node>, tree: &mut LayerTree) -> Result<(), Error> {
    let mut seen: Vec<*const Node> = Vec::new();
    let mut node = root.clone();
    let mut result = Ok(());
    loop {
        seen.push(Rc::as_ptr(&node));
        // A node that is running right now is completing itself.
        if let Ok(mut anim) = node.anim.try_borrow_mut() {
            let r = anim.make_complete(tree);
            if result.is_ok() {
                result = r;
            }
        }
        let next = match &*node.next.borrow() {
            Link::Next(next) => next.clone(),
            Link::End | Link::Loop(_) => break,
        };
        if seen.contains(&Rc::as_ptr(&next)) {
            break;
        }
        node = next;
    }
    result
}

/// Completes the chain `root` belongs to, unless it was already canceled.
pub(crate) fn complete_root(root: &Rc<Node>, tree: &mut LayerTree) -> Result<(), Error> {
    AnimHandle {
        state: root.state.clone(),
    }
    .complete(tree)
}

/// Controls a chain after it was built.
#[derive(Clone)]
pub struct AnimHandle {
    state: Rc<ChainState>,
}

impl fmt::Debug for AnimHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimHandle")
            .field("canceled", &self.state.canceled.get())
            .finish_non_exhaustive()
    }
}

impl AnimHandle {
    /// Stops the chain where it is. No further animation in it is applied.
    pub fn cancel(&self) {
        self.state.canceled.set(true);
    }

    /// Returns whether the chain was canceled or completed.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.state.canceled.get()
    }

    /// Jumps every animation of the chain to its final state and stops it.
    ///
    /// Tweens land on their end values and pending actions run. Completing a
    /// canceled chain does nothing.
    ///
    /// # Errors
    ///
    /// The first error returned by an action. The remaining animations are
    /// still completed.
    pub fn complete(&self, tree: &mut LayerTree) -> Result<(), Error> {
        if self.state.canceled.replace(true) {
            return Ok(());
        }
        match self.state.root.upgrade() {
            Some(root) => complete_chain(&root, tree),
            None => Ok(()),
        }
    }
}

/// A built animation, used to configure it and to chain follow-ups.
pub struct Anim<A> {
    node: Rc<Node>,
    anim: Rc<RefCell<A>>,
}

impl<A> fmt::Debug for Anim<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anim")
            .field("extended", &self.node.extended.get())
            .finish_non_exhaustive()
    }
}

impl<A: Animation + 'static> Anim<A> {
    /// Wraps `anim` in a node created by `link`.
    pub(crate) fn build(anim: A, link: impl FnOnce(Rc<RefCell<dyn Animation>>) -> Rc<Node>) -> Self {
        let anim = Rc::new(RefCell::new(anim));
        let shared: Rc<RefCell<dyn Animation>> = anim.clone();
        let node = link(shared);
        Self { node, anim }
    }

    /// Returns a builder whose animations run after this one completes.
    #[must_use]
    pub fn then(&self) -> Then {
        Then {
            node: self.node.clone(),
        }
    }

    /// Returns a handle to the chain this animation belongs to.
    #[must_use]
    pub fn handle(&self) -> AnimHandle {
        AnimHandle {
            state: self.node.state.clone(),
        }
    }

    /// Adjusts the animation in place.
    ///
    /// # Panics
    ///
    /// If called from inside the animation's own callback while it runs.
    pub fn configure(self, f: impl FnOnce(&mut A)) -> Self {
        f(&mut self.anim.borrow_mut());
        self
    }
}

impl<A: Interped + Animation + 'static> Anim<A> {
    /// Sets the length in milliseconds.
    pub fn duration(self, duration: f64) -> Self {
        self.configure(|a| a.set_duration(duration))
    }

    /// Sets the easing curve.
    pub fn easing(self, interp: Interpolator) -> Self {
        self.configure(|a| a.set_easing(interp))
    }

    /// Uses [`Interpolator::Linear`].
    pub fn linear(self) -> Self {
        self.easing(Interpolator::Linear)
    }

    /// Uses [`Interpolator::EaseIn`].
    pub fn ease_in(self) -> Self {
        self.easing(Interpolator::EaseIn)
    }

    /// Uses [`Interpolator::EaseOut`].
    pub fn ease_out(self) -> Self {
        self.easing(Interpolator::EaseOut)
    }

    /// Uses [`Interpolator::EaseInOut`].
    pub fn ease_in_out(self) -> Self {
        self.easing(Interpolator::EaseInOut)
    }

    /// Uses [`Interpolator::EaseInBack`].
    pub fn ease_in_back(self) -> Self {
        self.easing(Interpolator::EaseInBack)
    }

    /// Uses [`Interpolator::EaseOutBack`].
    pub fn ease_out_back(self) -> Self {
        self.easing(Interpolator::EaseOutBack)
    }

    /// Uses [`Interpolator::BounceOut`].
    pub fn bounce_out(self) -> Self {
        self.easing(Interpolator::BounceOut)
    }

    /// Uses [`Interpolator::EaseOutElastic`].
    pub fn ease_out_elastic(self) -> Self {
        self.easing(Interpolator::EaseOutElastic)
    }
}

impl Anim<Tween> {
    /// Sets the starting value. Defaults to the value when the tween starts.
    pub fn from(self, from: f64) -> Self {
        self.configure(|t| t.set_from(from))
    }

    /// Sets the final value.
    pub fn to(self, to: f64) -> Self {
        self.configure(|t| t.set_to(to))
    }
}

impl Anim<TweenXy> {
    /// Sets the starting values. Defaults to the values when the tween starts.
    pub fn from(self, x: f64, y: f64) -> Self {
        self.configure(|t| t.set_from(kurbo::Vec2::new(x, y)))
    }

    /// Sets the final values.
    pub fn to(self, x: f64, y: f64) -> Self {
        self.configure(|t| t.set_to(kurbo::Vec2::new(x, y)))
    }
}

impl Anim<Shake> {
    /// Limits the shake to `x + under_x ..= x + over_x` and likewise for y,
    /// around the translation when the shake starts.
    pub fn bounds(self, under_x: f64, over_x: f64, under_y: f64, over_y: f64) -> Self {
        self.configure(|s| {
            s.set_bounds(
                kurbo::Vec2::new(under_x, under_y),
                kurbo::Vec2::new(over_x, over_y),
            );
        })
    }

    /// Sets the swing length in milliseconds on both axes.
    pub fn cycle_time(self, millis: f64) -> Self {
        self.cycle_time_xy(millis, millis)
    }

    /// Sets the swing length in milliseconds per axis.
    pub fn cycle_time_xy(self, x: f64, y: f64) -> Self {
        self.configure(|s| s.set_cycle_time(kurbo::Vec2::new(x, y)))
    }

    /// Reseeds the jitter.
    pub fn seed(self, seed: u64) -> Self {
        self.configure(|s| s.set_seed(seed))
    }
}

/// Builds the follow-up of an animation. See [`Anim::then`].
pub struct Then {
    node: Rc<Node>,
}

impl fmt::Debug for Then {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Then").finish_non_exhaustive()
    }
}

impl AnimBuilder for Then {
    type Added<A: Animation + 'static> = Result<Anim<A>, ChainError>;

    fn add<A: Animation + 'static>(&self, anim: A) -> Self::Added<A> {
        if self.node.extended.replace(true) {
            return Err(ChainError::AlreadyExtended);
        }
        let prev = &self.node;
        Ok(Anim::build(anim, |anim| {
            let repeat = anim.borrow().is_repeat();
            let next = if prev.repeat {
                Link::Loop(Rc::downgrade(prev))
            } else {
                core::mem::replace(&mut *prev.next.borrow_mut(), Link::End)
            };
            let node = Rc::new(Node {
                anim,
                next: RefCell::new(next),
                extended: Cell::new(false),
                repeat,
                state: prev.state.clone(),
            });
            *prev.next.borrow_mut() = Link::Next(node.clone());
            node
        }))
    }
}
