// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame driver for animation chains.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use tableau_core::Error;
use tableau_core::frame::{Clock, Ticker};
use tableau_core::layer::LayerTree;

use crate::animation::Animation;
use crate::builder::AnimBuilder;
use crate::chain::{Anim, Node, Runner};

/// Holds chains added after a barrier until everything before it is done.
struct Barrier {
    delay: f64,
    /// Set the first time the barrier reaches the front with nothing running.
    expires: Option<f64>,
    held: Vec<Rc<Node>>,
}

#[derive(Default)]
struct State {
    active: Vec<Runner>,
    pending: Vec<Rc<Node>>,
    barriers: VecDeque<Barrier>,
    /// Bumped by [`Animator::clear`] so an in-flight tick drops its chains.
    epoch: u64,
}

impl State {
    fn accum(&mut self) -> &mut Vec<Rc<Node>> {
        match self.barriers.back_mut() {
            Some(barrier) => &mut barrier.held,
            None => &mut self.pending,
        }
    }
}

/// Starts, advances, and retires animation chains.
///
/// `Animator` is a cheap handle: clones share the same chains, so actions
/// running inside a tick can hold one and add more animations. Those start
/// on the following tick.
///
/// Drive it by registering it as a [`Ticker`] on the frame loop, or by
/// calling [`tick`](Self::tick) directly.
#[derive(Clone, Default)]
pub struct Animator {
    state: Rc<RefCell<State>>,
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Animator")
            .field("active", &state.active.len())
            .field("pending", &state.pending.len())
            .field("barriers", &state.barriers.len())
            .finish_non_exhaustive()
    }
}

impl Animator {
    /// Creates an animator with nothing to run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds back every animation added after this call until all
    /// animations added before it have completed.
    pub fn add_barrier(&self) {
        self.add_barrier_with_delay(0.0);
    }

    /// Like [`add_barrier`](Self::add_barrier), and additionally waits
    /// `delay` milliseconds once the earlier animations have completed.
    ///
    /// The delay starts when this barrier is the oldest one left.
    pub fn add_barrier_with_delay(&self, delay: f64) {
        self.state.borrow_mut().barriers.push_back(Barrier {
            delay,
            expires: None,
            held: Vec::new(),
        });
    }

    /// Drops every chain and barrier.
    ///
    /// Dropped animations stop where they are: pending actions do not run
    /// and tweens are not moved to their end values.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.active.clear();
        state.pending.clear();
        state.barriers.clear();
        state.epoch = state.epoch.wrapping_add(1);
    }

    /// Returns whether any chain is running or waiting to run.
    #[must_use]
    pub fn has_active(&self) -> bool {
        let state = self.state.borrow();
        !state.active.is_empty()
            || !state.pending.is_empty()
            || state.barriers.iter().any(|b| !b.held.is_empty())
    }

    /// Advances every chain to `clock.tick`.
    ///
    /// Chains added since the last tick start now. Once nothing is running,
    /// the oldest barrier releases the chains it held; they start on the next
    /// tick.
    ///
    /// # Errors
    ///
    /// The first error returned by an action. The failing chain is dropped;
    /// all other chains still advance.
    pub fn tick(&self, tree: &mut LayerTree, clock: &Clock) -> Result<(), Error> {
        let time = clock.tick;
        let (pending, mut active, epoch) = {
            let mut state = self.state.borrow_mut();
            (
                core::mem::take(&mut state.pending),
                core::mem::take(&mut state.active),
                state.epoch,
            )
        };
        for root in pending {
            active.push(Runner::start(root, tree, time));
        }

        let mut first_err = None;
        active.retain_mut(|runner| match runner.apply(tree, time) {
            Ok(remain) => remain > 0.0,
            Err(err) => {
                log::debug!("animation chain failed: {err}");
                if first_err.is_none() {
                    first_err = Some(err);
                }
                false
            }
        });

        let mut state = self.state.borrow_mut();
        if state.epoch == epoch {
            active.append(&mut state.active);
            state.active = active;
        }
        if state.active.is_empty() && state.pending.is_empty() {
            let released = match state.barriers.front_mut() {
                Some(front) => time >= *front.expires.get_or_insert(time + front.delay),
                None => false,
            };
            if released && let Some(barrier) = state.barriers.pop_front() {
                state.pending.extend(barrier.held);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl AnimBuilder for Animator {
    type Added<A: Animation + 'static> = Anim<A>;

    /// Queues `anim` as a new chain that starts on the next tick, or once the
    /// last barrier releases.
    fn add<A: Animation + 'static>(&self, anim: A) -> Anim<A> {
        Anim::build(anim, |anim| {
            let node = Node::root(anim);
            self.state.borrow_mut().accum().push(node.clone());
            node
        })
    }
}

impl Ticker for Animator {
    fn tick(&mut self, tree: &mut LayerTree, clock: &Clock) -> Result<(), Error> {
        Self::tick(self, tree, clock)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::cell::Cell;

    use super::*;
    use tableau_core::layer::LayerId;

    fn setup() -> (LayerTree, LayerId) {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let id = tree.create_layer();
        tree.add_child(root, id).unwrap();
        (tree, id)
    }

    fn at(tick: f64) -> Clock {
        Clock::new(tick, 16.0)
    }

    #[test]
    fn tween_hits_zero_half_and_end() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        anim.tween_x(id).from(0.0).to(100.0).duration(100.0);

        anim.tick(&mut tree, &at(0.0)).unwrap();
        assert_eq!(tree.translation(id).x, 0.0);
        anim.tick(&mut tree, &at(50.0)).unwrap();
        assert!((tree.translation(id).x - 50.0).abs() < 1e-9);
        anim.tick(&mut tree, &at(100.0)).unwrap();
        assert_eq!(tree.translation(id).x, 100.0);
        assert!(!anim.has_active());
    }

    #[test]
    fn chain_runs_in_order_with_carry_over() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        anim.delay(100.0)
            .then()
            .tween_y(id)
            .unwrap()
            .from(0.0)
            .to(10.0)
            .duration(100.0);
        anim.tick(&mut tree, &at(0.0)).unwrap();
        anim.tick(&mut tree, &at(150.0)).unwrap();
        assert!((tree.translation(id).y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn additions_during_tick_start_next_tick() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        let inner = anim.clone();
        anim.action(move |_| {
            inner.tween_x(id).from(0.0).to(10.0).duration(10.0);
            Ok(())
        });
        anim.tick(&mut tree, &at(0.0)).unwrap();
        assert!(anim.has_active());
        assert_eq!(tree.translation(id).x, 0.0);
        anim.tick(&mut tree, &at(5.0)).unwrap();
        // Started at 5, not at 0.
        assert_eq!(tree.translation(id).x, 0.0);
        anim.tick(&mut tree, &at(10.0)).unwrap();
        assert!((tree.translation(id).x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn barrier_waits_for_earlier_chains() {
        let (mut tree, _) = setup();
        let log = Rc::new(RefCell::new(vec![]));
        let anim = Animator::new();
        let l = log.clone();
        anim.delay(100.0)
            .then()
            .action(move |_| {
                l.borrow_mut().push("first");
                Ok(())
            })
            .unwrap();
        anim.add_barrier();
        let l = log.clone();
        anim.action(move |_| {
            l.borrow_mut().push("second");
            Ok(())
        });

        anim.tick(&mut tree, &at(0.0)).unwrap();
        anim.tick(&mut tree, &at(50.0)).unwrap();
        assert!(log.borrow().is_empty());
        // The delay finishes and the barrier releases in the same tick.
        anim.tick(&mut tree, &at(100.0)).unwrap();
        assert_eq!(*log.borrow(), ["first"]);
        anim.tick(&mut tree, &at(116.0)).unwrap();
        assert_eq!(*log.borrow(), ["first", "second"]);
    }

    #[test]
    fn barrier_delay_starts_once_reached() {
        let (mut tree, _) = setup();
        let ran = Rc::new(Cell::new(false));
        let anim = Animator::new();
        anim.add_barrier_with_delay(100.0);
        let r = ran.clone();
        anim.action(move |_| {
            r.set(true);
            Ok(())
        });
        assert!(anim.has_active());

        anim.tick(&mut tree, &at(1000.0)).unwrap();
        anim.tick(&mut tree, &at(1050.0)).unwrap();
        assert!(!ran.get());
        anim.tick(&mut tree, &at(1100.0)).unwrap();
        anim.tick(&mut tree, &at(1116.0)).unwrap();
        assert!(ran.get());
    }

    #[test]
    fn empty_barrier_releases_same_tick() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        anim.add_barrier();
        anim.tween_x(id).to(10.0).duration(0.0);
        anim.tick(&mut tree, &at(0.0)).unwrap();
        anim.tick(&mut tree, &at(16.0)).unwrap();
        assert_eq!(tree.translation(id).x, 10.0);
    }

    #[test]
    fn zero_time_repeat_runs_once_per_tick() {
        let (mut tree, _) = setup();
        let count = Rc::new(Cell::new(0_u32));
        let anim = Animator::new();
        let c = count.clone();
        anim.repeat(None)
            .then()
            .action(move |_| {
                c.set(c.get() + 1);
                Ok(())
            })
            .unwrap();
        for tick in 0..5 {
            anim.tick(&mut tree, &at(f64::from(tick) * 16.0)).unwrap();
        }
        assert_eq!(count.get(), 5);
        assert!(anim.has_active());
    }

    #[test]
    fn guarded_repeat_ends_when_guard_detached() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        anim.repeat(Some(id))
            .then()
            .tween_rotation(id)
            .unwrap()
            .from(0.0)
            .to(1.0)
            .duration(100.0);
        anim.tick(&mut tree, &at(0.0)).unwrap();
        anim.tick(&mut tree, &at(50.0)).unwrap();
        assert!(anim.has_active());
        tree.remove_from_parent(id).unwrap();
        anim.tick(&mut tree, &at(120.0)).unwrap();
        assert!(!anim.has_active());
        assert_eq!(tree.rotation(id), 1.0);
    }

    #[test]
    fn tween_on_disposed_layer_keeps_running() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        anim.tween_alpha(id)
            .to(0.0)
            .duration(100.0)
            .then()
            .action(move |_| {
                d.set(true);
                Ok(())
            })
            .unwrap();
        anim.tick(&mut tree, &at(0.0)).unwrap();
        tree.dispose(id).unwrap();
        anim.tick(&mut tree, &at(50.0)).unwrap();
        assert!(anim.has_active());
        anim.tick(&mut tree, &at(100.0)).unwrap();
        assert!(done.get());
    }

    #[test]
    fn handle_cancel_and_complete() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        let a = anim.tween_x(id).to(100.0).duration(100.0);
        let b = anim.tween_y(id).to(100.0).duration(100.0);
        anim.tick(&mut tree, &at(0.0)).unwrap();
        anim.tick(&mut tree, &at(50.0)).unwrap();

        a.handle().cancel();
        b.handle().complete(&mut tree).unwrap();
        assert_eq!(tree.translation(id).y, 100.0);

        anim.tick(&mut tree, &at(75.0)).unwrap();
        assert!((tree.translation(id).x - 50.0).abs() < 1e-9);
        assert_eq!(tree.translation(id).y, 100.0);
        assert!(!anim.has_active());
    }

    #[test]
    fn action_can_complete_its_own_chain() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        let first = anim.action(|_| Ok(()));
        let handle = first.handle();
        first
            .then()
            .action(move |tree| handle.complete(tree))
            .unwrap()
            .then()
            .tween_x(id)
            .unwrap()
            .to(9.0);
        anim.tick(&mut tree, &at(0.0)).unwrap();
        assert_eq!(tree.translation(id).x, 9.0);
        assert!(!anim.has_active());
    }

    #[test]
    fn clear_drops_everything() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        anim.tween_x(id).to(10.0).duration(100.0);
        anim.add_barrier();
        anim.tween_y(id).to(10.0);
        anim.tick(&mut tree, &at(0.0)).unwrap();
        anim.clear();
        assert!(!anim.has_active());
        anim.tick(&mut tree, &at(50.0)).unwrap();
        assert_eq!(tree.translation(id).x, 0.0);
    }

    #[test]
    fn clear_from_action_drops_in_flight_chains() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        let inner = anim.clone();
        anim.tween_x(id).to(10.0).duration(100.0);
        anim.action(move |_| {
            inner.clear();
            Ok(())
        });
        anim.tick(&mut tree, &at(0.0)).unwrap();
        assert!(!anim.has_active());
    }

    #[test]
    fn failing_action_keeps_other_chains() {
        let (mut tree, id) = setup();
        let anim = Animator::new();
        anim.tween_x(id).to(10.0).duration(100.0);
        anim.action(|_| Err(Error::callback("boom")));
        let err = anim.tick(&mut tree, &at(0.0)).unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
        assert!(anim.has_active());
        anim.tick(&mut tree, &at(100.0)).unwrap();
        assert_eq!(tree.translation(id).x, 10.0);
    }

    #[test]
    fn animator_is_a_ticker() {
        let (mut tree, id) = setup();
        let mut anim = Animator::new();
        anim.tween_scale(id).to(2.0).duration(0.0);
        Ticker::tick(&mut anim, &mut tree, &at(0.0)).unwrap();
        assert_eq!(tree.scale(id), kurbo::Vec2::new(2.0, 2.0));
    }
}
