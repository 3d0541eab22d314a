// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame clock and the per-frame driver.
//!
//! A [`FrameLoop`] orders one frame as:
//!
//! 1. every [`Ticker`], in registration order;
//! 2. the [`paint`](FrameLoop::paint_signal) signal;
//! 3. [`LayerTree::evaluate`];
//! 4. [`LayerTree::paint`].
//!
//! Input is dispatched separately with [`FrameLoop::dispatch`], against the
//! live tree.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::Error;
use crate::input::{Dispatcher, InputEvent};
use crate::layer::{FrameChanges, LayerTree};
use crate::signal::Signal;
use crate::surface::Surface;
use crate::trace::{
    DispatchEvent, FrameBeginEvent, FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, Tracer,
};

/// Frame time in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Clock {
    /// Time of this frame.
    pub tick: f64,
    /// Time elapsed since the previous frame.
    pub dt: f64,
}

impl Clock {
    /// Creates a clock reading.
    #[inline]
    #[must_use]
    pub const fn new(tick: f64, dt: f64) -> Self {
        Self { tick, dt }
    }

    /// Returns the reading `dt` milliseconds later.
    #[inline]
    #[must_use]
    pub fn advance(self, dt: f64) -> Self {
        Self {
            tick: self.tick + dt,
            dt,
        }
    }
}

/// Per-frame work that runs before evaluation.
pub trait Ticker {
    /// Advances to `clock`.
    ///
    /// # Errors
    ///
    /// Errors abort the frame before evaluation.
    fn tick(&mut self, tree: &mut LayerTree, clock: &Clock) -> Result<(), Error>;
}

impl<F> Ticker for F
where
    F: FnMut(&mut LayerTree, &Clock) -> Result<(), Error>,
{
    fn tick(&mut self, tree: &mut LayerTree, clock: &Clock) -> Result<(), Error> {
        self(tree, clock)
    }
}

/// Handle returned by [`FrameLoop::add_ticker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickerKey(u32);

fn zero_timer() -> u64 {
    0
}

/// Owns a [`LayerTree`] and a [`Dispatcher`] and drives them frame by frame.
pub struct FrameLoop {
    tree: LayerTree,
    dispatcher: Dispatcher,
    paint: Signal<Clock>,
    tickers: Vec<(TickerKey, Box<dyn Ticker>)>,
    next_ticker: u32,
    frame_index: u64,
    timer: fn() -> u64,
    changes: FrameChanges,
}

impl core::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("layers", &self.tree.layer_count())
            .field("dispatcher", &self.dispatcher)
            .field("tickers", &self.tickers.len())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(LayerTree::new())
    }
}

impl FrameLoop {
    /// Creates a frame loop around `tree` with a default dispatcher.
    #[must_use]
    pub fn new(tree: LayerTree) -> Self {
        Self {
            tree,
            dispatcher: Dispatcher::new(),
            paint: Signal::new(),
            tickers: Vec::new(),
            next_ticker: 0,
            frame_index: 0,
            timer: zero_timer,
            changes: FrameChanges::default(),
        }
    }

    /// Replaces the dispatcher.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Sets the monotonic microsecond timer used for trace timestamps.
    ///
    /// Defaults to a timer that always reads zero.
    #[must_use]
    pub fn with_timer(mut self, timer: fn() -> u64) -> Self {
        self.timer = timer;
        self
    }

    /// Returns the tree.
    #[must_use]
    pub fn tree(&self) -> &LayerTree {
        &self.tree
    }

    /// Returns the tree for mutation.
    pub fn tree_mut(&mut self) -> &mut LayerTree {
        &mut self.tree
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the dispatcher for mutation.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Returns the signal emitted every frame after the tickers ran.
    #[must_use]
    pub fn paint_signal(&self) -> &Signal<Clock> {
        &self.paint
    }

    /// Returns the number of frames run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Registers a ticker. Tickers run in registration order.
    pub fn add_ticker(&mut self, ticker: impl Ticker + 'static) -> TickerKey {
        let key = TickerKey(self.next_ticker);
        self.next_ticker = self.next_ticker.wrapping_add(1);
        self.tickers.push((key, Box::new(ticker)));
        key
    }

    /// Unregisters a ticker. Returns `false` if `key` is unknown.
    pub fn remove_ticker(&mut self, key: TickerKey) -> bool {
        let Some(pos) = self.tickers.iter().position(|(k, _)| *k == key) else {
            return false;
        };
        drop(self.tickers.remove(pos));
        true
    }

    /// Runs one frame at `clock`, painting into `surf`.
    ///
    /// # Errors
    ///
    /// Returns the first ticker or painter error. A ticker error skips
    /// evaluation and painting for this frame.
    pub fn frame(
        &mut self,
        clock: Clock,
        surf: &mut dyn Surface,
        tracer: &mut Tracer<'_>,
    ) -> Result<&FrameChanges, Error> {
        let frame_index = self.frame_index;
        self.frame_index += 1;
        let begin = FrameBeginEvent {
            frame_index,
            tick: clock.tick,
            dt: clock.dt,
        };
        tracer.frame_begin(&begin);
        let mut summary = FrameSummaryBuilder::new(&begin);

        self.phase(PhaseKind::Animate, frame_index, tracer, &mut summary, |this| {
            for (_, ticker) in &mut this.tickers {
                ticker.tick(&mut this.tree, &clock)?;
            }
            this.paint.emit(&clock);
            Ok(())
        })?;

        self.phase(PhaseKind::Evaluate, frame_index, tracer, &mut summary, |this| {
            this.tree.evaluate_into(&mut this.changes);
            Ok(())
        })?;
        summary.set_changes(&self.changes, self.tree.layer_count());
        #[cfg(feature = "trace-rich")]
        if tracer.is_active() {
            tracer.layer_changes(frame_index, &crate::trace::layer_changes(&self.changes));
        }

        self.phase(PhaseKind::Paint, frame_index, tracer, &mut summary, |this| {
            this.tree.paint(surf)
        })?;

        tracer.frame_summary(&summary.finish());
        Ok(&self.changes)
    }

    /// Dispatches a batch of input events against the live tree.
    ///
    /// # Errors
    ///
    /// Propagates the first listener error.
    pub fn dispatch(&mut self, events: &[InputEvent], tracer: &mut Tracer<'_>) -> Result<(), Error> {
        let frame_index = self.frame_index;
        let mut summary = FrameSummaryBuilder::new(&FrameBeginEvent {
            frame_index,
            tick: 0.0,
            dt: 0.0,
        });
        let result = self.phase(PhaseKind::Dispatch, frame_index, tracer, &mut summary, |this| {
            this.dispatcher.dispatch(&mut this.tree, events)
        });
        tracer.dispatch(&DispatchEvent {
            frame_index,
            event_count: u32::try_from(events.len()).unwrap_or(u32::MAX),
            active: u32::try_from(self.dispatcher.active_count()).unwrap_or(u32::MAX),
            failed: result.is_err(),
        });
        result
    }

    fn phase<R>(
        &mut self,
        phase: PhaseKind,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
        f: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let start = (self.timer)();
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase,
            timestamp_us: start,
        });
        summary.phase_begin(phase, start);
        let result = f(self);
        let end = (self.timer)();
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase,
            timestamp_us: end,
        });
        summary.phase_end(phase, end);
        result
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use kurbo::{Size, Vec2};

    use super::*;
    use crate::input::EventKind;
    use crate::layer::{Content, ResourceKey};
    use crate::surface::testing::{Op, TestSurface};

    #[test]
    fn advance_accumulates() {
        let c = Clock::default().advance(16.0).advance(17.0);
        assert_eq!(c, Clock::new(33.0, 17.0));
    }

    #[test]
    fn tickers_run_in_order_before_evaluate_and_paint() {
        let mut fl = FrameLoop::default();
        let root = fl.tree().root();
        let sprite = fl.tree_mut().create_layer();
        fl.tree_mut().set_size(sprite, Size::new(4.0, 4.0));
        fl.tree_mut().set_content(sprite, Content::Texture(ResourceKey(3)));
        fl.tree_mut().add_child(root, sprite).unwrap();

        let order = Rc::new(RefCell::new(vec![]));
        let o = Rc::clone(&order);
        fl.add_ticker(move |tree: &mut LayerTree, clock: &Clock| -> Result<(), Error> {
            o.borrow_mut().push("first");
            tree.set_translation(sprite, Vec2::new(clock.tick, 0.0));
            Ok(())
        });
        let o = Rc::clone(&order);
        fl.add_ticker(move |_: &mut LayerTree, _: &Clock| -> Result<(), Error> {
            o.borrow_mut().push("second");
            Ok(())
        });
        let o = Rc::clone(&order);
        let _c = fl.paint_signal().connect(move |_| o.borrow_mut().push("paint"));

        let mut surf = TestSurface::new();
        let changes = fl
            .frame(Clock::new(10.0, 10.0), &mut surf, &mut Tracer::none())
            .unwrap();
        assert!(changes.transforms.contains(&sprite.index()));
        assert_eq!(*order.borrow(), vec!["first", "second", "paint"]);
        assert_eq!(fl.tree().world_transform(sprite).translation(), Vec2::new(10.0, 0.0));
        assert!(surf.ops.iter().any(
            |op| matches!(op, Op::Draw(key, tx) if *key == ResourceKey(3) && tx.translation() == Vec2::new(10.0, 0.0))
        ));
        assert_eq!(fl.frame_index(), 1);
    }

    #[test]
    fn ticker_error_skips_paint() {
        let mut fl = FrameLoop::default();
        let root = fl.tree().root();
        let sprite = fl.tree_mut().create_layer();
        fl.tree_mut().set_content(sprite, Content::Texture(ResourceKey(1)));
        fl.tree_mut().add_child(root, sprite).unwrap();
        let key = fl.add_ticker(|_: &mut LayerTree, _: &Clock| -> Result<(), Error> {
            Err(Error::callback("stop"))
        });

        let mut surf = TestSurface::new();
        assert!(fl.frame(Clock::default(), &mut surf, &mut Tracer::none()).is_err());
        assert!(surf.ops.is_empty());

        assert!(fl.remove_ticker(key));
        assert!(!fl.remove_ticker(key));
        fl.frame(Clock::default(), &mut surf, &mut Tracer::none()).unwrap();
        assert!(!surf.ops.is_empty());
    }

    #[test]
    fn dispatch_uses_live_tree() {
        use crate::input::{Interaction, InteractionListener};

        struct Count(Rc<RefCell<u32>>);
        impl InteractionListener for Count {
            fn on_start(&mut self, _: &mut LayerTree, _: &mut Interaction) -> Result<(), Error> {
                *self.0.borrow_mut() += 1;
                Ok(())
            }
        }

        let mut fl = FrameLoop::default();
        let root = fl.tree().root();
        let button = fl.tree_mut().create_layer();
        fl.tree_mut().set_size(button, Size::new(10.0, 10.0));
        fl.tree_mut().add_child_at(root, button, 100.0, 0.0).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let _ = fl
            .tree_mut()
            .add_listener(button, Rc::new(RefCell::new(Count(Rc::clone(&hits)))));

        // Never evaluated: dispatch must not rely on cached transforms.
        let start = InputEvent::new(0, 0.0, 105.0, 5.0, EventKind::Start);
        fl.dispatch(&[start], &mut Tracer::none()).unwrap();
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(fl.dispatcher().active_count(), 1);
    }
}
