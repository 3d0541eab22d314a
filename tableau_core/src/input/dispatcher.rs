// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-gesture routing of raw input events.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use super::event::{EventKind, InputEvent};
use super::interaction::Interaction;
use crate::error::Error;
use crate::layer::LayerTree;
use crate::signal::Value;

/// Routes raw input events to layer listeners.
///
/// Each gesture id moves through `none → active → removed`:
///
/// - A [`Start`](EventKind::Start) that hits a layer creates an active
///   [`Interaction`]. A start that hits nothing drops the gesture.
/// - Later events for an active id are delivered to its interaction. Events
///   for unknown ids are dropped.
/// - [`End`](EventKind::End) and [`Cancel`](EventKind::Cancel) remove the
///   entry after delivery, as does a listener canceling the interaction.
///
/// Dispatch runs against the live tree and is gated by
/// [`enabled`](Self::enabled).
#[derive(Debug)]
pub struct Dispatcher {
    bubble: bool,
    enabled: Value<bool>,
    active: BTreeMap<u32, Interaction>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Creates an enabled dispatcher whose interactions bubble.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bubble: true,
            enabled: Value::new(true),
            active: BTreeMap::new(),
        }
    }

    /// Sets whether new interactions bubble to ancestors. Defaults to `true`.
    #[must_use]
    pub fn with_bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    /// Shares an existing enable gate, e.g. a screen stack's input gate.
    #[must_use]
    pub fn with_enabled(mut self, enabled: Value<bool>) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the enable gate. While it holds `false`, events are dropped.
    #[must_use]
    pub fn enabled(&self) -> &Value<bool> {
        &self.enabled
    }

    /// Dispatches a batch of events in order.
    ///
    /// # Errors
    ///
    /// Returns the first listener error; the remaining events of the batch
    /// are not dispatched.
    pub fn dispatch(&mut self, tree: &mut LayerTree, events: &[InputEvent]) -> Result<(), Error> {
        for event in events {
            self.dispatch_event(tree, *event)?;
        }
        Ok(())
    }

    /// Dispatches one event.
    ///
    /// # Errors
    ///
    /// Propagates listener errors. The gesture stays active unless the event
    /// ended it.
    pub fn dispatch_event(&mut self, tree: &mut LayerTree, event: InputEvent) -> Result<(), Error> {
        if !self.enabled.get() {
            return Ok(());
        }
        let mut iact = match self.active.remove(&event.id) {
            Some(iact) => iact,
            None if event.kind == EventKind::Start => {
                let Some(hit) = tree.hit_test(event.point()) else {
                    log::debug!("gesture {} started on nothing, dropped", event.id);
                    return Ok(());
                };
                Interaction::new(hit, self.bubble, event)
            }
            None => return Ok(()),
        };
        let result = iact.dispatch(tree, event);
        if !event.kind.is_terminal() && !iact.canceled() {
            self.active.insert(event.id, iact);
        }
        result
    }

    /// Cancels every active interaction, notifying their listeners.
    ///
    /// # Errors
    ///
    /// Returns the first listener error after every interaction was
    /// canceled.
    pub fn cancel_all(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        let active: Vec<Interaction> =
            core::mem::take(&mut self.active).into_values().collect();
        let mut first = None;
        for mut iact in active {
            if let Err(err) = iact.cancel_now(tree) {
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Returns the number of gestures in progress.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Returns whether gesture `id` is in progress.
    #[must_use]
    pub fn is_active(&self, id: u32) -> bool {
        self.active.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::RefCell;

    use kurbo::{Point, Size};

    use super::*;
    use crate::input::{CaptureMode, InteractionListener, ListenerRef};
    use crate::layer::LayerId;

    type Log = Rc<RefCell<Vec<(&'static str, EventKind)>>>;

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Act {
        None,
        Capture(CaptureMode),
        Cancel,
        Dispose(LayerId),
    }

    struct Watcher {
        tag: &'static str,
        log: Log,
        on_start: Act,
        locals: Vec<Point>,
    }

    impl InteractionListener for Watcher {
        fn on_interaction(
            &mut self,
            tree: &mut LayerTree,
            iact: &mut Interaction,
        ) -> Result<(), Error> {
            self.log.borrow_mut().push((self.tag, iact.kind()));
            self.locals.push(iact.local());
            if iact.kind() == EventKind::Start {
                match self.on_start {
                    Act::None => {}
                    Act::Capture(mode) => iact.capture(mode),
                    Act::Cancel => iact.cancel(),
                    Act::Dispose(id) => tree.dispose(id)?,
                }
            }
            Ok(())
        }
    }

    fn watch(
        tree: &mut LayerTree,
        id: LayerId,
        tag: &'static str,
        log: &Log,
        act: Act,
    ) -> Rc<RefCell<Watcher>> {
        let p = Rc::new(RefCell::new(Watcher {
            tag,
            log: Rc::clone(log),
            on_start: act,
            locals: Vec::new(),
        }));
        let listener: ListenerRef = p.clone();
        let _ = tree.add_listener(id, listener);
        p
    }

    /// root ⊃ outer ⊃ mid ⊃ leaf, all 100x100 at the origin.
    fn nested() -> (LayerTree, [LayerId; 3]) {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let outer = tree.create_group();
        let mid = tree.create_group();
        let leaf = tree.create_layer();
        for id in [outer, mid, leaf] {
            tree.set_size(id, Size::new(100.0, 100.0));
        }
        tree.add_child(root, outer).unwrap();
        tree.add_child(outer, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        (tree, [outer, mid, leaf])
    }

    fn ev(id: u32, kind: EventKind) -> InputEvent {
        InputEvent::new(id, 0.0, 10.0, 10.0, kind)
    }

    fn tags(log: &Log) -> Vec<String> {
        log.borrow()
            .iter()
            .map(|(t, k)| alloc::format!("{t}:{k:?}"))
            .collect()
    }

    #[test]
    fn miss_drops_gesture() {
        let (mut tree, [_, _, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, InputEvent::new(1, 0.0, 500.0, 500.0, EventKind::Start))
            .unwrap();
        assert_eq!(d.active_count(), 0);
        d.dispatch_event(&mut tree, ev(1, EventKind::Move)).unwrap();
        d.dispatch_event(&mut tree, ev(1, EventKind::End)).unwrap();
        assert!(log.borrow().is_empty(), "unknown ids are dropped");
    }

    #[test]
    fn events_bubble_from_hit_layer() {
        let (mut tree, [outer, mid, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, outer, "outer", &log, Act::None);
        watch(&mut tree, mid, "mid", &log, Act::None);
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch(&mut tree, &[ev(7, EventKind::Start), ev(7, EventKind::End)])
            .unwrap();
        assert_eq!(
            tags(&log),
            vec![
                "leaf:Start",
                "mid:Start",
                "outer:Start",
                "leaf:End",
                "mid:End",
                "outer:End",
            ]
        );
        assert!(!d.is_active(7), "end removes the entry");
    }

    #[test]
    fn without_bubbling_only_hit_layer_receives() {
        let (mut tree, [outer, _, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, outer, "outer", &log, Act::None);
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new().with_bubble(false);
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        assert_eq!(tags(&log), vec!["leaf:Start"]);
    }

    #[test]
    fn capture_only_cancels_everyone_else() {
        let (mut tree, [outer, mid, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, outer, "outer", &log, Act::None);
        watch(&mut tree, mid, "mid", &log, Act::Capture(CaptureMode::Only));
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        d.dispatch_event(&mut tree, ev(1, EventKind::Move)).unwrap();
        assert_eq!(
            tags(&log),
            vec![
                "leaf:Start",
                "mid:Start",
                "leaf:Cancel",
                "outer:Cancel",
                "mid:Move",
            ]
        );
    }

    #[test]
    fn capture_above_keeps_ancestors() {
        let (mut tree, [outer, mid, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, outer, "outer", &log, Act::None);
        watch(&mut tree, mid, "mid", &log, Act::Capture(CaptureMode::Above));
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        d.dispatch_event(&mut tree, ev(1, EventKind::Move)).unwrap();
        assert_eq!(
            tags(&log),
            vec![
                "leaf:Start",
                "mid:Start",
                "leaf:Cancel",
                "outer:Start",
                "mid:Move",
                "outer:Move",
            ]
        );
    }

    #[test]
    fn capture_below_keeps_descendants() {
        let (mut tree, [outer, mid, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, outer, "outer", &log, Act::None);
        watch(&mut tree, mid, "mid", &log, Act::Capture(CaptureMode::Below));
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        d.dispatch_event(&mut tree, ev(1, EventKind::Move)).unwrap();
        assert_eq!(
            tags(&log),
            vec![
                "leaf:Start",
                "mid:Start",
                "outer:Cancel",
                "leaf:Move",
                "mid:Move",
            ]
        );
    }

    #[test]
    fn cancel_from_listener_notifies_path_and_ends_gesture() {
        let (mut tree, [outer, mid, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, outer, "outer", &log, Act::None);
        watch(&mut tree, mid, "mid", &log, Act::Cancel);
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        d.dispatch_event(&mut tree, ev(1, EventKind::Move)).unwrap();
        assert_eq!(
            tags(&log),
            vec![
                "leaf:Start",
                "mid:Start",
                "leaf:Cancel",
                "mid:Cancel",
                "outer:Cancel",
            ]
        );
        assert!(!d.is_active(1));
    }

    #[test]
    fn cancel_all_notifies_and_clears() {
        let (mut tree, [_, _, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        d.dispatch_event(&mut tree, ev(2, EventKind::Start)).unwrap();
        assert_eq!(d.active_count(), 2);
        d.cancel_all(&mut tree).unwrap();
        assert_eq!(d.active_count(), 0);
        assert_eq!(
            tags(&log),
            vec!["leaf:Start", "leaf:Start", "leaf:Cancel", "leaf:Cancel"]
        );
    }

    #[test]
    fn disabled_gate_drops_events() {
        let (mut tree, [_, _, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let gate = Value::new(false);
        let mut d = Dispatcher::new().with_enabled(gate.clone());
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        assert_eq!(d.active_count(), 0);
        gate.update(true);
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        assert_eq!(tags(&log), vec!["leaf:Start"]);
    }

    #[test]
    fn disposed_layer_stops_propagation() {
        let (mut tree, [outer, mid, leaf]) = nested();
        let log = Log::default();
        watch(&mut tree, outer, "outer", &log, Act::None);
        watch(&mut tree, mid, "mid", &log, Act::Dispose(mid));
        watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        d.dispatch_event(&mut tree, ev(1, EventKind::End)).unwrap();
        assert_eq!(tags(&log), vec!["leaf:Start", "mid:Start"]);
        assert!(!tree.is_alive(leaf));
    }

    #[test]
    fn local_point_is_in_hit_layer_space() {
        let (mut tree, [outer, _, leaf]) = nested();
        tree.set_translation(outer, kurbo::Vec2::new(4.0, 6.0));
        let log = Log::default();
        let p = watch(&mut tree, leaf, "leaf", &log, Act::None);
        let mut d = Dispatcher::new();
        d.dispatch_event(&mut tree, ev(1, EventKind::Start)).unwrap();
        assert_eq!(p.borrow().locals, vec![Point::new(6.0, 4.0)]);
    }

    struct Grabber {
        mode: CaptureMode,
    }

    impl InteractionListener for Grabber {
        fn on_start(&mut self, _: &mut LayerTree, iact: &mut Interaction) -> Result<(), Error> {
            iact.capture(self.mode);
            Ok(())
        }
    }

    #[test]
    #[should_panic(expected = "interaction already captured by")]
    fn second_capturing_layer_panics() {
        let (mut tree, [_, mid, leaf]) = nested();
        let a: ListenerRef = Rc::new(RefCell::new(Grabber {
            mode: CaptureMode::Above,
        }));
        let b: ListenerRef = Rc::new(RefCell::new(Grabber {
            mode: CaptureMode::Above,
        }));
        let _ = tree.add_listener(leaf, a);
        let _ = tree.add_listener(mid, b);
        let mut d = Dispatcher::new();
        let _ = d.dispatch_event(&mut tree, ev(1, EventKind::Start));
    }

    struct CancelThenCapture;

    impl InteractionListener for CancelThenCapture {
        fn on_start(&mut self, _: &mut LayerTree, iact: &mut Interaction) -> Result<(), Error> {
            iact.cancel();
            iact.capture(CaptureMode::Only);
            Ok(())
        }
    }

    #[test]
    #[should_panic(expected = "cannot capture a canceled interaction")]
    fn capturing_canceled_interaction_panics() {
        let (mut tree, [_, _, leaf]) = nested();
        let l: ListenerRef = Rc::new(RefCell::new(CancelThenCapture));
        let _ = tree.add_listener(leaf, l);
        let mut d = Dispatcher::new();
        let _ = d.dispatch_event(&mut tree, ev(1, EventKind::Start));
    }
}
