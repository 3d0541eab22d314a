// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The screen stack.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;
use tableau_core::Error;
use tableau_core::frame::{Clock, Ticker};
use tableau_core::layer::{LayerId, LayerTree};
use tableau_core::signal::Value;

use crate::screen::{Screen, ScreenRef, ScreenView};
use crate::transition::{Slide, Transition};

/// Errors returned by [`ScreenStack`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    /// [`ScreenStack::push_all`] was given no screens.
    #[error("cannot push an empty list of screens")]
    EmptyPush,
    /// The screen is already in the stack.
    #[error("screen is already in the stack")]
    AlreadyInStack,
    /// Attaching or detaching a screen layer failed.
    #[error(transparent)]
    Tree(#[from] Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Incoming {
    /// The screen is new to the stack.
    AddAndShow,
    /// The screen was already in the stack, below the outgoing one.
    Show,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outgoing {
    Hide,
    HideAndRemove,
}

/// A transition in flight.
struct Transitor {
    old: ScreenRef,
    new: ScreenRef,
    old_view: ScreenView,
    new_view: ScreenView,
    trans: Box<dyn Transition>,
    elapsed: f64,
    outgoing: Outgoing,
}

/// Runs `hook` on `screen`, logging instead of propagating its error.
fn notify(
    screen: &ScreenRef,
    tree: &mut LayerTree,
    name: &str,
    hook: impl FnOnce(&mut dyn Screen, &mut LayerTree) -> Result<(), Error>,
) {
    let Ok(mut screen) = screen.try_borrow_mut() else {
        log::warn!("screen is busy; {name} skipped");
        return;
    };
    if let Err(err) = hook(&mut *screen, tree) {
        log::warn!("screen {name} failed: {err}");
    }
}

/// A stack of screens, of which the top one is visible.
///
/// Screen layers are attached under a root layer at the stack origin while
/// shown. Moving between screens runs a [`Transition`]; while it is in
/// flight both screens are shown and the input gate is closed. Share the
/// gate with a [`Dispatcher`](tableau_core::input::Dispatcher) through
/// [`with_input`](Self::with_input) to drop input during transitions.
///
/// Hooks run while the stack is borrowed, so screens cannot reach back into
/// the stack from a hook. Their errors are logged at warn level and never
/// leave the stack half-updated.
pub struct ScreenStack {
    root: LayerId,
    origin: Point,
    input: Value<bool>,
    /// Bottom to top.
    screens: Vec<ScreenRef>,
    shown: Vec<ScreenRef>,
    transitor: Option<Transitor>,
}

impl fmt::Debug for ScreenStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenStack")
            .field("root", &self.root)
            .field("origin", &self.origin)
            .field("input", &self.input)
            .field("screens", &self.screens.len())
            .field("shown", &self.shown.len())
            .field("transiting", &self.transitor.is_some())
            .finish()
    }
}

impl ScreenStack {
    /// Creates an empty stack that shows screens under `root`.
    #[must_use]
    pub fn new(root: LayerId) -> Self {
        Self {
            root,
            origin: Point::ORIGIN,
            input: Value::new(true),
            screens: Vec::new(),
            shown: Vec::new(),
            transitor: None,
        }
    }

    /// Places screens at `origin` instead of `(0, 0)`.
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Uses `input` as the input gate.
    #[must_use]
    pub fn with_input(mut self, input: Value<bool>) -> Self {
        self.input = input;
        self
    }

    /// Returns where screens are placed.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Sets where screens are placed from the next time one is shown.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Returns the input gate, which is `false` while a transition runs.
    #[must_use]
    pub fn input(&self) -> &Value<bool> {
        &self.input
    }

    /// Creates a [`Slide`] that knows this stack's origin.
    #[must_use]
    pub fn slide(&self) -> Slide {
        Slide::new().origin(self.origin)
    }

    /// Returns the top screen.
    #[must_use]
    pub fn top(&self) -> Option<&ScreenRef> {
        self.screens.last()
    }

    /// Returns the topmost screen that matches `pred`.
    pub fn find(&self, mut pred: impl FnMut(&dyn Screen) -> bool) -> Option<ScreenRef> {
        self.screens
            .iter()
            .rev()
            .find(|screen| pred(&*screen.borrow()))
            .cloned()
    }

    /// Returns whether `screen` is in the stack.
    #[must_use]
    pub fn contains(&self, screen: &ScreenRef) -> bool {
        self.screens.iter().any(|s| Rc::ptr_eq(s, screen))
    }

    /// Returns whether a transition is in flight.
    #[must_use]
    pub fn is_transiting(&self) -> bool {
        self.transitor.is_some()
    }

    /// Returns the number of screens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// Returns whether the stack has no screens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Pushes `screen` and shows it, hiding the previous top screen.
    ///
    /// # Errors
    ///
    /// - [`ScreenError::AlreadyInStack`] if `screen` is in the stack.
    /// - [`ScreenError::Tree`] if a screen layer cannot be attached or
    ///   detached.
    pub fn push(
        &mut self,
        tree: &mut LayerTree,
        screen: ScreenRef,
        trans: impl Transition + 'static,
    ) -> Result<(), ScreenError> {
        if self.contains(&screen) {
            return Err(ScreenError::AlreadyInStack);
        }
        match self.top().cloned() {
            None => self.add_and_show(tree, screen)?,
            Some(old) => self.transition(
                tree,
                old,
                screen,
                Box::new(trans),
                Incoming::AddAndShow,
                Outgoing::Hide,
            )?,
        }
        Ok(())
    }

    /// Pushes `screens` in order and shows the last one. The transition runs
    /// from the screen that was on top before the call.
    ///
    /// # Errors
    ///
    /// - [`ScreenError::EmptyPush`] if `screens` is empty.
    /// - [`ScreenError::AlreadyInStack`] if any screen is in the stack or
    ///   listed twice. Nothing is pushed in either case.
    /// - [`ScreenError::Tree`] as for [`push`](Self::push).
    pub fn push_all(
        &mut self,
        tree: &mut LayerTree,
        screens: impl IntoIterator<Item = ScreenRef>,
        trans: impl Transition + 'static,
    ) -> Result<(), ScreenError> {
        let mut screens: Vec<ScreenRef> = screens.into_iter().collect();
        let Some(last) = screens.pop() else {
            return Err(ScreenError::EmptyPush);
        };
        for (i, screen) in screens.iter().chain([&last]).enumerate() {
            let listed_twice = screens[..i.min(screens.len())]
                .iter()
                .any(|s| Rc::ptr_eq(s, screen));
            if self.contains(screen) || listed_twice {
                return Err(ScreenError::AlreadyInStack);
            }
        }
        let old = self.top().cloned();
        for screen in screens {
            self.add(tree, screen);
        }
        match old {
            None => self.add_and_show(tree, last)?,
            Some(old) => self.transition(
                tree,
                old,
                last,
                Box::new(trans),
                Incoming::AddAndShow,
                Outgoing::Hide,
            )?,
        }
        Ok(())
    }

    /// Pops screens until `screen` is on top.
    ///
    /// Screens between the top and `screen` are removed without being shown;
    /// the top screen leaves through `trans`. If `screen` is not in the stack
    /// every screen is removed.
    ///
    /// # Errors
    ///
    /// [`ScreenError::Tree`] if a screen layer cannot be attached or
    /// detached.
    pub fn pop_to(
        &mut self,
        tree: &mut LayerTree,
        screen: &ScreenRef,
        trans: impl Transition + 'static,
    ) -> Result<(), ScreenError> {
        if self.top().is_some_and(|top| Rc::ptr_eq(top, screen)) {
            return Ok(());
        }
        while self.screens.len() > 1 {
            let below = self.screens[self.screens.len() - 2].clone();
            if Rc::ptr_eq(&below, screen) {
                break;
            }
            self.just_remove(tree, &below);
        }
        if let Some(top) = self.top().cloned() {
            self.remove(tree, &top, trans)?;
        }
        Ok(())
    }

    /// Replaces the top screen with `screen`. The old top screen is removed
    /// once the transition completes.
    ///
    /// # Errors
    ///
    /// As for [`push`](Self::push).
    pub fn replace(
        &mut self,
        tree: &mut LayerTree,
        screen: ScreenRef,
        trans: impl Transition + 'static,
    ) -> Result<(), ScreenError> {
        if self.contains(&screen) {
            return Err(ScreenError::AlreadyInStack);
        }
        match self.screens.pop() {
            None => self.add_and_show(tree, screen)?,
            Some(old) => self.transition(
                tree,
                old,
                screen,
                Box::new(trans),
                Incoming::AddAndShow,
                Outgoing::HideAndRemove,
            )?,
        }
        Ok(())
    }

    /// Removes `screen`. If it is the top screen, the screen below is shown
    /// through `trans`.
    ///
    /// Returns whether `screen` was in the stack.
    ///
    /// # Errors
    ///
    /// [`ScreenError::Tree`] if a screen layer cannot be attached or
    /// detached.
    pub fn remove(
        &mut self,
        tree: &mut LayerTree,
        screen: &ScreenRef,
        trans: impl Transition + 'static,
    ) -> Result<bool, ScreenError> {
        if !self.top().is_some_and(|top| Rc::ptr_eq(top, screen)) {
            return Ok(self.just_remove(tree, screen));
        }
        if self.screens.len() > 1 {
            let below = self.screens[self.screens.len() - 2].clone();
            if let Some(old) = self.screens.pop() {
                self.transition(
                    tree,
                    old,
                    below,
                    Box::new(trans),
                    Incoming::Show,
                    Outgoing::HideAndRemove,
                )?;
            }
        } else {
            let hidden = self.hide(tree, screen);
            self.just_remove(tree, screen);
            hidden?;
        }
        Ok(true)
    }

    /// Removes every screen matching `pred`, lowest first. The top screen is
    /// checked last and leaves through `trans`.
    ///
    /// # Errors
    ///
    /// As for [`remove`](Self::remove).
    pub fn remove_where(
        &mut self,
        tree: &mut LayerTree,
        mut pred: impl FnMut(&dyn Screen) -> bool,
        trans: impl Transition + 'static,
    ) -> Result<(), ScreenError> {
        let mut i = 0;
        while i + 1 < self.screens.len() {
            if pred(&*self.screens[i].borrow()) {
                let screen = self.screens.remove(i);
                notify(&screen, tree, "was_removed", |s, t| s.was_removed(t));
            } else {
                i += 1;
            }
        }
        let top = self
            .top()
            .filter(|top| pred(&*top.borrow()))
            .cloned();
        if let Some(top) = top {
            self.remove(tree, &top, trans)?;
        }
        Ok(())
    }

    /// Forwards `clock` to every shown screen and advances the transition in
    /// flight.
    ///
    /// # Errors
    ///
    /// [`Error`] if a screen layer cannot be detached when a transition
    /// completes.
    pub fn tick(&mut self, tree: &mut LayerTree, clock: &Clock) -> Result<(), Error> {
        let shown = self.shown.clone();
        for screen in &shown {
            notify(screen, tree, "paint", |s, t| s.paint(t, clock));
        }
        if let Some(mut current) = self.transitor.take() {
            current.elapsed += clock.dt;
            let done = current.trans.update(
                tree,
                current.old_view,
                current.new_view,
                current.elapsed,
            );
            if done {
                self.complete(tree, current)?;
            } else {
                self.transitor = Some(current);
            }
        }
        Ok(())
    }

    fn add(&mut self, tree: &mut LayerTree, screen: ScreenRef) {
        self.screens.push(screen.clone());
        notify(&screen, tree, "was_added", |s, t| s.was_added(t));
    }

    fn add_and_show(&mut self, tree: &mut LayerTree, screen: ScreenRef) -> Result<(), Error> {
        self.add(tree, screen.clone());
        self.show(tree, &screen)
    }

    fn show(&mut self, tree: &mut LayerTree, screen: &ScreenRef) -> Result<(), Error> {
        let layer = screen.borrow().layer();
        tree.add_child_at(self.root, layer, self.origin.x, self.origin.y)?;
        self.shown.push(screen.clone());
        notify(screen, tree, "was_shown", |s, t| s.was_shown(t));
        Ok(())
    }

    fn hide(&mut self, tree: &mut LayerTree, screen: &ScreenRef) -> Result<(), Error> {
        self.shown.retain(|s| !Rc::ptr_eq(s, screen));
        let layer = screen.borrow().layer();
        let detached = if tree.is_alive(layer) && tree.parent(layer) == Some(self.root) {
            tree.remove_child(self.root, layer)
        } else {
            Ok(())
        };
        notify(screen, tree, "was_hidden", |s, t| s.was_hidden(t));
        if let Ok(mut screen) = screen.try_borrow_mut()
            && let Some(conns) = screen.close_on_hide()
        {
            conns.close();
        }
        detached
    }

    fn just_remove(&mut self, tree: &mut LayerTree, screen: &ScreenRef) -> bool {
        let Some(pos) = self.screens.iter().position(|s| Rc::ptr_eq(s, screen)) else {
            return false;
        };
        self.screens.remove(pos);
        notify(screen, tree, "was_removed", |s, t| s.was_removed(t));
        true
    }

    fn transition(
        &mut self,
        tree: &mut LayerTree,
        old: ScreenRef,
        new: ScreenRef,
        trans: Box<dyn Transition>,
        incoming: Incoming,
        outgoing: Outgoing,
    ) -> Result<(), Error> {
        if let Some(current) = self.transitor.take() {
            self.complete(tree, current)?;
        }
        notify(&old, tree, "hide_transition_started", |s, t| {
            s.hide_transition_started(t)
        });
        match incoming {
            Incoming::AddAndShow => self.add_and_show(tree, new.clone())?,
            Incoming::Show => self.show(tree, &new)?,
        }
        let mut current = Transitor {
            old_view: ScreenView::of(&old),
            new_view: ScreenView::of(&new),
            old,
            new,
            trans,
            elapsed: 0.0,
            outgoing,
        };
        current
            .trans
            .init(tree, current.old_view, current.new_view);
        self.input.update(false);
        let done = current.trans.is_noop()
            || current
                .trans
                .update(tree, current.old_view, current.new_view, 0.0);
        if done {
            self.complete(tree, current)
        } else {
            self.transitor = Some(current);
            Ok(())
        }
    }

    fn complete(&mut self, tree: &mut LayerTree, mut current: Transitor) -> Result<(), Error> {
        current
            .trans
            .complete(tree, current.old_view, current.new_view);
        let layer = current.new_view.layer;
        if tree.is_alive(layer) {
            tree.set_translation(layer, self.origin.to_vec2());
        }
        notify(&current.new, tree, "show_transition_completed", |s, t| {
            s.show_transition_completed(t)
        });
        let hidden = self.hide(tree, &current.old);
        if current.outgoing == Outgoing::HideAndRemove {
            notify(&current.old, tree, "was_removed", |s, t| s.was_removed(t));
        }
        self.input.update(true);
        hidden
    }
}

impl Ticker for ScreenStack {
    fn tick(&mut self, tree: &mut LayerTree, clock: &Clock) -> Result<(), Error> {
        Self::tick(self, tree, clock)
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    use kurbo::{Size, Vec2};
    use tableau_core::signal::{Connections, Signal};
    use tableau_core::layer::{Content, ResourceKey};
    use tableau_debug::surface::{RecordingSurface, SurfaceOp};

    use super::*;
    use crate::screen::screen_ref;
    use crate::transition::{Flip, Noop, Timed};

    type Log = Rc<RefCell<Vec<String>>>;

    struct TestScreen {
        name: &'static str,
        layer: LayerId,
        log: Log,
        fail: bool,
    }

    impl TestScreen {
        fn note(&self, event: &str) -> Result<(), Error> {
            self.log.borrow_mut().push(format!("{} {event}", self.name));
            if self.fail {
                Err(Error::callback("screen failed"))
            } else {
                Ok(())
            }
        }
    }

    impl Screen for TestScreen {
        fn layer(&self) -> LayerId {
            self.layer
        }

        fn size(&self) -> Size {
            Size::new(100.0, 50.0)
        }

        fn was_added(&mut self, _: &mut LayerTree) -> Result<(), Error> {
            self.note("added")
        }

        fn was_shown(&mut self, _: &mut LayerTree) -> Result<(), Error> {
            self.note("shown")
        }

        fn was_hidden(&mut self, _: &mut LayerTree) -> Result<(), Error> {
            self.note("hidden")
        }

        fn was_removed(&mut self, _: &mut LayerTree) -> Result<(), Error> {
            self.note("removed")
        }

        fn show_transition_completed(&mut self, _: &mut LayerTree) -> Result<(), Error> {
            self.note("show-completed")
        }

        fn hide_transition_started(&mut self, _: &mut LayerTree) -> Result<(), Error> {
            self.note("hide-started")
        }

        fn paint(&mut self, _: &mut LayerTree, _: &Clock) -> Result<(), Error> {
            self.note("paint")
        }
    }

    struct Fixture {
        tree: LayerTree,
        stack: ScreenStack,
        log: Log,
    }

    impl Fixture {
        fn new() -> Self {
            let tree = LayerTree::new();
            let stack = ScreenStack::new(tree.root());
            Self {
                tree,
                stack,
                log: Log::default(),
            }
        }

        fn screen(&mut self, name: &'static str) -> ScreenRef {
            self.make(name, false)
        }

        fn make(&mut self, name: &'static str, fail: bool) -> ScreenRef {
            let layer = self.tree.create_group();
            screen_ref(TestScreen {
                name,
                layer,
                log: self.log.clone(),
                fail,
            })
        }

        fn take(&self) -> Vec<String> {
            core::mem::take(&mut *self.log.borrow_mut())
        }

        fn tick(&mut self, dt: f64) {
            self.stack
                .tick(&mut self.tree, &Clock::new(0.0, dt))
                .unwrap();
        }

        fn attached(&self, screen: &ScreenRef) -> bool {
            let layer = screen.borrow().layer();
            self.tree.parent(layer) == Some(self.tree.root())
        }
    }

    #[test]
    fn first_push_shows_at_once() {
        let mut f = Fixture::new();
        let a = f.screen("A");
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        assert_eq!(f.take(), ["A added", "A shown"]);
        assert!(f.attached(&a));
        assert!(!f.stack.is_transiting());
        assert!(f.stack.input().get());
    }

    #[test]
    fn push_runs_hooks_in_order() {
        let mut f = Fixture::new();
        let (a, b) = (f.screen("A"), f.screen("B"));
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        f.take();
        f.stack.push(&mut f.tree, b.clone(), Noop).unwrap();
        assert_eq!(
            f.take(),
            [
                "A hide-started",
                "B added",
                "B shown",
                "B show-completed",
                "A hidden"
            ]
        );
        assert_eq!(f.stack.len(), 2);
        assert!(Rc::ptr_eq(f.stack.top().unwrap(), &b));
        assert!(!f.attached(&a));
        assert!(f.attached(&b));
    }

    #[test]
    fn rejects_duplicates_and_empty_push() {
        let mut f = Fixture::new();
        let (a, b) = (f.screen("A"), f.screen("B"));
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        assert!(matches!(
            f.stack.push(&mut f.tree, a.clone(), Noop),
            Err(ScreenError::AlreadyInStack)
        ));
        assert!(matches!(
            f.stack.push_all(&mut f.tree, vec![], Noop),
            Err(ScreenError::EmptyPush)
        ));
        assert!(matches!(
            f.stack.push_all(&mut f.tree, vec![b.clone(), b.clone()], Noop),
            Err(ScreenError::AlreadyInStack)
        ));
        assert!(matches!(
            f.stack.replace(&mut f.tree, a, Noop),
            Err(ScreenError::AlreadyInStack)
        ));
        assert_eq!(f.stack.len(), 1);
    }

    #[test]
    fn push_all_shows_only_the_last() {
        let mut f = Fixture::new();
        let (a, b, c) = (f.screen("A"), f.screen("B"), f.screen("C"));
        f.stack
            .push_all(&mut f.tree, vec![a.clone(), b.clone(), c.clone()], Noop)
            .unwrap();
        assert_eq!(f.take(), ["A added", "B added", "C added", "C shown"]);
        assert_eq!(f.stack.len(), 3);
        assert!(f.attached(&c) && !f.attached(&a) && !f.attached(&b));
    }

    #[test]
    fn slide_runs_over_ticks() {
        let mut f = Fixture::new();
        let gate = Value::new(true);
        f.stack = ScreenStack::new(f.tree.root()).with_input(gate.clone());
        let (a, b) = (f.screen("A"), f.screen("B"));
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        let slide = f.stack.slide().duration(100.0);
        f.stack.push(&mut f.tree, b.clone(), slide).unwrap();
        f.take();
        assert!(f.stack.is_transiting());
        assert!(!gate.get());

        let b_layer = b.borrow().layer();
        f.tick(50.0);
        let x = f.tree.translation(b_layer).x;
        assert!(x > 0.0 && x < 100.0, "incoming screen is mid-slide at {x}");
        assert_eq!(f.take(), ["A paint", "B paint"]);

        f.tick(60.0);
        assert!(!f.stack.is_transiting());
        assert!(gate.get());
        assert_eq!(f.tree.translation(b_layer), Vec2::ZERO);
        let a_layer = a.borrow().layer();
        assert_eq!(f.tree.translation(a_layer), Vec2::ZERO);
        assert_eq!(
            f.take(),
            ["A paint", "B paint", "B show-completed", "A hidden"]
        );

        f.tick(16.0);
        assert_eq!(f.take(), ["B paint"]);
    }

    #[test]
    fn replace_removes_old_top() {
        let mut f = Fixture::new();
        let (a, b) = (f.screen("A"), f.screen("B"));
        f.stack.push(&mut f.tree, a, Noop).unwrap();
        f.take();
        f.stack.replace(&mut f.tree, b.clone(), Noop).unwrap();
        assert_eq!(
            f.take(),
            [
                "A hide-started",
                "B added",
                "B shown",
                "B show-completed",
                "A hidden",
                "A removed"
            ]
        );
        assert_eq!(f.stack.len(), 1);
        assert!(Rc::ptr_eq(f.stack.top().unwrap(), &b));
    }

    #[test]
    fn remove_top_reveals_screen_below() {
        let mut f = Fixture::new();
        let (a, b) = (f.screen("A"), f.screen("B"));
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        f.stack.push(&mut f.tree, b.clone(), Noop).unwrap();
        f.take();
        assert!(f.stack.remove(&mut f.tree, &b, Noop).unwrap());
        assert_eq!(
            f.take(),
            [
                "B hide-started",
                "A shown",
                "A show-completed",
                "B hidden",
                "B removed"
            ]
        );
        assert!(f.attached(&a));

        assert!(f.stack.remove(&mut f.tree, &a, Noop).unwrap());
        assert_eq!(f.take(), ["A hidden", "A removed"]);
        assert!(f.stack.is_empty());
        assert!(!f.stack.remove(&mut f.tree, &a, Noop).unwrap());
    }

    #[test]
    fn pop_to_skips_intervening_screens() {
        let mut f = Fixture::new();
        let (a, b, c) = (f.screen("A"), f.screen("B"), f.screen("C"));
        for s in [&a, &b, &c] {
            f.stack.push(&mut f.tree, s.clone(), Noop).unwrap();
        }
        f.take();
        f.stack.pop_to(&mut f.tree, &a, Noop).unwrap();
        assert_eq!(
            f.take(),
            [
                "B removed",
                "C hide-started",
                "A shown",
                "A show-completed",
                "C hidden",
                "C removed"
            ]
        );
        assert_eq!(f.stack.len(), 1);

        // Already on top.
        f.stack.pop_to(&mut f.tree, &a, Noop).unwrap();
        assert!(f.take().is_empty());
    }

    #[test]
    fn remove_where_goes_bottom_up_then_top() {
        let mut f = Fixture::new();
        let (a, b, c) = (f.screen("A"), f.screen("B"), f.screen("C"));
        f.stack
            .push_all(&mut f.tree, vec![a.clone(), b.clone(), c.clone()], Noop)
            .unwrap();
        f.take();
        let keep = a.borrow().layer();
        f.stack
            .remove_where(&mut f.tree, |s| s.layer() != keep, Noop)
            .unwrap();
        assert_eq!(
            f.take(),
            [
                "B removed",
                "C hide-started",
                "A shown",
                "A show-completed",
                "C hidden",
                "C removed"
            ]
        );
        assert_eq!(f.stack.len(), 1);
    }

    #[test]
    fn find_searches_from_the_top() {
        let mut f = Fixture::new();
        let (a, b) = (f.screen("A"), f.screen("B"));
        f.stack
            .push_all(&mut f.tree, vec![a.clone(), b.clone()], Noop)
            .unwrap();
        let found = f.stack.find(|_| true).unwrap();
        assert!(Rc::ptr_eq(&found, &b));
        let a_layer = a.borrow().layer();
        let found = f.stack.find(|s| s.layer() == a_layer).unwrap();
        assert!(Rc::ptr_eq(&found, &a));
        assert!(f.stack.find(|_| false).is_none());
    }

    #[test]
    fn new_transition_completes_the_current_one() {
        let mut f = Fixture::new();
        let (a, b, c) = (f.screen("A"), f.screen("B"), f.screen("C"));
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        f.stack
            .push(&mut f.tree, b.clone(), Flip::new().duration(100.0))
            .unwrap();
        f.take();
        f.stack.push(&mut f.tree, c.clone(), Noop).unwrap();
        assert_eq!(
            f.take(),
            [
                "B show-completed",
                "A hidden",
                "B hide-started",
                "C added",
                "C shown",
                "C show-completed",
                "B hidden"
            ]
        );
        let b_layer = b.borrow().layer();
        assert_eq!(f.tree.batch(b_layer), None);
        assert!(f.stack.input().get());
    }

    #[test]
    fn failing_hooks_do_not_break_the_stack() {
        let mut f = Fixture::new();
        let a = f.make("A", true);
        let b = f.make("B", true);
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        f.stack.push(&mut f.tree, b.clone(), Noop).unwrap();
        assert_eq!(f.stack.len(), 2);
        assert!(f.attached(&b) && !f.attached(&a));
        f.stack.remove(&mut f.tree, &b, Noop).unwrap();
        assert!(f.attached(&a));
        assert!(f.stack.input().get());
    }

    #[test]
    fn zero_length_transition_completes_on_push() {
        let mut f = Fixture::new();
        let (a, b) = (f.screen("A"), f.screen("B"));
        f.stack.push(&mut f.tree, a, Noop).unwrap();
        f.stack
            .push(&mut f.tree, b, f.stack.slide().duration(0.0))
            .unwrap();
        assert!(!f.stack.is_transiting());
    }

    #[test]
    fn stack_is_a_ticker() {
        let mut f = Fixture::new();
        let a = f.screen("A");
        f.stack.push(&mut f.tree, a, Noop).unwrap();
        f.take();
        Ticker::tick(&mut f.stack, &mut f.tree, &Clock::new(0.0, 16.0)).unwrap();
        assert_eq!(f.take(), ["A paint"]);
    }

    #[test]
    fn origin_places_shown_screens() {
        let mut f = Fixture::new();
        f.stack.set_origin(Point::new(5.0, 7.0));
        let a = f.screen("A");
        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        let layer = a.borrow().layer();
        assert_eq!(f.tree.translation(layer), Vec2::new(5.0, 7.0));
    }

    #[test]
    fn flip_paints_both_screens_under_batches() {
        let mut f = Fixture::new();
        let (a, b) = (f.screen("A"), f.screen("B"));
        for (screen, key) in [(&a, 1), (&b, 2)] {
            let card = f.tree.create_layer();
            f.tree.set_size(card, Size::new(100.0, 50.0));
            f.tree.set_content(card, Content::Texture(ResourceKey(key)));
            let layer = screen.borrow().layer();
            f.tree.add_child(layer, card).unwrap();
        }
        f.stack.push(&mut f.tree, a, Noop).unwrap();
        f.stack
            .push(&mut f.tree, b, Flip::new().duration(100.0))
            .unwrap();
        f.tick(25.0);

        let mut surf = RecordingSurface::new();
        f.tree.paint(&mut surf).unwrap();
        // The incoming screen sits behind until the halfway point.
        assert_eq!(surf.textures(), [ResourceKey(2), ResourceKey(1)]);
        assert_eq!(
            surf.count(|op| matches!(op, SurfaceOp::PushBatch(_))),
            2
        );
        assert!(surf.is_balanced());

        f.tick(100.0);
        surf.clear();
        f.tree.paint(&mut surf).unwrap();
        assert_eq!(surf.textures(), [ResourceKey(2)]);
        assert_eq!(
            surf.count(|op| matches!(op, SurfaceOp::PushBatch(_))),
            0
        );
    }

    #[test]
    fn hide_closes_screen_connections() {
        struct Listening {
            layer: LayerId,
            taps: Signal<u32>,
            seen: Rc<Cell<u32>>,
            conns: Connections,
        }

        impl Screen for Listening {
            fn layer(&self) -> LayerId {
                self.layer
            }

            fn size(&self) -> Size {
                Size::new(10.0, 10.0)
            }

            fn was_shown(&mut self, _: &mut LayerTree) -> Result<(), Error> {
                let seen = Rc::clone(&self.seen);
                self.conns
                    .add(self.taps.connect(move |n| seen.set(seen.get() + n)));
                Ok(())
            }

            fn close_on_hide(&mut self) -> Option<&mut Connections> {
                Some(&mut self.conns)
            }
        }

        let mut f = Fixture::new();
        let taps = Signal::new();
        let seen = Rc::new(Cell::new(0));
        let layer = f.tree.create_group();
        let a = screen_ref(Listening {
            layer,
            taps: taps.clone(),
            seen: Rc::clone(&seen),
            conns: Connections::new(),
        });
        let b = f.screen("B");

        f.stack.push(&mut f.tree, a.clone(), Noop).unwrap();
        taps.emit(&2);
        assert_eq!(seen.get(), 2);

        f.stack.push(&mut f.tree, b, Noop).unwrap();
        taps.emit(&5);
        assert_eq!(seen.get(), 2, "hidden screen stops listening");
        assert_eq!(taps.listener_count(), 0);

        let top = f.stack.top().unwrap().clone();
        assert!(f.stack.remove(&mut f.tree, &top, Noop).unwrap());
        taps.emit(&1);
        assert_eq!(seen.get(), 3, "shown again, listening again");
    }
}
