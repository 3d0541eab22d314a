// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-threaded publish/subscribe primitives.
//!
//! A [`Signal`] is a cheap, cloneable handle to a shared listener list.
//! Listeners are called in connection order. Each [`emit`](Signal::emit)
//! works from a snapshot of the list taken when the emission starts:
//!
//! - a listener connected during an emission is not called by it;
//! - a listener disconnected during an emission is skipped if it has not run
//!   yet;
//! - a listener that re-enters its own signal does not receive the nested
//!   emission (it is already running).
//!
//! [`Connection`]s are explicit. Dropping one leaves the listener connected;
//! call [`disconnect`](Connection::disconnect), or collect several in a
//! [`Connections`] bag and close them together.
//!
//! [`Value`] layers change notification over a shared cell and only notifies
//! when the stored value actually changes.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

struct Slot<T> {
    live: Rc<Cell<bool>>,
    once: bool,
    func: RefCell<Box<dyn FnMut(&T)>>,
}

/// A multicast event source.
pub struct Signal<T> {
    slots: Rc<RefCell<Vec<Rc<Slot<T>>>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field(
                "listeners",
                &self.slots.borrow().iter().filter(|s| s.live.get()).count(),
            )
            .finish()
    }
}

impl<T: 'static> Signal<T> {
    /// Creates a signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a listener that is called on every emission until
    /// disconnected.
    pub fn connect(&self, f: impl FnMut(&T) + 'static) -> Connection {
        self.push(f, false)
    }

    /// Connects a listener that is disconnected right before its first call.
    pub fn connect_once(&self, f: impl FnMut(&T) + 'static) -> Connection {
        self.push(f, true)
    }

    /// Delivers `value` to every connected listener, in connection order.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Rc<Slot<T>>> = self.slots.borrow().clone();
        let mut pruned = false;
        for slot in &snapshot {
            if !slot.live.get() {
                pruned = true;
                continue;
            }
            if slot.once {
                slot.live.set(false);
                pruned = true;
            }
            // A listener that is already running is re-entering this signal.
            let Ok(mut func) = slot.func.try_borrow_mut() else {
                continue;
            };
            func(value);
        }
        if pruned {
            self.prune();
        }
    }

    /// Returns whether at least one listener is connected.
    #[must_use]
    pub fn has_connections(&self) -> bool {
        self.listener_count() > 0
    }

    /// Returns the number of connected listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.slots.borrow().iter().filter(|s| s.live.get()).count()
    }

    /// Disconnects every listener.
    pub fn clear(&self) {
        let slots = core::mem::take(&mut *self.slots.borrow_mut());
        for slot in slots {
            slot.live.set(false);
        }
    }

    fn push(&self, f: impl FnMut(&T) + 'static, once: bool) -> Connection {
        let live = Rc::new(Cell::new(true));
        self.prune();
        self.slots.borrow_mut().push(Rc::new(Slot {
            live: Rc::clone(&live),
            once,
            func: RefCell::new(Box::new(f)),
        }));
        Connection { live }
    }

    fn prune(&self) {
        self.slots.borrow_mut().retain(|s| s.live.get());
    }
}

/// The link between a [`Signal`] and one listener.
pub struct Connection {
    live: Rc<Cell<bool>>,
}

impl Connection {
    /// Stops further deliveries to the listener. Calling this twice is a
    /// no-op.
    pub fn disconnect(&self) {
        self.live.set(false);
    }

    /// Returns whether the listener is still connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.live.get()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// A bag of connections that are closed together.
#[derive(Debug, Default)]
pub struct Connections {
    conns: Vec<Connection>,
}

impl Connections {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the bag.
    pub fn add(&mut self, conn: Connection) {
        self.conns.push(conn);
    }

    /// Returns the number of connections held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conns.len()
    }

    /// Returns whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    /// Disconnects and forgets every held connection.
    pub fn close(&mut self) {
        for conn in self.conns.drain(..) {
            conn.disconnect();
        }
    }
}

struct ValueInner<T> {
    value: RefCell<T>,
    changed: Signal<(T, T)>,
}

/// A shared, observable value.
///
/// Clones share the same cell. Listeners receive `(new, old)` whenever
/// [`update`](Self::update) stores a value that differs from the current one.
pub struct Value<T> {
    inner: Rc<ValueInner<T>>,
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("value", &*self.inner.value.borrow())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq + 'static> Value<T> {
    /// Creates a value cell.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ValueInner {
                value: RefCell::new(value),
                changed: Signal::new(),
            }),
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Stores `value`, notifying listeners if it differs from the current
    /// value. Returns the previous value.
    pub fn update(&self, value: T) -> T {
        let old = self.inner.value.replace(value.clone());
        if old != value {
            self.inner.changed.emit(&(value, old.clone()));
        }
        old
    }

    /// Connects a listener called with `(new, old)` on every change.
    pub fn connect(&self, mut f: impl FnMut(&T, &T) + 'static) -> Connection {
        self.inner.changed.connect(move |(new, old)| f(new, old))
    }
}
