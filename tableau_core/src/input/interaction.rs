// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-gesture dispatch state.

use kurbo::Point;

use super::event::{EventKind, InputEvent};
use crate::error::Error;
use crate::layer::{LayerId, LayerTree};

/// Which layers keep receiving a captured interaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CaptureMode {
    /// Only the capturing layer.
    #[default]
    Only,
    /// The capturing layer and its ancestors.
    Above,
    /// The capturing layer and its descendants.
    Below,
}

/// Position of a layer on the bubble path relative to the capturing layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Depth {
    Below,
    At,
    Above,
}

impl CaptureMode {
    fn allows(self, depth: Depth) -> bool {
        match self {
            Self::Only => depth == Depth::At,
            Self::Above => depth != Depth::Below,
            Self::Below => depth != Depth::Above,
        }
    }
}

/// One gesture as seen by layer listeners.
///
/// An interaction starts when a [`Start`](EventKind::Start) event hits a
/// layer and lives until the gesture ends. Each event is offered to the hit
/// layer and, when bubbling, to each of its ancestors in turn.
///
/// Listeners may [`capture`](Self::capture) or [`cancel`](Self::cancel) the
/// interaction. Either request takes effect when the requesting listener
/// returns: every other listener on the path that should no longer see the
/// gesture receives a [`Cancel`](EventKind::Cancel) event. Requests made
/// while handling such a cancel notification are ignored.
#[derive(Debug)]
pub struct Interaction {
    hit: LayerId,
    bubble: bool,
    event: InputEvent,
    local: Point,
    dispatch_layer: Option<LayerId>,
    capturing: Option<LayerId>,
    capture_mode: Option<CaptureMode>,
    canceled: bool,
    pending_capture: bool,
    pending_cancel: bool,
    notifying: bool,
}

impl Interaction {
    pub(crate) fn new(hit: LayerId, bubble: bool, event: InputEvent) -> Self {
        Self {
            hit,
            bubble,
            event,
            local: Point::ORIGIN,
            dispatch_layer: None,
            capturing: None,
            capture_mode: None,
            canceled: false,
            pending_capture: false,
            pending_cancel: false,
            notifying: false,
        }
    }

    /// Returns the event being dispatched.
    #[must_use]
    pub fn event(&self) -> &InputEvent {
        &self.event
    }

    /// Returns the kind of the event being dispatched.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.event.kind
    }

    /// Returns the layer hit by the starting event.
    #[must_use]
    pub fn hit_layer(&self) -> LayerId {
        self.hit
    }

    /// Returns the layer whose listeners are currently being called.
    #[must_use]
    pub fn dispatch_layer(&self) -> Option<LayerId> {
        self.dispatch_layer
    }

    /// Returns the event position in the hit layer's coordinate space.
    #[must_use]
    pub fn local(&self) -> Point {
        self.local
    }

    /// Returns whether events bubble to the hit layer's ancestors.
    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.bubble
    }

    /// Returns whether a layer has captured this interaction.
    #[must_use]
    pub fn captured(&self) -> bool {
        self.capturing.is_some()
    }

    /// Returns the capturing layer, if any.
    #[must_use]
    pub fn captured_by(&self) -> Option<LayerId> {
        self.capturing
    }

    /// Returns the capture mode, if captured.
    #[must_use]
    pub fn capture_mode(&self) -> Option<CaptureMode> {
        self.capture_mode
    }

    /// Returns whether this interaction was canceled.
    #[must_use]
    pub fn canceled(&self) -> bool {
        self.canceled
    }

    /// Captures this interaction for the current dispatch layer.
    ///
    /// Subsequent events go only to the layers `mode` allows. The other
    /// layers on the path receive a cancel event once the current listener
    /// returns. Recapturing from the capturing layer changes the mode.
    ///
    /// # Panics
    ///
    /// Panics if called outside of dispatch, if the interaction was
    /// canceled, or if another layer already captured it.
    pub fn capture(&mut self, mode: CaptureMode) {
        let Some(layer) = self.dispatch_layer else {
            panic!("capture() called outside of interaction dispatch");
        };
        if self.notifying {
            return;
        }
        assert!(!self.canceled, "cannot capture a canceled interaction");
        if let Some(owner) = self.capturing {
            assert!(owner == layer, "interaction already captured by {owner:?}");
        }
        self.capturing = Some(layer);
        self.capture_mode = Some(mode);
        self.pending_capture = true;
    }

    /// Cancels this interaction.
    ///
    /// Every layer on the path receives a cancel event once the current
    /// listener returns, and later events of the gesture are ignored.
    /// Canceling twice is a no-op.
    pub fn cancel(&mut self) {
        if self.canceled || self.notifying {
            return;
        }
        self.canceled = true;
        self.pending_cancel = true;
    }

    /// Cancels immediately, outside of any listener.
    pub(crate) fn cancel_now(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        if self.canceled {
            return Ok(());
        }
        self.canceled = true;
        self.notify_cancel(tree, None, None)
    }

    /// Delivers `event` along the path.
    pub(crate) fn dispatch(&mut self, tree: &mut LayerTree, event: InputEvent) -> Result<(), Error> {
        if self.canceled || !tree.is_alive(self.hit) {
            return Ok(());
        }
        match tree.screen_to_layer(self.hit, event.point()) {
            Ok(local) => self.local = local,
            Err(err) => log::debug!("interaction local point unchanged: {err}"),
        }
        self.event = event;

        if !self.bubble {
            return self.dispatch_to(tree, self.hit);
        }
        let mut depth = Depth::Below;
        let mut target = Some(self.hit);
        while let Some(layer) = target {
            if Some(layer) == self.capturing {
                depth = Depth::At;
            } else if depth == Depth::At {
                depth = Depth::Above;
            }
            if self.capture_mode.is_none_or(|mode| mode.allows(depth)) {
                self.dispatch_to(tree, layer)?;
                if self.canceled {
                    break;
                }
                // The listener may have just captured.
                if Some(layer) == self.capturing {
                    depth = Depth::At;
                }
            }
            if !tree.is_alive(layer) {
                break;
            }
            target = tree.parent(layer);
        }
        Ok(())
    }

    /// Sends a cancel event to every layer on the path except those that
    /// `except_mode` keeps relative to `except`.
    fn notify_cancel(
        &mut self,
        tree: &mut LayerTree,
        except: Option<LayerId>,
        except_mode: Option<CaptureMode>,
    ) -> Result<(), Error> {
        let saved = self.event;
        self.event = saved.to_cancel();
        self.notifying = true;
        let result = self.notify_path(tree, except, except_mode);
        self.notifying = false;
        self.event = saved;
        result
    }

    fn notify_path(
        &mut self,
        tree: &mut LayerTree,
        except: Option<LayerId>,
        except_mode: Option<CaptureMode>,
    ) -> Result<(), Error> {
        if !self.bubble {
            if Some(self.hit) != except && tree.is_alive(self.hit) {
                self.dispatch_to(tree, self.hit)?;
            }
            return Ok(());
        }
        let mut depth = Depth::Below;
        let mut target = tree.is_alive(self.hit).then_some(self.hit);
        while let Some(layer) = target {
            if Some(layer) == except {
                depth = Depth::At;
            } else if depth == Depth::At {
                depth = Depth::Above;
            }
            if !except_mode.is_some_and(|mode| mode.allows(depth)) {
                self.dispatch_to(tree, layer)?;
            }
            if !tree.is_alive(layer) {
                break;
            }
            target = tree.parent(layer);
        }
        Ok(())
    }

    /// Calls every listener attached to `layer`, applying capture and cancel
    /// requests after each one.
    fn dispatch_to(&mut self, tree: &mut LayerTree, layer: LayerId) -> Result<(), Error> {
        if !tree.has_listeners(layer) {
            return Ok(());
        }
        let outer = self.dispatch_layer.replace(layer);
        let result = self.call_listeners(tree, layer);
        self.dispatch_layer = outer;
        result
    }

    fn call_listeners(&mut self, tree: &mut LayerTree, layer: LayerId) -> Result<(), Error> {
        for listener in tree.listeners(layer) {
            let Ok(mut listener) = listener.try_borrow_mut() else {
                // Already handling an outer event of this gesture.
                continue;
            };
            let result = listener.on_interaction(tree, self);
            drop(listener);
            self.dispatch_layer = Some(layer);
            let applied = self.apply_requests(tree);
            result?;
            applied?;
            if !tree.is_alive(layer) {
                break;
            }
        }
        Ok(())
    }

    fn apply_requests(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        let capture = core::mem::take(&mut self.pending_capture);
        let cancel = core::mem::take(&mut self.pending_cancel);
        if self.notifying {
            return Ok(());
        }
        if capture && !self.canceled {
            self.notify_cancel(tree, self.capturing, self.capture_mode)?;
        }
        if cancel {
            self.notify_cancel(tree, None, None)?;
        }
        Ok(())
    }
}
