// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch and pointer input dispatch.
//!
//! Platform code feeds [`InputEvent`]s to a [`Dispatcher`]. The first event
//! of a gesture is hit-tested against the live [`LayerTree`](crate::layer::LayerTree);
//! the resulting [`Interaction`] then carries every later event of that
//! gesture to the hit layer and, when bubbling, its ancestors. Listeners
//! implement [`InteractionListener`] and may [`capture`](Interaction::capture)
//! or [`cancel`](Interaction::cancel) the gesture.

mod dispatcher;
mod event;
mod interaction;
mod listener;

pub use dispatcher::Dispatcher;
pub use event::{EventKind, InputEvent};
pub use interaction::{CaptureMode, Interaction};
pub use listener::{InteractionListener, ListenerRef};
