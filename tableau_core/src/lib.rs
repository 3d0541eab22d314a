// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode layer tree, signals, and input dispatch for 2D scenes.
//!
//! `tableau_core` provides the scene graph that games and UIs draw through.
//! It is `no_std` compatible (with `alloc`) and stores layers in
//! struct-of-arrays form addressed by generational handles.
//!
//! # Architecture
//!
//! Everything runs on one frame-loop thread. Each frame a clock tick drives
//! the registered tickers (animators, screen stacks), then the tree is
//! evaluated and painted. Input is dispatched independently against the
//! live tree:
//!
//! ```text
//!   Clock ──► FrameLoop::frame()
//!                 │
//!                 ├──► Ticker::tick()  (mutates layer properties)
//!                 ├──► Signal<Clock>::emit()
//!                 ├──► LayerTree::evaluate() ──► FrameChanges
//!                 └──► LayerTree::paint() ──► Surface
//!
//!   [InputEvent] ──► Dispatcher ──► hit_test() ──► InteractionListener
//! ```
//!
//! **[`signal`]**: Single-threaded publish/subscribe with [`Signal`](signal::Signal),
//! reactive [`Value`](signal::Value) cells, and [`Connection`](signal::Connection)s.
//!
//! **[`layer`]**: The layer tree. Depth-sorted children, lifecycle hooks that
//! may restructure the tree, clipped painting, and hit testing.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`, drained
//! by [`LayerTree::evaluate`](layer::LayerTree::evaluate).
//!
//! **[`surface`]**: The [`Surface`](surface::Surface) trait that graphics
//! backends implement, plus [`Painter`](surface::Painter) for custom content.
//!
//! **[`input`]**: Raw input events, bubbling [`Interaction`](input::Interaction)s,
//! and the per-gesture [`Dispatcher`](input::Dispatcher).
//!
//! **[`frame`]**: [`Clock`](frame::Clock), the [`Ticker`](frame::Ticker)
//! trait, and the [`FrameLoop`](frame::FrameLoop) that orders a frame.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-layer
//!   change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod error;
pub mod frame;
pub mod input;
pub mod layer;
pub mod signal;
pub mod surface;
pub mod tint;
pub mod trace;

pub use error::Error;
