// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for tableau
//! diagnostics.
//!
//! This crate provides [`TraceSink`](tableau_core::trace::TraceSink)
//! implementations for development and post-mortem analysis, plus a
//! recording [`Surface`](tableau_core::surface::Surface):
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output,
//!   and [`pretty::dump_tree`] for an outline of a layer tree.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`surface::RecordingSurface`]: captures painted frames as
//!   [`surface::SurfaceOp`] lists.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod surface;
