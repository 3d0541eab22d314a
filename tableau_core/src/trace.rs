// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`FrameLoop`](crate::frame::FrameLoop) calls at each stage. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Phase timestamps come from the frame loop's
//! [timer](crate::frame::FrameLoop::with_timer) in microseconds.
//! [`FrameSummaryBuilder`] collects them during a frame and produces a
//! [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`LayerChange`] events plus the
//!   corresponding `TraceSink` method.

use crate::layer::FrameChanges;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the frame loop is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Tickers (animators, screen stacks) and the paint signal.
    Animate,
    /// Layer tree evaluation (dirty propagation, world transforms).
    Evaluate,
    /// Painting the tree into a surface.
    Paint,
    /// Routing input events to listeners.
    Dispatch,
}

impl PhaseKind {
    /// All phases, in frame order.
    pub const ALL: [Self; 4] = [Self::Animate, Self::Evaluate, Self::Paint, Self::Dispatch];

    /// Maps a phase to an array index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Animate => 0,
            Self::Evaluate => 1,
            Self::Paint => 2,
            Self::Dispatch => 3,
        }
    }
}

/// What happened to a layer during a frame.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerField {
    /// World transform changed.
    Transform,
    /// Effective alpha or tint changed.
    Visual,
    /// Content, batch or size changed.
    Content,
    /// The layer became invisible.
    Hidden,
    /// The layer became visible.
    Unhidden,
    /// The layer entered the added state.
    Added,
    /// The layer left the added state.
    Removed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Clock time in milliseconds.
    pub tick: f64,
    /// Milliseconds since the previous frame.
    pub dt: f64,
}

/// Marks the beginning of a frame-loop phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Timer reading at the start of the phase, in microseconds.
    pub timestamp_us: u64,
}

/// Marks the end of a frame-loop phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Timer reading at the end of the phase, in microseconds.
    pub timestamp_us: u64,
}

/// Emitted after a batch of input events was dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchEvent {
    /// Index of the most recent frame.
    pub frame_index: u64,
    /// Number of events in the batch.
    pub event_count: u32,
    /// Gestures still in progress afterwards.
    pub active: u32,
    /// Whether a listener failed.
    pub failed: bool,
}

/// Per-frame summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Clock time in milliseconds.
    pub tick: f64,
    /// Milliseconds since the previous frame.
    pub dt: f64,
    /// Live layers after evaluation.
    pub layer_count: u32,
    /// Layers whose world transform changed.
    pub transforms: u32,
    /// Layers whose effective alpha or tint changed.
    pub visuals: u32,
    /// Layers whose content changed.
    pub contents: u32,
    /// Layers that entered the added state.
    pub added: u32,
    /// Layers that left the added state.
    pub removed: u32,
    /// Resources released by disposed layers.
    pub released: u32,
    /// Animate phase duration in microseconds (0 if not measured).
    pub animate_us: u64,
    /// Evaluate phase duration in microseconds (0 if not measured).
    pub evaluate_us: u64,
    /// Paint phase duration in microseconds (0 if not measured).
    pub paint_us: u64,
}

/// A per-frame layer change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerChange {
    /// Slot index of the layer that changed.
    pub layer_index: u32,
    /// What changed.
    pub field: LayerField,
}

/// Flattens [`FrameChanges`] into per-layer change records.
#[cfg(feature = "trace-rich")]
#[must_use]
pub fn layer_changes(changes: &FrameChanges) -> alloc::vec::Vec<LayerChange> {
    let lists: [(&[u32], LayerField); 7] = [
        (&changes.transforms, LayerField::Transform),
        (&changes.visuals, LayerField::Visual),
        (&changes.contents, LayerField::Content),
        (&changes.hidden, LayerField::Hidden),
        (&changes.unhidden, LayerField::Unhidden),
        (&changes.added, LayerField::Added),
        (&changes.removed, LayerField::Removed),
    ];
    lists
        .iter()
        .flat_map(|(idxs, field)| {
            idxs.iter().map(|&layer_index| LayerChange {
                layer_index,
                field: *field,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame-loop phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame-loop phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after an input batch was dispatched.
    fn on_dispatch(&mut self, e: &DispatchEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with per-frame layer changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        _ = (frame_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns whether events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DispatchEvent`].
    #[inline]
    pub fn dispatch(&mut self, e: &DispatchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_dispatch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits layer changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        if let Some(s) = &mut self.sink {
            s.on_layer_changes(frame_index, changes);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    begin: FrameBeginEvent,
    phase_starts: [Option<u64>; 4],
    phase_ends: [Option<u64>; 4],
    layer_count: u32,
    counts: [u32; 6],
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given frame.
    #[must_use]
    pub fn new(begin: &FrameBeginEvent) -> Self {
        Self {
            begin: *begin,
            phase_starts: [None; 4],
            phase_ends: [None; 4],
            layer_count: 0,
            counts: [0; 6],
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, timestamp_us: u64) {
        self.phase_starts[phase.index()] = Some(timestamp_us);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, timestamp_us: u64) {
        self.phase_ends[phase.index()] = Some(timestamp_us);
    }

    /// Records the evaluated changes and the live layer count.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "per-frame change counts fit in u32"
    )]
    pub fn set_changes(&mut self, changes: &FrameChanges, layer_count: usize) {
        self.layer_count = layer_count as u32;
        self.counts = [
            changes.transforms.len() as u32,
            changes.visuals.len() as u32,
            changes.contents.len() as u32,
            changes.added.len() as u32,
            changes.removed.len() as u32,
            changes.released.len() as u32,
        ];
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        let [transforms, visuals, contents, added, removed, released] = self.counts;
        FrameSummary {
            frame_index: self.begin.frame_index,
            tick: self.begin.tick,
            dt: self.begin.dt,
            layer_count: self.layer_count,
            transforms,
            visuals,
            contents,
            added,
            removed,
            released,
            animate_us: self.phase_duration(PhaseKind::Animate),
            evaluate_us: self.phase_duration(PhaseKind::Evaluate),
            paint_us: self.phase_duration(PhaseKind::Paint),
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase.index();
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
