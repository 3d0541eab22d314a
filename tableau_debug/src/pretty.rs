// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output and layer tree dumps.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).
//! [`dump_tree`] writes an indented outline of a [`LayerTree`].

use std::io::{self, Write};

use tableau_core::layer::{Content, LayerId, LayerKind, LayerTree};
use tableau_core::trace::{
    DispatchEvent, FrameBeginEvent, FrameSummary, LayerChange, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Animate => "animate",
        PhaseKind::Evaluate => "eval",
        PhaseKind::Paint => "paint",
        PhaseKind::Dispatch => "dispatch",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} tick={:.1}ms dt={:.1}ms",
            e.frame_index, e.tick, e.dt,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {}µs",
            e.frame_index,
            phase_name(e.phase),
            e.timestamp_us,
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {}µs",
            e.frame_index,
            phase_name(e.phase),
            e.timestamp_us,
        );
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        let status = if e.failed { "FAILED" } else { "ok" };
        let _ = writeln!(
            self.writer,
            "[dispatch] frame={} events={} active={} {status}",
            e.frame_index, e.event_count, e.active,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} layers={} animate={}µs eval={}µs paint={}µs \
             transforms={} visuals={} contents={} added={} removed={} released={}",
            s.frame_index,
            s.layer_count,
            s.animate_us,
            s.evaluate_us,
            s.paint_us,
            s.transforms,
            s.visuals,
            s.contents,
            s.added,
            s.removed,
            s.released,
        );
    }

    fn on_layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        let _ = writeln!(
            self.writer,
            "[layers] frame={frame_index} changes={}",
            changes.len(),
        );
    }
}

/// Writes an indented outline of the layers reachable from `tree`'s root.
///
/// Each line shows the layer handle, name, kind, translation, depth, alpha
/// and content. Hidden layers are marked.
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn dump_tree(tree: &LayerTree, writer: &mut dyn Write) -> io::Result<()> {
    dump_layer(tree, tree.root(), 0, writer)
}

fn dump_layer(
    tree: &LayerTree,
    id: LayerId,
    indent: usize,
    writer: &mut dyn Write,
) -> io::Result<()> {
    let kind = match tree.kind(id) {
        LayerKind::Leaf => "leaf",
        LayerKind::Group { clip: false } => "group",
        LayerKind::Group { clip: true } => "clipped",
    };
    let content = match tree.content(id) {
        Content::None => String::new(),
        Content::Texture(key) => format!(" texture={}", key.0),
        Content::Painter(_) => String::from(" painter"),
    };
    let hidden = if tree.visible(id) { "" } else { " hidden" };
    let t = tree.translation(id);
    writeln!(
        writer,
        "{:indent$}{id:?} {:?} {kind} at ({}, {}) depth={} alpha={}{content}{hidden}",
        "",
        tree.name(id).unwrap_or(""),
        t.x,
        t.y,
        tree.depth(id),
        tree.alpha(id),
        indent = indent * 2,
    )?;
    for child in tree.children(id) {
        dump_layer(tree, child, indent + 1, writer)?;
    }
    Ok(())
}
