// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Phases become duration slices at their timer readings. Events that carry
/// no timer reading (frame starts, dispatches, summaries) are placed at the
/// most recent reading seen so far.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_us = 0_u64;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": last_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "tick_ms": e.tick,
                        "dt_ms": e.dt,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last_us = e.timestamp_us;
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                last_us = e.timestamp_us;
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::Dispatch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Dispatch",
                    "cat": "Input",
                    "ts": last_us,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "events": e.event_count,
                        "active": e.active,
                        "failed": e.failed,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": last_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "layers": s.layer_count,
                        "transforms": s.transforms,
                        "visuals": s.visuals,
                        "contents": s.contents,
                        "added": s.added,
                        "removed": s.removed,
                        "released": s.released,
                        "animate_us": s.animate_us,
                        "evaluate_us": s.evaluate_us,
                        "paint_us": s.paint_us,
                    }
                }));
            }
            RecordedEvent::LayerChangesCount { frame_index, count } => {
                events.push(json!({
                    "ph": "i",
                    "name": "LayerChanges",
                    "cat": "Rich",
                    "ts": last_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": frame_index,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
