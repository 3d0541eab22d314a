// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Layer changes ([`on_layer_changes`](TraceSink::on_layer_changes)) store
//! only the count.

use tableau_core::trace::{
    DispatchEvent, FrameBeginEvent, FrameSummary, LayerChange, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_DISPATCH: u8 = 4;
const TAG_FRAME_SUMMARY: u8 = 5;
const TAG_LAYER_CHANGES_COUNT: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "there are four phases"
        )]
        self.write_u8(p.index() as u8);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_f64(e.tick);
        self.write_f64(e.dt);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp_us);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp_us);
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        self.write_u8(TAG_DISPATCH);
        self.write_u64(e.frame_index);
        self.write_u32(e.event_count);
        self.write_u32(e.active);
        self.write_u8(u8::from(e.failed));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_f64(s.tick);
        self.write_f64(s.dt);
        for count in [
            s.layer_count,
            s.transforms,
            s.visuals,
            s.contents,
            s.added,
            s.removed,
            s.released,
        ] {
            self.write_u32(count);
        }
        self.write_u64(s.animate_us);
        self.write_u64(s.evaluate_us);
        self.write_u64(s.paint_us);
    }

    fn on_layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        self.write_u8(TAG_LAYER_CHANGES_COUNT);
        self.write_u64(frame_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "layer change count capped at u32::MAX for recording"
        )]
        self.write_u32(changes.len().min(u32::MAX as usize) as u32);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`DispatchEvent`].
    Dispatch(DispatchEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Layer-change count for a frame.
    LayerChangesCount {
        /// Frame counter.
        frame_index: u64,
        /// Number of layer changes.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        PhaseKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            tick: self.read_f64()?,
            dt: self.read_f64()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp_us: self.read_u64()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp_us: self.read_u64()?,
        }))
    }

    fn decode_dispatch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Dispatch(DispatchEvent {
            frame_index: self.read_u64()?,
            event_count: self.read_u32()?,
            active: self.read_u32()?,
            failed: self.read_u8()? != 0,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            tick: self.read_f64()?,
            dt: self.read_f64()?,
            layer_count: self.read_u32()?,
            transforms: self.read_u32()?,
            visuals: self.read_u32()?,
            contents: self.read_u32()?,
            added: self.read_u32()?,
            removed: self.read_u32()?,
            released: self.read_u32()?,
            animate_us: self.read_u64()?,
            evaluate_us: self.read_u64()?,
            paint_us: self.read_u64()?,
        }))
    }

    fn decode_layer_changes_count(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::LayerChangesCount { frame_index, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_DISPATCH => self.decode_dispatch(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_LAYER_CHANGES_COUNT => self.decode_layer_changes_count(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_core::trace::{FrameSummaryBuilder, LayerField};

    fn sample_begin() -> FrameBeginEvent {
        FrameBeginEvent {
            frame_index: 7,
            tick: 116.5,
            dt: 16.5,
        }
    }

    fn sample_summary() -> FrameSummary {
        let mut builder = FrameSummaryBuilder::new(&sample_begin());
        builder.phase_begin(PhaseKind::Animate, 100);
        builder.phase_end(PhaseKind::Animate, 180);
        builder.phase_begin(PhaseKind::Paint, 200);
        builder.phase_end(PhaseKind::Paint, 1_700);
        builder.finish()
    }

    #[test]
    fn recording_decodes_in_order() {
        let mut rec = RecorderSink::new();
        let begin = sample_begin();
        let phase_begin = PhaseBeginEvent {
            frame_index: 7,
            phase: PhaseKind::Evaluate,
            timestamp_us: 2_000,
        };
        let phase_end = PhaseEndEvent {
            frame_index: 7,
            phase: PhaseKind::Evaluate,
            timestamp_us: 2_300,
        };
        let dispatch = DispatchEvent {
            frame_index: 7,
            event_count: 3,
            active: 1,
            failed: true,
        };
        let summary = sample_summary();
        rec.on_frame_begin(&begin);
        rec.on_phase_begin(&phase_begin);
        rec.on_phase_end(&phase_end);
        rec.on_dispatch(&dispatch);
        rec.on_frame_summary(&summary);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [
                RecordedEvent::FrameBegin(begin),
                RecordedEvent::PhaseBegin(phase_begin),
                RecordedEvent::PhaseEnd(phase_end),
                RecordedEvent::Dispatch(dispatch),
                RecordedEvent::FrameSummary(summary),
            ]
        );
    }

    #[test]
    fn every_phase_survives_recording() {
        let mut rec = RecorderSink::new();
        for phase in PhaseKind::ALL {
            rec.on_phase_end(&PhaseEndEvent {
                frame_index: 0,
                phase,
                timestamp_us: 0,
            });
        }
        let phases: Vec<_> = decode(rec.as_bytes())
            .map(|e| match e {
                RecordedEvent::PhaseEnd(e) => e.phase,
                other => panic!("expected PhaseEnd, got {other:?}"),
            })
            .collect();
        assert_eq!(phases, PhaseKind::ALL);
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&sample_begin());
        rec.on_frame_summary(&sample_summary());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 4]).collect();
        assert_eq!(events, [RecordedEvent::FrameBegin(sample_begin())]);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        assert_eq!(decode(&[0xEE, 1, 2, 3]).count(), 0);
    }

    #[test]
    fn layer_changes_count() {
        let mut rec = RecorderSink::new();
        let changes = vec![
            LayerChange {
                layer_index: 0,
                field: LayerField::Transform,
            },
            LayerChange {
                layer_index: 1,
                field: LayerField::Visual,
            },
        ];
        rec.on_layer_changes(42, &changes);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [RecordedEvent::LayerChangesCount {
                frame_index: 42,
                count: 2
            }]
        );
    }
}
