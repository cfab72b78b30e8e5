//! The incremental text-event decoder.
//!
//! Protocol:
//! - lines are separated by `\n`; a trailing `\r` is tolerated
//! - `event: <label>` sets the pending event's label (default `message`)
//! - `data: <text>` appends the remainder to the pending payload
//! - a blank line dispatches the pending event
//! - `: <comment>` is fed to the metadata side channel, not content
//! - the reserved labels `header`, `usage`, `meta` carry metadata, not
//!   content
//! - a data line whose payload is exactly `[END]` terminates the whole
//!   stream; any buffered remainder is discarded
//!
//! Input may be split across chunks at arbitrary byte positions; a
//! partial line is buffered until its `\n` arrives, and no line is
//! parsed twice.

use crate::control::sniff_control;
use crate::usage::{apply_metadata, UsageMeter, UsageSnapshot};
use palisade_core::event::{ControlPayload, StreamEvent};

const DEFAULT_LABEL: &str = "message";
const END_SENTINEL: &str = "[END]";
const RESERVED_LABELS: [&str; 3] = ["header", "usage", "meta"];

/// Push-based decoder for one stream.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: String,
    label: Option<String>,
    payload: Option<String>,
    meter: UsageMeter,
    ended: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[END]` sentinel has been seen.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// The usage metadata collected so far.
    pub fn usage(&self) -> UsageSnapshot {
        self.meter.snapshot()
    }

    /// Feed one raw chunk; returns the events it completed, in order.
    pub fn push(&mut self, chunk: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.ended {
            return events;
        }

        self.buffer.push_str(chunk);
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            self.process_line(line, &mut events);
            if self.ended {
                self.buffer.clear();
                break;
            }
        }
        events
    }

    /// Flush at end of input: a dangling unterminated line is treated
    /// as complete, and a pending event is dispatched.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.ended {
            return events;
        }

        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(line.trim_end_matches('\r'), &mut events);
        }
        if !self.ended {
            self.dispatch(&mut events);
        }
        events
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        if line.is_empty() {
            self.dispatch(events);
            return;
        }

        if let Some(rest) = line.strip_prefix("event:") {
            self.label = Some(rest.trim().to_string());
            return;
        }

        if let Some(comment) = line.strip_prefix(':') {
            apply_metadata(&mut self.meter, comment);
            return;
        }

        if let Some(rest) = line.strip_prefix("data:") {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            if rest == END_SENTINEL {
                self.payload = None;
                self.label = None;
                self.ended = true;
                events.push(StreamEvent::End);
                return;
            }
            self.payload.get_or_insert_with(String::new).push_str(rest);
        }

        // anything else is an unknown field; skipped without re-parsing
    }

    /// Dispatch the pending event, if any, and reset to defaults.
    fn dispatch(&mut self, events: &mut Vec<StreamEvent>) {
        let label = self.label.take().unwrap_or_else(|| DEFAULT_LABEL.into());
        let Some(payload) = self.payload.take() else {
            return;
        };

        if RESERVED_LABELS.contains(&label.as_str()) {
            apply_metadata(&mut self.meter, &payload);
            return;
        }

        if label == DEFAULT_LABEL {
            // an inline JSON object carrying guardrail keys is control,
            // everything else is answer text
            match sniff_control(&payload) {
                Some(control) => events.push(StreamEvent::Control { payload: control }),
                None => events.push(StreamEvent::Content { payload }),
            }
            return;
        }

        // explicitly labeled control event
        let control = sniff_control(&payload).unwrap_or(ControlPayload {
            level: "warn".into(),
            code: Some(label),
            message: payload,
        });
        events.push(StreamEvent::Control { payload: control });
    }
}
