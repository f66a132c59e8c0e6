//! Raw event trace capture and CSV export

use crate::mouse::MouseEvent;
use std::fs;
use std::io;
use std::path::Path;

/// CSV header of an exported trace.
pub const CSV_HEADER: &str = "Timestamp_ms,Dx,Dy";

/// One recorded motion report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub timestamp_ms: u64,
    pub dx: i16,
    pub dy: i16,
}

/// Appends every event while recording, unfiltered and unbounded.
///
/// Export is a verbatim arrival-ordered dump; nothing is aggregated.
pub struct TraceRecorder {
    recording: bool,
    records: Vec<TraceRecord>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self {
            recording: false,
            records: Vec::new(),
        }
    }

    /// Begin recording, discarding any previous trace.
    pub fn start(&mut self) {
        self.records.clear();
        self.recording = true;
    }

    pub fn stop(&mut self) {
        self.recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Append one event if recording is active.
    pub fn record(&mut self, event: &MouseEvent) {
        if self.recording {
            self.records.push(TraceRecord {
                timestamp_ms: event.timestamp_ms,
                dx: event.dx,
                dy: event.dy,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Render the trace as CSV, header first, one line per record.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        for record in &self.records {
            csv.push('\n');
            csv.push_str(&format!("{},{},{}", record.timestamp_ms, record.dx, record.dy));
        }
        csv
    }

    /// Write the CSV dump to a file.
    pub fn export_csv(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_csv())
    }
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new()
    }
}
