//! Diagnostic modules for pointer testing

mod timing;

pub use calibration::{
    parse_distance, parse_resolution, CalibrationPhase, CalibrationSession, MeasureError,
};
pub use polling::{PhysicalSummary, PollSample, PollingOutcome, PollingPhase, PollingSession, PollingSummary};
pub use timing::{ButtonTimingTest, ClickDuration, EventLogFormatter};

use crate::mouse::MouseEvent;

/// Common trait for all pointer diagnostics
pub trait MouseTest {
    /// Name of the diagnostic
    fn name(&self) -> &'static str;

    /// Short description
    fn description(&self) -> &'static str;

    /// Process a pointer event
    fn process_event(&mut self, event: &MouseEvent);

    /// Check if the diagnostic has reached a terminal state
    fn is_complete(&self) -> bool;

    /// Get results as formatted strings
    fn get_results(&self) -> Vec<TestResult>;

    /// Reset the diagnostic
    fn reset(&mut self);
}

/// A single result entry
#[derive(Debug, Clone)]
pub struct TestResult {
    pub label: String,
    pub value: String,
    pub status: ResultStatus,
}

impl TestResult {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Warning)
    }

    pub fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Error)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Info)
    }
}

/// Status of a test result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Warning,
    Error,
    Info,
}
