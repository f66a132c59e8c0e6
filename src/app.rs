//! Application state and per-event fan-out
//!
//! One `App` owns every consumer of the normalized event stream. Events
//! arrive on a single thread and are handed to each consumer in order
//! within the same call, so none of the accumulators need locking.

use crate::config::Config;
use crate::mouse::MouseEvent;
use crate::report::SessionReport;
use crate::tests::{
    ButtonTimingTest, CalibrationSession, EventLogFormatter, MeasureError, MouseTest,
    PhysicalSummary, PollingOutcome, PollingSession, TestResult,
};
use crate::trace::TraceRecorder;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Paused,
    Quitting,
}

/// Main application
pub struct App {
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    /// Polling rate session
    pub polling: PollingSession,
    /// Button timing diagnostic
    pub buttons: ButtonTimingTest,
    /// Raw event trace recorder
    pub trace: TraceRecorder,
    /// Active DPI calibration, if any
    pub calibration: Option<CalibrationSession>,
    /// Event log line rendering
    pub formatter: EventLogFormatter,
    /// Most-recent-first event log, bounded by config
    pub event_log: VecDeque<String>,
    /// Application start time
    pub start_time: Instant,
    /// Total events processed
    pub total_events: u64,
    /// Last status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let formatter = EventLogFormatter {
            ignore_moves: config.log.ignore_moves,
            ignore_buttons: config.log.ignore_buttons,
        };
        Self {
            state: AppState::Running,
            config,
            polling: PollingSession::new(),
            buttons: ButtonTimingTest::new(),
            trace: TraceRecorder::new(),
            calibration: None,
            formatter,
            event_log: VecDeque::new(),
            start_time: Instant::now(),
            total_events: 0,
            status_message: None,
            status_time: None,
        }
    }

    /// Process one pointer event through every consumer, in order.
    /// Returns the log lines the event produced, for the caller to render.
    pub fn process_event(&mut self, event: &MouseEvent) -> Vec<String> {
        if self.state != AppState::Running {
            return Vec::new();
        }

        self.total_events += 1;

        self.trace.record(event);
        self.polling.process_event(event);

        let mut measured = None;
        if let Some(calibration) = self.calibration.as_mut() {
            let was_complete = calibration.is_complete();
            calibration.process_event(event);
            if !was_complete && calibration.is_complete() {
                measured = calibration.resolution();
            }
        }

        let clicks = self.buttons.record(event);
        let mut lines = self.formatter.describe(event, &clicks);

        if let Some(cpi) = measured {
            // Full precision is kept; rounding happens at display time.
            self.config.device.resolution_cpi = cpi;
            lines.push(format!("Calibration result {:.0} CPI", cpi));
        }

        for line in &lines {
            self.push_log(line.clone());
        }
        lines
    }

    fn push_log(&mut self, line: String) {
        let stamp = chrono::Local::now().format("%H:%M:%S%.3f");
        self.event_log.push_front(format!("{}  {}", stamp, line));
        self.event_log.truncate(self.config.log.max_entries);
    }

    /// Arm a DPI calibration over the given physical distance.
    pub fn begin_calibration(&mut self, distance_inches: f64) -> Result<(), MeasureError> {
        self.calibration = Some(CalibrationSession::new(distance_inches)?);
        Ok(())
    }

    /// Discard any calibration in progress.
    pub fn cancel_calibration(&mut self) {
        self.calibration = None;
    }

    /// Resolution of the completed calibration, if one finished.
    pub fn measured_resolution(&self) -> Option<f64> {
        self.calibration.as_ref().and_then(|c| c.resolution())
    }

    /// Physical travel of the last finalized polling run, using the
    /// configured resolution.
    pub fn polling_physical(&self) -> Option<PhysicalSummary> {
        match self.polling.outcome()? {
            PollingOutcome::Complete(summary) => {
                Some(summary.physical(self.config.device.resolution_cpi))
            }
            PollingOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn toggle_ignore_moves(&mut self) {
        self.formatter.ignore_moves = !self.formatter.ignore_moves;
        self.config.log.ignore_moves = self.formatter.ignore_moves;
    }

    pub fn toggle_ignore_buttons(&mut self) {
        self.formatter.ignore_buttons = !self.formatter.ignore_buttons;
        self.config.log.ignore_buttons = self.formatter.ignore_buttons;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            AppState::Running => {
                self.set_status("Paused".to_string());
                AppState::Paused
            }
            AppState::Paused => {
                self.set_status("Resumed".to_string());
                AppState::Running
            }
            AppState::Quitting => AppState::Quitting,
        };
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Reset every consumer and the event log
    pub fn reset_all(&mut self) {
        self.polling.reset();
        self.buttons.reset();
        self.trace.stop();
        self.trace.clear();
        self.calibration = None;
        self.event_log.clear();
        self.total_events = 0;
        self.set_status("All diagnostics reset".to_string());
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Get status message if still valid (within 3 seconds)
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed().as_secs() < 3 => Some(msg),
            _ => None,
        }
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{:02}:{:02}", mins, secs)
    }

    fn calibration_results(&self) -> Vec<TestResult> {
        self.calibration
            .as_ref()
            .map(|c| c.get_results())
            .unwrap_or_default()
    }

    /// Generate a session report
    pub fn generate_report(&self) -> SessionReport {
        SessionReport::new(
            self.start_time,
            self.total_events,
            self.measured_resolution(),
            self.polling.rate_hz(),
            self.calibration_results(),
            self.polling.get_results(),
            self.buttons.get_results(),
        )
    }

    /// Export session report to JSON file
    pub fn export_report(&mut self, filename: &str) -> Result<String, std::io::Error> {
        let report = self.generate_report();
        let path = Path::new(filename);
        report.export_json(path)?;
        log::info!("report exported to {}", filename);
        let msg = format!("Exported to {}", filename);
        self.set_status(msg.clone());
        Ok(msg)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
