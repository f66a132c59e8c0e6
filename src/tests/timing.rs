//! Button press timing and event-log formatting

use super::{MouseTest, TestResult};
use crate::mouse::{ButtonEdge, MouseButton, MouseEvent, WHEEL_DELTA};
use std::collections::HashMap;

/// A completed press/release pair on one logical button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickDuration {
    pub button: MouseButton,
    pub duration_ms: u64,
}

/// Aggregate press statistics for a single button
#[derive(Debug, Clone, Copy, Default)]
struct ClickStats {
    count: u32,
    total_ms: u64,
    min_ms: Option<u64>,
    max_ms: Option<u64>,
}

impl ClickStats {
    fn record(&mut self, duration_ms: u64) {
        self.count += 1;
        self.total_ms += duration_ms;
        self.min_ms = Some(self.min_ms.map(|m| m.min(duration_ms)).unwrap_or(duration_ms));
        self.max_ms = Some(self.max_ms.map(|m| m.max(duration_ms)).unwrap_or(duration_ms));
    }

    fn mean_ms(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.total_ms as f64 / self.count as f64)
    }
}

/// Tracks open presses and derives click durations.
///
/// A down edge records its timestamp; the matching up edge yields the
/// duration and clears the entry. A repeated down without an intervening
/// up overwrites the open timestamp (last down wins), and an up edge with
/// no open press yields nothing.
pub struct ButtonTimingTest {
    open_presses: HashMap<MouseButton, u64>,
    stats: HashMap<MouseButton, ClickStats>,
    total_clicks: u32,
    wheel_notches: i64,
}

impl ButtonTimingTest {
    pub fn new() -> Self {
        Self {
            open_presses: HashMap::new(),
            stats: HashMap::new(),
            total_clicks: 0,
            wheel_notches: 0,
        }
    }

    /// Apply one event's transitions; returns the clicks it completed.
    pub fn record(&mut self, event: &MouseEvent) -> Vec<ClickDuration> {
        let mut completed = Vec::new();

        for transition in event.buttons.transitions() {
            match transition.edge {
                ButtonEdge::Down => {
                    self.open_presses.insert(transition.button, event.timestamp_ms);
                }
                ButtonEdge::Up => {
                    if let Some(t0) = self.open_presses.remove(&transition.button) {
                        let duration_ms = event.timestamp_ms.saturating_sub(t0);
                        self.stats.entry(transition.button).or_default().record(duration_ms);
                        self.total_clicks += 1;
                        completed.push(ClickDuration {
                            button: transition.button,
                            duration_ms,
                        });
                    }
                }
            }
        }

        if event.buttons.has_wheel() {
            self.wheel_notches += event.wheel as i64 / WHEEL_DELTA as i64;
        }

        completed
    }

    pub fn total_clicks(&self) -> u32 {
        self.total_clicks
    }

    /// Net wheel travel in notches (down notches are negative).
    pub fn wheel_notches(&self) -> i64 {
        self.wheel_notches
    }

    /// Buttons currently held, with their down timestamps.
    pub fn held_buttons(&self) -> Vec<(MouseButton, u64)> {
        let mut held: Vec<_> = self.open_presses.iter().map(|(b, t)| (*b, *t)).collect();
        held.sort_by_key(|(b, _)| b.down_flag());
        held
    }

    pub fn mean_duration_ms(&self, button: MouseButton) -> Option<f64> {
        self.stats.get(&button).and_then(ClickStats::mean_ms)
    }
}

impl Default for ButtonTimingTest {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseTest for ButtonTimingTest {
    fn name(&self) -> &'static str {
        "Button Timing"
    }

    fn description(&self) -> &'static str {
        "Measures press-to-release durations per logical button"
    }

    fn process_event(&mut self, event: &MouseEvent) {
        let _ = self.record(event);
    }

    fn is_complete(&self) -> bool {
        false // Continuous diagnostic
    }

    fn get_results(&self) -> Vec<TestResult> {
        let mut results = Vec::new();

        results.push(TestResult::info(
            "Total Clicks",
            format!("{}", self.total_clicks),
        ));
        results.push(TestResult::info(
            "Wheel Notches",
            format!("{}", self.wheel_notches),
        ));

        for button in MouseButton::all() {
            if let Some(stats) = self.stats.get(button) {
                let mean = stats.mean_ms().unwrap_or(0.0);
                results.push(TestResult::info(
                    format!("  {}", button.name()),
                    format!(
                        "{} clicks, {:.0} ms avg ({}-{} ms)",
                        stats.count,
                        mean,
                        stats.min_ms.unwrap_or(0),
                        stats.max_ms.unwrap_or(0),
                    ),
                ));
            }
        }

        let held = self.held_buttons();
        if !held.is_empty() {
            let names: Vec<&str> = held.iter().map(|(b, _)| b.name()).collect();
            results.push(TestResult::info("Held", names.join(", ")));
        }

        results
    }

    fn reset(&mut self) {
        self.open_presses.clear();
        self.stats.clear();
        self.total_clicks = 0;
        self.wheel_notches = 0;
    }
}

/// Renders events as human-readable log lines.
///
/// The two toggles suppress text only; they never touch any accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventLogFormatter {
    pub ignore_moves: bool,
    pub ignore_buttons: bool,
}

impl EventLogFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe one event, with the durations its up edges completed.
    pub fn describe(&self, event: &MouseEvent, clicks: &[ClickDuration]) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.ignore_moves && event.has_motion() {
            lines.push(format!("Move Δx={} Δy={}", event.dx, event.dy));
        }

        if !self.ignore_buttons {
            if event.wheel != 0 {
                let arrow = if event.wheel > 0 { "↑" } else { "↓" };
                lines.push(format!("Wheel {} {}", arrow, event.wheel));
            }

            for transition in event.buttons.transitions() {
                let edge = match transition.edge {
                    ButtonEdge::Down => "down",
                    ButtonEdge::Up => "up",
                };
                lines.push(format!("{} {}", transition.button.name(), edge));
            }

            for click in clicks {
                lines.push(format!(
                    "Click {} duration {} ms",
                    click.button.name(),
                    click.duration_ms
                ));
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mouse::ButtonFlags;

    fn button_event(flags: u16, ts: u64) -> MouseEvent {
        MouseEvent::new(0, 0, ButtonFlags::new(flags), 0, ts)
    }

    #[test]
    fn click_duration_is_up_minus_down() {
        let mut timing = ButtonTimingTest::new();
        assert!(timing.record(&button_event(ButtonFlags::LEFT_DOWN, 100)).is_empty());
        let clicks = timing.record(&button_event(ButtonFlags::LEFT_UP, 175));

        assert_eq!(
            clicks,
            vec![ClickDuration {
                button: MouseButton::Left,
                duration_ms: 75,
            }]
        );
        assert_eq!(timing.total_clicks(), 1);
    }

    #[test]
    fn unmatched_up_yields_nothing() {
        let mut timing = ButtonTimingTest::new();
        let clicks = timing.record(&button_event(ButtonFlags::RIGHT_UP, 50));
        assert!(clicks.is_empty());
        assert_eq!(timing.total_clicks(), 0);
    }

    #[test]
    fn repeated_down_overwrites_open_timestamp() {
        // last down wins
        let mut timing = ButtonTimingTest::new();
        timing.record(&button_event(ButtonFlags::LEFT_DOWN, 0));
        timing.record(&button_event(ButtonFlags::LEFT_DOWN, 40));
        let clicks = timing.record(&button_event(ButtonFlags::LEFT_UP, 100));

        assert_eq!(clicks[0].duration_ms, 60);
        assert_eq!(timing.total_clicks(), 1);
    }

    #[test]
    fn buttons_are_tracked_independently() {
        let mut timing = ButtonTimingTest::new();
        timing.record(&button_event(ButtonFlags::LEFT_DOWN, 0));
        timing.record(&button_event(ButtonFlags::X2_DOWN, 10));
        let left = timing.record(&button_event(ButtonFlags::LEFT_UP, 30));
        let x2 = timing.record(&button_event(ButtonFlags::X2_UP, 50));

        assert_eq!(left[0].button, MouseButton::Left);
        assert_eq!(left[0].duration_ms, 30);
        assert_eq!(x2[0].button, MouseButton::X2);
        assert_eq!(x2[0].duration_ms, 40);
    }

    #[test]
    fn down_and_up_in_one_report() {
        let mut timing = ButtonTimingTest::new();
        let clicks = timing.record(&button_event(
            ButtonFlags::MIDDLE_DOWN | ButtonFlags::MIDDLE_UP,
            20,
        ));
        // table order puts the down edge first, so the pair closes at once
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].duration_ms, 0);
    }

    #[test]
    fn held_buttons_reports_open_presses() {
        let mut timing = ButtonTimingTest::new();
        timing.record(&button_event(ButtonFlags::RIGHT_DOWN, 5));
        timing.record(&button_event(ButtonFlags::LEFT_DOWN, 7));

        let held = timing.held_buttons();
        assert_eq!(held, vec![(MouseButton::Left, 7), (MouseButton::Right, 5)]);
    }

    #[test]
    fn wheel_notches_accumulate() {
        let mut timing = ButtonTimingTest::new();
        let mut up = MouseEvent::new(0, 0, ButtonFlags::new(ButtonFlags::WHEEL), 120, 0);
        timing.record(&up);
        up.wheel = -240;
        up.timestamp_ms = 10;
        timing.record(&up);
        assert_eq!(timing.wheel_notches(), -1);
    }

    #[test]
    fn stats_track_min_max_mean() {
        let mut timing = ButtonTimingTest::new();
        for (down, up) in [(0u64, 20u64), (100, 160), (200, 300)] {
            timing.record(&button_event(ButtonFlags::LEFT_DOWN, down));
            timing.record(&button_event(ButtonFlags::LEFT_UP, up));
        }
        let mean = timing.mean_duration_ms(MouseButton::Left).unwrap();
        assert!((mean - 60.0).abs() < 1e-9);
    }

    #[test]
    fn formatter_describes_motion_and_edges() {
        let formatter = EventLogFormatter::new();
        let mut timing = ButtonTimingTest::new();

        let event = MouseEvent::motion(3, -2, 0);
        let lines = formatter.describe(&event, &[]);
        assert_eq!(lines, vec!["Move Δx=3 Δy=-2"]);

        timing.record(&button_event(ButtonFlags::LEFT_DOWN, 0));
        let up = button_event(ButtonFlags::LEFT_UP, 42);
        let clicks = timing.record(&up);
        let lines = formatter.describe(&up, &clicks);
        assert_eq!(lines, vec!["LMB up", "Click LMB duration 42 ms"]);
    }

    #[test]
    fn formatter_describes_wheel() {
        let formatter = EventLogFormatter::new();
        let event = MouseEvent::new(0, 0, ButtonFlags::new(ButtonFlags::WHEEL), -120, 0);
        let lines = formatter.describe(&event, &[]);
        assert_eq!(lines, vec!["Wheel ↓ -120"]);
    }

    #[test]
    fn suppression_affects_text_only() {
        let formatter = EventLogFormatter {
            ignore_moves: true,
            ignore_buttons: true,
        };
        let mut timing = ButtonTimingTest::new();

        timing.record(&button_event(ButtonFlags::LEFT_DOWN, 0));
        let up = button_event(ButtonFlags::LEFT_UP, 10);
        let clicks = timing.record(&up);

        // nothing printed, but the click was still measured
        assert!(formatter.describe(&up, &clicks).is_empty());
        assert!(formatter.describe(&MouseEvent::motion(5, 5, 20), &[]).is_empty());
        assert_eq!(timing.total_clicks(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut timing = ButtonTimingTest::new();
        timing.record(&button_event(ButtonFlags::LEFT_DOWN, 0));
        timing.record(&button_event(ButtonFlags::LEFT_UP, 10));
        timing.reset();

        assert_eq!(timing.total_clicks(), 0);
        assert!(timing.held_buttons().is_empty());
        assert_eq!(timing.wheel_notches(), 0);
    }
}
