//! Mouse TestKit - pointer diagnostic runner
//!
//! Thin terminal front end over the capture pipeline: each subcommand
//! wires the raw listener to the consumers it needs and prints their
//! results as plain text.

use anyhow::{bail, Result};
use mouse_testkit::app::App;
use mouse_testkit::config::Config;
use mouse_testkit::device_info;
use mouse_testkit::tests::{
    parse_distance, parse_resolution, MouseTest, PollingOutcome, TestResult,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("watch");

    match command {
        "info" => cmd_info(),
        "dpi" => cmd_dpi(args.get(1).map(String::as_str)),
        "poll" => cmd_poll(args.get(1).map(String::as_str)),
        "trace" => cmd_trace(args.get(1).map(String::as_str)),
        "watch" => cmd_watch(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other)
        }
    }
}

fn print_usage() {
    println!("Mouse TestKit - pointing-device diagnostics");
    println!();
    println!("Usage: mouse-testkit [COMMAND]");
    println!();
    println!("Commands:");
    println!("  info             List connected pointing devices");
    println!("  dpi [INCHES]     Measure resolution over a known distance");
    println!("  poll [CPI]       Measure polling rate and travel");
    println!("  trace FILE.csv   Record raw events and export them as CSV");
    println!("  watch            Stream the live event log (default)");
    println!();
    println!("During capture: q quits, space pauses, m/b toggle move/button log lines,");
    println!("e exports a session report, R resets all diagnostics.");
}

fn print_results(results: &[TestResult]) {
    for result in results {
        if result.value.is_empty() {
            println!("{}", result.label);
        } else {
            println!("{}: {}", result.label, result.value);
        }
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("could not load config ({}); using defaults", e);
            Config::default()
        }
    }
}

fn cmd_info() -> Result<()> {
    let mice = device_info::connected_mice();
    if mice.is_empty() {
        println!("No pointing devices found.");
    }
    for mouse in &mice {
        println!("{}", mouse.header());
        if !mouse.manufacturer.is_empty() {
            println!("  Mfr: {}", mouse.manufacturer);
        }
        if !mouse.driver_version.is_empty() {
            println!("  Version: {}", mouse.driver_version);
        }
        if !mouse.bus_id.is_empty() {
            println!("  ID: {}", mouse.bus_id);
        }
    }

    #[cfg(target_os = "linux")]
    println!("\nCapture: {}", mouse_testkit::mouse::capture_status());

    Ok(())
}

fn cmd_dpi(distance_arg: Option<&str>) -> Result<()> {
    let config = load_config();
    let distance = match distance_arg {
        Some(text) => parse_distance(text)?,
        None => config.calibration.default_distance_inches,
    };

    let mut app = App::new(config);
    app.begin_calibration(distance)?;

    println!("Measuring resolution over {} inches.", distance);
    println!("Hold LMB, move in a straight line, release to finish. q cancels.");

    run_capture(&mut app, |_| {}, |app| app.measured_resolution().is_some())?;

    match app.measured_resolution() {
        Some(cpi) => {
            println!("Result: {:.0} CPI", cpi);
            if let Err(e) = app.config.save() {
                log::warn!("could not persist measured resolution: {}", e);
            }
        }
        None => println!("Cancelled."),
    }
    Ok(())
}

fn cmd_poll(resolution_arg: Option<&str>) -> Result<()> {
    let mut config = load_config();
    if let Some(text) = resolution_arg {
        config.device.resolution_cpi = parse_resolution(text)?;
    }

    let mut app = App::new(config);
    app.polling.start();

    println!("Measuring polling rate. Move the mouse, press q to stop.");

    run_capture(&mut app, |_| {}, |_| false)?;

    match app.polling.stop() {
        PollingOutcome::InsufficientData { .. } => println!("Not enough data."),
        PollingOutcome::Complete(summary) => {
            let physical = summary.physical(app.config.device.resolution_cpi);
            println!("Events: {}", summary.events);
            println!(
                "Rate: {:.0} Hz (avg {:.1} ms)",
                summary.rate_hz, summary.mean_interval_ms
            );
            println!(
                "Sum X: {} counts  {:.1} cm",
                summary.sum_x, physical.sum_x_cm
            );
            println!(
                "Sum Y: {} counts  {:.1} cm",
                summary.sum_y, physical.sum_y_cm
            );
            println!(
                "Path : {} counts  {:.1} cm",
                summary.path_counts, physical.path_cm
            );
            print_results(&app.polling.get_results());
        }
    }
    Ok(())
}

fn cmd_trace(path_arg: Option<&str>) -> Result<()> {
    let Some(path) = path_arg else {
        bail!("trace requires an output file, e.g. mouse-testkit trace capture.csv");
    };

    let mut app = App::new(load_config());
    app.trace.start();

    println!("Recording raw events to {}. Press q to stop.", path);

    run_capture(&mut app, |_| {}, |_| false)?;

    app.trace.stop();
    if app.trace.is_empty() {
        println!("No samples.");
        return Ok(());
    }
    app.trace.export_csv(std::path::Path::new(path))?;
    log::info!("trace exported to {}", path);
    println!("Saved {} samples.", app.trace.len());
    Ok(())
}

fn cmd_watch() -> Result<()> {
    let mut app = App::new(load_config());

    println!("Streaming pointer events. q quits, m/b toggle move/button lines.");

    run_capture(
        &mut app,
        |lines| {
            use std::io::Write;
            let mut out = std::io::stdout();
            for line in lines {
                // raw mode needs explicit carriage returns
                let _ = write!(out, "{}\r\n", line);
            }
            let _ = out.flush();
        },
        |_| false,
    )?;

    println!("\nSession complete.");
    println!("Total events processed: {}", app.total_events);
    println!("Session duration: {}", app.elapsed_formatted());
    print_results(&app.buttons.get_results());
    Ok(())
}

/// Drive the raw listener until the user quits, Ctrl-C fires, or `done`
/// reports the command's goal reached. `on_lines` receives each event's
/// freshly formatted log lines.
#[cfg(target_os = "linux")]
fn run_capture(
    app: &mut App,
    mut on_lines: impl FnMut(&[String]),
    mut done: impl FnMut(&App) -> bool,
) -> Result<()> {
    use anyhow::Context;
    use crossterm::event::{Event, KeyCode};
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
    use mouse_testkit::app::AppState;
    use mouse_testkit::mouse::RawMouseListener;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    let (event_tx, event_rx) = mpsc::channel();
    let mut listener =
        RawMouseListener::new(event_tx).context("raw input capture could not be started")?;
    log::info!("capturing from {} device(s)", listener.device_count());

    let tick = app.config.refresh_interval();
    enable_raw_mode()?;

    let result = (|| -> Result<()> {
        loop {
            listener.poll();
            while let Ok(event) = event_rx.try_recv() {
                let lines = app.process_event(&event);
                if !lines.is_empty() {
                    on_lines(&lines);
                }
            }

            if crossterm::event::poll(tick)? {
                if let Event::Key(key) = crossterm::event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.quit(),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('m') => app.toggle_ignore_moves(),
                        KeyCode::Char('b') => app.toggle_ignore_buttons(),
                        KeyCode::Char('R') => app.reset_all(),
                        KeyCode::Char('e') => {
                            let filename = format!(
                                "mouse_report_{}.json",
                                chrono::Utc::now().format("%Y%m%d_%H%M%S")
                            );
                            let _ = app.export_report(&filename);
                        }
                        _ => {}
                    }
                }
            }

            if interrupted.load(Ordering::SeqCst) || done(app) {
                app.quit();
            }
            if app.state == AppState::Quitting {
                return Ok(());
            }
        }
    })();

    disable_raw_mode()?;
    listener.close();
    result
}

#[cfg(not(target_os = "linux"))]
fn run_capture(
    _app: &mut App,
    _on_lines: impl FnMut(&[String]),
    _done: impl FnMut(&App) -> bool,
) -> Result<()> {
    bail!("raw pointer capture is only supported on Linux")
}
