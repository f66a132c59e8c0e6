//! Raw evdev-based pointer listener for Linux
//!
//! Reads relative-motion reports straight from the kernel event devices,
//! so every hardware report arrives regardless of which window has input
//! focus and before any pointer acceleration is applied.

use super::{FrameAssembler, MouseEvent};
use nix::libc;
use std::fs::{self, File};
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Error type for capture subscription setup
#[derive(Debug)]
pub enum RegistrationError {
    /// No pointer devices found
    NoDevices,
    /// Permission denied accessing device
    PermissionDenied(String),
    /// IO error
    Io(io::Error),
    /// Device enumeration failed
    EnumerationFailed(String),
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::NoDevices => write!(f, "No pointer devices found"),
            RegistrationError::PermissionDenied(path) => {
                write!(f, "Permission denied accessing {}", path)
            }
            RegistrationError::Io(e) => write!(f, "IO error: {}", e),
            RegistrationError::EnumerationFailed(msg) => {
                write!(f, "Device enumeration failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

impl From<io::Error> for RegistrationError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::PermissionDenied {
            RegistrationError::PermissionDenied("device".to_string())
        } else {
            RegistrationError::Io(e)
        }
    }
}

/// A raw input record from the kernel
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct InputRecord {
    tv_sec: i64,
    tv_usec: i64,
    kind: u16,
    code: u16,
    value: i32,
}

const INPUT_RECORD_SIZE: usize = std::mem::size_of::<InputRecord>();

// EVIOCSCLOCKID: switch a device's record timestamps to a chosen clock.
nix::ioctl_write_ptr!(eviocsclockid, b'E', 0xa0, libc::c_int);

/// Find all relative-motion pointer devices
fn find_pointer_devices() -> Result<Vec<PathBuf>, RegistrationError> {
    let input_dir = PathBuf::from("/dev/input");
    if !input_dir.exists() {
        return Err(RegistrationError::EnumerationFailed(
            "/dev/input does not exist".to_string(),
        ));
    }

    let mut pointers = Vec::new();

    if let Ok(entries) = fs::read_dir(&input_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

            if name.starts_with("event") && is_pointer_device(&path) {
                pointers.push(path);
            }
        }
    }

    if pointers.is_empty() {
        return Err(RegistrationError::NoDevices);
    }

    pointers.sort();
    Ok(pointers)
}

/// Check if a device reports relative X/Y axes by examining /sys/class/input
fn is_pointer_device(device_path: &Path) -> bool {
    let device_name = device_path.file_name().and_then(|n| n.to_str());
    if let Some(name) = device_name {
        // Relative-axis capability bitmap: bits 0 and 1 are REL_X/REL_Y
        let caps_path = format!("/sys/class/input/{}/device/capabilities/rel", name);
        if let Ok(caps) = fs::read_to_string(&caps_path) {
            if let Some(low) = caps.split_whitespace().last() {
                if let Ok(bits) = u64::from_str_radix(low, 16) {
                    return bits & 0x3 == 0x3;
                }
            }
        }

        // Fallback: check device name in /sys
        let name_path = format!("/sys/class/input/{}/device/name", name);
        if let Ok(dev_name) = fs::read_to_string(&name_path) {
            let dev_name_lower = dev_name.to_lowercase();
            return dev_name_lower.contains("mouse") || dev_name_lower.contains("trackball");
        }
    }
    false
}

struct PointerDevice {
    file: File,
    path: PathBuf,
    assembler: FrameAssembler,
}

/// Focus-independent raw pointer subscription.
///
/// Owns the kernel device handles exclusively for its lifetime; exactly
/// one live listener per process is assumed, and behavior with several
/// concurrent listeners is left unspecified. Dropping the listener (or
/// calling [`close`](Self::close), which is idempotent) releases every
/// handle, after which no further events are delivered.
pub struct RawMouseListener {
    devices: Vec<PointerDevice>,
    event_tx: mpsc::Sender<MouseEvent>,
    buffer: Vec<u8>,
    /// Raw monotonic ms of the first record seen; stream time is relative to it.
    origin_ms: Option<u64>,
    last_ts_ms: u64,
    closed: bool,
}

impl RawMouseListener {
    /// Subscribe to every pointer device on the system.
    ///
    /// Fails with [`RegistrationError`] when the subscription cannot be
    /// established; that failure is fatal for capture and is never
    /// retried here.
    pub fn new(event_tx: mpsc::Sender<MouseEvent>) -> Result<Self, RegistrationError> {
        let paths = find_pointer_devices()?;
        let mut devices = Vec::new();

        for path in paths {
            match File::open(&path) {
                Ok(file) => {
                    let fd = file.as_raw_fd();
                    unsafe {
                        let flags = libc::fcntl(fd, libc::F_GETFL);
                        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);

                        // Monotonic record timestamps; realtime would let
                        // wall-clock adjustments corrupt interval math.
                        let clock = libc::CLOCK_MONOTONIC;
                        if eviocsclockid(fd, &clock).is_err() {
                            log::warn!(
                                "could not switch {} to the monotonic clock",
                                path.display()
                            );
                        }
                    }
                    log::info!("capturing raw input from {}", path.display());
                    devices.push(PointerDevice {
                        file,
                        path,
                        assembler: FrameAssembler::new(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    log::warn!("skipping {} (permission denied)", path.display());
                    continue;
                }
                Err(e) => return Err(RegistrationError::Io(e)),
            }
        }

        if devices.is_empty() {
            return Err(RegistrationError::PermissionDenied(
                "Cannot access any pointer devices. Try running with sudo or add user to 'input' group.".to_string(),
            ));
        }

        Ok(Self {
            devices,
            event_tx,
            buffer: vec![0u8; INPUT_RECORD_SIZE * 64],
            origin_ms: None,
            last_ts_ms: 0,
            closed: false,
        })
    }

    /// Try to create a listener, return None if not available
    pub fn try_new(event_tx: mpsc::Sender<MouseEvent>) -> Option<Self> {
        Self::new(event_tx).ok()
    }

    /// Get the number of subscribed devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Get subscribed device paths
    pub fn device_paths(&self) -> Vec<&Path> {
        self.devices.iter().map(|d| d.path.as_path()).collect()
    }

    /// Drain pending kernel records into normalized events.
    /// Returns the number of events delivered.
    pub fn poll(&mut self) -> usize {
        if self.closed {
            return 0;
        }

        let mut event_count = 0;

        for device in &mut self.devices {
            loop {
                match device.file.read(&mut self.buffer) {
                    Ok(bytes_read) if bytes_read >= INPUT_RECORD_SIZE => {
                        let num_records = bytes_read / INPUT_RECORD_SIZE;
                        for i in 0..num_records {
                            let offset = i * INPUT_RECORD_SIZE;
                            let record_bytes = &self.buffer[offset..offset + INPUT_RECORD_SIZE];

                            let record: InputRecord = unsafe {
                                std::ptr::read(record_bytes.as_ptr() as *const InputRecord)
                            };

                            let raw_ms = record.tv_sec as u64 * 1000
                                + record.tv_usec as u64 / 1000;
                            let origin = *self.origin_ms.get_or_insert(raw_ms);
                            // Non-decreasing even if devices interleave slightly.
                            let ts = raw_ms.saturating_sub(origin).max(self.last_ts_ms);

                            if let Some(event) =
                                device
                                    .assembler
                                    .feed(record.kind, record.code, record.value, ts)
                            {
                                self.last_ts_ms = ts;
                                let _ = self.event_tx.send(event);
                                event_count += 1;
                            }
                        }
                    }
                    Ok(_) => break, // Not enough bytes for a complete record
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(_) => break, // Other error, stop reading from this device
                }
            }
        }

        event_count
    }

    /// Release every device handle. Safe to call more than once, and a
    /// no-op after the first call; no events are delivered afterwards.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.devices.clear();
        log::info!("raw input capture released");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for RawMouseListener {
    fn drop(&mut self) {
        self.close();
    }
}

/// Check if raw pointer capture is available on this system
pub fn capture_available() -> bool {
    find_pointer_devices().is_ok()
}

/// Get a status message about capture availability
pub fn capture_status() -> String {
    match find_pointer_devices() {
        Ok(devices) => format!("{} pointer device(s) found", devices.len()),
        Err(RegistrationError::NoDevices) => "No pointer devices found".to_string(),
        Err(RegistrationError::PermissionDenied(_)) => {
            "Permission denied - run with sudo or add user to 'input' group".to_string()
        }
        Err(e) => format!("Error: {}", e),
    }
}
