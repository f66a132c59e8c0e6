//! Pointer event handling: normalization, button decode, raw capture

mod buttons;
mod event;
#[cfg(target_os = "linux")]
mod raw_listener;

pub use buttons::{ButtonEdge, ButtonFlags, ButtonTransition, MouseButton};
pub use event::{FrameAssembler, MouseEvent, WHEEL_DELTA};
#[cfg(target_os = "linux")]
pub use raw_listener::{capture_available, capture_status, RawMouseListener, RegistrationError};
