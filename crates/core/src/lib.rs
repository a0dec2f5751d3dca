//! Appium session API for Android UI automation.
//!
//! ```text
//! Session::start(transport, &caps) ─▶ Session ─▶ find_element / wait().until_visible ─▶ Element
//!                                        │                                              │
//!                                        └─ launch_app / quit                  click / send_keys / text
//! ```
//!
//! All commands go through a [`droid_runtime::Transport`], so the same code
//! drives a real server over HTTP or a scripted fake in tests.

mod channel;
mod element;
mod session;
mod wait;

#[cfg(test)]
mod test_support;

pub use droid_protocol::{Capabilities, CapabilitiesBuilder, ElementId, Locator, Orientation, UiSelector, keys, xpath_literal};
pub use droid_runtime::{Error, HttpTransport, Method, Result, Transport};
pub use element::Element;
pub use session::{DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT, Session};
pub use wait::Wait;

pub use droid_protocol as protocol;
pub use droid_runtime as runtime;
