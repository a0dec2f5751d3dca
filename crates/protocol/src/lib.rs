//! Wire types for the WebDriver/Appium protocol.
//!
//! This crate contains the serde-serializable types used when talking to an
//! Appium automation server over its JSON-over-HTTP command protocol. These
//! types represent the "protocol layer": the shapes of data as they appear on
//! the wire, plus the string dialects (UiSelector, XPath) the server parses.
//!
//! Types in this crate are:
//! - **Pure data**: No I/O, no async
//! - **Dual-dialect**: Accept both W3C and legacy JSON Wire Protocol envelopes
//!
//! The session and element API is built on top of these types in `droid-rs`.

pub mod capabilities;
pub mod locator;
pub mod wire;

pub use capabilities::*;
pub use locator::*;
pub use wire::*;
