//! droid runtime - command transport and error taxonomy
//!
//! This crate provides the low-level plumbing for talking to an Appium
//! automation server:
//!
//! - **Transport**: one WebDriver command per HTTP request ([`HttpTransport`])
//! - **Errors**: connection, remote, lookup and timeout failures ([`Error`])
//!
//! The session and element API lives in `droid-rs`, which only depends on the
//! [`Transport`] trait so it can be driven by scripted transports in tests.

pub mod error;
pub mod transport;

pub use error::{Error, Result};
pub use transport::{BoxFuture, DEFAULT_REQUEST_TIMEOUT, HttpTransport, Method, Transport};
