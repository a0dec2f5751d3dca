//! `droid` command-line tool: install an Android app from the Play Store
//! through an Appium server and verify its first screen.
//!
//! The binary is a thin wrapper; everything it runs is exposed here so the
//! workflow can be driven against a fake server in tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod shell;
pub mod styles;
pub mod workflow;
