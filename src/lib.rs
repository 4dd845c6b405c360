//! TaskaDeck: a desktop shell that keeps one live webview per destination and
//! switches between them from a sidebar.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod boundary_channel;
pub mod database;
pub mod headless;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
