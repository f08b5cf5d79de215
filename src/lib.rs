// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// that tests can import types via `klisis::bookmark::*` / `klisis::store::*`.
// Some code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod app;
pub mod bookmark;
pub mod config;
pub mod paradigm;
pub mod quiz;
pub mod store;
pub mod ui;

// Private: only the binary reads terminal events and installs the subscriber.
mod event;
mod logging;
