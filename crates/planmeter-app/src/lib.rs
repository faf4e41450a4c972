//! Planmeter Application
//!
//! Shells around the core draw session controller: a headless replay of
//! recorded drawing sessions, and the browser entry point.

mod replay;

pub use replay::{ReplayError, ReplayEvent, ReplayScript, replay};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{BlueprintMeasure, run_wasm};
