//! Clip controllers and the pieces they are built from.
//!
//! # Module Structure
//!
//! - [`config`] - Authoring-time clip settings
//! - [`state`] - Lifecycle state machine and runtime bookkeeping
//! - [`seek`] - Seek policies and the bounded seek watchdog
//! - [`drift`] - Drift measurement and loop unwrapping
//! - [`controller`] - `ClipController`, which ties them together

pub mod config;
mod controller;
pub mod drift;
pub mod seek;
pub mod state;

pub use config::{ActivationPolicy, ClipConfiguration};
pub use controller::ClipController;
pub use drift::DriftCorrection;
pub use seek::{SeekOutcome, SeekPolicy};
pub use state::{ClipRuntimeState, ClipState, Restoration};
