//! # aegis-detection
//!
//! The three detection managers (error-rate, spike, pattern) share one
//! algorithm shape: aggregate a sliding window, gate on minimum sample
//! size, classify through ordered threshold bands, map severity to a
//! recommended action via the per-detector policy table. The
//! [`DetectionEngine`] runs them; [`engine::ScanSummary`] is the batch
//! contract with catch-and-continue isolation per project.

pub mod detectors;
pub mod engine;

pub use engine::{DetectionEngine, ScanSummary};
