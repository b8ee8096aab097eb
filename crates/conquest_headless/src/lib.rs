//! Headless match runner.
//!
//! Runs matches without graphics: create a match from a seed, tick it to
//! completion (or a simulated-time budget), and report a JSON summary.
//! Used for CI smoke runs, determinism verification, and balance
//! eyeballing across seeds and difficulties.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod runner;
