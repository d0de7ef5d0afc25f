#![warn(missing_debug_implementations)]

//! AlphaZero-style tree search for Contrast.
//!
//! The search itself lives in [zero], it evaluates positions through the [network::Network] trait,
//! implemented by [network::cpu::CpuNetwork] for real weights and [network::dummy::DummyNetwork] for tests.

pub mod network;
pub mod util;
pub mod zero;
