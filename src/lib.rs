//! PULSE — Forex volatility and smart-money scanner
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod feed;
pub mod analysis;
pub mod engine;
pub mod dashboard;
