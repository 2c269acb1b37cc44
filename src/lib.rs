//! Core library for the `stratbench` CLI.
//!
//! Runs one deterministic workload under several execution strategies
//! (sequential, event loop, thread pool, process pool), measures each run,
//! and compares candidates against a baseline. The binary wires these pieces
//! to the command line; library APIs may evolve with it.
mod app;
pub mod args;
pub mod collab;
pub mod config;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod report;
pub mod runner;
pub mod strategy;
pub mod sweep;
mod system;
pub mod workload;
