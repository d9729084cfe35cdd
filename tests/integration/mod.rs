//! Integration tests for rigcheck
//!
//! These tests drive the public API end to end with fake probes, temporary
//! procfs trees and rule files. No GPU or external tools are needed.
//!
//! Run with: cargo test --test integration

mod helpers;

mod pipeline;
mod rules_file;
mod scenarios;
