//! Playbill CLI
//!
//! Command-line launcher for the Playbill test suites.

pub mod launcher;
