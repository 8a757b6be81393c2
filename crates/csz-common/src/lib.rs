//! Common types and utilities for the csz emitter.
//!
//! This crate provides foundational types used across all csz crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, message table)
//! - Source spans (`Span`) and line/column mapping (`LineMap`, `Location`)
//! - Emitter limits and thresholds

// Diagnostic types and the emitter's message table
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes, format_message};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Location};

// Centralized limits and thresholds
pub mod limits;
