//! Common types and utilities for the csz code generator.
//!
//! This crate provides foundational types used across all csz crates:
//! - Source positions and locations (`Position`, `Span`, `SourceLocation`)
//! - Comments attached to nodes by the external parser (`Comment`)
//! - Fatal, location-carrying compile errors (`CompileError`, `Diagnostic`)
//! - Tunable limits and thresholds

// Position/Range types for line/column source locations
pub mod position;
pub use position::{Position, SourceLocation, Span};

// Comment representation and formatting
pub mod comments;
pub use comments::{Comment, CommentKey, CommentPlacement};

// Compile errors and diagnostics
pub mod diagnostics;
pub use diagnostics::{CompileError, CompileResult, Diagnostic, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;
