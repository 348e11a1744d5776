//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Diagnostics and error reporting

pub mod diagnostics;
pub mod error;

// Re-export commonly used items
pub use diagnostics::{check_latex, format_diagnostics, CheckReport, Diagnostic, Severity};
pub use error::{FormatError, FormatResult, Location, SyntaxError};
