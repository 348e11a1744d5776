//! Data layer - Static tables and character classes
//!
//! This module contains all static data used by the grammar and printers:
//! - Math environment names
//! - Character classes
//! - Macros with special line handling

pub mod constants;

// Re-export commonly used items
pub use constants::{
    is_letter, is_math_environment, is_plain_char, is_space, is_wrappable, COMMENT_ENV,
    LINE_START_MACROS, MATH_ENVIRONMENTS, NO_WRAP_LEADING, PARAGRAPH_MACROS, PUNCTUATION,
    SPECIAL_CHARS, VERBATIM_ENV,
};
