//! Printer configuration
//!
//! - `TextOptions` drives the greedy token renderer
//! - `PrintOptions` drives the document layout printer
//!
//! Both deserialize from camelCase keys when the `serde` feature is on, with
//! every key optional.

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::utils::error::{FormatError, FormatResult};

/// Options for the token-stream printer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TextOptions {
    /// Column at which string tokens wrap
    /// Default: 60
    pub max_width: usize,

    /// Display width of one indentation tab
    /// Default: 8
    pub tab_width: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            max_width: 60,
            tab_width: 8,
        }
    }
}

impl TextOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with a custom wrap width
    pub fn with_width(max_width: usize) -> Self {
        Self {
            max_width,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> FormatResult<()> {
        if self.max_width == 0 {
            return Err(FormatError::invalid_options("maxWidth must be positive"));
        }
        if self.tab_width == 0 {
            return Err(FormatError::invalid_options("tabWidth must be positive"));
        }
        Ok(())
    }
}

/// Options for the document layout printer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PrintOptions {
    /// Target line width
    /// Default: 80
    pub print_width: usize,

    /// Display width of one indentation level
    /// Default: 8
    pub tab_width: usize,

    /// Indent with tab characters instead of spaces
    /// Default: true
    pub use_tabs: bool,

    /// Parser identifier; carried for compatibility, LaTeX is the only one
    /// Default: "latex"
    pub parser: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            tab_width: 8,
            use_tabs: true,
            parser: "latex".to_string(),
        }
    }
}

impl PrintOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent with `width` spaces per level
    pub fn spaces(width: usize) -> Self {
        Self {
            tab_width: width,
            use_tabs: false,
            ..Self::default()
        }
    }

    /// Narrow output, same width as the text printer
    pub fn compact() -> Self {
        Self {
            print_width: 60,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> FormatResult<()> {
        if self.print_width == 0 {
            return Err(FormatError::invalid_options("printWidth must be positive"));
        }
        if self.tab_width == 0 {
            return Err(FormatError::invalid_options("tabWidth must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let text = TextOptions::default();
        assert_eq!((text.max_width, text.tab_width), (60, 8));

        let print = PrintOptions::new();
        assert_eq!(print.print_width, 80);
        assert_eq!(print.tab_width, 8);
        assert!(print.use_tabs);
        assert_eq!(print.parser, "latex");
    }

    #[test]
    fn test_presets() {
        let opts = PrintOptions::spaces(2);
        assert!(!opts.use_tabs);
        assert_eq!(opts.tab_width, 2);
        assert_eq!(opts.print_width, 80);

        assert_eq!(PrintOptions::compact().print_width, 60);
        assert_eq!(TextOptions::with_width(20).max_width, 20);
    }

    #[test]
    fn test_validate() {
        assert!(PrintOptions::default().validate().is_ok());
        let bad = PrintOptions {
            print_width: 0,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(FormatError::InvalidOptions { .. })
        ));
        let bad = TextOptions {
            tab_width: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_camel_case() {
        let opts: PrintOptions =
            serde_json::from_str(r#"{"printWidth": 40, "useTabs": false}"#).unwrap();
        assert_eq!(opts.print_width, 40);
        assert!(!opts.use_tabs);
        assert_eq!(opts.tab_width, 8);

        let text: TextOptions = serde_json::from_str(r#"{"maxWidth": 30}"#).unwrap();
        assert_eq!(text.max_width, 30);
        assert_eq!(text.tab_width, 8);
    }
}
