//! Greedy line-wrapping renderer for token streams

use super::Token;
use crate::core::options::TextOptions;
use crate::data::is_wrappable;

/// What the output last ended with, for collapsing repeated breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Newline,
    Paragraph,
    Content,
}

struct Renderer {
    out: String,
    indent: usize,
    no_wrap: usize,
    line_len: usize,
    line_has_content: bool,
    last: Last,
    max_width: usize,
    tab_width: usize,
}

impl Renderer {
    fn new(options: &TextOptions) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            no_wrap: 0,
            line_len: 0,
            line_has_content: false,
            last: Last::Start,
            max_width: options.max_width,
            tab_width: options.tab_width,
        }
    }

    /// Close the current line and start `count` lines further down
    fn break_lines(&mut self, count: usize) {
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
        for _ in 0..count {
            self.out.push('\n');
        }
        for _ in 0..self.indent {
            self.out.push('\t');
        }
        self.line_len = self.indent * self.tab_width;
        self.line_has_content = false;
    }

    fn paragraph(&mut self) {
        match self.last {
            Last::Start => {}
            Last::Newline => self.break_lines(1),
            _ => self.break_lines(2),
        }
    }

    fn text(&mut self, s: &str) {
        let width = s.chars().count();
        if self.no_wrap == 0
            && self.line_has_content
            && self.line_len + width > self.max_width
            && self.out.ends_with(' ')
            && is_wrappable(s)
        {
            tracing::trace!(target: "texfmt::tokens", token = s, column = self.line_len, "wrap");
            self.break_lines(1);
        }
        self.out.push_str(s);
        match s.rfind('\n') {
            Some(i) => self.line_len = s[i + 1..].chars().count(),
            None => self.line_len += width,
        }
        self.line_has_content = true;
        self.last = Last::Content;
    }

    fn token(&mut self, token: &Token) {
        match token {
            Token::Text(s) => self.text(s),
            Token::Space => {
                if self.line_has_content {
                    self.out.push(' ');
                    self.line_len += 1;
                    self.last = Last::Content;
                }
            }
            Token::Indent => self.indent += 1,
            Token::EndIndent => self.indent = self.indent.saturating_sub(1),
            Token::NoWrap => self.no_wrap += 1,
            Token::EndNoWrap => self.no_wrap = self.no_wrap.saturating_sub(1),
            Token::Newline => {
                self.break_lines(1);
                self.last = Last::Newline;
            }
            Token::EnsureNewline => {
                if self.last == Last::Content {
                    self.break_lines(1);
                    self.last = Last::Newline;
                }
            }
            Token::ParagraphBreak => {
                self.paragraph();
                if self.last != Last::Start {
                    self.last = Last::Paragraph;
                }
            }
            Token::PreferParagraph => {
                if self.last == Last::Content {
                    self.break_lines(2);
                    self.last = Last::Paragraph;
                }
            }
            Token::EnsureParagraph => {
                if matches!(self.last, Last::Content | Last::Newline) {
                    self.paragraph();
                    self.last = Last::Paragraph;
                }
            }
        }
    }
}

/// Render a token stream with default [`TextOptions`] except the width
pub fn render_tokens(tokens: &[Token], max_width: usize, tab_width: usize) -> String {
    render_tokens_with(
        tokens,
        &TextOptions {
            max_width,
            tab_width,
        },
    )
}

/// Render a token stream into text
pub fn render_tokens_with(tokens: &[Token], options: &TextOptions) -> String {
    tracing::debug!(
        target: "texfmt::tokens",
        tokens = tokens.len(),
        max_width = options.max_width,
        tab_width = options.tab_width,
        "rendering token stream"
    );
    let mut renderer = Renderer::new(options);
    for token in tokens {
        renderer.token(token);
    }
    renderer.out
}
