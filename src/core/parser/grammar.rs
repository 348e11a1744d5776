//! The LaTeX grammar
//!
//! A PEG-style recursive descent parser. Every rule takes the position it
//! starts at and returns the position after the match together with the
//! produced value, or `None` on failure. Ordered choice is expressed by
//! trying alternatives from the same start position, so backtracking never
//! needs to undo any state.
//!
//! Failures at the furthest position reached are collected for the syntax
//! error that is reported when the top rule does not consume the input.
//!
//! Rules that open a nested sequence (groups, math, argument lists and
//! environments) are memoized by start position. None of them depends on
//! the caller, so an unclosed `[` or `\begin` is parsed once no matter how
//! many alternatives retry it.

use super::raw::{RawKind, RawNode, RawRecord};
use crate::data::{
    is_letter, is_math_environment, is_plain_char, is_space, COMMENT_ENV, PUNCTUATION,
    VERBATIM_ENV,
};
use crate::utils::error::{Location, SyntaxError};
use fxhash::FxHashMap;

type PResult<T> = Option<(usize, T)>;

/// Which flavour of `token` a sequence is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Paragraph text
    Text,
    /// Math content; whitespace folds around groups and scripts, group
    /// bodies go back to text
    Math,
    /// Inside `[...]`: `]` ends the list
    Args,
}

/// Memoized rules; the key is paired with the start position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rule {
    Group,
    Delimited(&'static str),
    ArgList,
    MathEnv,
    Env,
}

/// Parser state: the input, the furthest failure seen so far and the memo
pub(crate) struct Grammar<'a> {
    src: &'a str,
    furthest: usize,
    expected: Vec<String>,
    memo: FxHashMap<(usize, Rule), PResult<RawNode>>,
}

impl<'a> Grammar<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            furthest: 0,
            expected: Vec::new(),
            memo: FxHashMap::default(),
        }
    }

    /// `document = token* EOF`
    pub fn document(&mut self) -> Result<RawNode, SyntaxError> {
        let (pos, items) = self.sequence(0, Mode::Text, |_| false);
        if pos == self.src.len() {
            Ok(RawNode::Array(items))
        } else {
            self.fail(pos, "end of input");
            Err(self.error())
        }
    }

    fn error(&self) -> SyntaxError {
        let mut expected = self.expected.clone();
        expected.sort();
        expected.dedup();
        let found = self.peek(self.furthest).map(|c| c.to_string());
        SyntaxError::new(
            expected,
            found,
            Location::from_offset(self.src, self.furthest),
        )
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    fn fail(&mut self, pos: usize, expected: impl Into<String>) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            self.expected.push(expected.into());
        }
    }

    /// Run `rule` once per start position
    ///
    /// A replayed result skips the `fail` calls of the first run. Those
    /// failures are either still in `expected` or behind a further one.
    fn memoized(
        &mut self,
        pos: usize,
        rule: Rule,
        parse: impl FnOnce(&mut Self) -> PResult<RawNode>,
    ) -> PResult<RawNode> {
        if let Some(found) = self.memo.get(&(pos, rule)) {
            return found.clone();
        }
        let found = parse(self);
        self.memo.insert((pos, rule), found.clone());
        found
    }

    #[inline]
    fn peek(&self, pos: usize) -> Option<char> {
        self.src.get(pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    fn starts_with(&self, pos: usize, lit: &str) -> bool {
        self.src
            .get(pos..)
            .map(|rest| rest.starts_with(lit))
            .unwrap_or(false)
    }

    /// Match a literal, recording it as expected on failure
    fn lit(&mut self, pos: usize, lit: &str) -> Option<usize> {
        if self.starts_with(pos, lit) {
            Some(pos + lit.len())
        } else {
            self.fail(pos, format!("{:?}", lit));
            None
        }
    }

    fn skip_while(&self, pos: usize, pred: impl Fn(char) -> bool) -> usize {
        let rest = &self.src[pos..];
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        pos + len
    }

    fn skip_sp(&self, pos: usize) -> usize {
        self.skip_while(pos, is_space)
    }

    /// `nl = "\r\n" / "\n" / "\r"`
    fn newline(&self, pos: usize) -> Option<usize> {
        if self.starts_with(pos, "\r\n") {
            Some(pos + 2)
        } else {
            match self.peek(pos) {
                Some('\n') | Some('\r') => Some(pos + 1),
                _ => None,
            }
        }
    }

    /// Only horizontal space separates `pos` from the start of its line
    fn at_line_start(&self, pos: usize) -> bool {
        let before = self.src[..pos].trim_end_matches(is_space);
        before.is_empty() || before.ends_with('\n') || before.ends_with('\r')
    }

    // ========================================================================
    // Sequences
    // ========================================================================

    /// `(!stop token)*`; NUL bytes are skipped
    fn sequence<F>(&mut self, mut pos: usize, mode: Mode, stop: F) -> (usize, Vec<RawNode>)
    where
        F: Fn(&str) -> bool,
    {
        let mut items = Vec::new();
        while pos < self.src.len() {
            if stop(&self.src[pos..]) {
                break;
            }
            if self.peek(pos) == Some('\0') {
                pos += 1;
                continue;
            }
            match self.token(pos, mode) {
                Some((next, node)) => {
                    items.push(node);
                    pos = next;
                }
                None => break,
            }
        }
        (pos, items)
    }

    fn token(&mut self, pos: usize, mode: Mode) -> PResult<RawNode> {
        if let Some(found) = self.special_macro(pos) {
            return Some(found);
        }
        if let Some(found) = self.macro_(pos) {
            return Some(found);
        }
        if let Some(found) = self.full_comment(pos) {
            return Some(found);
        }
        match mode {
            Mode::Math => self.math_token_rest(pos),
            Mode::Text | Mode::Args => self.text_token_rest(pos, mode),
        }
    }

    fn text_token_rest(&mut self, pos: usize, mode: Mode) -> PResult<RawNode> {
        if let Some(found) = self.group(pos) {
            return Some(found);
        }
        if let Some(found) = self.dollar_inline_math(pos) {
            return Some(found);
        }
        match self.peek(pos)? {
            '&' => return Some((pos + 1, RawNode::text("&"))),
            '#' => return Some((pos + 1, RawNode::text("#"))),
            _ => {}
        }
        if let Some(end) = self.parbreak(pos) {
            return Some((end, RawNode::bare(RawKind::Parbreak)));
        }
        if let Some(found) = self.script(pos) {
            return Some(found);
        }
        if let Some(end) = self.number(pos) {
            return Some((end, RawNode::text(&self.src[pos..end])));
        }
        if let Some(end) = self.whitespace(pos) {
            return Some((end, RawNode::bare(RawKind::Whitespace)));
        }
        self.text_fallback(pos, mode)
    }

    fn math_token_rest(&mut self, pos: usize) -> PResult<RawNode> {
        let inner = self.skip_ws(pos);
        if let Some((end, group)) = self.group(inner) {
            return Some((self.skip_ws(end), group));
        }
        match self.peek(inner) {
            Some(c @ ('&' | '#')) => {
                return Some((self.skip_ws(inner + 1), RawNode::text(c.to_string())));
            }
            Some('^' | '_') => return self.script(inner),
            _ => {}
        }
        if let Some(end) = self.whitespace(pos) {
            return Some((end, RawNode::bare(RawKind::Whitespace)));
        }
        match self.peek(pos) {
            Some(c) if !matches!(c, '$' | '{' | '}' | '\\' | '%') => {
                Some((pos + c.len_utf8(), RawNode::text(c.to_string())))
            }
            _ => {
                self.fail(pos, "math token");
                None
            }
        }
    }

    /// A punctuation character alone, or a maximal run of plain characters
    fn text_fallback(&mut self, pos: usize, mode: Mode) -> PResult<RawNode> {
        match self.peek(pos) {
            Some(']') if mode == Mode::Args => None,
            Some(c) if PUNCTUATION.contains(&c) => {
                Some((pos + c.len_utf8(), RawNode::text(c.to_string())))
            }
            Some(c) if is_plain_char(c) => {
                let end = self.skip_while(pos, is_plain_char);
                Some((end, RawNode::text(&self.src[pos..end])))
            }
            _ => {
                self.fail(pos, "text");
                None
            }
        }
    }

    // ========================================================================
    // Whitespace
    // ========================================================================

    /// `whitespace = sp* nl sp* / sp+`
    fn whitespace(&self, pos: usize) -> Option<usize> {
        let p = self.skip_sp(pos);
        if let Some(after) = self.newline(p) {
            return Some(self.skip_sp(after));
        }
        if p > pos {
            Some(p)
        } else {
            None
        }
    }

    fn skip_ws(&self, mut pos: usize) -> usize {
        while let Some(next) = self.whitespace(pos) {
            pos = next;
        }
        pos
    }

    /// `parbreak = sp* nl (sp* nl)+ sp*`
    fn parbreak(&self, pos: usize) -> Option<usize> {
        let mut p = self.newline(self.skip_sp(pos))?;
        let mut blank_lines = 0;
        while let Some(next) = self.newline(self.skip_sp(p)) {
            p = next;
            blank_lines += 1;
        }
        if blank_lines == 0 {
            None
        } else {
            Some(self.skip_sp(p))
        }
    }

    /// `digits "." digits / "." digits / digits "."`
    fn number(&self, pos: usize) -> Option<usize> {
        let int_end = self.skip_while(pos, |c| c.is_ascii_digit());
        if self.peek(int_end) != Some('.') {
            return None;
        }
        let frac_end = self.skip_while(int_end + 1, |c| c.is_ascii_digit());
        if int_end > pos || frac_end > int_end + 1 {
            Some(frac_end)
        } else {
            None
        }
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn full_comment(&mut self, pos: usize) -> PResult<RawNode> {
        let after_sp = self.skip_sp(pos);
        let own_line = match self.newline(after_sp) {
            Some(after_nl) => Some(self.skip_sp(after_nl)),
            None if self.at_line_start(pos) => Some(after_sp),
            None => None,
        };
        if let Some(start) = own_line {
            if self.peek(start) == Some('%') {
                return Some(self.comment_body(start, false));
            }
        }
        if self.peek(pos) == Some('%') {
            return Some(self.comment_body(pos, true));
        }
        None
    }

    /// `"%" (!nl .)* (nl / EOF)`, leaving the newline when a blank line follows
    fn comment_body(&self, pos: usize, sameline: bool) -> (usize, RawNode) {
        let start = pos + 1;
        let end = self.skip_while(start, |c| c != '\n' && c != '\r');
        let next = if self.parbreak(end).is_some() {
            end
        } else {
            self.newline(end).unwrap_or(end)
        };
        let mut record =
            RawRecord::new(RawKind::Comment).with_content(RawNode::text(&self.src[start..end]));
        record.sameline = sameline;
        (next, RawNode::record(record))
    }

    // ========================================================================
    // Groups, math, scripts
    // ========================================================================

    /// `"{" token* "}"`; the body is text even inside math, so spacing in
    /// `\text{...}` survives
    fn group(&mut self, pos: usize) -> PResult<RawNode> {
        if self.peek(pos) != Some('{') {
            return None;
        }
        self.memoized(pos, Rule::Group, |g| {
            let (p, items) = g.sequence(pos + 1, Mode::Text, |rest| rest.starts_with('}'));
            let p = g.lit(p, "}")?;
            Some((
                p,
                RawNode::record(
                    RawRecord::new(RawKind::Group).with_content(RawNode::Array(items)),
                ),
            ))
        })
    }

    /// Math content between two literal delimiters
    fn delimited_math(
        &mut self,
        pos: usize,
        open: &'static str,
        close: &'static str,
        kind: RawKind,
    ) -> PResult<RawNode> {
        if !self.starts_with(pos, open) {
            return None;
        }
        self.memoized(pos, Rule::Delimited(open), |g| {
            let (p, items) = g.sequence(pos + open.len(), Mode::Math, |rest| {
                rest.starts_with(close)
            });
            let p = g.lit(p, close)?;
            Some((
                p,
                RawNode::record(RawRecord::new(kind).with_content(RawNode::Array(items))),
            ))
        })
    }

    fn dollar_inline_math(&mut self, pos: usize) -> PResult<RawNode> {
        self.delimited_math(pos, "$", "$", RawKind::InlineMath)
    }

    /// `^`/`_` followed by exactly one math token as the base
    fn script(&mut self, pos: usize) -> PResult<RawNode> {
        let kind = match self.peek(pos)? {
            '^' => RawKind::Superscript,
            '_' => RawKind::Subscript,
            _ => return None,
        };
        let after = pos + 1;
        let base_start = self.skip_ws(after);
        // A group base keeps the space after it
        let base = match self.peek(base_start) {
            None | Some('}') | Some('$') => None,
            Some('{') => self.group(base_start),
            Some(_) => self.token(base_start, Mode::Math),
        };
        let mut record = RawRecord::new(kind);
        let end = match base {
            Some((end, node)) => {
                record.content = Some(Box::new(node));
                end
            }
            None => after,
        };
        Some((end, RawNode::record(record)))
    }

    // ========================================================================
    // Macros
    // ========================================================================

    fn special_macro(&mut self, pos: usize) -> PResult<RawNode> {
        match self.peek(pos)? {
            '\\' => {}
            '$' => return self.delimited_math(pos, "$$", "$$", RawKind::DisplayMath),
            _ => return None,
        }
        self.verb(pos)
            .or_else(|| self.verbatim_env(pos, VERBATIM_ENV, RawKind::Verbatim))
            .or_else(|| self.verbatim_env(pos, COMMENT_ENV, RawKind::CommentEnv))
            .or_else(|| self.delimited_math(pos, "\\[", "\\]", RawKind::DisplayMath))
            .or_else(|| self.delimited_math(pos, "\\(", "\\)", RawKind::InlineMath))
            .or_else(|| self.math_environment(pos))
            .or_else(|| self.environment(pos))
    }

    /// `\verb<d>...<d>` where `d` is neither a letter nor whitespace
    fn verb(&mut self, pos: usize) -> PResult<RawNode> {
        if !self.starts_with(pos, "\\verb") {
            return None;
        }
        let open = pos + "\\verb".len();
        let delimiter = self.peek(open)?;
        if is_letter(delimiter) || delimiter.is_whitespace() {
            return None;
        }
        let start = open + delimiter.len_utf8();
        let len = self.src[start..].find(delimiter)?;
        let mut record = RawRecord::new(RawKind::Verb)
            .with_content(RawNode::text(&self.src[start..start + len]));
        record.delimiter = Some(delimiter);
        Some((start + len + delimiter.len_utf8(), RawNode::record(record)))
    }

    /// An environment whose body is captured byte for byte
    fn verbatim_env(&mut self, pos: usize, name: &str, kind: RawKind) -> PResult<RawNode> {
        let open = format!("\\begin{{{}}}", name);
        if !self.starts_with(pos, &open) {
            return None;
        }
        let start = pos + open.len();
        let close = format!("\\end{{{}}}", name);
        let len = match self.src[start..].find(&close) {
            Some(len) => len,
            None => {
                self.fail(self.src.len(), format!("{:?}", close));
                return None;
            }
        };
        let mut end = start + len + close.len();
        if kind == RawKind::CommentEnv {
            end = self.newline(end).unwrap_or(end);
        }
        let record = RawRecord::new(kind).with_content(RawNode::text(&self.src[start..start + len]));
        Some((end, RawNode::record(record)))
    }

    /// `\begin{name}`, returning the name
    fn begin_tag(&mut self, pos: usize) -> PResult<&'a str> {
        if !self.starts_with(pos, "\\begin") {
            return None;
        }
        let open = self.lit(pos + "\\begin".len(), "{")?;
        let close = self.skip_while(open, |c| c != '}' && c != '{');
        let end = self.lit(close, "}")?;
        let src: &'a str = self.src;
        Some((end, &src[open..close]))
    }

    /// Consume `\end{name}`, recording it as expected when absent
    fn end_tag(&mut self, pos: usize, name: &str) -> Option<usize> {
        self.lit(pos, &format!("\\end{{{}}}", name))
    }

    fn math_environment(&mut self, pos: usize) -> PResult<RawNode> {
        if !self.starts_with(pos, "\\begin") {
            return None;
        }
        self.memoized(pos, Rule::MathEnv, |g| {
            let (p, name) = g.begin_tag(pos)?;
            if !is_math_environment(name) {
                return None;
            }
            let close = format!("\\end{{{}}}", name);
            let (p, items) = g.sequence(p, Mode::Math, |rest| rest.starts_with(&close));
            let p = g.end_tag(p, name)?;
            let record = RawRecord::new(RawKind::MathEnv)
                .with_name(name)
                .with_content(RawNode::Array(items));
            Some((p, RawNode::record(record)))
        })
    }

    fn environment(&mut self, pos: usize) -> PResult<RawNode> {
        if !self.starts_with(pos, "\\begin") {
            return None;
        }
        self.memoized(pos, Rule::Env, |g| {
            let (p, name) = g.begin_tag(pos)?;
            let (p, args) = match g.argument_list(p) {
                Some((after, args)) => (after, Some(args)),
                None => (p, None),
            };
            let close = format!("\\end{{{}}}", name);
            let (p, items) = g.sequence(p, Mode::Text, |rest| rest.starts_with(&close));
            let p = g.end_tag(p, name)?;
            let record = RawRecord::new(RawKind::Environment)
                .with_name(name)
                .with_args(args)
                .with_content(RawNode::Array(items));
            Some((p, RawNode::record(record)))
        })
    }

    /// `\` followed by letters or by any single character, then `[args]?`
    fn macro_(&mut self, pos: usize) -> PResult<RawNode> {
        if self.peek(pos) != Some('\\') {
            return None;
        }
        let start = pos + 1;
        let end = match self.peek(start) {
            Some(c) if is_letter(c) => self.skip_while(start, is_letter),
            Some(c) => start + c.len_utf8(),
            None => {
                self.fail(start, "macro name");
                return None;
            }
        };
        let name = &self.src[start..end];
        if name == "begin" || name == "end" {
            return None;
        }
        let (end, args) = match self.argument_list(end) {
            Some((after, args)) => (after, Some(args)),
            None => (end, None),
        };
        let record = RawRecord::new(RawKind::Macro)
            .with_name(name)
            .with_args(args);
        Some((end, RawNode::record(record)))
    }

    /// `whitespace? "[" (args_token / ",")* "]"`
    fn argument_list(&mut self, pos: usize) -> PResult<RawNode> {
        let open = self.whitespace(pos).unwrap_or(pos);
        if self.peek(open) != Some('[') {
            return None;
        }
        self.memoized(open, Rule::ArgList, |g| {
            let (p, items) = g.sequence(open + 1, Mode::Args, |rest| rest.starts_with(']'));
            let p = g.lit(p, "]")?;
            let record = RawRecord::new(RawKind::ArgList).with_content(RawNode::Array(items));
            Some((p, RawNode::record(record)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<RawNode> {
        match Grammar::new(src).document() {
            Ok(RawNode::Array(items)) => items,
            other => panic!("unexpected parse result {:?}", other),
        }
    }

    fn kinds(src: &str) -> Vec<Option<RawKind>> {
        parse(src).iter().map(RawNode::kind).collect()
    }

    #[test]
    fn test_words_and_punctuation() {
        assert_eq!(
            parse("Hi, you."),
            vec![
                RawNode::text("Hi"),
                RawNode::text(","),
                RawNode::bare(RawKind::Whitespace),
                RawNode::text("you"),
                RawNode::text("."),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("3.14"), vec![RawNode::text("3.14")]);
        assert_eq!(parse(".5"), vec![RawNode::text(".5")]);
        assert_eq!(parse("2."), vec![RawNode::text("2.")]);
        assert_eq!(parse("12"), vec![RawNode::text("12")]);
    }

    #[test]
    fn test_parbreak_versus_whitespace() {
        assert_eq!(
            kinds("a \n b"),
            vec![None, Some(RawKind::Whitespace), None]
        );
        assert_eq!(
            kinds("a\n \n\nb"),
            vec![None, Some(RawKind::Parbreak), None]
        );
    }

    #[test]
    fn test_macro_forms() {
        let items = parse(r"\alpha\,\\");
        let names: Vec<_> = items
            .iter()
            .map(|n| match n {
                RawNode::Record(r) => r.name.clone().unwrap_or_default(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(names, vec!["alpha", ",", "\\"]);
    }

    #[test]
    fn test_macro_argument_list() {
        let items = parse(r"\item [a, b] c");
        match &items[0] {
            RawNode::Record(r) => {
                let args = r.args.as_ref().expect("args");
                assert_eq!(args.kind(), Some(RawKind::ArgList));
            }
            other => panic!("expected macro, got {:?}", other),
        }
        // Unclosed bracket backtracks to a plain macro
        let items = parse(r"\foo [a");
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn test_environment_names_must_match() {
        assert!(Grammar::new(r"\begin{foo}x\end{bar}").document().is_err());
        assert_eq!(kinds(r"\begin{foo}x\end{foo}"), vec![Some(RawKind::Environment)]);
    }

    #[test]
    fn test_math_environment_is_closed_set() {
        assert_eq!(kinds(r"\begin{align}x\end{align}"), vec![Some(RawKind::MathEnv)]);
        assert_eq!(
            kinds(r"\begin{matrix}x\end{matrix}"),
            vec![Some(RawKind::Environment)]
        );
    }

    #[test]
    fn test_verbatim_forms() {
        let items = parse("\\begin{verbatim}a  b\\end{verbatim}");
        match &items[0] {
            RawNode::Record(r) => {
                assert_eq!(r.kind, RawKind::Verbatim);
                assert_eq!(r.content.as_deref(), Some(&RawNode::text("a  b")));
            }
            other => panic!("expected verbatim, got {:?}", other),
        }
        let items = parse(r"\verb|x  y|");
        match &items[0] {
            RawNode::Record(r) => {
                assert_eq!(r.kind, RawKind::Verb);
                assert_eq!(r.delimiter, Some('|'));
            }
            other => panic!("expected verb, got {:?}", other),
        }
        // A letter cannot delimit
        assert_eq!(kinds(r"\verbatim"), vec![Some(RawKind::Macro)]);
    }

    #[test]
    fn test_comment_env_consumes_newline() {
        assert_eq!(
            kinds("\\begin{comment}x\\end{comment}\ny"),
            vec![Some(RawKind::CommentEnv), None]
        );
    }

    #[test]
    fn test_comments() {
        let items = parse("a % same\n% own\nb");
        let flags: Vec<_> = items
            .iter()
            .filter_map(|n| match n {
                RawNode::Record(r) if r.kind == RawKind::Comment => Some(r.sameline),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false]);
        assert_eq!(items.last(), Some(&RawNode::text("b")));
    }

    #[test]
    fn test_comment_keeps_paragraph_break() {
        assert_eq!(
            kinds("%c\n\nb"),
            vec![Some(RawKind::Comment), Some(RawKind::Parbreak), None]
        );
    }

    #[test]
    fn test_math_delimiters() {
        assert_eq!(kinds("$x$"), vec![Some(RawKind::InlineMath)]);
        assert_eq!(kinds(r"\(x\)"), vec![Some(RawKind::InlineMath)]);
        assert_eq!(kinds(r"\[x\]"), vec![Some(RawKind::DisplayMath)]);
        assert_eq!(kinds("$$x$$"), vec![Some(RawKind::DisplayMath)]);
    }

    #[test]
    fn test_nested_scripts() {
        let items = parse("$x^2_3$");
        let math = match &items[0] {
            RawNode::Record(r) => r.content.as_deref().cloned(),
            _ => None,
        };
        let kinds: Vec<_> = match math {
            Some(RawNode::Array(items)) => items.iter().map(RawNode::kind).collect(),
            other => panic!("expected array, got {:?}", other),
        };
        assert_eq!(
            kinds,
            vec![None, Some(RawKind::Superscript), Some(RawKind::Subscript)]
        );
    }

    #[test]
    fn test_script_without_base() {
        match &parse("{x^}")[0] {
            RawNode::Record(group) => match group.content.as_deref() {
                Some(RawNode::Array(items)) => match &items[1] {
                    RawNode::Record(r) => assert!(r.content.is_none()),
                    other => panic!("expected script, got {:?}", other),
                },
                other => panic!("expected array, got {:?}", other),
            },
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_math_group_body_keeps_spaces() {
        let math = match &parse(r"$\text{a {b} c}$")[0] {
            RawNode::Record(r) => r.content.as_deref().cloned(),
            _ => None,
        };
        let group = match math {
            Some(RawNode::Array(items)) => items[1].clone(),
            other => panic!("expected array, got {:?}", other),
        };
        match group {
            RawNode::Record(r) => match r.content.as_deref() {
                Some(RawNode::Array(items)) => assert_eq!(
                    items.iter().map(RawNode::kind).collect::<Vec<_>>(),
                    vec![
                        None,
                        Some(RawKind::Whitespace),
                        Some(RawKind::Group),
                        Some(RawKind::Whitespace),
                        None,
                    ]
                ),
                other => panic!("expected array, got {:?}", other),
            },
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_group_script_base_keeps_following_space() {
        assert_eq!(
            kinds("x^{a} b"),
            vec![
                None,
                Some(RawKind::Superscript),
                Some(RawKind::Whitespace),
                None
            ]
        );
    }

    #[test]
    fn test_unclosed_openers_do_not_backtrack_exponentially() {
        use std::time::{Duration, Instant};

        let budget = Duration::from_secs(2);
        let intervals = "Let $x \\in [0,1)$ hold.\n".repeat(40);
        let start = Instant::now();
        assert!(Grammar::new(&intervals).document().is_ok());
        assert!(Grammar::new(&"\\a[".repeat(60)).document().is_ok());
        assert!(Grammar::new(&"\\begin{equation}".repeat(60)).document().is_err());
        assert!(Grammar::new(&"\\begin{x}[".repeat(60)).document().is_err());
        assert!(start.elapsed() < budget, "took {:?}", start.elapsed());
    }

    #[test]
    fn test_null_bytes_are_ignored() {
        assert_eq!(parse("a\0b"), vec![RawNode::text("a"), RawNode::text("b")]);
    }

    #[test]
    fn test_error_location() {
        let err = Grammar::new("ab\n{cd").document().unwrap_err();
        assert_eq!(err.location.line, 2);
        assert_eq!(err.location.column, 4);
        assert_eq!(err.expected, vec!["\"}\"".to_string()]);
        assert_eq!(err.found, None);
    }

    #[test]
    fn test_stray_closing_brace() {
        let err = Grammar::new("a}").document().unwrap_err();
        assert_eq!(err.location.offset, 1);
        assert_eq!(err.found.as_deref(), Some("}"));
        assert!(err.expected.contains(&"end of input".to_string()));
    }
}
