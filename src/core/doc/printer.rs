//! Width-driven layout of a [`Doc`]
//!
//! The algorithm keeps an explicit stack of `(indentation, mode, doc)`
//! commands. Groups are printed flat when their contents, followed by the
//! commands still queued up to the next possible newline, fit in the
//! remaining width; otherwise they break. Fills break separators one at a
//! time.

use std::rc::Rc;

use super::{AlignKind, Doc};
use crate::core::options::PrintOptions;

/// Result of laying out a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintedDoc {
    pub formatted: String,
    /// Byte offset of the first [`Doc::Cursor`], if any was printed
    pub cursor_offset: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Break,
    Flat,
}

// ============================================================================
// Indentation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum IndentPart {
    Indent,
    StringAlign(String),
    NumberAlign(usize),
}

#[derive(Debug, Clone, Default)]
struct Indentation {
    value: String,
    length: usize,
    queue: Vec<IndentPart>,
    root: Option<Rc<Indentation>>,
}

/// Accumulates the rendered indentation string; alignment in columns is
/// emitted as spaces after any tabs.
struct IndentWriter<'o> {
    options: &'o PrintOptions,
    value: String,
    length: usize,
    last_tabs: usize,
    last_spaces: usize,
}

impl<'o> IndentWriter<'o> {
    fn add_tabs(&mut self, count: usize) {
        self.value.extend(std::iter::repeat('\t').take(count));
        self.length += self.options.tab_width * count;
    }

    fn add_spaces(&mut self, count: usize) {
        self.value.extend(std::iter::repeat(' ').take(count));
        self.length += count;
    }

    fn flush(&mut self) {
        if self.options.use_tabs {
            self.flush_tabs();
        } else {
            self.flush_spaces();
        }
    }

    fn flush_tabs(&mut self) {
        if self.last_tabs > 0 {
            self.add_tabs(self.last_tabs);
        }
        self.reset_last();
    }

    fn flush_spaces(&mut self) {
        if self.last_spaces > 0 {
            self.add_spaces(self.last_spaces);
        }
        self.reset_last();
    }

    fn reset_last(&mut self) {
        self.last_tabs = 0;
        self.last_spaces = 0;
    }
}

fn generate_indent(
    ind: &Indentation,
    part: Option<IndentPart>,
    options: &PrintOptions,
) -> Indentation {
    let mut queue = ind.queue.clone();
    match part {
        Some(part) => queue.push(part),
        None => {
            queue.pop();
        }
    }

    let mut writer = IndentWriter {
        options,
        value: String::new(),
        length: 0,
        last_tabs: 0,
        last_spaces: 0,
    };
    for part in &queue {
        match part {
            IndentPart::Indent => {
                writer.flush();
                if options.use_tabs {
                    writer.add_tabs(1);
                } else {
                    writer.add_spaces(options.tab_width);
                }
            }
            IndentPart::StringAlign(s) => {
                writer.flush();
                writer.value.push_str(s);
                writer.length += s.chars().count();
            }
            IndentPart::NumberAlign(n) => {
                writer.last_tabs += 1;
                writer.last_spaces += n;
            }
        }
    }
    writer.flush_spaces();

    Indentation {
        value: writer.value,
        length: writer.length,
        queue,
        root: ind.root.clone(),
    }
}

fn make_indent(ind: &Rc<Indentation>, options: &PrintOptions) -> Rc<Indentation> {
    Rc::new(generate_indent(ind, Some(IndentPart::Indent), options))
}

fn make_align(ind: &Rc<Indentation>, kind: &AlignKind, options: &PrintOptions) -> Rc<Indentation> {
    match kind {
        AlignKind::DedentToRoot => ind.root.clone().unwrap_or_default(),
        AlignKind::Dedent => Rc::new(generate_indent(ind, None, options)),
        AlignKind::Width(0) => ind.clone(),
        AlignKind::Str(s) if s.is_empty() => ind.clone(),
        AlignKind::MarkRoot => {
            let mut marked = Indentation::clone(ind);
            marked.root = Some(ind.clone());
            Rc::new(marked)
        }
        AlignKind::Width(n) => Rc::new(generate_indent(
            ind,
            Some(IndentPart::NumberAlign(*n)),
            options,
        )),
        AlignKind::Str(s) => Rc::new(generate_indent(
            ind,
            Some(IndentPart::StringAlign(s.clone())),
            options,
        )),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// What a command prints: a doc, or a slice of a fill's parts
#[derive(Debug, Clone, Copy)]
enum Item<'d> {
    Doc(&'d Doc),
    Concat(&'d [Doc]),
    Fill(&'d [Doc]),
}

#[derive(Debug, Clone)]
struct Cmd<'d> {
    ind: Rc<Indentation>,
    mode: Mode,
    item: Item<'d>,
}

impl<'d> Cmd<'d> {
    fn new(ind: Rc<Indentation>, mode: Mode, doc: &'d Doc) -> Self {
        Self {
            ind,
            mode,
            item: Item::Doc(doc),
        }
    }
}

static HARD_LINE: Doc = Doc::Line {
    hard: true,
    soft: false,
    literal: false,
};

fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Remove trailing spaces and tabs, never reaching back before `floor`
fn trim(out: &mut String, floor: usize) -> usize {
    let tail = &out[floor..];
    let kept = tail.trim_end_matches([' ', '\t']).len();
    let trimmed = tail.len() - kept;
    out.truncate(floor + kept);
    trimmed
}

// ============================================================================
// Break propagation
// ============================================================================

/// Mark every group that contains a hard break as broken
///
/// Returns whether `doc` forces its enclosing group to break.
fn propagate_breaks(doc: &mut Doc) -> bool {
    match doc {
        Doc::BreakParent => true,
        Doc::Group {
            contents,
            should_break,
            expanded_states,
        } => {
            let mut child_breaks = propagate_breaks(contents);
            if let Some(states) = expanded_states {
                for state in states.iter_mut() {
                    child_breaks |= propagate_breaks(state);
                }
            }
            if child_breaks && expanded_states.is_none() {
                *should_break = true;
            }
            *should_break
        }
        Doc::Concat(parts) | Doc::Fill(parts) => parts
            .iter_mut()
            .fold(false, |acc, part| propagate_breaks(part) || acc),
        Doc::Indent(contents) | Doc::Align { contents, .. } | Doc::LineSuffix(contents) => {
            propagate_breaks(contents)
        }
        Doc::IfBreak {
            break_contents,
            flat_contents,
        } => {
            let broken = propagate_breaks(break_contents);
            propagate_breaks(flat_contents) || broken
        }
        _ => false,
    }
}

// ============================================================================
// Fits
// ============================================================================

/// Whether `next`, followed by `rest` up to the first newline, fits in `width`
fn fits<'d>(
    next: &Cmd<'d>,
    rest: &[Cmd<'d>],
    width: isize,
    mut has_line_suffix: bool,
    must_be_flat: bool,
) -> bool {
    let mut width = width;
    let mut rest_idx = rest.len();
    let mut stack: Vec<(Mode, Item<'d>)> = vec![(next.mode, next.item)];
    let mut out = String::new();

    while width >= 0 {
        let (mode, item) = match stack.pop() {
            Some(entry) => entry,
            None => {
                if rest_idx == 0 {
                    return true;
                }
                rest_idx -= 1;
                stack.push((rest[rest_idx].mode, rest[rest_idx].item));
                continue;
            }
        };

        let doc = match item {
            Item::Doc(doc) => doc,
            Item::Concat(parts) | Item::Fill(parts) => {
                for part in parts.iter().rev() {
                    stack.push((mode, Item::Doc(part)));
                }
                continue;
            }
        };

        match doc {
            Doc::Text(s) => {
                match s.find('\n') {
                    Some(i) => {
                        width -= text_width(&s[..i]) as isize;
                        return width >= 0;
                    }
                    None => width -= text_width(s) as isize,
                }
                out.push_str(s);
            }
            Doc::Concat(parts) | Doc::Fill(parts) => {
                for part in parts.iter().rev() {
                    stack.push((mode, Item::Doc(part)));
                }
            }
            Doc::Indent(contents) | Doc::Align { contents, .. } => {
                stack.push((mode, Item::Doc(contents)));
            }
            Doc::Trim => width += trim(&mut out, 0) as isize,
            Doc::Group {
                contents,
                should_break,
                expanded_states,
            } => {
                if must_be_flat && *should_break {
                    return false;
                }
                let group_mode = if *should_break { Mode::Break } else { mode };
                let contents = match expanded_states {
                    Some(states) if group_mode == Mode::Break => {
                        states.last().unwrap_or(&**contents)
                    }
                    _ => &**contents,
                };
                stack.push((group_mode, Item::Doc(contents)));
            }
            Doc::IfBreak {
                break_contents,
                flat_contents,
            } => {
                let contents = if mode == Mode::Break {
                    break_contents
                } else {
                    flat_contents
                };
                stack.push((mode, Item::Doc(contents)));
            }
            Doc::Line { hard, soft, .. } => {
                if mode == Mode::Break || *hard {
                    return true;
                }
                if !*soft {
                    out.push(' ');
                    width -= 1;
                }
            }
            Doc::LineSuffix(_) => has_line_suffix = true,
            Doc::LineSuffixBoundary => {
                if has_line_suffix {
                    return true;
                }
            }
            Doc::BreakParent | Doc::Cursor => {}
        }
    }
    false
}

// ============================================================================
// Printer
// ============================================================================

struct Printer<'d, 'o> {
    options: &'o PrintOptions,
    width: isize,
    pos: isize,
    out: String,
    cmds: Vec<Cmd<'d>>,
    line_suffix: Vec<Cmd<'d>>,
    should_remeasure: bool,
    cursors: Vec<usize>,
}

impl<'d, 'o> Printer<'d, 'o> {
    fn trim(&mut self) {
        let floor = self.cursors.last().copied().unwrap_or(0);
        self.pos -= trim(&mut self.out, floor) as isize;
    }

    fn text(&mut self, s: &str) {
        self.out.push_str(s);
        match s.rfind('\n') {
            Some(i) => self.pos = text_width(&s[i + 1..]) as isize,
            None => self.pos += text_width(s) as isize,
        }
    }

    fn group(&mut self, cmd: &Cmd<'d>, doc: &'d Doc) {
        let Doc::Group {
            contents,
            should_break,
            expanded_states,
        } = doc
        else {
            return;
        };

        if cmd.mode == Mode::Flat && !self.should_remeasure {
            let mode = if *should_break { Mode::Break } else { Mode::Flat };
            self.cmds.push(Cmd::new(cmd.ind.clone(), mode, contents));
            return;
        }

        self.should_remeasure = false;
        let next = Cmd::new(cmd.ind.clone(), Mode::Flat, contents);
        let rem = self.width - self.pos;
        let has_line_suffix = !self.line_suffix.is_empty();
        if !*should_break && fits(&next, &self.cmds, rem, has_line_suffix, false) {
            self.cmds.push(next);
            return;
        }

        let Some(states) = expanded_states else {
            self.cmds.push(Cmd::new(cmd.ind.clone(), Mode::Break, contents));
            return;
        };
        let Some(most_expanded) = states.last() else {
            self.cmds.push(Cmd::new(cmd.ind.clone(), Mode::Break, contents));
            return;
        };
        if *should_break {
            self.cmds
                .push(Cmd::new(cmd.ind.clone(), Mode::Break, most_expanded));
            return;
        }
        for state in &states[1..] {
            let candidate = Cmd::new(cmd.ind.clone(), Mode::Flat, state);
            if fits(&candidate, &self.cmds, rem, has_line_suffix, false) {
                self.cmds.push(candidate);
                return;
            }
        }
        self.cmds
            .push(Cmd::new(cmd.ind.clone(), Mode::Break, most_expanded));
    }

    fn fill(&mut self, cmd: &Cmd<'d>, parts: &'d [Doc]) {
        let Some(content) = parts.first() else {
            return;
        };
        let ind = &cmd.ind;
        let rem = self.width - self.pos;
        let has_line_suffix = !self.line_suffix.is_empty();

        let content_flat = Cmd::new(ind.clone(), Mode::Flat, content);
        let content_break = Cmd::new(ind.clone(), Mode::Break, content);
        let content_fits = fits(&content_flat, &[], rem, has_line_suffix, true);

        if parts.len() == 1 {
            self.cmds.push(if content_fits {
                content_flat
            } else {
                content_break
            });
            return;
        }

        let whitespace = &parts[1];
        let whitespace_flat = Cmd::new(ind.clone(), Mode::Flat, whitespace);
        let whitespace_break = Cmd::new(ind.clone(), Mode::Break, whitespace);

        if parts.len() == 2 {
            if content_fits {
                self.cmds.push(whitespace_flat);
                self.cmds.push(content_flat);
            } else {
                self.cmds.push(whitespace_break);
                self.cmds.push(content_break);
            }
            return;
        }

        let remaining = Cmd {
            ind: ind.clone(),
            mode: cmd.mode,
            item: Item::Fill(&parts[2..]),
        };
        let first_and_second = Cmd {
            ind: ind.clone(),
            mode: Mode::Flat,
            item: Item::Concat(&parts[..3]),
        };
        let both_fit = fits(&first_and_second, &[], rem, has_line_suffix, true);

        self.cmds.push(remaining);
        if both_fit {
            self.cmds.push(whitespace_flat);
            self.cmds.push(content_flat);
        } else if content_fits {
            self.cmds.push(whitespace_break);
            self.cmds.push(content_flat);
        } else {
            self.cmds.push(whitespace_break);
            self.cmds.push(content_break);
        }
    }

    fn line(&mut self, cmd: Cmd<'d>, hard: bool, soft: bool, literal: bool) {
        if cmd.mode == Mode::Flat {
            if !hard {
                if !soft {
                    self.out.push(' ');
                    self.pos += 1;
                }
                return;
            }
            self.should_remeasure = true;
        }

        if !self.line_suffix.is_empty() {
            self.cmds.push(cmd);
            while let Some(suffix) = self.line_suffix.pop() {
                self.cmds.push(suffix);
            }
            return;
        }

        if literal {
            self.out.push('\n');
            match &cmd.ind.root {
                Some(root) => {
                    self.out.push_str(&root.value);
                    self.pos = root.length as isize;
                }
                None => self.pos = 0,
            }
        } else {
            self.trim();
            self.out.push('\n');
            self.out.push_str(&cmd.ind.value);
            self.pos = cmd.ind.length as isize;
        }
    }

    fn run(&mut self) {
        while let Some(cmd) = self.cmds.pop() {
            let doc = match cmd.item {
                Item::Doc(doc) => doc,
                Item::Concat(parts) => {
                    for part in parts.iter().rev() {
                        self.cmds.push(Cmd::new(cmd.ind.clone(), cmd.mode, part));
                    }
                    continue;
                }
                Item::Fill(parts) => {
                    self.fill(&cmd, parts);
                    continue;
                }
            };

            match doc {
                Doc::Text(s) => self.text(s),
                Doc::Concat(parts) => {
                    for part in parts.iter().rev() {
                        self.cmds.push(Cmd::new(cmd.ind.clone(), cmd.mode, part));
                    }
                }
                Doc::Cursor => {
                    if self.cursors.len() < 2 {
                        self.cursors.push(self.out.len());
                    } else {
                        tracing::warn!(target: "texfmt::doc", "ignoring extra cursor");
                    }
                }
                Doc::Indent(contents) => {
                    let ind = make_indent(&cmd.ind, self.options);
                    self.cmds.push(Cmd::new(ind, cmd.mode, contents));
                }
                Doc::Align { kind, contents } => {
                    let ind = make_align(&cmd.ind, kind, self.options);
                    self.cmds.push(Cmd::new(ind, cmd.mode, contents));
                }
                Doc::Trim => self.trim(),
                Doc::Group { .. } => self.group(&cmd, doc),
                Doc::Fill(parts) => self.fill(&cmd, parts),
                Doc::IfBreak {
                    break_contents,
                    flat_contents,
                } => {
                    let contents = if cmd.mode == Mode::Break {
                        break_contents
                    } else {
                        flat_contents
                    };
                    self.cmds.push(Cmd::new(cmd.ind.clone(), cmd.mode, contents));
                }
                Doc::LineSuffix(contents) => {
                    self.line_suffix
                        .push(Cmd::new(cmd.ind.clone(), cmd.mode, contents));
                }
                Doc::LineSuffixBoundary => {
                    if !self.line_suffix.is_empty() {
                        self.cmds.push(Cmd::new(cmd.ind.clone(), cmd.mode, &HARD_LINE));
                    }
                }
                Doc::Line {
                    hard,
                    soft,
                    literal,
                } => self.line(cmd.clone(), *hard, *soft, *literal),
                Doc::BreakParent => {}
            }

            if self.cmds.is_empty() && !self.line_suffix.is_empty() {
                while let Some(suffix) = self.line_suffix.pop() {
                    self.cmds.push(suffix);
                }
            }
        }
    }
}

/// Lay out `doc` within `options.print_width` columns
pub fn render_doc(mut doc: Doc, options: &PrintOptions) -> PrintedDoc {
    propagate_breaks(&mut doc);
    tracing::debug!(target: "texfmt::doc", doc = ?doc, "format doc");

    let mut printer = Printer {
        options,
        width: options.print_width as isize,
        pos: 0,
        out: String::new(),
        cmds: vec![Cmd::new(Rc::default(), Mode::Break, &doc)],
        line_suffix: Vec::new(),
        should_remeasure: false,
        cursors: Vec::new(),
    };
    printer.run();

    PrintedDoc {
        formatted: printer.out,
        cursor_offset: printer.cursors.first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use super::*;

    fn print(doc: Doc, width: usize) -> String {
        let options = PrintOptions {
            print_width: width,
            ..PrintOptions::default()
        };
        render_doc(doc, &options).formatted
    }

    fn words(list: &[&str]) -> Vec<Doc> {
        list.iter().map(|w| text(*w)).collect()
    }

    #[test]
    fn test_group_fits_flat() {
        let doc = group(join(line(), words(&["a", "b", "c"])));
        assert_eq!(print(doc, 10), "a b c");
    }

    #[test]
    fn test_group_breaks_when_too_wide() {
        let doc = group(join(line(), words(&["aaaa", "bbbb", "cccc"])));
        assert_eq!(print(doc, 10), "aaaa\nbbbb\ncccc");
    }

    #[test]
    fn test_fits_counts_rest_commands() {
        // The group fits alone but not with the text queued after it
        let doc = concat(vec![
            group(join(line(), words(&["aa", "bb"]))),
            text("cccccc"),
        ]);
        assert_eq!(print(doc, 10), "aa\nbbcccccc");
    }

    #[test]
    fn test_softline_and_indent() {
        let doc = group(concat(vec![
            text("["),
            indent(concat(vec![softline(), text("aaaaaaaa")])),
            softline(),
            text("]"),
        ]));
        assert_eq!(print(doc.clone(), 20), "[aaaaaaaa]");
        assert_eq!(print(doc, 5), "[\n\taaaaaaaa\n]");
    }

    #[test]
    fn test_spaces_indentation() {
        let doc = concat(vec![text("a"), indent(concat(vec![hardline(), text("b")]))]);
        let options = PrintOptions::spaces(2);
        assert_eq!(render_doc(doc, &options).formatted, "a\n  b");
    }

    #[test]
    fn test_hardline_breaks_enclosing_group() {
        let doc = group(concat(vec![text("a"), line(), text("b"), hardline(), text("c")]));
        assert_eq!(print(doc, 80), "a\nb\nc");
    }

    #[test]
    fn test_fill_wraps_greedily() {
        let doc = fill(vec![
            text("aaaa"),
            line(),
            text("bbbb"),
            line(),
            text("cccc"),
            line(),
            text("dd"),
        ]);
        assert_eq!(print(doc, 10), "aaaa bbbb\ncccc dd");
    }

    #[test]
    fn test_expanded_states() {
        let wide = text("aaaaaaaaaaaa");
        let narrow = concat(vec![text("aaaaaa"), hardline(), text("aaaaaa")]);
        let doc = conditional_group(vec![wide.clone(), text("aaa"), narrow.clone()]);
        assert_eq!(print(doc, 5), "aaa");
        let doc = conditional_group(vec![wide, narrow]);
        assert_eq!(print(doc, 5), "aaaaaa\naaaaaa");
    }

    #[test]
    fn test_if_break() {
        let doc = group(concat(vec![
            text("a"),
            line(),
            text("b"),
            if_break(text(","), text("")),
        ]));
        assert_eq!(print(doc.clone(), 10), "a b");
        assert_eq!(print(doc, 2), "a\nb,");
    }

    #[test]
    fn test_line_suffix_flushes_before_newline() {
        let doc = concat(vec![
            text("a"),
            line_suffix(text(" % c")),
            text("b"),
            hardline(),
            text("d"),
        ]);
        assert_eq!(print(doc, 80), "ab % c\nd");
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let doc = concat(vec![text("a  "), hardline(), text("b"), text(" \t"), Doc::Trim]);
        assert_eq!(print(doc, 80), "a\nb");
    }

    #[test]
    fn test_literalline_ignores_indent() {
        let doc = indent(concat(vec![
            hardline(),
            text("x"),
            literalline(),
            text("y"),
        ]));
        assert_eq!(print(doc, 80), "\n\tx\ny");
    }

    #[test]
    fn test_align_and_dedent() {
        let doc = concat(vec![
            text("a"),
            align(
                AlignKind::Width(2),
                concat(vec![
                    hardline(),
                    text("b"),
                    align(AlignKind::Dedent, concat(vec![hardline(), text("c")])),
                ]),
            ),
        ]);
        assert_eq!(print(doc, 80), "a\n  b\nc");
    }

    #[test]
    fn test_mark_root() {
        let doc = indent(align(
            AlignKind::MarkRoot,
            indent(concat(vec![hardline(), text("a"), literalline(), text("b")])),
        ));
        assert_eq!(print(doc, 80), "\n\t\ta\n\tb");
    }

    #[test]
    fn test_cursor_offset() {
        let doc = concat(vec![text("ab"), Doc::Cursor, text("c")]);
        let printed = render_doc(doc, &PrintOptions::default());
        assert_eq!(printed.formatted, "abc");
        assert_eq!(printed.cursor_offset, Some(2));
    }
}
