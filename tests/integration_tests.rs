//! Integration tests for texfmt parsing and printing

use texfmt::core::doc::{concat, group, indent, line, softline, text};
use texfmt::{
    annotate, diagnostics::check_latex, parse, parse_normalized, print_as_text,
    print_as_text_with, print_with_layout_engine, remove_excess_space, render_doc, walk,
    FormatError, Input, Node, NodePath, PrintOptions, Slot, TextOptions,
};

fn text_print(src: &str) -> String {
    print_as_text(Input::Text(src)).unwrap()
}

fn layout_print(src: &str, width: usize) -> String {
    let options = PrintOptions {
        print_width: width,
        ..PrintOptions::default()
    };
    print_with_layout_engine(Input::Text(src), &options).unwrap()
}

// ============================================================================
// Parsing
// ============================================================================

mod parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_environment_names_must_match() {
        assert!(matches!(
            parse(r"\begin{foo}x\end{bar}"),
            Err(FormatError::Syntax(_))
        ));

        let root = parse(r"\begin{foo}x\end{foo}").unwrap();
        assert_eq!(
            root,
            Node::list(vec![Node::Environment {
                env: "foo".to_string(),
                args: None,
                content: vec![Node::string("x")],
            }])
        );
    }

    #[test]
    fn test_verbatim_content_is_literal() {
        let root = parse("\\begin{verbatim}a  b\\end{verbatim}").unwrap();
        assert_eq!(
            root,
            Node::list(vec![Node::Verbatim {
                content: "a  b".to_string()
            }])
        );
        assert_eq!(
            text_print("\\begin{verbatim}a  b\\end{verbatim}"),
            "\\begin{verbatim}a  b\\end{verbatim}"
        );
    }

    #[test]
    fn test_numeric_literal() {
        assert_eq!(parse("3.14").unwrap(), Node::list(vec![Node::string("3.14")]));
    }

    #[test]
    fn test_math_environment() {
        let root = parse(r"\begin{align*}x&=1\end{align*}").unwrap();
        let env = root.at(&NodePath::root().child(Slot::Content, 0)).unwrap();
        assert_eq!(env.kind(), "mathenv");
        assert_eq!(env.name(), Some("align*"));
    }

    #[test]
    fn test_macro_with_arguments() {
        let root = parse(r"\documentclass[a4paper, 12pt]{article}").unwrap();
        let path = NodePath::root().child(Slot::Content, 0);
        let args = root.at(&path).unwrap().children(Slot::Args).unwrap();
        let printed: Vec<String> = args.iter().map(Node::to_string).collect();
        assert_eq!(printed, vec!["a4paper", ",", " ", "12pt"]);
    }

    #[test]
    fn test_syntax_error_location() {
        match parse("a\n{b") {
            Err(FormatError::Syntax(err)) => {
                assert_eq!(err.location.line, 2);
                assert_eq!(err.location.column, 3);
                assert_eq!(err.location.offset, 4);
                assert_eq!(err.found, None);
                assert_eq!(err.message, "Expected \"}\" but end of input found.");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_half_open_intervals_parse_quickly() {
        use std::time::{Duration, Instant};

        let src = "Let $x \\in [0,1)$ hold.\n".repeat(40);
        let start = Instant::now();
        let root = parse(&src).unwrap();
        assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
        assert_eq!(root.to_string(), src.replace('\n', " "));
    }

    #[test]
    fn test_inline_math_forms_agree() {
        let dollar = parse("$a$").unwrap();
        let paren = parse(r"\(a\)").unwrap();
        assert_eq!(dollar, paren);
    }
}

// ============================================================================
// Normalization
// ============================================================================

mod normalization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_whitespace_collapsing() {
        assert_eq!(parse_normalized("a   b").unwrap().to_string(), "a b");
        assert_eq!(parse_normalized("a\n\n\nb").unwrap().to_string(), "a\n\nb");
        assert_eq!(parse_normalized("a \n b").unwrap().to_string(), "a b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = parse_normalized("x \\begin{a}\n\n y \n\\end{a}  z\n\n\n w").unwrap();
        assert_eq!(remove_excess_space(once.clone()), once);
    }
}

// ============================================================================
// Token printer
// ============================================================================

mod text_printer {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subscript_short_form() {
        assert_eq!(text_print("x_{y}"), "x_y");
        assert_eq!(text_print("x_y"), "x_y");
        assert_eq!(text_print("x_{yz}"), "x_{yz}");
    }

    #[test]
    fn test_canonical_input_round_trips() {
        let src = "Some text here.\n\nAnother paragraph with $a+b$ inline.";
        assert_eq!(text_print(src), src);
    }

    #[test]
    fn test_lines_are_width_bounded() {
        let words = [
            "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing",
            "elit", "sed", "do", "eiusmod", "tempor", "incididunt", "ut", "labore",
        ];
        let src = words.join(" ");
        let out = print_as_text_with(Input::Text(&src), &TextOptions::with_width(20)).unwrap();
        let longest = words.iter().map(|w| w.len()).max().unwrap_or(0);
        for line in out.lines() {
            assert!(line.len() <= longest.max(20), "line too long: {:?}", line);
        }
        assert_eq!(out.split_whitespace().collect::<Vec<_>>(), words);
    }

    #[test]
    fn test_no_break_before_punctuation() {
        let src = "aaa bbb ccc ddd , eee fff ggg . hhh iii jjj ) kkk";
        for width in 3..20 {
            let out = print_as_text_with(Input::Text(src), &TextOptions::with_width(width)).unwrap();
            for line in out.lines() {
                assert!(
                    !line.starts_with([',', '.', ')']),
                    "width {}: {:?}",
                    width,
                    out
                );
            }
        }
    }

    #[test]
    fn test_environment_layout() {
        assert_eq!(
            text_print("\\begin{itemize}\n\\item a\n\\item b\n\\end{itemize}"),
            "\\begin{itemize}\n\t\\item a\n\n\t\\item b\n\\end{itemize}"
        );
    }

    #[test]
    fn test_usepackage_starts_line() {
        assert_eq!(
            text_print(r"\documentclass{article} \usepackage{amsmath}"),
            "\\documentclass{article}\n\\usepackage{amsmath}"
        );
    }

    #[test]
    fn test_spaces_inside_math_groups_survive() {
        assert_eq!(text_print(r"$\text{a {b} c}$"), r"$\text{a {b} c}$");
        assert_eq!(layout_print(r"$\text{a {b} c}$", 80), r"$\text{a {b} c}$");
    }

    #[test]
    fn test_script_base_formatting_is_stable() {
        for src in ["x^\\emph % note\n", "x^{a} b", "$y_{ij} = 0$"] {
            let once = text_print(src);
            assert_eq!(text_print(&once), once);
            let laid_out = layout_print(src, 80);
            assert_eq!(layout_print(&laid_out, 80), laid_out);
        }
        assert_eq!(text_print("x^{a} b"), "x^a b");
    }

    #[test]
    fn test_tree_input_is_printed_as_given() {
        let root = Node::list(vec![
            Node::string("a"),
            Node::Whitespace,
            Node::Whitespace,
            Node::string("b"),
        ]);
        assert_eq!(print_as_text(Input::Ast(&root)).unwrap(), "a  b");
    }
}

// ============================================================================
// Layout engine
// ============================================================================

mod layout_engine {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bracket_list() -> texfmt::Doc {
        group(concat(vec![
            text("["),
            indent(concat(vec![softline(), text("a,"), line(), text("b")])),
            softline(),
            text("]"),
        ]))
    }

    #[test]
    fn test_group_fits_flat() {
        let options = PrintOptions::default();
        assert_eq!(render_doc(bracket_list(), &options).formatted, "[a, b]");
    }

    #[test]
    fn test_group_breaks_when_too_wide() {
        let options = PrintOptions {
            print_width: 4,
            ..PrintOptions::default()
        };
        let out = render_doc(bracket_list(), &options).formatted;
        assert_eq!(out, "[\n\ta,\n\tb\n]");
        assert_eq!(out.matches('\n').count(), 3);
    }

    #[test]
    fn test_fill_paragraph() {
        assert_eq!(
            layout_print("one two three four five six", 13),
            "one two three\nfour five six"
        );
    }

    #[test]
    fn test_argument_list_breaks() {
        assert_eq!(
            layout_print(r"\usepackage[colorlinks, linkcolor, urlcolor]{hyperref}", 30),
            "\\usepackage[colorlinks,\n\tlinkcolor,\n\turlcolor]{hyperref}"
        );
    }

    #[test]
    fn test_nested_environments_indent() {
        assert_eq!(
            layout_print(r"\begin{a}\begin{b}x\end{b}\end{a}", 80),
            "\\begin{a}\n\t\\begin{b}\n\t\tx\n\t\\end{b}\n\\end{a}"
        );
    }

    #[test]
    fn test_printers_agree_on_short_input() {
        let src = "\\section{A}\nText with {grouped words} and $x^2$.\n\n\\begin{equation}\ny = mx + b\n\\end{equation}\n% done";
        let text_out = print_as_text_with(Input::Text(src), &TextOptions::with_width(200)).unwrap();
        let layout_out = layout_print(src, 200);
        assert_eq!(text_out, layout_out);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_from_json() {
        let options: PrintOptions =
            serde_json::from_str(r#"{"printWidth": 40, "useTabs": false}"#).unwrap();
        assert_eq!(
            options,
            PrintOptions {
                print_width: 40,
                use_tabs: false,
                ..PrintOptions::default()
            }
        );
    }
}

// ============================================================================
// Tree navigation
// ============================================================================

mod navigation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sibling_links() {
        let root = parse("a b").unwrap();
        let annotations = annotate(&root);
        let first = NodePath::root().child(Slot::Content, 0);
        let second = NodePath::root().child(Slot::Content, 1);
        let third = NodePath::root().child(Slot::Content, 2);
        assert_eq!(annotations.next(&first), Some(&second));
        assert_eq!(annotations.previous(&third), Some(&second));
        assert_eq!(annotations.previous(&first), None);
        assert_eq!(annotations.next(&third), None);
        assert_eq!(annotations.parent(&second), Some(&NodePath::root()));
        assert_eq!(annotations.len(), 4);
    }

    #[test]
    fn test_splice_replaces_nodes() {
        let mut root = parse("a b").unwrap();
        let removed = root
            .splice(Slot::Content, 0..1, vec![Node::string("z")])
            .unwrap();
        assert_eq!(removed, vec![Node::string("a")]);
        assert_eq!(root.to_string(), "z b");
        assert!(matches!(
            root.splice(Slot::Content, 2..9, vec![]),
            Err(FormatError::MalformedTree { .. })
        ));
    }

    #[test]
    fn test_walk_finds_macros() {
        let root = parse(r"\a \b{\c}").unwrap();
        let mut names = Vec::new();
        walk(&root, &mut |_, node| {
            if let Node::Macro { name, .. } = node {
                names.push(name.clone());
            }
        });
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tree_serializes_with_type_tags() {
        let value = serde_json::to_value(parse(r"\emph").unwrap()).unwrap();
        assert_eq!(value["type"], "nodelist");
        assert_eq!(value["content"][0]["type"], "macro");
        assert_eq!(value["content"][0]["name"], "emph");
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

mod diagnostics {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check_reports_syntax_error() {
        let result = check_latex("\\begin{center}\ntext\n\\end{centre}");
        assert!(result.has_errors());
        let diag = &result.diagnostics[0];
        assert_eq!(diag.location.map(|l| l.line), Some(3));
        assert_eq!(diag.line_text.as_deref(), Some(r"\end{centre}"));
    }

    #[test]
    fn test_check_clean_input() {
        assert_eq!(check_latex("Hello.").summary(), "no issues found");
    }
}
