//! texfmt CLI - LaTeX parser and pretty-printer

#[cfg(feature = "cli")]
use clap::{ArgAction, Parser, ValueEnum};
#[cfg(feature = "cli")]
use serde::Deserialize;
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, IsTerminal, Read, Write};
#[cfg(feature = "cli")]
use texfmt::{
    diagnostics::{check_latex, format_diagnostics, Diagnostic},
    parse_normalized, render_doc, render_tokens_with, to_doc, to_tokens, FormatError,
    FormatResult, PrintOptions, TextOptions,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "texfmt")]
#[command(version)]
#[command(about = "texfmt - LaTeX parser and pretty-printer", long_about = None)]
struct Cli {
    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Printer to use
    #[arg(short, long, value_enum)]
    engine: Option<Engine>,

    /// Maximum line width
    #[arg(short = 'w', long)]
    print_width: Option<usize>,

    /// Width of one indentation level
    #[arg(short, long)]
    tab_width: Option<usize>,

    /// Indent with spaces instead of tabs (layout engine only)
    #[arg(long)]
    use_spaces: bool,

    /// Check mode - report syntax problems without formatting
    #[arg(long)]
    check: bool,

    /// Dump the normalized tree as JSON
    #[arg(long, conflicts_with = "tokens")]
    ast: bool,

    /// Dump the token stream, one token per line
    #[arg(long)]
    tokens: bool,

    /// Read settings from a TOML file; flags take precedence
    #[arg(short, long)]
    config: Option<String>,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Engine {
    /// Greedy word-wrapping token printer
    Text,
    /// Group and fill layout engine
    Layout,
}

/// Settings read from `--config`
#[cfg(feature = "cli")]
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FileConfig {
    engine: Option<Engine>,
    print_width: Option<usize>,
    max_width: Option<usize>,
    tab_width: Option<usize>,
    use_tabs: Option<bool>,
    parser: Option<String>,
}

#[cfg(feature = "cli")]
impl FileConfig {
    fn load(path: &str) -> FormatResult<Self> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| FormatError::invalid_options(format!("{}: {}", path, e)))
    }
}

/// Effective settings after merging the config file and flags
#[cfg(feature = "cli")]
struct Settings {
    engine: Engine,
    text: TextOptions,
    layout: PrintOptions,
}

#[cfg(feature = "cli")]
impl Settings {
    fn resolve(cli: &Cli, file: FileConfig) -> FormatResult<Self> {
        let engine = cli.engine.or(file.engine).unwrap_or(Engine::Layout);

        let mut layout = PrintOptions::default();
        if let Some(width) = file.print_width {
            layout.print_width = width;
        }
        if let Some(width) = file.tab_width {
            layout.tab_width = width;
        }
        if let Some(use_tabs) = file.use_tabs {
            layout.use_tabs = use_tabs;
        }
        if let Some(parser) = file.parser {
            layout.parser = parser;
        }

        let mut text = TextOptions::default();
        if let Some(width) = file.max_width {
            text.max_width = width;
        }
        if let Some(width) = file.tab_width {
            text.tab_width = width;
        }

        if let Some(width) = cli.print_width {
            layout.print_width = width;
            text.max_width = width;
        }
        if let Some(width) = cli.tab_width {
            layout.tab_width = width;
            text.tab_width = width;
        }
        if cli.use_spaces {
            layout.use_tabs = false;
        }

        layout.validate()?;
        text.validate()?;
        Ok(Self {
            engine,
            text,
            layout,
        })
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Exactly one trailing newline
#[cfg(feature = "cli")]
fn finish_output(mut text: String) -> String {
    let trimmed = text.trim_end_matches('\n').len();
    text.truncate(trimmed);
    text.push('\n');
    text
}

#[cfg(feature = "cli")]
fn run(cli: &Cli) -> FormatResult<i32> {
    let file = match cli.config {
        Some(ref path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(cli, file)?;
    let input = read_input(cli.input_file.as_deref())?;

    // If check mode, analyze and report issues
    if cli.check {
        let color = !cli.no_color && io::stdout().is_terminal();
        let result = check_latex(&input);
        println!("{}", format_diagnostics(&result, color));
        return Ok(if result.has_errors() { 1 } else { 0 });
    }

    let ast = match parse_normalized(&input) {
        Ok(ast) => ast,
        Err(FormatError::Syntax(err)) => {
            let diag = Diagnostic::from_syntax_error(&err, &input);
            eprintln!("{}", diag);
            return Ok(1);
        }
        Err(err) => return Err(err),
    };

    let result = if cli.ast {
        serde_json::to_string_pretty(&ast)
            .map_err(|e| FormatError::malformed(e.to_string()))?
    } else if cli.tokens {
        to_tokens(&ast)
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        match settings.engine {
            Engine::Text => render_tokens_with(&to_tokens(&ast), &settings.text),
            Engine::Layout => render_doc(to_doc(&ast), &settings.layout).formatted,
        }
    };
    let result = finish_output(result);

    match cli.output {
        Some(ref path) => {
            let mut file = fs::File::create(path)?;
            file.write_all(result.as_bytes())?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(result.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(0)
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            2
        }
    };
    std::process::exit(code);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install texfmt --features cli");
    eprintln!("  texfmt [OPTIONS] [INPUT_FILE]");
}
