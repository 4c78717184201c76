use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use fencetag_core::{Article, Converter, ConverterConfig, EngineConfig, Metadata, OutputFormat};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Kind of document read from INPUT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Html,
    Markdown,
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("Invalid input kind: {}. Valid options: html, markdown", s)),
        }
    }
}

impl InputKind {
    /// Markdown for `.md`/`.markdown` files, HTML otherwise
    fn infer(input: &str) -> Self {
        let extension = Path::new(input)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("md" | "markdown") => Self::Markdown,
            _ => Self::Html,
        }
    }
}

/// Convert articles to Markdown and tag every code block with its language
#[derive(Parser, Debug)]
#[command(name = "fencetag")]
#[command(author = "fencetag Contributors")]
#[command(version)]
#[command(about = "Convert articles to Markdown with language-tagged code blocks", long_about = None)]
struct Args {
    /// HTML or Markdown file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    format: OutputFormat,

    /// Input kind (html, markdown); inferred from the file extension when omitted
    #[arg(long, value_name = "KIND")]
    from: Option<InputKind>,

    /// URL the document was fetched from, shown in the header block
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Include TOML frontmatter
    #[arg(long)]
    frontmatter: bool,

    /// Omit the title heading
    #[arg(long)]
    no_title: bool,

    /// Omit the source/author/date header block
    #[arg(long)]
    no_header: bool,

    /// Minimum confidence for classified languages (0.0 - 1.0)
    #[arg(long, value_name = "NUM")]
    min_confidence: Option<f64>,

    /// Lines of surrounding prose used as classification context
    #[arg(long, value_name = "NUM")]
    context_lines: Option<usize>,

    /// Skip stamping language classes onto code elements before conversion
    #[arg(long)]
    no_annotate: bool,

    /// Convert the whole page instead of its main content
    #[arg(long)]
    no_extract: bool,

    /// Configuration file (default: <config dir>/fencetag/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fencetag_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn engine_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut engine = EngineConfig::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(value) = args.min_confidence {
        engine.min_confidence = value;
    }
    if let Some(value) = args.context_lines {
        engine.context_lines = value;
    }
    if args.no_annotate {
        engine.annotate = false;
    }
    if args.no_extract {
        engine.extract_content = false;
    }

    debug!(?engine, "engine configuration");
    Ok(engine)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "fencetag", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);
    let input = args.input.as_deref().context("INPUT is required")?;

    if let Some(url) = &args.source_url {
        Url::parse(url).with_context(|| format!("Invalid source URL: {}", url))?;
    }
    let started = Instant::now();
    let mut timings: Vec<(&str, Duration)> = Vec::new();

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
        let source = if input == "-" { "stdin".to_string() } else { input.bright_white().to_string() };
        echo::print_step(1, 4, &format!("Reading from {}", source));
    }

    let step = Instant::now();
    let content = read_input(input)?;
    timings.push(("Read", step.elapsed()));
    let kind = args.from.unwrap_or_else(|| InputKind::infer(input));
    debug!(?kind, bytes = content.len(), "input read");

    if args.verbose {
        echo::print_detail("Size", &echo::format_size(content.len()));
        echo::print_detail("Kind", &format!("{:?}", kind));
        eprintln!();
        echo::print_step(2, 4, "Loading configuration");
    }

    let step = Instant::now();
    let engine = engine_config(&args)?;
    let config = ConverterConfig::builder()
        .engine(engine)
        .frontmatter(args.frontmatter)
        .title_heading(!args.no_title)
        .header(!args.no_header)
        .build();
    let converter = Converter::new(config).context("Invalid configuration")?;
    timings.push(("Configure", step.elapsed()));

    if args.verbose {
        let engine = &converter.config().engine;
        echo::print_detail("Min confidence", &format!("{:.2}", engine.min_confidence));
        echo::print_detail("Context lines", &engine.context_lines.to_string());
        echo::print_detail("Aliases", &engine.aliases.len().to_string());
        eprintln!();
        echo::print_step(3, 4, "Attributing code block languages");
    }

    let step = Instant::now();
    let article = match kind {
        InputKind::Html => converter
            .convert(&content, args.source_url.as_deref())
            .context("Failed to convert HTML")?,
        InputKind::Markdown => {
            let attribution = converter.tag_markdown(&content);
            Article::new(
                attribution.markdown.clone(),
                attribution,
                Metadata::default(),
                Vec::new(),
                args.source_url.clone(),
            )
        }
    };
    timings.push(("Attribute", step.elapsed()));

    if args.verbose {
        echo::print_detail("Strategy", &format!("{:?}", article.strategy));
        echo::print_detail("Declared", &article.declared_languages.len().to_string());
        if article.untagged_count() > 0 {
            echo::print_warning(&format!("{} block(s) left untagged", article.untagged_count()));
        }
        echo::print_attribution_details(&article.code_blocks);
        echo::print_step(4, 4, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    let output = article.to_format(args.format).context("Failed to render output")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            if args.verbose {
                echo::print_success(&format!("Output written to {}", path.display().bright_white()));
            }
        }
        None => print!("{}", output),
    }

    if args.verbose {
        echo::print_timing_summary(started.elapsed(), &timings);
    }

    Ok(())
}
