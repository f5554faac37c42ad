//! ReaderKit CLI - Convert URLs to Markdown from the command line

mod server;

use clap::{Args, Parser, Subcommand, ValueEnum};
use readerkit::{ConversionResult, Reader, ReaderBuilder};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Output format for the convert subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// ReaderKit - convert any public URL into clean Markdown
#[derive(Parser, Debug)]
#[command(name = "readerkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert URL and output as markdown with metadata frontmatter
    Convert {
        /// URL to convert
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        #[command(flatten)]
        reader: ReaderArgs,
    },
    /// Serve conversions over HTTP at GET /url/reader/{url}
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        #[command(flatten)]
        reader: ReaderArgs,
    },
}

/// Reader overrides shared by all subcommands
#[derive(Args, Debug, Clone, Default)]
struct ReaderArgs {
    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Rendering proxy prefix; the target URL is appended
    #[arg(long, conflicts_with = "no_proxy")]
    proxy_prefix: Option<String>,

    /// Never escalate to the rendering proxy
    #[arg(long)]
    no_proxy: bool,

    /// Escalate results with fewer words than this
    #[arg(long)]
    min_words: Option<usize>,
}

impl ReaderArgs {
    fn builder(&self) -> ReaderBuilder {
        let mut builder = Reader::builder();
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(ref prefix) = self.proxy_prefix {
            builder = builder.proxy_prefix(prefix);
        }
        if self.no_proxy {
            builder = builder.disable_proxy();
        }
        if let Some(words) = self.min_words {
            builder = builder.min_proxy_word_count(words);
        }
        builder
    }

    fn build(&self) -> Reader {
        self.builder().build().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean Markdown/JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Some(Commands::Convert {
            url,
            output,
            reader,
        }) => {
            run_convert(&url, output, &reader).await;
        }
        Some(Commands::Serve { bind, reader }) => {
            let reader = Arc::new(reader.build());
            if let Err(e) = server::serve(reader, bind).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            eprintln!("Usage: readerkit convert <URL>");
            eprintln!("   or: readerkit serve [--bind ADDR]");
            eprintln!("   or: readerkit --help");
            std::process::exit(1);
        }
    }
}

async fn run_convert(url: &str, output: OutputFormat, args: &ReaderArgs) {
    let reader = args.build();

    match reader.convert(url).await {
        Ok(result) => match output {
            OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(&result)),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                    eprintln!("Error serializing result: {}", e);
                    std::process::exit(1);
                });
                writeln_safe(&json);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format result as markdown with YAML frontmatter
fn format_md_with_frontmatter(result: &ConversionResult) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("source_url: {}\n", result.source_url));
    output.push_str(&format!("final_url: {}\n", result.final_url));
    if let Some(ref title) = result.title {
        output.push_str(&format!("title: {}\n", yaml_scalar(title)));
    }
    output.push_str(&format!("word_count: {}\n", result.word_count));

    let metadata = &result.metadata;
    if let Some(normalizer) = metadata.normalizer {
        output.push_str(&format!("normalizer: {}\n", normalizer));
    }
    if let Some(renderer) = metadata.renderer {
        output.push_str(&format!("renderer: {}\n", renderer));
    }
    if !metadata.authors.is_empty() {
        output.push_str(&format!("authors: {}\n", yaml_list(&metadata.authors)));
    }
    if let Some(ref date) = metadata.publish_date {
        output.push_str(&format!("publish_date: {}\n", yaml_scalar(date)));
    }
    if !metadata.keywords.is_empty() {
        output.push_str(&format!("keywords: {}\n", yaml_list(&metadata.keywords)));
    }
    output.push_str("---\n");

    output.push_str(&result.markdown);
    output
}

/// Quote a scalar when plain YAML would misread it
fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.contains(": ")
        || value.contains(" #")
        || value.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c));
    if needs_quotes {
        serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

/// Flow-style YAML list of JSON-quoted strings
fn yaml_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_default()
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readerkit::{Normalizer, Renderer, ResultMetadata};

    fn result(title: Option<&str>, markdown: &str, metadata: ResultMetadata) -> ConversionResult {
        ConversionResult::new(
            "https://example.com",
            "https://example.com/",
            title.map(String::from),
            markdown.to_string(),
            metadata,
        )
        .unwrap()
    }

    #[test]
    fn test_format_md_basic() {
        let result = result(
            Some("Hello"),
            "# Hello World",
            ResultMetadata::default().with_renderer(Renderer::DirectHttp),
        );

        let output = format_md_with_frontmatter(&result);

        assert!(output.starts_with("---\n"));
        assert!(output.contains("source_url: https://example.com\n"));
        assert!(output.contains("final_url: https://example.com/\n"));
        assert!(output.contains("title: Hello\n"));
        assert!(output.contains("word_count: 3\n"));
        assert!(output.contains("renderer: direct-http\n"));
        assert!(output.ends_with("---\n# Hello World"));
    }

    #[test]
    fn test_format_md_with_all_metadata() {
        let metadata = ResultMetadata {
            normalizer: Some(Normalizer::GoogleDocsHtmlExport),
            renderer: Some(Renderer::Article),
            authors: vec!["Ada Lovelace".to_string(), "Charles Babbage".to_string()],
            publish_date: Some("2024-03-01".to_string()),
            keywords: vec!["rust".to_string()],
        };
        let output = format_md_with_frontmatter(&result(None, "Body", metadata));

        assert!(output.contains("normalizer: google-docs-html-export\n"));
        assert!(output.contains("renderer: article-extractor\n"));
        assert!(output.contains("authors: [\"Ada Lovelace\",\"Charles Babbage\"]\n"));
        assert!(output.contains("publish_date: 2024-03-01\n"));
        assert!(output.contains("keywords: [\"rust\"]\n"));
    }

    #[test]
    fn test_format_md_omits_missing_fields() {
        let output = format_md_with_frontmatter(&result(None, "Body", ResultMetadata::default()));

        assert!(!output.contains("title:"));
        assert!(!output.contains("normalizer:"));
        assert!(!output.contains("authors:"));
    }

    #[test]
    fn test_yaml_scalar_quoting() {
        assert_eq!(yaml_scalar("Plain title"), "Plain title");
        assert_eq!(yaml_scalar("Rust: the book"), "\"Rust: the book\"");
        assert_eq!(yaml_scalar("# not a comment"), "\"# not a comment\"");
    }

    #[test]
    fn test_reader_args_no_proxy() {
        let args = ReaderArgs {
            no_proxy: true,
            min_words: Some(25),
            ..Default::default()
        };
        let reader = args.builder().build().unwrap();
        assert!(reader.options().proxy_prefix.is_none());
        assert_eq!(reader.options().min_proxy_word_count, 25);
    }
}
