//! Example: Convert a handful of live URLs and report which path served them
//!
//! Run with: cargo run -p readerkit --example convert_urls
//!
//! Needs network access. Each case checks the renderer tag against the
//! paths allowed to serve it, and a phrase expected in the Markdown.

use readerkit::{ConversionResult, Reader, Renderer};

struct Case {
    url: &'static str,
    description: &'static str,
    /// Renderers allowed to serve the page; empty accepts any
    expect_renderer: &'static [Renderer],
    expect_contains: Option<&'static str>,
}

const CASES: &[Case] = &[
    Case {
        url: "https://example.com",
        description: "Simple HTML page",
        expect_renderer: &[Renderer::Article, Renderer::DirectHttp],
        expect_contains: Some("Example Domain"),
    },
    Case {
        url: "https://httpbin.org/html",
        description: "Long-form HTML",
        expect_renderer: &[Renderer::Article],
        expect_contains: Some("Herman Melville"),
    },
    Case {
        url: "https://www.notion.so/Notion-Official-83715d7703ee4b8699b5e659a4712dd8",
        description: "Public Notion page (structured API, proxy fallback)",
        expect_renderer: &[Renderer::NotionApi, Renderer::Proxy],
        expect_contains: None,
    },
    Case {
        url: "https://www.rust-lang.org/",
        description: "Marketing page",
        expect_renderer: &[Renderer::Article, Renderer::DirectHttp],
        expect_contains: Some("Rust"),
    },
];

#[tokio::main]
async fn main() {
    println!("ReaderKit URL Examples");
    println!("======================\n");

    let reader = match Reader::builder().build() {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Failed to build reader: {}", e);
            std::process::exit(1);
        }
    };

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {}", case.url);

        match reader.convert(case.url).await {
            Ok(result) => {
                print_summary(&result);
                if check_expectations(case, &result) {
                    println!("   ✓ PASS\n");
                    passed += 1;
                } else {
                    println!("   ✗ FAIL (expectations not met)\n");
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   Error: {}", e);
                println!("   ✗ FAIL\n");
                failed += 1;
            }
        }
    }

    println!("======================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_summary(result: &ConversionResult) {
    if let Some(ref title) = result.title {
        println!("   Title: {}", title);
    }
    println!("   Final URL: {}", result.final_url);
    println!("   Words: {}", result.word_count);
    if let Some(normalizer) = result.metadata.normalizer {
        println!("   Normalizer: {}", normalizer);
    }
    if let Some(renderer) = result.metadata.renderer {
        println!("   Renderer: {}", renderer);
    }

    let preview = result.markdown.chars().take(100).collect::<String>();
    println!(
        "   Preview: {}{}",
        preview.replace('\n', " "),
        if result.markdown.chars().count() > 100 {
            "..."
        } else {
            ""
        }
    );
}

fn check_expectations(case: &Case, result: &ConversionResult) -> bool {
    if !case.expect_renderer.is_empty() {
        let allowed = result
            .metadata
            .renderer
            .is_some_and(|renderer| case.expect_renderer.contains(&renderer));
        if !allowed {
            println!(
                "   Expected renderer in {:?}, got {:?}",
                case.expect_renderer, result.metadata.renderer
            );
            return false;
        }
    }

    if let Some(expected_text) = case.expect_contains {
        if !result.markdown.contains(expected_text) {
            println!("   Expected content to contain '{}'", expected_text);
            return false;
        }
    }

    true
}
