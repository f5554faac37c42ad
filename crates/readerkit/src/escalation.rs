//! Rendering-proxy escalation policy
//!
//! Client-rendered hosts often serve a near-empty shell to a plain GET. A
//! result from such a host with too few words is handed to the rendering
//! proxy instead of being returned.

use crate::client::{host_matches, ReaderOptions};
use crate::types::ConversionResult;
use url::Url;

/// True if `url` is on a host eligible for the rendering proxy
pub fn is_proxy_host(url: &Url, options: &ReaderOptions) -> bool {
    options.proxy_prefix.is_some()
        && url
            .host_str()
            .is_some_and(|host| host_matches(host, &options.proxy_hosts))
}

/// True if `result` is too thin to keep and the proxy may do better
pub fn needs_proxy(result: &ConversionResult, url: &Url, options: &ReaderOptions) -> bool {
    result.word_count < options.min_proxy_word_count && is_proxy_host(url, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultMetadata;

    fn result(markdown: &str) -> ConversionResult {
        ConversionResult::new(
            "https://x",
            "https://x",
            None,
            markdown.to_string(),
            ResultMetadata::default(),
        )
        .unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_thin_result_on_proxy_host_escalates() {
        let options = ReaderOptions::default();
        let thin = result("Loading your page");
        assert!(needs_proxy(&thin, &url("https://www.notion.so/p"), &options));
        assert!(needs_proxy(
            &thin,
            &url("https://docs.google.com/document/d/x/export?format=html"),
            &options
        ));
    }

    #[test]
    fn test_rich_result_is_kept() {
        let options = ReaderOptions::default();
        let rich = result(&"word ".repeat(50));
        assert!(!needs_proxy(&rich, &url("https://www.notion.so/p"), &options));
    }

    #[test]
    fn test_other_hosts_never_escalate() {
        let options = ReaderOptions::default();
        let thin = result("tiny");
        assert!(!needs_proxy(&thin, &url("https://example.com"), &options));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let options = ReaderOptions {
            min_proxy_word_count: 3,
            ..Default::default()
        };
        let url = url("https://notion.site/p");
        assert!(needs_proxy(&result("one two"), &url, &options));
        assert!(!needs_proxy(&result("one two three"), &url, &options));
    }

    #[test]
    fn test_disabled_proxy_never_escalates() {
        let options = ReaderOptions {
            proxy_prefix: None,
            ..Default::default()
        };
        assert!(!is_proxy_host(&url("https://www.notion.so/p"), &options));
        assert!(!needs_proxy(
            &result("thin"),
            &url("https://www.notion.so/p"),
            &options
        ));
    }
}
