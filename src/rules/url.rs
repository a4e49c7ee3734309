/// Build the `url` of a channel from its `name`.
///
/// Names that already look like a URL (anything starting with `http`) are
/// reused verbatim, bare hosts get an `https://` scheme.
pub fn derive_url(name: &str) -> String {
    if name.starts_with("http") {
        name.to_string()
    } else {
        format!("https://{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        assert_eq!(derive_url("example.com"), "https://example.com");
        assert_eq!(derive_url("www.example.com/feed"), "https://www.example.com/feed");
    }

    #[test]
    fn test_urls_are_reused() {
        assert_eq!(derive_url("http://example.com"), "http://example.com");
        assert_eq!(derive_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_prefix_match_is_loose() {
        // Any name starting with "http" counts as a URL.
        assert_eq!(derive_url("httpbin.org"), "httpbin.org");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(derive_url(""), "https://");
    }
}
