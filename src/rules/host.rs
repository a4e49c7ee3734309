/// Canonicalize a URL-like string into `host[/path]`.
///
/// The scheme (`http://` or `https://`) and any trailing slashes are removed.
/// A host starting with `www` (`www`, `www1`, `www3`, ...) loses its first
/// label when it has more than two labels. The input is never validated:
/// every string maps to some output.
pub fn normalize_host(input: &str) -> String {
    let without_scheme = input
        .strip_prefix("http://")
        .or_else(|| input.strip_prefix("https://"))
        .unwrap_or(input);

    let trimmed = without_scheme.trim_end_matches('/');

    let (host, path) = match trimmed.find('/') {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };

    format!("{}{}", strip_www_label(host), path)
}

fn strip_www_label(host: &str) -> &str {
    if !host.starts_with("www") || host.split('.').count() <= 2 {
        return host;
    }
    host.split_once('.').map_or(host, |(_, rest)| rest)
}
