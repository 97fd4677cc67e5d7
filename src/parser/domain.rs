//! Host extraction from referer URLs

/// Host component of a URL with any `:port` removed.
///
/// An optional `http://` or `https://` prefix is skipped and everything
/// from the first `/` on is dropped. Returns `None` when no host remains,
/// e.g. for an empty string, a bare scheme or a relative path.
pub fn extract_domain(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let authority = rest.split('/').next().unwrap_or_default();
    let host = match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    };

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
