use url::{ParseError, Url};

/// Resolves a reference found in markup against the URL of the page
///
/// Absolute references (`https://...`, `//host/path`) are taken as they are;
/// anything else is joined with `base` following RFC 3986, so `../x`,
/// `/root-relative` and bare `#fragment` references all work.
///
/// Returns None if the reference should be skipped:
/// - Empty or whitespace-only values
/// - References that fail to parse
/// - Non-HTTP(S) results (`javascript:`, `mailto:`, `data:` ...)
///
/// # Examples
///
/// ```
/// use page_mirror::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://site.test/docs/guide.html").unwrap();
///
/// let url = resolve(&base, "../img/logo.png").unwrap();
/// assert_eq!(url.as_str(), "https://site.test/img/logo.png");
///
/// let url = resolve(&base, "//cdn.test/app.js").unwrap();
/// assert_eq!(url.as_str(), "https://cdn.test/app.js");
///
/// assert!(resolve(&base, "javascript:void(0)").is_none());
/// ```
pub fn resolve(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    let resolved = if is_absolute_reference(raw) {
        match Url::parse(raw) {
            Ok(url) => url,
            // Scheme-relative references inherit the scheme of the page
            Err(ParseError::RelativeUrlWithoutBase) => base.join(raw).ok()?,
            Err(_) => return None,
        }
    } else {
        base.join(raw).ok()?
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Checks whether a raw reference is in absolute form
///
/// A reference is absolute when it starts with `//` or with a scheme:
/// an ASCII letter followed by letters, digits, `+`, `-` or `.`, then `:`.
pub fn is_absolute_reference(raw: &str) -> bool {
    if raw.starts_with("//") {
        return true;
    }

    let Some(colon) = raw.find(':') else {
        return false;
    };

    let scheme = &raw[..colon];
    let mut chars = scheme.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}
