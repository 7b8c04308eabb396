use url::Url;

/// The parts of a URL that decide its origin
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Extracts the origin of a URL; None if the URL has no host
    fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_lowercase();
        if host.is_empty() {
            return None;
        }

        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

        Some(Self {
            scheme: url.scheme().to_lowercase(),
            host,
            port: url.port_or_known_default(),
        })
    }
}

/// Checks whether two URLs share scheme, host and port
///
/// The host comparison is case-insensitive and ignores a leading `www.`;
/// path, query and fragment do not matter. A URL without a host never
/// matches anything.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_mirror::url::same_origin;
///
/// let a = Url::parse("https://www.example.com/a").unwrap();
/// let b = Url::parse("https://EXAMPLE.com:443/b?x=1").unwrap();
/// assert!(same_origin(&a, &b));
///
/// let c = Url::parse("http://example.com/a").unwrap();
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (Origin::of(a), Origin::of(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Decides whether a resolved reference may be downloaded or followed
///
/// # Arguments
///
/// * `url` - The resolved reference
/// * `page_url` - The URL of the page the reference was found on
/// * `allow_cross_domain` - Accept references to any origin
pub fn in_scope(url: &Url, page_url: &Url, allow_cross_domain: bool) -> bool {
    allow_cross_domain || same_origin(url, page_url)
}
