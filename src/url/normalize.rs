use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates the URL a mirror run starts from
///
/// # Validation Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Only `http` and `https` are accepted
/// 3. The URL must carry a host
///
/// # Examples
///
/// ```
/// use page_mirror::url::parse_root_url;
///
/// let url = parse_root_url("https://Site.Test/docs/").unwrap();
/// assert_eq!(url.as_str(), "https://site.test/docs/");
///
/// assert!(parse_root_url("/relative/path").is_err());
/// assert!(parse_root_url("ftp://site.test/").is_err());
/// ```
pub fn parse_root_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns the key under which a URL is recorded in the visited set
///
/// Two references to the same document differ only by fragment, so the
/// fragment is dropped. Host case and dot segments are already normalized
/// by the parser.
pub fn visit_key(url: &Url) -> Url {
    let mut key = url.clone();
    key.set_fragment(None);

    if key.query() == Some("") {
        key.set_query(None);
    }

    key
}
