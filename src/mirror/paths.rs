//! Mapping of remote URLs onto the local mirror tree
//!
//! Every path produced here is built by pushing sanitized components onto the
//! output directory, never by string concatenation, so no mapped path can
//! escape the directory it was derived from.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// File name used for the root page and for directory-like URLs
pub const INDEX_FILE: &str = "index.html";

/// Characters escaped when a local path is written back into an attribute
const REFERENCE_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    // A colon in the first segment would read as a URL scheme
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Maps an asset URL to the file it is mirrored into
///
/// The URL path is percent-decoded segment by segment, empty, `.` and `..`
/// segments are dropped, and the remaining segments are joined onto
/// `output_dir`. Directory-like URLs (empty path, trailing `/`) map to
/// `index.html` inside the matching directory. Query and fragment are
/// ignored.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url::Url;
/// use page_mirror::mirror::map_to_local_path;
///
/// let root = Path::new("/srv/mirror");
///
/// let url = Url::parse("https://site.test/css/main.css").unwrap();
/// assert_eq!(map_to_local_path(&url, root), root.join("css").join("main.css"));
///
/// let url = Url::parse("https://site.test/").unwrap();
/// assert_eq!(map_to_local_path(&url, root), root.join("index.html"));
/// ```
pub fn map_to_local_path(url: &Url, output_dir: &Path) -> PathBuf {
    let (segments, is_dir) = local_segments(url);

    let mut path = output_dir.to_path_buf();
    for segment in &segments {
        path.push(segment);
    }

    if is_dir || segments.is_empty() {
        path.push(INDEX_FILE);
    }

    path
}

/// Computes where a discovered page is saved
///
/// # Returns
///
/// The directory the page file lives in and the page file name. The name is
/// the last path segment with any `.htm`/`.html` suffix replaced by a single
/// `.html`; directory-like URLs get `index.html`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url::Url;
/// use page_mirror::mirror::page_location;
///
/// let root = Path::new("/srv/mirror");
/// let url = Url::parse("https://site.test/docs/guide.htm").unwrap();
///
/// let (dir, name) = page_location(&url, root);
/// assert_eq!(dir, root.join("docs"));
/// assert_eq!(name, "guide.html");
/// ```
pub fn page_location(url: &Url, output_dir: &Path) -> (PathBuf, String) {
    let (mut segments, is_dir) = local_segments(url);

    let file_name = if is_dir {
        INDEX_FILE.to_string()
    } else {
        match segments.pop() {
            Some(last) => page_file_name(&last),
            None => INDEX_FILE.to_string(),
        }
    };

    let mut dir = output_dir.to_path_buf();
    for segment in &segments {
        dir.push(segment);
    }

    (dir, file_name)
}

/// Normalizes a page name so it carries exactly one `.html` suffix
pub fn page_file_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();

    let stem = if lower.ends_with(".html") {
        &name[..name.len() - ".html".len()]
    } else if lower.ends_with(".htm") {
        &name[..name.len() - ".htm".len()]
    } else {
        name
    };

    if stem.is_empty() {
        INDEX_FILE.to_string()
    } else {
        format!("{}.html", stem)
    }
}

/// Builds the attribute value pointing from a page directory to a local file
///
/// Both paths are expected under the same mirror root. Separators are always
/// `/` and every segment is percent-escaped where a browser would otherwise
/// misread it.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use page_mirror::mirror::relative_reference;
///
/// let root = Path::new("/srv/mirror");
/// let from = root.join("docs");
/// let target = root.join("img").join("my logo.png");
///
/// assert_eq!(relative_reference(&from, &target), "../img/my%20logo.png");
/// ```
pub fn relative_reference(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat("..".to_string()).take(from.len().saturating_sub(common));
    let downs = to.iter().skip(common).map(|component| {
        let segment = component.as_os_str().to_string_lossy();
        utf8_percent_encode(&segment, REFERENCE_SEGMENT).to_string()
    });

    ups.chain(downs).collect::<Vec<_>>().join("/")
}

/// Checks that `path` is lexically nested under `root`
pub fn is_within(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
        && !path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir))
}

/// Decoded, sanitized segments of a URL path and whether it names a directory
fn local_segments(url: &Url) -> (Vec<String>, bool) {
    let raw: Vec<&str> = url.path().split('/').collect();

    // A path whose last segment is dropped ("/", "/docs/", "/a/.") is a directory
    let is_dir = raw.last().map_or(true, |last| sanitize_segment(last).is_none());
    let segments = raw.into_iter().filter_map(sanitize_segment).collect();

    (segments, is_dir)
}

/// Turns one raw URL path segment into a single safe path component
fn sanitize_segment(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();

    let cleaned: String = decoded
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    let mut components = Path::new(&cleaned).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(cleaned),
        _ => None,
    }
}
