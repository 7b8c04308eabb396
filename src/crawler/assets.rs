//! Asset download passes
//!
//! Each pass walks the elements matching one selector, downloads the
//! in-scope files they reference and points the attribute at the local copy.
//! A failed asset never aborts the page: the element keeps its remote URL.

use crate::crawler::fetcher::{fetch, FetchOutcome};
use crate::crawler::markup::{Document, Element, Selector};
use crate::crawler::task::CancelHandle;
use crate::mirror::{
    is_within, map_to_local_path, relative_reference, write_file, MirrorIndex, MirroredAsset,
};
use crate::output::MirrorReport;
use crate::url::{in_scope, resolve, visit_key};
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// One selector/attribute pair processed by [`download_resources`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPass {
    pub selector: Selector,
    pub attribute: &'static str,
}

/// The passes run on every page, in order: images, linked resources
/// (stylesheets, icons), scripts
pub fn asset_passes() -> [AssetPass; 3] {
    [
        AssetPass {
            selector: Selector::tag("img"),
            attribute: "src",
        },
        AssetPass {
            selector: Selector::with_attribute("link", "href"),
            attribute: "href",
        },
        AssetPass {
            selector: Selector::with_attribute("script", "src"),
            attribute: "src",
        },
    ]
}

/// Run-wide state an asset pass reads and updates
pub struct AssetContext<'a> {
    pub client: &'a Client,
    /// Output directory of the run; assets are mirrored under it
    pub mirror_root: &'a Path,
    pub allow_cross_domain: bool,
    pub index: &'a mut MirrorIndex,
    pub report: &'a mut MirrorReport,
    pub cancel: &'a CancelHandle,
}

/// A reference extracted from one element
#[derive(Debug)]
struct ResourceRef {
    element: Element,
    attribute: &'static str,
    raw_url: String,
}

/// Downloads every asset referenced through `pass` and rewrites the references
///
/// # Arguments
///
/// * `ctx` - Run-wide state
/// * `page_url` - URL of the page; references are resolved against it
/// * `document` - The parsed page; returned with attributes rewritten
/// * `pass` - Which elements and attribute to process
/// * `page_dir` - Directory the page file is written into; rewritten
///   attributes are relative to it
pub async fn download_resources(
    ctx: &mut AssetContext<'_>,
    page_url: &Url,
    document: Document,
    pass: &AssetPass,
    page_dir: &Path,
) -> Document {
    for element in document.select(&pass.selector) {
        if ctx.cancel.is_cancelled() {
            break;
        }

        let Some(reference) = extract_reference(element, pass.attribute) else {
            continue;
        };

        let Some(url) = resolve(page_url, &reference.raw_url) else {
            tracing::trace!("Skipping unresolvable reference {:?}", reference.raw_url);
            continue;
        };

        if !in_scope(&url, page_url, ctx.allow_cross_domain) {
            tracing::debug!("Leaving out-of-scope asset {} remote", url);
            ctx.report.out_of_scope += 1;
            continue;
        }

        if let Some(local_path) = mirror_asset(ctx, &url).await {
            let value = relative_reference(page_dir, &local_path);
            reference.element.set_attr(reference.attribute, &value);
        }
    }

    document
}

/// Reads a reference; None if the attribute is absent or blank once decoded
fn extract_reference(element: Element, attribute: &'static str) -> Option<ResourceRef> {
    let raw_url = element.attr(attribute)?;

    if percent_decode_str(&raw_url).decode_utf8_lossy().trim().is_empty() {
        return None;
    }

    Some(ResourceRef {
        element,
        attribute,
        raw_url,
    })
}

/// Makes sure an asset exists locally and returns its path
///
/// Assets already written during the run are reused. Returns None if the
/// asset could not be fetched or written, or if its local path belongs to a
/// different URL.
async fn mirror_asset(ctx: &mut AssetContext<'_>, url: &Url) -> Option<PathBuf> {
    let key = visit_key(url);

    if let Some(existing) = ctx.index.mirrored(&key) {
        ctx.report.assets_reused += 1;
        return Some(existing.to_path_buf());
    }

    let target = map_to_local_path(url, ctx.mirror_root);
    debug_assert!(is_within(ctx.mirror_root, &target));
    if !ctx.index.claim(&target, &key) {
        tracing::debug!(
            "Not downloading {}: {} already holds another URL",
            url,
            target.display()
        );
        return None;
    }

    tracing::debug!("Downloading {}...", url);

    match fetch(ctx.client, url).await {
        FetchOutcome::Success { bytes, .. } => match write_file(&target, &bytes).await {
            Ok(written) => {
                ctx.report.assets_downloaded += 1;
                ctx.index.record_asset(MirroredAsset {
                    source_url: key,
                    local_path: written.clone(),
                });
                Some(written)
            }
            Err(e) => {
                tracing::warn!("Failed to save asset {}: {}", url, e);
                ctx.report.assets_failed += 1;
                None
            }
        },
        failure => {
            tracing::warn!("Failed to download asset {}: {}", url, failure.describe());
            ctx.report.assets_failed += 1;
            None
        }
    }
}
