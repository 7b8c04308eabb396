//! Crawler module for mirroring pages
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching of pages and assets
//! - HTML parsing and attribute rewriting
//! - Asset download passes
//! - Depth-first traversal of in-scope anchors

mod assets;
mod coordinator;
mod fetcher;
mod markup;
mod task;

pub use assets::{asset_passes, download_resources, AssetContext, AssetPass};
pub use coordinator::{mirror_site, Crawler};
pub use fetcher::{build_http_client, fetch, FetchOutcome};
pub use markup::{Document, Element, Selector};
pub use task::{CancelHandle, CrawlTask, VisitedSet};
