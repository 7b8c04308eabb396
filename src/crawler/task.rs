//! Page tasks and the set of pages already taken on by a run

use crate::config::CrawlConfig;
use crate::mirror::{page_location, INDEX_FILE};
use crate::url::visit_key;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// One page to mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Page URL
    pub url: Url,

    /// Directory the page file is written into
    pub output_dir: PathBuf,

    /// Anchor hops still allowed below this page
    pub remaining_depth: u32,

    /// Name of the page file inside `output_dir`
    pub local_file_name: String,
}

impl CrawlTask {
    /// The task for the page a run starts from, saved as `index.html` at the
    /// root of the output directory
    pub fn root(config: &CrawlConfig) -> Self {
        Self {
            url: config.root_url.clone(),
            output_dir: config.output_dir.clone(),
            remaining_depth: config.max_depth,
            local_file_name: INDEX_FILE.to_string(),
        }
    }

    /// Derives the task for a page linked from this one
    ///
    /// The child is saved under `mirror_root` at the location mirroring its
    /// URL path. Returns None when this task has no depth left, so a task
    /// with a negative depth can never be created.
    pub fn child(&self, url: Url, mirror_root: &Path) -> Option<Self> {
        let remaining_depth = self.remaining_depth.checked_sub(1)?;
        let (output_dir, local_file_name) = page_location(&url, mirror_root);

        Some(Self {
            url,
            output_dir,
            remaining_depth,
            local_file_name,
        })
    }

    /// Full path of the page file
    pub fn page_path(&self) -> PathBuf {
        self.output_dir.join(&self.local_file_name)
    }
}

/// Pages already enqueued or processed during this run
///
/// URLs are compared by their visit key (fragment removed). Each entry keeps
/// the file the page is saved to so later anchors can link to it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    pages: HashMap<Url, PathBuf>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a page as taken on
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not visited before
    /// * `false` - The URL is already in the set; nothing changes
    pub fn insert(&mut self, url: &Url, page_path: &Path) -> bool {
        let key = visit_key(url);
        if self.pages.contains_key(&key) {
            return false;
        }
        self.pages.insert(key, page_path.to_path_buf());
        true
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.pages.contains_key(&visit_key(url))
    }

    /// File a visited page is saved to
    pub fn local_page(&self, url: &Url) -> Option<&Path> {
        self.pages.get(&visit_key(url)).map(PathBuf::as_path)
    }

    /// Number of pages taken on so far
    pub(crate) fn len(&self) -> usize {
        self.pages.len()
    }
}

/// Cancels a run from outside the crawl loop
///
/// Cloned handles share one flag. Once set, the crawler stops starting new
/// fetches and drains its stack without writing pending pages.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
