//! Crawler coordinator - main mirror orchestration logic
//!
//! This module drives one mirror run. Every page moves through the same
//! steps:
//! - Fetching the page
//! - Downloading its assets and rewriting their references
//! - Following in-scope anchors depth-first (when recursion is enabled)
//! - Rendering and writing the page file
//!
//! Traversal uses an explicit stack of frames instead of call recursion.
//! Each frame owns the parsed document of one page, so a parent page stays
//! in memory, with its assets already rewritten, while its children are
//! mirrored. Cancelling a run drains the stack.

use crate::config::CrawlConfig;
use crate::crawler::assets::{asset_passes, download_resources, AssetContext};
use crate::crawler::fetcher::{build_http_client, fetch, FetchOutcome};
use crate::crawler::markup::{Document, Element, Selector};
use crate::crawler::task::{CancelHandle, CrawlTask, VisitedSet};
use crate::mirror::{is_within, relative_reference, write_file, MirrorIndex};
use crate::output::MirrorReport;
use crate::state::TaskState;
use crate::url::{in_scope, resolve, visit_key};
use crate::MirrorError;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Runs one mirror invocation
pub struct Crawler {
    config: Arc<CrawlConfig>,
    client: Client,
    visited: VisitedSet,
    index: MirrorIndex,
    report: MirrorReport,
    cancel: CancelHandle,
}

/// Anchor waiting for its child page to finish before being rewritten
struct PendingLink {
    anchor: Element,
    href: String,
}

/// One page on the traversal stack
struct Frame {
    task: CrawlTask,
    state: TaskState,
    document: Document,
    anchors: std::vec::IntoIter<Element>,
    pending: Option<PendingLink>,
}

impl Frame {
    fn advance(&mut self, next: TaskState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("{}: {} -> {}", self.task.url, self.state, next);
        self.state = next;
    }
}

impl Crawler {
    /// Creates a crawler with a freshly built HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - Validated mirror configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(MirrorError)` - The HTTP client could not be built
    pub fn new(config: CrawlConfig) -> Result<Self, MirrorError> {
        let client = build_http_client()?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a crawler sharing an existing HTTP client
    pub fn with_client(config: CrawlConfig, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
            visited: VisitedSet::new(),
            index: MirrorIndex::new(),
            report: MirrorReport::default(),
            cancel: CancelHandle::new(),
        }
    }

    /// Handle that cancels this run when triggered from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Mirrors the root page and, if enabled, the pages it links to
    ///
    /// Per-page and per-asset failures are logged and counted in the
    /// returned report; they never stop the run.
    pub async fn run(mut self) -> MirrorReport {
        let started = Instant::now();
        let root = CrawlTask::root(&self.config);

        tracing::info!(
            "Mirroring {} into {} (recursive: {}, max depth: {})",
            root.url,
            root.output_dir.display(),
            self.config.recursive,
            self.config.max_depth
        );

        let root_path = root.page_path();
        self.visited.insert(&root.url, &root_path);
        self.index.claim(&root_path, &visit_key(&root.url));

        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.start(root).await {
            stack.push(frame);
        }

        loop {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "Mirror cancelled, dropping {} unfinished page(s)",
                    stack.len()
                );
                self.report.cancelled = true;
                stack.clear();
                break;
            }

            let Some(frame) = stack.last_mut() else {
                break;
            };

            match self.next_child(frame) {
                Some(child) => {
                    if let Some(child_frame) = self.start(child).await {
                        stack.push(child_frame);
                    }
                }
                None => {
                    if let Some(done) = stack.pop() {
                        self.finalize(done).await;
                    }
                }
            }
        }

        self.report.elapsed = started.elapsed();
        tracing::info!(
            "Mirror finished: {} page(s) taken on, {} written, {} asset(s) downloaded in {:?}",
            self.visited.len(),
            self.report.pages_written,
            self.report.assets_downloaded,
            self.report.elapsed
        );

        self.report
    }

    /// Fetches a page and runs the asset passes over it
    ///
    /// Returns None when the task aborted: nothing is written for the page.
    async fn start(&mut self, task: CrawlTask) -> Option<Frame> {
        tracing::info!("Fetching page {} (depth left: {})", task.url, task.remaining_depth);

        let (bytes, content_type) = match fetch(&self.client, &task.url).await {
            FetchOutcome::Success {
                bytes,
                content_type,
            } => (bytes, content_type),
            failure => {
                tracing::warn!("Aborted page {}: {}", task.url, failure.describe());
                self.report.pages_aborted += 1;
                return None;
            }
        };

        if self.cancel.is_cancelled() {
            return None;
        }

        let document = Document::parse(&bytes, &content_type);
        tracing::debug!("Parsed {} as {}", task.url, document.encoding().name());

        let mut frame = Frame {
            document,
            task,
            state: TaskState::Start,
            anchors: Vec::new().into_iter(),
            pending: None,
        };
        frame.advance(TaskState::Rewriting);

        let mut ctx = AssetContext {
            client: &self.client,
            mirror_root: &self.config.output_dir,
            allow_cross_domain: self.config.allow_cross_domain,
            index: &mut self.index,
            report: &mut self.report,
            cancel: &self.cancel,
        };

        for pass in asset_passes() {
            frame.document = download_resources(
                &mut ctx,
                &frame.task.url,
                frame.document,
                &pass,
                &frame.task.output_dir,
            )
            .await;
        }

        if self.config.recursive && frame.task.remaining_depth > 0 {
            frame.advance(TaskState::Discovering);
            frame.anchors = frame
                .document
                .select(&Selector::with_attribute("a", "href"))
                .into_iter();
        }

        Some(frame)
    }

    /// Rewrites the anchor whose child just finished, then finds the next
    /// child page to mirror
    ///
    /// Anchors pointing at pages already taken on in this run are rewritten
    /// straight away. Returns None once the frame has no anchors left.
    fn next_child(&mut self, frame: &mut Frame) -> Option<CrawlTask> {
        if let Some(link) = frame.pending.take() {
            link.anchor.set_attr("href", &link.href);
        }

        for anchor in frame.anchors.by_ref() {
            let Some(raw) = anchor.attr("href") else {
                continue;
            };

            // Same-page fragment
            if raw.trim_start().starts_with('#') {
                continue;
            }

            let Some(url) = resolve(&frame.task.url, &raw) else {
                tracing::trace!("Skipping unresolvable anchor {:?}", raw);
                continue;
            };

            if !in_scope(&url, &frame.task.url, self.config.allow_cross_domain) {
                self.report.out_of_scope += 1;
                continue;
            }

            if let Some(existing) = self.visited.local_page(&url) {
                let href = local_href(&frame.task.output_dir, existing, &url);
                anchor.set_attr("href", &href);
                self.report.pages_skipped += 1;
                continue;
            }

            let Some(child) = frame.task.child(url.clone(), &self.config.output_dir) else {
                continue;
            };

            let page_path = child.page_path();
            if !self.index.claim(&page_path, &visit_key(&url)) {
                // Another spelling of a page already taken on, such as
                // `/index.html` for the root: link to that page's file
                let owned_by_page = self
                    .index
                    .owner(&page_path)
                    .is_some_and(|owner| self.visited.contains(owner));

                if owned_by_page {
                    let href = local_href(&frame.task.output_dir, &page_path, &url);
                    anchor.set_attr("href", &href);
                } else {
                    tracing::debug!(
                        "Not following {}: {} belongs to another URL",
                        url,
                        page_path.display()
                    );
                }
                self.report.pages_skipped += 1;
                continue;
            }

            self.visited.insert(&url, &page_path);
            frame.pending = Some(PendingLink {
                href: local_href(&frame.task.output_dir, &page_path, &url),
                anchor,
            });

            return Some(child);
        }

        None
    }

    /// Renders a page and writes it to its local file
    async fn finalize(&mut self, mut frame: Frame) {
        frame.advance(TaskState::Finalizing);
        let page_path = frame.task.page_path();
        debug_assert!(is_within(&self.config.output_dir, &page_path));

        let written = match frame.document.render() {
            Ok(bytes) => write_file(&page_path, &bytes).await,
            Err(source) => Err(MirrorError::Render {
                url: frame.task.url.to_string(),
                source,
            }),
        };

        match written {
            Ok(path) => {
                frame.advance(TaskState::Done);
                self.report.pages_written += 1;
                tracing::info!("Saved {} to {}", frame.task.url, path.display());
            }
            Err(e) => {
                frame.advance(TaskState::Aborted);
                self.report.pages_aborted += 1;
                tracing::warn!("Aborted page {}: {}", frame.task.url, e);
            }
        }
    }
}

/// Anchor value linking a page directory to a mirrored page, keeping the
/// fragment of the original link
fn local_href(from_dir: &Path, page_path: &Path, url: &Url) -> String {
    let mut href = relative_reference(from_dir, page_path);
    if let Some(fragment) = url.fragment() {
        href.push('#');
        href.push_str(fragment);
    }
    href
}

/// Runs a complete mirror operation
///
/// # Arguments
///
/// * `config` - The validated mirror configuration
///
/// # Returns
///
/// * `Ok(MirrorReport)` - The run finished or was cancelled
/// * `Err(MirrorError)` - The HTTP client could not be created
///
/// # Example
///
/// ```no_run
/// use page_mirror::config::{build_config, MirrorSection};
/// use page_mirror::crawler::mirror_site;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = build_config(MirrorSection {
///     url: Some("https://example.com/".to_string()),
///     output: Some("./mirror".into()),
///     ..Default::default()
/// })?;
/// let report = mirror_site(config).await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn mirror_site(config: CrawlConfig) -> Result<MirrorReport, MirrorError> {
    let crawler = Crawler::new(config)?;
    Ok(crawler.run().await)
}
