use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Depth used when neither the command line nor the config file sets one
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Validated settings for one mirror run
///
/// Built by [`crate::config::build_config`]; never modified once the crawl
/// has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Page the mirror starts from
    pub root_url: Url,

    /// Existing, absolute directory the mirror is written into
    pub output_dir: PathBuf,

    /// Follow in-scope anchors
    pub recursive: bool,

    /// How many anchor hops to follow from the root page
    pub max_depth: u32,

    /// Log every download
    pub verbose: bool,

    /// Download and follow references to other origins
    pub allow_cross_domain: bool,
}

/// Top-level structure of a TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub mirror: MirrorSection,
}

/// The `[mirror]` table; every key is optional so command-line flags can
/// fill the gaps
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MirrorSection {
    /// URL of the page to mirror
    pub url: Option<String>,

    /// Output directory
    pub output: Option<PathBuf>,

    /// Follow in-scope anchors
    pub recursive: Option<bool>,

    /// Maximum anchor depth
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Log every download
    pub verbose: Option<bool>,

    /// Download and follow references to other origins
    #[serde(rename = "allow-cross-domain")]
    pub allow_cross_domain: Option<bool>,
}

impl MirrorSection {
    /// Layers `overrides` on top of `self`; set values in `overrides` win
    pub fn merge(self, overrides: MirrorSection) -> MirrorSection {
        MirrorSection {
            url: overrides.url.or(self.url),
            output: overrides.output.or(self.output),
            recursive: overrides.recursive.or(self.recursive),
            max_depth: overrides.max_depth.or(self.max_depth),
            verbose: overrides.verbose.or(self.verbose),
            allow_cross_domain: overrides.allow_cross_domain.or(self.allow_cross_domain),
        }
    }
}
