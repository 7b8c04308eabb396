use crate::config::types::{CrawlConfig, MirrorSection, DEFAULT_MAX_DEPTH};
use crate::url::parse_root_url;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Validates merged settings and builds the configuration for a run
///
/// Nothing is written by this function: a failure here means the crawl
/// never starts.
///
/// # Errors
///
/// * `ConfigError::Validation` - URL or output directory not given
/// * `ConfigError::InvalidUrl` - The root URL is not an absolute HTTP(S) URL
/// * `ConfigError::MissingOutputDir` - The output directory does not exist
pub fn build_config(section: MirrorSection) -> Result<CrawlConfig, ConfigError> {
    let url = section
        .url
        .ok_or_else(|| ConfigError::Validation("a URL to mirror is required".to_string()))?;

    let root_url = parse_root_url(&url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", url, e)))?;

    let output = section
        .output
        .ok_or_else(|| ConfigError::Validation("an output directory is required".to_string()))?;

    let output_dir = validate_output_dir(&output)?;

    Ok(CrawlConfig {
        root_url,
        output_dir,
        recursive: section.recursive.unwrap_or(false),
        max_depth: section.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        verbose: section.verbose.unwrap_or(false),
        allow_cross_domain: section.allow_cross_domain.unwrap_or(false),
    })
}

/// Checks that the output directory exists and returns its absolute form
fn validate_output_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::MissingOutputDir(path.to_path_buf()));
    }

    Ok(path.canonicalize()?)
}
