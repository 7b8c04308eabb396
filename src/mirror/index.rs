use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Record of a file written for a remote URL during this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredAsset {
    pub source_url: Url,
    pub local_path: PathBuf,
}

/// Ownership of local paths for the duration of one run
///
/// Every output path has exactly one writer: the first URL to claim a path
/// owns it, and a different URL mapping to the same path is refused. Assets
/// already written are remembered so later references reuse the file.
#[derive(Debug, Default)]
pub struct MirrorIndex {
    owners: HashMap<PathBuf, Url>,
    assets: HashMap<Url, PathBuf>,
}

impl MirrorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `path` for `url`
    ///
    /// # Returns
    ///
    /// * `true` - The path was free or is already owned by `url`
    /// * `false` - Another URL owns the path
    pub fn claim(&mut self, path: &Path, url: &Url) -> bool {
        match self.owners.get(path) {
            Some(owner) => owner == url,
            None => {
                self.owners.insert(path.to_path_buf(), url.clone());
                true
            }
        }
    }

    /// Returns the owner of a path, if any
    pub fn owner(&self, path: &Path) -> Option<&Url> {
        self.owners.get(path)
    }

    /// Remembers a successfully written asset
    pub fn record_asset(&mut self, asset: MirroredAsset) {
        self.owners
            .entry(asset.local_path.clone())
            .or_insert_with(|| asset.source_url.clone());
        self.assets.insert(asset.source_url, asset.local_path);
    }

    /// Looks up the file an asset URL was already mirrored into
    pub fn mirrored(&self, url: &Url) -> Option<&Path> {
        self.assets.get(url).map(PathBuf::as_path)
    }
}
