use crate::config::types::{ConfigFile, MirrorSection};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The file only supplies defaults; it is validated once command-line
/// overrides have been applied (see [`crate::config::build_config`]).
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(MirrorSection)` - The `[mirror]` table of the file
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use page_mirror::config::load_config;
///
/// let section = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Max depth: {:?}", section.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<MirrorSection, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file.mirror)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration file and returns both its contents and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(MirrorSection, String), ConfigError> {
    let section = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((section, hash))
}
