use crate::mirror::paths::INDEX_FILE;
use crate::MirrorError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes a mirrored file, creating its parent directories
///
/// The payload goes to a hidden `.part` sibling first and is renamed into
/// place once complete, so an interrupted run never leaves a truncated file
/// under its final name. An existing file is replaced. If `path` already
/// exists as a directory the file is written as `index.html` inside it.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The path actually written
/// * `Err(MirrorError::Write)` - A directory could not be created or the file
///   could not be written
pub async fn write_file(path: &Path, bytes: &[u8]) -> Result<PathBuf, MirrorError> {
    let target = if fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false) {
        path.join(INDEX_FILE)
    } else {
        path.to_path_buf()
    };

    if let Some(parent) = target.parent() {
        // create_dir_all succeeds when the directories already exist
        fs::create_dir_all(parent)
            .await
            .map_err(|source| write_error(&target, source))?;
    }

    let staging = staging_path(&target);

    if let Err(source) = fs::write(&staging, bytes).await {
        let _ = fs::remove_file(&staging).await;
        return Err(write_error(&target, source));
    }

    if let Err(source) = fs::rename(&staging, &target).await {
        let _ = fs::remove_file(&staging).await;
        return Err(write_error(&target, source));
    }

    Ok(target)
}

/// Hidden sibling a file is staged in before being published
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    target.with_file_name(format!(".{}.part", name))
}

fn write_error(path: &Path, source: std::io::Error) -> MirrorError {
    MirrorError::Write {
        path: path.to_path_buf(),
        source,
    }
}
