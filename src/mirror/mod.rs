//! Local side of the mirror
//!
//! This module contains:
//! - Path mapping from remote URLs to files under the output directory
//! - Relative references from a saved page to the files it uses
//! - Staged file writes that never expose partial files
//! - The per-run index of which URL owns which local path

mod index;
mod paths;
mod writer;

pub use index::{MirrorIndex, MirroredAsset};
pub use paths::{
    is_within, map_to_local_path, page_file_name, page_location, relative_reference, INDEX_FILE,
};
pub use writer::write_file;
