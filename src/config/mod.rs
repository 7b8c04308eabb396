//! Configuration module for Page-Mirror
//!
//! Settings come from command-line flags, optionally layered over a TOML file:
//!
//! ```toml
//! [mirror]
//! url = "https://site.test/"
//! output = "./mirror"
//! recursive = true
//! max-depth = 2
//! allow-cross-domain = false
//! ```
//!
//! # Example
//!
//! ```no_run
//! use page_mirror::config::{build_config, load_config, MirrorSection};
//! use std::path::Path;
//!
//! let file = load_config(Path::new("mirror.toml")).unwrap();
//! let cli = MirrorSection { recursive: Some(true), ..Default::default() };
//! let config = build_config(file.merge(cli)).unwrap();
//! println!("Mirroring {} into {}", config.root_url, config.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ConfigFile, CrawlConfig, MirrorSection, DEFAULT_MAX_DEPTH};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::build_config;
