//! URL handling module for Page-Mirror
//!
//! This module provides reference resolution, root URL validation, visited-set
//! keys and the domain policy deciding which references are in scope.

mod domain;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::{in_scope, same_origin};
pub use normalize::{parse_root_url, visit_key};
pub use resolve::{is_absolute_reference, resolve};
