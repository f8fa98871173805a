//! Helpers for normalising filesystem paths and turning them into stylesheet URLs.
//!
//! The responsibilities are split into focused submodules so that lexical path handling,
//! relative-offset computation, site-rooted URL joins and reference filtering can be tested
//! independently. Everything here is pure: no function touches the filesystem.

mod filters;
mod normalize;
mod relative;
mod site;

pub use filters::{should_ignore_asset_reference, split_reference_suffix};
pub use normalize::{absolutize, common_ancestor, escapes_root, normalize_lexically};
pub use relative::{relative_path_from, to_url_path};
pub use site::join_http_path;
