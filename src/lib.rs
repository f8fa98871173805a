#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;
pub mod rewrite;

pub use config::{BuildConfig, BuildConfigBuilder, ConfigFileError};
pub use error::AssetPathError;
pub use models::{AssetKind, AssetReference, ResolvedAsset};
pub use resolver::{AssetPathResolver, resolve};
pub use rewrite::{rewrite_stylesheet, rewrite_stylesheet_file};
