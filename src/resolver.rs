//! Asset path resolution: turn a stylesheet asset reference into the URL to emit.

use std::path::{Path, PathBuf};

use crate::asset_paths::{
    escapes_root, join_http_path, normalize_lexically, relative_path_from, to_url_path,
};
use crate::config::BuildConfig;
use crate::error::AssetPathError;
use crate::models::{AssetKind, AssetReference, ResolvedAsset};

/// Resolve `asset` for a stylesheet that will be written to `css_file_output_path`.
///
/// Shorthand for [`AssetPathResolver::resolve`].
pub fn resolve(
    config: &BuildConfig,
    asset: &AssetReference,
    css_file_output_path: &Path,
) -> Result<String, AssetPathError> {
    AssetPathResolver::new(config).resolve(asset, css_file_output_path)
}

/// Stateless resolver borrowing an immutable [`BuildConfig`].
///
/// Cheap to construct and `Copy`, so one can be handed to every worker resolving assets in
/// parallel.
#[derive(Debug, Clone, Copy)]
pub struct AssetPathResolver<'a> {
    config: &'a BuildConfig,
}

impl<'a> AssetPathResolver<'a> {
    /// Create a resolver for the provided configuration.
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Configuration the resolver reads from.
    pub fn config(&self) -> &'a BuildConfig {
        self.config
    }

    /// Compute the URL string to embed in the compiled stylesheet.
    ///
    /// With relative asset paths enabled the URL climbs from the stylesheet's directory to the
    /// asset; otherwise it is the HTTP root joined with the asset's path below the site root.
    pub fn resolve(
        &self,
        asset: &AssetReference,
        css_file_output_path: &Path,
    ) -> Result<String, AssetPathError> {
        self
            .resolve_detailed(asset, css_file_output_path)
            .map(|resolved| resolved.url)
    }

    /// Like [`Self::resolve`], also reporting where the asset was found.
    pub fn resolve_detailed(
        &self,
        asset: &AssetReference,
        css_file_output_path: &Path,
    ) -> Result<ResolvedAsset, AssetPathError> {
        let (kind, asset_dir, absolute_path) = self.locate(asset)?;
        let url = if self.config.use_relative_asset_paths() {
            self.relative_url(&absolute_path, css_file_output_path)?
        } else {
            self.site_url(&absolute_path)?
        };

        log::debug!("resolved {asset} -> {url}");
        Ok(ResolvedAsset {
            kind,
            asset_dir,
            absolute_path,
            url,
        })
    }

    /// Resolve several assets for one stylesheet, keeping one result per asset.
    ///
    /// A missing asset only fails its own entry.
    pub fn resolve_all<'r>(
        &self,
        assets: impl IntoIterator<Item = &'r AssetReference>,
        css_file_output_path: &Path,
    ) -> Vec<Result<String, AssetPathError>> {
        assets
            .into_iter()
            .map(|asset| self.resolve(asset, css_file_output_path))
            .collect()
    }

    fn locate(
        &self,
        asset: &AssetReference,
    ) -> Result<(AssetKind, PathBuf, PathBuf), AssetPathError> {
        let (kind, asset_dir, absolute_path) = match asset.kind() {
            Some(kind) => {
                let relative = strip_root(asset.path());
                if escapes_root(relative) {
                    return Err(AssetPathError::not_found(
                        asset.display_path(),
                        format!("reference escapes {}", kind.setting_name()),
                    ));
                }
                let asset_dir = self.config.absolute_asset_dir(kind);
                let absolute_path = normalize_lexically(&asset_dir.join(relative));
                (kind, asset_dir, absolute_path)
            }
            None => {
                let absolute_path = self.config.absolute(asset.path());
                let (kind, asset_dir) = self.owning_dir(&absolute_path).ok_or_else(|| {
                    AssetPathError::not_found(
                        asset.display_path(),
                        "not under any configured asset directory",
                    )
                })?;
                (kind, asset_dir, absolute_path)
            }
        };

        if !absolute_path.is_file() {
            return Err(AssetPathError::not_found(
                asset.display_path(),
                format!(
                    "no such file under {} ({})",
                    kind.setting_name(),
                    asset_dir.display()
                ),
            ));
        }

        Ok((kind, asset_dir, absolute_path))
    }

    /// Most specific configured directory containing `absolute_path`.
    fn owning_dir(&self, absolute_path: &Path) -> Option<(AssetKind, PathBuf)> {
        let mut best: Option<(AssetKind, PathBuf)> = None;

        for kind in AssetKind::ALL {
            let dir = self.config.absolute_asset_dir(kind);
            if absolute_path == dir || !absolute_path.starts_with(&dir) {
                continue;
            }
            let depth = dir.components().count();
            let deeper = best
                .as_ref()
                .is_none_or(|(_, current)| depth > current.components().count());
            if deeper {
                best = Some((kind, dir));
            }
        }

        best
    }

    fn relative_url(
        &self,
        absolute_path: &Path,
        css_file_output_path: &Path,
    ) -> Result<String, AssetPathError> {
        let css_file = self.config.absolute(css_file_output_path);
        let css_dir = css_file.parent().ok_or_else(|| {
            AssetPathError::invalid_config(
                "cssFileOutputPath",
                format!("`{}` has no parent directory", css_file.display()),
            )
        })?;

        let relative = relative_path_from(css_dir, absolute_path).ok_or_else(|| {
            AssetPathError::invalid_config(
                "cssFileOutputPath",
                format!(
                    "`{}` and `{}` share no filesystem root",
                    css_dir.display(),
                    absolute_path.display()
                ),
            )
        })?;

        Ok(to_url_path(&relative))
    }

    fn site_url(&self, absolute_path: &Path) -> Result<String, AssetPathError> {
        let below_root = absolute_path
            .strip_prefix(self.config.site_root())
            .map_err(|_| {
                AssetPathError::invalid_config(
                    "siteRootDir",
                    format!(
                        "`{}` lies outside the site root `{}`",
                        absolute_path.display(),
                        self.config.site_root().display()
                    ),
                )
            })?;

        Ok(join_http_path(
            self.config.http_root_path(),
            &to_url_path(below_root),
        ))
    }
}

fn strip_root(path: &Path) -> &Path {
    path.strip_prefix("/").unwrap_or(path)
}
