//! Build configuration describing the stylesheet project layout and asset URL options.

mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset_paths::{absolutize, common_ancestor};
use crate::error::AssetPathError;
use crate::models::AssetKind;

pub use settings::{SettingsError, parse_settings};

/// File names searched, in order, by [`BuildConfig::discover`].
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
    ["assets.config.json", "assets.config.yaml", "config.rb"];

const DEFAULT_HTTP_ROOT_PATH: &str = "/";
const DEFAULT_FONTS_SUBDIR: &str = "fonts";

/// Errors raised while reading a configuration file from disk.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// None of the candidate files exist in the searched directory.
    #[error(
        "no configuration file ({}) found in {}",
        CONFIG_FILE_CANDIDATES.join(", "),
        .dir.display()
    )]
    Missing {
        /// Directory that was searched.
        dir: PathBuf,
    },
    /// Failed to read the configuration file.
    #[error("failed to read {}", .path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file could not be parsed in its format.
    #[error("failed to parse {}: {message}", .path.display())]
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// The file parsed, but its settings are missing or malformed.
    #[error(transparent)]
    Invalid(#[from] AssetPathError),
}

/// Unvalidated settings, as read from a file or assembled in code.
///
/// Accepts both the camelCase names and the snake_case names of the classic stylesheet build
/// configuration (`http_path`, `css_dir`, `sass_dir`, `images_dir`, `javascripts_dir`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfigBuilder {
    #[serde(alias = "http_path", alias = "http_root_path")]
    http_root_path: Option<String>,
    #[serde(alias = "css_dir", alias = "css_output_dir")]
    css_output_dir: Option<String>,
    #[serde(alias = "sass_dir", alias = "source_style_dir")]
    source_style_dir: Option<String>,
    #[serde(alias = "images_dir")]
    images_dir: Option<String>,
    #[serde(alias = "javascripts_dir", alias = "scripts_dir")]
    scripts_dir: Option<String>,
    #[serde(alias = "fonts_dir")]
    fonts_dir: Option<String>,
    #[serde(alias = "site_root_dir")]
    site_root_dir: Option<String>,
    #[serde(alias = "line_comments", alias = "emit_line_comments")]
    emit_line_comments: Option<bool>,
    #[serde(alias = "relative_assets", alias = "use_relative_asset_paths")]
    use_relative_asset_paths: Option<bool>,
}

impl BuildConfigBuilder {
    /// Site-absolute URL base. Defaults to `/`.
    pub fn http_root_path(mut self, value: impl Into<String>) -> Self {
        self.http_root_path = Some(value.into());
        self
    }

    /// Directory compiled stylesheets are written to.
    pub fn css_output_dir(mut self, value: impl Into<String>) -> Self {
        self.css_output_dir = Some(value.into());
        self
    }

    /// Directory holding stylesheet sources.
    pub fn source_style_dir(mut self, value: impl Into<String>) -> Self {
        self.source_style_dir = Some(value.into());
        self
    }

    /// Directory holding images.
    pub fn images_dir(mut self, value: impl Into<String>) -> Self {
        self.images_dir = Some(value.into());
        self
    }

    /// Directory holding scripts.
    pub fn scripts_dir(mut self, value: impl Into<String>) -> Self {
        self.scripts_dir = Some(value.into());
        self
    }

    /// Directory holding fonts. Defaults to `fonts` below the CSS output directory.
    pub fn fonts_dir(mut self, value: impl Into<String>) -> Self {
        self.fonts_dir = Some(value.into());
        self
    }

    /// Directory served at the HTTP root. Defaults to the deepest common ancestor of the
    /// CSS, image, script and font directories.
    pub fn site_root_dir(mut self, value: impl Into<String>) -> Self {
        self.site_root_dir = Some(value.into());
        self
    }

    /// Whether the external compiler annotates output with source line comments.
    pub fn emit_line_comments(mut self, value: bool) -> Self {
        self.emit_line_comments = Some(value);
        self
    }

    /// Whether asset URLs are emitted relative to the stylesheet.
    pub fn use_relative_asset_paths(mut self, value: bool) -> Self {
        self.use_relative_asset_paths = Some(value);
        self
    }

    /// Read unvalidated settings from a JSON, YAML or flat `key = value` file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigFileError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => {
                serde_json::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            _ => {
                let values = parse_settings(&content).map_err(|err| parse_error(err.to_string()))?;
                serde_json::from_value(serde_json::Value::Object(values))
                    .map_err(|err| parse_error(err.to_string()))
            }
        }
    }

    /// Validate the settings, resolving relative directories against `project_root`.
    pub fn build(self, project_root: impl AsRef<Path>) -> Result<BuildConfig, AssetPathError> {
        let project_root = absolute_project_root(project_root.as_ref())?;

        let http_root_path = self
            .http_root_path
            .unwrap_or_else(|| DEFAULT_HTTP_ROOT_PATH.to_string());
        validate_http_root(&http_root_path)?;

        let css_output_dir = required_dir("cssOutputDir", self.css_output_dir)?;
        let source_style_dir = required_dir("sourceStyleDir", self.source_style_dir)?;
        let images_dir = required_dir("imagesDir", self.images_dir)?;
        let scripts_dir = required_dir("scriptsDir", self.scripts_dir)?;
        let fonts_dir = match self.fonts_dir {
            Some(value) => required_dir("fontsDir", Some(value))?,
            None => css_output_dir.join(DEFAULT_FONTS_SUBDIR),
        };

        let site_root = match self.site_root_dir {
            Some(value) => absolutize(&required_dir("siteRootDir", Some(value))?, &project_root),
            None => {
                let dirs: Vec<PathBuf> = [&css_output_dir, &images_dir, &scripts_dir, &fonts_dir]
                    .into_iter()
                    .map(|dir| absolutize(dir, &project_root))
                    .collect();
                common_ancestor(dirs.iter().map(PathBuf::as_path)).ok_or_else(|| {
                    AssetPathError::invalid_config(
                        "siteRootDir",
                        "asset directories share no common ancestor; set siteRootDir explicitly",
                    )
                })?
            }
        };

        let config = BuildConfig {
            project_root,
            http_root_path,
            css_output_dir,
            source_style_dir,
            images_dir,
            scripts_dir,
            fonts_dir,
            site_root,
            emit_line_comments: self.emit_line_comments.unwrap_or(false),
            use_relative_asset_paths: self.use_relative_asset_paths.unwrap_or(false),
        };
        log::debug!(
            "loaded build configuration rooted at {} (relative assets: {})",
            config.project_root.display(),
            config.use_relative_asset_paths
        );
        Ok(config)
    }
}

/// Validated, immutable configuration for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    project_root: PathBuf,
    http_root_path: String,
    css_output_dir: PathBuf,
    source_style_dir: PathBuf,
    images_dir: PathBuf,
    scripts_dir: PathBuf,
    fonts_dir: PathBuf,
    site_root: PathBuf,
    emit_line_comments: bool,
    use_relative_asset_paths: bool,
}

impl BuildConfig {
    /// Start assembling a configuration in code.
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::default()
    }

    /// Load the first configuration file found in `dir`, rooting the project there.
    pub fn discover(dir: &Path) -> Result<Self, ConfigFileError> {
        let candidate = CONFIG_FILE_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| ConfigFileError::Missing {
                dir: dir.to_path_buf(),
            })?;
        log::debug!("discovered configuration at {}", candidate.display());
        Self::from_path(&candidate)
    }

    /// Load a configuration file, rooting relative directories at the file's parent.
    pub fn from_path(path: &Path) -> Result<Self, ConfigFileError> {
        let project_root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(BuildConfigBuilder::from_path(path)?.build(project_root)?)
    }

    /// Absolute directory relative settings are resolved against.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Site-absolute URL base.
    pub fn http_root_path(&self) -> &str {
        &self.http_root_path
    }

    /// Directory compiled stylesheets are written to, as configured.
    pub fn css_output_dir(&self) -> &Path {
        &self.css_output_dir
    }

    /// Directory holding stylesheet sources, as configured.
    pub fn source_style_dir(&self) -> &Path {
        &self.source_style_dir
    }

    /// Image directory, as configured.
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Script directory, as configured.
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Font directory, as configured or defaulted.
    pub fn fonts_dir(&self) -> &Path {
        &self.fonts_dir
    }

    /// Absolute directory served at [`Self::http_root_path`].
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Consumed by the external compiler only.
    pub fn emit_line_comments(&self) -> bool {
        self.emit_line_comments
    }

    /// Selects relative rather than site-rooted asset URLs.
    pub fn use_relative_asset_paths(&self) -> bool {
        self.use_relative_asset_paths
    }

    /// Configured directory for an asset kind, as written in the configuration.
    pub fn asset_dir(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Image => &self.images_dir,
            AssetKind::Font => &self.fonts_dir,
            AssetKind::Script => &self.scripts_dir,
            AssetKind::Stylesheet => &self.css_output_dir,
        }
    }

    /// Absolute, normalised directory for an asset kind.
    pub fn absolute_asset_dir(&self, kind: AssetKind) -> PathBuf {
        self.absolute(self.asset_dir(kind))
    }

    /// Anchor a path at the project root and normalise it.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        absolutize(path, &self.project_root)
    }
}

fn absolute_project_root(project_root: &Path) -> Result<PathBuf, AssetPathError> {
    if project_root.is_absolute() {
        return Ok(absolutize(project_root, Path::new("/")));
    }

    let cwd = std::env::current_dir().map_err(|err| {
        AssetPathError::invalid_config(
            "projectRoot",
            format!("cannot determine the current directory: {err}"),
        )
    })?;
    Ok(absolutize(project_root, &cwd))
}

fn validate_http_root(value: &str) -> Result<(), AssetPathError> {
    if !value.starts_with('/') {
        return Err(AssetPathError::invalid_config(
            "httpRootPath",
            format!("`{value}` must start with `/`"),
        ));
    }
    if value.starts_with("//") || value.chars().any(char::is_whitespace) {
        return Err(AssetPathError::invalid_config(
            "httpRootPath",
            format!("`{value}` is not a site-absolute path"),
        ));
    }
    Ok(())
}

fn required_dir(setting: &str, value: Option<String>) -> Result<PathBuf, AssetPathError> {
    let Some(value) = value else {
        return Err(AssetPathError::invalid_config(setting, "setting is required"));
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AssetPathError::invalid_config(setting, "must not be empty"));
    }
    if trimmed.contains('\0') {
        return Err(AssetPathError::invalid_config(setting, "contains a NUL byte"));
    }
    if trimmed.contains("://") {
        return Err(AssetPathError::invalid_config(
            setting,
            format!("`{trimmed}` must be a filesystem path, not a URL"),
        ));
    }

    Ok(PathBuf::from(trimmed))
}
