//! Values describing stylesheet asset references and their resolutions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

/// Category of a static asset, each backed by one configured directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Files under `imagesDir`.
    Image,
    /// Files under `fontsDir`.
    Font,
    /// Files under `scriptsDir`.
    Script,
    /// Other stylesheets under `cssOutputDir`.
    Stylesheet,
}

impl AssetKind {
    /// Every kind, ordered the way unscoped lookups break ties.
    pub const ALL: [AssetKind; 4] = [Self::Image, Self::Font, Self::Script, Self::Stylesheet];

    /// Name of the configuration setting holding this kind's directory.
    pub fn setting_name(self) -> &'static str {
        match self {
            Self::Image => "imagesDir",
            Self::Font => "fontsDir",
            Self::Script => "scriptsDir",
            Self::Stylesheet => "cssOutputDir",
        }
    }

    /// Kind addressed by a stylesheet helper such as `image-url`.
    pub fn from_helper(name: &str) -> Option<Self> {
        match name {
            "image-url" => Some(Self::Image),
            "font-url" => Some(Self::Font),
            "javascript-url" => Some(Self::Script),
            "stylesheet-url" => Some(Self::Stylesheet),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Font => "font",
            Self::Script => "script",
            Self::Stylesheet => "stylesheet",
        };
        f.write_str(name)
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "image" | "images" | "img" => Ok(Self::Image),
            "font" | "fonts" => Ok(Self::Font),
            "script" | "scripts" | "js" | "javascript" => Ok(Self::Script),
            "stylesheet" | "css" => Ok(Self::Stylesheet),
            other => Err(format!("unknown asset kind `{other}`")),
        }
    }
}

/// One asset mentioned in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetReference {
    kind: Option<AssetKind>,
    path: PathBuf,
}

impl AssetReference {
    /// Reference by project-relative (or absolute) path; the owning directory is discovered.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: None,
            path: path.into(),
        }
    }

    /// Reference relative to the directory configured for `kind`.
    pub fn scoped(kind: AssetKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind: Some(kind),
            path: path.into(),
        }
    }

    /// Reference relative to `imagesDir`.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self::scoped(AssetKind::Image, path)
    }

    /// Reference relative to `fontsDir`.
    pub fn font(path: impl Into<PathBuf>) -> Self {
        Self::scoped(AssetKind::Font, path)
    }

    /// Reference relative to `scriptsDir`.
    pub fn script(path: impl Into<PathBuf>) -> Self {
        Self::scoped(AssetKind::Script, path)
    }

    /// Reference relative to `cssOutputDir`.
    pub fn stylesheet(path: impl Into<PathBuf>) -> Self {
        Self::scoped(AssetKind::Stylesheet, path)
    }

    /// Directory kind the reference is scoped to, if any.
    pub fn kind(&self) -> Option<AssetKind> {
        self.kind
    }

    /// Path exactly as referenced.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display form used in error messages.
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{kind}:{}", self.display_path()),
            None => f.write_str(&self.display_path()),
        }
    }
}

/// Outcome of resolving an [`AssetReference`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAsset {
    /// Kind of the directory that owns the asset.
    pub kind: AssetKind,
    /// Absolute, normalised directory the asset was found under.
    pub asset_dir: PathBuf,
    /// Absolute, normalised path of the asset file.
    pub absolute_path: PathBuf,
    /// URL string to embed in the compiled stylesheet.
    pub url: String,
}
