//! Error kinds surfaced while validating configuration and resolving assets.

use thiserror::Error;

/// Failures produced by configuration validation and asset resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetPathError {
    /// A required setting is missing or malformed. Fatal for the build.
    #[error("invalid configuration for `{setting}`: {reason}")]
    InvalidConfig {
        /// Name of the offending setting.
        setting: String,
        /// Human readable explanation.
        reason: String,
    },
    /// A referenced asset does not exist under any configured asset directory.
    #[error("asset `{asset}` not found: {reason}")]
    AssetNotFound {
        /// Asset path as it was referenced.
        asset: String,
        /// Human readable explanation.
        reason: String,
    },
}

impl AssetPathError {
    pub(crate) fn invalid_config(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            setting: setting.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetNotFound {
            asset: asset.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for the per-asset failure kind.
    pub fn is_asset_not_found(&self) -> bool {
        matches!(self, Self::AssetNotFound { .. })
    }
}
