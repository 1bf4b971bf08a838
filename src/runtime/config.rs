use std::path::Path;

use crate::foundation::core::LayoutDirection;
use crate::foundation::error::{ShadowError, ShadowResult};

/// Options controlling the coordination actor and the mount pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct UiManagerOpts {
    /// Treat out-of-range `manageChildren` indices as invariant violations instead of skipping
    /// them.
    pub strict_child_indices: bool,
    /// Layout direction of roots that do not set one through props.
    pub default_layout_direction: LayoutDirection,
    /// When disabled, configured layout animations still report completion but mutations are
    /// applied instantly.
    pub layout_animations: bool,
    /// Name of the coordination actor thread.
    pub coordinator_thread_name: String,
    /// Name of the UI actor thread.
    pub ui_thread_name: String,
}

impl Default for UiManagerOpts {
    fn default() -> Self {
        Self {
            strict_child_indices: false,
            default_layout_direction: LayoutDirection::Ltr,
            layout_animations: true,
            coordinator_thread_name: "shadowtree-coordinator".to_owned(),
            ui_thread_name: "shadowtree-ui".to_owned(),
        }
    }
}

impl UiManagerOpts {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> ShadowResult<Self> {
        serde_json::from_str(s).map_err(|e| ShadowError::serde(format!("invalid options: {e}")))
    }

    /// Read and parse an options file.
    pub fn from_path(path: impl AsRef<Path>) -> ShadowResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            ShadowError::Other(anyhow::anyhow!("read options '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/config.rs"]
mod tests;
