use crate::foundation::core::{Props, Size, Tag};
use crate::foundation::error::{ShadowError, ShadowResult};
use crate::mount::animation::LayoutAnimationConfig;

/// One serializable command from the JavaScript side, as it travels over the bridge.
///
/// Encoded as an object tagged by `op`, e.g.
/// `{"op":"createView","tag":3,"viewName":"View","rootTag":1,"props":{"width":10}}`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Register a root with its available size.
    RegisterRoot {
        /// Root tag.
        tag: Tag,
        /// Layout constraint of the surface.
        available_size: Size,
    },
    /// Change a root's available size.
    SetAvailableSize {
        /// Root tag.
        tag: Tag,
        /// New constraint.
        size: Size,
    },
    /// Create a view.
    CreateView {
        /// New view tag.
        tag: Tag,
        /// Registered component name.
        view_name: String,
        /// Owning root.
        root_tag: Tag,
        /// Initial props.
        #[serde(default)]
        props: Props,
    },
    /// Merge props into a view.
    UpdateView {
        /// View tag.
        tag: Tag,
        /// Component name (informational).
        #[serde(default)]
        view_name: String,
        /// Props to merge; `null` values remove a key.
        props: Props,
    },
    /// Combined move/add/remove on a container.
    ManageChildren {
        /// Container tag.
        container: Tag,
        /// See [`ManageChildren`](crate::ManageChildren).
        #[serde(default)]
        move_from: Vec<usize>,
        /// See [`ManageChildren`](crate::ManageChildren).
        #[serde(default)]
        move_to: Vec<usize>,
        /// See [`ManageChildren`](crate::ManageChildren).
        #[serde(default)]
        add_tags: Vec<Tag>,
        /// See [`ManageChildren`](crate::ManageChildren).
        #[serde(default)]
        add_at: Vec<usize>,
        /// See [`ManageChildren`](crate::ManageChildren).
        #[serde(default)]
        remove_at: Vec<usize>,
    },
    /// Overwrite a container's children.
    SetChildren {
        /// Container tag.
        container: Tag,
        /// New ordered children.
        children: Vec<Tag>,
    },
    /// Remove every child of a container.
    RemoveSubviewsFromContainer {
        /// Container tag.
        container: Tag,
    },
    /// Swap a view for another one in its parent.
    ReplaceExistingView {
        /// View to replace (purged).
        tag: Tag,
        /// Replacement.
        with_tag: Tag,
    },
    /// Purge a root and its tree.
    RemoveRootView {
        /// Root tag.
        tag: Tag,
    },
    /// Set or clear a leaf's intrinsic content size.
    SetIntrinsicContentSize {
        /// View tag.
        tag: Tag,
        /// Size, or `null` to clear.
        #[serde(default)]
        size: Option<Size>,
    },
    /// Imperative component command.
    DispatchCommand {
        /// View tag.
        tag: Tag,
        /// Command name.
        command: String,
        /// Command arguments.
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
    /// Install a layout animation for the next batch.
    ConfigureNextLayoutAnimation {
        /// Animation configuration.
        config: LayoutAnimationConfig,
    },
    /// End of a batch: lay out, diff and mount.
    BatchDidComplete,
}

impl Command {
    /// Bridge-level name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterRoot { .. } => "registerRoot",
            Self::SetAvailableSize { .. } => "setAvailableSize",
            Self::CreateView { .. } => "createView",
            Self::UpdateView { .. } => "updateView",
            Self::ManageChildren { .. } => "manageChildren",
            Self::SetChildren { .. } => "setChildren",
            Self::RemoveSubviewsFromContainer { .. } => "removeSubviewsFromContainer",
            Self::ReplaceExistingView { .. } => "replaceExistingView",
            Self::RemoveRootView { .. } => "removeRootView",
            Self::SetIntrinsicContentSize { .. } => "setIntrinsicContentSize",
            Self::DispatchCommand { .. } => "dispatchCommand",
            Self::ConfigureNextLayoutAnimation { .. } => "configureNextLayoutAnimation",
            Self::BatchDidComplete => "batchDidComplete",
        }
    }

    /// Parse a JSON array of commands.
    pub fn parse_script(s: &str) -> ShadowResult<Vec<Self>> {
        serde_json::from_str(s).map_err(|e| ShadowError::serde(format!("invalid command script: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/command.rs"]
mod tests;
