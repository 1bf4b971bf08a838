use std::collections::BTreeSet;

use serde_json::Value;

use crate::foundation::core::{Props, Tag};
use crate::mount::record::MountHook;
use crate::native::view::{BasicView, NativeView};
use crate::shadow::node::ShadowNode;

/// Per-component capability set: how one view type is created, configured and mounted.
///
/// Descriptors are shared by both actors. Shadow-side methods run on the coordination actor,
/// native-side methods on the UI actor.
pub trait ComponentDescriptor: Send + Sync {
    /// Registered component name (e.g. `View`).
    fn name(&self) -> &str;

    /// Allocate the shadow node for a new view.
    fn create_shadow(&self, tag: Tag, root_tag: Tag) -> ShadowNode {
        ShadowNode::new(tag, self.name(), root_tag)
    }

    /// Allocate the native widget for a new view.
    fn create_native(&self, tag: Tag) -> Box<dyn NativeView>;

    /// Merge `props` into the shadow node, returning the changed names.
    fn apply_shadow_props(&self, node: &mut ShadowNode, props: &Props) -> BTreeSet<String> {
        node.merge_props(props)
    }

    /// Push `props` to the native widget.
    fn apply_native_props(&self, view: &mut dyn NativeView, props: &Props) {
        view.set_props(props);
    }

    /// Shadow-side notification that props named in `changed` were set during the batch.
    fn shadow_did_set_props(&self, _node: &mut ShadowNode, _changed: &BTreeSet<String>) {}

    /// Shadow-side notification that the node's children changed during the batch.
    fn shadow_did_update_children(&self, _node: &mut ShadowNode) {}

    /// Optional closure merged with the node's frame mutation at mount time.
    fn mount_hook(&self, _node: &ShadowNode) -> Option<MountHook> {
        None
    }

    /// Component-specific imperative command. Unknown commands are logged and ignored.
    fn dispatch_command(&self, _view: &mut dyn NativeView, command: &str, args: &[Value]) {
        tracing::warn!(
            component = self.name(),
            command,
            args = args.len(),
            "unsupported view command"
        );
    }
}

/// Generic container component backed by [`BasicView`].
#[derive(Debug, Clone)]
pub struct ViewDescriptor {
    name: String,
}

impl ViewDescriptor {
    /// Descriptor registered under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ComponentDescriptor for ViewDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_native(&self, _tag: Tag) -> Box<dyn NativeView> {
        Box::new(BasicView::new())
    }
}
