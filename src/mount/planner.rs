use std::collections::HashMap;

use crate::component::registry::ComponentRegistry;
use crate::foundation::core::{DisplayType, LayoutDirection, LayoutMetrics, Tag};
use crate::foundation::error::absorb;
use crate::layout::engine::LayoutEngine;
use crate::mount::record::{FrameMutation, MountHook};
use crate::shadow::node::{RootState, ShadowNode};
use crate::shadow::registry::ShadowRegistry;

/// Output of one layout + diff step.
#[derive(Default)]
pub(crate) struct Plan {
    pub(crate) records: Vec<FrameMutation>,
    pub(crate) hooks: HashMap<Tag, MountHook>,
}

/// Lays out every root that needs it and diffs the result against recorded metrics.
pub(crate) struct MutationPlanner<'a> {
    shadow: &'a mut ShadowRegistry,
    engine: &'a mut dyn LayoutEngine,
    components: &'a ComponentRegistry,
    base_direction: LayoutDirection,
}

impl<'a> MutationPlanner<'a> {
    pub(crate) fn new(
        shadow: &'a mut ShadowRegistry,
        engine: &'a mut dyn LayoutEngine,
        components: &'a ComponentRegistry,
        base_direction: LayoutDirection,
    ) -> Self {
        Self {
            shadow,
            engine,
            components,
            base_direction,
        }
    }

    /// Roots are visited in ascending tag order. A root whose layout fails keeps its pending
    /// set and is retried with the next batch.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn plan(mut self) -> Plan {
        let mut plan = Plan::default();
        let roots: Vec<Tag> = self.shadow.roots().collect();
        for root in roots {
            let needs_layout = self
                .shadow
                .get(root)
                .and_then(ShadowNode::root_state)
                .is_some_and(RootState::needs_layout);
            if !needs_layout {
                continue;
            }
            match self.engine.layout(self.shadow, root, self.base_direction) {
                Ok(metrics) => self.diff_root(root, metrics, &mut plan),
                Err(err) => absorb("layout", Err(err)),
            }
        }
        tracing::debug!(records = plan.records.len(), "layout diff");
        plan
    }

    fn diff_root(&mut self, root: Tag, metrics: Vec<(Tag, LayoutMetrics)>, plan: &mut Plan) {
        let first = plan.records.len();
        for (tag, m) in &metrics {
            let Some(node) = self.shadow.get(*tag) else {
                continue;
            };
            if !m.is_finite() {
                tracing::warn!(%tag, "layout produced non-finite metrics; skipped");
                continue;
            }
            if node.layout_metrics() == Some(m) {
                continue;
            }
            // A root has no parent to appear inside of, so it never animates in.
            let parent_is_new = match node.parent() {
                Some(p) => self.shadow.get(p).is_some_and(ShadowNode::is_new),
                None => node.is_new(),
            };
            plan.records.push(FrameMutation {
                tag: *tag,
                frame: m.frame,
                layout_direction: m.direction,
                is_new: node.is_new(),
                parent_is_new,
                is_hidden: m.display == DisplayType::None,
            });
        }

        for (tag, m) in metrics {
            if let Ok(node) = self.shadow.get_mut(tag) {
                if m.is_finite() {
                    node.metrics = Some(m);
                }
                node.is_dirty = false;
            }
        }
        for record in &plan.records[first..] {
            let Ok(node) = self.shadow.get_mut(record.tag) else {
                continue;
            };
            node.is_new = false;
            let node = &*node;
            if let Some(hook) = self
                .components
                .get(node.view_name())
                .and_then(|c| c.mount_hook(node))
            {
                plan.hooks.insert(record.tag, hook);
            }
        }
        if let Ok(node) = self.shadow.get_mut(root)
            && let Some(state) = node.root.as_mut()
        {
            state.pending_layout.clear();
            state.needs_layout = false;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mount/planner.rs"]
mod tests;
