use std::collections::HashMap;

use taffy::prelude::{AvailableSpace, NodeId, Size as TaffySize};
use taffy::style::Dimension;

use crate::foundation::core::{DisplayType, Insets, LayoutDirection, LayoutMetrics, Rect, Tag};
use crate::foundation::error::{ShadowError, ShadowResult, invariant};
use crate::foundation::math::Fnv1a64;
use crate::layout::cache::LayoutCache;
use crate::layout::engine::LayoutEngine;
use crate::layout::style::{style_for_props, style_hash};
use crate::shadow::node::ShadowNode;
use crate::shadow::registry::ShadowRegistry;

#[derive(Debug, Clone, Copy)]
struct LayoutNodeCtx {
    intrinsic: Option<TaffySize<f32>>,
}

/// Flexbox engine backed by a persistent Taffy tree.
///
/// Taffy nodes live as long as their shadow node; only nodes in a root's pending set are
/// re-synced before each pass.
#[derive(Debug)]
pub struct TaffyLayoutEngine {
    taffy: taffy::TaffyTree<LayoutNodeCtx>,
    node_to_taffy: HashMap<Tag, NodeId>,
    cache: LayoutCache,
}

impl Default for TaffyLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TaffyLayoutEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self {
            taffy: taffy::TaffyTree::new(),
            node_to_taffy: HashMap::new(),
            cache: LayoutCache::default(),
        }
    }

    /// Number of nodes mirrored in the Taffy tree.
    pub fn node_count(&self) -> usize {
        self.node_to_taffy.len()
    }

    fn ensure_node(&mut self, node: &ShadowNode) -> ShadowResult<(NodeId, bool)> {
        if let Some(&nid) = self.node_to_taffy.get(&node.tag()) {
            return Ok((nid, false));
        }
        let nid = self
            .taffy
            .new_leaf_with_context(
                taffy::style::Style::default(),
                LayoutNodeCtx { intrinsic: None },
            )
            .map_err(taffy_err)?;
        self.node_to_taffy.insert(node.tag(), nid);
        Ok((nid, true))
    }

    /// Push style and context for `node` when its fingerprint changed.
    fn sync_style(&mut self, nid: NodeId, node: &ShadowNode) -> ShadowResult<()> {
        let root_size = node.root_state().map(|s| s.available_size());

        let mut h = Fnv1a64::new(style_hash(node.props()));
        match node.intrinsic_size() {
            Some(s) => {
                h.write_u8(1);
                h.write_f64(s.width);
                h.write_f64(s.height);
            }
            None => h.write_u8(0),
        }
        if let Some(s) = root_size {
            h.write_f64(s.width);
            h.write_f64(s.height);
        }
        if !self.cache.update(node.tag(), h.finish()) {
            return Ok(());
        }

        let mut style = style_for_props(node.props());
        if let Some(s) = root_size {
            // A root fills its surface.
            style.size = TaffySize {
                width: Dimension::length(s.width as f32),
                height: Dimension::length(s.height as f32),
            };
        }
        self.taffy.set_style(nid, style).map_err(taffy_err)?;
        let intrinsic = node.intrinsic_size().map(|s| TaffySize {
            width: s.width as f32,
            height: s.height as f32,
        });
        self.taffy
            .set_node_context(
                nid,
                Some(LayoutNodeCtx { intrinsic }),
            )
            .map_err(taffy_err)?;
        Ok(())
    }

    fn taffy_id(&self, tag: Tag) -> ShadowResult<NodeId> {
        self.node_to_taffy
            .get(&tag)
            .copied()
            .ok_or(ShadowError::LookupMiss(tag))
    }

    fn sync_children(&mut self, nid: NodeId, node: &ShadowNode) -> ShadowResult<()> {
        let children: Vec<NodeId> = node
            .children()
            .iter()
            .filter_map(|c| self.node_to_taffy.get(c).copied())
            .collect();
        self.taffy.set_children(nid, &children).map_err(taffy_err)
    }
}

impl LayoutEngine for TaffyLayoutEngine {
    #[tracing::instrument(level = "trace", skip(self, tree))]
    fn layout(
        &mut self,
        tree: &ShadowRegistry,
        root: Tag,
        base_direction: LayoutDirection,
    ) -> ShadowResult<Vec<(Tag, LayoutMetrics)>> {
        let root_node = tree.require(root)?;
        let Some(state) = root_node.root_state() else {
            return Err(invariant(format!("layout requested for non-root {root}")));
        };
        let available = state.available_size();
        let pending = state.pending_layout();
        let order = tree.subtree(root);

        // Nodes first, so every child id exists before children lists are pushed.
        let mut touched = Vec::new();
        for &tag in &order {
            let node = tree.require(tag)?;
            let (nid, created) = self.ensure_node(node)?;
            if created || tag == root || pending.contains(&tag) {
                self.sync_style(nid, node)?;
                touched.push((nid, tag));
            }
        }
        for (nid, tag) in touched {
            self.sync_children(nid, tree.require(tag)?)?;
        }

        let root_id = self.taffy_id(root)?;
        let available_space = TaffySize {
            width: AvailableSpace::Definite(available.width as f32),
            height: AvailableSpace::Definite(available.height as f32),
        };
        self.taffy
            .compute_layout_with_measure(
                root_id,
                available_space,
                |known_dimensions, _available_space, _node_id, node_context, _style| {
                    let intrinsic = node_context
                        .as_ref()
                        .and_then(|c| c.intrinsic)
                        .unwrap_or(TaffySize::ZERO);
                    known_dimensions.unwrap_or(intrinsic)
                },
            )
            .map_err(taffy_err)?;

        let mut directions = HashMap::<Tag, LayoutDirection>::with_capacity(order.len());
        let mut out = Vec::with_capacity(order.len());
        for &tag in &order {
            let node = tree.require(tag)?;
            let nid = self.taffy_id(tag)?;
            let l = self.taffy.layout(nid).map_err(taffy_err)?;

            let inherited = node
                .parent()
                .and_then(|p| directions.get(&p).copied())
                .unwrap_or(base_direction);
            let direction =
                LayoutDirection::from_prop(node.props().get("direction")).unwrap_or(inherited);
            directions.insert(tag, direction);

            let frame = Rect::from_origin_size(
                (f64::from(l.location.x), f64::from(l.location.y)),
                (f64::from(l.size.width), f64::from(l.size.height)),
            );
            let border = Insets::new(
                f64::from(l.border.left),
                f64::from(l.border.top),
                f64::from(l.border.right),
                f64::from(l.border.bottom),
            );
            let content_inset = Insets::new(
                f64::from(l.border.left + l.padding.left),
                f64::from(l.border.top + l.padding.top),
                f64::from(l.border.right + l.padding.right),
                f64::from(l.border.bottom + l.padding.bottom),
            );
            let local = Rect::from_origin_size((0.0, 0.0), frame.size());
            let content_frame = (local - content_inset).abs();

            out.push((
                tag,
                LayoutMetrics {
                    frame,
                    content_frame,
                    border,
                    display: DisplayType::from_prop(node.props().get("display")),
                    direction,
                },
            ));
        }

        tracing::trace!(%root, nodes = out.len(), "layout pass");
        Ok(out)
    }

    fn forget(&mut self, tag: Tag) {
        self.cache.forget(tag);
        if let Some(nid) = self.node_to_taffy.remove(&tag)
            && let Err(err) = self.taffy.remove(nid)
        {
            tracing::warn!(%tag, error = %err, "failed to drop layout node");
        }
    }
}

fn taffy_err(err: taffy::TaffyError) -> ShadowError {
    ShadowError::layout(err.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/layout/taffy_engine.rs"]
mod tests;
