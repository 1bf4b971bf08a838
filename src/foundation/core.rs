use std::collections::BTreeSet;
use std::fmt;

pub use kurbo::{Affine, Insets, Point, Rect, Size};

/// Property bag carried by view commands (`camelCase` keys, JSON values).
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Stable identifier correlating one shadow node with one native view.
///
/// Tags are positive; `0` is never a valid tag.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Tag(pub u64);

impl Tag {
    /// Whether this tag can name a node.
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for Tag {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Identifier of one batch (commands between two batch-complete signals).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch {}", self.0)
    }
}

/// Display classification resolved by the layout engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    /// Not rendered; the native view is hidden.
    None,
    /// Regular flex container/item.
    #[default]
    Flex,
    /// Inline content (laid out as flex, reported separately).
    Inline,
}

impl DisplayType {
    /// Parse the `display` prop value. Unknown values fall back to `Flex`.
    pub fn from_prop(value: Option<&serde_json::Value>) -> Self {
        match value.and_then(serde_json::Value::as_str) {
            Some("none") => Self::None,
            Some("inline") => Self::Inline,
            _ => Self::Flex,
        }
    }
}

/// Resolved horizontal layout direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl LayoutDirection {
    /// Parse the `direction` prop. `inherit`, missing or unknown values yield `None`.
    pub fn from_prop(value: Option<&serde_json::Value>) -> Option<Self> {
        match value.and_then(serde_json::Value::as_str) {
            Some("ltr") => Some(Self::Ltr),
            Some("rtl") => Some(Self::Rtl),
            _ => None,
        }
    }
}

/// Computed layout of one shadow node.
///
/// `frame` is relative to the parent's origin; `content_frame` is relative to the node's own
/// origin (frame inset by border and padding).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutMetrics {
    /// Border-box frame in parent coordinates.
    pub frame: Rect,
    /// Content box in local coordinates.
    pub content_frame: Rect,
    /// Resolved border widths.
    pub border: Insets,
    /// Display classification.
    pub display: DisplayType,
    /// Resolved layout direction.
    pub direction: LayoutDirection,
}

impl LayoutMetrics {
    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        let r = |r: &Rect| r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite();
        r(&self.frame)
            && r(&self.content_frame)
            && self.border.x0.is_finite()
            && self.border.y0.is_finite()
            && self.border.x1.is_finite()
            && self.border.y1.is_finite()
    }
}

/// Merge `update` into `props`. `null` values delete the key.
///
/// Returns the set of prop names touched by the update.
pub fn merge_props(props: &mut Props, update: &Props) -> BTreeSet<String> {
    let mut changed = BTreeSet::new();
    for (k, v) in update {
        if v.is_null() {
            props.remove(k);
        } else {
            props.insert(k.clone(), v.clone());
        }
        changed.insert(k.clone());
    }
    changed
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
