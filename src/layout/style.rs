use serde_json::Value;
use taffy::prelude::{Rect, Size};
use taffy::style::{
    AlignContent, AlignItems, Dimension, Display, FlexDirection, FlexWrap, JustifyContent,
    LengthPercentage, LengthPercentageAuto, Position, Style,
};

use crate::foundation::core::Props;
use crate::foundation::math::Fnv1a64;

/// Props that feed the flexbox style, sorted.
pub const LAYOUT_PROPS: &[&str] = &[
    "alignContent",
    "alignItems",
    "alignSelf",
    "aspectRatio",
    "borderBottomWidth",
    "borderLeftWidth",
    "borderRightWidth",
    "borderTopWidth",
    "borderWidth",
    "bottom",
    "columnGap",
    "direction",
    "display",
    "flex",
    "flexBasis",
    "flexDirection",
    "flexGrow",
    "flexShrink",
    "flexWrap",
    "gap",
    "height",
    "justifyContent",
    "left",
    "margin",
    "marginBottom",
    "marginHorizontal",
    "marginLeft",
    "marginRight",
    "marginTop",
    "marginVertical",
    "maxHeight",
    "maxWidth",
    "minHeight",
    "minWidth",
    "padding",
    "paddingBottom",
    "paddingHorizontal",
    "paddingLeft",
    "paddingRight",
    "paddingTop",
    "paddingVertical",
    "position",
    "right",
    "rowGap",
    "top",
    "width",
];

/// Fingerprint of the layout-relevant subset of `props`.
pub(crate) fn style_hash(props: &Props) -> u64 {
    let mut h = Fnv1a64::new_default();
    for &key in LAYOUT_PROPS {
        if let Some(v) = props.get(key) {
            h.write_str(key);
            h.write_str(&v.to_string());
        }
    }
    h.finish()
}

/// Build the Taffy style for a node. Unknown or malformed values keep the default.
///
/// Defaults follow the usual native flexbox conventions: column direction, no shrink.
pub(crate) fn style_for_props(props: &Props) -> Style {
    let get = |k: &str| props.get(k);

    let mut style = Style {
        flex_direction: FlexDirection::Column,
        flex_shrink: 0.0,
        ..Style::default()
    };

    if get("display").and_then(Value::as_str) == Some("none") {
        style.display = Display::None;
    }
    if let Some(p) = get("position").and_then(Value::as_str) {
        style.position = match p {
            "absolute" => Position::Absolute,
            _ => Position::Relative,
        };
    }
    if let Some(d) = get("flexDirection").and_then(Value::as_str) {
        style.flex_direction = match d {
            "row" => FlexDirection::Row,
            "row-reverse" => FlexDirection::RowReverse,
            "column-reverse" => FlexDirection::ColumnReverse,
            _ => FlexDirection::Column,
        };
    }
    if let Some(w) = get("flexWrap").and_then(Value::as_str) {
        style.flex_wrap = match w {
            "wrap" => FlexWrap::Wrap,
            "wrap-reverse" => FlexWrap::WrapReverse,
            _ => FlexWrap::NoWrap,
        };
    }
    style.justify_content = get("justifyContent")
        .and_then(Value::as_str)
        .and_then(justify_content);
    style.align_items = get("alignItems").and_then(Value::as_str).and_then(align_items);
    style.align_self = get("alignSelf").and_then(Value::as_str).and_then(align_items);
    style.align_content = get("alignContent")
        .and_then(Value::as_str)
        .and_then(align_content);

    if let Some(flex) = get("flex").and_then(Value::as_f64) {
        let flex = flex as f32;
        if flex > 0.0 {
            style.flex_grow = flex;
            style.flex_shrink = 1.0;
            style.flex_basis = Dimension::length(0.0);
        } else if flex < 0.0 {
            style.flex_shrink = -flex;
        }
    }
    if let Some(g) = get("flexGrow").and_then(Value::as_f64) {
        style.flex_grow = (g as f32).max(0.0);
    }
    if let Some(s) = get("flexShrink").and_then(Value::as_f64) {
        style.flex_shrink = (s as f32).max(0.0);
    }
    if let Some(b) = get("flexBasis").and_then(dimension) {
        style.flex_basis = b;
    }
    if let Some(r) = get("aspectRatio").and_then(Value::as_f64) {
        style.aspect_ratio = Some(r as f32);
    }

    style.size = Size {
        width: get("width").and_then(dimension).unwrap_or(Dimension::auto()),
        height: get("height").and_then(dimension).unwrap_or(Dimension::auto()),
    };
    style.min_size = Size {
        width: get("minWidth").and_then(dimension).unwrap_or(Dimension::auto()),
        height: get("minHeight").and_then(dimension).unwrap_or(Dimension::auto()),
    };
    style.max_size = Size {
        width: get("maxWidth").and_then(dimension).unwrap_or(Dimension::auto()),
        height: get("maxHeight").and_then(dimension).unwrap_or(Dimension::auto()),
    };

    let gap = get("gap").and_then(length_percentage);
    style.gap = Size {
        width: get("columnGap")
            .and_then(length_percentage)
            .or(gap)
            .unwrap_or(LengthPercentage::length(0.0)),
        height: get("rowGap")
            .and_then(length_percentage)
            .or(gap)
            .unwrap_or(LengthPercentage::length(0.0)),
    };

    style.padding = edges(props, "padding", "", length_percentage, LengthPercentage::length(0.0));
    style.border = edges(
        props,
        "border",
        "Width",
        length_percentage,
        LengthPercentage::length(0.0),
    );
    style.margin = edges(
        props,
        "margin",
        "",
        length_percentage_auto,
        LengthPercentageAuto::length(0.0),
    );
    style.inset = Rect {
        left: get("left")
            .and_then(length_percentage_auto)
            .unwrap_or(LengthPercentageAuto::auto()),
        right: get("right")
            .and_then(length_percentage_auto)
            .unwrap_or(LengthPercentageAuto::auto()),
        top: get("top")
            .and_then(length_percentage_auto)
            .unwrap_or(LengthPercentageAuto::auto()),
        bottom: get("bottom")
            .and_then(length_percentage_auto)
            .unwrap_or(LengthPercentageAuto::auto()),
    };

    style
}

/// Resolve a four-sided prop family: `{base}{Side}{suffix}` beats
/// `{base}{Axis}` which beats `{base}{suffix}`.
fn edges<T: Copy>(
    props: &Props,
    base: &str,
    suffix: &str,
    parse: fn(&Value) -> Option<T>,
    zero: T,
) -> Rect<T> {
    let read = |key: String| props.get(&key).and_then(parse);
    let all = read(format!("{base}{suffix}"));
    // Only `padding`/`margin` carry axis shorthands.
    let (horizontal, vertical) = if suffix.is_empty() {
        (
            read(format!("{base}Horizontal")),
            read(format!("{base}Vertical")),
        )
    } else {
        (None, None)
    };
    let side = |name: &str, axis: Option<T>| {
        read(format!("{base}{name}{suffix}"))
            .or(axis)
            .or(all)
            .unwrap_or(zero)
    };
    Rect {
        left: side("Left", horizontal),
        right: side("Right", horizontal),
        top: side("Top", vertical),
        bottom: side("Bottom", vertical),
    }
}

fn percent(v: &Value) -> Option<f32> {
    let s = v.as_str()?.trim();
    let n = s.strip_suffix('%')?.trim().parse::<f32>().ok()?;
    n.is_finite().then_some(n / 100.0)
}

fn number(v: &Value) -> Option<f32> {
    let n = v.as_f64()? as f32;
    n.is_finite().then_some(n)
}

fn dimension(v: &Value) -> Option<Dimension> {
    if v.as_str() == Some("auto") {
        return Some(Dimension::auto());
    }
    number(v)
        .map(Dimension::length)
        .or_else(|| percent(v).map(Dimension::percent))
}

fn length_percentage(v: &Value) -> Option<LengthPercentage> {
    number(v)
        .map(|n| LengthPercentage::length(n.max(0.0)))
        .or_else(|| percent(v).map(LengthPercentage::percent))
}

fn length_percentage_auto(v: &Value) -> Option<LengthPercentageAuto> {
    if v.as_str() == Some("auto") {
        return Some(LengthPercentageAuto::auto());
    }
    number(v)
        .map(LengthPercentageAuto::length)
        .or_else(|| percent(v).map(LengthPercentageAuto::percent))
}

fn justify_content(s: &str) -> Option<JustifyContent> {
    Some(match s {
        "flex-start" => JustifyContent::FlexStart,
        "flex-end" => JustifyContent::FlexEnd,
        "center" => JustifyContent::Center,
        "space-between" => JustifyContent::SpaceBetween,
        "space-around" => JustifyContent::SpaceAround,
        "space-evenly" => JustifyContent::SpaceEvenly,
        _ => return None,
    })
}

fn align_items(s: &str) -> Option<AlignItems> {
    Some(match s {
        "flex-start" => AlignItems::FlexStart,
        "flex-end" => AlignItems::FlexEnd,
        "center" => AlignItems::Center,
        "stretch" => AlignItems::Stretch,
        "baseline" => AlignItems::Baseline,
        _ => return None,
    })
}

fn align_content(s: &str) -> Option<AlignContent> {
    Some(match s {
        "flex-start" => AlignContent::FlexStart,
        "flex-end" => AlignContent::FlexEnd,
        "center" => AlignContent::Center,
        "stretch" => AlignContent::Stretch,
        "space-between" => AlignContent::SpaceBetween,
        "space-around" => AlignContent::SpaceAround,
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/style.rs"]
mod tests;
