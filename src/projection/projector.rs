//! Projection of normalized shapes into a vector document.
//!
//! Sizing follows four cases depending on which output dimensions the caller
//! requested. Content is always scaled uniformly; when both dimensions are
//! fixed the content is centered through the viewBox offset rather than by
//! changing the declared size.

use super::document::{StyleClass, TextElement, VectorDocument};
use crate::extract::{Shape, StyleDeclaration};
use crate::geometry::Rect;
use std::collections::HashMap;

/// Declaration appended to every style class so text is positioned by the
/// top edge of its line box.
pub const BASELINE_DECLARATION: &str = "dominant-baseline:text-before-edge;";

/// Sizing options for a projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOptions {
    /// Requested output width in pixels
    pub width: Option<f64>,
    /// Requested output height in pixels
    pub height: Option<f64>,
    /// Padding around the content in pixels
    pub padding: f64,
    /// Multiplier applied to the declared output size
    pub scalar: f64,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            padding: 0.0,
            scalar: 1.0,
        }
    }
}

/// Resolved output geometry for a given content size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Output width before the output scalar
    pub width: f64,
    /// Output height before the output scalar
    pub height: f64,
    /// Padding after clamping
    pub padding: f64,
    pub content_scalar: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Width and height spanned by `shapes`, or `None` for an empty list.
pub fn content_extents(shapes: &[Shape]) -> Option<(f64, f64)> {
    let first = shapes.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x + first.width;
    let mut max_y = first.y + first.height;
    for s in &shapes[1..] {
        min_x = min_x.min(s.x);
        min_y = min_y.min(s.y);
        max_x = max_x.max(s.x + s.width);
        max_y = max_y.max(s.y + s.height);
    }
    Some((max_x - min_x, max_y - min_y))
}

/// Resolve output size, content scale and centering offset.
///
/// Padding is clamped to half of each explicitly requested dimension only; a
/// dimension derived from the aspect ratio never clamps it.
pub fn resolve_fit(content_width: f64, content_height: f64, options: &ProjectionOptions) -> Fit {
    let mut padding = options.padding;
    if let Some(w) = options.width {
        padding = padding.min(w * 0.5);
    }
    if let Some(h) = options.height {
        padding = padding.min(h * 0.5);
    }

    let scale_to = |requested: f64, extent: f64| {
        (extent > 0.0).then(|| (requested - 2.0 * padding) / extent)
    };

    let (width, height, content_scalar) = match (options.width, options.height) {
        (None, None) => (
            content_width + 2.0 * padding,
            content_height + 2.0 * padding,
            1.0,
        ),
        (Some(w), None) => {
            let s = scale_to(w, content_width).unwrap_or(1.0);
            (w, content_height * s + 2.0 * padding, s)
        }
        (None, Some(h)) => {
            let s = scale_to(h, content_height).unwrap_or(1.0);
            (content_width * s + 2.0 * padding, h, s)
        }
        (Some(w), Some(h)) => {
            let s = match (scale_to(h, content_height), scale_to(w, content_width)) {
                (Some(sh), Some(sw)) => sh.min(sw),
                (Some(s), None) | (None, Some(s)) => s,
                (None, None) => 1.0,
            };
            (w, h, s)
        }
    };

    Fit {
        width,
        height,
        padding,
        content_scalar,
        offset_x: (content_width * content_scalar - width) * 0.5 + padding,
        offset_y: (content_height * content_scalar - height) * 0.5 + padding,
    }
}

/// Project `shapes` into a vector document sized according to `options`.
pub fn project(shapes: &[Shape], options: &ProjectionOptions) -> VectorDocument {
    let Some((content_width, content_height)) = content_extents(shapes) else {
        let width = options.width.unwrap_or(0.0);
        let height = options.height.unwrap_or(0.0);
        return VectorDocument::empty(
            width * options.scalar,
            height * options.scalar,
            Rect::new(0.0, 0.0, width, height),
        );
    };

    let fit = resolve_fit(content_width, content_height, options);
    log::debug!(
        "projecting {} shapes: content {}x{} -> {}x{} (content scalar {})",
        shapes.len(),
        content_width,
        content_height,
        fit.width,
        fit.height,
        fit.content_scalar
    );

    let mut classes: Vec<StyleClass> = Vec::new();
    let mut by_declarations: HashMap<String, usize> = HashMap::new();
    let mut elements = Vec::new();

    for shape in shapes.iter().filter(|s| !s.text.is_empty()) {
        let declarations = serialize_styles(&shape.styles);
        let class = *by_declarations
            .entry(declarations)
            .or_insert_with_key(|decls| {
                classes.push(StyleClass {
                    name: format!("s{}", classes.len()),
                    declarations: decls.clone(),
                });
                classes.len() - 1
            });
        elements.push(TextElement {
            x: shape.x,
            y: shape.y,
            class,
            text: shape.text.clone(),
        });
    }

    VectorDocument::new(
        fit.width * options.scalar,
        fit.height * options.scalar,
        Rect::new(fit.offset_x, fit.offset_y, fit.width, fit.height),
        fit.padding,
        fit.content_scalar,
        classes,
        elements,
    )
}

/// Serialize declarations for the vector document, mapping CSS names onto
/// their SVG equivalents.
pub fn serialize_styles(styles: &[StyleDeclaration]) -> String {
    let mut out = String::new();
    for decl in styles {
        let name = match decl.property {
            "color" => "fill",
            other => other,
        };
        out.push_str(name);
        out.push(':');
        out.push_str(&decl.value);
        out.push(';');
    }
    out.push_str(BASELINE_DECLARATION);
    out
}
