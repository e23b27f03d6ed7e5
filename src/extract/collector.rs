//! Tree walk collecting one shape per rendered line

use super::line_prober::probe_lines;
use super::style_filter::{filter_styles, StyleDeclaration, TRACKED_PROPERTIES};
use super::Shape;
use crate::geometry::Rect;
use crate::host::{NodeKind, SnapshotHost, TreeNode};

/// Collect the shapes of `root` and all of its descendants, in document order,
/// positioned relative to `origin`.
pub fn collect_shapes<H: SnapshotHost>(host: &H, root: &H::Node, origin: &Rect) -> Vec<Shape> {
    let mut shapes = Vec::new();
    visit(host, root, origin, &mut shapes);
    shapes
}

fn visit<H: SnapshotHost>(host: &H, node: &H::Node, origin: &Rect, out: &mut Vec<Shape>) {
    if node.kind() == NodeKind::Text {
        if let Some(text) = node.text() {
            let lines = probe_lines(node, &text, host.measurement());
            if !lines.is_empty() {
                let lookup = host.styles();
                let styles =
                    filter_styles(|p| lookup.resolved_value(node, p), &TRACKED_PROPERTIES);
                out.extend(
                    lines
                        .into_iter()
                        .map(|line| to_shape(&line.rect, &styles, line.text, origin)),
                );
            }
        }
    }

    for child in node.children() {
        visit(host, &child, origin, out);
    }
}

/// Build a shape for one line, re-based on `origin`.
pub fn to_shape(rect: &Rect, styles: &[StyleDeclaration], text: String, origin: &Rect) -> Shape {
    Shape {
        x: rect.x - origin.x,
        y: rect.y - origin.y,
        width: rect.width.max(0.0),
        height: rect.height.max(0.0),
        text,
        styles: styles.to_vec(),
    }
}
