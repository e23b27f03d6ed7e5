//! Re-basing of shape lists onto a (0, 0) origin

use super::Shape;

/// Translate `shapes` so the smallest `x` and smallest `y` are both zero.
/// An empty list is left untouched.
pub fn normalize(shapes: &mut [Shape]) {
    if shapes.is_empty() {
        return;
    }
    let min_x = shapes.iter().map(|s| s.x).fold(f64::INFINITY, f64::min);
    let min_y = shapes.iter().map(|s| s.y).fold(f64::INFINITY, f64::min);
    for shape in shapes.iter_mut() {
        shape.x -= min_x;
        shape.y -= min_y;
    }
}
