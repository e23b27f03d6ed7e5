//! The vector document produced by a projection.

use super::encoder::escape;
use crate::geometry::Rect;
use std::fmt::{self, Write as _};

/// A deduplicated set of style declarations shared by one or more text
/// elements, named `s0`, `s1`, ... in first-encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleClass {
    pub name: String,
    pub declarations: String,
}

/// One positioned line of text in content coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub x: f64,
    pub y: f64,
    /// Index into the document's style classes
    pub class: usize,
    /// Unescaped text content
    pub text: String,
}

/// A self-contained vector image of snapshotted text.
///
/// Documents are immutable; serialize with [`VectorDocument::to_svg`] or
/// through `Display`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    width: f64,
    height: f64,
    view_box: Rect,
    padding: f64,
    content_scalar: f64,
    classes: Vec<StyleClass>,
    elements: Vec<TextElement>,
}

impl VectorDocument {
    pub(crate) fn new(
        width: f64,
        height: f64,
        view_box: Rect,
        padding: f64,
        content_scalar: f64,
        classes: Vec<StyleClass>,
        elements: Vec<TextElement>,
    ) -> Self {
        Self {
            width,
            height,
            view_box,
            padding,
            content_scalar,
            classes,
            elements,
        }
    }

    /// A document with nothing in it, `width` x `height` declared pixels.
    pub(crate) fn empty(width: f64, height: f64, view_box: Rect) -> Self {
        Self::new(width, height, view_box, 0.0, 1.0, Vec::new(), Vec::new())
    }

    /// Declared width in pixels (output scalar applied)
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Declared height in pixels (output scalar applied)
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn view_box(&self) -> Rect {
        self.view_box
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Uniform scale applied to the content to fit the requested box
    pub fn content_scalar(&self) -> f64 {
        self.content_scalar
    }

    pub fn classes(&self) -> &[StyleClass] {
        &self.classes
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize as an SVG document.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VectorDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vb = &self.view_box;
        write!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
            num(self.width),
            num(self.height),
            num(vb.x),
            num(vb.y),
            num(vb.width),
            num(vb.height)
        )?;

        if !self.classes.is_empty() {
            f.write_str("<style>")?;
            for class in &self.classes {
                write!(f, ".{}{{{}}}", class.name, escape_css(&class.declarations))?;
            }
            f.write_str("</style>")?;
        }

        if !self.elements.is_empty() {
            write!(
                f,
                r#"<g transform="translate({} {}) scale({})">"#,
                num(self.padding),
                num(self.padding),
                num(self.content_scalar)
            )?;
            for el in &self.elements {
                let class = self
                    .classes
                    .get(el.class)
                    .map(|c| c.name.as_str())
                    .unwrap_or_default();
                write!(
                    f,
                    r#"<text x="{}" y="{}" class="{}">{}</text>"#,
                    num(el.x),
                    num(el.y),
                    class,
                    escape(&el.text)
                )?;
            }
            f.write_str("</g>")?;
        }

        f.write_str("</svg>")
    }
}

/// Compact number formatting: at most three decimals, no negative zero.
fn num(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    let mut out = String::new();
    if r == 0.0 || !r.is_finite() {
        out.push('0');
    } else {
        let _ = write!(out, "{}", r);
    }
    out
}

// Style values land inside a <style> element.
fn escape_css(decls: &str) -> String {
    decls
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
