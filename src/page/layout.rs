//! Block and inline flow layout for the built-in page host.
//!
//! Glyph advances use a monospace model (`font_size * advance_factor`), which
//! is enough to reproduce wrapping, whitespace handling and line boxes
//! deterministically.

use super::style::{ComputedStyle, Display};
use super::{DomNode, PageConfig};
use crate::geometry::Rect;
use crate::host::NodeKind;
use std::collections::HashMap;

/// Placement of one character of a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharBox {
    /// Index into `Layout::lines`. May equal `lines.len()` for collapsed
    /// whitespace waiting for a line that was never opened.
    pub line: usize,
    pub x: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBox {
    pub top: f64,
    pub height: f64,
}

/// Result of laying out a page.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub lines: Vec<LineBox>,
    /// Character boxes per text node index
    pub runs: HashMap<usize, Vec<CharBox>>,
    /// Border boxes per block element index
    pub blocks: HashMap<usize, Rect>,
}

impl Layout {
    /// Disjoint per-line rectangles covering characters `start..end` of a run.
    pub fn range_rects(&self, run: &[CharBox], start: usize, end: usize) -> Vec<Rect> {
        let end = end.min(run.len());
        let mut rects: Vec<(usize, f64, f64)> = Vec::new();
        for b in run.iter().take(end).skip(start) {
            if b.line >= self.lines.len() {
                continue;
            }
            match rects.last_mut() {
                Some((line, x0, x1)) if *line == b.line => {
                    *x0 = x0.min(b.x);
                    *x1 = x1.max(b.x + b.width);
                }
                _ => rects.push((b.line, b.x, b.x + b.width)),
            }
        }
        rects
            .into_iter()
            .map(|(line, x0, x1)| {
                let lb = &self.lines[line];
                Rect::new(x0, lb.top, x1 - x0, lb.height)
            })
            .collect()
    }
}

/// Lay out every node of the arena. `styles` holds the computed style of
/// each element index.
pub fn layout_document(
    nodes: &[DomNode],
    styles: &[Option<ComputedStyle>],
    config: &PageConfig,
) -> Layout {
    let mut flow = Flow {
        config,
        layout: Layout::default(),
        line: None,
        cursor_x: 0.0,
        cursor_y: 0.0,
        left: 0.0,
        pending_margin: 0.0,
        collapse_next_space: true,
    };
    if !nodes.is_empty() {
        flow.visit(nodes, styles, 0, None);
    }
    flow.close_line();
    flow.layout
}

struct Flow<'c> {
    config: &'c PageConfig,
    layout: Layout,
    /// Open line, if any
    line: Option<usize>,
    cursor_x: f64,
    /// Top of the next line to open
    cursor_y: f64,
    /// Left edge of the current block's content box
    left: f64,
    pending_margin: f64,
    collapse_next_space: bool,
}

impl Flow<'_> {
    fn visit(
        &mut self,
        nodes: &[DomNode],
        styles: &[Option<ComputedStyle>],
        index: usize,
        inherited: Option<&ComputedStyle>,
    ) {
        let node = &nodes[index];
        match node.kind {
            NodeKind::Text => {
                let style = inherited
                    .cloned()
                    .unwrap_or_else(|| ComputedStyle::initial(self.config));
                let text = node.text.as_deref().unwrap_or_default();
                let boxes = self.place_text(text, &style);
                self.layout.runs.insert(index, boxes);
            }
            NodeKind::Element => {
                let Some(style) = styles[index].as_ref() else {
                    return;
                };
                match style.display {
                    Display::None => {}
                    Display::Inline => {
                        if node.tag.as_deref() == Some("br") {
                            self.line_break(style);
                            return;
                        }
                        for &child in &node.children {
                            self.visit(nodes, styles, child, Some(style));
                        }
                    }
                    Display::Block => self.visit_block(nodes, styles, index, style),
                }
            }
            NodeKind::Other => {
                for &child in &node.children {
                    self.visit(nodes, styles, child, inherited);
                }
            }
        }
    }

    fn visit_block(
        &mut self,
        nodes: &[DomNode],
        styles: &[Option<ComputedStyle>],
        index: usize,
        style: &ComputedStyle,
    ) {
        self.close_line();
        self.pending_margin = self.pending_margin.max(style.margin_top);
        let outer_left = self.left;
        self.left += style.indent;
        let first_line = self.layout.lines.len();
        self.collapse_next_space = true;

        for &child in &nodes[index].children {
            self.visit(nodes, styles, child, Some(style));
        }

        self.close_line();
        let lines = &self.layout.lines[first_line..];
        let (top, bottom) = match (lines.first(), lines.last()) {
            (Some(first), Some(last)) => (first.top, last.top + last.height),
            _ => (self.cursor_y, self.cursor_y),
        };
        self.layout.blocks.insert(
            index,
            Rect::new(
                self.left,
                top,
                (self.config.viewport_width - self.left).max(0.0),
                bottom - top,
            ),
        );
        self.left = outer_left;
        self.pending_margin = self.pending_margin.max(style.margin_bottom);
        self.collapse_next_space = true;
    }

    fn open_line(&mut self, height: f64) -> usize {
        match self.line {
            Some(idx) => {
                let lb = &mut self.layout.lines[idx];
                lb.height = lb.height.max(height);
                idx
            }
            None => {
                self.cursor_y += self.pending_margin;
                self.pending_margin = 0.0;
                let idx = self.layout.lines.len();
                self.layout.lines.push(LineBox {
                    top: self.cursor_y,
                    height,
                });
                self.line = Some(idx);
                self.cursor_x = self.left;
                idx
            }
        }
    }

    fn close_line(&mut self) {
        if let Some(idx) = self.line.take() {
            let lb = self.layout.lines[idx];
            self.cursor_y = lb.top + lb.height;
            self.collapse_next_space = true;
        }
    }

    fn line_break(&mut self, style: &ComputedStyle) {
        self.open_line(style.font_size * self.config.line_height);
        self.close_line();
    }

    fn place_text(&mut self, text: &str, style: &ComputedStyle) -> Vec<CharBox> {
        let advance = style.font_size * self.config.advance_factor;
        let line_height = style.font_size * self.config.line_height;
        let ws = style.white_space;
        let right = self.config.viewport_width;
        let chars: Vec<char> = text.chars().collect();
        let mut boxes = Vec::with_capacity(chars.len());

        for (i, &ch) in chars.iter().enumerate() {
            if ch == '\n' && ws.preserves_newlines() {
                let line = self.open_line(line_height);
                boxes.push(CharBox {
                    line,
                    x: self.cursor_x,
                    width: 0.0,
                });
                self.close_line();
                continue;
            }

            if is_space(ch) {
                if ws.collapses_spaces() && self.collapse_next_space {
                    // collapsed away; sits at the current (or next) line start
                    let (line, x) = match self.line {
                        Some(idx) => (idx, self.cursor_x),
                        None => (self.layout.lines.len(), self.left),
                    };
                    boxes.push(CharBox { line, x, width: 0.0 });
                    continue;
                }
                let line = self.open_line(line_height);
                let width = if ch == '\t' && !ws.collapses_spaces() {
                    let stop = advance * self.config.tab_size as f64;
                    let col = ((self.cursor_x - self.left) / stop).floor() + 1.0;
                    self.left + col * stop - self.cursor_x
                } else {
                    advance
                };
                boxes.push(CharBox {
                    line,
                    x: self.cursor_x,
                    width,
                });
                self.cursor_x += width;
                self.collapse_next_space = ws.collapses_spaces();
                continue;
            }

            // A word may only move to a new line at a break opportunity.
            let word_start = self.collapse_next_space || (i > 0 && is_space(chars[i - 1]));
            if word_start && ws.wraps() && self.line.is_some() && self.cursor_x > self.left {
                let word_len = chars[i..].iter().take_while(|c| !is_space(**c)).count();
                if self.cursor_x + word_len as f64 * advance > right {
                    self.close_line();
                }
            }

            let line = self.open_line(line_height);
            boxes.push(CharBox {
                line,
                x: self.cursor_x,
                width: advance,
            });
            self.cursor_x += advance;
            self.collapse_next_space = false;
        }

        boxes
    }
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0c')
}
