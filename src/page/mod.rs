//! Built-in HTML host.
//!
//! `Page` parses a document with `scraper`, resolves a small cascade, and lays
//! text out with a deterministic monospace flow model. It implements every
//! host capability the snapshot pipeline needs, so HTML can be snapshotted
//! without a browser.
//!
//! ```
//! use textsnap::page::{Page, PageConfig};
//! use textsnap::{render_vector, SnapshotOptions, Target};
//!
//! let page = Page::parse("<pre id=\"code\">fn main() {}</pre>", PageConfig::default());
//! let doc = render_vector(&page, Target::Selector("#code"), &SnapshotOptions::default()).unwrap();
//! assert_eq!(doc.elements().len(), 1);
//! ```

pub mod layout;
pub mod style;

use crate::geometry::Rect;
use crate::host::{
    DocumentContext, MeasurementProvider, NodeKind, ObjectUrl, SnapshotHost, StyleLookup, TreeNode,
};
use crate::{Error, Result};
use layout::Layout;
use scraper::{Html, Selector};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use style::{parse_declarations, parse_stylesheet, ComputedStyle};

/// Configuration for the built-in page host
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    /// Width available to the root block, in pixels
    pub viewport_width: f64,
    /// Root font size in pixels
    pub default_font_size: f64,
    /// Root font family
    pub default_font_family: String,
    /// Line box height as a multiple of the font size
    pub line_height: f64,
    /// Glyph advance as a multiple of the font size
    pub advance_factor: f64,
    /// Tab stop interval in columns
    pub tab_size: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            default_font_size: 16.0,
            default_font_family: "serif".to_string(),
            line_height: 1.2,
            advance_factor: 0.6,
            tab_size: 8,
        }
    }
}

/// One node of the flattened document tree.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub kind: NodeKind,
    /// Local name for elements
    pub tag: Option<String>,
    /// Content for text nodes
    pub text: Option<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// A handle to a node of a [`Page`].
#[derive(Debug, Clone)]
pub struct PageNode {
    nodes: Rc<Vec<DomNode>>,
    index: usize,
}

impl PageNode {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tag(&self) -> Option<&str> {
        self.nodes[self.index].tag.as_deref()
    }
}

impl PartialEq for PageNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.nodes, &other.nodes) && self.index == other.index
    }
}

impl TreeNode for PageNode {
    fn kind(&self) -> NodeKind {
        self.nodes[self.index].kind
    }

    fn children(&self) -> Vec<Self> {
        self.nodes[self.index]
            .children
            .iter()
            .map(|&index| PageNode {
                nodes: self.nodes.clone(),
                index,
            })
            .collect()
    }

    fn text(&self) -> Option<String> {
        self.nodes[self.index].text.clone()
    }
}

/// A parsed, styled and laid-out HTML document.
pub struct Page {
    html: Html,
    nodes: Rc<Vec<DomNode>>,
    styles: Vec<Option<ComputedStyle>>,
    layout: Layout,
    config: PageConfig,
    default_style: ComputedStyle,
    live_urls: RefCell<Vec<String>>,
    released: Cell<usize>,
}

impl Page {
    /// Parse, style and lay out `source`.
    pub fn parse(source: &str, config: PageConfig) -> Self {
        let html = Html::parse_document(source);

        let mut ids = HashMap::new();
        let mut nodes: Vec<DomNode> = Vec::new();
        for node in html.tree.root().descendants() {
            let index = nodes.len();
            let parent = node.parent().and_then(|p| ids.get(&p.id()).copied());
            ids.insert(node.id(), index);

            let (kind, tag, text) = match node.value() {
                scraper::Node::Element(el) => {
                    (NodeKind::Element, Some(el.name().to_string()), None)
                }
                scraper::Node::Text(t) => (NodeKind::Text, None, Some(String::from(&**t))),
                _ => (NodeKind::Other, None, None),
            };
            nodes.push(DomNode {
                kind,
                tag,
                text,
                parent,
                children: Vec::new(),
            });
            if let Some(p) = parent {
                nodes[p].children.push(index);
            }
        }

        // Stylesheet rules matched per element, in source order
        let mut matched: Vec<Vec<(String, String)>> = vec![Vec::new(); nodes.len()];
        let style_sel = Selector::parse("style").ok();
        let sheets: Vec<String> = style_sel
            .iter()
            .flat_map(|sel| html.select(sel))
            .map(|el| el.text().collect::<String>())
            .collect();
        for rule in sheets.iter().flat_map(|css| parse_stylesheet(css)) {
            let Ok(selector) = Selector::parse(&rule.selector) else {
                log::debug!("ignoring unsupported selector {:?}", rule.selector);
                continue;
            };
            for el in html.select(&selector) {
                if let Some(&index) = ids.get(&el.id()) {
                    matched[index].extend(rule.declarations.iter().cloned());
                }
            }
        }

        let inline: Vec<Vec<(String, String)>> = html
            .tree
            .root()
            .descendants()
            .map(|n| match n.value() {
                scraper::Node::Element(el) => el
                    .attr("style")
                    .map(parse_declarations)
                    .unwrap_or_default(),
                _ => Vec::new(),
            })
            .collect();

        let default_style = ComputedStyle::initial(&config);
        let mut styles: Vec<Option<ComputedStyle>> = vec![None; nodes.len()];
        for index in 0..nodes.len() {
            let Some(tag) = nodes[index].tag.as_deref() else {
                continue;
            };
            let parent = nodes[index]
                .parent
                .and_then(|p| styles[p].clone())
                .unwrap_or_else(|| default_style.clone());
            let mut style = parent.inherit();
            style.apply_tag_defaults(tag, &parent);
            for (property, value) in matched[index].iter().chain(inline[index].iter()) {
                style.apply_declaration(property, value, &parent);
            }
            styles[index] = Some(style);
        }

        let layout = layout::layout_document(&nodes, &styles, &config);
        log::debug!(
            "laid out {} nodes into {} lines",
            nodes.len(),
            layout.lines.len()
        );

        Self {
            html,
            nodes: Rc::new(nodes),
            styles,
            layout,
            config,
            default_style,
            live_urls: RefCell::new(Vec::new()),
            released: Cell::new(0),
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// The document node.
    pub fn root(&self) -> PageNode {
        self.handle(0)
    }

    /// Node at `index` in document order, if there is one.
    pub fn node(&self, index: usize) -> Option<PageNode> {
        (index < self.nodes.len()).then(|| self.handle(index))
    }

    fn handle(&self, index: usize) -> PageNode {
        PageNode {
            nodes: self.nodes.clone(),
            index,
        }
    }

    /// Computed style of the element owning `index` (itself for elements,
    /// the nearest element ancestor otherwise).
    pub fn computed_style(&self, index: usize) -> &ComputedStyle {
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            if let Some(style) = self.styles.get(i).and_then(Option::as_ref) {
                return style;
            }
            cursor = self.nodes.get(i).and_then(|n| n.parent);
        }
        &self.default_style
    }

    /// Number of object URLs allocated and not yet released.
    pub fn live_url_count(&self) -> usize {
        self.live_urls.borrow().len()
    }

    /// Number of object URLs released so far.
    pub fn released_url_count(&self) -> usize {
        self.released.get()
    }

    fn text_rects(&self, index: usize) -> Option<Vec<Rect>> {
        let run = self.layout.runs.get(&index)?;
        Some(self.layout.range_rects(run, 0, run.len()))
    }

    fn union_descendants(&self, index: usize) -> Option<Rect> {
        if let Some(rect) = self.layout.blocks.get(&index) {
            return Some(*rect);
        }
        let own = self
            .text_rects(index)
            .unwrap_or_default()
            .into_iter()
            .reduce(|a, b| a.union(&b));
        self.nodes[index]
            .children
            .iter()
            .filter_map(|&c| self.union_descendants(c))
            .fold(own, |acc, r| Some(acc.map_or(r, |a| a.union(&r))))
    }
}

impl MeasurementProvider<PageNode> for Page {
    fn client_rects(&self, run: &PageNode, start: usize, end: usize) -> Result<Vec<Rect>> {
        let boxes = self.layout.runs.get(&run.index).ok_or_else(|| {
            Error::MeasurementUnavailable(format!("text node {} is not rendered", run.index))
        })?;
        Ok(self.layout.range_rects(boxes, start, end))
    }

    fn bounding_rect(&self, node: &PageNode) -> Result<Rect> {
        self.union_descendants(node.index).ok_or_else(|| {
            Error::MeasurementUnavailable(format!("node {} has no layout box", node.index))
        })
    }
}

impl StyleLookup<PageNode> for Page {
    fn resolved_value(&self, node: &PageNode, property: &str) -> String {
        self.computed_style(node.index).resolved_value(property)
    }
}

impl DocumentContext<PageNode> for Page {
    fn query(&self, selector: &str) -> Result<Option<PageNode>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| Error::InvalidInput(format!("invalid selector {:?}: {:?}", selector, e)))?;
        let Some(el) = self.html.select(&parsed).next() else {
            return Ok(None);
        };
        let target = el.id();
        Ok(self
            .html
            .tree
            .root()
            .descendants()
            .position(|n| n.id() == target)
            .map(|index| self.handle(index)))
    }

    fn allocate_url(&self, bytes: &[u8], mime: &str) -> Result<ObjectUrl> {
        let payload = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidInput(format!("document is not UTF-8: {}", e)))?;
        let url = format!("data:{};charset=utf-8,{}", mime, payload);
        self.live_urls.borrow_mut().push(url.clone());
        Ok(ObjectUrl::new(url))
    }

    fn release_url(&self, url: ObjectUrl) {
        let mut live = self.live_urls.borrow_mut();
        match live.iter().position(|u| u == url.as_str()) {
            Some(i) => {
                live.swap_remove(i);
                self.released.set(self.released.get() + 1);
            }
            None => log::warn!("release of unknown object url"),
        }
    }
}

impl SnapshotHost for Page {
    type Node = PageNode;

    fn measurement(&self) -> &dyn MeasurementProvider<PageNode> {
        self
    }

    fn styles(&self) -> &dyn StyleLookup<PageNode> {
        self
    }

    fn context(&self) -> &dyn DocumentContext<PageNode> {
        self
    }
}
