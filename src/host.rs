//! Host capabilities the snapshot pipeline depends on.
//!
//! The pipeline never reaches for an ambient document. Tree structure, computed
//! styles, range geometry and transient URL allocation are all supplied by the
//! caller through the traits below, so the same extraction code runs against the
//! built-in [`crate::page::Page`] host or a scripted fake in tests.

use crate::geometry::Rect;
use crate::Result;

/// Coarse classification of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Other,
}

/// A handle to a node in the host tree.
pub trait TreeNode: Clone {
    fn kind(&self) -> NodeKind;

    /// Child nodes in document order.
    fn children(&self) -> Vec<Self>;

    /// Character content of a text node; `None` for every other kind.
    fn text(&self) -> Option<String>;
}

/// Geometric measurement of laid-out text.
///
/// Offsets are in characters (Unicode scalar values) of the run's text.
pub trait MeasurementProvider<N> {
    /// Disjoint rectangles occupied by characters `start..end` of `run`, in
    /// reading order. A range spanning N visual lines yields N rectangles.
    fn client_rects(&self, run: &N, start: usize, end: usize) -> Result<Vec<Rect>>;

    /// Full bounding box of a node.
    fn bounding_rect(&self, node: &N) -> Result<Rect>;
}

/// Resolved (computed) style values.
pub trait StyleLookup<N> {
    /// Value of `property` for the element owning `node`. Text nodes resolve
    /// through their parent element.
    fn resolved_value(&self, node: &N, property: &str) -> String;
}

/// A transient, addressable handle to serialized bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document-level services: selector resolution and URL allocation.
pub trait DocumentContext<N> {
    /// Resolve a selector against the host document. `Ok(None)` when nothing
    /// matches; `Err(Error::InvalidInput)` when the selector cannot be parsed.
    fn query(&self, selector: &str) -> Result<Option<N>>;

    /// Allocate a transient URL addressing `bytes`.
    fn allocate_url(&self, bytes: &[u8], mime: &str) -> Result<ObjectUrl>;

    /// Release a URL previously returned by `allocate_url`.
    fn release_url(&self, url: ObjectUrl);
}

/// Composite capability bundle handed to the snapshot pipeline.
pub trait SnapshotHost {
    type Node: TreeNode;

    fn measurement(&self) -> &dyn MeasurementProvider<Self::Node>;
    fn styles(&self) -> &dyn StyleLookup<Self::Node>;
    fn context(&self) -> &dyn DocumentContext<Self::Node>;
}

/// Releases a leased URL exactly once, when dropped.
///
/// Holding the lease across the rasterizer await point keeps the URL alive for
/// the decode; dropping it immediately after the result arrives (or when the
/// awaiting future is abandoned) returns it to the context.
pub struct UrlLease<'a, N> {
    context: &'a dyn DocumentContext<N>,
    url: ObjectUrl,
}

impl<'a, N> UrlLease<'a, N> {
    pub fn acquire(context: &'a dyn DocumentContext<N>, bytes: &[u8], mime: &str) -> Result<Self> {
        let url = context.allocate_url(bytes, mime)?;
        log::debug!("leased object url ({} bytes, {})", bytes.len(), mime);
        Ok(Self { context, url })
    }

    pub fn url(&self) -> &ObjectUrl {
        &self.url
    }
}

impl<N> Drop for UrlLease<'_, N> {
    fn drop(&mut self) {
        let url = std::mem::replace(&mut self.url, ObjectUrl(String::new()));
        log::debug!("releasing object url");
        self.context.release_url(url);
    }
}
