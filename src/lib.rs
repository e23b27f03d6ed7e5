//! textsnap
//!
//! Snapshots of rendered text as self-contained vector documents. A subtree of
//! a host document is walked, every visually distinct line of text is measured
//! and styled, and the result is projected into a scalable SVG that can
//! optionally be rasterized into pixels, a PNG data URL or PNG bytes.
//!
//! # Features
//!
//! - **Host-agnostic**: the pipeline only talks to the traits in [`host`], so
//!   it runs against a browser bridge, a scripted fake, or the bundled page host
//! - **page** (default): a pure-Rust HTML host built on `scraper`
//! - **raster** (default): a `resvg` rasterizer for the bitmap formats
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "page")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use textsnap::page::{Page, PageConfig};
//! use textsnap::{render_vector, SnapshotOptions, Target};
//!
//! let page = Page::parse("<p id=\"msg\">hello</p>", PageConfig::default());
//! let options = SnapshotOptions {
//!     width: Some(200.0),
//!     ..Default::default()
//! };
//! let doc = render_vector(&page, Target::Selector("#msg"), &options)?;
//! assert_eq!(doc.width(), 200.0);
//! println!("{}", doc);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "page"))]
//! # fn main() {}
//! ```

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub mod error;
pub use error::{Error, Result};

pub mod extract;
pub mod geometry;
pub mod host;
pub mod projection;
pub mod raster;

// Built-in HTML host (scraper + monospace flow layout)
#[cfg(feature = "page")]
pub mod page;

use extract::{collect_shapes, normalize};
use geometry::Rect;
use host::{DocumentContext, SnapshotHost, UrlLease};
use projection::{project, ProjectionOptions, VectorDocument};
use raster::{Bitmap, Rasterizer};

#[cfg(feature = "raster")]
pub use raster::ResvgRasterizer;

/// MIME type of serialized vector documents
pub const SVG_MIME: &str = "image/svg+xml";

/// Output format of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// The vector document itself
    Svg,
    /// Decoded RGBA pixels
    #[default]
    Canvas,
    /// An image description whose source is a PNG data URL
    Img,
    /// Raw PNG bytes
    Blob,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "svg" => Ok(Format::Svg),
            "canvas" => Ok(Format::Canvas),
            "img" => Ok(Format::Img),
            "blob" => Ok(Format::Blob),
            other => Err(Error::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Svg => "svg",
            Format::Canvas => "canvas",
            Format::Img => "img",
            Format::Blob => "blob",
        })
    }
}

/// Options for a snapshot
///
/// `width` and `height` are the requested output size before `scalar`; when
/// only one is given the other follows the content's aspect ratio.
///
/// # Examples
///
/// ```
/// let opts = textsnap::SnapshotOptions::default();
/// assert_eq!(opts.format, textsnap::Format::Canvas);
/// assert_eq!(opts.scalar, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotOptions {
    pub format: Format,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Padding around the content in output pixels
    pub padding: f64,
    /// Multiplier applied to the declared output size
    pub scalar: f64,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            format: Format::Canvas,
            width: None,
            height: None,
            padding: 0.0,
            scalar: 1.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    format: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    padding: Option<f64>,
    scalar: Option<f64>,
}

impl TryFrom<RawOptions> for SnapshotOptions {
    type Error = Error;

    fn try_from(raw: RawOptions) -> Result<Self> {
        let defaults = SnapshotOptions::default();
        let format = match raw.format.as_deref() {
            Some(name) => name.parse()?,
            None => defaults.format,
        };
        Ok(Self {
            format,
            width: raw.width,
            height: raw.height,
            padding: raw.padding.unwrap_or(defaults.padding),
            scalar: raw.scalar.unwrap_or(defaults.scalar),
        })
    }
}

impl SnapshotOptions {
    /// Parse options from a JSON object. Missing keys take their defaults.
    ///
    /// ```
    /// let opts = textsnap::SnapshotOptions::from_json(r#"{"format":"svg","width":320}"#).unwrap();
    /// assert_eq!(opts.format, textsnap::Format::Svg);
    /// assert_eq!(opts.width, Some(320.0));
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawOptions = serde_json::from_str(json)?;
        raw.try_into()
    }

    fn projection(&self) -> ProjectionOptions {
        ProjectionOptions {
            width: self.width,
            height: self.height,
            padding: self.padding,
            scalar: self.scalar,
        }
    }
}

/// What to snapshot: a node handle or a selector resolved against the host
/// document.
#[derive(Debug, Clone)]
pub enum Target<'a, N> {
    Node(N),
    Selector(&'a str),
}

/// An image description for the `img` format
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// `data:image/png;base64,...`
    pub src: String,
}

/// Terminal artifact of a snapshot
#[derive(Debug, Clone)]
pub enum Snapshot {
    Svg(VectorDocument),
    Canvas(Bitmap),
    Image(Image),
    Blob(Vec<u8>),
}

impl Snapshot {
    pub fn format(&self) -> Format {
        match self {
            Snapshot::Svg(_) => Format::Svg,
            Snapshot::Canvas(_) => Format::Canvas,
            Snapshot::Image(_) => Format::Img,
            Snapshot::Blob(_) => Format::Blob,
        }
    }
}

fn resolve_target<N>(context: &dyn DocumentContext<N>, target: Target<'_, N>) -> Result<N> {
    match target {
        Target::Node(node) => Ok(node),
        Target::Selector(selector) => {
            if selector.trim().is_empty() {
                return Err(Error::InvalidInput("empty selector".into()));
            }
            context
                .query(selector)?
                .ok_or_else(|| Error::NotFound(selector.to_string()))
        }
    }
}

/// Extract and project `target` into a vector document.
///
/// This is the synchronous half of [`snapshot`]; `options.format` is ignored.
pub fn render_vector<H: SnapshotHost>(
    host: &H,
    target: Target<'_, H::Node>,
    options: &SnapshotOptions,
) -> Result<VectorDocument> {
    let root = resolve_target(host.context(), target)?;

    let origin = host.measurement().bounding_rect(&root).unwrap_or_else(|e| {
        log::debug!("target has no bounding box ({}), using page origin", e);
        Rect::default()
    });

    let mut shapes = collect_shapes(host, &root, &origin);
    normalize(&mut shapes);
    log::debug!("collected {} text shapes", shapes.len());

    Ok(project(&shapes, &options.projection()))
}

/// Snapshot the rendered text of `target` in the requested format.
///
/// Bitmap formats serialize the document into a leased object URL, decode it
/// through `rasterizer`, and release the URL once the decode settles.
pub async fn snapshot<H, R>(
    host: &H,
    rasterizer: &R,
    target: Target<'_, H::Node>,
    options: &SnapshotOptions,
) -> Result<Snapshot>
where
    H: SnapshotHost,
    R: Rasterizer + ?Sized,
{
    let document = render_vector(host, target, options)?;
    if options.format == Format::Svg {
        return Ok(Snapshot::Svg(document));
    }

    let bitmap = if document.width() <= 0.0 || document.height() <= 0.0 {
        Bitmap::empty()
    } else {
        let markup = document.to_svg();
        let lease = UrlLease::acquire(host.context(), markup.as_bytes(), SVG_MIME)?;
        let result = raster::wait(rasterizer.load(lease.url())).await;
        drop(lease);
        result?
    };

    match options.format {
        Format::Svg | Format::Canvas => Ok(Snapshot::Canvas(bitmap)),
        Format::Img => {
            let src = if bitmap.is_empty() {
                "data:,".to_string()
            } else {
                use base64::Engine as _;
                let png = rasterizer.encode_png(&bitmap)?;
                format!(
                    "data:image/png;base64,{}",
                    base64::engine::general_purpose::STANDARD.encode(png)
                )
            };
            Ok(Snapshot::Image(Image {
                width: bitmap.width,
                height: bitmap.height,
                src,
            }))
        }
        Format::Blob => {
            if bitmap.is_empty() {
                return Ok(Snapshot::Blob(Vec::new()));
            }
            Ok(Snapshot::Blob(rasterizer.encode_png(&bitmap)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = SnapshotOptions::default();
        assert_eq!(opts.format, Format::Canvas);
        assert_eq!(opts.padding, 0.0);
        assert_eq!(opts.scalar, 1.0);
        assert!(opts.width.is_none() && opts.height.is_none());
    }

    #[test]
    fn test_format_names() {
        for name in ["svg", "canvas", "img", "blob"] {
            let f: Format = name.parse().unwrap();
            assert_eq!(f.to_string(), name);
        }
        assert!(matches!("png".parse::<Format>(), Err(Error::InvalidFormat(_))));
        assert!(matches!("SVG".parse::<Format>(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_options_from_json() {
        let opts = SnapshotOptions::from_json(r#"{"format":"blob","height":50,"padding":4}"#).unwrap();
        assert_eq!(opts.format, Format::Blob);
        assert_eq!(opts.height, Some(50.0));
        assert_eq!(opts.padding, 4.0);
        assert_eq!(opts.scalar, 1.0);

        assert!(matches!(
            SnapshotOptions::from_json(r#"{"format":"gif"}"#),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            SnapshotOptions::from_json(r#"{"colour":"red"}"#),
            Err(Error::Options(_))
        ));
        assert!(matches!(SnapshotOptions::from_json("{"), Err(Error::Options(_))));
    }
}
