//! Rasterization boundary.
//!
//! A [`Rasterizer`] turns a serialized vector document, addressed through an
//! [`ObjectUrl`], into pixels. Decoding completes asynchronously and resolves
//! exactly once, so the boundary is a single-shot `oneshot` receiver. The
//! bundled [`ResvgRasterizer`] renders on a worker thread.

use crate::host::ObjectUrl;
use crate::{Error, Result};
use base64::Engine as _;
use tokio::sync::oneshot;

/// Decoded pixels: RGBA8, premultiplied alpha, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA of the pixel at (x, y), if inside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let p = self.pixels.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Pending result of a single decode.
pub type RasterTask = oneshot::Receiver<Result<Bitmap>>;

pub trait Rasterizer {
    /// Start decoding the document behind `source`.
    fn load(&self, source: &ObjectUrl) -> RasterTask;

    /// Encode a bitmap produced by this rasterizer as PNG.
    fn encode_png(&self, bitmap: &Bitmap) -> Result<Vec<u8>>;
}

/// Wait for a decode to settle.
pub async fn wait(task: RasterTask) -> Result<Bitmap> {
    task.await
        .map_err(|e| Error::Rasterization(format!("decode canceled: {}", e)))?
}

/// Split a `data:` URL into its MIME type and decoded payload.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::Rasterization(format!("unsupported source url: {:.32}", url)))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Rasterization("malformed data url".into()))?;
    let mime = meta.split(';').next().unwrap_or_default().to_string();

    let bytes = if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Rasterization(format!("invalid base64 payload: {}", e)))?
    } else {
        percent_decode(payload)
    };
    Ok((mime, bytes))
}

/// Decode `%XX` escapes; malformed escapes are kept literally.
pub fn percent_decode(input: &str) -> Vec<u8> {
    fn hex(b: &u8) -> Option<u8> {
        (*b as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(hex),
                bytes.get(i + 2).and_then(hex),
            ) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

#[cfg(feature = "raster")]
pub use self::resvg_backend::ResvgRasterizer;

#[cfg(feature = "raster")]
mod resvg_backend {
    use super::{decode_data_url, Bitmap, RasterTask, Rasterizer};
    use crate::host::ObjectUrl;
    use crate::{Error, Result};
    use resvg::{tiny_skia, usvg};
    use std::sync::Arc;
    use tokio::sync::oneshot;

    const SERIF: &[&str] = &[
        "Times New Roman",
        "DejaVu Serif",
        "Liberation Serif",
        "Noto Serif",
        "FreeSerif",
    ];
    const SANS_SERIF: &[&str] = &[
        "Arial",
        "DejaVu Sans",
        "Liberation Sans",
        "Noto Sans",
        "FreeSans",
    ];
    const MONOSPACE: &[&str] = &[
        "Courier New",
        "DejaVu Sans Mono",
        "Liberation Mono",
        "Noto Sans Mono",
        "FreeMono",
    ];

    /// Renders SVG documents with `resvg` on a dedicated thread per decode.
    #[derive(Clone)]
    pub struct ResvgRasterizer {
        fontdb: Arc<usvg::fontdb::Database>,
        default_family: String,
    }

    impl ResvgRasterizer {
        /// Create a rasterizer with the system fonts loaded.
        pub fn new() -> Self {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            log::debug!("loaded {} font faces for rasterization", db.len());
            Self::with_fonts(db)
        }

        /// Use `db` as is, after pointing the generic families at installed faces.
        pub fn with_fonts(mut db: usvg::fontdb::Database) -> Self {
            let installed: Vec<(String, bool)> = db
                .faces()
                .flat_map(|face| {
                    face.families
                        .iter()
                        .map(move |(name, _)| (name.clone(), face.monospaced))
                })
                .collect();

            let serif = resolve_family(&installed, SERIF, false);
            if let Some(name) = &serif {
                db.set_serif_family(name.as_str());
            }
            if let Some(name) = resolve_family(&installed, SANS_SERIF, false) {
                db.set_sans_serif_family(name);
            }
            if let Some(name) = resolve_family(&installed, MONOSPACE, true) {
                db.set_monospace_family(name);
            }
            log::debug!("default font family: {:?}", serif);

            Self {
                fontdb: Arc::new(db),
                default_family: serif.unwrap_or_else(|| SERIF[0].to_string()),
            }
        }

        /// Number of font faces available to the renderer.
        pub fn font_count(&self) -> usize {
            self.fontdb.len()
        }
    }

    /// First preferred family that is installed, else any installed family
    /// (a monospaced one when `monospaced` is set).
    pub(super) fn resolve_family(
        installed: &[(String, bool)],
        preferred: &[&str],
        monospaced: bool,
    ) -> Option<String> {
        preferred
            .iter()
            .find(|want| installed.iter().any(|(name, _)| name.eq_ignore_ascii_case(want)))
            .map(|name| name.to_string())
            .or_else(|| {
                installed
                    .iter()
                    .find(|(_, mono)| *mono == monospaced)
                    .or_else(|| installed.first())
                    .map(|(name, _)| name.clone())
            })
    }

    impl Default for ResvgRasterizer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Rasterizer for ResvgRasterizer {
        fn load(&self, source: &ObjectUrl) -> RasterTask {
            let (tx, rx) = oneshot::channel();
            let url = source.as_str().to_string();
            let fontdb = self.fontdb.clone();
            let family = self.default_family.clone();

            std::thread::spawn(move || {
                let res = render(&url, fontdb, family);
                if let Err(e) = &res {
                    log::warn!("rasterization failed: {}", e);
                }
                // Receiver may have been dropped; nothing else to do then.
                let _ = tx.send(res);
            });

            rx
        }

        fn encode_png(&self, bitmap: &Bitmap) -> Result<Vec<u8>> {
            let size = tiny_skia::IntSize::from_wh(bitmap.width, bitmap.height)
                .ok_or_else(|| Error::Rasterization("cannot encode an empty bitmap".into()))?;
            let pixmap = tiny_skia::Pixmap::from_vec(bitmap.pixels.clone(), size)
                .ok_or_else(|| Error::Rasterization("pixel buffer does not match size".into()))?;
            pixmap
                .encode_png()
                .map_err(|e| Error::Rasterization(format!("PNG encoding failed: {}", e)))
        }
    }

    fn render(url: &str, fontdb: Arc<usvg::fontdb::Database>, family: String) -> Result<Bitmap> {
        let (mime, bytes) = decode_data_url(url)?;
        if mime != "image/svg+xml" {
            return Err(Error::Rasterization(format!("unsupported media type: {}", mime)));
        }

        let mut opt = usvg::Options::default();
        opt.fontdb = fontdb;
        opt.font_family = family;
        let tree = usvg::Tree::from_data(&bytes, &opt)
            .map_err(|e| Error::Rasterization(format!("invalid SVG: {}", e)))?;

        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| Error::Rasterization("zero-sized document".into()))?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        Ok(Bitmap {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels: pixmap.take(),
        })
    }
}
