#![cfg(all(feature = "page", feature = "raster"))]

use textsnap::page::{Page, PageConfig};
use textsnap::raster::Rasterizer;
use textsnap::{snapshot, Format, ResvgRasterizer, Snapshot, SnapshotOptions, Target};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn rasterizer() -> ResvgRasterizer {
    // no fonts: glyphs are skipped but the canvas size is still exact
    ResvgRasterizer::with_fonts(resvg::usvg::fontdb::Database::new())
}

fn sized(format: Format) -> SnapshotOptions {
    SnapshotOptions {
        format,
        width: Some(120.0),
        height: Some(40.0),
        scalar: 2.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn canvas_has_the_declared_size() {
    let page = Page::parse("<p id=\"p\">hello</p>", PageConfig::default());
    let out = snapshot(&page, &rasterizer(), Target::Selector("#p"), &sized(Format::Canvas))
        .await
        .expect("snapshot");

    match out {
        Snapshot::Canvas(bmp) => {
            assert_eq!((bmp.width, bmp.height), (240, 80));
            assert_eq!(bmp.pixels.len(), 240 * 80 * 4);
        }
        other => panic!("unexpected {}", other.format()),
    }
    assert_eq!(page.live_url_count(), 0);
    assert_eq!(page.released_url_count(), 1);
}

#[tokio::test]
async fn blob_is_png() {
    let page = Page::parse("<p id=\"p\">50% off #1 &amp; more</p>", PageConfig::default());
    let out = snapshot(&page, &rasterizer(), Target::Selector("#p"), &sized(Format::Blob))
        .await
        .expect("snapshot");

    match out {
        Snapshot::Blob(png) => assert!(png.starts_with(PNG_MAGIC)),
        other => panic!("unexpected {}", other.format()),
    }
    assert_eq!(page.live_url_count(), 0);
}

#[tokio::test]
async fn img_src_is_a_png_data_url() {
    let page = Page::parse("<p id=\"p\">hello</p>", PageConfig::default());
    let r = rasterizer();
    let out = snapshot(&page, &r, Target::Selector("#p"), &sized(Format::Img))
        .await
        .expect("snapshot");

    match out {
        Snapshot::Image(img) => {
            assert_eq!((img.width, img.height), (240, 80));
            assert!(img.src.starts_with("data:image/png;base64,iVBORw0KGgo"));
        }
        other => panic!("unexpected {}", other.format()),
    }
}

#[tokio::test]
async fn canvas_pixels_reencode_to_png() {
    let page = Page::parse("<p id=\"p\">hello</p>", PageConfig::default());
    let r = rasterizer();
    let out = snapshot(&page, &r, Target::Selector("#p"), &sized(Format::Canvas))
        .await
        .expect("snapshot");
    let Snapshot::Canvas(bmp) = out else {
        panic!("expected a canvas");
    };
    let png = r.encode_png(&bmp).expect("encode");
    assert!(png.starts_with(PNG_MAGIC));
}

/// Number of pixels with any coverage after rasterizing `selector`.
async fn inked_pixels(html: &str, selector: &str, r: &ResvgRasterizer) -> usize {
    let page = Page::parse(html, PageConfig::default());
    let out = snapshot(&page, r, Target::Selector(selector), &SnapshotOptions::default())
        .await
        .expect("snapshot");
    let Snapshot::Canvas(bmp) = out else {
        panic!("expected a canvas");
    };
    bmp.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
}

#[tokio::test]
async fn system_fonts_draw_generic_families() {
    let r = ResvgRasterizer::new();
    if r.font_count() == 0 {
        println!("No system fonts installed. Skipping.");
        return;
    }

    let serif = inked_pixels("<p id=\"p\">HELLO</p>", "#p", &r).await;
    let mono = inked_pixels("<pre id=\"p\">HELLO</pre>", "#p", &r).await;
    let sans = inked_pixels(
        "<p id=\"p\" style=\"font-family: sans-serif\">HELLO</p>",
        "#p",
        &r,
    )
    .await;
    assert!(serif > 0, "serif text drew nothing");
    assert!(mono > 0, "monospace text drew nothing");
    assert!(sans > 0, "sans-serif text drew nothing");
}
