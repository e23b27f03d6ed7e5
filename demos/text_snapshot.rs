//! Text snapshot example - renders a code listing to SVG and PNG

use textsnap::page::{Page, PageConfig};
use textsnap::{snapshot, Format, ResvgRasterizer, Snapshot, SnapshotOptions, Target};

const LISTING: &str = r#"
<style>
  .kw { color: #a626a4 }
  .str { color: #50a14f }
  .cm { color: #a0a1a7; font-style: italic }
</style>
<pre id="listing"><span class="cm">// greet everyone</span>
<span class="kw">fn</span> main() {
    println!(<span class="str">"hello, 100% of you"</span>);
}</pre>
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("textsnap - Text Snapshot Example\n");

    let page = Page::parse(LISTING, PageConfig::default());
    let rasterizer = ResvgRasterizer::new();

    for format in [Format::Svg, Format::Blob] {
        let options = SnapshotOptions {
            format,
            width: Some(640.0),
            padding: 16.0,
            ..Default::default()
        };
        let out = snapshot(&page, &rasterizer, Target::Selector("#listing"), &options).await?;

        match out {
            Snapshot::Svg(doc) => {
                println!("SVG ({} lines, {}x{}):", doc.elements().len(), doc.width(), doc.height());
                println!("{}", "-".repeat(60));
                println!("{}\n", doc);
                std::fs::write("listing.svg", doc.to_svg())?;
            }
            Snapshot::Blob(png) => {
                println!("PNG: {} bytes", png.len());
                std::fs::write("listing.png", png)?;
            }
            other => println!("unexpected {} output", other.format()),
        }
    }

    println!("Done!");
    Ok(())
}
