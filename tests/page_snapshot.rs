#![cfg(feature = "page")]

use textsnap::page::{Page, PageConfig};
use textsnap::{render_vector, Error, SnapshotOptions, Target};

fn svg_of(html: &str, selector: &str, opts: &SnapshotOptions) -> textsnap::projection::VectorDocument {
    let page = Page::parse(html, PageConfig::default());
    render_vector(&page, Target::Selector(selector), opts).expect("render")
}

#[test]
fn pre_block_keeps_one_element_per_source_line() {
    let doc = svg_of(
        "<pre id=\"code\">let a = 1;\nlet b = 2;</pre>",
        "#code",
        &SnapshotOptions::default(),
    );
    let lines: Vec<_> = doc.elements().iter().map(|e| e.text.trim_end()).collect();
    assert_eq!(lines, vec!["let a = 1;", "let b = 2;"]);

    let lh = 16.0 * 1.2;
    assert_eq!(doc.elements()[0].y, 0.0);
    assert!((doc.elements()[1].y - lh).abs() < 1e-9);
    // monospace is the only non-default property
    assert_eq!(doc.classes().len(), 1);
    assert!(doc.classes()[0].declarations.starts_with("font-family:monospace;"));
}

#[test]
fn prose_wraps_inside_a_narrow_viewport() {
    let page = Page::parse(
        "<p id=\"p\">the quick brown fox jumps over the lazy dog</p>",
        PageConfig {
            viewport_width: 160.0,
            ..Default::default()
        },
    );
    let doc = render_vector(&page, Target::Selector("#p"), &SnapshotOptions::default()).unwrap();

    assert!(doc.elements().len() > 2);
    let joined: String = doc.elements().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(joined, "the quick brown fox jumps over the lazy dog");
    assert!(doc.elements().windows(2).all(|w| w[0].y < w[1].y));
}

#[test]
fn styled_spans_get_their_own_classes() {
    let doc = svg_of(
        "<style>.kw { color: #c00; font-weight: bold }</style>\
         <div id=\"d\"><span class=\"kw\">fn</span> main</div>",
        "#d",
        &SnapshotOptions::default(),
    );
    assert_eq!(doc.elements().len(), 2);
    assert_eq!(doc.classes().len(), 2);
    assert_eq!(
        doc.classes()[0].declarations,
        "fill:rgb(204, 0, 0);font-weight:700;dominant-baseline:text-before-edge;"
    );
    assert_eq!(doc.classes()[1].declarations, "dominant-baseline:text-before-edge;");
    assert!(doc.elements()[1].x > doc.elements()[0].x);
}

#[test]
fn requested_width_scales_the_content() {
    let opts = SnapshotOptions {
        width: Some(400.0),
        padding: 10.0,
        ..Default::default()
    };
    let doc = svg_of("<div id=\"d\">hello</div>", "#d", &opts);
    // 5 glyphs of 9.6px
    let content_width = 48.0;
    assert_eq!(doc.width(), 400.0);
    assert!((doc.content_scalar() - 380.0 / content_width).abs() < 1e-9);
    assert!(!doc.to_svg().contains("&#160;"));
}

#[test]
fn hidden_subtrees_are_not_snapshotted() {
    let doc = svg_of(
        "<div id=\"d\">shown<span style=\"display:none\">hidden</span></div>",
        "#d",
        &SnapshotOptions::default(),
    );
    let texts: Vec<_> = doc.elements().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["shown"]);
}

#[test]
fn special_characters_are_escaped_in_markup() {
    let doc = svg_of(
        "<div id=\"d\">A &amp; B &lt; 5% #1</div>",
        "#d",
        &SnapshotOptions::default(),
    );
    assert_eq!(doc.elements()[0].text, "A & B < 5% #1");
    let svg = doc.to_svg();
    assert!(svg.contains("A&#160;&amp;&#160;B&#160;&lt;&#160;5%25&#160;%231"), "{}", svg);
}

#[test]
fn selector_problems_surface_as_errors() {
    let page = Page::parse("<p>x</p>", PageConfig::default());
    let opts = SnapshotOptions::default();
    assert!(matches!(
        render_vector(&page, Target::Selector("#nope"), &opts),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        render_vector(&page, Target::Selector("p:::"), &opts),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        render_vector(&page, Target::Selector("  "), &opts),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn whole_page_snapshot_starts_at_the_origin() {
    let page = Page::parse("<h1>Title</h1><p>body text</p>", PageConfig::default());
    let doc = render_vector(&page, Target::Node(page.root()), &SnapshotOptions::default()).unwrap();
    assert_eq!(doc.elements().len(), 2);
    let min_x = doc.elements().iter().map(|e| e.x).fold(f64::INFINITY, f64::min);
    let min_y = doc.elements().iter().map(|e| e.y).fold(f64::INFINITY, f64::min);
    assert_eq!((min_x, min_y), (0.0, 0.0));
    // the heading is bold and twice the size
    assert!(doc.classes()[0].declarations.contains("font-size:32px;"));
    assert!(doc.classes()[0].declarations.contains("font-weight:700;"));
}
