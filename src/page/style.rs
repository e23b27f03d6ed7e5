//! Computed styles for the built-in page host.
//!
//! Cascade order is: inherited values, user-agent tag defaults, `<style>`
//! rules in source order, then the element's inline `style` attribute.
//! Selector specificity is not considered.

use super::PageConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    /// Serialize the way browsers report computed colors.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn parse(value: &str) -> Option<Color> {
        let v = value.trim().to_ascii_lowercase();
        if let Some(hex) = v.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = v
            .strip_prefix("rgba(")
            .or_else(|| v.strip_prefix("rgb("))
            .and_then(|s| s.strip_suffix(')'))
        {
            let parts: Vec<&str> = args
                .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() < 3 {
                return None;
            }
            let channel = |s: &str| -> Option<u8> {
                if let Some(pct) = s.strip_suffix('%') {
                    let p: f64 = pct.parse().ok()?;
                    Some((p.clamp(0.0, 100.0) * 2.55).round() as u8)
                } else {
                    let n: f64 = s.parse().ok()?;
                    Some(n.clamp(0.0, 255.0).round() as u8)
                }
            };
            let a = match parts.get(3) {
                Some(s) => match s.strip_suffix('%') {
                    Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                    None => s.parse::<f64>().ok()?,
                },
                None => 1.0,
            };
            return Some(Color {
                r: channel(parts[0])?,
                g: channel(parts[1])?,
                b: channel(parts[2])?,
                a: a.clamp(0.0, 1.0),
            });
        }
        named_color(&v)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        4 => Some(Color {
            a: f64::from(digit(3)? * 17) / 255.0,
            ..Color::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)
        }),
        6 => Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(Color {
            a: f64::from(pair(6)?) / 255.0,
            ..Color::rgb(pair(0)?, pair(2)?, pair(4)?)
        }),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let c = match name {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => Color::rgb(0, 0, 0),
        "white" => Color::rgb(255, 255, 255),
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "navy" => Color::rgb(0, 0, 128),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
        "aqua" | "cyan" => Color::rgb(0, 255, 255),
        "teal" => Color::rgb(0, 128, 128),
        "olive" => Color::rgb(128, 128, 0),
        "maroon" => Color::rgb(128, 0, 0),
        "silver" => Color::rgb(192, 192, 192),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
        "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
        _ => return None,
    };
    Some(c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    fn parse(v: &str) -> Option<Self> {
        Some(match v {
            "normal" => WhiteSpace::Normal,
            "nowrap" => WhiteSpace::NoWrap,
            "pre" => WhiteSpace::Pre,
            "pre-wrap" | "break-spaces" => WhiteSpace::PreWrap,
            "pre-line" => WhiteSpace::PreLine,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WhiteSpace::Normal => "normal",
            WhiteSpace::NoWrap => "nowrap",
            WhiteSpace::Pre => "pre",
            WhiteSpace::PreWrap => "pre-wrap",
            WhiteSpace::PreLine => "pre-line",
        }
    }

    /// Runs of spaces and tabs collapse to one space
    pub fn collapses_spaces(&self) -> bool {
        matches!(
            self,
            WhiteSpace::Normal | WhiteSpace::NoWrap | WhiteSpace::PreLine
        )
    }

    /// Newlines force a line break
    pub fn preserves_newlines(&self) -> bool {
        matches!(
            self,
            WhiteSpace::Pre | WhiteSpace::PreWrap | WhiteSpace::PreLine
        )
    }

    /// Lines soft-wrap at the available width
    pub fn wraps(&self) -> bool {
        matches!(
            self,
            WhiteSpace::Normal | WhiteSpace::PreWrap | WhiteSpace::PreLine
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    None,
}

impl Display {
    fn parse(v: &str) -> Self {
        match v {
            "none" => Display::None,
            "inline" | "inline-block" | "inline-flex" | "contents" => Display::Inline,
            _ => Display::Block,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Display::Block => "block",
            Display::Inline => "inline",
            Display::None => "none",
        }
    }
}

/// Resolved style of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub color: Color,
    pub background_color: Color,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: u16,
    pub font_style: String,
    pub font_variant: String,
    pub white_space: WhiteSpace,
    pub display: Display,
    pub margin_top: f64,
    pub margin_bottom: f64,
    /// Horizontal offset of the content box from the parent's content box
    pub indent: f64,
}

impl ComputedStyle {
    /// Style of the root element before any rule applies.
    pub fn initial(config: &PageConfig) -> Self {
        Self {
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            font_size: config.default_font_size,
            font_family: config.default_font_family.clone(),
            font_weight: 400,
            font_style: "normal".into(),
            font_variant: "normal".into(),
            white_space: WhiteSpace::Normal,
            display: Display::Inline,
            margin_top: 0.0,
            margin_bottom: 0.0,
            indent: 0.0,
        }
    }

    /// Start a child's style: inherited properties carry over, the rest reset.
    pub fn inherit(&self) -> Self {
        Self {
            background_color: Color::TRANSPARENT,
            display: Display::Inline,
            margin_top: 0.0,
            margin_bottom: 0.0,
            indent: 0.0,
            ..self.clone()
        }
    }

    /// Resolved value of a CSS property as a string; empty when untracked.
    pub fn resolved_value(&self, property: &str) -> String {
        match property {
            "color" => self.color.to_css(),
            "background-color" => self.background_color.to_css(),
            "font-size" => format!("{}px", self.font_size),
            "font-family" => self.font_family.clone(),
            "font-weight" => self.font_weight.to_string(),
            "font-style" => self.font_style.clone(),
            "font-variant" => self.font_variant.clone(),
            "white-space" => self.white_space.as_str().to_string(),
            "display" => self.display.as_str().to_string(),
            _ => String::new(),
        }
    }

    /// Apply user-agent defaults for `tag`.
    pub fn apply_tag_defaults(&mut self, tag: &str, parent: &ComputedStyle) {
        let font_size = self.font_size;
        let em = |n: f64| n * font_size;
        match tag {
            "head" | "style" | "script" | "title" | "meta" | "link" | "template" | "base"
            | "noscript" => self.display = Display::None,
            "html" | "div" | "section" | "article" | "header" | "footer" | "main" | "nav"
            | "aside" | "figure" | "figcaption" | "address" | "details" | "summary" | "form"
            | "fieldset" | "table" | "tr" | "li" | "dt" | "hr" => self.display = Display::Block,
            "body" => {
                self.display = Display::Block;
                self.margin_top = 8.0;
                self.margin_bottom = 8.0;
                self.indent = 8.0;
            }
            "p" | "dl" => {
                self.display = Display::Block;
                self.margin_top = em(1.0);
                self.margin_bottom = em(1.0);
            }
            "blockquote" => {
                self.display = Display::Block;
                self.margin_top = em(1.0);
                self.margin_bottom = em(1.0);
                self.indent = 40.0;
            }
            "ul" | "ol" => {
                self.display = Display::Block;
                self.margin_top = em(1.0);
                self.margin_bottom = em(1.0);
                self.indent = 40.0;
            }
            "dd" => {
                self.display = Display::Block;
                self.indent = 40.0;
            }
            "pre" => {
                self.display = Display::Block;
                self.white_space = WhiteSpace::Pre;
                self.font_family = "monospace".into();
                self.margin_top = em(1.0);
                self.margin_bottom = em(1.0);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let (scale, margin) = match tag {
                    "h1" => (2.0, 0.67),
                    "h2" => (1.5, 0.83),
                    "h3" => (1.17, 1.0),
                    "h4" => (1.0, 1.33),
                    "h5" => (0.83, 1.67),
                    _ => (0.67, 2.33),
                };
                self.display = Display::Block;
                self.font_size = round_px(parent.font_size * scale);
                self.font_weight = 700;
                self.margin_top = self.font_size * margin;
                self.margin_bottom = self.font_size * margin;
            }
            "b" | "strong" | "th" => self.font_weight = 700,
            "i" | "em" | "cite" | "var" | "dfn" => self.font_style = "italic".into(),
            "code" | "kbd" | "samp" | "tt" => self.font_family = "monospace".into(),
            "small" => self.font_size = round_px(parent.font_size / 1.2),
            "big" => self.font_size = round_px(parent.font_size * 1.2),
            "a" => self.color = Color::rgb(0, 0, 238),
            "mark" => {
                self.background_color = Color::rgb(255, 255, 0);
                self.color = Color::BLACK;
            }
            _ => {}
        }
    }

    /// Apply one declaration. Unknown properties and unparsable values are
    /// ignored.
    pub fn apply_declaration(&mut self, property: &str, value: &str, parent: &ComputedStyle) {
        let value = value.trim();
        if value == "inherit" {
            self.inherit_property(property, parent);
            return;
        }
        match property {
            "color" => {
                if let Some(c) = Color::parse(value) {
                    self.color = c;
                }
            }
            "background-color" | "background" => {
                if let Some(c) = Color::parse(value) {
                    self.background_color = c;
                }
            }
            "font-size" => {
                if let Some(px) = parse_font_size(value, parent.font_size) {
                    self.font_size = px;
                }
            }
            "font-family" => self.font_family = value.to_string(),
            "font-weight" => {
                if let Some(w) = parse_font_weight(value, parent.font_weight) {
                    self.font_weight = w;
                }
            }
            "font-style" => self.font_style = value.to_ascii_lowercase(),
            "font-variant" => self.font_variant = value.to_ascii_lowercase(),
            "white-space" => {
                if let Some(ws) = WhiteSpace::parse(&value.to_ascii_lowercase()) {
                    self.white_space = ws;
                }
            }
            "display" => self.display = Display::parse(&value.to_ascii_lowercase()),
            "margin" => {
                let parts: Vec<f64> = value
                    .split_whitespace()
                    .filter_map(|v| parse_length(v, self.font_size))
                    .collect();
                match parts.as_slice() {
                    [] => {}
                    [v] | [v, _] => {
                        self.margin_top = *v;
                        self.margin_bottom = *v;
                    }
                    [top, _, bottom, ..] => {
                        self.margin_top = *top;
                        self.margin_bottom = *bottom;
                    }
                }
            }
            "margin-top" => {
                if let Some(v) = parse_length(value, self.font_size) {
                    self.margin_top = v;
                }
            }
            "margin-bottom" => {
                if let Some(v) = parse_length(value, self.font_size) {
                    self.margin_bottom = v;
                }
            }
            "margin-left" | "padding-left" => {
                if let Some(v) = parse_length(value, self.font_size) {
                    self.indent = v;
                }
            }
            _ => {}
        }
    }

    fn inherit_property(&mut self, property: &str, parent: &ComputedStyle) {
        match property {
            "color" => self.color = parent.color,
            "background-color" => self.background_color = parent.background_color,
            "font-size" => self.font_size = parent.font_size,
            "font-family" => self.font_family = parent.font_family.clone(),
            "font-weight" => self.font_weight = parent.font_weight,
            "font-style" => self.font_style = parent.font_style.clone(),
            "font-variant" => self.font_variant = parent.font_variant.clone(),
            "white-space" => self.white_space = parent.white_space,
            _ => {}
        }
    }
}

fn round_px(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Parse a length in px, em, rem (against 16px), pt or unitless zero.
pub fn parse_length(value: &str, font_size: f64) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    if v == "0" {
        return Some(0.0);
    }
    let (num, factor) = if let Some(n) = v.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = v.strip_suffix("rem") {
        (n, 16.0)
    } else if let Some(n) = v.strip_suffix("em") {
        (n, font_size)
    } else if let Some(n) = v.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else {
        return None;
    };
    num.trim().parse::<f64>().ok().map(|n| round_px(n * factor))
}

pub fn parse_font_size(value: &str, parent_size: f64) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    let keyword = match v.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(round_px(parent_size / 1.2)),
        "larger" => Some(round_px(parent_size * 1.2)),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }
    if let Some(pct) = v.strip_suffix('%') {
        return pct
            .trim()
            .parse::<f64>()
            .ok()
            .map(|p| round_px(parent_size * p / 100.0));
    }
    parse_length(&v, parent_size)
}

pub fn parse_font_weight(value: &str, parent_weight: u16) -> Option<u16> {
    match value.trim().to_ascii_lowercase().as_str() {
        "normal" => Some(400),
        "bold" => Some(700),
        "bolder" => Some(if parent_weight < 600 { 700 } else { 900 }),
        "lighter" => Some(if parent_weight > 500 { 400 } else { 100 }),
        other => other
            .parse::<u16>()
            .ok()
            .filter(|w| (1..=1000).contains(w)),
    }
}

/// Split a declaration block into `(property, value)` pairs. Priorities are
/// dropped.
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map(str::trim_end)
                .unwrap_or(value);
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name, value.to_string()))
            }
        })
        .collect()
}

/// A style rule: selector text and its declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

/// Parse a stylesheet into plain rules. At-rules are skipped along with
/// their nested blocks.
pub fn parse_stylesheet(css: &str) -> Vec<StyleRule> {
    let css = strip_comments(css);
    let mut rules = Vec::new();
    let mut rest = css.as_str();

    while let Some(open) = rest.find('{') {
        let selector = rest[..open].trim();
        let after = &rest[open + 1..];
        if selector.starts_with('@') {
            // skip the balanced block
            let mut depth = 1;
            let mut end = after.len();
            for (i, ch) in after.char_indices() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            end = i + 1;
                            break;
                        }
                    }
                    _ => {}
                }
            }
            rest = &after[end.min(after.len())..];
            continue;
        }
        let close = after.find('}').unwrap_or(after.len());
        let body = &after[..close];
        if !selector.is_empty() {
            rules.push(StyleRule {
                selector: selector.to_string(),
                declarations: parse_declarations(body),
            });
        }
        rest = &after[(close + 1).min(after.len())..];
    }
    rules
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_normalize_to_rgb() {
        assert_eq!(Color::parse("#f00").unwrap().to_css(), "rgb(255, 0, 0)");
        assert_eq!(Color::parse("#0080ff").unwrap().to_css(), "rgb(0, 128, 255)");
        assert_eq!(Color::parse("Navy").unwrap().to_css(), "rgb(0, 0, 128)");
        assert_eq!(
            Color::parse("rgba(10, 20, 30, 0.5)").unwrap().to_css(),
            "rgba(10, 20, 30, 0.5)"
        );
        assert_eq!(Color::parse("transparent").unwrap().to_css(), "rgba(0, 0, 0, 0)");
        assert!(Color::parse("not-a-color").is_none());
    }

    #[test]
    fn font_sizes_resolve_to_px() {
        assert_eq!(parse_font_size("12px", 16.0), Some(12.0));
        assert_eq!(parse_font_size("2em", 14.0), Some(28.0));
        assert_eq!(parse_font_size("150%", 10.0), Some(15.0));
        assert_eq!(parse_font_size("12pt", 16.0), Some(16.0));
        assert_eq!(parse_font_size("large", 16.0), Some(18.0));
        assert_eq!(parse_font_size("huge", 16.0), None);
    }

    #[test]
    fn font_weights_resolve_to_numbers() {
        assert_eq!(parse_font_weight("bold", 400), Some(700));
        assert_eq!(parse_font_weight("600", 400), Some(600));
        assert_eq!(parse_font_weight("bolder", 700), Some(900));
        assert_eq!(parse_font_weight("heavy", 400), None);
    }

    #[test]
    fn declarations_drop_priority_and_blanks() {
        let decls = parse_declarations("color: red !important; ; font-size:12px;bad");
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "red".to_string()),
                ("font-size".to_string(), "12px".to_string())
            ]
        );
    }

    #[test]
    fn stylesheet_skips_comments_and_at_rules() {
        let css = "/* c */ pre { color: blue } @media print { pre { color: red } } .k, .n{font-weight:bold}";
        let rules = parse_stylesheet(css);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, "pre");
        assert_eq!(rules[1].selector, ".k, .n");
        assert_eq!(rules[1].declarations[0].1, "bold");
    }

    #[test]
    fn inheritance_resets_box_properties() {
        let cfg = PageConfig::default();
        let mut parent = ComputedStyle::initial(&cfg);
        parent.apply_tag_defaults("pre", &ComputedStyle::initial(&cfg));
        parent.background_color = Color::rgb(1, 2, 3);
        let child = parent.inherit();
        assert_eq!(child.white_space, WhiteSpace::Pre);
        assert_eq!(child.font_family, "monospace");
        assert_eq!(child.background_color, Color::TRANSPARENT);
        assert_eq!(child.display, Display::Inline);
    }

    #[test]
    fn headings_scale_from_parent() {
        let cfg = PageConfig::default();
        let parent = ComputedStyle::initial(&cfg);
        let mut h1 = parent.inherit();
        h1.apply_tag_defaults("h1", &parent);
        assert_eq!(h1.resolved_value("font-size"), "32px");
        assert_eq!(h1.resolved_value("font-weight"), "700");
    }
}
