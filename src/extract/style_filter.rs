//! Filtering of computed styles down to the non-default text properties

/// Text-rendering properties carried into snapshots, paired with the resolved
/// value that makes them redundant.
pub const TRACKED_PROPERTIES: [(&str, &str); 7] = [
    ("color", "rgb(0, 0, 0)"),
    ("background-color", "rgba(0, 0, 0, 0)"),
    ("font-size", "16px"),
    ("font-family", "serif"),
    ("font-weight", "400"),
    ("font-style", "normal"),
    ("font-variant", "normal"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDeclaration {
    pub property: &'static str,
    pub value: String,
}

/// Resolve every property in `properties` through `lookup` and keep the ones
/// whose value differs from the paired default. Order follows `properties`.
pub fn filter_styles<F>(lookup: F, properties: &[(&'static str, &str)]) -> Vec<StyleDeclaration>
where
    F: Fn(&str) -> String,
{
    properties
        .iter()
        .filter_map(|&(property, ignore)| {
            let value = lookup(property);
            (value != ignore).then_some(StyleDeclaration { property, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(property: &str) -> String {
        TRACKED_PROPERTIES
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn all_defaults_filter_to_nothing() {
        assert!(filter_styles(defaults, &TRACKED_PROPERTIES).is_empty());
    }

    #[test]
    fn single_change_is_reported_alone() {
        let styles = filter_styles(
            |p| {
                if p == "font-weight" {
                    "700".to_string()
                } else {
                    defaults(p)
                }
            },
            &TRACKED_PROPERTIES,
        );
        assert_eq!(
            styles,
            vec![StyleDeclaration {
                property: "font-weight",
                value: "700".into()
            }]
        );
    }

    #[test]
    fn output_follows_property_order() {
        let styles = filter_styles(|p| format!("x-{}", p), &TRACKED_PROPERTIES);
        let names: Vec<_> = styles.iter().map(|s| s.property).collect();
        let expected: Vec<_> = TRACKED_PROPERTIES.iter().map(|(p, _)| *p).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn comparison_is_exact_string_match() {
        // "rgb(0,0,0)" is visually the default but not the same string
        let styles = filter_styles(
            |p| {
                if p == "color" {
                    "rgb(0,0,0)".to_string()
                } else {
                    defaults(p)
                }
            },
            &TRACKED_PROPERTIES,
        );
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].property, "color");
    }
}
