//! Asset discovery in a parsed HTML document.
//!
//! Only `img[src]`, `script[src]` and `link[href]` are considered. Nested
//! references (CSS `url()`, inline scripts, `srcset`) are not followed.

use scraper::node::Element;
use scraper::Html;
use std::fmt;

/// Tag an asset reference was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Link,
    Script,
}

impl AssetKind {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "img" => Some(AssetKind::Image),
            "link" => Some(AssetKind::Link),
            "script" => Some(AssetKind::Script),
            _ => None,
        }
    }

    /// Attribute holding the reference for this kind of tag.
    pub fn attribute(self) -> &'static str {
        match self {
            AssetKind::Image | AssetKind::Script => "src",
            AssetKind::Link => "href",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => write!(f, "img"),
            AssetKind::Link => write!(f, "link"),
            AssetKind::Script => write!(f, "script"),
        }
    }
}

/// Raw, unresolved attribute value pointing at an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub kind: AssetKind,
    pub value: String,
}

impl AssetReference {
    fn from_element(element: &Element) -> Option<Self> {
        let kind = AssetKind::from_tag(element.name())?;
        let value = element.attr(kind.attribute())?;
        if value.is_empty() {
            return None;
        }
        Some(AssetReference {
            kind,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}=\"{}\">", self.kind, self.kind.attribute(), self.value)
    }
}

/// Parses page bytes as HTML. Invalid UTF-8 is replaced, never rejected.
pub fn parse_document(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

/// Every asset reference of `document`, in document order, duplicates kept.
///
/// The iterator borrows the document and holds no other state; calling this
/// again starts over.
pub fn asset_references(document: &Html) -> impl Iterator<Item = AssetReference> + '_ {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .filter_map(AssetReference::from_element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(html: &str) -> Vec<(AssetKind, String)> {
        let doc = Html::parse_document(html);
        asset_references(&doc).map(|r| (r.kind, r.value)).collect()
    }

    #[test]
    fn document_order_across_kinds() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/css/site.css">
            <script src="js/app.js"></script>
            </head><body>
            <img src="/img/a.png">
            <script>inline()</script>
            <img src="https://cdn.example.test/b.png">
            </body></html>"#;
        assert_eq!(
            refs(html),
            vec![
                (AssetKind::Link, "/css/site.css".to_string()),
                (AssetKind::Script, "js/app.js".to_string()),
                (AssetKind::Image, "/img/a.png".to_string()),
                (AssetKind::Image, "https://cdn.example.test/b.png".to_string()),
            ]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let html = r#"<img src="a.png"><img src="a.png"><link href="a.png">"#;
        assert_eq!(refs(html).len(), 3);
    }

    #[test]
    fn missing_or_empty_attribute_contributes_nothing() {
        let html = r#"<img alt="x"><img src=""><script></script><link rel="preconnect">
            <img href="wrong-attr.png"><script href="also-wrong.js"></script>
            <link src="nope.css">"#;
        assert!(refs(html).is_empty());
    }

    #[test]
    fn other_tags_are_ignored() {
        let html = r#"<a href="/page2">x</a><iframe src="/frame"></iframe>
            <video src="/v.mp4"></video><source src="/s.webm">"#;
        assert!(refs(html).is_empty());
    }

    #[test]
    fn iteration_restarts() {
        let doc = Html::parse_document(r#"<img src="1.png"><script src="2.js"></script>"#);
        let first: Vec<_> = asset_references(&doc).collect();
        let second: Vec<_> = asset_references(&doc).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn uppercase_tags_and_lossy_bytes() {
        let mut bytes = b"<IMG SRC=\"up.png\"><LINK HREF=\"s.css\">".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        let doc = parse_document(&bytes);
        let values: Vec<_> = asset_references(&doc).map(|r| r.value).collect();
        assert_eq!(values, vec!["up.png", "s.css"]);
    }

    #[test]
    fn display_names_tag_and_attribute() {
        let r = AssetReference {
            kind: AssetKind::Link,
            value: "/s.css".to_string(),
        };
        assert_eq!(r.to_string(), "<link href=\"/s.css\">");
    }
}
