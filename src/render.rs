//! Fragment markup
//!
//! The embed syntax carries a positional reference plus named attributes;
//! those map onto the typed [`EmbedAttrs`] bag here (unrecognized names are
//! dropped) and are HTML-escaped before they reach any output. Fragment
//! builders produce the anchor, listing and audio-figure markup, plus the
//! inline error fragment used when a render aborts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named embed attributes.
///
/// One typed struct replaces the open attribute map of the embed syntax;
/// fields double as the fingerprint payload, so the struct's field order is
/// part of cache-key stability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAttrs {
    /// Anchor text / figure caption; defaults to the parsed filename
    pub title: Option<String>,
    /// `id` attribute on the anchor or figure
    pub id: Option<String>,
    /// `class` attribute on the anchor or figure
    pub class: Option<String>,
    /// `style` attribute on the anchor or figure
    pub style: Option<String>,
    /// `class` for the listing's wrapping `<div>`
    pub div_class: Option<String>,
    /// `style` for the listing's wrapping `<div>`
    pub div_style: Option<String>,
    /// `class` for the listing's `<ul>`
    pub ul_class: Option<String>,
    /// `class` for each listing `<li>`
    pub li_class: Option<String>,
    /// `class` for each listing anchor
    pub a_class: Option<String>,
    /// Filename (relative to the listed key) of the titles JSON object
    pub titles: Option<String>,
    /// Per-request region override for signing
    pub region: Option<String>,
}

impl EmbedAttrs {
    /// Build from a dynamic name/value bag, ignoring unrecognized names.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut attrs = Self::default();
        for (name, value) in pairs {
            let value = Some(value.to_string());
            match name {
                "title" => attrs.title = value,
                "id" => attrs.id = value,
                "class" => attrs.class = value,
                "style" => attrs.style = value,
                "div_class" => attrs.div_class = value,
                "div_style" => attrs.div_style = value,
                "ul_class" => attrs.ul_class = value,
                "li_class" => attrs.li_class = value,
                "a_class" => attrs.a_class = value,
                "titles" => attrs.titles = value,
                "region" => attrs.region = value,
                _ => {}
            }
        }
        attrs
    }
}

/// One signed listing item: display name paired with its signed URL.
#[derive(Debug, Clone)]
pub struct SignedEntry {
    pub name: String,
    pub url: String,
}

/// Strip markup tags, then escape the HTML special characters.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '&' => out.push_str("&amp;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Render ` name="value"` (escaped), or nothing when the value is unset.
fn attr(name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!(" {}=\"{}\"", name, escape_html(v)),
        None => String::new(),
    }
}

/// Build an anchor fragment for a single signed link.
pub fn build_anchor(url: &str, title: &str, attrs: &EmbedAttrs) -> String {
    format!(
        "<a{}{}{} href=\"{}\">{}</a>",
        attr("id", attrs.id.as_deref()),
        attr("class", attrs.class.as_deref()),
        attr("style", attrs.style.as_deref()),
        url,
        escape_html(title)
    )
}

/// Build an audio-player fragment: a captioned figure wrapping an
/// `<audio controls>` element pointed at the signed URL.
pub fn build_audio(url: &str, title: &str, attrs: &EmbedAttrs) -> String {
    format!(
        "<figure{}{}{}><figcaption>{}</figcaption><audio controls src=\"{}\"></audio></figure>",
        attr("id", attrs.id.as_deref()),
        attr("class", attrs.class.as_deref()),
        attr("style", attrs.style.as_deref()),
        escape_html(title),
        url
    )
}

/// Build the HTML list for a directory listing.
///
/// Each entry's display title comes from the titles mapping when present,
/// falling back to the entry's filename. A wrapping `<div>` appears only
/// when a div class or style was requested.
pub fn build_dir_listing(
    entries: &[SignedEntry],
    titles: &HashMap<String, String>,
    attrs: &EmbedAttrs,
) -> String {
    let mut list = format!("<ul{}>", attr("class", attrs.ul_class.as_deref()));
    for entry in entries {
        let title = titles.get(&entry.name).unwrap_or(&entry.name);
        list.push_str(&format!(
            "<li{}><a{} href=\"{}\">{}</a></li>",
            attr("class", attrs.li_class.as_deref()),
            attr("class", attrs.a_class.as_deref()),
            entry.url,
            escape_html(title)
        ));
    }
    list.push_str("</ul>");

    if attrs.div_class.is_some() || attrs.div_style.is_some() {
        format!(
            "<div{}{}>{}</div>",
            attr("class", attrs.div_class.as_deref()),
            attr("style", attrs.div_style.as_deref()),
            list
        )
    } else {
        list
    }
}

/// Inline error fragment: a human-readable message, never a stack trace.
pub fn error_fragment(message: &str) -> String {
    format!("<b>Error: </b><tt>{}</tt>", escape_html(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_specials() {
        assert_eq!(escape_html(r#"a & "b" 'c'"#), "a &amp; &quot;b&quot; &#039;c&#039;");
    }

    #[test]
    fn test_escape_html_strips_tags() {
        assert_eq!(escape_html("<script>alert(1)</script>hi"), "alert(1)hi");
        assert_eq!(escape_html("plain > text"), "plain &gt; text");
    }

    #[test]
    fn test_build_anchor_with_attributes() {
        let attrs = EmbedAttrs {
            id: Some("my-signed-link".into()),
            class: Some("flashy-links".into()),
            ..Default::default()
        };
        let a = build_anchor("https://example/signed", "Some markdown", &attrs);
        assert!(a.contains(" id=\"my-signed-link\""));
        assert!(a.contains(" class=\"flashy-links\""));
        assert!(a.contains(">Some markdown</a>"));
        assert!(a.contains("href=\"https://example/signed\""));
    }

    #[test]
    fn test_build_anchor_escapes_title() {
        let a = build_anchor("u", "<b>bold</b> & more", &EmbedAttrs::default());
        assert!(a.contains(">bold &amp; more</a>"));
    }

    #[test]
    fn test_build_audio_markup() {
        let attrs = EmbedAttrs {
            id: Some("my-media-player".into()),
            class: Some("media-player-class".into()),
            ..Default::default()
        };
        let player = build_audio("https://example/file.mp3", "Sing along", &attrs);
        assert!(player.contains("<figcaption>Sing along</figcaption>"));
        assert!(player.contains(" id=\"my-media-player\""));
        assert!(player.contains(" class=\"media-player-class\""));
        assert!(player.contains("<audio controls src=\"https://example/file.mp3\">"));
    }

    #[test]
    fn test_build_dir_listing_uses_titles_with_filename_fallback() {
        let entries = vec![
            SignedEntry {
                name: "program_notes.pdf".into(),
                url: "https://example/a".into(),
            },
            SignedEntry {
                name: "example.pdf".into(),
                url: "https://example/b".into(),
            },
        ];
        let mut titles = HashMap::new();
        titles.insert("program_notes.pdf".to_string(), "The Program".to_string());

        let listing = build_dir_listing(&entries, &titles, &EmbedAttrs::default());
        assert!(listing.contains("The Program"));
        assert!(listing.contains("example.pdf"));
        assert!(listing.starts_with("<ul>"));
        assert!(listing.ends_with("</ul>"));
    }

    #[test]
    fn test_build_dir_listing_classes_and_div() {
        let entries = vec![SignedEntry {
            name: "f.txt".into(),
            url: "u".into(),
        }];
        let attrs = EmbedAttrs {
            div_class: Some("wrap".into()),
            ul_class: Some("myList".into()),
            li_class: Some("someElement".into()),
            a_class: Some("lnk".into()),
            ..Default::default()
        };
        let listing = build_dir_listing(&entries, &HashMap::new(), &attrs);
        assert!(listing.starts_with("<div class=\"wrap\">"));
        assert!(listing.contains("<ul class=\"myList\">"));
        assert!(listing.contains("<li class=\"someElement\">"));
        assert!(listing.contains("<a class=\"lnk\" href=\"u\">"));
    }

    #[test]
    fn test_error_fragment() {
        let f = error_fragment("cannot sign link: no keys");
        assert_eq!(f, "<b>Error: </b><tt>cannot sign link: no keys</tt>");
    }

    #[test]
    fn test_from_pairs_ignores_unknown() {
        let attrs = EmbedAttrs::from_pairs(vec![
            ("title", "T"),
            ("bogus", "x"),
            ("ul_class", "list"),
        ]);
        assert_eq!(attrs.title.as_deref(), Some("T"));
        assert_eq!(attrs.ul_class.as_deref(), Some("list"));
        assert_eq!(attrs.class, None);
    }
}
