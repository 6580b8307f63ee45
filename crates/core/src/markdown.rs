//! Markdown to safe HTML for `text` blocks.
//!
//! Uses `pulldown-cmark` with tables and strikethrough. The output is safe
//! to embed without further sanitizing:
//!
//! - raw HTML in the source is escaped, never passed through
//! - images are dropped (media belongs in media blocks), their alt text kept
//! - links survive only for `http`, `https`, `mailto` and relative targets,
//!   and always open in a new tab with `rel="noopener noreferrer"`
//! - headings are clamped to `h2`..`h4`
//! - single newlines become `<br />`

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

const LINK_ATTRS: &str = r#"<a target="_blank" rel="noopener noreferrer" "#;

/// Whether a link target may be rendered.
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    let scheme_end = url.find(':');
    let path_start = url.find(|c: char| matches!(c, '/' | '?' | '#'));

    match (scheme_end, path_start) {
        (Some(colon), Some(slash)) if slash < colon => true,
        (Some(colon), _) => {
            let scheme = url[..colon].to_ascii_lowercase();
            ALLOWED_SCHEMES.contains(&scheme.as_str())
        }
        (None, _) => true,
    }
}

fn clamp_heading(level: HeadingLevel) -> HeadingLevel {
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 => HeadingLevel::H2,
        HeadingLevel::H3 => HeadingLevel::H3,
        HeadingLevel::H4 | HeadingLevel::H5 | HeadingLevel::H6 => HeadingLevel::H4,
    }
}

/// Render markdown to sanitized HTML. `None` or blank input renders to `""`.
pub fn render_safe(markdown: Option<&str>) -> String {
    let Some(source) = markdown.filter(|m| !m.trim().is_empty()) else {
        return String::new();
    };

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut skipping_link = false;

    let events = Parser::new_ext(source, options).filter_map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
        Event::SoftBreak => Some(Event::HardBreak),
        Event::Start(Tag::Image { .. }) | Event::End(TagEnd::Image) => None,
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            if is_safe_url(&dest_url) {
                Some(Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }))
            } else {
                skipping_link = true;
                None
            }
        }
        Event::End(TagEnd::Link) if skipping_link => {
            skipping_link = false;
            None
        }
        Event::Start(Tag::Heading {
            level,
            classes,
            attrs,
            ..
        }) => Some(Event::Start(Tag::Heading {
            level: clamp_heading(level),
            id: None,
            classes,
            attrs,
        })),
        Event::End(TagEnd::Heading(level)) => {
            Some(Event::End(TagEnd::Heading(clamp_heading(level))))
        }
        other => Some(other),
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out.replace("<a href=", &format!("{LINK_ATTRS}href="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_safe(None), "");
        assert_eq!(render_safe(Some("  \n")), "");
    }

    #[test]
    fn renders_basic_markdown() {
        let html = render_safe(Some("Hello **world**"));
        assert_eq!(html.trim(), "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_safe(Some("<script>alert(1)</script>"));
        assert!(!html.contains("<script>"), "{html}");
        assert!(html.contains("&lt;script&gt;"), "{html}");
    }

    #[test]
    fn javascript_links_are_unwrapped() {
        let html = render_safe(Some("[click](javascript:alert(1))"));
        assert!(!html.contains("<a"), "{html}");
        assert!(html.contains("click"));
    }

    #[test]
    fn safe_links_open_in_new_tab() {
        let html = render_safe(Some("[docs](https://example.com)"));
        assert!(
            html.contains(r#"<a target="_blank" rel="noopener noreferrer" href="https://example.com">"#),
            "{html}"
        );
    }

    #[test]
    fn images_are_dropped() {
        let html = render_safe(Some("![diagram](https://x/y.png)"));
        assert!(!html.contains("<img"), "{html}");
    }

    #[test]
    fn headings_are_clamped() {
        let html = render_safe(Some("# Top\n\n###### Deep"));
        assert!(html.contains("<h2>Top</h2>"), "{html}");
        assert!(html.contains("<h4>Deep</h4>"), "{html}");
    }

    #[test]
    fn newline_breaks_line() {
        let html = render_safe(Some("one\ntwo"));
        assert!(html.contains("<br />"), "{html}");
    }

    #[test]
    fn tables_and_strikethrough_enabled() {
        let html = render_safe(Some("| a |\n|---|\n| b |\n\n~~old~~"));
        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("<del>old</del>"), "{html}");
    }

    #[test]
    fn url_safety() {
        assert!(is_safe_url("https://a.b"));
        assert!(is_safe_url("mailto:x@y.z"));
        assert!(is_safe_url("/relative/path"));
        assert!(is_safe_url("#anchor"));
        assert!(is_safe_url("page?x=a:b"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("data:text/html;base64,xx"));
        assert!(!is_safe_url(" JavaScript:void(0)"));
    }
}
