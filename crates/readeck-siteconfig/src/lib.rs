//! # readeck-siteconfig
//!
//! Per-host extraction rules and content-script dispatch (spec.md §4.E).
//! `readeck-types::SiteConfig` is the plain-data shape; this crate loads
//! configs from disk, matches them against a request host, and evaluates
//! their CSS selectors against a parsed document.

mod hooks;
mod loader;
mod replace;
mod select;

pub use hooks::{discover_scripts, ContentScript, ContentScriptApi, ContentScriptRegistry};
pub use loader::{SiteConfigLoadError, SiteConfigRegistry};
pub use replace::apply_string_replacements;
pub use select::{select_all_html, select_all_text, select_first_href, select_first_text, strip_id_or_class, strip_selectors};

use readeck_dom::Dom;
use readeck_types::{DocumentType, Drop, SiteConfig};

/// Runs the title/body/date/author/strip rules of one `SiteConfig` against
/// an already-parsed document, mutating `drop` and `dom` in place the way
/// `ExtractMeta`/`ExtractBody` do for the generic (no site config) path.
/// `string_replacements` are not applied here — they run on the raw body
/// before parsing, via `apply_string_replacements`.
pub fn apply_selectors(config: &SiteConfig, dom: &mut Dom, drop: &mut Drop) {
    strip_selectors(dom, &config.strip_selector);
    strip_id_or_class(dom, &config.strip_id_or_class);

    if let Some(title) = select_first_text(dom, &config.title_selector) {
        if !title.is_empty() {
            drop.title = title;
        }
    }
    if let Some(date) = select_first_text(dom, &config.date_selector) {
        if !date.is_empty() {
            drop.properties.insert("site_config_date".to_string(), date);
        }
    }
    let authors = select_all_text(dom, &config.author_selector);
    if !authors.is_empty() {
        drop.authors = authors;
    }
    if let Some(body) = select_all_html(dom, &config.body_selector) {
        drop.properties.insert("site_config_body".to_string(), body);
    }
}

/// `next_page_selector`: returns the unresolved `href` of the next-page
/// link, if the site config declares one and it matches.
pub fn find_next_page(config: &SiteConfig, dom: &Dom) -> Option<String> {
    select_first_href(dom, &config.next_page_selector)
}

/// `SetDropProperties`-adjacent convenience: a page carrying a
/// `site_config_body` property was built from a site config's
/// `body_selector` rather than generic readability, which is enough signal
/// on its own that it's an article rather than "other".
pub fn promote_document_type_from_site_config(drop: &mut Drop) {
    if drop.properties.contains_key("site_config_body") && drop.document_type == DocumentType::Other {
        drop.document_type = DocumentType::Article;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn dom() -> Dom {
        Dom::parse(
            r#"<html><body>
                <div class="ad">buy</div>
                <h1 class="title">Hello World</h1>
                <div class="content"><p>body text</p></div>
                <span class="author">Ada Lovelace</span>
            </body></html>"#,
        )
    }

    #[test]
    fn apply_selectors_populates_drop_from_matched_nodes() {
        let config = SiteConfig {
            hosts: vec!["example.com".into()],
            strip_selector: vec![".ad".into()],
            title_selector: vec!["h1.title".into()],
            author_selector: vec![".author".into()],
            body_selector: vec![".content".into()],
            ..SiteConfig::default()
        };
        let mut dom = dom();
        let mut drop = Drop::new(Url::parse("https://example.com").unwrap());

        apply_selectors(&config, &mut dom, &mut drop);

        assert_eq!(drop.title, "Hello World");
        assert_eq!(drop.authors, vec!["Ada Lovelace".to_string()]);
        assert!(drop.properties.get("site_config_body").unwrap().contains("body text"));
        assert!(!dom.to_html().contains("buy"));
    }

    #[test]
    fn site_config_derived_body_promotes_document_type() {
        let mut drop = Drop::new(Url::parse("https://example.com").unwrap());
        drop.properties.insert("site_config_body".to_string(), "<p>x</p>".to_string());
        promote_document_type_from_site_config(&mut drop);
        assert_eq!(drop.document_type, DocumentType::Article);
    }
}
