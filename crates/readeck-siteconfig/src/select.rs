//! CSS-selector evaluation for site config rules (spec.md §4.E), run
//! against an already-parsed `Dom`. Each selector list is tried in order;
//! the first pattern that matches anything wins, mirroring the original's
//! "first matching XPath expression" fallback chain.

use readeck_dom::{Dom, NodeId};

/// `title_selector` / `date_selector`: text of the first node matched by
/// the first selector that matches anything at all.
pub fn select_first_text(dom: &Dom, selectors: &[String]) -> Option<String> {
    first_match(dom, selectors).map(|id| dom.text_content(id).trim().to_string())
}

/// `body_selector`: every node matched by the first selector that matches
/// anything, concatenated as markup (so nested structure survives into the
/// extracted body).
pub fn select_all_html(dom: &Dom, selectors: &[String]) -> Option<String> {
    for selector in selectors {
        let matches = dom.select(selector);
        if !matches.is_empty() {
            return Some(matches.into_iter().map(|id| dom.outer_html(id)).collect::<Vec<_>>().join(""));
        }
    }
    None
}

/// `author_selector`: text of every node matched by the first selector
/// that matches anything, one author per matched node.
pub fn select_all_text(dom: &Dom, selectors: &[String]) -> Vec<String> {
    for selector in selectors {
        let matches = dom.select(selector);
        if !matches.is_empty() {
            return matches
                .into_iter()
                .map(|id| dom.text_content(id).trim().to_string())
                .filter(|text| !text.is_empty())
                .collect();
        }
    }
    Vec::new()
}

/// `next_page_selector`: the `href` of the first matched `<a>`, left for
/// the caller to absolutize against the page's base URL.
pub fn select_first_href(dom: &Dom, selectors: &[String]) -> Option<String> {
    let id = first_match(dom, selectors)?;
    dom.attr(id, "href").map(str::to_string)
}

/// `strip_selector`: removes every node matched by any of the given
/// selectors, unlike the other rules this applies all of them, not just
/// the first that matches.
pub fn strip_selectors(dom: &mut Dom, selectors: &[String]) {
    for selector in selectors {
        for id in dom.select(selector) {
            dom.remove(id);
        }
    }
}

/// `strip_id_or_class`: removes elements whose `id` or `class` attribute
/// contains any of the given substrings.
pub fn strip_id_or_class(dom: &mut Dom, needles: &[String]) {
    if needles.is_empty() {
        return;
    }
    let victims: Vec<NodeId> = dom
        .descendant_elements(dom.root())
        .into_iter()
        .filter(|id| {
            let id_attr = dom.attr(*id, "id").unwrap_or_default();
            let class_attr = dom.class_name(*id);
            needles.iter().any(|needle| id_attr.contains(needle.as_str()) || class_attr.contains(needle.as_str()))
        })
        .collect();
    for id in victims {
        dom.remove(id);
    }
}

fn first_match(dom: &Dom, selectors: &[String]) -> Option<NodeId> {
    selectors.iter().find_map(|selector| dom.select(selector).into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom() -> Dom {
        Dom::parse(
            r#"<html><body>
                <h1 class="headline">Title Here</h1>
                <div class="ads">buy now</div>
                <div id="content"><p>one</p><p>two</p></div>
                <span class="byline">Jane</span>
                <span class="byline">Doe</span>
                <a class="next" href="/page/2">Next</a>
            </body></html>"#,
        )
    }

    #[test]
    fn first_text_picks_first_matching_selector() {
        let dom = dom();
        let selectors = vec!["h2.missing".to_string(), "h1.headline".to_string()];
        assert_eq!(select_first_text(&dom, &selectors), Some("Title Here".to_string()));
    }

    #[test]
    fn body_html_concatenates_matched_markup() {
        let dom = dom();
        let selectors = vec!["#content p".to_string()];
        let html = select_all_html(&dom, &selectors).unwrap();
        assert!(html.contains("<p>one</p>"));
        assert!(html.contains("<p>two</p>"));
    }

    #[test]
    fn all_text_collects_every_matched_node() {
        let dom = dom();
        let selectors = vec![".byline".to_string()];
        assert_eq!(select_all_text(&dom, &selectors), vec!["Jane".to_string(), "Doe".to_string()]);
    }

    #[test]
    fn next_page_href_is_returned_unresolved() {
        let dom = dom();
        let selectors = vec!["a.next".to_string()];
        assert_eq!(select_first_href(&dom, &selectors), Some("/page/2".to_string()));
    }

    #[test]
    fn strip_selectors_removes_every_match() {
        let mut dom = dom();
        strip_selectors(&mut dom, &vec![".ads".to_string()]);
        assert!(!dom.to_html().contains("buy now"));
    }

    #[test]
    fn strip_id_or_class_matches_substrings() {
        let mut dom = dom();
        strip_id_or_class(&mut dom, &vec!["headline".to_string()]);
        assert!(!dom.to_html().contains("Title Here"));
    }
}
