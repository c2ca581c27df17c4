//! Data model for per-host extraction rules (spec.md §3 `SiteConfig`, §4.E).
//!
//! Matching (which config applies to a URL) and evaluation (running the
//! selectors against a parsed DOM) live in `readeck-siteconfig`; this crate
//! only holds the plain-data shape so `readeck-types` doesn't need to depend
//! on the DOM/selector stack.

use serde::{Deserialize, Serialize};

/// A single string-replacement rule, applied to the raw response body before
/// DOM parsing (spec.md §4.E, expanded in SPEC_FULL.md §4.E from
/// `internal/bookmarks/content_scripts.go`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringReplacement {
    /// Matched literally unless `is_regex` is set.
    pub find: String,
    pub replace: String,
    #[serde(default)]
    pub is_regex: bool,
}

/// One test case bundled with a site config, used only by the cookbook QA
/// endpoint (out of core scope, kept here as inert data per spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfigTest {
    pub url: String,
    #[serde(default)]
    pub expected_title: Option<String>,
}

/// Declarative per-host extraction rules (spec.md §4.E).
///
/// Selector fields hold CSS selector strings (see SPEC_FULL.md §4.E for why
/// this implementation uses CSS rather than XPath).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Host glob patterns this config applies to (e.g. `*.example.com`).
    pub hosts: Vec<String>,

    #[serde(default)]
    pub string_replacements: Vec<StringReplacement>,

    #[serde(default)]
    pub title_selector: Vec<String>,
    #[serde(default)]
    pub body_selector: Vec<String>,
    #[serde(default)]
    pub date_selector: Vec<String>,
    #[serde(default)]
    pub author_selector: Vec<String>,
    #[serde(default)]
    pub strip_selector: Vec<String>,
    #[serde(default)]
    pub strip_id_or_class: Vec<String>,
    #[serde(default)]
    pub next_page_selector: Vec<String>,

    #[serde(default)]
    pub tests: Vec<SiteConfigTest>,
}

/// Hooks a compiled content script declares it serves (spec.md §4.E /
/// §9: "each declares which hooks it serves").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentScriptHooks {
    OnMeta,
    OnContent,
    FindNextPage,
}
