//! Content-script discovery and hook dispatch (spec.md §4.E: "compiled
//! once; at runtime each declares which hooks it serves... must be pure
//! w.r.t. network").
//!
//! The corpus has no embedded JS engine crate, so this module only carries
//! the discovery and dispatch mechanics a real engine would plug into: it
//! walks the configured roots for `.js` files, and exposes the narrow API
//! (current drop, DOM, logging) hooks are called with. Running the scripts
//! themselves is left to a `ContentScript` implementation the host process
//! supplies — see DESIGN.md for why no interpreter is vendored here.

use std::path::{Path, PathBuf};

use readeck_dom::Dom;
use readeck_types::{ContentScriptHooks, Drop};

/// The data a content script hook is allowed to touch. Kept narrow and
/// short-lived on purpose: no network handle is exposed, and `dom` is
/// read-only so a hook can inspect structure but not smuggle in a fetch.
pub struct ContentScriptApi<'a> {
    pub drop: &'a mut Drop,
    pub dom: &'a Dom,
}

/// One compiled content script. `discover_scripts` only produces the path
/// and declared hooks; turning that into a runnable `ContentScript` is the
/// embedder's job once a script engine is wired in.
pub trait ContentScript: Send + Sync {
    fn name(&self) -> &str;
    fn hooks(&self) -> &[ContentScriptHooks];

    fn on_meta(&self, _api: &mut ContentScriptApi) {}
    fn on_content(&self, _api: &mut ContentScriptApi) {}
    fn find_next_page(&self, _dom: &Dom) -> Option<String> {
        None
    }
}

#[derive(Default)]
pub struct ContentScriptRegistry {
    scripts: Vec<Box<dyn ContentScript>>,
}

impl ContentScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, script: Box<dyn ContentScript>) {
        self.scripts.push(script);
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn dispatch_on_meta(&self, api: &mut ContentScriptApi) {
        for script in self.serving(ContentScriptHooks::OnMeta) {
            script.on_meta(api);
        }
    }

    pub fn dispatch_on_content(&self, api: &mut ContentScriptApi) {
        for script in self.serving(ContentScriptHooks::OnContent) {
            script.on_content(api);
        }
    }

    /// Returns the first non-`None` link a `FindNextPage`-capable script
    /// reports, in registration order.
    pub fn find_next_page(&self, dom: &Dom) -> Option<String> {
        self.serving(ContentScriptHooks::FindNextPage).find_map(|script| script.find_next_page(dom))
    }

    fn serving(&self, hook: ContentScriptHooks) -> impl Iterator<Item = &dyn ContentScript> {
        self.scripts.iter().filter(move |s| s.hooks().contains(&hook)).map(|s| s.as_ref())
    }
}

/// Recursively finds `.js` files under `roots`, in the order the original
/// `loadContentScripts` walks `fs.WalkDir` over each configured directory.
/// A root that doesn't exist is skipped.
pub fn discover_scripts(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in roots {
        if root.is_dir() {
            walk_js_files(root, &mut found);
        }
    }
    found
}

fn walk_js_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    children.sort();
    for path in children {
        if path.is_dir() {
            walk_js_files(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("js") {
            out.push(path);
        }
    }
}
