//! Site-config discovery and host matching (spec.md §4.E).
//!
//! Each config lives in its own `*.json` file whose stem is a host glob
//! (e.g. `*.example.com.json`), scanned recursively under each configured
//! root. Roots are searched in the order the caller supplies them, so the
//! "user folders before built-ins" priority rule is just "put the user
//! root first" at the `ExtractorConfig::site_config_roots` call site.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use readeck_config::SiteConfigRoot;
use readeck_types::SiteConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteConfigLoadError {
    #[error("reading site config directory {0:?}: {1}")]
    Walk(PathBuf, std::io::Error),

    #[error("invalid host glob in {0:?}: {1}")]
    Glob(PathBuf, globset::Error),

    #[error("parsing site config {0:?}: {1}")]
    Parse(PathBuf, serde_json::Error),
}

struct CompiledSiteConfig {
    patterns: GlobSet,
    config: SiteConfig,
}

/// An ordered, compiled set of site configs, ready to be matched against a
/// request host.
pub struct SiteConfigRegistry {
    entries: Vec<CompiledSiteConfig>,
}

impl SiteConfigRegistry {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Loads every `*.json` site config found under `roots`, in order.
    /// A root directory that doesn't exist is skipped rather than treated
    /// as an error, matching `ExtractorConfig`'s own tolerant validation
    /// for optional directories.
    pub fn load(roots: &[SiteConfigRoot]) -> Result<Self, SiteConfigLoadError> {
        let mut entries = Vec::new();
        for root in roots {
            if !root.src.is_dir() {
                continue;
            }
            for path in walk_json_files(&root.src).map_err(|e| SiteConfigLoadError::Walk(root.src.clone(), e))? {
                let raw = std::fs::read_to_string(&path).map_err(|e| SiteConfigLoadError::Walk(path.clone(), e))?;
                let config: SiteConfig =
                    serde_json::from_str(&raw).map_err(|e| SiteConfigLoadError::Parse(path.clone(), e))?;
                let patterns = compile_hosts(&path, &config.hosts)?;
                entries.push(CompiledSiteConfig { patterns, config });
            }
        }
        Ok(Self { entries })
    }

    /// Returns the first config whose host patterns match `host`, walking
    /// entries in load order (user roots first).
    pub fn lookup(&self, host: &str) -> Option<&SiteConfig> {
        self.entries
            .iter()
            .find(|entry| entry.patterns.is_match(host))
            .map(|entry| &entry.config)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compile_hosts(path: &Path, hosts: &[String]) -> Result<GlobSet, SiteConfigLoadError> {
    let mut builder = GlobSetBuilder::new();
    for host in hosts {
        let glob = Glob::new(host).map_err(|e| SiteConfigLoadError::Glob(path.to_path_buf(), e))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| SiteConfigLoadError::Glob(path.to_path_buf(), e))
}

fn walk_json_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
