//! The `Drop` type: one fetched page of a (potentially multi-page) article.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Kind of document a `Drop` was classified as (spec.md §3, derived by the
/// `SetDropProperties` processor in §4.F item 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Article,
    Photo,
    Video,
    Other,
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Other
    }
}

/// Reading direction, populated from `html[dir]` (spec.md §4.F item 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Parses an `html[dir]` value, discarding anything that isn't `ltr` or
    /// `rtl` exactly as spec.md §4.F item 3 requires.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ltr" => Some(TextDirection::Ltr),
            "rtl" => Some(TextDirection::Rtl),
            _ => None,
        }
    }
}

/// A picture extracted from a page: raw bytes plus the metadata needed to
/// persist and re-serve it (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Picture {
    pub url: Url,
    pub content_type: String,
    #[serde(with = "serde_bytes_base64")]
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Lazily computed base64 cache, populated the first time the picture is
    /// embedded as a `data:` URL so repeated embeddings don't re-encode.
    #[serde(skip)]
    pub encoded_cache: Option<String>,
}

impl Picture {
    pub fn new(url: Url, content_type: impl Into<String>, bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            url,
            content_type: content_type.into(),
            bytes,
            width,
            height,
            encoded_cache: None,
        }
    }

    /// Returns (and caches) the base64 encoding of the picture bytes.
    pub fn as_base64(&mut self) -> &str {
        if self.encoded_cache.is_none() {
            use base64::Engine;
            self.encoded_cache = Some(base64::engine::general_purpose::STANDARD.encode(&self.bytes));
        }
        self.encoded_cache.as_deref().unwrap()
    }

    /// Renders a `data:` URL for this picture.
    pub fn data_url(&mut self) -> String {
        let content_type = self.content_type.clone();
        format!("data:{};base64,{}", content_type, self.as_base64())
    }
}

mod serde_bytes_base64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Vec<u8>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(serde::de::Error::custom)
    }
}

/// One fetched page of a potentially multi-page article (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drop {
    pub url: Url,
    pub content_type: String,
    pub charset: Option<String>,
    pub body: Vec<u8>,

    pub title: String,
    pub description: String,
    pub authors: Vec<String>,
    pub lang: Option<String>,
    pub text_direction: Option<TextDirection>,
    pub document_type: DocumentType,
    pub site: Option<String>,
    pub domain: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub meta: HashMap<String, Vec<String>>,
    pub properties: HashMap<String, String>,
    pub pictures: HashMap<String, Picture>,
}

impl Drop {
    /// Creates an empty `Drop` for a given URL, as `extract.go`'s `NewDrop`
    /// does before the page is fetched.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            content_type: String::new(),
            charset: None,
            body: Vec::new(),
            title: String::new(),
            description: String::new(),
            authors: Vec::new(),
            lang: None,
            text_direction: None,
            document_type: DocumentType::Other,
            site: None,
            domain: None,
            date: None,
            meta: HashMap::new(),
            properties: HashMap::new(),
            pictures: HashMap::new(),
        }
    }

    /// `IsHTML()` per spec.md §3: true when the content type starts with
    /// `text/html` or a close relative (`application/xhtml+xml`).
    pub fn is_html(&self) -> bool {
        let ct = self.content_type.to_ascii_lowercase();
        ct.starts_with("text/html") || ct.starts_with("application/xhtml+xml")
    }

    /// Clears the body and resets parsed-content fields, used by
    /// `ProcessMessage::reset_content` when a processor rewinds the loop.
    pub fn reset_content(&mut self) {
        self.body.clear();
    }
}

/// Fragment-insensitive URL membership set, used for both `Visited` and the
/// follow-page de-duplication logic (spec.md §3, `URLList` in the original).
#[derive(Debug, Default, Clone)]
pub struct UrlList {
    seen: std::collections::HashSet<String>,
}

impl UrlList {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(url: &Url) -> String {
        let mut c = url.clone();
        c.set_fragment(None);
        c.to_string()
    }

    pub fn add(&mut self, url: &Url) {
        self.seen.insert(Self::normalize(url));
    }

    pub fn is_present(&self, url: &Url) -> bool {
        self.seen.contains(&Self::normalize(url))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_html_matches_variants() {
        let mut d = Drop::new(Url::parse("https://example.com").unwrap());
        d.content_type = "text/html; charset=utf-8".into();
        assert!(d.is_html());
        d.content_type = "application/xhtml+xml".into();
        assert!(d.is_html());
        d.content_type = "application/pdf".into();
        assert!(!d.is_html());
    }

    #[test]
    fn url_list_is_fragment_insensitive() {
        let mut list = UrlList::new();
        let a = Url::parse("https://example.com/page#one").unwrap();
        let b = Url::parse("https://example.com/page#two").unwrap();
        list.add(&a);
        assert!(list.is_present(&b));
    }

    #[test]
    fn text_direction_rejects_garbage() {
        assert_eq!(TextDirection::parse("ltr"), Some(TextDirection::Ltr));
        assert_eq!(TextDirection::parse("RTL"), Some(TextDirection::Rtl));
        assert_eq!(TextDirection::parse("auto"), None);
    }
}
