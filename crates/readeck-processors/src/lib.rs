//! The standard extraction pipeline (spec.md §4.F): the fifteen built-in
//! [`Processor`] implementations, in the order a default `Extractor` should
//! run them, assembled by [`standard_processors`].

mod archive;
mod body;
mod clean_dom;
mod drop_properties;
mod favicon;
mod meta;
mod oembed;
mod pagination;
mod picture;
mod readability;
mod replace_strings;
mod site_config;
mod text;
mod video_embeds;
mod wrap_tables;

pub use archive::{Archive, ArchiveSink};
pub use body::ExtractBody;
pub use clean_dom::CleanDom;
pub use drop_properties::SetDropProperties;
pub use favicon::ExtractFavicon;
pub use meta::{ExtractMeta, MetaBag};
pub use oembed::ExtractOembed;
pub use pagination::GoToNextPage;
pub use picture::ExtractPicture;
pub use readability::Readability;
pub use replace_strings::ReplaceStrings;
pub use site_config::{LoadScripts, LoadSiteConfig, SiteConfigCache};
pub use text::Text;
pub use video_embeds::ConvertVideoEmbeds;
pub use wrap_tables::WrapTables;

use std::path::PathBuf;
use std::sync::Arc;

use readeck_archiver::ArchiveFlags;
use readeck_engine::Processor;
use readeck_siteconfig::SiteConfigRegistry;

/// Builds the default pipeline in canonical order, wiring the shared
/// [`SiteConfigCache`] through the processors that need it and returning the
/// [`ArchiveSink`] the host should read from after `Extractor::run` finishes.
pub fn standard_processors(
    site_configs: Arc<SiteConfigRegistry>,
    content_script_roots: Vec<PathBuf>,
    archive_flags: ArchiveFlags,
) -> (Vec<Box<dyn Processor>>, ArchiveSink) {
    let site_cache = SiteConfigCache::new();
    let archive_sink = ArchiveSink::new();

    let processors: Vec<Box<dyn Processor>> = vec![
        Box::new(LoadScripts::new(content_script_roots)),
        Box::new(LoadSiteConfig::new(site_configs, site_cache.clone())),
        Box::new(ReplaceStrings::new(site_cache.clone())),
        Box::new(ExtractMeta),
        Box::new(ExtractOembed),
        Box::new(SetDropProperties),
        Box::new(ExtractFavicon),
        Box::new(ExtractPicture),
        Box::new(GoToNextPage::new(site_cache.clone())),
        Box::new(ExtractBody::new(site_cache)),
        Box::new(ConvertVideoEmbeds),
        Box::new(Readability),
        Box::new(WrapTables),
        Box::new(CleanDom),
        Box::new(Text),
        Box::new(Archive::new(archive_sink.clone(), archive_flags)),
    ];

    (processors, archive_sink)
}
