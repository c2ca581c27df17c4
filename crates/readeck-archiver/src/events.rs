//! The archiver's event protocol (spec.md §6 "Event protocol"), delivered
//! over an unbounded channel so the fetcher loop never blocks on a slow
//! subscriber.

/// One notification emitted while archiving a page.
#[derive(Debug, Clone)]
pub enum ArchiveEvent {
    StartHtml { url: String },
    Error { uri: String, message: String },
    Fetched { uri: String, size: usize },
}

pub type ArchiveEventSender = tokio::sync::mpsc::UnboundedSender<ArchiveEvent>;
