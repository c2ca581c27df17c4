//! `Archive` (spec.md §4.F item 15): runs at `Step::PostProcess`, once the
//! per-page bodies have been concatenated into `Extractor::html`, and turns
//! that document into a self-contained archive via `readeck_archiver`.
//!
//! `Extractor` has no field to hold the result, so this hands it off through
//! an `ArchiveSink` (the same shared-handle pattern `SiteConfigCache` uses)
//! that the host reads from after `run()` returns.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use readeck_archiver::{archive, ArchiveEvent, ArchiveFlags, ArchiveOutput, ArchiveRequest};
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};

#[derive(Clone, Default)]
pub struct ArchiveSink(Arc<Mutex<Option<ArchiveOutput>>>);

impl ArchiveSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the stored output, leaving `None` behind. Returns `None` if
    /// the run canceled or failed before reaching `Step::PostProcess`.
    pub fn take(&self) -> Option<ArchiveOutput> {
        self.0.lock().unwrap().take()
    }

    fn set(&self, output: ArchiveOutput) {
        *self.0.lock().unwrap() = Some(output);
    }
}

pub struct Archive {
    sink: ArchiveSink,
    flags: ArchiveFlags,
}

impl Archive {
    pub fn new(sink: ArchiveSink, flags: ArchiveFlags) -> Self {
        Self { sink, flags }
    }
}

#[async_trait]
impl Processor for Archive {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::PostProcess {
            return ProcessorOutcome::Continue;
        }
        let client = extractor.client();
        let html = extractor.html.clone();
        let initial_url = extractor.url.clone();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let output = {
            let Some(drop) = extractor.main_drop() else {
                return ProcessorOutcome::Continue;
            };
            let base_url = drop.url.clone();
            let request = ArchiveRequest {
                drop,
                html: &html,
                base_url: &base_url,
                flags: self.flags,
                initial_url: &initial_url,
                labels: Vec::new(),
            };
            archive(client, tx, request).await
        };

        while let Ok(event) = rx.try_recv() {
            if let ArchiveEvent::Error { uri, message } = event {
                extractor.log(format!("archive fetch failed for {uri}: {message}"));
            }
        }

        self.sink.set(output);
        ProcessorOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readeck_fetch::SafeClient;
    use url::Url;

    fn extractor() -> Extractor {
        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        Extractor::new(Url::parse("https://example.com").unwrap(), client)
    }

    #[tokio::test]
    async fn post_process_step_populates_the_sink() {
        let mut extractor = extractor();
        extractor.html = "<html><body><p>hello</p></body></html>".to_string();

        let sink = ArchiveSink::new();
        let mut msg = ProcessMessage::new(Step::PostProcess, 100);

        Archive::new(sink.clone(), ArchiveFlags::NONE).run(&mut msg, &mut extractor).await;

        let output = sink.take().expect("archive output");
        assert!(output.html.contains("hello"));
        assert!(sink.take().is_none());
    }

    #[tokio::test]
    async fn other_steps_are_ignored() {
        let mut extractor = extractor();
        let sink = ArchiveSink::new();
        let mut msg = ProcessMessage::new(Step::Dom, 100);

        Archive::new(sink.clone(), ArchiveFlags::NONE).run(&mut msg, &mut extractor).await;

        assert!(sink.take().is_none());
    }
}
