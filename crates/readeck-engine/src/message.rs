//! `Step` and `ProcessMessage`: the state threaded through every registered
//! processor on every pass of the extraction loop (spec.md §4.F / §9).
//!
//! The original's `Processor` is a continuation-passing function
//! `func(*ProcessMessage, Processor) Processor`, where returning `nil` stops
//! the chain and returning a different `Processor` replaces the remaining
//! pipeline. Closures returning closures don't read as idiomatic Rust, so
//! this port collapses that to a trait with a `ProcessorOutcome` return
//! value: `Continue` advances to the next registered processor (the common
//! case — almost every original processor just returns its `next` argument
//! unchanged), `Halt` stops running processors for the remainder of this
//! step (the "return nil" case). No processor in this pipeline needs to
//! splice in new successors, so that part of the CPS design is dropped.

use async_trait::async_trait;
use readeck_dom::Dom;

/// A distinguished phase of the extraction state machine (spec.md §9
/// glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Start,
    Body,
    Dom,
    Finish,
    PostProcess,
    Done,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::Body => "body",
            Step::Dom => "dom",
            Step::Finish => "finish",
            Step::PostProcess => "postprocess",
            Step::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorOutcome {
    Continue,
    Halt,
}

/// Implemented by every standard (and site-specific) processor. `position`
/// identifies which `Drop` in `Extractor::drops` is being worked on;
/// processors mutate it through the `Extractor` reference they're handed
/// alongside the message, since holding a live back-reference from the
/// message to its owning extractor doesn't fit Rust's ownership model the
/// way it does the original's garbage-collected one.
///
/// `run` is async (via `async_trait`, since a plain `async fn` in a trait
/// isn't object-safe) because several standard processors — `ExtractOembed`,
/// `ExtractFavicon`, `ExtractPicture`, `Archive` — fetch over the network
/// mid-pipeline; `Extractor::run` is itself an async fn for the same reason,
/// so processors need to `.await` rather than block the runtime.
#[async_trait]
pub trait Processor: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut crate::extractor::Extractor) -> ProcessorOutcome;
}

/// Message state for one pass through the processor list (spec.md §9).
pub struct ProcessMessage {
    pub(crate) step: Step,
    pub(crate) position: i64,
    pub(crate) reset_counter: u32,
    pub(crate) max_reset: u32,
    pub(crate) max_drops: usize,
    pub(crate) canceled: Option<String>,
    pub dom: Option<Dom>,
}

impl ProcessMessage {
    /// Public so processor implementations outside this crate can exercise
    /// themselves in isolation without driving a full `Extractor::run`.
    pub fn new(step: Step, max_drops: usize) -> Self {
        Self {
            step,
            position: -1,
            reset_counter: 0,
            max_reset: 10,
            max_drops,
            canceled: None,
            dom: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn max_drops(&self) -> usize {
        self.max_drops
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.is_some()
    }

    pub fn cancel_reason(&self) -> Option<&str> {
        self.canceled.as_deref()
    }

    /// Fully cancels the extraction (spec.md §7 "cancellation triggered").
    pub fn cancel(&mut self, reason: impl Into<String>) {
        self.canceled = Some(reason.into());
    }

    /// Lets the process start over, normally with a new URL discovered mid
    /// extraction. Cancels with "too many redirects" once `max_reset`
    /// restarts have happened, mirroring `ResetPosition` exactly.
    pub fn reset_position(&mut self) {
        if self.reset_counter >= self.max_reset {
            self.cancel("too many redirects");
        }
        self.reset_counter += 1;
        self.position = -1;
    }

    /// Empties the in-progress DOM, mirroring `ResetContent`. Unlike
    /// `reset_position`, this doesn't touch `reset_counter` or `position` —
    /// pagination discovering a next page is bounded by `max_drops`, not by
    /// the redirect-reset counter. Callers also own clearing the current
    /// drop's body (`ProcessMessage` has no back-reference to `Extractor`'s
    /// drop list), which is why `GoToNextPage` pairs this with
    /// `Extractor::drop_at_mut`.
    pub fn reset_content(&mut self) {
        self.dom = None;
    }
}

/// A node-keyed ephemeral attribute prefix, namespaced per extraction so a
/// page can't pre-seed an attribute that later gets mistaken for one of
/// ours (spec.md §9 "Ephemeral DOM attributes"). `transform_data_attributes`
/// converts every one of these back to a plain `data-readeck-*` attribute
/// once the DOM step is done.
pub fn ephemeral_attr_prefix(unique_id: &str) -> String {
    format!("x-data-{unique_id}-")
}

/// Rewrites every `x-data-<unique_id>-<name>` attribute in `dom` to
/// `data-readeck-<name>`, run once after `Step::Dom` processors finish.
pub fn transform_data_attributes(dom: &mut Dom, unique_id: &str) {
    let prefix = ephemeral_attr_prefix(unique_id);
    for node in dom.descendant_elements(dom.root()) {
        let matching: Vec<String> = dom
            .attrs(node)
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| name.starts_with(&prefix))
            .collect();
        for name in matching {
            if let Some(value) = dom.attr(node, &name).map(str::to_string) {
                let suffix = &name[prefix.len()..];
                dom.set_attr(node, &format!("data-readeck-{suffix}"), &value);
                dom.remove_attr(node, &name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_position_cancels_after_max_reset() {
        let mut msg = ProcessMessage::new(Step::Start, 100);
        msg.max_reset = 2;
        msg.reset_position();
        msg.reset_position();
        assert!(!msg.is_canceled());
        msg.reset_position();
        assert!(msg.is_canceled());
        assert_eq!(msg.cancel_reason(), Some("too many redirects"));
    }

    #[test]
    fn transform_rewrites_ephemeral_attributes_only() {
        let mut dom = Dom::parse(r#"<html><body><p x-data-ab12-foo="1" data-other="keep">x</p></body></html>"#);
        transform_data_attributes(&mut dom, "ab12");
        let html = dom.to_html();
        assert!(html.contains(r#"data-readeck-foo="1""#));
        assert!(!html.contains("x-data-"));
        assert!(html.contains(r#"data-other="keep""#));
    }
}
