//! Application state: query, result, error, loading flag, history and the
//! sharing acknowledgement. Owned by the UI thread; the widgets are a
//! projection of it and every user action goes through here.

use crate::data::{MedicineOrigin, LOOKUP_ERROR_MESSAGE};
use crate::error::{LookupError, ShareError};
use crate::history::{HistoryStore, RecentSearches};
use crate::location::{share_text, ShareableLocation};
use crate::suggestions::SuggestionPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Result,
    Error,
}

/// A lookup the caller must run and report back through [`Shell::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub term: String,
}

/// Destination for shared text.
pub trait ClipboardSink {
    fn write_text(&self, text: &str) -> Result<(), ShareError>;
}

pub struct Shell<H, L> {
    query: String,
    result: Option<MedicineOrigin>,
    /// Bumped whenever `result` is replaced or cleared.
    result_generation: u64,
    error: Option<&'static str>,
    loading: bool,
    history: RecentSearches,
    suggestions: SuggestionPanel,
    copied: Option<u64>,
    next_seq: u64,
    pending: Option<u64>,
    store: H,
    location: L,
}

impl<H: HistoryStore, L: ShareableLocation> Shell<H, L> {
    pub fn new(store: H, location: L) -> Self {
        Self {
            query: String::new(),
            result: None,
            result_generation: 0,
            error: None,
            loading: false,
            history: RecentSearches::default(),
            suggestions: SuggestionPanel::default(),
            copied: None,
            next_seq: 0,
            pending: None,
            store,
            location,
        }
    }

    /// Restore history and pick up a shared search term, if the location has one.
    pub fn start(&mut self) -> Option<SearchTicket> {
        match self.store.load() {
            Ok(entries) => self.history = RecentSearches::from_entries(entries),
            Err(e) => tracing::warn!("could not restore recent searches: {}", e),
        }

        match self.location.read() {
            Ok(Some(term)) => {
                self.set_query(&term);
                self.submit(&term)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("location not readable: {}", e);
                None
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.result.is_some() {
            Phase::Result
        } else {
            Phase::Idle
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result(&self) -> Option<&MedicineOrigin> {
        self.result.as_ref()
    }

    /// Changes with every new result, even one equal to the previous.
    pub fn result_generation(&self) -> u64 {
        self.result_generation
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn history(&self) -> &RecentSearches {
        &self.history
    }

    pub fn suggestions(&self) -> &SuggestionPanel {
        &self.suggestions
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn is_copied(&self) -> bool {
        self.copied.is_some()
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.suggestions.update(text);
    }

    pub fn focus_search(&mut self) {
        self.suggestions.focus(&self.query);
    }

    /// Outside click or blur: hide the dropdown, keep the query.
    pub fn dismiss_suggestions(&mut self) {
        self.suggestions.hide();
    }

    /// Submit the current query text.
    pub fn submit_query(&mut self) -> Option<SearchTicket> {
        let term = self.query.clone();
        self.submit(&term)
    }

    /// Suggestion click, history chip or category shortcut.
    pub fn choose(&mut self, name: &str) -> Option<SearchTicket> {
        if self.loading {
            return None;
        }
        self.set_query(name);
        self.submit(name)
    }

    /// Enter `loading` for `term`. Ignored while another lookup is outstanding
    /// or when the term is blank.
    pub fn submit(&mut self, term: &str) -> Option<SearchTicket> {
        let term = term.trim();
        if term.is_empty() || self.loading {
            return None;
        }

        self.suggestions.hide();
        self.loading = true;
        self.error = None;

        if let Err(e) = self.location.write(Some(term)) {
            tracing::warn!("could not update location: {}", e);
        }

        self.next_seq += 1;
        self.pending = Some(self.next_seq);
        tracing::debug!(seq = self.next_seq, term, "lookup started");

        Some(SearchTicket {
            seq: self.next_seq,
            term: term.to_string(),
        })
    }

    /// Apply a finished lookup. Returns `false` when the response is stale
    /// and was discarded.
    pub fn complete(
        &mut self,
        seq: u64,
        outcome: Result<MedicineOrigin, LookupError>,
    ) -> bool {
        if self.pending != Some(seq) {
            tracing::debug!(seq, "discarding stale lookup response");
            return false;
        }
        self.pending = None;
        self.loading = false;

        match outcome {
            Ok(origin) => {
                self.set_query(&origin.name);
                self.suggestions.hide();
                self.history.insert(&origin.name);
                if let Err(e) = self.store.save(self.history.entries()) {
                    tracing::warn!("could not persist recent searches: {}", e);
                }
                if let Err(e) = self.location.write(Some(&origin.name)) {
                    tracing::warn!("could not update location: {}", e);
                }
                self.result = Some(origin);
                self.result_generation += 1;
            }
            Err(e) => {
                tracing::error!("origin lookup failed: {}", e);
                self.error = Some(LOOKUP_ERROR_MESSAGE);
            }
        }
        true
    }

    /// Back to the home state. Any lookup still in flight is abandoned.
    pub fn reset(&mut self) {
        self.query.clear();
        self.suggestions.update("");
        if self.result.take().is_some() {
            self.result_generation += 1;
        }
        self.error = None;
        self.loading = false;
        self.pending = None;
        self.copied = None;
        if let Err(e) = self.location.write(None) {
            tracing::warn!("could not clear location: {}", e);
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Text to share for the current result.
    pub fn share_text(&self) -> Option<String> {
        self.result
            .as_ref()
            .map(|origin| share_text(&self.location, &origin.name))
    }

    /// Copy the share text and raise the acknowledgement. The returned token
    /// must be handed to [`Shell::clear_copied`] once the acknowledgement
    /// period is over.
    pub fn share(&mut self, clipboard: &impl ClipboardSink) -> Result<u64, ShareError> {
        let text = self.share_text().ok_or(ShareError::NothingToShare)?;
        clipboard.write_text(&text)?;

        self.next_seq += 1;
        self.copied = Some(self.next_seq);
        Ok(self.next_seq)
    }

    pub fn clear_copied(&mut self, token: u64) {
        if self.copied == Some(token) {
            self.copied = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_origin;
    use crate::history::tests::MemoryStore;
    use crate::location::AppLocation;
    use crate::lookup::{spawn_lookup, OriginLookup};
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};

    fn shell_with(location: AppLocation) -> Shell<MemoryStore, AppLocation> {
        Shell::new(MemoryStore::default(), location)
    }

    fn shell() -> Shell<MemoryStore, AppLocation> {
        shell_with(AppLocation::new(None, Some("https://example.org/")))
    }

    fn failure() -> LookupError {
        LookupError::EmptyResponse
    }

    #[derive(Default)]
    struct RecordingClipboard {
        text: RefCell<Option<String>>,
        fail: bool,
    }

    impl ClipboardSink for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), ShareError> {
            if self.fail {
                return Err(ShareError::NoDisplay);
            }
            *self.text.borrow_mut() = Some(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubLookup {
        calls: Mutex<Vec<String>>,
    }

    impl OriginLookup for StubLookup {
        async fn lookup(&self, name: &str) -> Result<MedicineOrigin, LookupError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(name.to_string());
            }
            Ok(sample_origin(name))
        }
    }

    #[test]
    fn starts_idle() {
        let mut shell = shell();
        assert_eq!(shell.start(), None);
        assert_eq!(shell.phase(), Phase::Idle);
    }

    #[test]
    fn blank_terms_are_ignored() {
        let mut shell = shell();
        assert_eq!(shell.submit("   "), None);
        assert_eq!(shell.phase(), Phase::Idle);
    }

    #[test]
    fn submit_enters_loading_and_clears_error() {
        let mut shell = shell();
        let ticket = shell.submit("bogus").unwrap();
        shell.complete(ticket.seq, Err(failure()));
        assert_eq!(shell.phase(), Phase::Error);

        let ticket = shell.submit("  aspirin ").unwrap();
        assert_eq!(ticket.term, "aspirin");
        assert_eq!(shell.phase(), Phase::Loading);
        assert_eq!(shell.error(), None);
        assert_eq!(
            shell.location().current(),
            Some("https://example.org/?drug=aspirin")
        );
    }

    #[test]
    fn submit_is_ignored_while_loading() {
        let mut shell = shell();
        assert!(shell.submit("aspirin").is_some());
        assert_eq!(shell.submit("insulin"), None);
        assert_eq!(shell.choose("Insulin"), None);
        assert_eq!(shell.query(), "");
    }

    #[test]
    fn success_overwrites_query_with_canonical_name() {
        let mut shell = shell();
        shell.set_query("aspirin");
        let ticket = shell.submit_query().unwrap();
        assert!(shell.complete(ticket.seq, Ok(sample_origin("Aspirin"))));

        assert_eq!(shell.phase(), Phase::Result);
        assert_eq!(shell.query(), "Aspirin");
        assert_eq!(shell.history().entries(), &["Aspirin".to_string()]);
        assert_eq!(
            shell.location().current(),
            Some("https://example.org/?drug=Aspirin")
        );
        assert!(!shell.suggestions().is_shown());
    }

    #[test]
    fn success_persists_history() {
        let mut shell = shell();
        for name in ["B", "A", "B"] {
            let ticket = shell.submit(name).unwrap();
            shell.complete(ticket.seq, Ok(sample_origin(name)));
        }
        let saved = shell.store.saved.borrow();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[2], vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn failure_keeps_previous_result() {
        let mut shell = shell();
        let ticket = shell.submit("Aspirin").unwrap();
        shell.complete(ticket.seq, Ok(sample_origin("Aspirin")));

        let ticket = shell.submit("nonsense").unwrap();
        shell.complete(ticket.seq, Err(failure()));

        assert_eq!(shell.phase(), Phase::Error);
        assert_eq!(shell.error(), Some(LOOKUP_ERROR_MESSAGE));
        assert_eq!(shell.result().map(|r| r.name.as_str()), Some("Aspirin"));
    }

    #[test]
    fn failure_without_prior_result_leaves_none() {
        let mut shell = shell();
        let ticket = shell.submit("nonsense").unwrap();
        shell.complete(ticket.seq, Err(failure()));
        assert!(shell.result().is_none());
        assert!(!shell.error().unwrap_or("").is_empty());
    }

    #[test]
    fn dismiss_error_clears_only_the_error() {
        let mut shell = shell();
        let ticket = shell.submit("nonsense").unwrap();
        shell.complete(ticket.seq, Err(failure()));
        shell.dismiss_error();
        assert_eq!(shell.phase(), Phase::Idle);
        assert_eq!(shell.query(), "");
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut shell = shell();
        let first = shell.submit("Aspirin").unwrap();
        shell.reset();
        let second = shell.submit("Insulin").unwrap();

        assert!(!shell.complete(first.seq, Ok(sample_origin("Aspirin"))));
        assert_eq!(shell.phase(), Phase::Loading);

        assert!(shell.complete(second.seq, Ok(sample_origin("Insulin"))));
        assert_eq!(shell.result().map(|r| r.name.as_str()), Some("Insulin"));
    }

    #[test]
    fn reset_returns_to_idle_and_clears_location() {
        let mut shell = shell();
        let ticket = shell.submit("Aspirin").unwrap();
        shell.complete(ticket.seq, Ok(sample_origin("Aspirin")));

        shell.reset();
        assert_eq!(shell.phase(), Phase::Idle);
        assert_eq!(shell.query(), "");
        assert!(shell.result().is_none());
        assert_eq!(shell.location().current(), Some("https://example.org/"));
        assert_eq!(shell.location().read().unwrap(), None);
        assert_eq!(shell.history().entries().len(), 1);
    }

    #[test]
    fn opaque_location_never_blocks_search() {
        let mut shell = shell_with(AppLocation::opaque());
        let ticket = shell.submit("Aspirin").unwrap();
        assert!(shell.complete(ticket.seq, Ok(sample_origin("Aspirin"))));
        assert_eq!(
            shell.share_text().as_deref(),
            Some("Search for \"Aspirin\" on PharmOrigin Explorer")
        );
    }

    #[test]
    fn storage_failures_are_non_fatal() {
        let store = MemoryStore { fail: true, ..MemoryStore::default() };
        let mut shell = Shell::new(store, AppLocation::opaque());
        assert_eq!(shell.start(), None);
        let ticket = shell.submit("Aspirin").unwrap();
        assert!(shell.complete(ticket.seq, Ok(sample_origin("Aspirin"))));
        assert_eq!(shell.phase(), Phase::Result);
    }

    #[test]
    fn start_restores_history() {
        let store = MemoryStore {
            initial: vec!["Insulin".to_string(), "Aspirin".to_string()],
            ..MemoryStore::default()
        };
        let mut shell = Shell::new(store, AppLocation::opaque());
        shell.start();
        assert_eq!(shell.history().entries().len(), 2);
        assert_eq!(shell.history().entries()[0], "Insulin");
    }

    #[test]
    fn choose_sets_query_and_hides_suggestions() {
        let mut shell = shell();
        shell.set_query("peni");
        assert!(shell.suggestions().is_shown());

        let ticket = shell.choose("Penicillin").unwrap();
        assert_eq!(ticket.term, "Penicillin");
        assert_eq!(shell.query(), "Penicillin");
        assert!(!shell.suggestions().is_shown());
    }

    #[test]
    fn blur_and_focus_toggle_suggestions_keeping_query() {
        let mut shell = shell();
        shell.set_query("mor");
        shell.dismiss_suggestions();
        assert!(!shell.suggestions().is_shown());
        assert_eq!(shell.query(), "mor");

        shell.focus_search();
        assert!(shell.suggestions().is_shown());

        shell.dismiss_suggestions();
        assert!(!shell.suggestions().is_shown());
        assert_eq!(shell.suggestions().items(), &["Morphine"]);
    }

    #[test]
    fn share_copies_url_and_acknowledges() {
        let mut shell = shell();
        let ticket = shell.submit("Aspirin").unwrap();
        shell.complete(ticket.seq, Ok(sample_origin("Aspirin")));

        let clipboard = RecordingClipboard::default();
        let token = shell.share(&clipboard).unwrap();
        assert!(shell.is_copied());
        assert_eq!(
            clipboard.text.borrow().as_deref(),
            Some("https://example.org/?drug=Aspirin")
        );

        shell.clear_copied(token);
        assert!(!shell.is_copied());
    }

    #[test]
    fn older_acknowledgement_timer_does_not_clear_newer_one() {
        let mut shell = shell();
        let ticket = shell.submit("Aspirin").unwrap();
        shell.complete(ticket.seq, Ok(sample_origin("Aspirin")));

        let clipboard = RecordingClipboard::default();
        let first = shell.share(&clipboard).unwrap();
        let _second = shell.share(&clipboard).unwrap();
        shell.clear_copied(first);
        assert!(shell.is_copied());
    }

    #[test]
    fn clipboard_failure_shows_no_acknowledgement() {
        let mut shell = shell();
        let ticket = shell.submit("Aspirin").unwrap();
        shell.complete(ticket.seq, Ok(sample_origin("Aspirin")));

        let clipboard = RecordingClipboard { fail: true, ..RecordingClipboard::default() };
        assert!(shell.share(&clipboard).is_err());
        assert!(!shell.is_copied());
        assert_eq!(shell.phase(), Phase::Result);
    }

    #[test]
    fn repeated_identical_result_gets_a_new_generation() {
        let mut shell = shell();
        let ticket = shell.submit("Aspirin").unwrap();
        shell.complete(ticket.seq, Ok(sample_origin("Aspirin")));
        let first = shell.result_generation();

        let ticket = shell.submit("Aspirin").unwrap();
        shell.complete(ticket.seq, Ok(sample_origin("Aspirin")));
        assert_eq!(shell.result_generation(), first + 1);

        let ticket = shell.submit("bogus").unwrap();
        shell.complete(ticket.seq, Err(failure()));
        assert_eq!(shell.result_generation(), first + 1);

        shell.reset();
        assert_eq!(shell.result_generation(), first + 2);
        shell.reset();
        assert_eq!(shell.result_generation(), first + 2);
    }

    #[test]
    fn share_without_result_is_rejected() {
        let mut shell = shell();
        let clipboard = RecordingClipboard::default();
        assert!(matches!(shell.share(&clipboard), Err(ShareError::NothingToShare)));
    }

    #[tokio::test]
    async fn shared_location_triggers_the_same_lookup() {
        let mut location = AppLocation::new(None, Some("https://example.org/explore"));
        location.write(Some("Streptomycin")).unwrap();

        // A fresh session reading the same location.
        let mut shell = shell_with(location);
        let ticket = shell.start().unwrap();
        assert_eq!(shell.query(), "Streptomycin");
        assert_eq!(shell.phase(), Phase::Loading);

        let service = Arc::new(StubLookup::default());
        let outcome = spawn_lookup(service.clone(), ticket.term.clone()).await.unwrap();
        assert!(shell.complete(ticket.seq, outcome));

        assert_eq!(*service.calls.lock().unwrap(), vec!["Streptomycin".to_string()]);
        assert_eq!(shell.result().map(|r| r.name.as_str()), Some("Streptomycin"));
    }
}
