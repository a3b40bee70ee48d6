//! Per-keystroke city autocompletion for the interactive search prompt.

use std::sync::Arc;

use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use skycast_core::{CitySearch, Debouncer, SuggestionRecord};
use tokio::{runtime::Handle, sync::watch};

/// Feeds prompt keystrokes into a [`Debouncer`] and lists whatever it last
/// published. The prompt runs on a blocking thread, so the runtime handle is
/// entered before each keystroke is forwarded.
pub struct CityAutocomplete<S> {
    debouncer: Arc<Debouncer<S>>,
    results: watch::Receiver<Vec<SuggestionRecord>>,
    runtime: Handle,
}

impl<S: CitySearch + 'static> CityAutocomplete<S> {
    pub fn new(debouncer: Arc<Debouncer<S>>, runtime: Handle) -> Self {
        let results = debouncer.subscribe();
        Self {
            debouncer,
            results,
            runtime,
        }
    }

    pub fn records(&self) -> Vec<SuggestionRecord> {
        self.results.borrow().clone()
    }
}

impl<S> Clone for CityAutocomplete<S> {
    fn clone(&self) -> Self {
        Self {
            debouncer: Arc::clone(&self.debouncer),
            results: self.results.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S: CitySearch + 'static> Autocomplete for CityAutocomplete<S> {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let _guard = self.runtime.enter();
        self.debouncer.input(input);
        Ok(self
            .results
            .borrow()
            .iter()
            .map(|record| record.display.clone())
            .collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

/// What the submitted prompt text asks for.
#[derive(Debug, PartialEq)]
pub enum Pick<'a> {
    /// The text is one of the listed suggestions.
    Place(&'a SuggestionRecord),
    /// Free text, looked up by name.
    Name(&'a str),
}

/// `None` for blank input, which ends the search loop.
pub fn resolve_pick<'a>(records: &'a [SuggestionRecord], input: &'a str) -> Option<Pick<'a>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    Some(
        records
            .iter()
            .find(|record| record.display == input)
            .map_or(Pick::Name(input), Pick::Place),
    )
}
