//! User interaction capability.
//!
//! Every prompt returns `Ok(None)` when the user dismisses it; callers turn
//! that into `SelectionCancelled`. `Err` is reserved for a broken terminal.
use crate::registry::SearchSuggestion;
use anyhow::{Context, Result};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Error,
}

/// Lookup wired into the incremental package prompt.
pub type SuggestionLookup<'a> = dyn FnMut(&str) -> Vec<SearchSuggestion> + 'a;

pub trait UserInteraction {
    /// Ask for an existing directory.
    fn pick_folder(&mut self, prompt: &str) -> Result<Option<PathBuf>>;

    /// Ask for one of `items`, returning its index.
    fn pick_one(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Ask for free text. An empty answer is `Some("")`.
    fn input(&mut self, prompt: &str, placeholder: &str) -> Result<Option<String>>;

    /// Incremental package search; `lookup` is called with each query typed.
    fn search(
        &mut self,
        prompt: &str,
        lookup: &mut SuggestionLookup<'_>,
    ) -> Result<Option<SearchSuggestion>>;

    fn notify(&mut self, level: Notice, message: &str);
}

/// Map cliclack's interrupt (Esc / Ctrl-C) to a dismissed prompt.
fn dismissed<T>(result: io::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(err).context("read terminal prompt"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchChoice {
    Suggestion(usize),
    Typed,
    Again,
}

/// Entries offered after one search query.
#[derive(Debug)]
struct SearchChoices {
    suggestions: Vec<SearchSuggestion>,
    typed: Option<SearchSuggestion>,
    entries: Vec<(SearchChoice, String, &'static str)>,
}

/// Suggestions first, then the typed identifier unless a suggestion already
/// matches it, then "Search again". `None` when there is nothing to pick.
fn search_choices(query: &str, suggestions: Vec<SearchSuggestion>) -> Option<SearchChoices> {
    let typed = SearchSuggestion::from_identifier(query)
        .filter(|typed| !suggestions.iter().any(|s| s.identifier() == typed.identifier()));
    if suggestions.is_empty() && typed.is_none() {
        return None;
    }

    let mut entries: Vec<(SearchChoice, String, &'static str)> = suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| (SearchChoice::Suggestion(index), suggestion.label.clone(), ""))
        .collect();
    if let Some(typed) = &typed {
        entries.push((SearchChoice::Typed, typed.identifier(), "as typed"));
    }
    entries.push((SearchChoice::Again, "Search again".to_string(), ""));
    Some(SearchChoices {
        suggestions,
        typed,
        entries,
    })
}

/// Terminal host built on cliclack prompts.
#[derive(Debug, Default)]
pub struct TerminalInteraction;

impl UserInteraction for TerminalInteraction {
    fn pick_folder(&mut self, prompt: &str) -> Result<Option<PathBuf>> {
        let current = std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| ".".to_string());
        loop {
            let answer = dismissed(
                cliclack::input(prompt)
                    .default_input(&current)
                    .interact::<String>(),
            )?;
            let Some(answer) = answer else {
                return Ok(None);
            };
            let path = PathBuf::from(answer.trim());
            if path.is_dir() {
                return Ok(Some(path));
            }
            self.notify(
                Notice::Error,
                &format!("{} is not a directory", path.display()),
            );
        }
    }

    fn pick_one(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }
        let mut select = cliclack::select(prompt);
        for (index, item) in items.iter().enumerate() {
            select = select.item(index, item, "");
        }
        dismissed(select.interact())
    }

    fn input(&mut self, prompt: &str, placeholder: &str) -> Result<Option<String>> {
        dismissed(
            cliclack::input(prompt)
                .placeholder(placeholder)
                .required(false)
                .interact::<String>(),
        )
    }

    fn search(
        &mut self,
        prompt: &str,
        lookup: &mut SuggestionLookup<'_>,
    ) -> Result<Option<SearchSuggestion>> {
        loop {
            let query = dismissed(
                cliclack::input(prompt)
                    .placeholder("jquery, or jquery@ to list versions")
                    .interact::<String>(),
            )?;
            let Some(query) = query else {
                return Ok(None);
            };
            let suggestions = lookup(&query);
            let Some(choices) = search_choices(&query, suggestions) else {
                self.notify(Notice::Warning, &format!("no packages match {query:?}"));
                continue;
            };

            let mut select = cliclack::select(format!("Results for {query:?}"));
            for (choice, label, hint) in &choices.entries {
                select = select.item(choice.clone(), label, *hint);
            }
            match dismissed(select.interact())? {
                None => return Ok(None),
                Some(SearchChoice::Again) => continue,
                Some(SearchChoice::Typed) => return Ok(choices.typed),
                Some(SearchChoice::Suggestion(index)) => {
                    return Ok(choices.suggestions.get(index).cloned());
                }
            }
        }
    }

    fn notify(&mut self, level: Notice, message: &str) {
        let _ = match level {
            Notice::Info => cliclack::log::info(message),
            Notice::Success => cliclack::log::success(message),
            Notice::Warning => cliclack::log::warning(message),
            Notice::Error => cliclack::log::error(message),
        };
    }
}
