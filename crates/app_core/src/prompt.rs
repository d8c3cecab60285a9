//! Questions the dispatcher asks the user

use std::path::PathBuf;

/// Answers prompts on behalf of the user.
///
/// Every method returns `None`/`false` when the user dismisses the question.
pub trait Prompter {
    /// Free text with a pre-filled default
    fn ask_text(&mut self, title: &str, label: &str, default: &str) -> Option<String>;

    /// Yes/no question; only an explicit yes returns `true`
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    /// A local directory
    fn pick_directory(&mut self, title: &str) -> Option<PathBuf>;
}

/// Prompter with canned answers, for scripted runs and tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    pub text: Option<String>,
    pub confirm: bool,
    pub directory: Option<PathBuf>,
    /// `(title, label)` of every question asked, in order
    pub asked: Vec<(String, String)>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn confirming() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }

    pub fn picking(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_text(&mut self, title: &str, label: &str, _default: &str) -> Option<String> {
        self.asked.push((title.to_string(), label.to_string()));
        self.text.clone()
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self.asked.push((title.to_string(), message.to_string()));
        self.confirm
    }

    fn pick_directory(&mut self, title: &str) -> Option<PathBuf> {
        self.asked.push((title.to_string(), String::new()));
        self.directory.clone()
    }
}
